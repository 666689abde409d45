//! 基于推理服务的评估引擎
//!
//! 构建请求 → 调用推理服务（传输失败有限次重试）→ 严格解析 JSON → 约束检查

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::{ReasoningBackend, ReasoningRequest};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{EvaluationResult, IncomeVerificationContext, RuleSet};
use crate::services::{EvaluationEngine, EvaluationRequestBuilder};

/// 低温度，尽量让同一输入得到同一输出
pub const EVALUATION_TEMPERATURE: f32 = 0.1;

pub struct AiEvaluator {
    backend: Arc<dyn ReasoningBackend>,
    model: String,
    max_retries: usize,
    backoff: Duration,
}

impl AiEvaluator {
    pub fn new(backend: Arc<dyn ReasoningBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(backend: Arc<dyn ReasoningBackend>, config: &Config) -> Self {
        Self::new(backend, config.llm_model_name.clone())
            .with_retry(config.llm_max_retries, config.retry_backoff())
    }

    /// 设置传输失败时的重试策略
    pub fn with_retry(mut self, max_retries: usize, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    /// 调用推理服务，只对传输类错误重试
    async fn complete_with_retry(&self, request: &ReasoningRequest) -> AppResult<String> {
        let mut attempt = 0;
        loop {
            match self.backend.complete(request).await {
                Ok(content) => return Ok(content),
                Err(AppError::EvaluationEngine(e)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "⚠️ 推理服务调用失败，第 {}/{} 次重试: {}",
                        attempt, self.max_retries, e
                    );
                    tokio::time::sleep(self.backoff * attempt as u32).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// 严格解析推理服务返回的文本
///
/// 不剥离代码块、不截取片段，整段文本必须是合法的结果 JSON
pub fn parse_evaluation(content: &str, income_verification: bool) -> AppResult<EvaluationResult> {
    let result: EvaluationResult = serde_json::from_str(content)?;
    result.validate(income_verification)?;
    Ok(result)
}

#[async_trait]
impl EvaluationEngine for AiEvaluator {
    async fn evaluate(
        &self,
        text: &str,
        rules: &RuleSet,
        income: Option<&IncomeVerificationContext>,
    ) -> AppResult<EvaluationResult> {
        let built = EvaluationRequestBuilder::build(text, rules, income);
        let request = ReasoningRequest {
            model: self.model.clone(),
            system_instruction: built.system_instruction,
            user_instruction: built.user_instruction,
            temperature: EVALUATION_TEMPERATURE,
            force_json: true,
        };

        let content = self.complete_with_retry(&request).await?;
        debug!("推理服务返回 {} 字符", content.len());

        parse_evaluation(&content, income.is_some()).inspect_err(|e| {
            warn!("⚠️ 评估结果无法解析: {}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use serde_json::json;

    use crate::error::{EvaluationEngineError, EvaluationParseError};
    use crate::models::rules::{MAX_GWA_KEY, MAX_MONTHLY_INCOME_KEY};

    /// 按顺序返回预设响应的推理服务
    struct ScriptedBackend {
        responses: Mutex<Vec<AppResult<String>>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<ReasoningRequest>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<AppResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        async fn complete(&self, request: &ReasoningRequest) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(AppError::llm_api_failed("stub", "no scripted response")))
        }
    }

    fn rules() -> RuleSet {
        [(MAX_MONTHLY_INCOME_KEY, "30000"), (MAX_GWA_KEY, "3.0")]
            .into_iter()
            .collect()
    }

    fn income_ctx() -> IncomeVerificationContext {
        IncomeVerificationContext::new(
            15000.0,
            12000.0,
            "Monthly income: PHP 15,000".to_string(),
            "Monthly income: PHP 12,000".to_string(),
            "General Weighted Average: 2.5".to_string(),
        )
    }

    fn response(gwa: f64, gwa_passed: bool) -> String {
        let reasons: Vec<String> = if gwa_passed {
            vec![]
        } else {
            vec![format!("GWA of {} exceeds the maximum of 3.0", gwa)]
        };
        json!({
            "qualified": gwa_passed,
            "extractedData": {
                "applicantName": "Maria Santos",
                "motherIncome": 15000,
                "fatherIncome": 12000,
                "totalIncome": 27000,
                "gwa": gwa,
                "enrollmentStatus": "Enrolled",
                "school": null,
                "course": null
            },
            "evaluation": {
                "incomeCheck": {
                    "passed": true,
                    "valueFound": 27000,
                    "threshold": 30000,
                    "reason": "27000 is within 30000",
                    "motherValueFound": 15000,
                    "fatherValueFound": 12000,
                    "totalValueFound": 27000,
                    "incomeVerified": true
                },
                "gwaCheck": {
                    "passed": gwa_passed,
                    "valueFound": gwa,
                    "threshold": 3.0,
                    "reason": "compared against max_gwa"
                }
            },
            "disqualificationReasons": reasons,
            "confidenceScore": 90,
            "ocrQuality": "good",
            "notes": ""
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_income_mode_qualified() {
        let backend = ScriptedBackend::new(vec![Ok(response(2.5, true))]);
        let evaluator = AiEvaluator::new(backend.clone(), "stub-model");
        let ctx = income_ctx();

        let result = evaluator
            .evaluate(&ctx.combined_text, &rules(), Some(&ctx))
            .await
            .unwrap();

        assert!(result.qualified);
        assert_eq!(result.evaluation.income_check.total_value_found, Some(27000.0));
        assert_eq!(result.evaluation.income_check.income_verified, Some(true));

        let sent = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.model, "stub-model");
        assert!(sent.force_json);
        assert!((sent.temperature - 0.1).abs() < f32::EPSILON);
        assert!(sent.user_instruction.contains("Monthly income: PHP 15,000"));
    }

    #[tokio::test]
    async fn test_gwa_above_limit_not_qualified() {
        let backend = ScriptedBackend::new(vec![Ok(response(3.5, false))]);
        let evaluator = AiEvaluator::new(backend, "stub-model");
        let ctx = income_ctx();

        let result = evaluator
            .evaluate(&ctx.combined_text, &rules(), Some(&ctx))
            .await
            .unwrap();

        assert!(!result.qualified);
        assert!(!result.evaluation.gwa_check.passed);
        assert!(result
            .disqualification_reasons
            .iter()
            .any(|reason| reason.contains("GWA")));
    }

    #[tokio::test]
    async fn test_fenced_response_is_parse_error() {
        let fenced = format!("```json\n{}\n```", response(2.5, true));
        let backend = ScriptedBackend::new(vec![Ok(fenced)]);
        let evaluator =
            AiEvaluator::new(backend.clone(), "stub-model").with_retry(2, Duration::ZERO);

        let result = evaluator.evaluate("text", &rules(), None).await;
        assert!(matches!(
            result,
            Err(AppError::EvaluationParse(EvaluationParseError::InvalidJson { .. }))
        ));
        // 解析错误不重试
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_prose_response_is_parse_error() {
        let backend = ScriptedBackend::new(vec![Ok("The applicant qualifies.".to_string())]);
        let evaluator = AiEvaluator::new(backend, "stub-model");

        let result = evaluator.evaluate("text", &rules(), None).await;
        assert!(matches!(result, Err(AppError::EvaluationParse(_))));
    }

    #[tokio::test]
    async fn test_missing_income_verified_in_income_mode() {
        let mut value: serde_json::Value = serde_json::from_str(&response(2.5, true)).unwrap();
        value["evaluation"]["incomeCheck"]
            .as_object_mut()
            .unwrap()
            .remove("incomeVerified");
        let backend = ScriptedBackend::new(vec![Ok(value.to_string())]);
        let evaluator = AiEvaluator::new(backend, "stub-model");
        let ctx = income_ctx();

        let result = evaluator.evaluate(&ctx.combined_text, &rules(), Some(&ctx)).await;
        assert!(matches!(
            result,
            Err(AppError::EvaluationParse(EvaluationParseError::ConstraintViolated { .. }))
        ));
    }

    /// 两份收入证明都没有找到收入的响应
    fn no_income_response(passed: bool, verified: bool) -> String {
        let mut value: serde_json::Value = serde_json::from_str(&response(2.5, true)).unwrap();
        let check = &mut value["evaluation"]["incomeCheck"];
        check["passed"] = json!(passed);
        check["valueFound"] = json!(null);
        check["motherValueFound"] = json!(null);
        check["fatherValueFound"] = json!(null);
        check["totalValueFound"] = json!(null);
        check["incomeVerified"] = json!(verified);
        value["qualified"] = json!(passed);
        value.to_string()
    }

    #[tokio::test]
    async fn test_no_income_found_but_passed_is_rejected() {
        let backend = ScriptedBackend::new(vec![Ok(no_income_response(true, false))]);
        let evaluator = AiEvaluator::new(backend.clone(), "stub-model");
        let ctx = income_ctx();

        let result = evaluator.evaluate(&ctx.combined_text, &rules(), Some(&ctx)).await;
        assert!(matches!(
            result,
            Err(AppError::EvaluationParse(EvaluationParseError::ConstraintViolated { .. }))
        ));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_income_found_claimed_verified_is_rejected() {
        let backend = ScriptedBackend::new(vec![Ok(no_income_response(false, true))]);
        let evaluator = AiEvaluator::new(backend, "stub-model");
        let ctx = income_ctx();

        let result = evaluator.evaluate(&ctx.combined_text, &rules(), Some(&ctx)).await;
        assert!(matches!(result, Err(AppError::EvaluationParse(_))));
    }

    #[tokio::test]
    async fn test_no_income_found_fails_income_criterion() {
        let backend = ScriptedBackend::new(vec![Ok(no_income_response(false, false))]);
        let evaluator = AiEvaluator::new(backend, "stub-model");
        let ctx = income_ctx();

        let result = evaluator
            .evaluate(&ctx.combined_text, &rules(), Some(&ctx))
            .await
            .unwrap();
        assert!(!result.qualified);
        assert!(!result.evaluation.income_check.passed);
        assert_eq!(result.evaluation.income_check.income_verified, Some(false));
    }

    #[tokio::test]
    async fn test_transport_error_retried_then_succeeds() {
        let backend = ScriptedBackend::new(vec![
            Err(AppError::llm_api_failed("stub-model", "connection reset")),
            Ok(response(2.5, true)),
        ]);
        let evaluator =
            AiEvaluator::new(backend.clone(), "stub-model").with_retry(2, Duration::ZERO);

        let result = evaluator.evaluate("text", &rules(), None).await.unwrap();
        assert!(result.qualified);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_after_retries_exhausted() {
        let backend = ScriptedBackend::new(vec![
            Err(AppError::llm_api_failed("stub-model", "503")),
            Err(AppError::llm_api_failed("stub-model", "503")),
            Err(AppError::llm_api_failed("stub-model", "503")),
        ]);
        let evaluator =
            AiEvaluator::new(backend.clone(), "stub-model").with_retry(2, Duration::ZERO);

        let result = evaluator.evaluate("text", &rules(), None).await;
        assert!(matches!(
            result,
            Err(AppError::EvaluationEngine(EvaluationEngineError::ApiCallFailed { .. }))
        ));
        assert_eq!(backend.calls(), 3);
    }
}
