//! 离线评估引擎
//!
//! 不看文本内容，始终给出同一组提取值，只根据规则阈值判断是否通过。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::rules::format_number;
use crate::models::{
    CriteriaEvaluation, CriterionCheck, EvaluationResult, ExtractedData, IncomeCheck,
    IncomeVerificationContext, OcrQuality, RuleSet, Thresholds,
};
use crate::services::EvaluationEngine;

const MOCK_MOTHER_INCOME: f64 = 12000.0;
const MOCK_FATHER_INCOME: f64 = 13000.0;
const MOCK_GWA: f64 = 2.5;
const MOCK_CONFIDENCE: u8 = 95;

/// 确定性评估引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct MockEvaluator;

impl MockEvaluator {
    /// 同步版本，方便在非异步上下文中使用
    pub fn evaluate_rules(
        &self,
        rules: &RuleSet,
        income: Option<&IncomeVerificationContext>,
    ) -> EvaluationResult {
        let thresholds = Thresholds::resolve(rules);
        let total = MOCK_MOTHER_INCOME + MOCK_FATHER_INCOME;

        let income_passed = total <= thresholds.max_monthly_income;
        let gwa_passed = MOCK_GWA <= thresholds.max_gwa;

        let income_reason = if income_passed {
            format!(
                "Total monthly income {} is within the limit of {}",
                format_number(total),
                format_number(thresholds.max_monthly_income)
            )
        } else {
            format!(
                "Total monthly income {} exceeds the limit of {}",
                format_number(total),
                format_number(thresholds.max_monthly_income)
            )
        };
        let gwa_reason = if gwa_passed {
            format!(
                "GWA {} meets the maximum of {}",
                format_number(MOCK_GWA),
                format_number(thresholds.max_gwa)
            )
        } else {
            format!(
                "GWA {} is above the maximum of {}",
                format_number(MOCK_GWA),
                format_number(thresholds.max_gwa)
            )
        };

        let mut disqualification_reasons = Vec::new();
        if !income_passed {
            disqualification_reasons.push(income_reason.clone());
        }
        if !gwa_passed {
            disqualification_reasons.push(gwa_reason.clone());
        }

        let income_verified = income.map(|_| true);

        EvaluationResult {
            qualified: income_passed && gwa_passed,
            extracted_data: ExtractedData {
                applicant_name: Some("Mock Applicant".to_string()),
                mother_income: Some(MOCK_MOTHER_INCOME),
                father_income: Some(MOCK_FATHER_INCOME),
                total_income: Some(total),
                gwa: Some(MOCK_GWA),
                enrollment_status: Some("Enrolled".to_string()),
                school: None,
                course: None,
            },
            evaluation: CriteriaEvaluation {
                income_check: IncomeCheck {
                    passed: income_passed,
                    value_found: Some(total),
                    threshold: thresholds.max_monthly_income,
                    reason: income_reason,
                    mother_value_found: income.map(|_| MOCK_MOTHER_INCOME),
                    father_value_found: income.map(|_| MOCK_FATHER_INCOME),
                    total_value_found: income.map(|_| total),
                    income_verified,
                },
                gwa_check: CriterionCheck {
                    passed: gwa_passed,
                    value_found: Some(MOCK_GWA),
                    threshold: thresholds.max_gwa,
                    reason: gwa_reason,
                },
            },
            disqualification_reasons,
            confidence_score: MOCK_CONFIDENCE,
            ocr_quality: OcrQuality::Good,
            notes: "Deterministic evaluation; document text was not inspected.".to_string(),
        }
    }
}

#[async_trait]
impl EvaluationEngine for MockEvaluator {
    async fn evaluate(
        &self,
        _text: &str,
        rules: &RuleSet,
        income: Option<&IncomeVerificationContext>,
    ) -> AppResult<EvaluationResult> {
        Ok(self.evaluate_rules(rules, income))
    }
}
