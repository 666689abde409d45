//! 评估引擎 - 业务能力层
//!
//! 两种实现可互换：
//! - [`MockEvaluator`]：离线、确定性，用于测试和演示
//! - [`AiEvaluator`]：调用外部推理服务

use std::sync::Arc;

use async_trait::async_trait;

use crate::clients::LlmClient;
use crate::config::{Config, EvaluatorKind};
use crate::error::AppResult;
use crate::models::{EvaluationResult, IncomeVerificationContext, RuleSet};
use crate::services::{AiEvaluator, MockEvaluator};

/// 评估能力
#[async_trait]
pub trait EvaluationEngine: Send + Sync {
    /// 根据文本与规则给出评估结果
    ///
    /// # 参数
    /// - `text`: 评估所依据的文本（收入核验模式下为拼接后的文本）
    /// - `rules`: 本次请求读取到的资格规则
    /// - `income`: 收入核验上下文，仅在收入核验模式下提供
    async fn evaluate(
        &self,
        text: &str,
        rules: &RuleSet,
        income: Option<&IncomeVerificationContext>,
    ) -> AppResult<EvaluationResult>;
}

/// 按配置选择评估引擎
pub fn build_engine(config: &Config) -> AppResult<Arc<dyn EvaluationEngine>> {
    let engine: Arc<dyn EvaluationEngine> = match config.evaluator {
        EvaluatorKind::Mock => Arc::new(MockEvaluator),
        EvaluatorKind::Ai => {
            config.validate()?;
            let backend = Arc::new(LlmClient::new(config));
            Arc::new(AiEvaluator::from_config(backend, config))
        }
    };
    Ok(engine)
}
