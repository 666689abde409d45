//! 申请处理流程 - 流程层
//!
//! 核心职责：定义"一份申请"的完整处理流程
//!
//! 流程顺序：
//! 1. 接管全部临时文档（任何退出路径都会删除）
//! 2. 校验全部文档
//! 3. 并发：文本提取 ∥ 规则加载（仅提取模式不加载规则）
//! 4. 评估 → 分类

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppResult, EvaluationEngineError, ExtractionError};
use crate::infrastructure::TransientDocument;
use crate::models::{
    Document, Evaluation, EvaluationResult, IncomeVerificationContext, ProcessingOutcome,
    ProcessingRequest, RuleSet,
};
use crate::services::{
    build_engine, classify, DocumentExtractor, EvaluationEngine, RuleRepository, TextExtractor,
    TomlRuleRepository,
};
use crate::utils::truncate_text;
use crate::workflow::application_ctx::ApplicationCtx;

/// 申请处理流程
///
/// - 编排单个申请的处理流程
/// - 不持有请求之间的可变状态
/// - 只依赖业务能力（services）
pub struct ApplicationFlow {
    extractor: Arc<dyn DocumentExtractor>,
    rules: Arc<dyn RuleRepository>,
    engine: Arc<dyn EvaluationEngine>,
    extraction_timeout: Duration,
    evaluation_timeout: Duration,
}

impl ApplicationFlow {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        rules: Arc<dyn RuleRepository>,
        engine: Arc<dyn EvaluationEngine>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            extractor,
            rules,
            engine,
            extraction_timeout: defaults.extraction_timeout(),
            evaluation_timeout: defaults.evaluation_timeout(),
        }
    }

    /// 按配置组装全部能力
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let flow = Self::new(
            Arc::new(TextExtractor::new(config)),
            Arc::new(TomlRuleRepository::from_config(config)),
            build_engine(config)?,
        )
        .with_timeouts(config.extraction_timeout(), config.evaluation_timeout());
        Ok(flow)
    }

    pub fn with_timeouts(mut self, extraction: Duration, evaluation: Duration) -> Self {
        self.extraction_timeout = extraction;
        self.evaluation_timeout = evaluation;
        self
    }

    /// 处理一份申请
    ///
    /// 传入的文档都是临时文件，本方法返回（或 future 被丢弃）时全部删除
    pub async fn process(
        &self,
        ctx: &ApplicationCtx,
        request: ProcessingRequest,
    ) -> AppResult<ProcessingOutcome> {
        let request = request.map(TransientDocument::new);

        info!("{} 📋 开始处理，模式: {}", ctx, request.mode_name());

        for document in request.documents() {
            document.validate()?;
        }
        debug!("{} ✓ {} 个文档校验通过", ctx, request.documents().len());

        match request {
            ProcessingRequest::ExtractOnly { document } => {
                let text = self.extract(ctx, &document).await?;
                info!("{} ✓ 文本提取完成 ({} 字符)", ctx, text.chars().count());
                Ok(ProcessingOutcome::Extracted(text))
            }

            ProcessingRequest::Simple { document } => {
                let (text, rules) =
                    tokio::try_join!(self.extract(ctx, &document), self.load_rules(ctx))?;

                let result = self.evaluate(ctx, &text, &rules, None).await?;
                Ok(self.finish(ctx, result, text, None, None))
            }

            ProcessingRequest::IncomeVerify {
                mother_document,
                father_document,
                report_document,
                mother_income,
                father_income,
            } => {
                let (mother_text, father_text, report_text, rules) = tokio::try_join!(
                    self.extract(ctx, &mother_document),
                    self.extract(ctx, &father_document),
                    self.extract(ctx, &report_document),
                    self.load_rules(ctx),
                )?;

                let income = IncomeVerificationContext::new(
                    mother_income,
                    father_income,
                    mother_text,
                    father_text,
                    report_text,
                );

                let result = self
                    .evaluate(ctx, &income.combined_text, &rules, Some(&income))
                    .await?;
                Ok(self.finish(
                    ctx,
                    result,
                    income.combined_text,
                    Some(mother_income),
                    Some(father_income),
                ))
            }
        }
    }

    async fn extract(&self, ctx: &ApplicationCtx, document: &Document) -> AppResult<String> {
        debug!("{} 🔍 提取: {}", ctx, document.display_name());

        let text = time::timeout(self.extraction_timeout, self.extractor.extract(document))
            .await
            .map_err(|_| ExtractionError::Timeout {
                path: document.display_name(),
                seconds: self.extraction_timeout.as_secs(),
            })??;

        debug!(
            "{} 文本预览 [{}]: {}",
            ctx,
            document.display_name(),
            truncate_text(&text, 80)
        );
        Ok(text)
    }

    async fn load_rules(&self, ctx: &ApplicationCtx) -> AppResult<RuleSet> {
        let rules = self.rules.load_all().await?;
        debug!("{} ✓ 规则加载完成 ({} 条)", ctx, rules.len());
        Ok(rules)
    }

    async fn evaluate(
        &self,
        ctx: &ApplicationCtx,
        text: &str,
        rules: &RuleSet,
        income: Option<&IncomeVerificationContext>,
    ) -> AppResult<EvaluationResult> {
        info!("{} 🤖 开始评估 ({} 字符)", ctx, text.chars().count());

        let result = time::timeout(
            self.evaluation_timeout,
            self.engine.evaluate(text, rules, income),
        )
        .await
        .map_err(|_| EvaluationEngineError::Timeout {
            seconds: self.evaluation_timeout.as_secs(),
        })??;

        Ok(result)
    }

    fn finish(
        &self,
        ctx: &ApplicationCtx,
        result: EvaluationResult,
        extracted_text: String,
        mother_income: Option<f64>,
        father_income: Option<f64>,
    ) -> ProcessingOutcome {
        let status = classify(&result);
        info!(
            "{} ✅ 评估完成: qualified={} 置信度={} 状态={}",
            ctx, result.qualified, result.confidence_score, status
        );

        ProcessingOutcome::Evaluated(Box::new(Evaluation {
            result,
            status,
            extracted_text,
            mother_income,
            father_income,
        }))
    }
}
