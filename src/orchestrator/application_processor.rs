//! 单个申请处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理一份申请清单，是申请级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **清单校验**：清单 → `ProcessingRequest`
//! 2. **文档暂存**：原件归档到对象存储，副本放入暂存目录作为临时文件
//! 3. **流程调度**：委托 `ApplicationFlow` 处理
//! 4. **结果保存**：写出决策记录
//! 5. **错误输出**：日志记录完整错误，对外只给出概括信息

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult, ExtractionError};
use crate::infrastructure::{ObjectStore, RecordStore, TransientDocument};
use crate::models::{ApplicationManifest, Document, ProcessingOutcome, ProcessingRequest};
use crate::workflow::{ApplicationCtx, ApplicationFlow};

/// 处理一份申请所需的全部依赖
pub struct ApplicationProcessor<'a> {
    pub flow: &'a ApplicationFlow,
    pub object_store: &'a dyn ObjectStore,
    pub record_store: &'a dyn RecordStore,
    pub staging_folder: &'a Path,
}

impl ApplicationProcessor<'_> {
    /// 处理单个申请
    ///
    /// # 返回
    /// 返回是否成功处理；失败详情已写入日志
    pub async fn process(&self, manifest: &ApplicationManifest, index: usize) -> bool {
        let ctx = ApplicationCtx::new(&manifest.applicant_id);
        log_application_start(index, &ctx, manifest);

        match self.run(&ctx, manifest).await {
            Ok(location) => {
                info!("{} 💾 结果已保存: {}", ctx, location);
                true
            }
            Err(e) => {
                error!("{} ❌ 处理失败: {}", ctx, e);
                error!("{} 对外提示: {}", ctx, e.public_message());
                false
            }
        }
    }

    async fn run(&self, ctx: &ApplicationCtx, manifest: &ApplicationManifest) -> AppResult<String> {
        let request = manifest.to_request()?;
        let staged = self.stage_request(ctx, request).await?;

        // 删除责任交给流程
        let outcome = self
            .flow
            .process(ctx, staged.map(TransientDocument::release))
            .await?;

        match outcome {
            ProcessingOutcome::Extracted(text) => {
                self.record_store
                    .save_extracted_text(&ctx.applicant_id, &text)
                    .await
            }
            ProcessingOutcome::Evaluated(evaluation) => {
                self.record_store
                    .save(&ctx.applicant_id, &evaluation.to_record())
                    .await
            }
        }
    }

    /// 暂存请求中的全部文档
    ///
    /// 中途失败时，已暂存的临时文件随 guard 一起删除
    async fn stage_request(
        &self,
        ctx: &ApplicationCtx,
        request: ProcessingRequest<PathBuf>,
    ) -> AppResult<ProcessingRequest<TransientDocument>> {
        let staged = match request {
            ProcessingRequest::ExtractOnly { document } => ProcessingRequest::ExtractOnly {
                document: self.stage(ctx, &document).await?,
            },
            ProcessingRequest::Simple { document } => ProcessingRequest::Simple {
                document: self.stage(ctx, &document).await?,
            },
            ProcessingRequest::IncomeVerify {
                mother_document,
                father_document,
                report_document,
                mother_income,
                father_income,
            } => {
                let mother_document = self.stage(ctx, &mother_document).await?;
                let father_document = self.stage(ctx, &father_document).await?;
                let report_document = self.stage(ctx, &report_document).await?;
                ProcessingRequest::IncomeVerify {
                    mother_document,
                    father_document,
                    report_document,
                    mother_income,
                    father_income,
                }
            }
        };
        Ok(staged)
    }

    /// 暂存单个文档：校验 → 归档原件 → 复制到暂存目录
    async fn stage(&self, ctx: &ApplicationCtx, source: &Path) -> AppResult<TransientDocument> {
        let original = Document::from_path(source)
            .await
            .map_err(|e| read_failed(source, e))?;
        original.validate()?;

        let bytes = fs::read(source).await.map_err(|e| read_failed(source, e))?;

        let key = format!(
            "{}/{}/{}",
            sanitize(&ctx.applicant_id),
            ctx.request_id,
            sanitize(&original.display_name())
        );
        let url = self
            .object_store
            .put(&key, bytes.clone(), &original.mime_type)
            .await?;
        info!("{} 📦 原件已归档: {}", ctx, url);

        fs::create_dir_all(self.staging_folder)
            .await
            .map_err(|e| read_failed(self.staging_folder, e))?;

        let extension = original.extension().unwrap_or_default();
        let staged_path = self
            .staging_folder
            .join(format!("{}.{}", Uuid::new_v4(), extension));
        let staged = TransientDocument::new(Document::new(
            &staged_path,
            original.mime_type.clone(),
            original.size_bytes,
        ));

        fs::write(&staged_path, bytes)
            .await
            .map_err(|e| read_failed(&staged_path, e))?;

        Ok(staged)
    }
}

fn read_failed(path: &Path, source: std::io::Error) -> AppError {
    ExtractionError::ReadFailed {
        path: path.display().to_string(),
        source,
    }
    .into()
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

fn log_application_start(index: usize, ctx: &ApplicationCtx, manifest: &ApplicationManifest) {
    info!("\n{}", "=".repeat(60));
    info!("📄 [{}] {} 模式: {}", index, ctx, manifest.mode);
    if let Some(path) = &manifest.file_path {
        info!("📁 清单: {}", path.display());
    }
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key_segment() {
        assert_eq!(sanitize("report card.pdf"), "report_card.pdf");
        assert_eq!(sanitize("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize("..hidden"), "hidden");
    }
}
