//! 文本提取服务 - 业务能力层
//!
//! 只负责"把一个文档变成纯文本"，不关心流程
//!
//! ## 技术栈
//! - 纯文本：直接按 UTF-8 解码
//! - PDF：`pdf-extract` 读取内嵌文本层（扫描件可能得到空文本，不算错误）
//! - 图片：`rusty-tesseract` 调用 tesseract 做 OCR

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusty_tesseract::{Args, Image};
use tokio::fs;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppResult, ExtractionError};
use crate::models::{Document, DocumentKind};

/// 文档提取能力
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// 提取文档中的全部文本（已去除首尾空白）
    async fn extract(&self, document: &Document) -> AppResult<String>;
}

/// 文本提取服务
///
/// 职责：
/// - 按声明的 MIME 类型选择提取方式
/// - 各方式之间不回退
/// - 只处理单个文档
pub struct TextExtractor {
    ocr_language: String,
}

impl TextExtractor {
    pub fn new(config: &Config) -> Self {
        Self::with_language(config.ocr_language.clone())
    }

    pub fn with_language(ocr_language: impl Into<String>) -> Self {
        Self {
            ocr_language: ocr_language.into(),
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::with_language("eng")
    }
}

#[async_trait]
impl DocumentExtractor for TextExtractor {
    async fn extract(&self, document: &Document) -> AppResult<String> {
        let kind = document.kind()?;
        debug!("提取文本: {} ({:?})", document.display_name(), kind);

        let text = match kind {
            DocumentKind::PlainText => read_plain_text(&document.path).await?,
            DocumentKind::Pdf => extract_pdf_text(&document.path).await?,
            DocumentKind::Image => recognize_image(&document.path, &self.ocr_language).await?,
        };

        let text = text.trim().to_string();
        debug!(
            "提取完成: {} ({} 字符)",
            document.display_name(),
            text.chars().count()
        );
        Ok(text)
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, ExtractionError> {
    fs::read(path)
        .await
        .map_err(|source| ExtractionError::ReadFailed {
            path: path.display().to_string(),
            source,
        })
}

async fn read_plain_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = read_bytes(path).await?;
    String::from_utf8(bytes).map_err(|source| ExtractionError::InvalidEncoding {
        path: path.display().to_string(),
        source,
    })
}

async fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = read_bytes(path).await?;
    let display = path.display().to_string();

    // 解析 PDF 是阻塞操作，解析器 panic 时也只影响这一个文档
    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractionError::PdfFailed {
            path: display.clone(),
            message: e.to_string(),
        })?;

    joined.map_err(|e| ExtractionError::PdfFailed {
        path: display,
        message: e.to_string(),
    })
}

async fn recognize_image(path: &Path, language: &str) -> Result<String, ExtractionError> {
    // 先确认文件可读，错误信息与其他类型保持一致
    fs::metadata(path)
        .await
        .map_err(|source| ExtractionError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

    let image_path: PathBuf = path.to_path_buf();
    let display = path.display().to_string();
    let args = Args {
        lang: language.to_string(),
        ..Args::default()
    };

    let joined = tokio::task::spawn_blocking(move || {
        let image = Image::from_path(image_path).map_err(|e| e.to_string())?;
        rusty_tesseract::image_to_string(&image, &args).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| ExtractionError::OcrFailed {
        path: display.clone(),
        message: e.to_string(),
    })?;

    joined.map_err(|message| ExtractionError::OcrFailed {
        path: display,
        message,
    })
}
