//! 上传文档模型
//!
//! 文档类型只由声明的 MIME 类型决定，不做内容嗅探

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ValidationError};

/// 单个文档大小上限（10 MiB）
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// 允许上传的扩展名
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf", "txt"];

/// 文档类型（决定使用哪种提取方式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// 纯文本
    PlainText,
    /// PDF（读取内嵌文本层）
    Pdf,
    /// 栅格图片（OCR）
    Image,
}

impl DocumentKind {
    /// 从 MIME 类型解析，忽略参数部分（如 `; charset=utf-8`）
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/plain" => Some(DocumentKind::PlainText),
            "application/pdf" => Some(DocumentKind::Pdf),
            "image/jpeg" | "image/jpg" | "image/png" => Some(DocumentKind::Image),
            _ => None,
        }
    }
}

/// 待处理的文档
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// 读取文件元数据，并按扩展名推断 MIME 类型
    pub async fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await?;
        let mime_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self {
            path,
            mime_type,
            size_bytes: metadata.len(),
        })
    }

    /// 文件名（用于日志）
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 小写扩展名
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }

    /// 按声明的 MIME 类型得到文档类型
    pub fn kind(&self) -> AppResult<DocumentKind> {
        DocumentKind::from_mime(&self.mime_type).ok_or_else(|| {
            AppError::unsupported_file_type(self.path.display().to_string(), &self.mime_type)
        })
    }

    /// 提取前的校验：扩展名、MIME 类型、大小
    pub fn validate(&self) -> AppResult<DocumentKind> {
        let extension_ok = self
            .extension()
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !extension_ok {
            return Err(AppError::unsupported_file_type(
                self.path.display().to_string(),
                &self.mime_type,
            ));
        }

        let kind = self.kind()?;

        if self.size_bytes > MAX_DOCUMENT_BYTES {
            return Err(ValidationError::FileTooLarge {
                path: self.path.display().to_string(),
                size_bytes: self.size_bytes,
                max_bytes: MAX_DOCUMENT_BYTES,
            }
            .into());
        }

        Ok(kind)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}
