//! 申请清单与处理请求
//!
//! `ApplicationManifest` 是调用方提交的松散输入；
//! 转换成 `ProcessingRequest` 时完成校验，之后不会出现"有收入没文档"之类的非法组合。

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ValidationError;
use crate::models::document::Document;

/// 处理请求（按模式区分）
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingRequest<D = Document> {
    /// 只提取文本，不加载规则也不评估
    ExtractOnly { document: D },
    /// 父母收入证明 + 成绩单，核对申报收入
    IncomeVerify {
        mother_document: D,
        father_document: D,
        report_document: D,
        mother_income: f64,
        father_income: f64,
    },
    /// 单个文档直接评估
    Simple { document: D },
}

impl<D> ProcessingRequest<D> {
    pub fn mode_name(&self) -> &'static str {
        match self {
            ProcessingRequest::ExtractOnly { .. } => "extract_only",
            ProcessingRequest::IncomeVerify { .. } => "income_verify",
            ProcessingRequest::Simple { .. } => "simple",
        }
    }

    /// 请求中的全部文档
    pub fn documents(&self) -> Vec<&D> {
        match self {
            ProcessingRequest::ExtractOnly { document }
            | ProcessingRequest::Simple { document } => vec![document],
            ProcessingRequest::IncomeVerify {
                mother_document,
                father_document,
                report_document,
                ..
            } => vec![mother_document, father_document, report_document],
        }
    }

    /// 转换文档类型，保持请求结构不变
    pub fn map<T>(self, mut f: impl FnMut(D) -> T) -> ProcessingRequest<T> {
        match self {
            ProcessingRequest::ExtractOnly { document } => ProcessingRequest::ExtractOnly {
                document: f(document),
            },
            ProcessingRequest::IncomeVerify {
                mother_document,
                father_document,
                report_document,
                mother_income,
                father_income,
            } => ProcessingRequest::IncomeVerify {
                mother_document: f(mother_document),
                father_document: f(father_document),
                report_document: f(report_document),
                mother_income,
                father_income,
            },
            ProcessingRequest::Simple { document } => ProcessingRequest::Simple {
                document: f(document),
            },
        }
    }
}

/// 清单中的处理模式，未知取值在反序列化时即被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    ExtractOnly,
    IncomeVerify,
    Simple,
}

impl ApplicationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationMode::ExtractOnly => "extract_only",
            ApplicationMode::IncomeVerify => "income_verify",
            ApplicationMode::Simple => "simple",
        }
    }
}

impl fmt::Display for ApplicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 申请清单（TOML）
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationManifest {
    pub applicant_id: String,
    pub mode: ApplicationMode,
    #[serde(default)]
    pub document: Option<PathBuf>,
    #[serde(default)]
    pub mother_certificate: Option<PathBuf>,
    #[serde(default)]
    pub father_certificate: Option<PathBuf>,
    #[serde(default)]
    pub report_card: Option<PathBuf>,
    #[serde(default)]
    pub mother_income: Option<f64>,
    #[serde(default)]
    pub father_income: Option<f64>,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl ApplicationManifest {
    /// 校验清单并转换为处理请求（文档仍为源文件路径）
    pub fn to_request(&self) -> Result<ProcessingRequest<PathBuf>, ValidationError> {
        match self.mode {
            ApplicationMode::ExtractOnly => Ok(ProcessingRequest::ExtractOnly {
                document: require_document(&self.document, "document")?,
            }),
            ApplicationMode::Simple => Ok(ProcessingRequest::Simple {
                document: require_document(&self.document, "document")?,
            }),
            ApplicationMode::IncomeVerify => Ok(ProcessingRequest::IncomeVerify {
                mother_document: require_document(&self.mother_certificate, "mother_certificate")?,
                father_document: require_document(&self.father_certificate, "father_certificate")?,
                report_document: require_document(&self.report_card, "report_card")?,
                mother_income: require_income(self.mother_income, "mother_income")?,
                father_income: require_income(self.father_income, "father_income")?,
            }),
        }
    }
}

fn require_document(path: &Option<PathBuf>, field: &str) -> Result<PathBuf, ValidationError> {
    path.clone()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| ValidationError::MissingDocument {
            field: field.to_string(),
        })
}

fn require_income(value: Option<f64>, field: &str) -> Result<f64, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::MissingIncome {
        field: field.to_string(),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidIncome {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}
