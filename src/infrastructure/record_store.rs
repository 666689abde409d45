//! 决策记录存储 - 基础设施层

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{AppResult, PersistenceError};
use crate::models::DecisionRecord;

/// 决策记录存储
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 保存记录，返回保存位置
    async fn save(&self, applicant_id: &str, record: &DecisionRecord) -> AppResult<String>;

    /// 保存仅提取模式得到的文本，返回保存位置
    async fn save_extracted_text(&self, applicant_id: &str, text: &str) -> AppResult<String>;
}

/// 以文件保存决策记录，每个申请人一个文件
pub struct JsonFileRecordStore {
    folder: PathBuf,
}

impl JsonFileRecordStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    fn file_path(&self, applicant_id: &str, extension: &str) -> PathBuf {
        let file_name: String = applicant_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.folder.join(format!("{}.{}", file_name, extension))
    }

    async fn write(&self, path: &Path, contents: String) -> AppResult<String> {
        let location = path.display().to_string();

        fs::create_dir_all(&self.folder)
            .await
            .map_err(|source| PersistenceError::WriteFailed {
                location: location.clone(),
                source,
            })?;

        fs::write(path, contents)
            .await
            .map_err(|source| PersistenceError::WriteFailed {
                location: location.clone(),
                source,
            })?;

        Ok(location)
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn save(&self, applicant_id: &str, record: &DecisionRecord) -> AppResult<String> {
        let path = self.file_path(applicant_id, "json");

        let json = serde_json::to_string_pretty(record).map_err(|source| {
            PersistenceError::SerializeFailed {
                location: path.display().to_string(),
                source,
            }
        })?;

        self.write(&path, json).await
    }

    async fn save_extracted_text(&self, applicant_id: &str, text: &str) -> AppResult<String> {
        let path = self.file_path(applicant_id, "txt");
        self.write(&path, text.to_string()).await
    }
}
