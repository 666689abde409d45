//! 对象存储 - 基础设施层
//!
//! 保存上传的原始文档，返回可访问的 URL

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{AppResult, PersistenceError};

/// 持久化对象存储
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 保存对象，返回其 URL
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String>;
}

/// 基于本地文件系统的对象存储
///
/// 对象写入 `root/key`，内容类型写入同名的 `.content-type` 文件
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(write_failed(
                key,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "非法的对象 key"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String> {
        let path = self.object_path(key)?;
        let location = path.display().to_string();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed(&location, e))?;
        }

        fs::write(&path, &bytes)
            .await
            .map_err(|e| write_failed(&location, e))?;

        let mut meta_path = path.clone().into_os_string();
        meta_path.push(".content-type");
        fs::write(&meta_path, content_type)
            .await
            .map_err(|e| write_failed(&location, e))?;

        debug!("对象已保存: {} ({} 字节, {})", key, bytes.len(), content_type);

        let absolute = fs::canonicalize(&path).await.unwrap_or(path);
        Ok(format!("file://{}", absolute.display()))
    }
}

fn write_failed(location: &str, source: std::io::Error) -> crate::error::AppError {
    PersistenceError::WriteFailed {
        location: location.to_string(),
        source,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_put_writes_object_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let url = store
            .put("A-001/report.txt", b"GWA 2.5".to_vec(), "text/plain")
            .await
            .unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with("report.txt"));
        let stored = std::fs::read_to_string(dir.path().join("A-001/report.txt")).unwrap();
        assert_eq!(stored, "GWA 2.5");
        let content_type =
            std::fs::read_to_string(dir.path().join("A-001/report.txt.content-type")).unwrap();
        assert_eq!(content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_put_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let result = store.put("../escape.txt", Vec::new(), "text/plain").await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }
}
