//! 临时文档 - 基础设施层
//!
//! 持有一次请求中的临时文件，离开作用域时删除文件。
//! 正常返回、出错提前返回、超时或 future 被丢弃（取消）都会触发删除。

use std::ops::Deref;

use tracing::{debug, warn};

use crate::models::Document;

/// 临时文档
///
/// 职责：
/// - 独占一个临时文件
/// - Drop 时删除文件
/// - 不关心文件内容和处理流程
#[derive(Debug)]
pub struct TransientDocument {
    document: Document,
    armed: bool,
}

impl TransientDocument {
    /// 接管文档，之后由本对象负责删除
    pub fn new(document: Document) -> Self {
        Self {
            document,
            armed: true,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// 放弃删除责任，把文档交给下一个持有者
    pub fn release(mut self) -> Document {
        self.armed = false;
        std::mem::take(&mut self.document)
    }
}

impl Deref for TransientDocument {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.document
    }
}

impl Drop for TransientDocument {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        // Drop 中不能 await，同步删除
        match std::fs::remove_file(&self.document.path) {
            Ok(()) => debug!("🗑️ 临时文件已删除: {}", self.document.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("临时文件已不存在: {}", self.document.path.display())
            }
            Err(e) => warn!(
                "⚠️ 无法删除临时文件 {}: {}",
                self.document.path.display(),
                e
            ),
        }
    }
}
