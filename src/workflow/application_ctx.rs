//! 申请处理上下文
//!
//! 封装"我正在处理哪一份申请"这一信息

use std::fmt::Display;

use uuid::Uuid;

/// 申请处理上下文
#[derive(Debug, Clone)]
pub struct ApplicationCtx {
    /// 本次请求的唯一标识
    pub request_id: Uuid,

    /// 申请人ID
    pub applicant_id: String,
}

impl ApplicationCtx {
    pub fn new(applicant_id: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            applicant_id: applicant_id.into(),
        }
    }

    /// 请求ID的前 8 位，用于日志
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string()[..8].to_string()
    }
}

impl Display for ApplicationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[申请 {} 请求#{}]",
            self.applicant_id,
            self.short_id()
        )
    }
}
