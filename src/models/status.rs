use serde::{Deserialize, Serialize};

/// 申请的流转状态（由评估结果派生）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Qualified,
    Disqualified,
    ManualReview,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Qualified => "qualified",
            ApplicationStatus::Disqualified => "disqualified",
            ApplicationStatus::ManualReview => "manual_review",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
