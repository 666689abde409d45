//! 评估结果 → 申请状态

use crate::models::{ApplicationStatus, EvaluationResult};

/// 低于该置信度的结果一律转人工复核
pub const CONFIDENCE_THRESHOLD: u8 = 60;

/// 根据评估结果确定申请状态
///
/// 置信度不足时优先转人工复核，不看 `qualified`
pub fn classify(result: &EvaluationResult) -> ApplicationStatus {
    if result.confidence_score < CONFIDENCE_THRESHOLD {
        ApplicationStatus::ManualReview
    } else if result.qualified {
        ApplicationStatus::Qualified
    } else {
        ApplicationStatus::Disqualified
    }
}
