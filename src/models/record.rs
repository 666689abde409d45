//! 决策记录
//!
//! 流水线的最终产物，交给外部存储持久化

use serde::{Deserialize, Serialize};

use crate::models::evaluation::EvaluationResult;
use crate::models::status::ApplicationStatus;

/// 一次评估的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: EvaluationResult,
    pub status: ApplicationStatus,
    /// 评估所依据的文本（收入核验模式下为拼接后的文本）
    pub extracted_text: String,
    pub mother_income: Option<f64>,
    pub father_income: Option<f64>,
}

impl Evaluation {
    pub fn to_record(&self) -> DecisionRecord {
        DecisionRecord {
            mother_income: self.mother_income,
            father_income: self.father_income,
            extracted_text: self.extracted_text.clone(),
            evaluation_result: self.result.clone(),
            qualified: self.result.qualified,
            confidence_score: self.result.confidence_score,
            status: self.status,
        }
    }
}

/// 流水线的输出
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    /// 仅提取文本
    Extracted(String),
    /// 完成评估
    Evaluated(Box<Evaluation>),
}

/// 持久化的决策记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub mother_income: Option<f64>,
    pub father_income: Option<f64>,
    pub extracted_text: String,
    pub evaluation_result: EvaluationResult,
    pub qualified: bool,
    pub confidence_score: u8,
    pub status: ApplicationStatus,
}
