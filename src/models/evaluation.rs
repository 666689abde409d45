//! 评估结果模型
//!
//! 与评估引擎之间的 JSON 约定，字段名为 camelCase。
//! 必需字段缺失或类型不符时反序列化直接失败，不做部分接受。

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 文档识别质量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrQuality {
    Good,
    Fair,
    Poor,
}

/// 从文档中提取到的申请人信息（均可为空）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub applicant_name: Option<String>,
    pub mother_income: Option<f64>,
    pub father_income: Option<f64>,
    pub total_income: Option<f64>,
    pub gwa: Option<f64>,
    pub enrollment_status: Option<String>,
    pub school: Option<String>,
    pub course: Option<String>,
}

/// 单项标准的检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionCheck {
    pub passed: bool,
    pub value_found: Option<f64>,
    pub threshold: f64,
    pub reason: String,
}

/// 收入标准的检查结果，额外包含父母双方的收入核验信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeCheck {
    pub passed: bool,
    pub value_found: Option<f64>,
    pub threshold: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_value_found: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_value_found: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value_found: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaEvaluation {
    pub income_check: IncomeCheck,
    pub gwa_check: CriterionCheck,
}

/// 评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub qualified: bool,
    pub extracted_data: ExtractedData,
    pub evaluation: CriteriaEvaluation,
    pub disqualification_reasons: Vec<String>,
    pub confidence_score: u8,
    pub ocr_quality: OcrQuality,
    pub notes: String,
}

impl EvaluationResult {
    /// 收入与 GWA 两项是否都通过
    pub fn all_criteria_passed(&self) -> bool {
        self.evaluation.income_check.passed && self.evaluation.gwa_check.passed
    }

    /// 结构之外的约束检查
    ///
    /// # 参数
    /// - `income_verification`: 是否为收入核验模式（要求给出 `incomeVerified`）
    pub fn validate(&self, income_verification: bool) -> AppResult<()> {
        if self.confidence_score > 100 {
            return Err(AppError::constraint_violated(format!(
                "confidenceScore {} 超出范围 [0, 100]",
                self.confidence_score
            )));
        }

        if self.qualified != self.all_criteria_passed() {
            return Err(AppError::constraint_violated(format!(
                "qualified={} 与 incomeCheck.passed={} / gwaCheck.passed={} 不一致",
                self.qualified,
                self.evaluation.income_check.passed,
                self.evaluation.gwa_check.passed
            )));
        }

        if income_verification {
            self.validate_income_verification()?;
        }

        Ok(())
    }

    /// 收入核验模式下 incomeCheck 的自洽性
    fn validate_income_verification(&self) -> AppResult<()> {
        let check = &self.evaluation.income_check;

        let verified = check.income_verified.ok_or_else(|| {
            AppError::constraint_violated("收入核验模式下缺少 incomeCheck.incomeVerified")
        })?;

        if !verified && check.passed {
            return Err(AppError::constraint_violated(
                "incomeVerified=false 时 incomeCheck.passed 不能为 true",
            ));
        }

        // 两份证明都没有收入时必须判定为未核验
        let nothing_found =
            check.mother_value_found.is_none() && check.father_value_found.is_none();
        if nothing_found && verified {
            return Err(AppError::constraint_violated(
                "两份收入证明均未找到收入，incomeVerified 必须为 false",
            ));
        }

        Ok(())
    }
}
