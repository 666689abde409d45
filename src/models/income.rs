//! 收入核验上下文

use serde::Serialize;

pub const MOTHER_CERTIFICATE_LABEL: &str = "=== MOTHER'S INCOME CERTIFICATE ===";
pub const FATHER_CERTIFICATE_LABEL: &str = "=== FATHER'S INCOME CERTIFICATE ===";
pub const REPORT_CARD_LABEL: &str = "=== REPORT CARD ===";

/// 收入核验模式下交给评估引擎的全部上下文
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeVerificationContext {
    pub mother_income: f64,
    pub father_income: f64,
    pub mother_text: String,
    pub father_text: String,
    pub report_text: String,
    pub combined_text: String,
}

impl IncomeVerificationContext {
    pub fn new(
        mother_income: f64,
        father_income: f64,
        mother_text: String,
        father_text: String,
        report_text: String,
    ) -> Self {
        let combined_text = combine_texts(&mother_text, &father_text, &report_text);
        Self {
            mother_income,
            father_income,
            mother_text,
            father_text,
            report_text,
            combined_text,
        }
    }

    /// 申报的家庭月收入合计
    pub fn declared_total(&self) -> f64 {
        self.mother_income + self.father_income
    }
}

/// 按固定顺序（母亲、父亲、成绩单）拼接带标签的文本
pub fn combine_texts(mother_text: &str, father_text: &str, report_text: &str) -> String {
    format!(
        "{}\n{}\n\n{}\n{}\n\n{}\n{}",
        MOTHER_CERTIFICATE_LABEL,
        mother_text,
        FATHER_CERTIFICATE_LABEL,
        father_text,
        REPORT_CARD_LABEL,
        report_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_text_order_and_labels() {
        let ctx = IncomeVerificationContext::new(
            15000.0,
            12000.0,
            "mother says 15000".to_string(),
            "father says 12000".to_string(),
            "GWA 2.5".to_string(),
        );

        assert_eq!(
            ctx.combined_text,
            "=== MOTHER'S INCOME CERTIFICATE ===\nmother says 15000\n\n\
             === FATHER'S INCOME CERTIFICATE ===\nfather says 12000\n\n\
             === REPORT CARD ===\nGWA 2.5"
        );
        assert_eq!(ctx.declared_total(), 27000.0);
    }

    #[test]
    fn test_combined_text_keeps_empty_sections() {
        let combined = combine_texts("", "", "");
        let mother = combined.find(MOTHER_CERTIFICATE_LABEL).unwrap();
        let father = combined.find(FATHER_CERTIFICATE_LABEL).unwrap();
        let report = combined.find(REPORT_CARD_LABEL).unwrap();
        assert!(mother < father && father < report);
    }
}
