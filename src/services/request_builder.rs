//! 评估请求构建 - 业务能力层
//!
//! 把提取的文本、资格规则和（可选的）收入核验信息组合成交给评估引擎的指令，
//! 同时给出引擎必须遵守的输出结构。

use serde_json::{json, Value as JsonValue};

use crate::models::rules::{format_number, MAX_GWA_KEY, MAX_MONTHLY_INCOME_KEY};
use crate::models::{IncomeVerificationContext, RuleSet, Thresholds};

/// 固定的系统指令
pub const SYSTEM_INSTRUCTION: &str = "You are a scholarship eligibility evaluator. \
You read OCR-extracted text from applicant documents and decide whether the applicant \
meets the qualification rules. Respond with valid JSON only.";

/// 交给评估引擎的完整请求
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub system_instruction: String,
    pub user_instruction: String,
    pub schema: JsonValue,
}

/// 评估请求构建器
pub struct EvaluationRequestBuilder;

impl EvaluationRequestBuilder {
    /// 构建评估请求
    ///
    /// # 参数
    /// - `text`: 单文档模式下的文档文本
    /// - `rules`: 资格规则
    /// - `income`: 收入核验上下文；提供时以成绩单文本作为 GWA 依据，并附加核验说明
    pub fn build(
        text: &str,
        rules: &RuleSet,
        income: Option<&IncomeVerificationContext>,
    ) -> EvaluationRequest {
        let thresholds = Thresholds::resolve(rules);
        let schema = Self::output_schema();

        let primary = match income {
            Some(ctx) => format!(
                "REPORT CARD TEXT (use this for the GWA criterion):\n\
                 ---BEGIN REPORT CARD---\n{}\n---END REPORT CARD---",
                ctx.report_text
            ),
            None => format!(
                "DOCUMENT TEXT TO ANALYZE:\n---BEGIN DOCUMENT---\n{}\n---END DOCUMENT---",
                text
            ),
        };

        let verification = income
            .map(|ctx| format!("\n\n{}", Self::income_section(ctx, &thresholds)))
            .unwrap_or_default();

        let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_default();

        let user_instruction = format!(
            r#"Evaluate this scholarship application against the qualification rules below.

QUALIFICATION RULES:
{rules}

{grading_note}

{primary}{verification}

EVALUATION STEPS:
1. Extract the applicant's details (name, parents' monthly incomes, GWA, enrollment status, school, course). Use null for anything not present in the text.
2. incomeCheck: compare the total monthly household income against {income_key} ({max_income}). It passes when the total is less than or equal to the threshold.
3. gwaCheck: compare the GWA against {gwa_key} ({max_gwa}). It passes when the GWA is less than or equal to the threshold.
4. qualified is true only when both incomeCheck.passed and gwaCheck.passed are true.
5. List every failed criterion in disqualificationReasons, one short sentence each.
6. confidenceScore is an integer from 0 to 100 expressing how certain you are about the extracted facts and the decision. Lower it when the text is garbled, incomplete or contradictory.
7. ocrQuality is "good", "fair" or "poor" depending on how readable the text is.

OUTPUT FORMAT:
Respond with exactly one JSON object matching this JSON schema. Do not add any prose, explanation or markdown code fences.
{schema_json}"#,
            rules = Self::render_rules(rules),
            grading_note = Self::grading_note(&thresholds),
            primary = primary,
            verification = verification,
            income_key = MAX_MONTHLY_INCOME_KEY,
            max_income = format_number(thresholds.max_monthly_income),
            gwa_key = MAX_GWA_KEY,
            max_gwa = format_number(thresholds.max_gwa),
            schema_json = schema_json,
        );

        EvaluationRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            user_instruction,
            schema,
        }
    }

    /// 每条规则渲染为一行 `key: value`
    fn render_rules(rules: &RuleSet) -> String {
        if rules.is_empty() {
            return "(no rules configured; use the default thresholds stated below)".to_string();
        }
        rules
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// GWA 反向计分说明
    fn grading_note(thresholds: &Thresholds) -> String {
        format!(
            "IMPORTANT GRADING NOTE: The GWA (General Weighted Average) scale is inverted. \
             1.0 is the best possible grade and 5.0 is failing, so a LOWER GWA is BETTER. \
             {} ({}) is the MAXIMUM passing GWA, not a minimum: a GWA of {} or lower passes, \
             a higher GWA fails.",
            MAX_GWA_KEY,
            format_number(thresholds.max_gwa),
            format_number(thresholds.max_gwa)
        )
    }

    /// 收入核验说明
    fn income_section(ctx: &IncomeVerificationContext, thresholds: &Thresholds) -> String {
        format!(
            r#"INCOME VERIFICATION:
The applicant declared the following monthly incomes:
- Mother's declared monthly income: {mother}
- Father's declared monthly income: {father}
- Declared total monthly household income: {total}

---BEGIN MOTHER'S INCOME CERTIFICATE---
{mother_text}
---END MOTHER'S INCOME CERTIFICATE---

---BEGIN FATHER'S INCOME CERTIFICATE---
{father_text}
---END FATHER'S INCOME CERTIFICATE---

INCOME VERIFICATION RULES:
1. Extract the numeric monthly income stated in each certificate and report it as incomeCheck.motherValueFound and incomeCheck.fatherValueFound.
2. If the income cannot be found in a certificate, its value is null.
3. incomeCheck.totalValueFound is the sum of the values found; incomeCheck.valueFound equals totalValueFound.
4. If BOTH certificates yield no income, incomeCheck.passed must be false and incomeCheck.incomeVerified must be false.
5. Otherwise incomeCheck.incomeVerified is true, and incomeCheck.passed is true when totalValueFound is less than or equal to {income_key} ({max_income}).
6. Mention any discrepancy between the declared and the certified incomes in notes."#,
            mother = format_number(ctx.mother_income),
            father = format_number(ctx.father_income),
            total = format_number(ctx.declared_total()),
            mother_text = ctx.mother_text,
            father_text = ctx.father_text,
            income_key = MAX_MONTHLY_INCOME_KEY,
            max_income = format_number(thresholds.max_monthly_income),
        )
    }

    /// 评估结果的 JSON Schema
    pub fn output_schema() -> JsonValue {
        let nullable_number = json!({ "type": ["number", "null"] });
        let nullable_string = json!({ "type": ["string", "null"] });
        let criterion = json!({
            "type": "object",
            "required": ["passed", "valueFound", "threshold", "reason"],
            "properties": {
                "passed": { "type": "boolean" },
                "valueFound": nullable_number,
                "threshold": { "type": "number" },
                "reason": { "type": "string" }
            }
        });
        let mut income_check = criterion.clone();
        income_check["properties"]["motherValueFound"] = nullable_number.clone();
        income_check["properties"]["fatherValueFound"] = nullable_number.clone();
        income_check["properties"]["totalValueFound"] = nullable_number.clone();
        income_check["properties"]["incomeVerified"] = json!({ "type": "boolean" });

        json!({
            "type": "object",
            "required": [
                "qualified", "extractedData", "evaluation", "disqualificationReasons",
                "confidenceScore", "ocrQuality", "notes"
            ],
            "properties": {
                "qualified": { "type": "boolean" },
                "extractedData": {
                    "type": "object",
                    "properties": {
                        "applicantName": nullable_string,
                        "motherIncome": nullable_number,
                        "fatherIncome": nullable_number,
                        "totalIncome": nullable_number,
                        "gwa": nullable_number,
                        "enrollmentStatus": nullable_string,
                        "school": nullable_string,
                        "course": nullable_string
                    }
                },
                "evaluation": {
                    "type": "object",
                    "required": ["incomeCheck", "gwaCheck"],
                    "properties": {
                        "incomeCheck": income_check,
                        "gwaCheck": criterion
                    }
                },
                "disqualificationReasons": { "type": "array", "items": { "type": "string" } },
                "confidenceScore": { "type": "integer", "minimum": 0, "maximum": 100 },
                "ocrQuality": { "type": "string", "enum": ["good", "fair", "poor"] },
                "notes": { "type": "string" }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        [(MAX_MONTHLY_INCOME_KEY, "30000"), (MAX_GWA_KEY, "3.0"), ("program", "merit")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_rules_rendered_as_key_value_lines() {
        let request = EvaluationRequestBuilder::build("text", &rules(), None);
        assert!(request.user_instruction.contains("max_monthly_income: 30000\n"));
        assert!(request.user_instruction.contains("max_gwa: 3.0\n"));
        assert!(request.user_instruction.contains("program: merit"));
    }

    #[test]
    fn test_grading_note_always_present() {
        let request = EvaluationRequestBuilder::build("text", &rules(), None);
        assert!(request.user_instruction.contains("LOWER GWA is BETTER"));
        assert!(request.user_instruction.contains("MAXIMUM passing GWA, not a minimum"));
    }

    #[test]
    fn test_simple_mode_embeds_document_without_verification() {
        let request = EvaluationRequestBuilder::build("GWA: 1.75 / Juan", &rules(), None);
        assert!(request.user_instruction.contains("GWA: 1.75 / Juan"));
        assert!(!request.user_instruction.contains("INCOME VERIFICATION"));
        assert_eq!(request.system_instruction, SYSTEM_INSTRUCTION);
        assert!(request.system_instruction.contains("Respond with valid JSON only."));
    }

    #[test]
    fn test_income_mode_embeds_certificates_and_declared_incomes() {
        let ctx = IncomeVerificationContext::new(
            15000.0,
            12000.0,
            "Certificate: mother earns PHP 15,000".to_string(),
            "Certificate: father earns PHP 12,000".to_string(),
            "Final GWA 2.5".to_string(),
        );
        let request = EvaluationRequestBuilder::build(&ctx.combined_text, &rules(), Some(&ctx));
        let text = &request.user_instruction;

        assert!(text.contains("Mother's declared monthly income: 15000"));
        assert!(text.contains("Father's declared monthly income: 12000"));
        assert!(text.contains("Declared total monthly household income: 27000"));
        assert!(text.contains(
            "---BEGIN MOTHER'S INCOME CERTIFICATE---\nCertificate: mother earns PHP 15,000\n\
             ---END MOTHER'S INCOME CERTIFICATE---"
        ));
        assert!(text.contains(
            "---BEGIN FATHER'S INCOME CERTIFICATE---\nCertificate: father earns PHP 12,000\n\
             ---END FATHER'S INCOME CERTIFICATE---"
        ));
        assert!(text.contains("---BEGIN REPORT CARD---\nFinal GWA 2.5\n---END REPORT CARD---"));
        assert!(text.contains("If BOTH certificates yield no income"));
        assert!(text.contains("incomeVerified must be false"));
    }

    #[test]
    fn test_defaults_used_when_rules_missing() {
        let request = EvaluationRequestBuilder::build("text", &RuleSet::new(), None);
        assert!(request.user_instruction.contains("max_monthly_income (30000)"));
        assert!(request.user_instruction.contains("max_gwa (3)"));
    }

    #[test]
    fn test_thresholds_rendered_without_rounding() {
        let rules: RuleSet = [(MAX_GWA_KEY, "2.125"), (MAX_MONTHLY_INCOME_KEY, "25000.75")]
            .into_iter()
            .collect();
        let ctx = IncomeVerificationContext::new(
            15000.555,
            10000.0,
            "mother".to_string(),
            "father".to_string(),
            "report".to_string(),
        );
        let request = EvaluationRequestBuilder::build(&ctx.combined_text, &rules, Some(&ctx));
        let text = &request.user_instruction;

        assert!(text.contains("max_gwa: 2.125\n"));
        assert!(text.contains("compare the GWA against max_gwa (2.125)"));
        assert!(text.contains("a GWA of 2.125 or lower passes"));
        assert!(text.contains("max_monthly_income (25000.75)"));
        assert!(text.contains("Mother's declared monthly income: 15000.555"));
        assert!(!text.contains("2.12)"));
        assert!(!text.contains("15000.56"));
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = EvaluationRequestBuilder::output_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"confidenceScore"));
        assert!(required.contains(&"disqualificationReasons"));
        assert!(schema["properties"]["evaluation"]["properties"]["incomeCheck"]["properties"]
            .get("incomeVerified")
            .is_some());

        let request = EvaluationRequestBuilder::build("text", &rules(), None);
        assert!(request.user_instruction.contains("\"confidenceScore\""));
        assert!(request.user_instruction.contains("Do not add any prose"));
    }
}
