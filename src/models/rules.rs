//! 资格规则模型
//!
//! 规则以 key → value 的形式保存，value 为可转换成数字的字符串。
//! 缺省值只在 [`Thresholds::resolve`] 中统一处理，不写回 `RuleSet`。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_MONTHLY_INCOME_KEY: &str = "max_monthly_income";
pub const MAX_GWA_KEY: &str = "max_gwa";

pub const DEFAULT_MAX_MONTHLY_INCOME: f64 = 30000.0;
pub const DEFAULT_MAX_GWA: f64 = 3.0;

/// 规则存储中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRow {
    pub rule_key: String,
    #[serde(deserialize_with = "deserialize_rule_value")]
    pub rule_value: String,
    #[serde(default)]
    pub description: String,
}

impl RuleRow {
    pub fn new(rule_key: impl Into<String>, rule_value: impl Into<String>) -> Self {
        Self {
            rule_key: rule_key.into(),
            rule_value: rule_value.into(),
            description: String::new(),
        }
    }
}

// 规则值在文件里可以写成字符串、整数或小数
fn deserialize_rule_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct RuleValueVisitor;

    impl<'de> Visitor<'de> for RuleValueVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number representing a rule value")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(RuleValueVisitor)
}

/// 规则集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: BTreeMap<String, String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按顺序折叠规则行，重复的 key 以后出现的为准
    pub fn from_rows(rows: impl IntoIterator<Item = RuleRow>) -> Self {
        rows.into_iter()
            .fold(Self::new(), |mut set, row| {
                set.insert(row.rule_key, row.rule_value);
                set
            })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.rules.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.rules.get(key).map(String::as_str)
    }

    /// 读取数值型规则，缺失或无法解析时返回 `None`
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|v| v.trim().replace(',', "").parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// 已解析的数值阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub max_monthly_income: f64,
    pub max_gwa: f64,
}

impl Thresholds {
    /// 从规则集合中解析阈值，缺失的 key 使用固定默认值
    pub fn resolve(rules: &RuleSet) -> Self {
        Self {
            max_monthly_income: rules
                .get_f64(MAX_MONTHLY_INCOME_KEY)
                .unwrap_or(DEFAULT_MAX_MONTHLY_INCOME),
            max_gwa: rules.get_f64(MAX_GWA_KEY).unwrap_or(DEFAULT_MAX_GWA),
        }
    }
}

/// 格式化金额/分数：整数不带小数点，小数按原值输出，不做舍入
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let rules = RuleSet::from_rows(vec![
            RuleRow::new(MAX_GWA_KEY, "2.5"),
            RuleRow::new(MAX_MONTHLY_INCOME_KEY, "30000"),
            RuleRow::new(MAX_GWA_KEY, "2.75"),
        ]);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get(MAX_GWA_KEY), Some("2.75"));
    }

    #[test]
    fn test_thresholds_default_when_missing() {
        let thresholds = Thresholds::resolve(&RuleSet::new());
        assert_eq!(thresholds.max_monthly_income, DEFAULT_MAX_MONTHLY_INCOME);
        assert_eq!(thresholds.max_gwa, DEFAULT_MAX_GWA);
    }

    #[test]
    fn test_thresholds_default_when_unparseable() {
        let rules: RuleSet = [(MAX_MONTHLY_INCOME_KEY, "n/a"), (MAX_GWA_KEY, "2.0")]
            .into_iter()
            .collect();
        let thresholds = Thresholds::resolve(&rules);
        assert_eq!(thresholds.max_monthly_income, DEFAULT_MAX_MONTHLY_INCOME);
        assert_eq!(thresholds.max_gwa, 2.0);
    }

    #[test]
    fn test_resolve_does_not_mutate_rules() {
        let rules = RuleSet::new();
        let _ = Thresholds::resolve(&rules);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_numeric_value_with_thousands_separator() {
        let rules: RuleSet = [(MAX_MONTHLY_INCOME_KEY, "25,000")].into_iter().collect();
        assert_eq!(rules.get_f64(MAX_MONTHLY_INCOME_KEY), Some(25000.0));
    }

    #[test]
    fn test_rule_row_value_from_toml_number() {
        #[derive(Deserialize)]
        struct Rows {
            rule: Vec<RuleRow>,
        }

        let rows: Rows = toml::from_str(
            r#"
            [[rule]]
            rule_key = "max_monthly_income"
            rule_value = 30000

            [[rule]]
            rule_key = "max_gwa"
            rule_value = 3.0
            description = "Maximum passing GWA"

            [[rule]]
            rule_key = "program"
            rule_value = "merit"
            "#,
        )
        .unwrap();

        assert_eq!(rows.rule[0].rule_value, "30000");
        assert_eq!(rows.rule[1].rule_value.parse::<f64>().unwrap(), 3.0);
        assert_eq!(rows.rule[2].rule_value, "merit");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(25000.0), "25000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(2.75), "2.75");
        assert_eq!(format_number(2.125), "2.125");
        assert_eq!(format_number(1.755), "1.755");
        assert_eq!(format_number(15000.555), "15000.555");
    }
}
