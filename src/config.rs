use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 评估引擎类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluatorKind {
    /// 离线确定性评估（测试/演示）
    Mock,
    /// 调用外部推理服务
    Ai,
}

impl FromStr for EvaluatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(EvaluatorKind::Mock),
            "ai" => Ok(EvaluatorKind::Ai),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "EVALUATOR".to_string(),
                value: other.to_string(),
                expected_type: "mock | ai".to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 使用哪种评估引擎
    pub evaluator: EvaluatorKind,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 传输失败时的最大重试次数
    pub llm_max_retries: usize,
    /// 重试间隔（毫秒）
    pub llm_retry_backoff_ms: u64,
    // --- 存储配置 ---
    /// 资格规则文件
    pub rules_file: String,
    /// 申请清单（TOML）存放目录
    pub applications_folder: String,
    /// 临时文档暂存目录
    pub staging_folder: String,
    /// 原始文档归档目录
    pub object_store_root: String,
    /// 决策记录输出目录
    pub output_folder: String,
    /// 运行日志文件
    pub output_log_file: String,
    // --- 处理配置 ---
    /// 同时处理的申请数量
    pub max_concurrent_applications: usize,
    /// OCR 语言
    pub ocr_language: String,
    pub extraction_timeout_secs: u64,
    pub evaluation_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorKind::Mock,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_max_retries: 2,
            llm_retry_backoff_ms: 500,
            rules_file: "rules.toml".to_string(),
            applications_folder: "applications".to_string(),
            staging_folder: "staging".to_string(),
            object_store_root: "object_store".to_string(),
            output_folder: "decisions".to_string(),
            output_log_file: "output.txt".to_string(),
            max_concurrent_applications: 8,
            ocr_language: "eng".to_string(),
            extraction_timeout_secs: 60,
            evaluation_timeout_secs: 120,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        let config = Self {
            evaluator: parse_var("EVALUATOR", "mock | ai")?.unwrap_or(default.evaluator),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL")
                .unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_retries: parse_var("LLM_MAX_RETRIES", "usize")?
                .unwrap_or(default.llm_max_retries),
            llm_retry_backoff_ms: parse_var("LLM_RETRY_BACKOFF_MS", "u64")?
                .unwrap_or(default.llm_retry_backoff_ms),
            rules_file: std::env::var("RULES_FILE").unwrap_or(default.rules_file),
            applications_folder: std::env::var("APPLICATIONS_FOLDER")
                .unwrap_or(default.applications_folder),
            staging_folder: std::env::var("STAGING_FOLDER").unwrap_or(default.staging_folder),
            object_store_root: std::env::var("OBJECT_STORE_ROOT")
                .unwrap_or(default.object_store_root),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            max_concurrent_applications: parse_var("MAX_CONCURRENT_APPLICATIONS", "usize")?
                .unwrap_or(default.max_concurrent_applications),
            ocr_language: std::env::var("OCR_LANGUAGE").unwrap_or(default.ocr_language),
            extraction_timeout_secs: parse_var("EXTRACTION_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.extraction_timeout_secs),
            evaluation_timeout_secs: parse_var("EVALUATION_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.evaluation_timeout_secs),
            verbose_logging: parse_var("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
        };
        config.validate()?;
        Ok(config)
    }

    /// 检查配置项之间的约束
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.evaluator == EvaluatorKind::Ai && self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "LLM_API_KEY".to_string(),
            });
        }
        if self.max_concurrent_applications == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "MAX_CONCURRENT_APPLICATIONS".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            });
        }
        Ok(())
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_secs(self.evaluation_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.llm_retry_backoff_ms)
    }
}

/// 读取并解析环境变量，未设置时返回 `None`
fn parse_var<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
