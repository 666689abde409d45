use thiserror::Error;

/// 应用程序错误类型
///
/// 每个变体对应流水线中的一个阶段，方便调用方区分
/// "输入不合法" 与 "处理失败" 两类情况。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误（不会进入流水线）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 不支持的文件类型
    #[error("不支持的文件类型: {mime_type} ({path})")]
    UnsupportedFileType { path: String, mime_type: String },
    /// 文本提取错误
    #[error("文本提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 规则加载错误
    #[error("规则加载错误: {0}")]
    RuleLoad(#[from] RuleLoadError),
    /// 评估引擎错误（传输/可用性）
    #[error("评估引擎错误: {0}")]
    EvaluationEngine(#[from] EvaluationEngineError),
    /// 评估结果解析错误
    #[error("评估结果解析错误: {0}")]
    EvaluationParse(#[from] EvaluationParseError),
    /// 持久化错误
    #[error("持久化错误: {0}")]
    Persistence(#[from] PersistenceError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 缺少必需的文档
    #[error("缺少文档: {field}")]
    MissingDocument { field: String },
    /// 缺少必需的收入数据
    #[error("缺少收入数据: {field}")]
    MissingIncome { field: String },
    /// 收入数值不合法
    #[error("收入数值不合法 ({field}): {value}")]
    InvalidIncome { field: String, value: f64 },
    /// 文件过大
    #[error("文件过大 ({path}): {size_bytes} 字节，上限 {max_bytes} 字节")]
    FileTooLarge {
        path: String,
        size_bytes: u64,
        max_bytes: u64,
    },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文本编码不合法
    #[error("文本编码不合法 ({path}): {source}")]
    InvalidEncoding {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// PDF 解析失败
    #[error("PDF 解析失败 ({path}): {message}")]
    PdfFailed { path: String, message: String },
    /// OCR 识别失败
    #[error("OCR 识别失败 ({path}): {message}")]
    OcrFailed { path: String, message: String },
    /// 提取超时
    #[error("提取超时 ({path})，超过 {seconds} 秒")]
    Timeout { path: String, seconds: u64 },
}

/// 规则加载错误
#[derive(Debug, Error)]
pub enum RuleLoadError {
    /// 规则存储不可达
    #[error("规则存储不可达 ({location}): {source}")]
    Unreachable {
        location: String,
        #[source]
        source: std::io::Error,
    },
    /// 规则数据格式错误
    #[error("规则数据格式错误 ({location}): {source}")]
    Malformed {
        location: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 评估引擎错误
#[derive(Debug, Error)]
pub enum EvaluationEngineError {
    /// API 调用失败
    #[error("API 调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 调用超时
    #[error("调用超时，超过 {seconds} 秒")]
    Timeout { seconds: u64 },
}

/// 评估结果解析错误
#[derive(Debug, Error)]
pub enum EvaluationParseError {
    /// JSON 与结果结构不匹配
    #[error("JSON 与结果结构不匹配: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    /// 结果违反约束
    #[error("结果违反约束: {reason}")]
    ConstraintViolated { reason: String },
}

/// 持久化错误
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 写入失败
    #[error("写入失败 ({location}): {source}")]
    WriteFailed {
        location: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化失败 ({location}): {source}")]
    SerializeFailed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少必需的配置项
    #[error("缺少必需的配置项: {var_name}")]
    Missing { var_name: String },
}

impl AppError {
    /// 是否属于"输入不合法"类错误
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::UnsupportedFileType { .. }
        )
    }

    /// 面向用户的错误信息，不泄露内部细节
    pub fn public_message(&self) -> &'static str {
        if self.is_input_error() {
            "your input was invalid"
        } else {
            "processing failed"
        }
    }

    /// 创建不支持文件类型错误
    pub fn unsupported_file_type(path: impl Into<String>, mime_type: impl Into<String>) -> Self {
        AppError::UnsupportedFileType {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// 创建 API 调用失败错误
    pub fn llm_api_failed(model: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::EvaluationEngine(EvaluationEngineError::ApiCallFailed {
            model: model.into(),
            message: message.to_string(),
        })
    }

    /// 创建约束违反错误
    pub fn constraint_violated(reason: impl Into<String>) -> Self {
        AppError::EvaluationParse(EvaluationParseError::ConstraintViolated {
            reason: reason.into(),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::EvaluationParse(EvaluationParseError::InvalidJson { source: err })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_detail() {
        let input = AppError::Validation(ValidationError::MissingIncome {
            field: "mother_income".to_string(),
        });
        assert!(input.is_input_error());
        assert_eq!(input.public_message(), "your input was invalid");

        let failure = AppError::llm_api_failed("gpt-4o-mini", "connection reset");
        assert!(!failure.is_input_error());
        assert_eq!(failure.public_message(), "processing failed");
        assert!(!failure.public_message().contains("connection"));
    }

    #[test]
    fn test_unsupported_type_is_input_error() {
        let err = AppError::unsupported_file_type("a.gif", "image/gif");
        assert!(err.is_input_error());
        assert!(err.to_string().contains("image/gif"));
    }
}
