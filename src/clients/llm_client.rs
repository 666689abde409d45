//! LLM API 客户端
//!
//! 封装与推理服务之间的调用，兼容 OpenAI API 的服务都可以使用

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, EvaluationEngineError};

/// 发给推理服务的一次请求
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub model: String,
    pub system_instruction: String,
    pub user_instruction: String,
    pub temperature: f32,
    /// 是否强制 JSON 输出
    pub force_json: bool,
}

/// 推理服务边界
///
/// 返回的文本对调用方来说是不透明的，由调用方自行校验
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn complete(&self, request: &ReasoningRequest) -> AppResult<String>;
}

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }
}

#[async_trait]
impl ReasoningBackend for LlmClient {
    async fn complete(&self, request: &ReasoningRequest) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!("用户消息长度: {} 字符", request.user_instruction.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_instruction.as_str())
            .build()
            .map_err(|e| AppError::llm_api_failed(&request.model, e))?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_instruction.as_str())
            .build()
            .map_err(|e| AppError::llm_api_failed(&request.model, e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let response_format = if request.force_json {
            ResponseFormat::JsonObject
        } else {
            ResponseFormat::Text
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .response_format(response_format)
            .max_tokens(2048u32)
            .build()
            .map_err(|e| AppError::llm_api_failed(&request.model, e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&request.model, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AppError::EvaluationEngine(EvaluationEngineError::EmptyContent {
                    model: request.model.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }
}
