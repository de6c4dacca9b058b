//! OpenAI generative service adapter
//!
//! Implements the GenerativeServicePort for OpenAI's API: chat completions
//! with a forced function tool for structured output, and the images API
//! for illustrations.

use crate::domain::tools::ToolDefinition;
use crate::error::{AppError, Result};
use crate::ports::llm::{
    GenerativeServicePort, ImageConfig, ImageGeneration, ImageRequest, LlmConfig,
    StructuredRequest,
};
use crate::utils::credentials::CredentialPort;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    tools: Vec<ChatTool>,
    tool_choice: ToolChoice,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ToolDefinition,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: &'static str,
    function: ToolChoiceFunction,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

impl OpenAIService {
    /// Create a new OpenAI service with the given API key
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Create a service using the key from a credential source
    pub fn from_credentials(credentials: &dyn CredentialPort) -> Result<Self> {
        Self::new(credentials.api_key()?)
    }

    /// Point the service at a compatible API (proxies, local gateways)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_chat_request(request: &StructuredRequest, config: &LlmConfig) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            tools: vec![ChatTool {
                tool_type: "function",
                function: request.tool.clone(),
            }],
            tool_choice: ToolChoice {
                choice_type: "function",
                function: ToolChoiceFunction {
                    name: request.tool.name.clone(),
                },
            },
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Pull the forced tool call's arguments out of a completion
    fn extract_tool_arguments(
        response: ChatCompletionResponse,
        tool: &str,
    ) -> Result<serde_json::Value> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(AppError::contract(tool, "no completion choices returned"));
        };

        let finish_reason = choice.finish_reason.unwrap_or_default();
        let Some(call) = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .find(|c| c.function.name == tool)
        else {
            return Err(AppError::contract(
                tool,
                format!("model did not call the tool (finish reason: {})", finish_reason),
            ));
        };

        serde_json::from_str(&call.function.arguments).map_err(|e| {
            AppError::contract(tool, format!("tool arguments are not valid JSON: {}", e))
        })
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        format!("{} {}", status, body)
    }
}

#[async_trait]
impl GenerativeServicePort for OpenAIService {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
        config: &LlmConfig,
    ) -> Result<serde_json::Value> {
        let request_body = Self::build_chat_request(request, config);

        log::debug!(
            "Calling OpenAI chat completion with model: {}, tool: {}",
            config.model,
            request.tool.name
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Chat completion request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Chat completion failed: {}",
                Self::error_body(response).await
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::Llm(format!("Failed to parse completion response: {}", e))
        })?;

        Self::extract_tool_arguments(completion, &request.tool.name)
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
        config: &ImageConfig,
    ) -> Result<ImageGeneration> {
        let request_body = ImageGenerationRequest {
            model: config.model.clone(),
            prompt: request.prompt.clone(),
            n: 1,
            size: config.size.clone(),
            quality: config.quality.clone(),
            response_format: "url",
        };

        log::debug!(
            "Calling OpenAI image generation with model: {}, size: {}",
            config.model,
            config.size
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Image generation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Image generation failed: {}",
                Self::error_body(response).await
            )));
        }

        let generated: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse image response: {}", e)))?;

        let image = generated
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::contract("images", "no image returned"))?;
        let url = image
            .url
            .ok_or_else(|| AppError::contract("images", "image has no download URL"))?;

        Ok(ImageGeneration {
            url,
            revised_prompt: image.revised_prompt,
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Image download failed: {}",
                Self::error_body(response).await
            )));
        }

        let bytes = response.bytes().await?;
        log::debug!("Downloaded {} bytes of generated image", bytes.len());
        Ok(bytes.to_vec())
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
