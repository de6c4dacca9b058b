/// Generative service port trait
///
/// Defines the interface for the text and image generation API.
/// Implementations: OpenAI
use crate::domain::tools::ToolDefinition;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request for a structured (tool call) completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredRequest {
    /// Fixed system persona for the stage
    pub system: String,

    /// Rendered presentation text, sent as the user turn
    pub prompt: String,

    /// The single tool the model is forced to call
    pub tool: ToolDefinition,
}

/// Request for one generated image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

/// A generated image waiting to be downloaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageGeneration {
    /// Transient download URL
    pub url: String,

    /// The prompt as rewritten by the service, if it rewrote it
    pub revised_prompt: Option<String>,
}

/// Configuration for text generation requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name (e.g., "gpt-4o")
    pub model: String,

    /// Temperature for generation (0.0 to 2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens in response
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: Some(0.7), // Promotional copy benefits from some variety
            max_tokens: Some(1024),
        }
    }
}

/// Configuration for image generation requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub model: String,

    /// Size requested from the service, e.g. "1792x1024"
    pub size: String,

    pub quality: Option<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: "dall-e-3".to_string(),
            size: "1792x1024".to_string(),
            quality: Some("standard".to_string()),
        }
    }
}

/// Port trait for generative services
#[async_trait]
pub trait GenerativeServicePort: Send + Sync {
    /// Forces a call to `request.tool` and returns its raw arguments
    ///
    /// Fails with `GenerationContract` if the model answers without calling
    /// the tool.
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
        config: &LlmConfig,
    ) -> Result<serde_json::Value>;

    /// Generate one image from a text prompt
    async fn generate_image(
        &self,
        request: &ImageRequest,
        config: &ImageConfig,
    ) -> Result<ImageGeneration>;

    /// Download the bytes behind a generated image URL
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}
