//! Mock implementations for testing

use crate::domain::tools::{ImageDesign, SocialPostSet, TagSet, ToolOutput, VideoTitleSet};
use crate::error::{AppError, Result};
use crate::ports::llm::{
    GenerativeServicePort, ImageConfig, ImageGeneration, ImageRequest, LlmConfig,
    StructuredRequest,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Mock generative service with scripted per-tool answers
#[derive(Clone, Default)]
pub struct MockGenerativeService {
    overrides: Arc<Mutex<HashMap<String, Value>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    requests: Arc<Mutex<Vec<StructuredRequest>>>,
    image_prompts: Arc<Mutex<Vec<String>>>,
    downloads: Arc<Mutex<usize>>,
}

impl MockGenerativeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `tool` with `response`
    pub fn with_response(self, tool: &str, response: Value) -> Self {
        self.overrides
            .lock()
            .unwrap()
            .insert(tool.to_string(), response);
        self
    }

    /// Number of structured calls made for `tool`
    pub fn calls(&self, tool: &str) -> usize {
        self.calls.lock().unwrap().get(tool).copied().unwrap_or(0)
    }

    /// Every structured request received, in arrival order
    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> usize {
        *self.downloads.lock().unwrap()
    }

    fn default_response(tool: &str, call: usize) -> Value {
        if tool == TagSet::TOOL {
            json!({"tags": ["Containers", " Linux Kernel "]})
        } else if tool == SocialPostSet::TOOL {
            json!({"posts": [
                format!("Join us for containers! #{}", call),
                "Learn how images and layers work.",
                "Bring your questions about Docker and Podman. ",
            ]})
        } else if tool == VideoTitleSet::TOOL {
            json!({"titles": [
                format!("Containers Explained {}", call),
                "From chroot to Kubernetes",
                "Why Containers Matter",
            ]})
        } else if tool == ImageDesign::TOOL {
            json!({
                "description": format!("A friendly penguin stacking shipping containers, scene {}", call)
            })
        } else {
            json!({})
        }
    }

    /// A small solid-color PNG
    pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([30, 90, 160]));
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }
}

#[async_trait]
impl GenerativeServicePort for MockGenerativeService {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
        _config: &LlmConfig,
    ) -> Result<Value> {
        let tool = request.tool.name.clone();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(tool.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.requests.lock().unwrap().push(request.clone());

        if let Some(response) = self.overrides.lock().unwrap().get(&tool) {
            return Ok(response.clone());
        }
        Ok(Self::default_response(&tool, call))
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
        _config: &ImageConfig,
    ) -> Result<ImageGeneration> {
        let mut prompts = self.image_prompts.lock().unwrap();
        prompts.push(request.prompt.clone());
        Ok(ImageGeneration {
            url: format!("https://images.example.test/{}.png", prompts.len()),
            revised_prompt: Some(format!("Revised: {}", request.prompt)),
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        if !url.starts_with("https://images.example.test/") {
            return Err(AppError::Llm(format!("Unknown image URL: {}", url)));
        }
        *self.downloads.lock().unwrap() += 1;
        Ok(Self::sample_png(64, 36))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
