//! Command-line and environment configuration

use crate::ports::llm::{ImageConfig, LlmConfig};
use crate::stages::{Diagnostics, ImagePolicy, LinkPolicy};
use crate::utils::credentials::API_KEY_VAR;
use clap::Parser;
use std::path::PathBuf;

/// Enrich user-group meeting records with generated tags, posts, titles and images
#[derive(Debug, Parser)]
#[command(name = "meetup-enrich", version)]
pub struct Cli {
    /// Meeting JSON file; without it every template in --templates-dir is processed
    pub input: Option<PathBuf>,

    /// Directory of YYYY-MM-DD*sluug.json / *stllug.json templates
    #[arg(long, env = "MEETUP_TEMPLATES_DIR", default_value = "templates")]
    pub templates_dir: PathBuf,

    /// Where enriched records and images are written
    #[arg(short, long, env = "MEETUP_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Chat model used for structured generation
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o")]
    pub model: String,

    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Image generation model
    #[arg(long, env = "OPENAI_IMAGE_MODEL", default_value = "dall-e-3")]
    pub image_model: String,

    /// Size requested from the image API
    #[arg(long, default_value = "1792x1024")]
    pub image_size: String,

    /// Alternative API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub api_base: Option<String>,

    /// Environment variable holding the API key
    #[arg(long, default_value = API_KEY_VAR)]
    pub api_key_var: String,

    /// Link appended to social posts when a meeting has no meetupUrl
    #[arg(long, env = "MEETUP_FALLBACK_LINK")]
    pub fallback_link: Option<String>,

    /// Log intermediate pipeline states
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            model: self.model.clone(),
            temperature: Some(self.temperature),
            ..LlmConfig::default()
        }
    }

    pub fn image_config(&self) -> ImageConfig {
        ImageConfig {
            model: self.image_model.clone(),
            size: self.image_size.clone(),
            ..ImageConfig::default()
        }
    }

    pub fn link_policy(&self) -> LinkPolicy {
        self.fallback_link
            .as_deref()
            .filter(|link| !link.trim().is_empty())
            .map(LinkPolicy::with_fallback)
            .unwrap_or_default()
    }

    pub fn image_policy(&self) -> ImagePolicy {
        ImagePolicy::default()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            verbose: self.verbose,
        }
    }

    /// Default log filter, overridden by RUST_LOG
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
