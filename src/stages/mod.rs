//! Enrichment stages
//!
//! Each stage takes the current pipeline state, asks the generative service
//! for one kind of content and returns the state with that content merged in.
//! Stages only add fields; anything already present on the record is kept.

pub mod image_ideas;
pub mod images;
pub mod social_posts;
pub mod tags;
pub mod video_titles;

pub use image_ideas::ImageIdeaStage;
pub use images::{ImagePolicy, ImageStage};
pub use social_posts::SocialPostStage;
pub use tags::TagStage;
pub use video_titles::VideoTitleStage;

use crate::domain::models::{Meeting, Presentation};
use crate::domain::tools::ToolOutput;
use crate::error::{AppError, Result};
use crate::ports::llm::{GenerativeServicePort, ImageConfig, LlmConfig, StructuredRequest};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Number of independent generations when a meeting has a single talk
pub const SINGLE_TALK_GENERATIONS: usize = 3;

/// A meeting part-way through enrichment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub meeting: Meeting,
    /// Image descriptions waiting to be materialized
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub design_ideas: Vec<String>,
}

impl PipelineState {
    pub fn new(meeting: Meeting) -> Self {
        Self {
            meeting,
            design_ideas: Vec::new(),
        }
    }
}

/// Chooses the link appended to social posts
#[derive(Debug, Clone, Default)]
pub struct LinkPolicy {
    /// Used when the meeting has no meetup URL
    pub fallback: Option<String>,
}

impl LinkPolicy {
    pub fn with_fallback(fallback: &str) -> Self {
        Self {
            fallback: Some(fallback.to_string()),
        }
    }

    pub fn link_for(&self, meeting: &Meeting) -> Option<String> {
        meeting
            .meetup_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| self.fallback.clone())
    }
}

/// Verbose intermediate-state logging
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    pub verbose: bool,
}

impl Diagnostics {
    #[cfg(test)]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    /// Logs the full state after a stage when verbose
    pub fn state(&self, after_stage: &str, state: &PipelineState) {
        if !self.verbose {
            return;
        }
        match serde_json::to_string_pretty(state) {
            Ok(json) => log::info!("State after {}:\n{}", after_stage, json),
            Err(e) => log::warn!("Could not render state after {}: {}", after_stage, e),
        }
    }
}

/// Everything a stage needs besides the state itself
#[derive(Clone)]
pub struct StageContext {
    pub service: Arc<dyn GenerativeServicePort>,
    pub llm: LlmConfig,
    pub image: ImageConfig,
    pub links: LinkPolicy,
    pub image_policy: ImagePolicy,
    pub diagnostics: Diagnostics,
}

impl StageContext {
    /// Context with default configuration around a service
    pub fn new(service: Arc<dyn GenerativeServicePort>) -> Self {
        Self {
            service,
            llm: LlmConfig::default(),
            image: ImageConfig::default(),
            links: LinkPolicy::default(),
            image_policy: ImagePolicy::default(),
            diagnostics: Diagnostics::default(),
        }
    }
}

/// One step of the enrichment pipeline
#[async_trait]
pub trait EnrichmentStage: Send + Sync {
    /// Short name used in logs and error context
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &StageContext, state: PipelineState) -> Result<PipelineState>;
}

/// Issues one forced tool call and checks the answer against `T`
pub async fn structured_generate<T: ToolOutput>(
    ctx: &StageContext,
    system: String,
    prompt: String,
) -> Result<T> {
    let request = StructuredRequest {
        system,
        prompt,
        tool: T::tool(),
    };

    let arguments = ctx.service.generate_structured(&request, &ctx.llm).await?;
    log::debug!("{} returned {}", T::TOOL, arguments);

    let parsed: T = serde_json::from_value(arguments).map_err(|e| {
        AppError::contract(T::TOOL, format!("response does not match schema: {}", e))
    })?;

    let violations = parsed.violations();
    if !violations.is_empty() {
        let detail = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::contract(T::TOOL, detail));
    }

    Ok(parsed)
}

/// Presentation groups to generate meeting-wide content for
///
/// A single talk gets three independent generations for variety; several talks
/// get one generation each plus one covering all of them.
pub fn fan_out_targets(presentations: &[Presentation]) -> Vec<Vec<Presentation>> {
    match presentations {
        [] => Vec::new(),
        [only] => vec![vec![only.clone()]; SINGLE_TALK_GENERATIONS],
        many => {
            let mut targets: Vec<Vec<Presentation>> =
                many.iter().map(|p| vec![p.clone()]).collect();
            targets.push(many.to_vec());
            targets
        }
    }
}
