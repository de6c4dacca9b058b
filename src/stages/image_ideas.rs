//! Image design ideas, using the same fan-out as video titles

use super::{fan_out_targets, structured_generate, EnrichmentStage, PipelineState, StageContext};
use crate::domain::prompts::{render_presentations, PromptKind, PromptTemplates, RenderOptions};
use crate::domain::tools::ImageDesign;
use crate::error::Result;
use async_trait::async_trait;
use futures_util::future::try_join_all;

pub struct ImageIdeaStage;

#[async_trait]
impl EnrichmentStage for ImageIdeaStage {
    fn name(&self) -> &'static str {
        "image-ideas"
    }

    async fn run(&self, ctx: &StageContext, mut state: PipelineState) -> Result<PipelineState> {
        if state.meeting.images.is_some() {
            log::info!("Meeting already has images; no design ideas needed");
            return Ok(state);
        }

        let system = PromptTemplates::persona(PromptKind::ImageDesign, state.meeting.meeting_type);
        let options = RenderOptions::default();
        let prompts: Vec<String> = fan_out_targets(&state.meeting.presentations)
            .iter()
            .map(|target| render_presentations(target, &options))
            .collect();

        log::info!("Generating {} image design ideas", prompts.len());
        let designs = try_join_all(prompts.into_iter().map(|prompt| {
            structured_generate::<ImageDesign>(ctx, system.clone(), prompt)
        }))
        .await?;

        state.design_ideas = designs
            .into_iter()
            .map(|design| design.description.trim().to_string())
            .collect();
        Ok(state)
    }
}
