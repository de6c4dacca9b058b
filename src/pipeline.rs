//! Pipeline driver
//!
//! Runs the enrichment stages in their fixed order and hands the finished
//! record to an output port. The first failing stage aborts the run before
//! anything is written.

use crate::domain::models::Meeting;
use crate::domain::validation::Validate;
use crate::error::{AppError, Result};
use crate::ports::storage::OutputPort;
use crate::stages::{
    EnrichmentStage, ImageIdeaStage, ImageStage, PipelineState, SocialPostStage, StageContext,
    TagStage, VideoTitleStage,
};
use std::path::PathBuf;

/// An ordered list of enrichment stages
pub struct Pipeline {
    stages: Vec<Box<dyn EnrichmentStage>>,
}

impl Pipeline {
    /// tags -> social posts -> video titles -> image ideas -> images
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(TagStage),
                Box::new(SocialPostStage),
                Box::new(VideoTitleStage),
                Box::new(ImageIdeaStage),
                Box::new(ImageStage),
            ],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Enriches a validated meeting
    pub async fn run(&self, ctx: &StageContext, meeting: Meeting) -> Result<Meeting> {
        let mut state = PipelineState::new(meeting);
        log::debug!("Stage order: {}", self.stage_names().join(" -> "));

        for stage in &self.stages {
            log::info!("Running stage {}", stage.name());
            state = stage
                .run(ctx, state)
                .await
                .map_err(|e| e.in_stage(stage.name()))?;
            ctx.diagnostics.state(stage.name(), &state);
        }

        Ok(state.meeting)
    }
}

/// Runs the standard pipeline and writes the result
pub async fn enrich_and_write(
    ctx: &StageContext,
    output: &dyn OutputPort,
    meeting: Meeting,
) -> Result<PathBuf> {
    let label = meeting.file_stem();
    log::info!(
        "Enriching {} ({} presentation(s)) with {}",
        label,
        meeting.presentations.len(),
        ctx.service.provider_name()
    );

    let enriched = Pipeline::standard().run(ctx, meeting).await?;

    let violations = enriched.violations();
    if !violations.is_empty() {
        return Err(AppError::SchemaValidation(violations));
    }
    output.write_meeting(&enriched).await
}
