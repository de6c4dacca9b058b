//! Tag generation, one call per presentation

use super::{structured_generate, EnrichmentStage, PipelineState, StageContext};
use crate::domain::models::Presentation;
use crate::domain::prompts::{render_presentation, PromptKind, PromptTemplates, RenderOptions};
use crate::domain::tools::TagSet;
use crate::error::Result;
use async_trait::async_trait;
use futures_util::future::try_join_all;

/// Lower-cases a tag and joins its words with hyphens
pub fn normalize_tag(tag: &str) -> String {
    tag.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalizes tags, dropping blanks and duplicates while keeping order
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags.iter().map(|t| normalize_tag(t)) {
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

pub struct TagStage;

impl TagStage {
    async fn tag(ctx: &StageContext, system: &str, presentation: Presentation) -> Result<Presentation> {
        if presentation.tags.is_some() {
            log::info!("Keeping existing tags for '{}'", presentation.title);
            return Ok(presentation);
        }

        let prompt = render_presentation(&presentation, &RenderOptions::default());
        let generated: TagSet = structured_generate(ctx, system.to_string(), prompt).await?;
        let tags = normalize_tags(&generated.tags);

        log::info!("Tagged '{}' with [{}]", presentation.title, tags.join(", "));
        Ok(presentation.with_tags(tags))
    }
}

#[async_trait]
impl EnrichmentStage for TagStage {
    fn name(&self) -> &'static str {
        "tags"
    }

    async fn run(&self, ctx: &StageContext, mut state: PipelineState) -> Result<PipelineState> {
        let system = PromptTemplates::persona(PromptKind::Tags, state.meeting.meeting_type);

        let tagged = try_join_all(
            state
                .meeting
                .presentations
                .iter()
                .cloned()
                .map(|presentation| Self::tag(ctx, &system, presentation)),
        )
        .await?;

        state.meeting.presentations = tagged;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Meeting, MeetingType};
    use crate::domain::tools::ToolOutput;
    use crate::error::AppError;
    use crate::ports::mocks::MockGenerativeService;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;

    fn state(presentations: Vec<Presentation>) -> PipelineState {
        PipelineState::new(Meeting::new(
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            MeetingType::Sluug,
            presentations,
        ))
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Linux Kernel "), "linux-kernel");
        assert_eq!(normalize_tag("Open\tSource  Software"), "open-source-software");
        assert_eq!(normalize_tag("rust"), "rust");
    }

    #[test]
    fn test_normalize_tag_is_idempotent() {
        for tag in ["  Linux Kernel ", "ZFS", "a  b\tc", "already-hyphenated", ""] {
            let once = normalize_tag(tag);
            assert_eq!(normalize_tag(&once), once);
        }
    }

    #[test]
    fn test_normalize_tags_drops_blanks_and_duplicates() {
        let tags = vec!["Linux".to_string(), " ".to_string(), "linux".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["linux"]);
    }

    #[tokio::test]
    async fn test_tags_every_presentation() {
        let mock = Arc::new(MockGenerativeService::new());
        let ctx = StageContext::new(mock.clone());
        let input = state(vec![
            Presentation::new("One", &["A"], "First."),
            Presentation::new("Two", &["B"], "Second."),
        ]);

        let output = TagStage.run(&ctx, input).await.unwrap();

        assert_eq!(mock.calls(TagSet::TOOL), 2);
        for presentation in &output.meeting.presentations {
            assert_eq!(
                presentation.tags.as_deref(),
                Some(&["containers".to_string(), "linux-kernel".to_string()][..])
            );
        }
        assert_eq!(output.meeting.presentations[1].title, "Two");
    }

    #[tokio::test]
    async fn test_existing_tags_are_kept() {
        let mock = Arc::new(MockGenerativeService::new());
        let ctx = StageContext::new(mock.clone());
        let input = state(vec![
            Presentation::new("One", &["A"], "First.").with_tags(vec!["zfs".to_string()])
        ]);

        let output = TagStage.run(&ctx, input).await.unwrap();

        assert_eq!(mock.calls(TagSet::TOOL), 0);
        assert_eq!(output.meeting.presentations[0].tags, Some(vec!["zfs".to_string()]));
    }

    #[tokio::test]
    async fn test_too_many_tags_aborts() {
        let mock = MockGenerativeService::new()
            .with_response(TagSet::TOOL, json!({"tags": ["a", "b", "c", "d"]}));
        let ctx = StageContext::new(Arc::new(mock));

        let err = TagStage
            .run(&ctx, state(vec![Presentation::new("One", &["A"], "First.")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationContract { .. }));
    }
}
