//! Video titles for the meeting recording

use super::{fan_out_targets, structured_generate, EnrichmentStage, PipelineState, StageContext};
use crate::domain::models::{Meeting, MeetingType};
use crate::domain::prompts::{render_presentations, PromptKind, PromptTemplates, RenderOptions};
use crate::domain::tools::VideoTitleSet;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::future::try_join_all;

/// `"{title} | {meetingType} {YYYY-MM-DD}"`
pub fn decorate_title(title: &str, meeting_type: MeetingType, date: NaiveDate) -> String {
    format!("{} | {} {}", title.trim(), meeting_type, date.format("%Y-%m-%d"))
}

pub struct VideoTitleStage;

impl VideoTitleStage {
    fn decorate_all(meeting: &Meeting, sets: Vec<VideoTitleSet>) -> Vec<String> {
        sets.into_iter()
            .flat_map(|set| set.titles)
            .map(|title| decorate_title(&title, meeting.meeting_type, meeting.meeting_date))
            .collect()
    }
}

#[async_trait]
impl EnrichmentStage for VideoTitleStage {
    fn name(&self) -> &'static str {
        "video-titles"
    }

    async fn run(&self, ctx: &StageContext, mut state: PipelineState) -> Result<PipelineState> {
        if state.meeting.video_titles.is_some() {
            log::info!("Keeping existing video titles");
            return Ok(state);
        }

        let system = PromptTemplates::persona(PromptKind::VideoTitles, state.meeting.meeting_type);
        let options = RenderOptions::default().with_presenters();
        let prompts: Vec<String> = fan_out_targets(&state.meeting.presentations)
            .iter()
            .map(|target| render_presentations(target, &options))
            .collect();

        log::info!("Generating video titles with {} invocations", prompts.len());
        let sets = try_join_all(prompts.into_iter().map(|prompt| {
            structured_generate::<VideoTitleSet>(ctx, system.clone(), prompt)
        }))
        .await?;

        let titles = Self::decorate_all(&state.meeting, sets);
        state.meeting.video_titles = Some(titles);
        Ok(state)
    }
}
