//! Promotional posts, one call per presentation

use super::{structured_generate, EnrichmentStage, PipelineState, StageContext};
use crate::domain::models::Presentation;
use crate::domain::prompts::{render_presentation, PromptKind, PromptTemplates, RenderOptions};
use crate::domain::tools::SocialPostSet;
use crate::error::Result;
use async_trait::async_trait;
use futures_util::future::try_join_all;

/// Appends `link` to a post, separated by a space
///
/// An absent or blank link leaves the post as is, minus trailing whitespace.
pub fn suffix_link(post: &str, link: Option<&str>) -> String {
    match link.filter(|l| !l.trim().is_empty()) {
        Some(link) => format!("{} {}", post, link).trim_end().to_string(),
        None => post.trim_end().to_string(),
    }
}

pub struct SocialPostStage;

impl SocialPostStage {
    async fn write_posts(
        ctx: &StageContext,
        system: &str,
        options: &RenderOptions,
        link: Option<&str>,
        presentation: Presentation,
    ) -> Result<Presentation> {
        if presentation.social_posts.is_some() {
            log::info!("Keeping existing social posts for '{}'", presentation.title);
            return Ok(presentation);
        }

        let prompt = render_presentation(&presentation, options);
        let generated: SocialPostSet = structured_generate(ctx, system.to_string(), prompt).await?;
        let posts = generated
            .posts
            .iter()
            .map(|post| suffix_link(post, link))
            .collect();

        log::info!("Wrote social posts for '{}'", presentation.title);
        Ok(presentation.with_social_posts(posts))
    }
}

#[async_trait]
impl EnrichmentStage for SocialPostStage {
    fn name(&self) -> &'static str {
        "social-posts"
    }

    async fn run(&self, ctx: &StageContext, mut state: PipelineState) -> Result<PipelineState> {
        let meeting = &state.meeting;
        let system = PromptTemplates::persona(PromptKind::SocialPosts, meeting.meeting_type);
        let options = RenderOptions::default()
            .with_presenters()
            .with_date(meeting.meeting_date);
        let link = ctx.links.link_for(meeting);
        if link.is_none() {
            log::warn!("No link configured for {}; posts are left unsuffixed", meeting.file_stem());
        }

        let written = try_join_all(meeting.presentations.iter().cloned().map(|presentation| {
            Self::write_posts(ctx, &system, &options, link.as_deref(), presentation)
        }))
        .await?;

        state.meeting.presentations = written;
        Ok(state)
    }
}
