//! Prompt templates and presentation rendering
//!
//! Provides the fixed system personas for each enrichment stage and the pure
//! functions that turn presentations into the user turn of a request.

use crate::domain::models::{MeetingType, Presentation};
use chrono::NaiveDate;

/// Which enrichment stage a persona belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Tags,
    SocialPosts,
    VideoTitles,
    ImageDesign,
}

/// Default system personas for each stage
pub struct PromptTemplates;

impl PromptTemplates {
    /// Persona for tag generation
    pub fn tags() -> &'static str {
        r#"You are the program chair of the {organization} ({short_name}). You label presentations so members can find talks on topics they care about.

Given a presentation, choose at most three short topic tags. Prefer established technology names (for example "linux", "containers", "networking") over generic words. Each tag is one or two words, lower case."#
    }

    /// Persona for social media posts
    pub fn social_posts() -> &'static str {
        r#"You are the publicity volunteer for the {organization} ({short_name}). You write friendly, upbeat posts that invite people to attend a meeting.

Given a presentation, write exactly three distinct social media posts. Each post is under 240 characters, mentions what attendees will learn, and may use one or two relevant hashtags. Do not include links; one is appended automatically."#
    }

    /// Persona for video titles
    pub fn video_titles() -> &'static str {
        r#"You are the video editor for the {organization} ({short_name}). Meeting recordings are published online and need clear, searchable titles.

Given one or more presentations, write exactly three candidate titles for the recording. Each title is under 70 characters and names the subject plainly. Do not include the group name or the date; they are added automatically."#
    }

    /// Persona for image design ideas
    pub fn image_design() -> &'static str {
        r#"You are the graphic designer for the {organization} ({short_name}). You create illustrations used as video thumbnails and event banners.

Given one or more presentations, describe a single striking illustration for them in two to four sentences. Describe subject, composition, style and colors. The image must not contain any text, letters or logos."#
    }

    /// Get all default templates
    #[cfg(test)]
    pub fn all() -> Vec<(PromptKind, &'static str)> {
        vec![
            (PromptKind::Tags, Self::tags()),
            (PromptKind::SocialPosts, Self::social_posts()),
            (PromptKind::VideoTitles, Self::video_titles()),
            (PromptKind::ImageDesign, Self::image_design()),
        ]
    }

    /// Get the template for a specific stage
    pub fn for_kind(kind: PromptKind) -> &'static str {
        match kind {
            PromptKind::Tags => Self::tags(),
            PromptKind::SocialPosts => Self::social_posts(),
            PromptKind::VideoTitles => Self::video_titles(),
            PromptKind::ImageDesign => Self::image_design(),
        }
    }

    /// System persona for a stage, in the voice of the hosting organization
    pub fn persona(kind: PromptKind, meeting_type: MeetingType) -> String {
        Self::for_kind(kind)
            .replace("{organization}", meeting_type.organization())
            .replace("{short_name}", meeting_type.as_str())
    }
}

/// What to include when rendering presentations
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub include_presenters: bool,
    pub meeting_date: Option<NaiveDate>,
}

impl RenderOptions {
    pub fn with_presenters(mut self) -> Self {
        self.include_presenters = true;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.meeting_date = Some(date);
        self
    }
}

/// Renders one presentation as plain text
pub fn render_presentation(presentation: &Presentation, options: &RenderOptions) -> String {
    let mut lines = vec![format!("Title: {}", presentation.title.trim())];

    if options.include_presenters && !presentation.presenter_names.is_empty() {
        let label = if presentation.presenter_names.len() == 1 {
            "Presenter"
        } else {
            "Presenters"
        };
        lines.push(format!("{}: {}", label, presentation.presenter_names.join(", ")));
    }

    if let Some(date) = options.meeting_date {
        lines.push(format!("Date: {}", date.format("%A, %B %-d, %Y")));
    }

    if let Some(tags) = presentation.tags.as_ref().filter(|t| !t.is_empty()) {
        lines.push(format!("Tags: {}", tags.join(", ")));
    }

    lines.push(format!("Abstract: {}", presentation.abstract_text.trim()));

    if let Some(references) = presentation.references.as_ref().filter(|r| !r.is_empty()) {
        lines.push("References:".to_string());
        for reference in references {
            match &reference.display_text {
                Some(text) => lines.push(format!("- {} ({})", text, reference.url)),
                None => lines.push(format!("- {}", reference.url)),
            }
        }
    }

    lines.join("\n")
}

/// Renders several presentations, separated by blank lines
pub fn render_presentations(presentations: &[Presentation], options: &RenderOptions) -> String {
    presentations
        .iter()
        .map(|p| render_presentation(p, options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Reference;

    fn talk() -> Presentation {
        Presentation::new("Intro to Containers", &["Jane Doe"], "A talk about containers.")
    }

    #[test]
    fn test_all_templates_exist() {
        let templates = PromptTemplates::all();
        assert_eq!(templates.len(), 4);
        for (_, template) in templates {
            assert!(template.contains("{organization}"));
            assert!(template.contains("{short_name}"));
        }
    }

    #[test]
    fn test_persona_fills_organization() {
        let persona = PromptTemplates::persona(PromptKind::SocialPosts, MeetingType::Stllug);
        assert!(persona.contains("St. Louis Linux Users Group (STLLUG)"));
        assert!(!persona.contains('{'));
    }

    #[test]
    fn test_minimal_rendering_omits_optional_parts() {
        let text = render_presentation(&talk(), &RenderOptions::default());
        assert_eq!(text, "Title: Intro to Containers\nAbstract: A talk about containers.");
    }

    #[test]
    fn test_full_rendering() {
        let mut presentation = talk().with_tags(vec!["containers".to_string()]);
        presentation.references = Some(vec![Reference {
            url: "https://example.org/slides".to_string(),
            display_text: Some("Slides".to_string()),
        }]);
        let options = RenderOptions::default()
            .with_presenters()
            .with_date(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());

        let text = render_presentation(&presentation, &options);
        assert_eq!(
            text,
            "Title: Intro to Containers\n\
             Presenter: Jane Doe\n\
             Date: Wednesday, February 14, 2024\n\
             Tags: containers\n\
             Abstract: A talk about containers.\n\
             References:\n\
             - Slides (https://example.org/slides)"
        );
    }

    #[test]
    fn test_empty_presenter_list_is_omitted() {
        let presentation = Presentation::new("Lightning Talks", &[], "Short talks.");
        let text = render_presentation(&presentation, &RenderOptions::default().with_presenters());
        assert!(!text.contains("Presenter"));
    }

    #[test]
    fn test_sequence_rendering_is_concatenation() {
        let second = Presentation::new("Shell Tricks", &["A", "B"], "Pipes.");
        let options = RenderOptions::default().with_presenters();
        let text = render_presentations(&[talk(), second.clone()], &options);
        assert_eq!(
            text,
            format!(
                "{}\n\n{}",
                render_presentation(&talk(), &options),
                render_presentation(&second, &options)
            )
        );
        assert!(text.contains("Presenters: A, B"));
    }
}
