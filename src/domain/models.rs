/// Domain models for meeting enrichment
///
/// These models describe a user-group meeting and the content generated for it.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which organization hosts the meeting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MeetingType {
    #[serde(rename = "SLUUG")]
    Sluug,
    #[serde(rename = "STLLUG")]
    Stllug,
}

impl MeetingType {
    pub const ALL: [MeetingType; 2] = [MeetingType::Sluug, MeetingType::Stllug];

    /// Wire name, as it appears in JSON and generated titles
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Sluug => "SLUUG",
            MeetingType::Stllug => "STLLUG",
        }
    }

    /// Full organization name used in prompts
    pub fn organization(&self) -> &'static str {
        match self {
            MeetingType::Sluug => "St. Louis Unix Users Group",
            MeetingType::Stllug => "St. Louis Linux Users Group",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl std::fmt::Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An external link attached to a presentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

/// One talk within a meeting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub title: String,
    /// First-listed presenter is the primary one
    pub presenter_names: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_posts: Option<Vec<String>>,
}

impl Presentation {
    /// Creates a presentation with no generated content yet
    #[cfg(test)]
    pub fn new(title: &str, presenter_names: &[&str], abstract_text: &str) -> Self {
        Self {
            title: title.to_string(),
            presenter_names: presenter_names.iter().map(|s| s.to_string()).collect(),
            abstract_text: abstract_text.to_string(),
            references: None,
            tags: None,
            social_posts: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_social_posts(mut self, posts: Vec<String>) -> Self {
        self.social_posts = Some(posts);
        self
    }
}

/// An image produced from one design idea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedImage {
    /// File name relative to the output directory
    pub src: String,
    /// Description the image was generated from, used as alt text
    pub alt: String,
    /// Encoded PNG, written next to the record by the output writer
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// A user-group meeting and everything generated for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub meeting_date: NaiveDate,
    pub meeting_type: MeetingType,
    /// Never empty once validated
    pub presentations: Vec<Presentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meetup_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_posts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_titles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<GeneratedImage>>,
}

impl Meeting {
    /// Creates a meeting with the given presentations
    #[cfg(test)]
    pub fn new(
        meeting_date: NaiveDate,
        meeting_type: MeetingType,
        presentations: Vec<Presentation>,
    ) -> Self {
        Self {
            meeting_date,
            meeting_type,
            presentations,
            meetup_url: None,
            video_url: None,
            social_posts: None,
            video_titles: None,
            images: None,
        }
    }

    /// Sets the meetup link (builder pattern)
    #[cfg(test)]
    pub fn with_meetup_url(mut self, url: &str) -> Self {
        self.meetup_url = Some(url.to_string());
        self
    }

    /// `{meetingDate}_{meetingType}`, the stem of the output file name
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.date_label(), self.meeting_type)
    }

    /// Meeting date in `YYYY-MM-DD` form
    pub fn date_label(&self) -> String {
        self.meeting_date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meeting() -> Meeting {
        Meeting::new(
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            MeetingType::Sluug,
            vec![Presentation::new(
                "Intro to Containers",
                &["Jane Doe"],
                "A talk about containers.",
            )],
        )
    }

    #[test]
    fn test_serializes_camel_case_without_empty_options() {
        let json = serde_json::to_value(sample_meeting()).unwrap();
        assert_eq!(json["meetingDate"], "2024-02-14");
        assert_eq!(json["meetingType"], "SLUUG");
        assert_eq!(json["presentations"][0]["presenterNames"][0], "Jane Doe");
        assert_eq!(json["presentations"][0]["abstract"], "A talk about containers.");
        assert!(json.get("meetupUrl").is_none());
        assert!(json["presentations"][0].get("tags").is_none());
    }

    #[test]
    fn test_image_bytes_are_not_serialized() {
        let mut meeting = sample_meeting();
        meeting.images = Some(vec![GeneratedImage {
            src: "a.png".to_string(),
            alt: "a penguin".to_string(),
            data: vec![1, 2, 3],
        }]);
        let json = serde_json::to_value(&meeting).unwrap();
        assert_eq!(json["images"][0], serde_json::json!({"src": "a.png", "alt": "a penguin"}));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(sample_meeting().file_stem(), "2024-02-14_SLUUG");
    }

    #[test]
    fn test_meeting_type_wire_names() {
        assert_eq!(MeetingType::from_wire("STLLUG"), Some(MeetingType::Stllug));
        assert_eq!(MeetingType::from_wire("sluug"), None);
        assert_eq!(MeetingType::Sluug.to_string(), "SLUUG");
    }
}
