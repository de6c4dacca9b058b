//! Structured-output tools handed to the generative API
//!
//! Each stage asks the model to "call" one function whose parameters are the
//! JSON Schema of a response type below. The schema only steers the model;
//! the [`Validate`] impls are what actually enforce the contract.

use crate::domain::validation::{FieldViolation, Validate, MAX_TAGS, SOCIAL_POST_COUNT};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const VIDEO_TITLE_COUNT: usize = 3;

/// A function tool definition in the shape the chat APIs expect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the expected arguments
    pub parameters: Value,
}

/// Builds a tool definition from the JSON Schema of `T`
pub fn tool_definition<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(T);
    let mut parameters = serde_json::to_value(schema).unwrap_or(Value::Null);
    if let Some(object) = parameters.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// A response type the model is asked to produce through a tool call
pub trait ToolOutput: JsonSchema + DeserializeOwned + Validate {
    /// Function name the model must call
    const TOOL: &'static str;
    const DESCRIPTION: &'static str;

    fn tool() -> ToolDefinition {
        tool_definition::<Self>(Self::TOOL, Self::DESCRIPTION)
    }
}

/// Tags for one presentation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagSet {
    /// Up to three short topic tags
    #[schemars(length(max = 3))]
    pub tags: Vec<String>,
}

impl ToolOutput for TagSet {
    const TOOL: &'static str = "tag_presentation";
    const DESCRIPTION: &'static str = "Record up to three short topic tags describing the presentation";
}

impl Validate for TagSet {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.tags.len() > MAX_TAGS {
            violations.push(FieldViolation::new(
                "tags",
                format!("expected at most {} tags, got {}", MAX_TAGS, self.tags.len()),
            ));
        }
        violations
    }
}

/// Promotional posts for one presentation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SocialPostSet {
    /// Exactly three short promotional posts
    #[schemars(length(min = 3, max = 3))]
    pub posts: Vec<String>,
}

impl ToolOutput for SocialPostSet {
    const TOOL: &'static str = "write_social_posts";
    const DESCRIPTION: &'static str = "Record three short social media posts promoting the presentation";
}

impl Validate for SocialPostSet {
    fn violations(&self) -> Vec<FieldViolation> {
        exact_count("posts", &self.posts, SOCIAL_POST_COUNT)
    }
}

/// Candidate video titles for one invocation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoTitleSet {
    /// Exactly three candidate titles for the recorded video
    #[schemars(length(min = 3, max = 3))]
    pub titles: Vec<String>,
}

impl ToolOutput for VideoTitleSet {
    const TOOL: &'static str = "write_video_titles";
    const DESCRIPTION: &'static str = "Record three candidate titles for the meeting video";
}

impl Validate for VideoTitleSet {
    fn violations(&self) -> Vec<FieldViolation> {
        exact_count("titles", &self.titles, VIDEO_TITLE_COUNT)
    }
}

/// One design idea for an illustrative image
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageDesign {
    /// Visual description of the image to generate
    pub description: String,
}

impl ToolOutput for ImageDesign {
    const TOOL: &'static str = "design_image";
    const DESCRIPTION: &'static str = "Record a description of an illustrative image for the meeting";
}

impl Validate for ImageDesign {
    fn violations(&self) -> Vec<FieldViolation> {
        if self.description.trim().is_empty() {
            vec![FieldViolation::new("description", "must not be empty")]
        } else {
            Vec::new()
        }
    }
}

fn exact_count(field: &str, items: &[String], expected: usize) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if items.len() != expected {
        violations.push(FieldViolation::new(
            field,
            format!("expected exactly {} entries, got {}", expected, items.len()),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        if item.trim().is_empty() {
            violations.push(FieldViolation::new(
                &format!("{}[{}]", field, index),
                "must not be empty",
            ));
        }
    }
    violations
}
