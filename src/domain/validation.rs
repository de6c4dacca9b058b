//! Structural validation of untrusted meeting JSON
//!
//! Every external record passes through [`validate_meeting`] before any
//! enrichment runs. Validation walks the raw JSON and reports every
//! non-conforming field at once instead of stopping at the first one, then
//! hands the value to serde.

use crate::domain::models::{Meeting, MeetingType};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};

pub const MAX_TAGS: usize = 3;
pub const SOCIAL_POST_COUNT: usize = 3;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path with indices, e.g. `presentations[0].title`
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Field-level constraints on an already-typed value
pub trait Validate {
    fn violations(&self) -> Vec<FieldViolation>;
}

/// Parses a strict `YYYY-MM-DD` date
pub fn parse_meeting_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

impl Validate for Meeting {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.presentations.is_empty() {
            violations.push(FieldViolation::new(
                "presentations",
                "must contain at least one presentation",
            ));
        }
        for (index, presentation) in self.presentations.iter().enumerate() {
            if let Some(tags) = presentation.tags.as_ref().filter(|t| t.len() > MAX_TAGS) {
                violations.push(FieldViolation::new(
                    &format!("presentations[{}].tags", index),
                    format!("must have at most {} entries, found {}", MAX_TAGS, tags.len()),
                ));
            }
            if let Some(posts) = presentation
                .social_posts
                .as_ref()
                .filter(|p| p.len() != SOCIAL_POST_COUNT)
            {
                violations.push(FieldViolation::new(
                    &format!("presentations[{}].socialPosts", index),
                    format!(
                        "must have exactly {} entries, found {}",
                        SOCIAL_POST_COUNT,
                        posts.len()
                    ),
                ));
            }
        }
        for (index, image) in self.images.iter().flatten().enumerate() {
            if !is_plain_file_name(&image.src) {
                violations.push(FieldViolation::new(
                    &format!("images[{}].src", index),
                    unsafe_src_message(&image.src),
                ));
            }
        }
        violations
    }
}

/// True for a bare file name that stays inside the output directory
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

fn unsafe_src_message(src: &str) -> String {
    format!("'{}' must be a plain file name without '/', '\\' or '..'", src)
}

/// Validates raw JSON and converts it into a [`Meeting`]
pub fn validate_meeting(value: &Value) -> Result<Meeting> {
    let violations = meeting_violations(value);
    if !violations.is_empty() {
        return Err(AppError::SchemaValidation(violations));
    }
    Ok(serde_json::from_value(value.clone())?)
}

/// Collects every violation in a raw meeting document
pub fn meeting_violations(value: &Value) -> Vec<FieldViolation> {
    let mut checker = Checker::default();
    let Some(root) = value.as_object() else {
        checker.fail("$", "expected a JSON object");
        return checker.violations;
    };

    if let Some(date) = checker.required_str(root, "", "meetingDate") {
        if parse_meeting_date(date).is_none() {
            checker.fail("meetingDate", format!("'{}' is not a YYYY-MM-DD date", date));
        }
    }

    if let Some(kind) = checker.required_str(root, "", "meetingType") {
        if MeetingType::from_wire(kind).is_none() {
            let allowed: Vec<_> = MeetingType::ALL.iter().map(|t| t.as_str()).collect();
            checker.fail(
                "meetingType",
                format!("'{}' is not one of {}", kind, allowed.join(", ")),
            );
        }
    }

    match root.get("presentations") {
        None | Some(Value::Null) => checker.fail("presentations", "is required"),
        Some(Value::Array(items)) if items.is_empty() => {
            checker.fail("presentations", "must contain at least one presentation")
        }
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                checker.presentation(item, &format!("presentations[{}]", index));
            }
        }
        Some(other) => checker.fail("presentations", expected("an array", other)),
    }

    checker.optional_str(root, "", "meetupUrl");
    checker.optional_str(root, "", "videoUrl");
    checker.optional_strings(root, "", "socialPosts", None);
    checker.optional_strings(root, "", "videoTitles", None);

    match root.get("images") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let path = format!("images[{}]", index);
                match item.as_object() {
                    Some(image) => {
                        if let Some(src) = checker.required_str(image, &path, "src") {
                            if !is_plain_file_name(src) {
                                checker.fail(&join(&path, "src"), unsafe_src_message(src));
                            }
                        }
                        checker.required_str(image, &path, "alt");
                    }
                    None => checker.fail(&path, expected("an object", item)),
                }
            }
        }
        Some(other) => checker.fail("images", expected("an array", other)),
    }

    checker.violations
}

#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

#[derive(Clone, Copy)]
enum Cardinality {
    AtMost(usize),
    Exactly(usize),
}

impl Checker {
    fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(path, message));
    }

    fn required_str<'a>(
        &mut self,
        object: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a str> {
        let path = join(parent, key);
        match object.get(key) {
            None | Some(Value::Null) => {
                self.fail(&path, "is required");
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                self.fail(&path, expected("a string", other));
                None
            }
        }
    }

    fn optional_str(&mut self, object: &Map<String, Value>, parent: &str, key: &str) {
        match object.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => self.fail(&join(parent, key), expected("a string", other)),
        }
    }

    fn strings(&mut self, value: &Value, path: &str, cardinality: Option<Cardinality>) {
        let Some(items) = value.as_array() else {
            self.fail(path, expected("an array of strings", value));
            return;
        };
        for (index, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.fail(&format!("{}[{}]", path, index), expected("a string", item));
            }
        }
        match cardinality {
            Some(Cardinality::AtMost(max)) if items.len() > max => self.fail(
                path,
                format!("must have at most {} entries, found {}", max, items.len()),
            ),
            Some(Cardinality::Exactly(n)) if items.len() != n => self.fail(
                path,
                format!("must have exactly {} entries, found {}", n, items.len()),
            ),
            _ => {}
        }
    }

    fn optional_strings(
        &mut self,
        object: &Map<String, Value>,
        parent: &str,
        key: &str,
        cardinality: Option<Cardinality>,
    ) {
        match object.get(key) {
            None | Some(Value::Null) => {}
            Some(value) => self.strings(value, &join(parent, key), cardinality),
        }
    }

    fn presentation(&mut self, value: &Value, path: &str) {
        let Some(object) = value.as_object() else {
            self.fail(path, expected("an object", value));
            return;
        };

        self.required_str(object, path, "title");
        self.required_str(object, path, "abstract");

        match object.get("presenterNames") {
            None | Some(Value::Null) => self.fail(&join(path, "presenterNames"), "is required"),
            Some(names) => self.strings(names, &join(path, "presenterNames"), None),
        }

        match object.get("references") {
            None | Some(Value::Null) => {}
            Some(Value::Array(references)) => {
                for (index, reference) in references.iter().enumerate() {
                    let ref_path = format!("{}.references[{}]", path, index);
                    match reference.as_object() {
                        Some(link) => {
                            self.required_str(link, &ref_path, "url");
                            self.optional_str(link, &ref_path, "displayText");
                        }
                        None => self.fail(&ref_path, expected("an object", reference)),
                    }
                }
            }
            Some(other) => self.fail(&join(path, "references"), expected("an array", other)),
        }

        self.optional_strings(object, path, "tags", Some(Cardinality::AtMost(MAX_TAGS)));
        self.optional_strings(
            object,
            path,
            "socialPosts",
            Some(Cardinality::Exactly(SOCIAL_POST_COUNT)),
        );
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn expected(what: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("expected {}, found {}", what, kind)
}
