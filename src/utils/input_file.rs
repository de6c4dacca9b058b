//! Input file utilities for loading meeting records
//!
//! Two invocation modes are supported:
//! - an explicit JSON file path, validated as a complete meeting
//! - a templates directory, where each file is named
//!   `YYYY-MM-DD<anything>sluug.json` or `...stllug.json` and the name
//!   supplies the meeting date and type

use crate::domain::models::{Meeting, MeetingType};
use crate::domain::validation::{parse_meeting_date, validate_meeting, FieldViolation};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::{Path, PathBuf};

const STLLUG_SUFFIX: &str = "stllug.json";
const SLUUG_SUFFIX: &str = "sluug.json";

/// Date and meeting type encoded in a template file name
pub fn parse_template_name(file_name: &str) -> Option<(NaiveDate, MeetingType)> {
    let date = parse_meeting_date(file_name.get(..10)?)?;
    let meeting_type = if file_name.ends_with(STLLUG_SUFFIX) {
        MeetingType::Stllug
    } else if file_name.ends_with(SLUUG_SUFFIX) {
        MeetingType::Sluug
    } else {
        return None;
    };
    Some((date, meeting_type))
}

async fn read_json(path: &Path) -> Result<Value> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::MissingInput(format!(
                "{} does not exist",
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&text)?)
}

/// Load and validate a complete meeting record
pub async fn load_meeting<P: AsRef<Path>>(path: P) -> Result<Meeting> {
    let path = path.as_ref();
    let value = read_json(path).await?;
    let meeting = validate_meeting(&value)?;
    log::info!(
        "Loaded {} with {} presentation(s)",
        path.display(),
        meeting.presentations.len()
    );
    Ok(meeting)
}

/// Template files in `dir`, sorted by name
pub async fn discover_templates<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::MissingInput(format!(
                "templates directory {} does not exist",
                dir.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let mut templates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if parse_template_name(name).is_some() && entry.file_type().await?.is_file() {
            templates.push(entry.path());
        } else {
            log::debug!("Skipping {} in templates directory", name);
        }
    }

    if templates.is_empty() {
        return Err(AppError::MissingInput(format!(
            "no YYYY-MM-DD*sluug.json or *stllug.json templates in {}",
            dir.display()
        )));
    }

    templates.sort();
    Ok(templates)
}

/// Fills date and type from the file name into a template record
pub fn apply_template_name(
    value: &mut Value,
    date: NaiveDate,
    meeting_type: MeetingType,
) -> Result<()> {
    let Some(object) = value.as_object_mut() else {
        return Err(AppError::SchemaValidation(vec![FieldViolation::new(
            "$",
            "expected a JSON object",
        )]));
    };

    let expected = [
        ("meetingDate", date.format("%Y-%m-%d").to_string()),
        ("meetingType", meeting_type.as_str().to_string()),
    ];

    let mut violations = Vec::new();
    for (key, from_name) in expected {
        let current = object.get(key).filter(|v| !v.is_null()).cloned();
        match current {
            None => {
                object.insert(key.to_string(), Value::String(from_name));
            }
            Some(Value::String(existing)) if existing == from_name => {}
            Some(existing) => violations.push(FieldViolation::new(
                key,
                format!("{} conflicts with file name value '{}'", existing, from_name),
            )),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::SchemaValidation(violations))
    }
}

/// Load a template, taking date and type from its file name
pub async fn load_template<P: AsRef<Path>>(path: P) -> Result<Meeting> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let (date, meeting_type) = parse_template_name(name).ok_or_else(|| {
        AppError::MissingInput(format!(
            "{} is not named YYYY-MM-DD*sluug.json or *stllug.json",
            path.display()
        ))
    })?;

    let mut value = read_json(path).await?;
    apply_template_name(&mut value, date, meeting_type)?;
    let meeting = validate_meeting(&value)?;
    log::info!("Loaded template {}", path.display());
    Ok(meeting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn template_body() -> Value {
        json!({
            "presentations": [{
                "title": "Intro to Containers",
                "presenterNames": ["Jane Doe"],
                "abstract": "A talk about containers."
            }]
        })
    }

    #[test]
    fn test_parse_template_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        assert_eq!(
            parse_template_name("2024-02-14-sluug.json"),
            Some((date, MeetingType::Sluug))
        );
        assert_eq!(
            parse_template_name("2024-02-14_stllug.json"),
            Some((date, MeetingType::Stllug))
        );
        assert_eq!(parse_template_name("2024-02-14-lug.json"), None);
        assert_eq!(parse_template_name("2024-2-14--sluug.json"), None);
        assert_eq!(parse_template_name("2024-02-14-sluug.json.bak"), None);
        assert_eq!(parse_template_name("sluug.json"), None);
    }

    #[tokio::test]
    async fn test_load_meeting_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meeting.json");
        let mut body = template_body();
        apply_template_name(
            &mut body,
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            MeetingType::Sluug,
        )
        .unwrap();
        std::fs::write(&path, body.to_string()).unwrap();

        let meeting = load_meeting(&path).await.unwrap();
        assert_eq!(meeting.meeting_type, MeetingType::Sluug);
        assert_eq!(meeting.presentations[0].title, "Intro to Containers");
    }

    #[tokio::test]
    async fn test_missing_file_is_missing_input() {
        let dir = tempdir().unwrap();
        let err = load_meeting(dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_invalid_file_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meeting.json");
        std::fs::write(&path, template_body().to_string()).unwrap();

        let err = load_meeting(&path).await.unwrap_err();
        match err {
            AppError::SchemaValidation(violations) => {
                let paths: Vec<_> = violations.iter().map(|v| v.path.as_str()).collect();
                assert_eq!(paths, vec!["meetingDate", "meetingType"]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_discover_and_load_templates() {
        let dir = tempdir().unwrap();
        for name in ["2024-03-13-stllug.json", "2024-02-14-sluug.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), template_body().to_string()).unwrap();
        }

        let templates = discover_templates(dir.path()).await.unwrap();
        assert_eq!(
            templates,
            vec![
                dir.path().join("2024-02-14-sluug.json"),
                dir.path().join("2024-03-13-stllug.json"),
            ]
        );

        let meeting = load_template(&templates[1]).await.unwrap();
        assert_eq!(meeting.meeting_type, MeetingType::Stllug);
        assert_eq!(meeting.date_label(), "2024-03-13");
    }

    #[tokio::test]
    async fn test_empty_templates_dir_is_missing_input() {
        let dir = tempdir().unwrap();
        let err = discover_templates(dir.path()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));

        let err = discover_templates(dir.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));
    }

    #[test]
    fn test_conflicting_template_fields_rejected() {
        let mut body = template_body();
        body["meetingType"] = json!("STLLUG");
        let err = apply_template_name(
            &mut body,
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            MeetingType::Sluug,
        )
        .unwrap_err();
        match err {
            AppError::SchemaValidation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].path, "meetingType");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
