/// Filesystem output adapter
///
/// Implements OutputPort by writing the enriched record as pretty JSON and
/// each generated image next to it in a single directory.
use crate::domain::models::Meeting;
use crate::error::Result;
use crate::ports::storage::OutputPort;
use async_trait::async_trait;
use std::path::PathBuf;

/// Writes meetings into one output directory
pub struct FileSystemOutput {
    dir: PathBuf,
}

impl FileSystemOutput {
    /// Create an output adapter rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where the record for `meeting` is written
    pub fn record_path(&self, meeting: &Meeting) -> PathBuf {
        self.dir.join(format!("{}.json", meeting.file_stem()))
    }
}

/// Pretty-printed record with a trailing newline
pub fn render_record(meeting: &Meeting) -> Result<String> {
    let mut json = serde_json::to_string_pretty(meeting)?;
    json.push('\n');
    Ok(json)
}

#[async_trait]
impl OutputPort for FileSystemOutput {
    async fn write_meeting(&self, meeting: &Meeting) -> Result<PathBuf> {
        let record = render_record(meeting)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        for image in meeting.images.iter().flatten() {
            // Images carried over from the input have no bytes
            if image.data.is_empty() {
                log::debug!("Leaving existing image {} untouched", image.src);
                continue;
            }
            let path = self.dir.join(&image.src);
            tokio::fs::write(&path, &image.data).await?;
            log::info!("Wrote image {} ({} bytes)", path.display(), image.data.len());
        }

        let path = self.record_path(meeting);
        tokio::fs::write(&path, record).await?;
        log::info!("Wrote meeting record {}", path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{GeneratedImage, MeetingType, Presentation};
    use crate::error::AppError;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn meeting() -> Meeting {
        let mut meeting = Meeting::new(
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            MeetingType::Stllug,
            vec![Presentation::new("Intro to Containers", &["Jane Doe"], "Containers.")],
        );
        meeting.images = Some(vec![GeneratedImage {
            src: "2024-02-14_STLLUG_1_penguin.png".to_string(),
            alt: "A penguin".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        }]);
        meeting
    }

    #[tokio::test]
    async fn test_writes_record_and_images() {
        let dir = tempdir().unwrap();
        let output = FileSystemOutput::new(dir.path().join("out"));

        let path = output.write_meeting(&meeting()).await.unwrap();
        assert_eq!(path, dir.path().join("out").join("2024-02-14_STLLUG.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["images"][0]["src"], "2024-02-14_STLLUG_1_penguin.png");

        let image = std::fs::read(dir.path().join("out/2024-02-14_STLLUG_1_penguin.png")).unwrap();
        assert_eq!(image, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_carried_over_images_are_not_overwritten() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("keep.png");
        std::fs::write(&existing, [7u8; 16]).unwrap();

        let mut meeting = meeting();
        meeting.images = Some(vec![GeneratedImage {
            src: "keep.png".to_string(),
            alt: "An earlier image".to_string(),
            data: Vec::new(),
        }]);

        let output = FileSystemOutput::new(dir.path());
        let path = output.write_meeting(&meeting).await.unwrap();

        assert_eq!(std::fs::read(&existing).unwrap(), vec![7u8; 16]);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["images"][0]["src"], "keep.png");
    }

    #[tokio::test]
    async fn test_rewrite_is_byte_identical() {
        let dir = tempdir().unwrap();
        let output = FileSystemOutput::new(dir.path());

        let path = output.write_meeting(&meeting()).await.unwrap();
        let first = std::fs::read(&path).unwrap();
        output.write_meeting(&meeting()).await.unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unwritable_target_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let output = FileSystemOutput::new(&blocker);
        let err = output.write_meeting(&meeting()).await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
