/// Output port trait
///
/// Defines where an enriched meeting ends up.
/// Implementation: filesystem adapter
use crate::domain::models::Meeting;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Port trait for persisting enriched meetings
#[async_trait]
pub trait OutputPort: Send + Sync {
    /// Persist the record and its images, returning the record's location
    async fn write_meeting(&self, meeting: &Meeting) -> Result<PathBuf>;
}
