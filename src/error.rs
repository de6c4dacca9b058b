/// Error types for the meeting enrichment tool
///
/// Uses thiserror for ergonomic error handling with proper Display implementations.
use crate::domain::validation::FieldViolation;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Schema validation failed: {}", format_violations(.0))]
    SchemaValidation(Vec<FieldViolation>),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Generation contract violated by tool '{tool}': {detail}")]
    GenerationContract { tool: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("LLM service error: {0}")]
    Llm(String),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wraps the error with the name of the pipeline stage it came from
    pub fn in_stage(self, stage: &str) -> Self {
        AppError::Stage {
            stage: stage.to_string(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a structured-output mismatch
    pub fn contract(tool: &str, detail: impl Into<String>) -> Self {
        AppError::GenerationContract {
            tool: tool.to_string(),
            detail: detail.into(),
        }
    }

    /// The innermost error, looking through stage wrappers
    #[cfg(test)]
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
