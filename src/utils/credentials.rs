//! API key lookup
//!
//! The generative API key comes from a process environment variable
//! (optionally populated from a `.env` file at startup). A missing key is a
//! fatal configuration error raised before any network call.

use crate::error::{AppError, Result};

/// Default environment variable holding the API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Trait for credential lookup - allows for mocking in tests
#[cfg_attr(test, mockall::automock)]
pub trait CredentialPort: Send + Sync {
    fn api_key(&self) -> Result<String>;
}

/// Reads the API key from an environment variable
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    /// Creates a lookup for the given variable name
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_VAR)
    }
}

impl CredentialPort for EnvCredentials {
    fn api_key(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(AppError::MissingCredential(self.var.clone())),
        }
    }
}
