//! Gemini error types

use std::time::Duration;
use thiserror::Error;

/// Message shown when the last attempt hit its deadline
pub const TIMEOUT_MESSAGE: &str = "Model is busy right now. Please try again later.";

/// Message used when a failed response carries no readable error
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed after retries.";

/// Errors that can occur while talking to the generative-language API
#[derive(Debug, Error)]
pub enum GeminiError {
    /// The final attempt elapsed its per-attempt deadline
    #[error("Model is busy right now. Please try again later.")]
    Timeout { after: Duration },

    /// The final attempt returned a non-success status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Every attempt failed before a response could be read
    #[error("{last_message}")]
    ExhaustedRetries { attempts: u32, last_message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Gemini API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),
}

impl GeminiError {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, GeminiError::Timeout { .. })
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            GeminiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
