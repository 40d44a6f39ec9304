//! Error types for g2w.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Primary error type for all g2w operations.
#[derive(Error, Debug)]
pub enum G2wError {
    #[error("Empty response from remote")]
    EmptyResponse,

    #[error("Remote error: {message}")]
    Remote {
        code: Option<String>,
        message: String,
    },

    /// The remote answered with a mapping that is neither an error nor a token grant.
    #[error("Response rejected: {}", .errors.join("; "))]
    Rejected { errors: Vec<String> },

    #[error("Invalid credential state: {0}")]
    InvalidCredentialState(String),

    #[error("Refresh token expired (issued at {issued_at})")]
    RefreshExpired { issued_at: DateTime<Utc> },

    #[error("Invalid redirect from {url}: {output}")]
    InvalidRedirect { url: String, output: String },

    #[error("Invalid method {0}")]
    InvalidMethod(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The remote API reported a failure in its payload.
    Remote,
    /// The local credential cannot perform the requested step.
    Credential,
    /// The request could not be sent or the connection failed.
    Network,
    /// The remote answered with something this client cannot interpret.
    Protocol,
    /// The caller passed something unusable.
    Usage,
    Configuration,
}

impl G2wError {
    /// Create a remote error carrying only a message.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            code: None,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Remote { .. } | Self::Rejected { .. } => ErrorCategory::Remote,
            Self::InvalidCredentialState(_) | Self::RefreshExpired { .. } => {
                ErrorCategory::Credential
            }
            Self::Network(_) => ErrorCategory::Network,
            Self::EmptyResponse
            | Self::InvalidRedirect { .. }
            | Self::MalformedOutput(_) => ErrorCategory::Protocol,
            Self::InvalidMethod(_) => ErrorCategory::Usage,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether the same call might succeed if the caller tries again.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    /// Error log carried by the failure, oldest entry first.
    pub fn errors(&self) -> Vec<String> {
        match self {
            Self::Rejected { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, G2wError>;
