//! Error types for ReportForge.
//!
//! Library crates use [`ReportForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The variants encode the retry taxonomy: `NotFound`, `RateLimited` and
//! `Unauthorized` are fatal and never retried; `Network` is transient and
//! eligible for bounded retry inside the fetcher, surfacing as
//! `ExhaustedRetries` once the attempt budget is spent.

use std::path::PathBuf;

/// Top-level error type for all ReportForge operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The repository locator did not match the expected shape.
    #[error("invalid repository locator '{input}': expected owner/repo or a github.com URL")]
    InvalidLocator { input: String },

    /// The remote resource does not exist (HTTP 404). Never retried.
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// The remote refused the request (HTTP 403). Never retried within a call.
    #[error("rate limited or forbidden: {url}")]
    RateLimited { url: String },

    /// The generation service rejected the credential (HTTP 401).
    #[error("generation service unauthorized: {0}")]
    Unauthorized(String),

    /// Transient network/HTTP failure, retryable inside the fetcher.
    #[error("network error: {0}")]
    Network(String),

    /// All retry attempts for a fetch were spent without success.
    #[error("failed to fetch {url} after {attempts} attempts")]
    ExhaustedRetries { url: String, attempts: u32 },

    /// Generation service error (API failure or malformed response).
    #[error("generation error: {0}")]
    Generation(String),

    /// Data validation error (empty response, empty page set, bad listing).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReportForgeError>;

impl ReportForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
