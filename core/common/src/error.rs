//! Common error types for Portage.

use thiserror::Error;

/// Top-level error type for storage operations.
///
/// Transport-level failures surface immediately as typed errors with no
/// automatic retry; retry policy, if any, belongs to the transport layer.
/// Every variant carries enough context (path, backend name, attempted
/// operation) for callers to render an actionable message.
#[derive(Debug, Error)]
pub enum Error {
    /// Path or identifier cannot be resolved.
    #[error("{provider}: not found: {path}")]
    NotFound { provider: String, path: String },

    /// Metadata request for an unsupported path shape, with an
    /// HTTP-like status code.
    #[error("{provider}: metadata error ({code}): {message}")]
    Metadata {
        provider: String,
        message: String,
        code: u16,
    },

    /// Non-success transport response on a content fetch.
    #[error("{provider}: download of {path} failed with status {status}")]
    Download {
        provider: String,
        path: String,
        status: u16,
    },

    /// Post-upload listing match failed: the backend accepted the content
    /// but the correlated entry never appeared in a fresh listing.
    #[error("{provider}: uploaded entry for {path} missing from listing (correlation id: {correlation_id})")]
    UploadConsistency {
        provider: String,
        path: String,
        correlation_id: String,
    },

    /// Operation is not supported by this backend for this path.
    #[error("{provider}: {operation} not supported for {path}")]
    UnsupportedOperation {
        provider: String,
        operation: &'static str,
        path: String,
    },

    /// Raw path failed validation (not absolute, traversal, bad segment).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Backend settings mapping was malformed.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Transport-level failure (connect, send, read).
    #[error("network error: {0}")]
    Network(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed (e.g. upload spool buffer).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
