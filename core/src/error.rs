use std::error::Error as StdError;
use thiserror::Error;


/// Provider-neutral failure of a remote call.
///
/// Provider crates convert their own error types into this one at the trait
/// boundary, so callers only ever match on these variants.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, DNS failure).
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),

    /// Invalid API key or insufficient permissions.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The addressed resource (vector store, file, model) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other non-success status reported by the service.
    #[error("API error: status={status}, message={message}")]
    Api { status: u16, message: String },

    /// Rejected before sending, or reported by the service as a bad request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A successful response whose body could not be decoded.
    #[error("Response parsing error: {0}")]
    Parsing(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Streaming error: {0}")]
    Streaming(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local file access failed (reading an upload, for instance).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
