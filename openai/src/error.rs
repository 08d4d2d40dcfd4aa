use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use oai_core::ApiError;

// ============== OpenAI API Error Structures ==============

/// Error envelope returned by the OpenAI API on non-success statuses.
#[derive(Deserialize, Debug, Clone)]
pub struct OpenAiErrorResponse {
    pub error: OpenAiErrorDetail,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpenAiErrorDetail {
    pub message: String,
    /// Error class, e.g. "invalid_request_error".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

// ============== Internal Client Error Enum ==============

/// Every failure inside the OpenAI client. Converted into the public
/// [`ApiError`] at the trait implementation boundaries.
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to serialize request body: {0}")]
    RequestSerialization(#[source] serde_json::Error),

    /// A *successful* response whose body did not match the expected shape.
    #[error("Failed to parse successful response body ({context}): {source}")]
    ResponseParsing {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("OpenAI API error: status={status}, message='{}'", api_message(.detail, .body_text))]
    ApiError {
        status: StatusCode,
        detail: Option<OpenAiErrorDetail>,
        body_text: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to access or read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected response format or data: {0}")]
    UnexpectedResponse(String),

    #[error("Streaming error: {0}")]
    Streaming(String),
}

fn api_message<'a>(detail: &'a Option<OpenAiErrorDetail>, body_text: &'a str) -> &'a str {
    detail.as_ref().map_or(body_text, |d| d.message.as_str())
}

impl OpenAiError {
    /// Builds an `ApiError` from a status and the raw error body, keeping the
    /// parsed detail when the body is the usual error envelope.
    pub(crate) fn from_status(status: StatusCode, body_text: String) -> Self {
        let detail = match serde_json::from_str::<OpenAiErrorResponse>(&body_text) {
            Ok(parsed) => Some(parsed.error),
            Err(parse_err) => {
                warn!(
                    status = %status,
                    error = %parse_err,
                    body = %body_text,
                    "Failed to parse OpenAI error response JSON, returning raw body."
                );
                None
            }
        };
        OpenAiError::ApiError { status, detail, body_text }
    }
}

/// Consumes a response with a non-success status and turns it into an
/// `OpenAiError::ApiError`. Falls back to `Network` if even the body cannot
/// be read.
pub(crate) async fn map_response_error(response: reqwest::Response) -> OpenAiError {
    let status = response.status();
    debug_assert!(!status.is_success(), "map_response_error called with success status");

    match response.text().await {
        Ok(body_text) => OpenAiError::from_status(status, body_text),
        Err(e) => {
            warn!(status = %status, error = %e, "Failed to read OpenAI error response body text.");
            OpenAiError::Network(e)
        }
    }
}

// ============== From<OpenAiError> for ApiError ==============

impl From<OpenAiError> for ApiError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::Network(source) => ApiError::Network(Box::new(source)),
            OpenAiError::RequestSerialization(source) => {
                ApiError::InvalidRequest(format!("Failed to serialize request: {}", source))
            }
            OpenAiError::ResponseParsing { source, .. } => ApiError::Parsing(Box::new(source)),
            OpenAiError::ApiError { status, detail, body_text } => {
                let message = match detail {
                    Some(d) => match d.code {
                        Some(code) => format!("{} (code: {})", d.message, code),
                        None => d.message,
                    },
                    None => body_text,
                };

                match status {
                    StatusCode::BAD_REQUEST => ApiError::InvalidRequest(message), // 400
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Authentication(message), // 401, 403
                    StatusCode::NOT_FOUND => ApiError::NotFound(message), // 404
                    StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message), // 429
                    _ => ApiError::Api { status: status.as_u16(), message },
                }
            }
            OpenAiError::InvalidConfiguration(msg) => ApiError::Configuration(msg),
            OpenAiError::InvalidPath(path) => {
                ApiError::InvalidRequest(format!("Not a readable file: {}", path.display()))
            }
            OpenAiError::Io(source) => ApiError::Io(source),
            OpenAiError::UnexpectedResponse(msg) => ApiError::Parsing(msg.into()),
            OpenAiError::Streaming(msg) => ApiError::Streaming(msg),
        }
    }
}
