use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, trace};
use url::Url;

use super::error::{map_response_error, OpenAiError};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const ASSISTANTS_BETA_HEADER: &str = "OpenAI-Beta";
const ASSISTANTS_BETA_VALUE: &str = "assistants=v2";


/// Configuration for the OpenAI client. Built once per process.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub(crate) api_key: SecretString,
    /// Base URL including the version segment, e.g. `https://api.openai.com/v1`.
    pub(crate) base_url: Url,
    /// Total timeout for non-streaming requests. Defaults to 60 seconds.
    pub(crate) timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a configuration for the public endpoint.
    ///
    /// # Errors
    /// Returns `OpenAiError::InvalidConfiguration` if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OpenAiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OpenAiError::InvalidConfiguration("API key cannot be empty".to_string()));
        }

        let base_url = Url::parse(DEFAULT_OPENAI_BASE_URL)
            .map_err(|e| OpenAiError::InvalidConfiguration(
                format!("Internal error: Failed to parse default base URL: {}", e)
            ))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            timeout: Duration::from_secs(60),
        })
    }

    /// Points the client at another OpenAI-compatible endpoint.
    pub fn base_url(mut self, url: &str) -> Result<Self, OpenAiError> {
        let parsed = Url::parse(url)
            .map_err(|e| OpenAiError::InvalidConfiguration(
                format!("Invalid base URL '{}': {}", url, e)
            ))?;
        if parsed.cannot_be_a_base() {
            return Err(OpenAiError::InvalidConfiguration(
                format!("Base URL '{}' cannot carry a path", url)
            ));
        }
        self.base_url = parsed;
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url_str(&self) -> &str {
        self.base_url.as_str()
    }
}

/// HTTP client plus configuration, shared by every API implementation.
#[derive(Clone, Debug)]
pub(crate) struct SharedOpenAiClient {
    config: OpenAiConfig,
    http_client: Client,
}

impl SharedOpenAiClient {
    /// Builds a default reqwest client if one is not provided. The client
    /// itself has no total timeout so that streams can run long; bounded
    /// requests get the configured timeout through [`Self::request`].
    #[instrument(name = "shared_openai_client_new", skip(config, client_override))]
    pub(crate) fn new(config: OpenAiConfig, client_override: Option<Client>) -> Result<Self, OpenAiError> {
        let client = match client_override {
            Some(client) => {
                debug!("Using provided HTTP client.");
                client
            }
            None => {
                debug!(timeout = ?config.timeout, "Building default HTTP client.");
                Client::builder()
                    .connect_timeout(config.timeout)
                    .build()
                    .map_err(|e| OpenAiError::InvalidConfiguration(
                        format!("Failed to build default HTTP client: {}", e)
                    ))?
            }
        };

        // Log base URL without API key
        debug!(base_url = %config.base_url, "Shared OpenAI client initialized.");

        Ok(Self { config, http_client: client })
    }

    pub(crate) fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Appends path segments to the base URL; each segment is percent-encoded.
    pub(crate) fn build_url(&self, segments: &[&str]) -> Result<Url, OpenAiError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OpenAiError::InvalidConfiguration("Base URL cannot be a 'cannot-be-a-base' URL.".to_string()))?
            .pop_if_empty()
            .extend(segments);

        trace!(built_url = %url, "Built OpenAI API URL");
        Ok(url)
    }

    /// Authenticated request with the configured timeout.
    pub(crate) fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.streaming_request(method, url).timeout(self.config.timeout)
    }

    /// Authenticated request without a total timeout.
    pub(crate) fn streaming_request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key.expose_secret()))
    }

    /// Authenticated request for the vector store routes.
    pub(crate) fn vector_store_request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.request(method, url)
            .header(ASSISTANTS_BETA_HEADER, HeaderValue::from_static(ASSISTANTS_BETA_VALUE))
    }

    /// Sends the request and maps non-success statuses to `OpenAiError::ApiError`.
    pub(crate) async fn execute(&self, request: RequestBuilder, context: &str) -> Result<Response, OpenAiError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, context, "Request to OpenAI failed");
            OpenAiError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, context, "OpenAI API returned error status");
            return Err(map_response_error(response).await);
        }
        debug!(%status, context, "Received successful response");
        Ok(response)
    }

    /// Reads and decodes a successful JSON response body.
    pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, OpenAiError> {
        let raw_body = response.text().await.map_err(|e| {
            error!(error = %e, context, "Failed to read successful response body");
            OpenAiError::Network(e)
        })?;
        trace!(body = %raw_body, context, "Received response body");

        serde_json::from_str(&raw_body).map_err(|e| {
            error!(parse_error = %e, raw_body = %raw_body, context, "Failed to parse response JSON");
            OpenAiError::ResponseParsing {
                context: context.to_string(),
                source: e,
            }
        })
    }

    /// `execute` followed by `parse_json`.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> Result<T, OpenAiError> {
        let response = self.execute(request, context).await?;
        Self::parse_json(response, context).await
    }
}
