use std::sync::Arc;

use reqwest::Client;

mod chat;
mod error;
mod files;
mod responses;
mod shared;
mod speech;
mod sse;
mod vector_stores;

pub use error::{OpenAiError, OpenAiErrorDetail, OpenAiErrorResponse};
pub use shared::{OpenAiConfig, DEFAULT_OPENAI_BASE_URL};
use shared::SharedOpenAiClient;

/// Client for the OpenAI REST API. Implements every API trait of `oai_core`;
/// clones share one connection pool.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    shared: Arc<SharedOpenAiClient>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, OpenAiError> {
        Self::new_with_options(config, None)
    }

    pub fn new_with_options(config: OpenAiConfig, client_override: Option<Client>) -> Result<Self, OpenAiError> {
        let shared = SharedOpenAiClient::new(config, client_override)?;
        Ok(OpenAiClient {
            shared: Arc::new(shared),
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        self.shared.config()
    }
}
