use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::ApiError;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";


#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    /// An optional system prompt followed by the user prompt.
    pub fn conversation(system: Option<&str>, user: impl Into<String>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system.filter(|s| !s.is_empty()) {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(user));
        messages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Text deltas in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ApiError>> + Send>>;

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Returns the content of the first choice.
    async fn complete(&self, messages: &[Message], options: &ChatOptions) -> Result<String, ApiError>;

    /// Streams the content deltas of the first choice.
    async fn complete_stream(&self, messages: &[Message], options: &ChatOptions) -> Result<TextStream, ApiError>;
}

/// A question answered with the file search tool over zero or more vector stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub model: String,
    pub question: String,
    pub vector_store_ids: Vec<String>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>, vector_store_id: Option<String>) -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            question: question.into(),
            vector_store_ids: vector_store_id.into_iter().collect(),
        }
    }
}

#[async_trait]
pub trait FileSearchApi: Send + Sync {
    /// Streams the text deltas of the answer.
    async fn ask_stream(&self, request: &AskRequest) -> Result<TextStream, ApiError>;
}
