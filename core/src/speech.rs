use async_trait::async_trait;
use serde::Serialize;

use crate::ApiError;

pub const DEFAULT_SPEECH_MODEL: &str = "tts-1-hd";
pub const DEFAULT_VOICE: &str = "echo";


#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
    /// Audio container; the service defaults to mp3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

impl SpeechRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            input: input.into(),
            response_format: None,
        }
    }
}

#[async_trait]
pub trait SpeechApi: Send + Sync {
    /// Synthesizes speech and returns the encoded audio bytes.
    async fn speak(&self, request: &SpeechRequest) -> Result<Vec<u8>, ApiError>;
}
