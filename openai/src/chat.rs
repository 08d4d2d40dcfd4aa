use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use oai_core::chat::{ChatApi, ChatOptions, Message, TextStream};
use oai_core::ApiError;

use super::error::OpenAiError;
use super::sse::{decode_stream, SseEvent};
use super::OpenAiClient;


// ============== Chat Completions Request/Response Structs ==============

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(messages: &'a [Message], options: &'a ChatOptions, stream: bool) -> Self {
        Self {
            model: &options.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize, Debug)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Debug, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Content delta carried by one stream event, if any. `Ok(None)` for the
/// `[DONE]` sentinel and for role-only or empty chunks.
fn chunk_text(event: &SseEvent) -> Result<Option<String>, OpenAiError> {
    if event.is_done() {
        return Ok(None);
    }
    let chunk: ChatCompletionChunk = serde_json::from_str(&event.data).map_err(|e| OpenAiError::ResponseParsing {
        context: "Parsing chat completion chunk".to_string(),
        source: e,
    })?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty()))
}


#[async_trait]
impl ChatApi for OpenAiClient {
    #[instrument(skip(self, messages, options), fields(model = %options.model, messages = messages.len()))]
    async fn complete(&self, messages: &[Message], options: &ChatOptions) -> Result<String, ApiError> {
        async {
            // 1. Build request
            let url = self.shared.build_url(&["chat", "completions"])?;
            let body = ChatCompletionRequest::new(messages, options, false);
            debug!(%url, "Sending chat completion request");

            // 2. Send and parse
            let builder = self.shared.request(Method::POST, url).json(&body);
            let response: ChatCompletionResponse = self.shared.send_json(builder, "Parsing chat completion").await?;

            // 3. Extract the first choice
            let choice = response.choices.into_iter().next().ok_or_else(|| {
                OpenAiError::UnexpectedResponse("chat completion contained no choices".to_string())
            })?;
            debug!(finish_reason = ?choice.finish_reason, "Chat completion finished");
            Ok::<_, OpenAiError>(choice.message.content.unwrap_or_default())
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self, messages, options), fields(model = %options.model, messages = messages.len()))]
    async fn complete_stream(&self, messages: &[Message], options: &ChatOptions) -> Result<TextStream, ApiError> {
        async {
            let url = self.shared.build_url(&["chat", "completions"])?;
            let body = ChatCompletionRequest::new(messages, options, true);
            debug!(%url, "Sending streaming chat completion request");

            let builder = self.shared.streaming_request(Method::POST, url).json(&body);
            let response = self.shared.execute(builder, "Streaming chat completion").await?;

            // Stop at `[DONE]`; anything after it is ignored.
            let deltas = decode_stream(response.bytes_stream())
                .take_while(|event| {
                    let done = matches!(event, Ok(event) if event.is_done());
                    async move { !done }
                })
                .filter_map(|event| async move {
                    match event.and_then(|event| chunk_text(&event)) {
                        Ok(Some(text)) => {
                            trace!(len = text.len(), "Chat delta");
                            Some(Ok(text))
                        }
                        Ok(None) => None,
                        Err(e) => {
                            warn!(error = %e, "Chat stream failed");
                            Some(Err(ApiError::from(e)))
                        }
                    }
                });

            Ok::<TextStream, OpenAiError>(Box::pin(deltas))
        }
        .await
        .map_err(Into::into)
    }
}
