use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use oai_core::chat::{AskRequest, FileSearchApi, TextStream};
use oai_core::ApiError;

use super::error::OpenAiError;
use super::sse::{decode_stream, SseEvent};
use super::OpenAiClient;


// ============== Responses API Structs ==============

#[derive(Serialize, Debug)]
struct CreateResponseRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: Vec<ResponseTool<'a>>,
    stream: bool,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseTool<'a> {
    FileSearch { vector_store_ids: &'a [String] },
}

impl<'a> From<&'a AskRequest> for CreateResponseRequest<'a> {
    fn from(request: &'a AskRequest) -> Self {
        Self {
            model: &request.model,
            input: &request.question,
            tools: vec![ResponseTool::FileSearch { vector_store_ids: &request.vector_store_ids }],
            stream: true,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ResponseStreamEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    /// Text for `*.delta` events. Other event types may carry a non-string
    /// delta, which is ignored.
    #[serde(default)]
    delta: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Text carried by one stream event. Error events become `Streaming` errors.
fn event_text(event: &SseEvent) -> Result<Option<String>, OpenAiError> {
    let parsed: ResponseStreamEvent = serde_json::from_str(&event.data).map_err(|e| OpenAiError::ResponseParsing {
        context: "Parsing response stream event".to_string(),
        source: e,
    })?;

    let kind = parsed.kind.as_deref().or(event.event.as_deref());
    if matches!(kind, Some("error") | Some("response.failed")) {
        let message = parsed.message.unwrap_or_else(|| event.data.clone());
        return Err(OpenAiError::Streaming(message));
    }

    Ok(match parsed.delta {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    })
}


#[async_trait]
impl FileSearchApi for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %request.model, stores = request.vector_store_ids.len()))]
    async fn ask_stream(&self, request: &AskRequest) -> Result<TextStream, ApiError> {
        async {
            // 1. Build request
            let url = self.shared.build_url(&["responses"])?;
            let body = CreateResponseRequest::from(request);
            debug!(%url, "Sending streaming response request");

            // 2. Send; the stream itself has no total timeout
            let builder = self.shared.streaming_request(Method::POST, url).json(&body);
            let response = self.shared.execute(builder, "Streaming response").await?;

            // 3. Keep only text deltas
            let deltas = decode_stream(response.bytes_stream()).filter_map(|event| async move {
                match event.and_then(|event| event_text(&event)) {
                    Ok(Some(text)) => Some(Ok(text)),
                    Ok(None) => None,
                    Err(e) => {
                        warn!(error = %e, "Response stream failed");
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


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(data: &str) -> SseEvent {
        SseEvent { event: None, data: data.to_string() }
    }

    #[test]
    fn request_carries_file_search_tool() {
        let ask = AskRequest::new("What is in the report?", Some("vs_1".to_string()));
        let body = serde_json::to_value(CreateResponseRequest::from(&ask)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "input": "What is in the report?",
                "tools": [{ "type": "file_search", "vector_store_ids": ["vs_1"] }],
                "stream": true
            })
        );

        let ask = AskRequest::new("q", None);
        let body = serde_json::to_value(CreateResponseRequest::from(&ask)).unwrap();
        assert_eq!(body["tools"][0]["vector_store_ids"], json!([]));
    }

    #[test]
    fn only_string_deltas_are_text() {
        let delta = event(r#"{"type":"response.output_text.delta","delta":"Hello","output_index":0}"#);
        assert_eq!(event_text(&delta).unwrap().as_deref(), Some("Hello"));

        let created = event(r#"{"type":"response.created","response":{"id":"resp_1"}}"#);
        assert_eq!(event_text(&created).unwrap(), None);

        let odd = event(r#"{"type":"response.custom.delta","delta":{"x":1}}"#);
        assert_eq!(event_text(&odd).unwrap(), None);

        let empty = event(r#"{"type":"response.output_text.delta","delta":""}"#);
        assert_eq!(event_text(&empty).unwrap(), None);
    }

    #[test]
    fn error_event_fails_the_stream() {
        let err = event(r#"{"type":"error","code":"server_error","message":"Something broke"}"#);
        match event_text(&err) {
            Err(OpenAiError::Streaming(message)) => assert_eq!(message, "Something broke"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
