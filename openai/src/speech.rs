use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Method;
use tracing::{debug, error, instrument};

use oai_core::speech::{SpeechApi, SpeechRequest};
use oai_core::ApiError;

use super::error::OpenAiError;
use super::OpenAiClient;


fn accept_for(format: Option<&str>) -> String {
    let audio = match format {
        None | Some("mp3") => "mpeg",
        Some("wav") => "wav",
        Some("opus") => "ogg",
        Some("aac") => "aac",
        Some("flac") => "flac",
        _ => return mime::APPLICATION_OCTET_STREAM.to_string(),
    };
    format!("{}/{}", mime::AUDIO, audio)
}

#[async_trait]
impl SpeechApi for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %request.model, voice = %request.voice, chars = request.input.len()))]
    async fn speak(&self, request: &SpeechRequest) -> Result<Vec<u8>, ApiError> {
        async {
            if request.input.trim().is_empty() {
                return Err(OpenAiError::InvalidConfiguration("speech input must not be empty".to_string()));
            }

            let url = self.shared.build_url(&["audio", "speech"])?;
            debug!(%url, "Requesting speech synthesis");
            let builder = self
                .shared
                .request(Method::POST, url)
                .header(ACCEPT, accept_for(request.response_format.as_deref()))
                .json(request);
            let response = self.shared.execute(builder, "Synthesizing speech").await?;

            let audio = response.bytes().await.map_err(|e| {
                error!(error = %e, "Failed to read audio body");
                OpenAiError::Network(e)
            })?;
            debug!(len = audio.len(), "Received audio");
            Ok(audio.to_vec())
        }
        .await
        .map_err(Into::into)
    }
}
