use std::io::Write;

use anyhow::{bail, Context, Result};
use oai_core::speech::{SpeechApi, SpeechRequest};
use tracing::{debug, instrument};

use crate::cli::TtsArgs;

/// Text from the input file wins over the inline text; blank text counts as none.
pub fn resolve_text(text: Option<String>, file_text: Option<String>) -> Option<String> {
    file_text
        .map(|t| t.trim().to_string())
        .or(text)
        .filter(|t| !t.trim().is_empty())
}

#[instrument(skip(api, out, args), fields(output = %args.output.display()))]
pub async fn tts(api: &dyn SpeechApi, out: &mut impl Write, args: TtsArgs) -> Result<()> {
    let file_text = match &args.input_file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };
    let Some(input) = resolve_text(args.text, file_text) else {
        bail!("Text is required.");
    };

    let request = SpeechRequest {
        model: args.model,
        voice: args.voice,
        input,
        response_format: None,
    };
    let audio = api.speak(&request).await.context("Speech synthesis failed")?;
    debug!(len = audio.len(), "Writing audio");

    tokio::fs::write(&args.output, &audio)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    writeln!(out, "Audio file saved: {}", args.output.display())?;
    Ok(())
}
