use std::io::Write;

use anyhow::{Context, Result};
use oai_core::chat::{AskRequest, ChatApi, ChatOptions, FileSearchApi, Message};
use tracing::instrument;

use super::{print_stream, prompt};
use crate::cli::ChatArgs;

#[instrument(skip(api, out, args), fields(model = %args.model, stream = args.stream))]
pub async fn chat(api: &dyn ChatApi, out: &mut impl Write, args: ChatArgs) -> Result<()> {
    let user = match args.user {
        Some(user) => user,
        None => prompt("User").await?,
    };
    let messages = Message::conversation(args.system.as_deref(), user);
    let options = ChatOptions {
        model: args.model,
        ..Default::default()
    };

    if args.stream {
        let stream = api
            .complete_stream(&messages, &options)
            .await
            .context("Chat request failed")?;
        print_stream(stream, out).await
    } else {
        let answer = api.complete(&messages, &options).await.context("Chat request failed")?;
        writeln!(out, "{}", answer)?;
        Ok(())
    }
}

#[instrument(skip(api, out, question))]
pub async fn ask(
    api: &dyn FileSearchApi,
    out: &mut impl Write,
    vector_store_id: Option<String>,
    question: Option<String>,
) -> Result<()> {
    let question = match question {
        Some(question) => question,
        None => prompt("Enter your question").await?,
    };
    let stream = api
        .ask_stream(&AskRequest::new(question, vector_store_id))
        .await
        .context("Ask request failed")?;
    print_stream(stream, out).await
}
