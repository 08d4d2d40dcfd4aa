use std::io::Write;

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input};
use futures::StreamExt;
use oai_core::chat::TextStream;

use crate::cli::{Commands, FileCommands, FilesCommands, VectorStoreCommands};
use crate::AppContext;

pub mod chat;
pub mod files;
pub mod speech;
pub mod upload;
pub mod vector_store;

/// Runs one parsed command against the configured client, writing its
/// output to `out`.
pub async fn run(cx: &AppContext, command: Commands, out: &mut impl Write) -> Result<()> {
    let client = &cx.client;
    match command {
        Commands::File(args) => match args.command {
            FileCommands::Upload(args) => {
                upload::upload(client, client, out, &args.pattern, args.vector_store_id.as_deref(), &args.purpose).await
            }
        },
        Commands::Tts(args) => speech::tts(client, out, args).await,
        Commands::Ask(args) => chat::ask(client, out, args.vector_store_id, args.question).await,
        Commands::Chat(args) => chat::chat(client, out, args).await,
        Commands::VectorStore(args) => match args.command {
            VectorStoreCommands::Create { name, description } => {
                vector_store::create(client, out, name, description).await
            }
            VectorStoreCommands::List => vector_store::list(client, out).await,
            VectorStoreCommands::Get { id } => vector_store::get(client, out, &id).await,
            VectorStoreCommands::Delete { id } => vector_store::delete(client, out, &id).await,
            VectorStoreCommands::Files(args) => match args.command {
                FilesCommands::List(args) => files::list(client, out, args).await.map(|_| ()),
                FilesCommands::Get(file) => files::get(client, out, &file).await,
                FilesCommands::Content(file) => files::content(client, out, &file).await,
                FilesCommands::Update(args) => files::update(client, out, &args.file, &args.key, &args.value).await,
                FilesCommands::Delete(file) => files::delete(client, out, &file).await,
            },
        },
    }
}

/// Reads one line from the terminal without blocking the runtime.
pub(crate) async fn prompt(label: &'static str) -> Result<String> {
    let result = tokio::task::spawn_blocking(move || {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .interact_text()
            .context("Failed to read input")
    })
    .await;

    let input = result.context("Blocking task failed (panic)")??; // Double '?'
    Ok(input)
}

/// Writes text deltas as they arrive, then a newline. A failed delta ends
/// the line and is returned.
pub(crate) async fn print_stream(mut stream: TextStream, out: &mut impl Write) -> Result<()> {
    let mut failure = None;
    while let Some(delta) = stream.next().await {
        match delta {
            Ok(text) => {
                write!(out, "{}", text)?;
                out.flush()?;
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    writeln!(out)?;

    match failure {
        Some(e) => Err(e).context("Stream ended with an error"),
        None => Ok(()),
    }
}
