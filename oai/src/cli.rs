use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use oai_core::chat::DEFAULT_CHAT_MODEL;
use oai_core::files::DEFAULT_PURPOSE;
use oai_core::speech::{DEFAULT_SPEECH_MODEL, DEFAULT_VOICE};
use oai_core::vector_store::{FileStatus, SortOrder, MAX_PAGE_SIZE};
use oai_openai::DEFAULT_OPENAI_BASE_URL;

/// oai: OpenAI from the command line.
#[derive(Parser, Debug)]
#[command(name = "oai", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the API, including the version segment.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL, global = true)]
    pub base_url: String,

    /// Timeout in seconds for non-streaming requests.
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage account files.
    File(FileArgs),
    /// Convert text to speech.
    Tts(TtsArgs),
    /// Ask a question answered from a vector store.
    Ask(AskArgs),
    /// Send a chat completion request.
    Chat(ChatArgs),
    /// Manage vector stores and their files.
    VectorStore(VectorStoreArgs),
}

// --- File ---

#[derive(Args, Debug)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileCommands,
}

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Upload every file matching a glob pattern.
    Upload(UploadArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Glob pattern of the files to upload (e.g. "docs/*.pdf").
    #[arg(long, short)]
    pub pattern: String,

    /// Attach each uploaded file to this vector store.
    #[arg(long)]
    pub vector_store_id: Option<String>,

    /// Upload purpose when no vector store is given.
    #[arg(long, default_value = DEFAULT_PURPOSE)]
    pub purpose: String,
}

// --- Speech ---

#[derive(Args, Debug)]
pub struct TtsArgs {
    /// Text to speak.
    #[arg(long, short)]
    pub text: Option<String>,

    /// Read the text from this file instead; takes precedence over --text.
    #[arg(long, short)]
    pub input_file: Option<PathBuf>,

    /// Where to write the audio.
    #[arg(long, short, default_value = "speech_output.mp3")]
    pub output: PathBuf,

    #[arg(long, default_value = DEFAULT_SPEECH_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_VOICE)]
    pub voice: String,
}

// --- Ask / Chat ---

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Vector store to search; none searches nothing.
    #[arg(long)]
    pub vector_store_id: Option<String>,

    /// The question. Prompted for when omitted.
    #[arg(long)]
    pub question: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[arg(long, short, default_value = DEFAULT_CHAT_MODEL)]
    pub model: String,

    /// System prompt.
    #[arg(long, short)]
    pub system: Option<String>,

    /// User prompt. Prompted for when omitted.
    #[arg(long, short)]
    pub user: Option<String>,

    /// Print the answer as it is generated.
    #[arg(long)]
    pub stream: bool,
}

// --- Vector stores ---

#[derive(Args, Debug)]
pub struct VectorStoreArgs {
    #[command(subcommand)]
    pub command: VectorStoreCommands,
}

#[derive(Subcommand, Debug)]
pub enum VectorStoreCommands {
    /// Create a vector store.
    Create {
        #[arg(long, short)]
        name: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// List every vector store of the account.
    List,
    /// Show one vector store.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Delete a vector store.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Manage the files of a vector store.
    Files(FilesArgs),
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommands,
}

#[derive(Subcommand, Debug)]
pub enum FilesCommands {
    /// List every file of a vector store.
    List(FilesListArgs),
    /// Show one file.
    Get(FileRef),
    /// Print the parsed content of a file.
    Content(FileRef),
    /// Set one attribute of a file, keeping its other attributes.
    Update(UpdateArgs),
    /// Remove a file from the vector store.
    Delete(FileRef),
}

#[derive(Args, Debug)]
pub struct FilesListArgs {
    #[arg(long)]
    pub vector_store_id: String,

    /// Only list files in this state (in_progress, completed, failed, cancelled).
    #[arg(long)]
    pub filter: Option<FileStatus>,

    /// Sort by creation time.
    #[arg(long, default_value_t = SortOrder::Desc)]
    pub order: SortOrder,

    /// Records fetched per page; the service caps values above 100.
    #[arg(long, default_value_t = MAX_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,
}

#[derive(Args, Debug, Clone)]
pub struct FileRef {
    #[arg(long)]
    pub vector_store_id: String,

    #[arg(long)]
    pub file_id: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub file: FileRef,

    /// Attribute name.
    #[arg(long, short)]
    pub key: String,

    /// Attribute value; JSON objects and arrays are parsed, anything else is a string.
    #[arg(long)]
    pub value: String,
}
