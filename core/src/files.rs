use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ApiError;

pub const DEFAULT_PURPOSE: &str = "assistants";


/// A file stored in the account, independent of any vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[async_trait]
pub trait FilesApi: Send + Sync {
    /// Uploads a local file. `purpose` is passed through unvalidated
    /// (`assistants`, `fine-tune`, `batch`, ...).
    async fn upload(&self, path: &Path, purpose: &str) -> Result<UploadedFile, ApiError>;
}
