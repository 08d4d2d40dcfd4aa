use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::ApiError;

mod attribute;
mod content;
mod lister;
mod record;
mod stores;

pub use attribute::{parse_attribute_value, AttributeUpdate};
pub use content::decode_content;
pub use lister::{list_files, FileStream, ListError, ListFilesQuery, VectorStoreFileLister, MAX_PAGE_SIZE};
pub use record::{FileEntry, FileRecord, VectorStoreFileObject};
pub use stores::{
    list_vector_stores, CreateVectorStore, FileCounts, ListStoresRequest, StoreStream, VectorStore,
    VectorStoreApi, VectorStorePage,
};


/// Processing state of a file inside a vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl FileStatus {
    pub const ALL: [FileStatus; 4] = [
        FileStatus::InProgress,
        FileStatus::Completed,
        FileStatus::Failed,
        FileStatus::Cancelled,
    ];

    /// Wire name of the status, as used in the `filter` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::InProgress => "in_progress",
            FileStatus::Completed => "completed",
            FileStatus::Failed => "failed",
            FileStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown file status '{0}' (expected in_progress, completed, failed or cancelled)")]
pub struct UnknownStatus(pub String);

impl FromStr for FileStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Sort direction over `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort order '{0}' (expected asc or desc)")]
pub struct UnknownOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(UnknownOrder(other.to_string())),
        }
    }
}

/// Parameters of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilesRequest {
    /// Id of the last record already consumed; `None` for the first page.
    pub after: Option<String>,
    pub order: SortOrder,
    pub limit: u32,
    pub filter: Option<FileStatus>,
}

/// One batch of file entries as returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilePage {
    #[serde(default)]
    pub data: Vec<FileEntry>,
    /// Explicit "more pages available" indicator. Absent when the service
    /// does not say; the walk then keeps going until an empty page.
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl FilePage {
    pub fn new(data: Vec<FileEntry>, has_more: Option<bool>) -> Self {
        Self { data, has_more }
    }
}

/// Remote operations on the files of one vector store.
#[async_trait]
pub trait VectorStoreFileApi: Send + Sync {
    /// Fetches one page of file entries.
    async fn list(&self, vector_store_id: &str, request: &ListFilesRequest) -> Result<FilePage, ApiError>;

    async fn retrieve(&self, vector_store_id: &str, file_id: &str) -> Result<FileEntry, ApiError>;

    /// Raw content payload of a file, undecoded.
    async fn content(&self, vector_store_id: &str, file_id: &str) -> Result<Vec<u8>, ApiError>;

    /// Replaces the attributes of a file and returns the updated entry.
    async fn update(
        &self,
        vector_store_id: &str,
        file_id: &str,
        attributes: Map<String, Value>,
    ) -> Result<FileEntry, ApiError>;

    /// Removes the file from the vector store. Irreversible.
    async fn delete(&self, vector_store_id: &str, file_id: &str) -> Result<(), ApiError>;

    /// Attaches an already uploaded file to the vector store.
    async fn attach(&self, vector_store_id: &str, file_id: &str) -> Result<FileEntry, ApiError>;
}
