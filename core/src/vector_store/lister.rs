use std::collections::VecDeque;
use std::pin::Pin;

use futures::stream::{self, Stream};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::ApiError;

use super::{FileRecord, FileStatus, ListFilesRequest, SortOrder, VectorStoreFileApi};

/// Largest page the service hands out per request.
pub const MAX_PAGE_SIZE: u32 = 100;


#[derive(Error, Debug)]
pub enum ListError {
    /// A page fetch failed; the walk stops here.
    #[error("Failed to fetch page: {0}")]
    Remote(#[from] ApiError),

    /// The last record of a page had no id, so there is no cursor to resume from.
    #[error("Cannot continue listing: record {position} of page {page} has no id")]
    MissingCursor { page: usize, position: usize },

    /// The service handed back a page ending at the cursor it was asked to
    /// continue from. That page is dropped since its records were already yielded.
    #[error("Cannot continue listing: page {page} did not advance past cursor {cursor}")]
    StalledCursor { page: usize, cursor: String },

    #[error("Invalid list query: {0}")]
    InvalidQuery(String),
}

pub type FileStream<'a> = Pin<Box<dyn Stream<Item = Result<FileRecord, ListError>> + Send + 'a>>;

/// What to list and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilesQuery {
    pub vector_store_id: String,
    pub filter: Option<FileStatus>,
    pub order: SortOrder,
    pub page_size: u32,
}

impl ListFilesQuery {
    pub fn new(vector_store_id: impl Into<String>) -> Self {
        Self {
            vector_store_id: vector_store_id.into(),
            filter: None,
            order: SortOrder::default(),
            page_size: MAX_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Option<FileStatus>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Values above [`MAX_PAGE_SIZE`] are passed through; the service caps them.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn validate(&self) -> Result<(), ListError> {
        if self.vector_store_id.is_empty() {
            return Err(ListError::InvalidQuery("vector store id cannot be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(ListError::InvalidQuery("page size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Walks every file of a vector store, one page at a time.
///
/// The next page is only requested once every record of the current page
/// has been taken from the stream. A failed fetch ends the walk: records
/// already yielded stay yielded, the error comes next, and nothing more is
/// fetched.
pub struct VectorStoreFileLister<'a> {
    api: &'a dyn VectorStoreFileApi,
    query: ListFilesQuery,
}

impl<'a> VectorStoreFileLister<'a> {
    pub fn new(api: &'a dyn VectorStoreFileApi, query: ListFilesQuery) -> Self {
        Self { api, query }
    }

    pub fn into_stream(self) -> FileStream<'a> {
        let pending_error = self.query.validate().err();
        let state = Walk {
            api: self.api,
            query: self.query,
            cursor: None,
            buffer: VecDeque::new(),
            pending_error,
            fetches: 0,
            finished: false,
        };

        Box::pin(stream::unfold(state, |mut walk| async move {
            loop {
                if let Some(record) = walk.buffer.pop_front() {
                    return Some((Ok(record), walk));
                }
                if let Some(error) = walk.pending_error.take() {
                    walk.finished = true;
                    return Some((Err(error), walk));
                }
                if walk.finished {
                    return None;
                }
                if let Err(error) = walk.fetch_next_page().await {
                    walk.finished = true;
                    return Some((Err(error), walk));
                }
            }
        }))
    }
}

/// Shorthand for `VectorStoreFileLister::new(api, query).into_stream()`.
pub fn list_files<'a>(api: &'a dyn VectorStoreFileApi, query: ListFilesQuery) -> FileStream<'a> {
    VectorStoreFileLister::new(api, query).into_stream()
}

struct Walk<'a> {
    api: &'a dyn VectorStoreFileApi,
    query: ListFilesQuery,
    cursor: Option<String>,
    buffer: VecDeque<FileRecord>,
    /// Yielded once the buffer is drained, then the walk ends.
    pending_error: Option<ListError>,
    fetches: usize,
    finished: bool,
}

impl Walk<'_> {
    async fn fetch_next_page(&mut self) -> Result<(), ListError> {
        self.fetches += 1;
        let request = ListFilesRequest {
            after: self.cursor.clone(),
            order: self.query.order,
            limit: self.query.page_size,
            filter: self.query.filter,
        };
        debug!(
            vector_store_id = %self.query.vector_store_id,
            page = self.fetches,
            after = ?request.after,
            "Fetching vector store file page"
        );

        let page = self.api.list(&self.query.vector_store_id, &request).await?;

        if page.data.is_empty() {
            debug!(page = self.fetches, "Empty page, listing complete");
            self.finished = true;
            return Ok(());
        }

        let records = page.data.into_iter()
            .map(FileRecord::from)
            .collect::<Vec<_>>();
        let count = records.len();
        let next_cursor = records.last().and_then(|record| record.id.clone());
        trace!(page = self.fetches, count, has_more = ?page.has_more, "Received file page");

        if let Some(cursor) = next_cursor.as_ref().filter(|cursor| self.cursor.as_ref() == Some(*cursor)) {
            warn!(page = self.fetches, %cursor, "Cursor did not advance, stopping");
            return Err(ListError::StalledCursor {
                page: self.fetches,
                cursor: cursor.clone(),
            });
        }
        self.buffer.extend(records);

        if page.has_more == Some(false) {
            debug!(page = self.fetches, "Service reports no further pages");
            self.finished = true;
            return Ok(());
        }

        match next_cursor {
            Some(cursor) => self.cursor = Some(cursor),
            None => {
                warn!(page = self.fetches, "Last record of page has no id, stopping");
                self.pending_error = Some(ListError::MissingCursor {
                    page: self.fetches,
                    position: count,
                });
            }
        }
        Ok(())
    }
}
