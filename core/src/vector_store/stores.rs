use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ApiError;

use super::{ListError, SortOrder, MAX_PAGE_SIZE};


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStore {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_counts: Option<FileCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateVectorStore {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStoresRequest {
    pub after: Option<String>,
    pub order: SortOrder,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VectorStorePage {
    #[serde(default)]
    pub data: Vec<VectorStore>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

#[async_trait]
pub trait VectorStoreApi: Send + Sync {
    async fn create(&self, request: &CreateVectorStore) -> Result<VectorStore, ApiError>;

    async fn list(&self, request: &ListStoresRequest) -> Result<VectorStorePage, ApiError>;

    async fn retrieve(&self, vector_store_id: &str) -> Result<VectorStore, ApiError>;

    async fn delete(&self, vector_store_id: &str) -> Result<(), ApiError>;
}

pub type StoreStream<'a> = Pin<Box<dyn Stream<Item = Result<VectorStore, ListError>> + Send + 'a>>;

/// Walks every vector store of the account, following the `after` cursor
/// with the same stop rules as the file listing.
pub fn list_vector_stores(api: &dyn VectorStoreApi, order: SortOrder) -> StoreStream<'_> {
    // `None` once the walk is over, otherwise the cursor for the next page
    // and the number of that page.
    let start: Option<(Option<String>, usize)> = Some((None, 1));

    let pages = stream::try_unfold(start, move |state| async move {
        let Some((after, page_number)) = state else {
            return Ok(None);
        };
        let request = ListStoresRequest { after, order, limit: MAX_PAGE_SIZE };
        debug!(after = ?request.after, page = page_number, "Fetching vector store page");
        let page = api.list(&request).await?;

        if page.data.is_empty() {
            return Ok(None);
        }
        let last_id = page.data.last().map(|store| store.id.clone());
        if let Some(cursor) = last_id.as_ref().filter(|id| request.after.as_ref() == Some(*id)) {
            warn!(page = page_number, %cursor, "Cursor did not advance, stopping");
            return Err(ListError::StalledCursor {
                page: page_number,
                cursor: cursor.clone(),
            });
        }
        let next = match page.has_more {
            Some(false) => None,
            _ => Some((last_id, page_number + 1)),
        };
        let stores = stream::iter(page.data.into_iter().map(Ok::<VectorStore, ListError>));
        Ok::<_, ListError>(Some((stores, next)))
    });

    Box::pin(pages.try_flatten())
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::StreamExt;

    use super::*;

    struct PagedStores {
        pages: Vec<VectorStorePage>,
        requests: Mutex<Vec<ListStoresRequest>>,
    }

    fn store(id: &str) -> VectorStore {
        VectorStore {
            id: id.to_string(),
            name: Some(format!("store {id}")),
            description: None,
            created_at: Some(1),
            status: None,
            file_counts: None,
        }
    }

    #[async_trait]
    impl VectorStoreApi for PagedStores {
        async fn create(&self, _request: &CreateVectorStore) -> Result<VectorStore, ApiError> {
            unimplemented!()
        }

        async fn list(&self, request: &ListStoresRequest) -> Result<VectorStorePage, ApiError> {
            let mut requests = self.requests.lock().unwrap();
            let index = requests.len();
            requests.push(request.clone());
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }

        async fn retrieve(&self, _vector_store_id: &str) -> Result<VectorStore, ApiError> {
            unimplemented!()
        }

        async fn delete(&self, _vector_store_id: &str) -> Result<(), ApiError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn follows_cursor_until_service_reports_the_end() {
        let api = PagedStores {
            pages: vec![
                VectorStorePage { data: vec![store("vs_1"), store("vs_2")], has_more: Some(true) },
                VectorStorePage { data: vec![store("vs_3")], has_more: Some(false) },
            ],
            requests: Mutex::new(Vec::new()),
        };

        let ids = list_vector_stores(&api, SortOrder::Desc)
            .map(|store| store.unwrap().id)
            .collect::<Vec<_>>()
            .await;

        assert_eq!(ids, ["vs_1", "vs_2", "vs_3"]);
        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].after, None);
        assert_eq!(requests[1].after.as_deref(), Some("vs_2"));
    }

    #[tokio::test]
    async fn missing_indicator_runs_until_an_empty_page() {
        let api = PagedStores {
            pages: vec![
                VectorStorePage { data: vec![store("vs_1"), store("vs_2")], has_more: None },
                VectorStorePage { data: vec![store("vs_3")], has_more: None },
            ],
            requests: Mutex::new(Vec::new()),
        };

        let ids = list_vector_stores(&api, SortOrder::Asc)
            .map(|store| store.unwrap().id)
            .collect::<Vec<_>>()
            .await;

        assert_eq!(ids, ["vs_1", "vs_2", "vs_3"]);
        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].after.as_deref(), Some("vs_3"));
    }

    #[tokio::test]
    async fn repeated_cursor_ends_the_walk() {
        let page = VectorStorePage { data: vec![store("vs_1")], has_more: Some(true) };
        let api = PagedStores {
            pages: vec![page.clone(), page.clone(), page],
            requests: Mutex::new(Vec::new()),
        };

        let results = list_vector_stores(&api, SortOrder::Desc).collect::<Vec<_>>().await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().id, "vs_1");
        assert!(matches!(
            &results[1],
            Err(ListError::StalledCursor { page: 2, cursor }) if cursor == "vs_1"
        ));
        assert_eq!(api.requests.lock().unwrap().len(), 2);
    }
}
