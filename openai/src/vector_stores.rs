use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, instrument};

use oai_core::vector_store::{
    CreateVectorStore, FileEntry, FilePage, ListFilesRequest, ListStoresRequest, VectorStore,
    VectorStoreApi, VectorStoreFileApi, VectorStorePage,
};
use oai_core::ApiError;

use super::error::OpenAiError;
use super::OpenAiClient;


// ============== Request/Response Structs ==============

#[derive(Serialize, Debug)]
struct UpdateAttributesRequest<'a> {
    attributes: &'a Map<String, Value>,
}

#[derive(Serialize, Debug)]
struct AttachFileRequest<'a> {
    file_id: &'a str,
}

/// Body returned by every DELETE route.
#[derive(Deserialize, Debug)]
struct DeletedObject {
    id: String,
    #[serde(default)]
    deleted: bool,
}

impl DeletedObject {
    fn confirm(self, expected_id: &str) -> Result<(), OpenAiError> {
        if self.deleted {
            debug!(id = %self.id, "Deletion confirmed");
            Ok(())
        } else {
            error!(id = %self.id, expected_id, "Service did not confirm deletion");
            Err(OpenAiError::UnexpectedResponse(format!("deletion of '{}' was not confirmed", expected_id)))
        }
    }
}

fn page_query(limit: u32, order: &str, after: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string()), ("order", order.to_string())];
    if let Some(after) = after {
        query.push(("after", after.to_string()));
    }
    query
}

fn list_files_query(request: &ListFilesRequest) -> Vec<(&'static str, String)> {
    let mut query = page_query(request.limit, request.order.as_str(), request.after.as_deref());
    if let Some(filter) = request.filter {
        query.push(("filter", filter.as_str().to_string()));
    }
    query
}


// ============== Vector stores ==============

#[async_trait]
impl VectorStoreApi for OpenAiClient {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: &CreateVectorStore) -> Result<VectorStore, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores"])?;
            debug!(%url, "Creating vector store");
            let builder = self.shared.vector_store_request(Method::POST, url).json(request);
            self.shared.send_json(builder, "Creating vector store").await
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self, request), fields(after = ?request.after))]
    async fn list(&self, request: &ListStoresRequest) -> Result<VectorStorePage, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores"])?;
            let query = page_query(request.limit, request.order.as_str(), request.after.as_deref());
            debug!(%url, ?query, "Listing vector stores");
            let builder = self.shared.vector_store_request(Method::GET, url).query(&query);
            self.shared.send_json(builder, "Listing vector stores").await
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, vector_store_id: &str) -> Result<VectorStore, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id])?;
            let builder = self.shared.vector_store_request(Method::GET, url);
            self.shared.send_json(builder, "Retrieving vector store").await
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn delete(&self, vector_store_id: &str) -> Result<(), ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id])?;
            let builder = self.shared.vector_store_request(Method::DELETE, url);
            let deleted: DeletedObject = self.shared.send_json(builder, "Deleting vector store").await?;
            deleted.confirm(vector_store_id)
        }
        .await
        .map_err(Into::into)
    }
}


// ============== Vector store files ==============

#[async_trait]
impl VectorStoreFileApi for OpenAiClient {
    #[instrument(skip(self, request), fields(after = ?request.after, limit = request.limit))]
    async fn list(&self, vector_store_id: &str, request: &ListFilesRequest) -> Result<FilePage, ApiError> {
        async {
            // 1. Build URL and query
            let url = self.shared.build_url(&["vector_stores", vector_store_id, "files"])?;
            let query = list_files_query(request);
            debug!(%url, ?query, "Requesting vector store file page");

            // 2. Send and decode
            let builder = self.shared.vector_store_request(Method::GET, url).query(&query);
            let page: FilePage = self.shared.send_json(builder, "Listing vector store files").await?;

            debug!(count = page.data.len(), has_more = ?page.has_more, "Received vector store file page");
            Ok::<_, OpenAiError>(page)
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, vector_store_id: &str, file_id: &str) -> Result<FileEntry, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id, "files", file_id])?;
            let builder = self.shared.vector_store_request(Method::GET, url);
            self.shared.send_json(builder, "Retrieving vector store file").await
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn content(&self, vector_store_id: &str, file_id: &str) -> Result<Vec<u8>, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id, "files", file_id, "content"])?;
            let builder = self.shared.vector_store_request(Method::GET, url);
            let response = self.shared.execute(builder, "Retrieving vector store file content").await?;

            let bytes = response.bytes().await.map_err(|e| {
                error!(error = %e, "Failed to read file content body");
                OpenAiError::Network(e)
            })?;
            debug!(len = bytes.len(), "Received file content");
            Ok::<_, OpenAiError>(bytes.to_vec())
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self, attributes), fields(keys = attributes.len()))]
    async fn update(
        &self,
        vector_store_id: &str,
        file_id: &str,
        attributes: Map<String, Value>,
    ) -> Result<FileEntry, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id, "files", file_id])?;
            let body = UpdateAttributesRequest { attributes: &attributes };
            let builder = self.shared.vector_store_request(Method::POST, url).json(&body);
            self.shared.send_json(builder, "Updating vector store file attributes").await
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn delete(&self, vector_store_id: &str, file_id: &str) -> Result<(), ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id, "files", file_id])?;
            let builder = self.shared.vector_store_request(Method::DELETE, url);
            let deleted: DeletedObject = self.shared.send_json(builder, "Deleting vector store file").await?;
            deleted.confirm(file_id)
        }
        .await
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn attach(&self, vector_store_id: &str, file_id: &str) -> Result<FileEntry, ApiError> {
        async {
            let url = self.shared.build_url(&["vector_stores", vector_store_id, "files"])?;
            let body = AttachFileRequest { file_id };
            let builder = self.shared.vector_store_request(Method::POST, url).json(&body);
            self.shared.send_json(builder, "Attaching file to vector store").await
        }
        .await
        .map_err(Into::into)
    }
}
