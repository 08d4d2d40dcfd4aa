use std::io::Write;

use anyhow::{Context, Result};
use futures::StreamExt;
use oai_core::vector_store::{list_vector_stores, CreateVectorStore, SortOrder, VectorStoreApi};
use tracing::{info, instrument};

use crate::render;

#[instrument(skip(api, out))]
pub async fn create(
    api: &dyn VectorStoreApi,
    out: &mut impl Write,
    name: String,
    description: Option<String>,
) -> Result<()> {
    let store = api
        .create(&CreateVectorStore { name, description })
        .await
        .context("Failed to create vector store")?;
    info!(id = %store.id, "Vector store created");
    writeln!(
        out,
        "Created vector store: {} (name: {})",
        store.id,
        store.name.as_deref().unwrap_or("-")
    )?;
    Ok(())
}

/// Prints every store of the account. A failed page ends the listing after
/// the stores already printed.
pub async fn list(api: &dyn VectorStoreApi, out: &mut impl Write) -> Result<()> {
    let mut stores = list_vector_stores(api, SortOrder::Desc);
    while let Some(store) = stores.next().await {
        let store = store.context("Failed to list vector stores")?;
        writeln!(out, "{}", render::store_line(&store))?;
    }
    Ok(())
}

pub async fn get(api: &dyn VectorStoreApi, out: &mut impl Write, id: &str) -> Result<()> {
    let store = api
        .retrieve(id)
        .await
        .with_context(|| format!("Failed to retrieve vector store {}", id))?;
    writeln!(out, "{}", render::store_block(&store))?;
    Ok(())
}

pub async fn delete(api: &dyn VectorStoreApi, out: &mut impl Write, id: &str) -> Result<()> {
    api.delete(id)
        .await
        .with_context(|| format!("Failed to delete vector store {}", id))?;
    writeln!(out, "Deleted vector store: {}", id)?;
    Ok(())
}
