use std::io::Write;

use anyhow::{Context, Result};
use futures::StreamExt;
use oai_core::vector_store::{
    decode_content, list_files, AttributeUpdate, FileRecord, ListFilesQuery, VectorStoreFileApi,
};
use tracing::{debug, error, info, instrument};

use crate::cli::{FileRef, FilesListArgs};
use crate::render;

/// Prints one line per file and returns how many were printed. The walk
/// aborts on the first failure; lines already printed stay.
#[instrument(skip(api, out, args), fields(vector_store_id = %args.vector_store_id))]
pub async fn list(api: &dyn VectorStoreFileApi, out: &mut impl Write, args: FilesListArgs) -> Result<usize> {
    let query = ListFilesQuery::new(args.vector_store_id.clone())
        .filter(args.filter)
        .order(args.order)
        .page_size(args.limit);

    let mut records = list_files(api, query);
    let mut printed = 0;
    while let Some(record) = records.next().await {
        let record = record.with_context(|| {
            format!(
                "Listing files of vector store {} aborted after {} records",
                args.vector_store_id, printed
            )
        })?;
        writeln!(out, "{}", render::record_line(&record))?;
        printed += 1;
    }
    info!(printed, "Listed vector store files");
    Ok(printed)
}

// The single-file commands below report remote failures and still succeed.

pub async fn get(api: &dyn VectorStoreFileApi, out: &mut impl Write, file: &FileRef) -> Result<()> {
    match api.retrieve(&file.vector_store_id, &file.file_id).await {
        Ok(entry) => writeln!(out, "{}", render::record_block(&FileRecord::from(entry)))?,
        Err(e) => {
            error!(error = %e, file_id = %file.file_id, "Retrieve failed");
            writeln!(out, "Failed to retrieve file {}: {}", file.file_id, e)?;
        }
    }
    Ok(())
}

pub async fn content(api: &dyn VectorStoreFileApi, out: &mut impl Write, file: &FileRef) -> Result<()> {
    match api.content(&file.vector_store_id, &file.file_id).await {
        Ok(bytes) => writeln!(out, "{}", decode_content(&bytes))?,
        Err(e) => {
            error!(error = %e, file_id = %file.file_id, "Content retrieval failed");
            writeln!(out, "Failed to retrieve content of file {}: {}", file.file_id, e)?;
        }
    }
    Ok(())
}

pub async fn update(
    api: &dyn VectorStoreFileApi,
    out: &mut impl Write,
    file: &FileRef,
    key: &str,
    value: &str,
) -> Result<()> {
    let result = async {
        // 1. Fetch the current attributes; an update replaces all of them
        let current = FileRecord::from(api.retrieve(&file.vector_store_id, &file.file_id).await?);
        debug!(existing = current.attributes.len(), "Merging attribute into current set");

        // 2. Send the merged set
        let attributes = AttributeUpdate::parse(key, value).merge_into(current.attributes);
        api.update(&file.vector_store_id, &file.file_id, attributes).await
    }
    .await;

    match result {
        Ok(entry) => writeln!(out, "{}", render::record_block(&FileRecord::from(entry)))?,
        Err(e) => {
            error!(error = %e, file_id = %file.file_id, key, "Attribute update failed");
            writeln!(out, "Failed to update file {}: {}", file.file_id, e)?;
        }
    }
    Ok(())
}

pub async fn delete(api: &dyn VectorStoreFileApi, out: &mut impl Write, file: &FileRef) -> Result<()> {
    match api.delete(&file.vector_store_id, &file.file_id).await {
        Ok(()) => writeln!(
            out,
            "Deleted file {} from vector store {}",
            file.file_id, file.vector_store_id
        )?,
        Err(e) => {
            error!(error = %e, file_id = %file.file_id, "Delete failed");
            writeln!(out, "Failed to delete file {}: {}", file.file_id, e)?;
        }
    }
    Ok(())
}
