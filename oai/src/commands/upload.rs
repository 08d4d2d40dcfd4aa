use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use oai_core::files::{FilesApi, DEFAULT_PURPOSE};
use oai_core::vector_store::VectorStoreFileApi;
use tracing::{debug, error, instrument, warn};

/// Expands a glob pattern. Unreadable entries are logged and skipped.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).with_context(|| format!("Invalid pattern: {}", pattern))?;
    Ok(paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path");
                None
            }
        })
        .collect())
}

/// Uploads every file matching `pattern`. With a vector store id each file
/// is uploaded as `assistants` and attached to the store; otherwise it is
/// uploaded with `purpose`. A failed file does not stop the others.
#[instrument(skip(files, stores, out))]
pub async fn upload(
    files: &dyn FilesApi,
    stores: &dyn VectorStoreFileApi,
    out: &mut impl Write,
    pattern: &str,
    vector_store_id: Option<&str>,
    purpose: &str,
) -> Result<()> {
    let paths = expand_pattern(pattern)?;
    if paths.is_empty() {
        bail!("No files matched the pattern: {}", pattern);
    }
    debug!(count = paths.len(), "Pattern expanded");

    let mut failed = 0;
    let mut attempted = 0;
    for path in &paths {
        if !path.is_file() {
            writeln!(out, "Not a file: {}", path.display())?;
            continue;
        }
        attempted += 1;

        match upload_one(files, stores, path, vector_store_id, purpose).await {
            Ok(line) => writeln!(out, "{}", line)?,
            Err(e) => {
                error!(error = %e, path = %path.display(), "Upload failed");
                writeln!(out, "Failed to upload {}: {:#}", path.display(), e)?;
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} uploads failed", failed, attempted);
    }
    Ok(())
}

async fn upload_one(
    files: &dyn FilesApi,
    stores: &dyn VectorStoreFileApi,
    path: &Path,
    vector_store_id: Option<&str>,
    purpose: &str,
) -> Result<String> {
    match vector_store_id {
        Some(vector_store_id) => {
            let uploaded = files.upload(path, DEFAULT_PURPOSE).await.context("Upload failed")?;
            stores
                .attach(vector_store_id, &uploaded.id)
                .await
                .with_context(|| format!("Uploaded as {} but attaching to {} failed", uploaded.id, vector_store_id))?;
            Ok(format!("Uploaded to Vector Store: {} ({})", uploaded.id, path.display()))
        }
        None => {
            let uploaded = files.upload(path, purpose).await.context("Upload failed")?;
            Ok(format!("File uploaded: {} ({})", uploaded.id, path.display()))
        }
    }
}
