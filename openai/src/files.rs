use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tokio::fs::File;
use tracing::{debug, error, instrument};

use oai_core::files::{FilesApi, UploadedFile};
use oai_core::ApiError;

use super::error::OpenAiError;
use super::OpenAiClient;


#[async_trait]
impl FilesApi for OpenAiClient {
    #[instrument(skip(self, path), fields(purpose = %purpose, path = %path.display()))]
    async fn upload(&self, path: &Path, purpose: &str) -> Result<UploadedFile, ApiError> {
        async {
            // 1. Validate path
            if !path.is_file() {
                error!("Path is not a file or does not exist");
                return Err(OpenAiError::InvalidPath(path.to_path_buf()));
            }

            // 2. Extract filename - required for the multipart part
            let filename = path
                .file_name()
                .and_then(|os_str| os_str.to_str())
                .map(|s| s.to_string())
                .ok_or_else(|| OpenAiError::InvalidPath(path.to_path_buf()))?;
            debug!(%filename, "Extracted filename");

            // 3. Stream the file into the form
            let file = File::open(path).await?;
            let file_size = file.metadata().await?.len();
            let stream = reqwest::Body::wrap_stream(tokio_util::io::ReaderStream::new(file));
            let file_part = Part::stream_with_length(stream, file_size).file_name(filename);

            let form = Form::new()
                .text("purpose", purpose.to_string())
                .part("file", file_part);

            // 4. Send without a total timeout; large files may take a while
            let url = self.shared.build_url(&["files"])?;
            debug!(%url, file_size, "Sending file upload request");
            let builder = self.shared.streaming_request(Method::POST, url).multipart(form);
            let uploaded: UploadedFile = self.shared.send_json(builder, "Uploading file").await?;

            debug!(file_id = %uploaded.id, "File uploaded");
            Ok(uploaded)
        }
        .await
        .map_err(Into::into)
    }
}
