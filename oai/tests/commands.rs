use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use oai::cli::{FileRef, FilesListArgs, TtsArgs};
use oai::commands::{files, speech, upload};
use oai_core::files::{FilesApi, UploadedFile};
use oai_core::speech::{SpeechApi, SpeechRequest};
use oai_core::vector_store::{
    FileEntry, FilePage, ListFilesRequest, SortOrder, VectorStoreFileApi,
};
use oai_core::ApiError;

/// In-memory account with one vector store. Every call is recorded.
#[derive(Default)]
struct FakeAccount {
    pages: Vec<Result<FilePage, u16>>,
    content: Vec<u8>,
    /// Attributes the file currently carries.
    attributes: Map<String, Value>,
    fail_single_record: bool,
    fail_upload_of: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeAccount {
    fn record(&self, call: String) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn not_found(&self) -> Result<(), ApiError> {
        if self.fail_single_record {
            Err(ApiError::NotFound("No file found with id 'file-x'.".to_string()))
        } else {
            Ok(())
        }
    }
}

fn entry(value: Value) -> FileEntry {
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl VectorStoreFileApi for FakeAccount {
    async fn list(&self, vector_store_id: &str, request: &ListFilesRequest) -> Result<FilePage, ApiError> {
        self.record(format!("list {} after={:?}", vector_store_id, request.after));
        let fetches = self.calls().iter().filter(|c| c.starts_with("list")).count();
        match self.pages.get(fetches - 1) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(ApiError::Api { status: *status, message: "server error".to_string() }),
            None => Ok(FilePage::default()),
        }
    }

    async fn retrieve(&self, _vector_store_id: &str, file_id: &str) -> Result<FileEntry, ApiError> {
        self.record(format!("retrieve {}", file_id));
        self.not_found()?;
        let mut file = json!({ "id": file_id, "status": "completed", "created_at": 5 });
        if !self.attributes.is_empty() {
            file["attributes"] = Value::Object(self.attributes.clone());
        }
        Ok(entry(file))
    }

    async fn content(&self, _vector_store_id: &str, file_id: &str) -> Result<Vec<u8>, ApiError> {
        self.record(format!("content {}", file_id));
        self.not_found()?;
        Ok(self.content.clone())
    }

    async fn update(
        &self,
        _vector_store_id: &str,
        file_id: &str,
        attributes: Map<String, Value>,
    ) -> Result<FileEntry, ApiError> {
        self.record(format!("update {} {}", file_id, Value::Object(attributes.clone())));
        self.not_found()?;
        Ok(entry(json!({ "id": file_id, "attributes": attributes })))
    }

    async fn delete(&self, _vector_store_id: &str, file_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete {}", file_id));
        self.not_found()
    }

    async fn attach(&self, vector_store_id: &str, file_id: &str) -> Result<FileEntry, ApiError> {
        self.record(format!("attach {} {}", vector_store_id, file_id));
        Ok(entry(json!({ "id": file_id, "vector_store_id": vector_store_id })))
    }
}

#[async_trait]
impl FilesApi for FakeAccount {
    async fn upload(&self, path: &Path, purpose: &str) -> Result<UploadedFile, ApiError> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let n = self.record(format!("upload {} {}", name, purpose));
        if self.fail_upload_of.as_deref() == Some(name.as_str()) {
            return Err(ApiError::RateLimited("slow down".to_string()));
        }
        Ok(UploadedFile {
            id: format!("file-{}", n),
            filename: Some(name),
            bytes: None,
            purpose: Some(purpose.to_string()),
            created_at: None,
        })
    }
}

#[async_trait]
impl SpeechApi for FakeAccount {
    async fn speak(&self, request: &SpeechRequest) -> Result<Vec<u8>, ApiError> {
        self.record(format!("speak {} {} {}", request.model, request.voice, request.input));
        Ok(b"ID3fake-audio".to_vec())
    }
}

fn file_ref() -> FileRef {
    FileRef { vector_store_id: "vs_1".to_string(), file_id: "file-x".to_string() }
}

fn list_args() -> FilesListArgs {
    FilesListArgs {
        vector_store_id: "vs_1".to_string(),
        filter: None,
        order: SortOrder::Desc,
        limit: 100,
    }
}

fn output(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

// --- Single-record commands ---

#[tokio::test]
async fn single_record_failures_are_reported_not_raised() {
    let api = FakeAccount { fail_single_record: true, ..Default::default() };
    let mut out = Vec::new();

    files::get(&api, &mut out, &file_ref()).await.unwrap();
    files::content(&api, &mut out, &file_ref()).await.unwrap();
    files::update(&api, &mut out, &file_ref(), "k", "v").await.unwrap();
    files::delete(&api, &mut out, &file_ref()).await.unwrap();

    let text = output(out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Failed to retrieve file file-x: Not found"));
    assert!(lines[1].starts_with("Failed to retrieve content of file file-x:"));
    assert!(lines[2].starts_with("Failed to update file file-x:"));
    assert!(lines[3].starts_with("Failed to delete file file-x:"));
}

#[tokio::test]
async fn content_with_invalid_utf8_is_printed_lossily() {
    let api = FakeAccount { content: vec![b'o', b'k', 0xFF, 0xFE, b'!'], ..Default::default() };
    let mut out = Vec::new();
    files::content(&api, &mut out, &file_ref()).await.unwrap();
    assert_eq!(output(out), "ok\u{FFFD}\u{FFFD}!\n");
}

#[tokio::test]
async fn update_sends_parsed_json_value() {
    let api = FakeAccount::default();
    let mut out = Vec::new();
    files::update(&api, &mut out, &file_ref(), "tags", r#"["a","b"]"#).await.unwrap();
    files::update(&api, &mut out, &file_ref(), "note", "[not json").await.unwrap();

    assert_eq!(
        api.calls(),
        [
            "retrieve file-x",
            r#"update file-x {"tags":["a","b"]}"#,
            "retrieve file-x",
            r#"update file-x {"note":"[not json"}"#,
        ]
    );
    assert!(output(out).contains(r#"Attributes: {"tags":["a","b"]}"#));
}

#[tokio::test]
async fn update_keeps_the_other_attributes() {
    let mut attributes = Map::new();
    attributes.insert("lang".to_string(), json!("en"));
    attributes.insert("tier".to_string(), json!("gold"));
    let api = FakeAccount { attributes, ..Default::default() };
    let mut out = Vec::new();

    files::update(&api, &mut out, &file_ref(), "tier", "silver").await.unwrap();

    assert_eq!(
        api.calls(),
        ["retrieve file-x", r#"update file-x {"lang":"en","tier":"silver"}"#]
    );
}

#[tokio::test]
async fn update_is_not_sent_when_the_file_cannot_be_read() {
    let api = FakeAccount { fail_single_record: true, ..Default::default() };
    let mut out = Vec::new();

    files::update(&api, &mut out, &file_ref(), "k", "v").await.unwrap();

    assert_eq!(api.calls(), ["retrieve file-x"]);
    assert!(output(out).starts_with("Failed to update file file-x: Not found"));
}

#[tokio::test]
async fn retrieve_renders_normalized_record() {
    let api = FakeAccount::default();
    let mut out = Vec::new();
    files::get(&api, &mut out, &file_ref()).await.unwrap();
    assert_eq!(
        output(out),
        "ID:         file-x\nFilename:   -\nCreated:    5\nStatus:     completed\nAttributes: -\n"
    );
}

// --- Listing ---

#[tokio::test]
async fn list_prints_records_then_aborts_on_failure() {
    let api = FakeAccount {
        pages: vec![
            Ok(FilePage::new(
                vec![
                    entry(json!({ "id": "file-1", "status": "completed", "created_at": 1, "filename": "a.md" })),
                    entry(json!({ "id": "file-2" })),
                ],
                Some(true),
            )),
            Err(500),
        ],
        ..Default::default()
    };
    let mut out = Vec::new();

    let err = files::list(&api, &mut out, list_args()).await.unwrap_err();

    assert_eq!(output(out), "file-1  completed  1  a.md\nfile-2  -  -  -\n");
    let message = format!("{err:#}");
    assert!(message.contains("aborted after 2 records"), "{message}");
    assert!(message.contains("status=500"), "{message}");
    assert_eq!(api.calls(), ["list vs_1 after=None", "list vs_1 after=Some(\"file-2\")"]);
}

#[tokio::test]
async fn list_reports_count() {
    let api = FakeAccount {
        pages: vec![Ok(FilePage::new(vec![entry(json!({ "id": "file-1" }))], Some(false)))],
        ..Default::default()
    };
    let mut out = Vec::new();
    assert_eq!(files::list(&api, &mut out, list_args()).await.unwrap(), 1);
    assert_eq!(api.calls().len(), 1);
}

// --- Upload ---

#[tokio::test]
async fn upload_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = format!("{}/*.pdf", dir.path().display());
    let api = FakeAccount::default();
    let mut out = Vec::new();

    let err = upload::upload(&api, &api, &mut out, &pattern, None, "assistants").await.unwrap_err();
    assert_eq!(err.to_string(), format!("No files matched the pattern: {}", pattern));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn upload_to_vector_store_attaches_each_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    std::fs::write(dir.path().join("b.txt"), "beta").unwrap();
    std::fs::create_dir(dir.path().join("c.txt")).unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());
    let api = FakeAccount::default();
    let mut out = Vec::new();

    upload::upload(&api, &api, &mut out, &pattern, Some("vs_1"), "batch").await.unwrap();

    assert_eq!(
        api.calls(),
        [
            "upload a.txt assistants",
            "attach vs_1 file-1",
            "upload b.txt assistants",
            "attach vs_1 file-3",
        ]
    );
    let text = output(out);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Uploaded to Vector Store: file-1 ("));
    assert!(lines[1].starts_with("Uploaded to Vector Store: file-3 ("));
    assert!(lines[2].starts_with("Not a file: "));
}

#[tokio::test]
async fn one_failed_upload_does_not_stop_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        std::fs::write(dir.path().join(name), name).unwrap();
    }
    let pattern = format!("{}/*.txt", dir.path().display());
    let api = FakeAccount { fail_upload_of: Some("b.txt".to_string()), ..Default::default() };
    let mut out = Vec::new();

    let err = upload::upload(&api, &api, &mut out, &pattern, None, "fine-tune").await.unwrap_err();

    assert_eq!(err.to_string(), "1 of 3 uploads failed");
    assert_eq!(api.calls(), ["upload a.txt fine-tune", "upload b.txt fine-tune", "upload c.txt fine-tune"]);
    let text = output(out);
    assert!(text.contains("File uploaded: file-1 ("));
    assert!(text.contains("Failed to upload "));
    assert!(text.contains("File uploaded: file-3 ("));
}

// --- Speech ---

#[test]
fn input_file_text_takes_precedence() {
    assert_eq!(
        speech::resolve_text(Some("inline".to_string()), Some("  from file \n".to_string())).as_deref(),
        Some("from file")
    );
    assert_eq!(speech::resolve_text(Some("inline".to_string()), None).as_deref(), Some("inline"));
    assert_eq!(speech::resolve_text(Some("   ".to_string()), None), None);
    assert_eq!(speech::resolve_text(None, Some("\n".to_string())), None);
}

#[tokio::test]
async fn tts_writes_audio_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    std::fs::write(&input, "Hello from a file\n").unwrap();
    let output_path = dir.path().join("out.mp3");
    let api = FakeAccount::default();
    let mut out = Vec::new();

    let args = TtsArgs {
        text: Some("ignored".to_string()),
        input_file: Some(input),
        output: output_path.clone(),
        model: "tts-1-hd".to_string(),
        voice: "echo".to_string(),
    };
    speech::tts(&api, &mut out, args).await.unwrap();

    assert_eq!(api.calls(), ["speak tts-1-hd echo Hello from a file"]);
    assert_eq!(std::fs::read(&output_path).unwrap(), b"ID3fake-audio");
    assert_eq!(output(out), format!("Audio file saved: {}\n", output_path.display()));
}

#[tokio::test]
async fn tts_without_text_fails() {
    let api = FakeAccount::default();
    let mut out = Vec::new();
    let args = TtsArgs {
        text: None,
        input_file: None,
        output: "unused.mp3".into(),
        model: "tts-1-hd".to_string(),
        voice: "echo".to_string(),
    };
    let err = speech::tts(&api, &mut out, args).await.unwrap_err();
    assert_eq!(err.to_string(), "Text is required.");
    assert!(api.calls().is_empty());
}
