use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::FileStatus;


/// A vector store file as the service documents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreFileObject {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub status: Option<FileStatus>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub usage_bytes: Option<u64>,
    #[serde(default)]
    pub vector_store_id: Option<String>,
}

/// A file entry in whichever shape the response delivered it.
///
/// Decoding tries the structured object first and falls back to a plain
/// key/value mapping, so entries with unexpected field types or unknown
/// status values still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Structured(VectorStoreFileObject),
    Mapping(Map<String, Value>),
}

impl FileEntry {
    pub fn normalize(self) -> FileRecord {
        FileRecord::from(self)
    }
}

/// Canonical view of a file entry. Absent fields stay `None` (or empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileRecord {
    pub id: Option<String>,
    pub filename: Option<String>,
    pub created_at: Option<i64>,
    pub status: Option<FileStatus>,
    pub attributes: Map<String, Value>,
}

impl From<VectorStoreFileObject> for FileRecord {
    fn from(object: VectorStoreFileObject) -> Self {
        FileRecord {
            id: Some(object.id).filter(|id| !id.is_empty()),
            filename: object.filename,
            created_at: object.created_at,
            status: object.status,
            attributes: object.attributes.unwrap_or_default(),
        }
    }
}

impl From<Map<String, Value>> for FileRecord {
    fn from(mut map: Map<String, Value>) -> Self {
        let status = match map.get("status") {
            Some(Value::String(s)) => match s.parse::<FileStatus>() {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(error = %e, "Ignoring unrecognised file status");
                    None
                }
            },
            _ => None,
        };

        let created_at = match map.get("created_at") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        let attributes = match map.remove("attributes") {
            Some(Value::Object(attributes)) => attributes,
            _ => Map::new(),
        };

        FileRecord {
            id: string_field(&map, "id").filter(|id| !id.is_empty()),
            filename: string_field(&map, "filename"),
            created_at,
            status,
            attributes,
        }
    }
}

impl From<FileEntry> for FileRecord {
    fn from(entry: FileEntry) -> Self {
        match entry {
            FileEntry::Structured(object) => object.into(),
            FileEntry::Mapping(map) => map.into(),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry(value: Value) -> FileEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn well_formed_object_decodes_as_structured() {
        let e = entry(json!({
            "id": "file-abc",
            "object": "vector_store.file",
            "filename": "notes.md",
            "created_at": 1_700_000_000,
            "status": "completed",
            "attributes": {"lang": "en"}
        }));
        assert!(matches!(e, FileEntry::Structured(_)));

        let record = e.normalize();
        assert_eq!(record.id.as_deref(), Some("file-abc"));
        assert_eq!(record.filename.as_deref(), Some("notes.md"));
        assert_eq!(record.created_at, Some(1_700_000_000));
        assert_eq!(record.status, Some(FileStatus::Completed));
        assert_eq!(record.attributes.get("lang"), Some(&json!("en")));
    }

    #[test]
    fn missing_status_and_filename_normalize_to_empty() {
        let record = entry(json!({"id": "file-1", "created_at": 12})).normalize();
        assert_eq!(record.id.as_deref(), Some("file-1"));
        assert_eq!(record.filename, None);
        assert_eq!(record.status, None);
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn unknown_status_falls_back_to_mapping() {
        let e = entry(json!({"id": "file-2", "status": "archived", "filename": "a.txt"}));
        assert!(matches!(e, FileEntry::Mapping(_)));

        let record = e.normalize();
        assert_eq!(record.id.as_deref(), Some("file-2"));
        assert_eq!(record.filename.as_deref(), Some("a.txt"));
        assert_eq!(record.status, None);
    }

    #[test]
    fn mapping_tolerates_odd_field_types() {
        let e = entry(json!({
            "id": 42,
            "filename": null,
            "created_at": "1700000000",
            "status": "failed",
            "attributes": "not-a-map"
        }));
        let record = e.normalize();
        assert_eq!(record.id, None);
        assert_eq!(record.filename, None);
        assert_eq!(record.created_at, Some(1_700_000_000));
        assert_eq!(record.status, Some(FileStatus::Failed));
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn record_without_id_has_no_cursor() {
        let record = entry(json!({"filename": "orphan.pdf"})).normalize();
        assert_eq!(record.id, None);

        let record = entry(json!({"id": ""})).normalize();
        assert_eq!(record.id, None);
    }
}
