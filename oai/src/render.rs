use std::fmt::Display;

use oai_core::vector_store::{FileRecord, VectorStore};

const ABSENT: &str = "-";

fn or_absent<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| v.to_string())
}

fn attributes(record: &FileRecord) -> String {
    if record.attributes.is_empty() {
        ABSENT.to_string()
    } else {
        serde_json::Value::Object(record.attributes.clone()).to_string()
    }
}

/// Multi-line view of one record.
pub fn record_block(record: &FileRecord) -> String {
    format!(
        "ID:         {}\nFilename:   {}\nCreated:    {}\nStatus:     {}\nAttributes: {}",
        or_absent(record.id.as_deref()),
        or_absent(record.filename.as_deref()),
        or_absent(record.created_at),
        or_absent(record.status),
        attributes(record),
    )
}

/// One line per record, for list walks.
pub fn record_line(record: &FileRecord) -> String {
    format!(
        "{}  {}  {}  {}",
        or_absent(record.id.as_deref()),
        or_absent(record.status),
        or_absent(record.created_at),
        or_absent(record.filename.as_deref()),
    )
}

pub fn store_line(store: &VectorStore) -> String {
    format!(
        "ID: {}, Name: {}, Created: {}",
        store.id,
        or_absent(store.name.as_deref()),
        or_absent(store.created_at),
    )
}

pub fn store_block(store: &VectorStore) -> String {
    let mut block = format!(
        "ID: {}\nName: {}\nDescription: {}\nCreated: {}",
        store.id,
        or_absent(store.name.as_deref()),
        or_absent(store.description.as_deref()),
        or_absent(store.created_at),
    );
    if let Some(status) = &store.status {
        block.push_str(&format!("\nStatus: {}", status));
    }
    if let Some(counts) = &store.file_counts {
        block.push_str(&format!(
            "\nFiles: {} total, {} completed, {} in progress, {} failed, {} cancelled",
            counts.total, counts.completed, counts.in_progress, counts.failed, counts.cancelled
        ));
    }
    block
}
