//! Notes typed on the command line and snapshots of project files

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use tracing::info;

use super::persist_entries;
use crate::models::{EntryType, ParsedEntry, Session, SourceKind};
use crate::store::CaptureStore;
use crate::utils::{read_capped_file, truncate};

const FILE_CONTENT_LIMIT: usize = 10_000;

/// Records a single free-text note
pub fn capture_note<S: CaptureStore + ?Sized>(
    store: &S,
    project: &str,
    text: &str,
) -> Result<Session> {
    let text = text.trim();
    if text.is_empty() {
        bail!("note text cannot be empty");
    }

    let entry = ParsedEntry {
        entry_type: EntryType::Note,
        content: text.to_string(),
        metadata: Value::Null,
        order_idx: 0,
    };
    persist_entries(store, SourceKind::Manual, project, "note", &[entry])
}

/// Records the contents of `path`, truncated to 10000 characters
///
/// `display_path` is what ends up in the label and metadata, typically the path
/// the user typed rather than the resolved one.
pub fn capture_file<S: CaptureStore + ?Sized>(
    store: &S,
    project: &str,
    path: &Path,
    display_path: &str,
    tag: Option<&str>,
) -> Result<Session> {
    let (content, size) = read_capped_file(path).context("read file to capture")?;

    let entry = ParsedEntry {
        entry_type: EntryType::File,
        content: truncate(&content, FILE_CONTENT_LIMIT),
        metadata: json!({"path": display_path, "tag": tag.unwrap_or_default()}),
        order_idx: 0,
    };
    let label = format!("file: {}", display_path);
    let session = persist_entries(store, SourceKind::File, project, &label, &[entry])?;
    info!(file = %path.display(), bytes = size, session = %session.id, "captured file");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::store::SqliteStore;

    #[test]
    fn test_capture_note() {
        let store = SqliteStore::open_in_memory().unwrap();
        let session = capture_note(&store, "demo", "  retry budget is 3 attempts  ").unwrap();
        assert_eq!(session.source, SourceKind::Manual);
        assert_eq!(session.label, "note");

        let entries = store.get_entries(&session.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Note);
        assert_eq!(entries[0].content, "retry budget is 3 attempts");
    }

    #[test]
    fn test_capture_note_rejects_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = capture_note(&store, "demo", "   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(store.list_sessions(0).unwrap().is_empty());
    }

    #[test]
    fn test_capture_file_truncates_and_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.rs");
        fs::write(&path, "x".repeat(FILE_CONTENT_LIMIT + 50)).unwrap();
        let store = SqliteStore::open_in_memory().unwrap();

        let session = capture_file(&store, "demo", &path, "src/big.rs", Some("hot")).unwrap();
        assert_eq!(session.label, "file: src/big.rs");
        assert_eq!(session.source, SourceKind::File);

        let entries = store.get_entries(&session.id).unwrap();
        assert_eq!(entries[0].content.chars().count(), FILE_CONTENT_LIMIT + 3);
        assert!(entries[0].content.ends_with("..."));
        assert_eq!(entries[0].metadata["path"], "src/big.rs");
        assert_eq!(entries[0].metadata["tag"], "hot");
    }

    #[test]
    fn test_capture_missing_file() {
        let store = SqliteStore::open_in_memory().unwrap();
        let missing = Path::new("/nope/missing.rs");
        let err = capture_file(&store, "demo", missing, "missing.rs", None).unwrap_err();
        assert!(format!("{:#}", err).contains("read file to capture"));
        assert!(store.list_sessions(0).unwrap().is_empty());
    }
}
