//! Persistence for sessions, entries and cached summaries.
//!
//! Capture code only talks to the [`CaptureStore`] trait, so parsers and capture
//! sources can be exercised against a fake store; [`SqliteStore`] is the real
//! implementation backed by `<project>/.ctxsave/context.db`.

mod schema;
pub mod sqlite;

use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::models::{Entry, EntryType, Session, SourceKind};

pub use schema::create_schema;
pub use sqlite::SqliteStore;

/// The operations capture sources need from a store
pub trait CaptureStore {
    /// Records a new, immutable capture session
    fn create_session(&self, source: SourceKind, project: &str, label: &str) -> Result<Session>;

    /// Appends one entry; callers guarantee `order_idx` increases within a session
    fn add_entry(
        &self,
        session_id: &str,
        entry_type: EntryType,
        content: &str,
        metadata: &Value,
        order_idx: i64,
    ) -> Result<Entry>;

    /// True when a transcript at `path` was already captured
    fn is_transcript_processed(&self, path: &Path) -> Result<bool>;

    /// Registers `path` as captured into `session_id`
    fn mark_transcript_processed(
        &self,
        path: &Path,
        session_id: &str,
        file_size: u64,
    ) -> Result<()>;
}
