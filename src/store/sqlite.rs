//! SQLite-backed store

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::CaptureStore;
use super::schema::create_schema;
use crate::compress::Level;
use crate::models::{Entry, EntryType, Session, SourceKind, Summary};
use crate::utils::create_data_dir;

const DB_FILENAME: &str = "context.db";
const DEFAULT_SESSION_LIMIT: usize = 50;
const DEFAULT_ENTRY_LIMIT: usize = 500;

const ENTRY_COLUMNS: &str = "id, session_id, type, content, metadata, order_idx, created_at";

/// Context database for one project
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) `<project_dir>/.ctxsave/context.db` and migrates it
    pub fn open(project_dir: &Path) -> Result<Self> {
        let dir = create_data_dir(project_dir)?;
        let db_path = dir.join(DB_FILENAME);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        debug!(path = %db_path.display(), "opened context database");
        Self::from_connection(conn)
    }

    /// A throwaway store, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    /// Path of the database file inside a project
    pub fn db_path(project_dir: &Path) -> std::path::PathBuf {
        crate::utils::data_dir(project_dir).join(DB_FILENAME)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        create_schema(&conn).context("Failed to migrate database schema")?;
        Ok(Self { conn })
    }

    /// Caches one rendering of a session
    pub fn add_summary(
        &self,
        session_id: &str,
        level: Level,
        content: &str,
        token_estimate: usize,
    ) -> Result<Summary> {
        let now = now();
        self.conn
            .execute(
                "INSERT INTO summaries (session_id, level, content, token_estimate, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session_id,
                    level.as_str(),
                    content,
                    token_estimate as i64,
                    format_ts(&now)
                ],
            )
            .context("Failed to insert summary")?;
        Ok(Summary {
            id: self.conn.last_insert_rowid(),
            session_id: session_id.to_string(),
            level,
            content: content.to_string(),
            token_estimate,
            created_at: now,
        })
    }

    /// Most recent sessions first; a `limit` of 0 means the default of 50
    pub fn list_sessions(&self, limit: usize) -> Result<Vec<Session>> {
        let limit = if limit == 0 { DEFAULT_SESSION_LIMIT } else { limit };
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, source, project, label FROM sessions
             ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], RawSession::from_row)?;
        rows.map(|r| r.context("Failed to read session row")?.into_session()).collect()
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, created_at, source, project, label FROM sessions WHERE id = ?1",
                params![id],
                RawSession::from_row,
            )
            .optional()
            .with_context(|| format!("Failed to look up session {}", id))?;
        raw.map(RawSession::into_session).transpose()
    }

    /// Entries of one session in order
    pub fn get_entries(&self, session_id: &str) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE session_id = ?1 ORDER BY order_idx"
        ))?;
        let rows = stmt.query_map(params![session_id], RawEntry::from_row)?;
        rows.map(|r| r.context("Failed to read entry row")?.into_entry()).collect()
    }

    /// Entries across sessions, newest session first and in order within each session
    pub fn get_all_entries(&self, limit: usize) -> Result<Vec<Entry>> {
        let limit = if limit == 0 { DEFAULT_ENTRY_LIMIT } else { limit };
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.session_id, e.type, e.content, e.metadata, e.order_idx, e.created_at
             FROM entries e
             JOIN sessions s ON e.session_id = s.id
             ORDER BY s.created_at DESC, s.rowid DESC, e.order_idx
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], RawEntry::from_row)?;
        rows.map(|r| r.context("Failed to read entry row")?.into_entry()).collect()
    }

    pub fn get_summaries(&self, session_id: &str) -> Result<Vec<Summary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, level, content, token_estimate, created_at FROM summaries
             WHERE session_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        rows.map(|r| -> Result<Summary> {
            let (id, session_id, level, content, token_estimate, created_at) =
                r.context("Failed to read summary row")?;
            Ok(Summary {
                id,
                session_id,
                level: level.parse()?,
                content,
                token_estimate: token_estimate.max(0) as usize,
                created_at: parse_ts(&created_at)?,
            })
        })
        .collect()
    }

    pub fn count_entries(&self, session_id: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM entries WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .context("Failed to count entries")?;
        Ok(count as usize)
    }
}

impl CaptureStore for SqliteStore {
    fn create_session(&self, source: SourceKind, project: &str, label: &str) -> Result<Session> {
        let id = new_session_id();
        let now = now();
        self.conn
            .execute(
                "INSERT INTO sessions (id, created_at, source, project, label)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, format_ts(&now), source.as_str(), project, label],
            )
            .context("Failed to insert session")?;
        debug!(session = %id, %source, "created session");
        Ok(Session {
            id,
            created_at: now,
            source,
            project: project.to_string(),
            label: label.to_string(),
        })
    }

    fn add_entry(
        &self,
        session_id: &str,
        entry_type: EntryType,
        content: &str,
        metadata: &Value,
        order_idx: i64,
    ) -> Result<Entry> {
        let now = now();
        self.conn
            .execute(
                "INSERT INTO entries (session_id, type, content, metadata, order_idx, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session_id,
                    entry_type.as_str(),
                    content,
                    encode_metadata(metadata),
                    order_idx,
                    format_ts(&now)
                ],
            )
            .context("Failed to insert entry")?;
        Ok(Entry {
            id: self.conn.last_insert_rowid(),
            session_id: session_id.to_string(),
            entry_type,
            content: content.to_string(),
            metadata: metadata.clone(),
            order_idx,
            created_at: now,
        })
    }

    fn is_transcript_processed(&self, path: &Path) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM processed_transcripts WHERE file_path = ?1",
                params![path.to_string_lossy()],
                |row| row.get(0),
            )
            .context("Failed to check processed transcripts")?;
        Ok(count > 0)
    }

    fn mark_transcript_processed(
        &self,
        path: &Path,
        session_id: &str,
        file_size: u64,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO processed_transcripts
                 (file_path, session_id, file_size, captured_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![path.to_string_lossy(), session_id, file_size as i64, format_ts(&now())],
            )
            .context("Failed to mark transcript processed")?;
        Ok(())
    }
}

/// Row as stored, before text columns are parsed into domain types
struct RawSession {
    id: String,
    created_at: String,
    source: String,
    project: String,
    label: String,
}

impl RawSession {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_at: row.get(1)?,
            source: row.get(2)?,
            project: row.get(3)?,
            label: row.get(4)?,
        })
    }

    fn into_session(self) -> Result<Session> {
        Ok(Session {
            created_at: parse_ts(&self.created_at)?,
            source: self.source.parse()?,
            id: self.id,
            project: self.project,
            label: self.label,
        })
    }
}

struct RawEntry {
    id: i64,
    session_id: String,
    entry_type: String,
    content: String,
    metadata: String,
    order_idx: i64,
    created_at: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            session_id: row.get(1)?,
            entry_type: row.get(2)?,
            content: row.get(3)?,
            metadata: row.get(4)?,
            order_idx: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<Entry> {
        Ok(Entry {
            id: self.id,
            entry_type: self.entry_type.parse()?,
            metadata: decode_metadata(&self.metadata),
            created_at: parse_ts(&self.created_at)?,
            session_id: self.session_id,
            content: self.content,
            order_idx: self.order_idx,
        })
    }
}

/// Current time at the precision the database keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp in database: {}", s))?
        .with_timezone(&Utc))
}

fn encode_metadata(metadata: &Value) -> String {
    match metadata {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_metadata(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
