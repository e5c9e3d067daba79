use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compress::Level;

/// Where a capture session's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Agent transcript (`.txt` or `.jsonl`)
    Cursor,
    Git,
    Manual,
    File,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Cursor => "cursor",
            SourceKind::Git => "git",
            SourceKind::Manual => "manual",
            SourceKind::File => "file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "cursor" => SourceKind::Cursor,
            "git" => SourceKind::Git,
            "manual" => SourceKind::Manual,
            "file" => SourceKind::File,
            other => bail!("unknown source kind: {}", other),
        })
    }
}

/// One capture event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub source: SourceKind,
    pub project: String,
    pub label: String,
}

/// Cached rendering of a session at one compression level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub session_id: String,
    pub level: Level,
    pub content: String,
    pub token_estimate: usize,
    pub created_at: DateTime<Utc>,
}
