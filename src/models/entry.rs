use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of entry kinds a capture can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Conversation,
    CodeChange,
    Decision,
    Error,
    GitCommit,
    GitDiff,
    Note,
    File,
}

impl EntryType {
    pub const ALL: [EntryType; 8] = [
        EntryType::Conversation,
        EntryType::CodeChange,
        EntryType::Decision,
        EntryType::Error,
        EntryType::GitCommit,
        EntryType::GitDiff,
        EntryType::Note,
        EntryType::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Conversation => "conversation",
            EntryType::CodeChange => "code_change",
            EntryType::Decision => "decision",
            EntryType::Error => "error",
            EntryType::GitCommit => "git_commit",
            EntryType::GitDiff => "git_diff",
            EntryType::Note => "note",
            EntryType::File => "file",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match EntryType::ALL.iter().find(|t| t.as_str() == s) {
            Some(t) => Ok(*t),
            None => bail!("unknown entry type: {}", s),
        }
    }
}

/// One atomic unit of captured knowledge within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub session_id: String,
    pub entry_type: EntryType,
    pub content: String,
    /// Small JSON object (`{"role":"user"}`, `{"source":"tool_call"}`), or `Null`
    pub metadata: Value,
    pub order_idx: i64,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Speaker role for conversation entries
    pub fn role(&self) -> Option<&str> {
        self.metadata.get("role").and_then(Value::as_str)
    }
}

/// An entry produced by a parser, before the store assigns ids and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub entry_type: EntryType,
    pub content: String,
    pub metadata: Value,
    pub order_idx: i64,
}
