//! Data models for captured project context.
//!
//! - [`Session`] - One capture event (transcript, git history, note, file)
//! - [`Entry`] - Typed, cleaned unit of content with a stable order index
//! - [`ParsedEntry`] - Parser output before it is persisted
//! - [`Summary`] - Cached rendering of a session at one compression level
//! - [`TranscriptRecord`] - One line of a structured agent transcript
//!
//! Entry metadata is kept as a `serde_json::Value` so that capture sources can
//! attach their own small objects without a schema change.

pub mod entry;
pub mod session;
pub mod transcript;

pub use entry::{Entry, EntryType, ParsedEntry};
pub use session::{Session, SourceKind, Summary};
pub use transcript::{ContentFragment, RecordContent, RecordMessage, TranscriptRecord};
