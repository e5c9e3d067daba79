//! ctxsave - carry project context between AI sessions
//!
//! Captures context from agent transcripts, git history, notes and files into a
//! per-project SQLite database, then renders it at four levels of compression so
//! that the largest rendering fitting a model's token budget can be pasted into a
//! fresh session.
//!
//! - [`capture`] - transcript cleaning, classification and the capture sources
//! - [`compress`] - token estimation, summary levels and best-fit selection
//! - [`generate`] - model profiles and prompt assembly
//! - [`store`] - the SQLite store behind the [`store::CaptureStore`] trait
//!
//! # Example
//!
//! ```
//! use ctxsave::capture::{TranscriptFormat, parse_transcript};
//!
//! let transcript = "user:\nWhy is the cache cold after deploys?\n";
//! let entries = parse_transcript(transcript, TranscriptFormat::FreeForm);
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].content, "Why is the cache cold after deploys?");
//! ```

pub mod capture;
pub mod cli;
pub mod clipboard;
pub mod compress;
pub mod generate;
pub mod logging;
pub mod models;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use capture::{AutoCaptureResult, parse_transcript};
pub use clipboard::copy_to_clipboard;
pub use compress::{Level, ModelFamily, best_fit, estimate, summarize};
pub use models::{Entry, EntryType, Session, SourceKind};
pub use store::{CaptureStore, SqliteStore};
