//! Capture sources and the transcript cleaning pipeline.
//!
//! The pure pipeline (`cleaner`, `filters`, `classifier`, `transcript`) turns raw
//! text into [`ParsedEntry`] values. The capture sources (`cursor`, `git`,
//! `manual`) read their input, run it through the pipeline and hand the result to
//! [`persist_entries`], which writes one new session through a [`CaptureStore`].

pub mod classifier;
pub mod cleaner;
pub mod cursor;
pub mod filters;
pub mod git;
pub mod manual;
pub mod rules;
pub mod transcript;

use anyhow::{Context, Result};

use crate::models::{ParsedEntry, Session, SourceKind};
use crate::store::CaptureStore;

pub use classifier::{classify, shorten_path, summarize_tool_call};
pub use cleaner::clean;
pub use cursor::{
    AutoCaptureResult, capture_all, capture_files, capture_transcript, find_transcripts_dir,
};
pub use filters::{extract_user_query, is_meta_noise, matching_noise_phrases};
pub use git::{GitCaptureOptions, capture_git, parse_git_log};
pub use manual::{capture_file, capture_note};
pub use transcript::{TranscriptFormat, parse_transcript};

/// Creates a session and appends `entries` to it in order
///
/// The first failed write aborts the rest and is returned.
pub fn persist_entries<S: CaptureStore + ?Sized>(
    store: &S,
    source: SourceKind,
    project: &str,
    label: &str,
    entries: &[ParsedEntry],
) -> Result<Session> {
    let session = store.create_session(source, project, label).context("create session")?;
    for entry in entries {
        store
            .add_entry(
                &session.id,
                entry.entry_type,
                &entry.content,
                &entry.metadata,
                entry.order_idx,
            )
            .with_context(|| format!("add entry {} to session {}", entry.order_idx, session.id))?;
    }
    Ok(session)
}
