//! Agent transcript capture: one file at a time, or every new file for a project.
//!
//! # Error Handling Strategy
//!
//! - **Single file**: unreadable files fail before a session is created, so a failed
//!   capture never leaves a half-written session behind. A store failure while
//!   appending entries aborts the remaining writes for that file.
//! - **Batch**: each file is captured independently; failures are collected as
//!   `"<file name>: <error>"` strings in [`AutoCaptureResult::errors`] and the batch
//!   carries on with the next file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::persist_entries;
use super::transcript::{TranscriptFormat, parse_transcript};
use crate::models::{Session, SourceKind};
use crate::store::CaptureStore;
use crate::utils::read_capped_file;

const TRANSCRIPT_EXTENSIONS: &[&str] = &["txt", "jsonl"];

/// Outcome of a batch capture
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AutoCaptureResult {
    pub captured: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Locates the agent transcript directory the editor keeps for `project_dir`
///
/// The editor names the folder after the project path with the leading `/` dropped
/// and the remaining separators replaced by `-`.
pub fn find_transcripts_dir(home: &Path, project_dir: &Path) -> Result<PathBuf> {
    let projects_dir = home.join(".cursor").join("projects");
    if !projects_dir.is_dir() {
        bail!("cursor projects directory not found at {}", projects_dir.display());
    }

    let transcripts_dir =
        projects_dir.join(transcript_folder_name(project_dir)).join("agent-transcripts");
    if !transcripts_dir.is_dir() {
        bail!("no Cursor transcripts found for this project at {}", transcripts_dir.display());
    }

    Ok(transcripts_dir)
}

/// Folder name used for a project, e.g. `/home/dev/app` → `home-dev-app`
pub fn transcript_folder_name(project_dir: &Path) -> String {
    let path = project_dir.to_string_lossy();
    path.strip_prefix('/').unwrap_or(&path).replace('/', "-")
}

/// All `.txt` / `.jsonl` files under `dir`, sorted by path
pub fn find_transcript_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("transcripts directory not found: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable transcript path");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_transcript_extension(p))
        .collect();
    files.sort();
    Ok(files)
}

fn has_transcript_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| TRANSCRIPT_EXTENSIONS.contains(&e))
}

/// Parses one transcript file and records it as a new session
///
/// Returns the session and the file size in bytes.
pub fn capture_transcript<S: CaptureStore + ?Sized>(
    store: &S,
    path: &Path,
    project: &str,
) -> Result<(Session, u64)> {
    let (text, size) = read_capped_file(path).context("open transcript")?;
    let entries = parse_transcript(&text, TranscriptFormat::from_path(path));

    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let session = persist_entries(store, SourceKind::Cursor, project, &label, &entries)?;

    info!(
        file = %path.display(),
        session = %session.id,
        entries = entries.len(),
        "captured transcript"
    );
    Ok((session, size))
}

/// Captures every transcript for `project_dir` that has not been captured before
pub fn capture_all<S: CaptureStore + ?Sized>(
    store: &S,
    home: &Path,
    project_dir: &Path,
    project: &str,
) -> Result<AutoCaptureResult> {
    let dir = find_transcripts_dir(home, project_dir)?;
    let files = find_transcript_files(&dir).context("scan transcripts dir")?;
    Ok(capture_files(store, &files, project))
}

/// Batch-captures `files`, skipping those already registered as processed
pub fn capture_files<S: CaptureStore + ?Sized>(
    store: &S,
    files: &[PathBuf],
    project: &str,
) -> AutoCaptureResult {
    let mut result = AutoCaptureResult::default();

    for file in files {
        let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        match store.is_transcript_processed(file) {
            Ok(true) => {
                debug!(file = %file.display(), "already captured");
                result.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                result.errors.push(format!("{}: check error: {:#}", name, e));
                continue;
            }
        }

        let (session, size) = match capture_transcript(store, file, project) {
            Ok(captured) => captured,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "transcript capture failed");
                result.errors.push(format!("{}: {:#}", name, e));
                continue;
            }
        };

        if let Err(e) = store.mark_transcript_processed(file, &session.id, size) {
            result.errors.push(format!("{}: mark processed: {:#}", name, e));
        }
        result.captured += 1;
    }

    result
}
