//! Git history capture
//!
//! Shells out to `git` in the project directory. Commits come first in `git log`
//! order (most recent first), then working-tree and staged diff stats.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::debug;

use super::persist_entries;
use crate::models::{EntryType, ParsedEntry, Session, SourceKind};
use crate::utils::truncate;

const FIELD_SEPARATOR: &str = "|||";
const DIFF_LIMIT: usize = 3000;

/// Options for a git capture
#[derive(Debug, Clone, Default)]
pub struct GitCaptureOptions {
    /// Passed to `git log --since` when set (e.g. `4h`, `1d`)
    pub since: Option<String>,
    /// Maximum number of commits; 0 means no limit
    pub max_commits: usize,
}

/// Captures recent commits plus diff stats as a new session
pub fn capture_git<S: crate::store::CaptureStore + ?Sized>(
    store: &S,
    project_dir: &Path,
    project: &str,
    options: &GitCaptureOptions,
) -> Result<Session> {
    let log = run_git(project_dir, &log_args(options)).context("git log")?;
    let mut entries = parse_git_log(&log);
    if entries.is_empty() {
        bail!("no git commits found matching criteria");
    }

    let diffs = [
        (run_git(project_dir, &["diff", "--stat"]), "unstaged"),
        (run_git(project_dir, &["diff", "--staged", "--stat"]), "staged"),
    ];
    for (output, kind) in diffs {
        match output {
            Ok(stat) if !stat.trim().is_empty() => {
                entries.push(ParsedEntry {
                    entry_type: EntryType::GitDiff,
                    content: truncate(&stat, DIFF_LIMIT),
                    metadata: json!({"type": kind}),
                    order_idx: entries.len() as i64,
                });
            }
            Ok(_) => {}
            Err(e) => debug!(kind, error = %e, "skipping diff stat"),
        }
    }

    let label = match &options.since {
        Some(since) => format!("git (since {})", since),
        None => "git".to_string(),
    };
    persist_entries(store, SourceKind::Git, project, &label, &entries)
}

fn log_args(options: &GitCaptureOptions) -> Vec<String> {
    let mut args = vec!["log".to_string(), "--no-decorate".to_string()];
    if options.max_commits > 0 {
        args.push(format!("-n{}", options.max_commits));
    }
    if let Some(since) = &options.since {
        args.push("--since".to_string());
        args.push(since.clone());
    }
    args.push(format!("--format=%H{0}%s{0}%an{0}%ai", FIELD_SEPARATOR));
    args
}

/// Turns `--format=%H|||%s|||%an|||%ai` output into commit entries
///
/// Lines without all four fields are skipped; order indices stay consecutive.
pub fn parse_git_log(output: &str) -> Vec<ParsedEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(4, FIELD_SEPARATOR);
            let hash = parts.next()?.trim();
            let subject = parts.next()?;
            let author = parts.next()?;
            let date = parts.next()?;
            if hash.is_empty() {
                return None;
            }
            let short = hash.get(..8).unwrap_or(hash);
            Some((
                format!("[{}] {} (by {}, {})", short, subject, author, date),
                json!({"hash": hash, "author": author, "date": date}),
            ))
        })
        .enumerate()
        .map(|(idx, (content, metadata))| ParsedEntry {
            entry_type: EntryType::GitCommit,
            content,
            metadata,
            order_idx: idx as i64,
        })
        .collect()
}

fn run_git<I, A>(dir: &Path, args: I) -> Result<String>
where
    I: IntoIterator<Item = A>,
    A: AsRef<std::ffi::OsStr>,
{
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git exited with {}: {}", output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
