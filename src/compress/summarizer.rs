//! Multi-level summaries of a list of entries and budget-driven selection
//!
//! Every call produces all four [`Level`]s. Each level is a plain function in
//! [`STRATEGIES`]; [`best_fit`] walks them from least to most compressed and
//! returns the first that fits the token budget, falling back to ultra.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::code::looks_like_code;
use super::tokens::{ModelFamily, estimate};
use crate::models::{Entry, EntryType};
use crate::utils::{char_len, first_line, truncate};

const RAW_ENTRY_LIMIT: usize = 500;
const DECISION_LINE_LIMIT: usize = 200;
const QUESTION_LIMIT: usize = 150;
const ERROR_LINE_LIMIT: usize = 150;
const FINDING_LIMIT: usize = 100;
const MAX_FINDINGS: usize = 5;
const MAX_TOUCHED_FILES: usize = 5;
const MIN_MEANINGFUL_CHARS: usize = 20;
const MIN_QUESTION_CHARS: usize = 15;

/// Openers of assistant lines that narrate rather than report
const FILLER_OPENERS: &[&str] = &["now ", "let me ", "good", "here's", "okay"];

const EDIT_PREFIXES: &[&str] = &["Edited ", "Wrote "];
const READ_PREFIX: &str = "Read ";
const SEARCH_PREFIX: &str = "Searched for ";

/// Compression level, ordered from least to most compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Raw,
    Detailed,
    Compressed,
    Ultra,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Raw, Level::Detailed, Level::Compressed, Level::Ultra];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Raw => "raw",
            Level::Detailed => "detailed",
            Level::Compressed => "compressed",
            Level::Ultra => "ultra",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Level::ALL.into_iter().find(|l| l.as_str() == s) {
            Some(level) => Ok(level),
            None => bail!("unknown summary level: {}", s),
        }
    }
}

type Strategy = fn(&[Entry]) -> String;

/// Rendering function for each level, in best-fit order
pub const STRATEGIES: [(Level, Strategy); 4] = [
    (Level::Raw, render_raw),
    (Level::Detailed, render_detailed),
    (Level::Compressed, render_compressed),
    (Level::Ultra, render_ultra),
];

/// All four renderings of one entry list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderings {
    texts: [String; 4],
}

impl Renderings {
    pub fn get(&self, level: Level) -> &str {
        &self.texts[level as usize]
    }

    /// Levels and texts from raw to ultra
    pub fn iter(&self) -> impl Iterator<Item = (Level, &str)> {
        Level::ALL.into_iter().zip(self.texts.iter().map(String::as_str))
    }
}

/// Builds every level for `entries`
pub fn summarize(entries: &[Entry]) -> Renderings {
    Renderings { texts: STRATEGIES.map(|(_, render)| render(entries)) }
}

/// First level whose estimate fits `budget`, or ultra when none does
pub fn best_fit(renderings: &Renderings, budget: usize, family: ModelFamily) -> (Level, &str) {
    renderings
        .iter()
        .find(|(_, text)| estimate(text, family) <= budget)
        .unwrap_or((Level::Ultra, renderings.get(Level::Ultra)))
}

/// Every entry as a `[type] content` block
pub fn render_raw(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let content = truncate(&entry.content, RAW_ENTRY_LIMIT);
        out.push_str(&format!("[{}] {}\n\n", entry.entry_type, content));
    }
    out
}

/// One `###` section per entry type present, in the order types first appear
pub fn render_detailed(entries: &[Entry]) -> String {
    let mut out = String::new();
    for (entry_type, items) in group_by_type(entries) {
        match entry_type {
            EntryType::Decision => {
                let lines = items.iter().map(|e| extract_meaningful_line(&e.content));
                let lines = dedup(lines.filter(|l| !l.is_empty()));
                push_section(&mut out, "Key Decisions & Findings", &lines);
            }
            EntryType::CodeChange => {
                let edits = filter_edits(&items);
                if !edits.is_empty() {
                    push_section(&mut out, "Files Modified", &edits);
                }
                let searches = filter_searches(&items);
                if !searches.is_empty() {
                    push_section(&mut out, "Key Patterns Searched", &searches);
                }
                let reads = filter_reads(&items);
                if !reads.is_empty() {
                    push_section(&mut out, "Files Investigated", &reads);
                }
            }
            EntryType::GitCommit => {
                let lines: Vec<String> =
                    items.iter().map(|e| first_line(&e.content).to_string()).collect();
                push_section(&mut out, "Git Commits", &lines);
            }
            EntryType::Conversation => {
                let questions: Vec<&Entry> =
                    items.iter().copied().filter(|e| e.role() == Some("user")).collect();
                if questions.is_empty() {
                    continue;
                }
                let lines = dedup(
                    questions
                        .iter()
                        .map(|e| clean_question_line(&e.content))
                        .filter(|l| char_len(l) >= MIN_QUESTION_CHARS),
                );
                let lines: Vec<String> =
                    lines.iter().map(|l| truncate(l, QUESTION_LIMIT)).collect();
                push_section(&mut out, "Questions Discussed", &lines);
            }
            EntryType::Note => {
                let lines: Vec<String> = items.iter().map(|e| e.content.clone()).collect();
                push_section(&mut out, "Notes", &lines);
            }
            EntryType::File => {
                let lines: Vec<String> =
                    items.iter().map(|e| first_line(&e.content).to_string()).collect();
                push_section(&mut out, "Files Captured", &lines);
            }
            EntryType::Error => {
                let lines = dedup(items.iter().map(|e| first_line(&e.content).to_string()));
                let lines: Vec<String> =
                    lines.iter().map(|l| truncate(l, ERROR_LINE_LIMIT)).collect();
                push_section(&mut out, "Errors Encountered", &lines);
            }
            // Diff stats only make sense in full
            EntryType::GitDiff => {}
        }
    }
    out
}

/// Bold one-line digests of decisions, edits, commits and notes
pub fn render_compressed(entries: &[Entry]) -> String {
    let mut out = String::new();
    for (entry_type, items) in group_by_type(entries) {
        match entry_type {
            EntryType::Decision => {
                let lines = items.iter().map(|e| extract_meaningful_line(&e.content));
                let findings: Vec<String> = dedup(lines.filter(|l| !l.is_empty()))
                    .into_iter()
                    .take(MAX_FINDINGS)
                    .map(|l| truncate(&l, FINDING_LIMIT))
                    .collect();
                out.push_str(&format!("**Key Findings:** {}\n\n", findings.join("; ")));
            }
            EntryType::CodeChange => {
                let edits = filter_edits(&items);
                if !edits.is_empty() {
                    out.push_str(&format!(
                        "**Code Changes:** {} edits — {}\n\n",
                        edits.len(),
                        edits.join(", ")
                    ));
                }
            }
            EntryType::GitCommit => {
                out.push_str(&format!(
                    "**Git:** {} commits — latest: {}\n\n",
                    items.len(),
                    first_line(&items[0].content)
                ));
            }
            EntryType::Note => {
                let notes: Vec<&str> = items.iter().map(|e| e.content.as_str()).collect();
                out.push_str(&format!("**Notes:** {}\n\n", notes.join("; ")));
            }
            _ => {}
        }
    }
    out
}

/// A single sentence of counts plus a few touched files
pub fn render_ultra(entries: &[Entry]) -> String {
    let count = |t: EntryType| entries.iter().filter(|e| e.entry_type == t).count();
    let has = |t: EntryType| entries.iter().any(|e| e.entry_type == t);

    let mut parts = Vec::new();
    if has(EntryType::Decision) {
        parts.push(format!("{} decisions", count(EntryType::Decision)));
    }
    if has(EntryType::CodeChange) {
        let code_changes: Vec<&Entry> =
            entries.iter().filter(|e| e.entry_type == EntryType::CodeChange).collect();
        parts.push(format!("{} code edits", filter_edits(&code_changes).len()));
    }
    if has(EntryType::GitCommit) {
        parts.push(format!("{} commits", count(EntryType::GitCommit)));
    }
    if has(EntryType::Note) {
        parts.push(format!("{} notes", count(EntryType::Note)));
    }

    if parts.is_empty() {
        if entries.is_empty() {
            return "Context: no captured entries.".to_string();
        }
        parts.push(format!("{} entries", entries.len()));
    }

    let files = extract_edited_files(entries);
    let touched = if files.is_empty() {
        String::new()
    } else {
        format!(" Files touched: {}.", files[..files.len().min(MAX_TOUCHED_FILES)].join(", "))
    };
    format!("Context: {}.{}", parts.join(", "), touched)
}

/// Entries grouped by type, groups in the order their type first appears
pub fn group_by_type(entries: &[Entry]) -> Vec<(EntryType, Vec<&Entry>)> {
    let mut groups: Vec<(EntryType, Vec<&Entry>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(t, _)| *t == entry.entry_type) {
            Some((_, items)) => items.push(entry),
            None => groups.push((entry.entry_type, vec![entry])),
        }
    }
    groups
}

/// Unique `Edited `/`Wrote ` descriptions, first occurrence order
///
/// # Examples
///
/// ```
/// # use chrono::Utc;
/// # use ctxsave::models::{Entry, EntryType};
/// use ctxsave::compress::summarizer::filter_edits;
///
/// let entries: Vec<Entry> = ["Edited a/b.go", "Wrote a/b.go", "Edited a/b.go"]
///     .iter()
///     .enumerate()
///     .map(|(i, c)| Entry {
///         id: i as i64,
///         session_id: "s".into(),
///         entry_type: EntryType::CodeChange,
///         content: c.to_string(),
///         metadata: serde_json::Value::Null,
///         order_idx: i as i64,
///         created_at: Utc::now(),
///     })
///     .collect();
/// let refs: Vec<&Entry> = entries.iter().collect();
/// assert_eq!(filter_edits(&refs), vec!["Edited a/b.go", "Wrote a/b.go"]);
/// ```
pub fn filter_edits(entries: &[&Entry]) -> Vec<String> {
    dedup(
        entries
            .iter()
            .filter(|e| EDIT_PREFIXES.iter().any(|p| e.content.starts_with(p)))
            .map(|e| e.content.clone()),
    )
}

/// Unique paths from `Read <path>` entries
pub fn filter_reads(entries: &[&Entry]) -> Vec<String> {
    dedup(entries.iter().filter_map(|e| e.content.strip_prefix(READ_PREFIX)).map(str::to_string))
}

/// Unique `Searched for ...` descriptions
pub fn filter_searches(entries: &[&Entry]) -> Vec<String> {
    let searches = entries.iter().filter(|e| e.content.starts_with(SEARCH_PREFIX));
    dedup(searches.map(|e| e.content.clone()))
}

/// Unique paths of edited or written files across all code changes
pub fn extract_edited_files(entries: &[Entry]) -> Vec<String> {
    dedup(
        entries
            .iter()
            .filter(|e| e.entry_type == EntryType::CodeChange)
            .filter_map(|e| EDIT_PREFIXES.iter().find_map(|p| e.content.strip_prefix(p)))
            .filter(|path| !path.is_empty())
            .map(str::to_string),
    )
}

/// First line of at least 20 characters that is not narration filler
///
/// Falls back to the first line when it is longer than 20 characters, otherwise
/// returns an empty string. The result is truncated to 200 characters.
pub fn extract_meaningful_line(content: &str) -> String {
    let found = content.lines().map(str::trim).find(|line| {
        if char_len(line) < MIN_MEANINGFUL_CHARS {
            return false;
        }
        let lower = line.to_lowercase();
        !FILLER_OPENERS.iter().any(|f| lower.starts_with(f))
    });

    match found {
        Some(line) => truncate(line, DECISION_LINE_LIMIT),
        None => {
            let first = first_line(content);
            if char_len(first) > MIN_MEANINGFUL_CHARS {
                truncate(first, DECISION_LINE_LIMIT)
            } else {
                String::new()
            }
        }
    }
}

/// The line of a user message most likely to be the actual question
///
/// Skips short lines, code and markdown headings; a leading `@mention` is dropped.
pub fn clean_question_line(content: &str) -> String {
    for line in content.lines().map(str::trim) {
        if char_len(line) < MIN_QUESTION_CHARS || looks_like_code(line) {
            continue;
        }
        let line = match line.strip_prefix('@') {
            Some(rest) => rest.split_once(' ').map_or(line, |(_, after)| after.trim()),
            None => line,
        };
        if line.starts_with('#') {
            continue;
        }
        return line.to_string();
    }
    String::new()
}

fn push_section(out: &mut String, title: &str, lines: &[String]) {
    out.push_str("### ");
    out.push_str(title);
    out.push('\n');
    for line in lines {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
}

/// Drops repeats, keeping the first occurrence
fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
