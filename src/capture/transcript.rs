//! Transcript parsing for both agent transcript wire formats.
//!
//! - **Structured** (`.jsonl`): one JSON record per line, each handled on its own.
//! - **Free-form** (`.txt`): `user:` / `assistant:` / `[Tool call]` / `[Tool result]`
//!   markers split the text into sections, tracked by [`SectionState`].
//!
//! Parsing is pure: it turns text into [`ParsedEntry`] values with order indices
//! `0, 1, 2, …` assigned only to entries that survive filtering. Writing them anywhere
//! is the caller's job.

use std::path::Path;

use serde_json::{Value, json};
use tracing::debug;

use super::classifier::{classify, summarize_tool_call};
use super::cleaner::clean;
use super::filters::{extract_user_query, is_meta_noise};
use super::rules::{TOOL_RECORD_ERROR_KEYWORDS, TOOL_RESULT_ERROR_KEYWORDS, contains_any};
use crate::models::{EntryType, ParsedEntry, TranscriptRecord};
use crate::utils::truncate;

pub const USER_LIMIT: usize = 2000;
pub const ASSISTANT_LIMIT: usize = 3000;
pub const ERROR_LIMIT: usize = 500;

const TOOL_CALL_MARKER: &str = "[Tool call]";
const TOOL_RESULT_MARKER: &str = "[Tool result]";

/// Wire format of a transcript file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// Line-delimited JSON records
    Structured,
    /// Role-tagged plain text
    FreeForm,
}

impl TranscriptFormat {
    /// `.jsonl` files are structured; anything else is read as free-form text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") => TranscriptFormat::Structured,
            _ => TranscriptFormat::FreeForm,
        }
    }
}

/// Role of a free-form section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    User,
    Assistant,
    ToolCall,
    ToolResult,
}

/// A closed free-form section awaiting classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub role: SectionRole,
    pub text: String,
}

/// Scanner state for the free-form format
#[derive(Debug, Default, PartialEq, Eq)]
pub enum SectionState {
    /// Before the first marker; lines are dropped
    #[default]
    NoSection,
    /// A section is collecting lines
    Open { role: SectionRole, buffer: String },
}

impl SectionState {
    /// Feeds one line, returning the section it closed (if any)
    pub fn feed(&mut self, line: &str) -> Option<Section> {
        match section_marker(line) {
            Some((role, seed)) => {
                let mut buffer = String::new();
                if !seed.is_empty() {
                    buffer.push_str(seed);
                    buffer.push('\n');
                }
                let previous = std::mem::replace(self, SectionState::Open { role, buffer });
                previous.into_section()
            }
            None => {
                if let SectionState::Open { buffer, .. } = self {
                    buffer.push_str(line);
                    buffer.push('\n');
                }
                None
            }
        }
    }

    /// Closes whatever section is open at end of input
    pub fn finish(self) -> Option<Section> {
        self.into_section()
    }

    fn into_section(self) -> Option<Section> {
        match self {
            SectionState::NoSection => None,
            SectionState::Open { role, buffer } => Some(Section { role, text: buffer }),
        }
    }
}

/// Recognises a section marker line, returning the new role and any inline seed text
fn section_marker(line: &str) -> Option<(SectionRole, &str)> {
    let trimmed = line.trim();
    match trimmed {
        "user:" => return Some((SectionRole::User, "")),
        "assistant:" => return Some((SectionRole::Assistant, "")),
        _ => {}
    }
    if let Some(rest) = trimmed.strip_prefix(TOOL_CALL_MARKER) {
        return Some((SectionRole::ToolCall, rest.trim()));
    }
    if let Some(rest) = trimmed.strip_prefix(TOOL_RESULT_MARKER) {
        return Some((SectionRole::ToolResult, rest.trim()));
    }
    None
}

/// Splits free-form transcript text into sections in discovery order
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut state = SectionState::default();
    let mut sections = Vec::new();
    for line in text.split('\n') {
        if let Some(section) = state.feed(line) {
            sections.push(section);
        }
    }
    sections.extend(state.finish());
    sections
}

/// Parses transcript text in the given format
pub fn parse_transcript(text: &str, format: TranscriptFormat) -> Vec<ParsedEntry> {
    match format {
        TranscriptFormat::Structured => parse_structured(text),
        TranscriptFormat::FreeForm => parse_free_form(text),
    }
}

/// Parses role-tagged plain text
pub fn parse_free_form(text: &str) -> Vec<ParsedEntry> {
    let sections = split_sections(text);
    let total = sections.len();
    let entries = number(sections.iter().filter_map(process_section));
    debug!(sections = total, entries = entries.len(), "parsed free-form transcript");
    entries
}

/// Parses line-delimited JSON records, skipping lines that are not valid records
pub fn parse_structured(text: &str) -> Vec<ParsedEntry> {
    let mut skipped = 0usize;
    let candidates = text.lines().enumerate().filter_map(|(line_num, line)| {
        if line.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<TranscriptRecord>(line) {
            Ok(record) => process_record(&record),
            Err(e) => {
                debug!(line = line_num + 1, error = %e, "skipping malformed transcript record");
                skipped += 1;
                None
            }
        }
    });
    let entries = number(candidates);
    debug!(entries = entries.len(), skipped, "parsed structured transcript");
    entries
}

/// Assigns consecutive order indices to surviving entries
fn number(candidates: impl Iterator<Item = Candidate>) -> Vec<ParsedEntry> {
    candidates
        .enumerate()
        .map(|(idx, c)| ParsedEntry {
            entry_type: c.entry_type,
            content: c.content,
            metadata: c.metadata,
            order_idx: idx as i64,
        })
        .collect()
}

/// An entry that survived filtering but has no order index yet
struct Candidate {
    entry_type: EntryType,
    content: String,
    metadata: Value,
}

fn process_section(section: &Section) -> Option<Candidate> {
    let text = section.text.trim();
    if text.is_empty() {
        return None;
    }
    match section.role {
        SectionRole::User => user_entry(text),
        SectionRole::Assistant => assistant_entry(text),
        SectionRole::ToolCall => {
            let summary = summarize_tool_call(text);
            if summary.is_empty() {
                return None;
            }
            Some(Candidate {
                entry_type: EntryType::CodeChange,
                content: summary,
                metadata: json!({"source": "tool_call"}),
            })
        }
        SectionRole::ToolResult => error_entry(text, TOOL_RESULT_ERROR_KEYWORDS),
    }
}

fn process_record(record: &TranscriptRecord) -> Option<Candidate> {
    let text = record.text();
    if text.is_empty() {
        return None;
    }
    match record.role.as_str() {
        "user" => user_entry(&text),
        "assistant" => assistant_entry(&text),
        "tool" => error_entry(&text, TOOL_RECORD_ERROR_KEYWORDS),
        _ => None,
    }
}

fn user_entry(text: &str) -> Option<Candidate> {
    let query = extract_user_query(&clean(text));
    if query.is_empty() {
        return None;
    }
    Some(Candidate {
        entry_type: EntryType::Conversation,
        content: truncate(&query, USER_LIMIT),
        metadata: json!({"role": "user"}),
    })
}

fn assistant_entry(text: &str) -> Option<Candidate> {
    let cleaned = clean(text);
    if cleaned.is_empty() || is_meta_noise(&cleaned) {
        return None;
    }
    Some(Candidate {
        entry_type: classify(&cleaned),
        content: truncate(&cleaned, ASSISTANT_LIMIT),
        metadata: json!({"role": "assistant"}),
    })
}

fn error_entry(text: &str, keywords: &[&str]) -> Option<Candidate> {
    if !contains_any(&text.to_lowercase(), keywords) {
        return None;
    }
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return None;
    }
    Some(Candidate {
        entry_type: EntryType::Error,
        content: truncate(&cleaned, ERROR_LIMIT),
        metadata: json!({"source": "tool_result"}),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_example() {
        let input = "user:\nWhat is the root cause?\nassistant:\nThe root cause is a missing index \
            on the entries table, which caused full scans under load and the decision was made \
            to add one.\n";
        let entries = parse_free_form(input);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_type, EntryType::Conversation);
        assert_eq!(entries[0].order_idx, 0);
        assert_eq!(entries[0].content, "What is the root cause?");
        assert_eq!(entries[0].metadata, json!({"role": "user"}));

        assert_eq!(entries[1].entry_type, EntryType::Decision);
        assert_eq!(entries[1].order_idx, 1);
        assert!(entries[1].content.contains("root cause"));
        assert!(entries[1].content.len() > 100);
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut state = SectionState::default();
        assert_eq!(state.feed("preamble dropped"), None);
        assert_eq!(state, SectionState::NoSection);

        assert_eq!(state.feed("user:"), None);
        assert_eq!(state.feed("hello"), None);

        let closed = state.feed("[Tool call] Read").unwrap();
        assert_eq!(closed, Section { role: SectionRole::User, text: "hello\n".to_string() });
        assert_eq!(
            state,
            SectionState::Open { role: SectionRole::ToolCall, buffer: "Read\n".to_string() }
        );

        let closed = state.feed("  assistant:  ").unwrap();
        assert_eq!(closed.role, SectionRole::ToolCall);

        let closed = state.feed("[Tool result]").unwrap();
        assert_eq!(closed, Section { role: SectionRole::Assistant, text: String::new() });

        assert_eq!(state.finish().unwrap().role, SectionRole::ToolResult);
    }

    #[test]
    fn test_marker_must_be_exact() {
        let sections = split_sections("user:\nthe user: said\nassistant: inline is not a marker\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "the user: said\nassistant: inline is not a marker\n\n");
    }

    #[test]
    fn test_order_indices_have_no_gaps() {
        let input = "\
user:
ok
assistant:
Now let me test the thing
user:
First real question about the parser?
[Tool call] Shell
command: ls
[Tool result]
all good
[Tool call] StrReplace
path: /repo/src/parser/mod.rs
assistant:
Here is a normal reply about the parser behaviour.
[Tool result]
error: test failed
";
        let entries = parse_free_form(input);
        let indices: Vec<i64> = entries.iter().map(|e| e.order_idx).collect();
        assert_eq!(indices, (0..entries.len() as i64).collect::<Vec<_>>());

        let types: Vec<EntryType> = entries.iter().map(|e| e.entry_type).collect();
        assert_eq!(
            types,
            vec![
                EntryType::Conversation,
                EntryType::CodeChange,
                EntryType::Conversation,
                EntryType::Error,
            ]
        );
        assert_eq!(entries[1].content, "Edited .../src/parser/mod.rs");
        assert_eq!(entries[3].content, "error: test failed");
    }

    #[test]
    fn test_user_section_is_cleaned_and_truncated() {
        let body = "q".repeat(2500);
        let input = format!("user:\n<system_reminder>\n{}\n</system_reminder>\n", body);
        let entries = parse_free_form(&input);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content.chars().count(), USER_LIMIT + 3);
        assert!(entries[0].content.ends_with("..."));
    }

    #[test]
    fn test_assistant_meta_noise_is_dropped() {
        let entries = parse_free_form("assistant:\nBuild succeeded, all source files written.\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_tool_result_without_error_is_dropped() {
        let entries = parse_free_form("[Tool result] 3 files changed\n");
        assert!(entries.is_empty());

        let entries = parse_free_form("[Tool result] Compilation FAILED\nL1|src/a.rs\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "Compilation FAILED\nsrc/a.rs");
        assert_eq!(entries[0].metadata, json!({"source": "tool_result"}));
    }

    #[test]
    fn test_structured_records() {
        let input = r#"{"role":"user","message":{"content":[{"type":"text","text":"<user_query>How do I add a migration?</user_query>"}]}}
not json at all
{"role":"assistant","message":{"content":[{"type":"text","text":"[Thinking] Checking the schema"},{"type":"text","text":"Migrations live in db/migrations."}]}}

{"role":"tool","message":{"content":[{"type":"text","text":"NullPointerException at line 4"}]}}
{"role":"tool","message":{"content":[{"type":"text","text":"ok"}]}}
{"role":"system","message":{"content":[{"type":"text","text":"ignored"}]}}
{"role":"user","message":{"content":[{"type":"text","text":"yes"}]}}
"#;
        let entries = parse_structured(input);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].entry_type, EntryType::Conversation);
        assert_eq!(entries[0].content, "How do I add a migration?");

        assert_eq!(entries[1].entry_type, EntryType::Conversation);
        assert_eq!(entries[1].content, "Checking the schema\nMigrations live in db/migrations.");
        assert_eq!(entries[1].metadata, json!({"role": "assistant"}));

        assert_eq!(entries[2].entry_type, EntryType::Error);
        assert_eq!(entries[2].order_idx, 2);
    }

    #[test]
    fn test_tool_record_failure_wording_is_not_an_error() {
        let input = r#"
{"role":"tool","message":{"content":[{"type":"text","text":"Network failure while fetching"}]}}
"#;
        assert!(parse_structured(input).is_empty());

        let entries = parse_free_form("[Tool result] Network failure while fetching\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Error);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            TranscriptFormat::from_path(Path::new("a/b.jsonl")),
            TranscriptFormat::Structured
        );
        assert_eq!(TranscriptFormat::from_path(Path::new("a/b.txt")), TranscriptFormat::FreeForm);
        assert_eq!(TranscriptFormat::from_path(Path::new("notes")), TranscriptFormat::FreeForm);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_transcript("", TranscriptFormat::FreeForm).is_empty());
        assert!(parse_transcript("", TranscriptFormat::Structured).is_empty());
    }
}
