/// Edge case integration tests
///
/// Unusual transcript shapes, encodings and store states
mod common;

use std::fs;

use ctxsave::capture::{
    self, TranscriptFormat, clean, is_meta_noise, matching_noise_phrases, parse_transcript,
};
use ctxsave::compress::{Level, ModelFamily, best_fit, summarize};
use ctxsave::models::EntryType;
use ctxsave::store::{CaptureStore, SqliteStore};
use ctxsave::utils::truncate;
use common::{FreeFormTranscript, JsonlTranscript, ProjectFixture};

#[test]
fn test_edge_case_crlf_line_endings() {
    let transcript = "user:\r\nWhat is the root cause?\r\nassistant:\r\nIt is the cache.\r\n";
    let entries = parse_transcript(transcript, TranscriptFormat::FreeForm);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].content, "What is the root cause?");
    assert_eq!(entries[1].content, "It is the cache.");
}

#[test]
fn test_edge_case_preamble_and_empty_sections_leave_no_gaps() {
    let transcript = "exported from the editor\n\nuser:\n\nassistant:\n   \nuser:\nok\n\
        user:\nWhich queue drops messages?\n";
    let entries = parse_transcript(transcript, TranscriptFormat::FreeForm);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].order_idx, 0);
    assert_eq!(entries[0].content, "Which queue drops messages?");
}

#[test]
fn test_edge_case_meta_noise_is_dropped() {
    let sentence = "Let me also install the binary and then test ctxsave init";
    assert!(is_meta_noise(sentence));
    assert!(matching_noise_phrases(sentence).len() > 1);

    let transcript = FreeFormTranscript::new().assistant(sentence).build();
    assert!(parse_transcript(&transcript, TranscriptFormat::FreeForm).is_empty());
}

#[test]
fn test_edge_case_unicode_truncation() {
    let long_question = "é".repeat(2500);
    let transcript = FreeFormTranscript::new().user(&long_question).build();
    let entries = parse_transcript(&transcript, TranscriptFormat::FreeForm);
    assert_eq!(entries[0].content.chars().count(), 2003);
    assert!(entries[0].content.ends_with("..."));
    assert_eq!(truncate(&long_question, 2000), entries[0].content);
}

#[test]
fn test_edge_case_clean_is_idempotent_on_nested_artifacts() {
    let samples = [
        "1|2|let x = 1;",
        "[Thinking] [Thinking] considering",
        "<user_query><user_query>nested</user_query></user_query>",
        "a\n\n\n\n\n\nb",
        "  L10|  L11| fn main() {}\n",
    ];
    for raw in samples {
        let once = clean(raw);
        assert_eq!(clean(&once), once, "not idempotent for {raw:?}");
    }
}

#[test]
fn test_edge_case_structured_bare_string_and_missing_message() {
    let transcript = JsonlTranscript::new()
        .raw(r#"{"role":"user","message":{"content":"plain string content question"}}"#)
        .raw(r#"{"role":"assistant"}"#)
        .raw("")
        .raw("[1, 2, 3]")
        .build();
    let entries = parse_transcript(&transcript, TranscriptFormat::Structured);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].content, "plain string content question");
}

#[test]
fn test_edge_case_empty_transcript_still_creates_session() {
    let fixture = ProjectFixture::new("shop").initialized().with_transcript("empty.txt", "");
    let store = SqliteStore::open(fixture.project()).unwrap();

    let transcript = fixture.transcripts_dir().join("empty.txt");
    let (session, size) = capture::capture_transcript(&store, &transcript, "shop").unwrap();
    assert_eq!(size, 0);
    assert_eq!(store.count_entries(&session.id).unwrap(), 0);
}

#[test]
fn test_edge_case_non_utf8_transcript() {
    let fixture = ProjectFixture::new("shop").initialized();
    let path = fixture.project().join("latin1.txt");
    fs::write(&path, b"user:\nWhy is caf\xe9 broken in the menu?\n").unwrap();
    let store = SqliteStore::open(fixture.project()).unwrap();

    let (session, _) = capture::capture_transcript(&store, &path, "shop").unwrap();
    let entries = store.get_entries(&session.id).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].content.contains('\u{FFFD}'));
}

#[test]
fn test_edge_case_batch_reports_bad_file_and_continues() {
    let record = "{\"role\":\"user\",\"message\":{\"content\":\"Who owns invoices?\"}}\n";
    let fixture = ProjectFixture::new("shop")
        .initialized()
        .with_transcript("a.txt", "user:\nWhere are refunds logged?\n")
        .with_transcript("b.jsonl", record);
    let store = SqliteStore::open(fixture.project()).unwrap();

    let dir = fixture.transcripts_dir();
    let files = vec![dir.join("a.txt"), dir.join("missing.txt"), dir.join("b.jsonl")];
    let result = capture::capture_files(&store, &files, "shop");

    assert_eq!(result.captured, 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("missing.txt: "));
    assert!(store.is_transcript_processed(&dir.join("a.txt")).unwrap());
    assert!(!store.is_transcript_processed(&dir.join("missing.txt")).unwrap());
}

#[test]
fn test_edge_case_entries_without_user_questions() {
    let fixture = ProjectFixture::new("shop").initialized();
    let store = SqliteStore::open(fixture.project()).unwrap();
    let session = capture::capture_note(&store, "shop", "only a note").unwrap();
    let metadata = serde_json::json!({"role": "assistant"});
    store
        .add_entry(&session.id, EntryType::Conversation, "assistant words only here", &metadata, 1)
        .unwrap();

    let entries = store.get_entries(&session.id).unwrap();
    let renderings = summarize(&entries);
    assert!(!renderings.get(Level::Detailed).contains("Questions Discussed"));
    assert_eq!(renderings.get(Level::Ultra), "Context: 1 notes.");

    let (level, text) = best_fit(&renderings, 0, ModelFamily::Generic);
    assert_eq!(level, Level::Ultra);
    assert_eq!(text, "Context: 1 notes.");
}
