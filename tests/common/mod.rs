//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use ctxsave::capture::cursor::transcript_folder_name;
use tempfile::TempDir;

/// A fake home directory plus a project directory inside it
pub struct ProjectFixture {
    home: TempDir,
    project: PathBuf,
}

impl ProjectFixture {
    /// Creates `<home>/work/<name>` without initializing it
    pub fn new(name: &str) -> Self {
        let home = TempDir::new().expect("Failed to create temp home");
        let project = home.path().join("work").join(name);
        fs::create_dir_all(&project).expect("Failed to create project dir");
        Self { home, project }
    }

    /// Creates the project's `.ctxsave/` data directory
    pub fn initialized(self) -> Self {
        fs::create_dir_all(self.project.join(".ctxsave")).expect("Failed to create .ctxsave");
        self
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    /// Directory where the editor keeps this project's agent transcripts
    pub fn transcripts_dir(&self) -> PathBuf {
        self.home
            .path()
            .join(".cursor")
            .join("projects")
            .join(transcript_folder_name(&self.project))
            .join("agent-transcripts")
    }

    /// Writes a transcript into the editor's transcript directory
    pub fn with_transcript(self, name: &str, content: &str) -> Self {
        let dir = self.transcripts_dir();
        fs::create_dir_all(&dir).expect("Failed to create transcripts dir");
        fs::write(dir.join(name), content).expect("Failed to write transcript");
        self
    }

    /// Writes a file relative to the project root
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.project.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
        self
    }

    /// The binary, pointed at this fixture's home and project
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ctxsave"));
        cmd.env("HOME", self.home.path())
            .env("CTXSAVE_DIR", &self.project)
            .env_remove("CTXSAVE_LOG")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Builder for free-form (`.txt`) transcripts
#[derive(Default)]
pub struct FreeFormTranscript {
    text: String,
}

impl FreeFormTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, text: &str) -> Self {
        self.text.push_str(&format!("user:\n{}\n", text));
        self
    }

    pub fn assistant(mut self, text: &str) -> Self {
        self.text.push_str(&format!("assistant:\n{}\n", text));
        self
    }

    /// A tool call with a `path:` field
    pub fn tool_call(mut self, tool: &str, path: &str) -> Self {
        self.text.push_str(&format!("[Tool call] {}\n  path: {}\n", tool, path));
        self
    }

    /// A tool call with a `pattern:` field
    pub fn search(mut self, pattern: &str) -> Self {
        self.text.push_str(&format!("[Tool call] Grep\n  pattern: {}\n", pattern));
        self
    }

    pub fn tool_result(mut self, text: &str) -> Self {
        self.text.push_str(&format!("[Tool result]\n{}\n", text));
        self
    }

    pub fn build(self) -> String {
        self.text
    }
}

/// Builder for structured (`.jsonl`) transcripts
#[derive(Default)]
pub struct JsonlTranscript {
    lines: Vec<String>,
}

impl JsonlTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record whose text is a single `text` fragment
    pub fn record(mut self, role: &str, text: &str) -> Self {
        let value = serde_json::json!({
            "role": role,
            "message": {"content": [{"type": "text", "text": text}]}
        });
        self.lines.push(value.to_string());
        self
    }

    /// A raw line, e.g. malformed JSON
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Assistant text long enough and specific enough to be classified as a decision
pub fn decision_text(topic: &str) -> String {
    format!(
        "The root cause is that {} was never invalidated after writes, so stale rows were \
         served until the process restarted.",
        topic
    )
}

/// Extracts the session id from `... -> session <id>` output
pub fn session_id_from(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    text.split("session ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .expect("output should name a session")
        .to_string()
}
