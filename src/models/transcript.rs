use serde::{Deserialize, Serialize};

/// One line of a structured (`.jsonl`) agent transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub role: String,
    #[serde(default)]
    pub message: RecordMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMessage {
    #[serde(default)]
    pub content: RecordContent,
}

/// Message content is usually a list of typed fragments, occasionally a bare string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordContent {
    Text(String),
    Fragments(Vec<ContentFragment>),
}

impl Default for RecordContent {
    fn default() -> Self {
        RecordContent::Fragments(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFragment {
    #[serde(rename = "type")]
    pub fragment_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl TranscriptRecord {
    /// Joins the record's non-empty `text` fragments with newlines
    pub fn text(&self) -> String {
        match &self.message.content {
            RecordContent::Text(s) => s.clone(),
            RecordContent::Fragments(fragments) => fragments
                .iter()
                .filter(|f| f.fragment_type == "text")
                .filter_map(|f| f.text.as_deref())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
