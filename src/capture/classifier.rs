use super::rules::{DECISION_KEYWORDS, TOOL_RULES, ToolField, ToolSummary, contains_any};
use crate::models::EntryType;
use crate::utils::char_len;

/// Assistant text starting with "now " and shorter than this is narration, not a finding
const NARRATION_MAX_CHARS: usize = 200;

/// Decision keywords only count in text longer than this
const DECISION_MIN_CHARS: usize = 100;

/// Decides whether cleaned assistant text records a decision or is ordinary conversation
///
/// The narration rule is checked first: a short "Now I'll …" stub stays conversation
/// even when it mentions a decision keyword.
pub fn classify(cleaned: &str) -> EntryType {
    let lower = cleaned.to_lowercase();
    let len = char_len(cleaned);

    if lower.starts_with("now ") && len < NARRATION_MAX_CHARS {
        return EntryType::Conversation;
    }

    if len > DECISION_MIN_CHARS && contains_any(&lower, DECISION_KEYWORDS) {
        return EntryType::Decision;
    }

    EntryType::Conversation
}

/// Fields recognised in a tool-call section
#[derive(Debug, Default, PartialEq, Eq)]
struct ToolCall<'a> {
    name: &'a str,
    path: Option<&'a str>,
    pattern: Option<&'a str>,
}

impl<'a> ToolCall<'a> {
    fn parse(section: &'a str) -> Self {
        let mut call = ToolCall::default();
        for line in section.trim().lines().map(str::trim) {
            if call.name.is_empty() && !line.is_empty() {
                call.name = line;
            }
            if let Some(rest) = line.strip_prefix("path:") {
                call.path = Some(rest.trim());
            }
            if let Some(rest) = line.strip_prefix("pattern:") {
                call.pattern = Some(rest.trim());
            }
        }
        call.path = call.path.filter(|p| !p.is_empty());
        call.pattern = call.pattern.filter(|p| !p.is_empty());
        call
    }

    fn has(&self, field: ToolField) -> bool {
        match field {
            ToolField::Path => self.path.is_some(),
            ToolField::Pattern => self.pattern.is_some(),
            ToolField::None => true,
        }
    }
}

/// One-line description of the action a tool call took
///
/// Returns an empty string when the call is not a reportable action (no recognised tool
/// and no file path).
pub fn summarize_tool_call(section: &str) -> String {
    let call = ToolCall::parse(section);

    let rule = TOOL_RULES.iter().find(|r| call.name.contains(r.tool) && call.has(r.requires));
    if let Some(rule) = rule {
        return match rule.summary {
            ToolSummary::PathAction(verb) => {
                format!("{} {}", verb, shorten_path(call.path.unwrap_or_default()))
            }
            ToolSummary::Search => {
                let pattern = call.pattern.unwrap_or_default();
                match call.path {
                    Some(path) => format!("Searched for '{}' in {}", pattern, shorten_path(path)),
                    None => format!("Searched for '{}'", pattern),
                }
            }
            ToolSummary::Fixed(text) => text.to_string(),
        };
    }

    match call.path {
        Some(path) => format!("{} on {}", call.name, shorten_path(path)),
        None => String::new(),
    }
}

/// Keeps the last three `/`-separated segments of long paths
///
/// # Examples
///
/// ```
/// use ctxsave::capture::shorten_path;
///
/// assert_eq!(shorten_path("/home/dev/app/src/main.rs"), ".../app/src/main.rs");
/// assert_eq!(shorten_path("src/main.rs"), "src/main.rs");
/// ```
pub fn shorten_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() <= 3 {
        return path.to_string();
    }
    format!(".../{}", parts[parts.len() - 3..].join("/"))
}
