//! Rules for spotting source code inside a user message
//!
//! Used when picking a question line for the detailed summary: pasted snippets,
//! stack traces and log lines should not be mistaken for the question itself.
//! This is a heuristic and misfires on punctuation-heavy prose.

/// Line endings that almost never end prose
pub const CODE_TERMINATORS: &[&str] = &[";", "{", "}", "},", ");", "});"];

/// Comment openers at the start of a line
pub const COMMENT_OPENERS: &[&str] = &["//", "/*", "* ", "*/"];

/// Substrings that mark a line as code wherever they appear
pub const SYNTAX_TOKENS: &[&str] = &[
    "const ",
    "let ",
    "var ",
    "function ",
    "async ",
    "await ",
    "if (",
    "if(",
    "} else",
    "=>",
    "===",
    "!==",
    ".find(",
    ".filter(",
    ".map(",
    ".push(",
    ".select(",
    "new ObjectId(",
    "new mongoose.",
    "req.",
    "res.",
    "L1:",
    "L2:",
    "L3:",
    "L4:",
    "L5:",
    "L6:",
    "L7:",
    "L8:",
    "L9:",
    "return (",
    "return {",
    "return [",
    "success:",
    "message:",
    "resType:",
    "**Project:**",
];

/// Characters counted towards the special-character ratio
pub const SPECIAL_CHARS: &[char] = &['{', '}', '(', ')', '[', ']', '=', ';', ':', '.', '>', '<'];

/// Lines whose share of [`SPECIAL_CHARS`] is above this are code
pub const SPECIAL_RATIO_THRESHOLD: f64 = 0.20;

/// The key of a `key: value` line must end before this character position
const PROPERTY_KEY_MAX: usize = 30;

/// One code-likeness rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRule {
    Terminator,
    CommentOpener,
    SyntaxToken,
    PropertyShape,
    SpecialRatio,
}

impl CodeRule {
    /// Evaluation order; the first match decides
    pub const ALL: [CodeRule; 5] = [
        CodeRule::Terminator,
        CodeRule::CommentOpener,
        CodeRule::SyntaxToken,
        CodeRule::PropertyShape,
        CodeRule::SpecialRatio,
    ];

    pub fn matches(self, line: &str) -> bool {
        let trimmed = line.trim();
        match self {
            CodeRule::Terminator => CODE_TERMINATORS.iter().any(|t| trimmed.ends_with(t)),
            CodeRule::CommentOpener => COMMENT_OPENERS.iter().any(|o| trimmed.starts_with(o)),
            CodeRule::SyntaxToken => SYNTAX_TOKENS.iter().any(|t| line.contains(t)),
            CodeRule::PropertyShape => is_property_assignment(trimmed),
            CodeRule::SpecialRatio => special_ratio(trimmed) > SPECIAL_RATIO_THRESHOLD,
        }
    }
}

/// First rule that flags `line` as code, if any
pub fn matching_rule(line: &str) -> Option<CodeRule> {
    CodeRule::ALL.into_iter().find(|rule| rule.matches(line))
}

/// True when any rule flags `line` as code
///
/// # Examples
///
/// ```
/// use ctxsave::compress::looks_like_code;
///
/// assert!(looks_like_code("const total = items.length;"));
/// assert!(!looks_like_code("Why does the retry loop never stop?"));
/// ```
pub fn looks_like_code(line: &str) -> bool {
    matching_rule(line).is_some()
}

/// `key: value` with a short, single-word (or bracketed) key and no `? `
fn is_property_assignment(trimmed: &str) -> bool {
    if !trimmed.contains(": ") || trimmed.contains("? ") {
        return false;
    }
    let Some(colon) = trimmed.find(':') else {
        return false;
    };
    let key = &trimmed[..colon];
    let key_len = key.chars().count();
    key_len > 0 && key_len < PROPERTY_KEY_MAX && (!key.contains(' ') || key.starts_with('['))
}

fn special_ratio(trimmed: &str) -> f64 {
    let total = trimmed.chars().count();
    if total == 0 {
        return 0.0;
    }
    let specials = trimmed.chars().filter(|c| SPECIAL_CHARS.contains(c)).count();
    specials as f64 / total as f64
}
