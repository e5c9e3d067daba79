//! Read-only heuristic tables used by the capture pipeline.
//!
//! Every table is plain data: extending a heuristic means adding a row here,
//! never touching the control flow that consumes it.

/// Phrases that mark assistant text as a decision or finding
pub const DECISION_KEYWORDS: &[&str] = &[
    "decided",
    "decision",
    "chose",
    "going with",
    "opted for",
    "design choice",
    "the fix is",
    "the solution is",
    "root cause",
    "the problem is",
    "the issue is",
    "what needs to change",
];

/// Lowercase phrases that identify chatter about this tool itself rather than the
/// tracked project. Self-referential: a renamed deployment needs this table re-tuned.
pub const NOISE_PHRASES: &[&str] = &[
    "let me help you find your past chats",
    "let me look at the content of these chats",
    "let me also check if you have other cursor",
    "let me look for chats stored globally",
    "let me read the full transcript to extract",
    "let me explore your workspace",
    "dependencies installed",
    "all source files written",
    "build succeeded",
    "let me tidy deps",
    "let me clean up the test",
    "the commands seem to be running but not producing",
    "the issue is the `cd` in my build command",
    "let me separate the steps",
    "let me rebuild",
    "here's a summary of all your past cursor chats",
    "i found it. here's what happened with your",
    "all done. here's what was rebuilt",
    "your lost project",
    "ctxsave",
    ".ctxsave/",
    "ctxsave init",
    "ctxsave capture",
    "ctxsave generate",
    "auto-captured",
    "second run correctly skips",
    "let me verify the binary",
    "fresh init and",
    "now let me test",
    "it automatically found and captured",
    "everything works end-to-end",
    "i have the full plan and architecture",
    "let me also install the binary",
    "now rebuild and test",
    "now let me do a full end-to-end test",
    "scaffold go project",
    "now the capture packages",
    "now the compress and generate",
    "now the cli commands",
    "good, directory structure created",
    "the output is still too noisy",
    "much better! now it's selecting",
    "getting much better",
    "the structure is clean now",
    "now it's selecting",
    "entry count dropped",
    "noise filtered",
    "token est",
    "ctxsave-related",
    "meta-conversation about",
    "raw level was selected",
    "compression level",
    "token budget",
];

/// User replies that carry no information on their own
pub const ACKNOWLEDGEMENTS: &[&str] = &["yes", "no", "ok"];

/// Keywords that promote a free-form tool result to an error entry
pub const TOOL_RESULT_ERROR_KEYWORDS: &[&str] = &["error", "failed", "failure"];

/// Keywords that promote a structured `tool` record to an error entry
pub const TOOL_RECORD_ERROR_KEYWORDS: &[&str] = &["error", "failed", "exception"];

/// Requirement a tool-call rule places on the parsed fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolField {
    Path,
    Pattern,
    None,
}

/// How a matched tool call is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSummary {
    /// `<verb> <shortened path>`
    PathAction(&'static str),
    /// `Searched for '<pattern>'`, plus ` in <path>` when a path is present
    Search,
    /// A fixed sentence
    Fixed(&'static str),
}

/// One row of the tool-call table: tool names containing `tool` with `requires` present
#[derive(Debug, Clone, Copy)]
pub struct ToolRule {
    pub tool: &'static str,
    pub requires: ToolField,
    pub summary: ToolSummary,
}

/// Evaluated top to bottom; the first matching row wins
pub const TOOL_RULES: &[ToolRule] = &[
    ToolRule {
        tool: "StrReplace",
        requires: ToolField::Path,
        summary: ToolSummary::PathAction("Edited"),
    },
    ToolRule {
        tool: "Write",
        requires: ToolField::Path,
        summary: ToolSummary::PathAction("Wrote"),
    },
    ToolRule { tool: "Read", requires: ToolField::Path, summary: ToolSummary::PathAction("Read") },
    ToolRule { tool: "Grep", requires: ToolField::Pattern, summary: ToolSummary::Search },
    ToolRule {
        tool: "Glob",
        requires: ToolField::None,
        summary: ToolSummary::Fixed("Found files matching pattern"),
    },
    ToolRule {
        tool: "ReadLints",
        requires: ToolField::None,
        summary: ToolSummary::Fixed("Checked for lint errors"),
    },
];

/// True when `haystack` contains any of `needles` (caller lowercases both sides)
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_lowercase() {
        let tables = [
            DECISION_KEYWORDS,
            NOISE_PHRASES,
            TOOL_RESULT_ERROR_KEYWORDS,
            TOOL_RECORD_ERROR_KEYWORDS,
        ];
        for table in tables {
            for phrase in table {
                assert_eq!(*phrase, phrase.to_lowercase(), "rule must be lowercase: {phrase}");
                assert!(!phrase.is_empty());
            }
        }
    }

    #[test]
    fn test_edit_rule_precedes_write_rule() {
        let pos = |name: &str| TOOL_RULES.iter().position(|r| r.tool == name).unwrap();
        assert!(pos("StrReplace") < pos("Write"));
        assert!(pos("Read") < pos("ReadLints"));
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("build failed twice", TOOL_RESULT_ERROR_KEYWORDS));
        assert!(!contains_any("all green", TOOL_RESULT_ERROR_KEYWORDS));
        assert!(contains_any("nullpointerexception", TOOL_RECORD_ERROR_KEYWORDS));
        assert!(!contains_any("network failure while fetching", TOOL_RECORD_ERROR_KEYWORDS));
    }
}
