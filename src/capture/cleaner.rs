use std::sync::LazyLock;

use regex::Regex;

/// Structural wrapper tags injected by the agent UI; matched by name, not parsed
static MARKUP_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"</?(?:attached_files|code_selection|user_query|terminal_selection|system_reminder|open_and_recently_viewed_files)[^>]*>",
    )
    .expect("markup tag pattern is valid")
});

static THINKING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[Thinking\]\s*").expect("thinking pattern is valid"));

static LINE_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*L?\d+\|").expect("line number pattern is valid"));

/// Strips markup, `[Thinking]` markers and line-number gutters, then collapses blank runs
///
/// Repeats until nothing changes, so `clean(clean(x)) == clean(x)` even when removing
/// one artifact exposes another (e.g. `1|2|text`).
pub fn clean(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(s: &str) -> String {
    let s = MARKUP_TAGS.replace_all(s, "");
    let s = THINKING_PREFIX.replace_all(&s, "");
    let mut s = LINE_NUMBER_PREFIX.replace_all(&s, "").into_owned();

    while s.contains("\n\n\n") {
        s = s.replace("\n\n\n", "\n\n");
    }
    s.trim().to_string()
}
