use super::rules::{ACKNOWLEDGEMENTS, NOISE_PHRASES};

const QUERY_OPEN: &str = "<user_query>";
const QUERY_CLOSE: &str = "</user_query>";

/// Pulls the user's question out of a `<user_query>` wrapper when one is present
///
/// Without a wrapper the trimmed text is returned as is, unless it is empty or a bare
/// acknowledgement ("yes", "no", "ok"), in which case the result is empty and the
/// caller should discard the block.
pub fn extract_user_query(cleaned: &str) -> String {
    if let Some(start) = cleaned.find(QUERY_OPEN)
        && let Some(end) = cleaned.find(QUERY_CLOSE)
        && end > start
    {
        return cleaned[start + QUERY_OPEN.len()..end].trim().to_string();
    }

    let trimmed = cleaned.trim();
    if trimmed.is_empty() || ACKNOWLEDGEMENTS.contains(&trimmed) {
        return String::new();
    }
    trimmed.to_string()
}

/// True when the text talks about the capture tool's own operation
///
/// Known heuristic limitation: the phrase table is hand-maintained, so both missed noise
/// and discarded real content are possible.
pub fn is_meta_noise(cleaned: &str) -> bool {
    let lower = cleaned.to_lowercase();
    NOISE_PHRASES.iter().any(|p| lower.contains(p))
}

/// Every noise phrase found in the text, in table order
pub fn matching_noise_phrases(cleaned: &str) -> Vec<&'static str> {
    let lower = cleaned.to_lowercase();
    NOISE_PHRASES.iter().copied().filter(|p| lower.contains(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_user_query_unwraps_tag() {
        let text = "<attached_files>x</attached_files>\n<user_query>\n  Why does login fail?\n\
            </user_query>";
        assert_eq!(extract_user_query(text), "Why does login fail?");
    }

    #[test]
    fn test_extract_user_query_ignores_reversed_tags() {
        let text = "</user_query> stray <user_query>";
        assert_eq!(extract_user_query(text), text);
    }

    #[test]
    fn test_extract_user_query_drops_acknowledgements() {
        for ack in ["yes", "no", "ok", "  ok  ", ""] {
            assert_eq!(extract_user_query(ack), "", "expected {ack:?} to be discarded");
        }
        // Only exact matches are acknowledgements
        assert_eq!(extract_user_query("ok, ship it"), "ok, ship it");
        assert_eq!(extract_user_query("Yes"), "Yes");
    }

    #[test]
    fn test_meta_noise_matches_multiple_phrases() {
        let text = "Let me also install the binary and then test ctxsave init";
        assert!(is_meta_noise(text));
        let hits = matching_noise_phrases(text);
        assert!(hits.contains(&"let me also install the binary"));
        assert!(hits.contains(&"ctxsave"));
        assert!(hits.contains(&"ctxsave init"));
    }

    #[test]
    fn test_meta_noise_is_case_insensitive() {
        assert!(is_meta_noise("BUILD SUCCEEDED with no warnings"));
    }

    #[test]
    fn test_project_content_is_not_noise() {
        assert!(!is_meta_noise("The migration adds an index on orders.customer_id."));
        assert!(matching_noise_phrases("Refactor the payment retry loop").is_empty());
    }

    #[test]
    fn test_each_noise_phrase_triggers_alone() {
        for phrase in NOISE_PHRASES {
            let text = format!("Prefix. {} suffix", phrase.to_uppercase());
            assert!(is_meta_noise(&text), "phrase did not match: {phrase}");
        }
    }
}
