/// Marker appended to content that was cut at a length limit
pub const ELLIPSIS: &str = "...";

/// Keeps the first `limit` characters of `s`, appending [`ELLIPSIS`] when anything was cut
///
/// Counts characters rather than bytes so multi-byte text is never split mid code point.
///
/// # Examples
///
/// ```
/// use ctxsave::utils::truncate;
///
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("abcdefgh", 3), "abc...");
/// ```
pub fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + ELLIPSIS.len());
            out.push_str(&s[..byte_idx]);
            out.push_str(ELLIPSIS);
            out
        }
        None => s.to_string(),
    }
}

/// Returns everything before the first newline
pub fn first_line(s: &str) -> &str {
    s.split('\n').next().unwrap_or(s)
}

/// Length in characters, the unit every limit in this crate is expressed in
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
