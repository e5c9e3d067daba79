//! Token estimation by character count
//!
//! There is no tokenizer here. Each model family gets a fixed characters-per-token
//! ratio; the only guarantee is that estimates grow with text length.

use std::fmt;

/// Tokenizer family a model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Claude,
    Gemini,
    Gpt,
    /// Any family without a tuned ratio
    Generic,
}

impl ModelFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelFamily::Claude => "claude",
            ModelFamily::Gemini => "gemini",
            ModelFamily::Gpt => "gpt",
            ModelFamily::Generic => "generic",
        }
    }

    /// Average characters per token
    pub fn chars_per_token(self) -> f64 {
        match self {
            ModelFamily::Gemini => 3.8,
            ModelFamily::Claude | ModelFamily::Gpt | ModelFamily::Generic => 3.5,
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated token count: characters divided by the family ratio, floored
///
/// # Examples
///
/// ```
/// use ctxsave::compress::{ModelFamily, estimate};
///
/// assert_eq!(estimate(&"a".repeat(350), ModelFamily::Claude), 100);
/// assert_eq!(estimate("", ModelFamily::Gemini), 0);
/// ```
pub fn estimate(text: &str, family: ModelFamily) -> usize {
    let chars = text.chars().count() as f64;
    (chars / family.chars_per_token()).floor() as usize
}
