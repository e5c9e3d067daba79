//! Static table of target models

use crate::compress::ModelFamily;

/// A model a prompt can be sized for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelProfile {
    pub key: &'static str,
    pub name: &'static str,
    pub family: ModelFamily,
    /// Context window in tokens
    pub context_limit: usize,
    pub description: &'static str,
}

/// Known models in display order
pub const MODELS: &[ModelProfile] = &[
    ModelProfile {
        key: "gemini",
        name: "Gemini 2.5 Flash",
        family: ModelFamily::Gemini,
        context_limit: 1_000_000,
        description: "Free, massive context window",
    },
    ModelProfile {
        key: "opus",
        name: "Claude Opus 4.6",
        family: ModelFamily::Claude,
        context_limit: 200_000,
        description: "Deep reasoning, best for complex tasks",
    },
    ModelProfile {
        key: "sonnet",
        name: "Claude Sonnet 4",
        family: ModelFamily::Claude,
        context_limit: 200_000,
        description: "Best coding model, fast and high quality",
    },
    ModelProfile {
        key: "gpt4o",
        name: "GPT-4o",
        family: ModelFamily::Gpt,
        context_limit: 128_000,
        description: "Strong general-purpose coding model",
    },
];

pub fn get_model(key: &str) -> Option<&'static ModelProfile> {
    MODELS.iter().find(|m| m.key == key)
}

pub fn list_models() -> &'static [ModelProfile] {
    MODELS
}

/// Comma-separated model keys, for error messages and help text
pub fn model_keys() -> String {
    MODELS.iter().map(|m| m.key).collect::<Vec<_>>().join(", ")
}

/// Compact context size: `1M`, `200K`, or the plain number below a thousand
pub fn format_context(tokens: usize) -> String {
    if tokens >= 1_000_000 && tokens % 1_000_000 == 0 {
        format!("{}M", tokens / 1_000_000)
    } else if tokens >= 1_000 {
        format!("{}K", tokens / 1_000)
    } else {
        tokens.to_string()
    }
}
