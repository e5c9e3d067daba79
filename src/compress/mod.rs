//! Token estimation and multi-level summarization.

pub mod code;
pub mod summarizer;
pub mod tokens;

pub use code::{CodeRule, looks_like_code};
pub use summarizer::{Level, Renderings, best_fit, summarize};
pub use tokens::{ModelFamily, estimate};
