//! Prompt generation for a target model.

pub mod profiles;
pub mod prompt;

pub use profiles::{MODELS, ModelProfile, format_context, get_model, list_models};
pub use prompt::{GenerateOptions, GeneratedPrompt, generate};
