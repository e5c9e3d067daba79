//! Builds a pasteable context prompt from stored entries
//!
//! The budget is resolved against the target model, every level is rendered and
//! the best fit is wrapped in a short header naming the project and model.

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use super::profiles::{ModelProfile, format_context, get_model, model_keys};
use crate::compress::{Level, best_fit, estimate, summarize};
use crate::models::Entry;
use crate::store::SqliteStore;

pub const DEFAULT_MODEL: &str = "sonnet";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub model_key: String,
    /// Token budget; 0 means the model's whole context window
    pub budget: usize,
    /// Restrict to one session instead of everything captured
    pub session: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { model_key: DEFAULT_MODEL.to_string(), budget: 0, session: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPrompt {
    pub level: Level,
    /// Estimate for the chosen rendering, header excluded
    pub token_estimate: usize,
    pub text: String,
}

pub fn generate(
    store: &SqliteStore,
    project: &str,
    options: &GenerateOptions,
) -> Result<GeneratedPrompt> {
    let Some(model) = get_model(&options.model_key) else {
        bail!("unknown model '{}' (available: {})", options.model_key, model_keys());
    };
    let budget = resolve_budget(model, options.budget);

    let entries = load_entries(store, options.session.as_deref())?;
    if entries.is_empty() {
        bail!("no context captured yet - run 'ctxsave capture' first");
    }
    debug!(entries = entries.len(), budget, model = model.key, "summarizing");

    let renderings = summarize(&entries);

    if let Some(session_id) = &options.session {
        for (level, text) in renderings.iter() {
            store
                .add_summary(session_id, level, text, estimate(text, model.family))
                .with_context(|| format!("cache {} summary", level))?;
        }
    }

    let (level, body) = best_fit(&renderings, budget, model.family);
    let token_estimate = estimate(body, model.family);
    info!(%level, token_estimate, budget, "selected summary level");

    let text = format_prompt(project, model, level, token_estimate, body);
    Ok(GeneratedPrompt { level, token_estimate, text })
}

/// A zero budget means the full context window
pub fn resolve_budget(model: &ModelProfile, budget: usize) -> usize {
    if budget == 0 { model.context_limit } else { budget }
}

fn load_entries(store: &SqliteStore, session: Option<&str>) -> Result<Vec<Entry>> {
    match session {
        Some(id) => {
            if store.get_session(id)?.is_none() {
                bail!("session not found: {}", id);
            }
            store.get_entries(id)
        }
        None => store.get_all_entries(0),
    }
}

fn format_prompt(
    project: &str,
    model: &ModelProfile,
    level: Level,
    tokens: usize,
    body: &str,
) -> String {
    format!(
        "# Project Context: {project}\n\n\
         Target model: {} ({} context) | Level: {level} | ~{tokens} tokens\n\n\
         ---\n\n\
         {}\n",
        model.name,
        format_context(model.context_limit),
        body.trim_end()
    )
}
