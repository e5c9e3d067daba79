//! Copying generated prompts to the system clipboard

use anyhow::{Context, Result, bail};
use arboard::Clipboard;
use tracing::debug;

/// Largest prompt we hand to the clipboard (10MB)
const MAX_PROMPT_BYTES: usize = 10 * 1024 * 1024;

/// Clipboard backend, swapped for a fake in tests
trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text).context("Failed to set clipboard contents")
    }
}

fn validate_prompt(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Cannot copy an empty prompt to the clipboard");
    }
    if text.len() > MAX_PROMPT_BYTES {
        bail!("Prompt too large for clipboard ({} bytes, max {})", text.len(), MAX_PROMPT_BYTES);
    }
    Ok(())
}

fn copy_with_provider(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_prompt(text)?;
    provider.set_text(text)?;
    debug!(bytes = text.len(), "copied prompt to clipboard");
    Ok(())
}

/// Copies a generated prompt to the system clipboard
///
/// # Errors
///
/// Fails for blank or oversized prompts, and when no clipboard is available
/// (headless sessions, missing X11/Wayland).
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    validate_prompt(text)?;
    let mut clipboard = SystemClipboard::new()?;
    copy_with_provider(text, &mut clipboard)
}
