use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Get the user's home directory
///
/// `HOME` wins when set so tests and wrappers can redirect transcript discovery;
/// otherwise the platform lookup from `dirs` is used.
pub fn get_home_dir() -> Result<PathBuf> {
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => dirs::home_dir().context("Could not determine home directory (HOME not set)"),
    }
}
