use std::borrow::Cow;
use std::env;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

// Maximum size for a transcript or captured file: 32MB
const MAX_FILE_SIZE_BYTES: u64 = 32 * 1024 * 1024;

/// Name of the per-project data directory
pub const DATA_DIR_NAME: &str = ".ctxsave";

/// Validates that a file's size is within acceptable limits (32MB)
///
/// Takes an open file handle so the size check and the read happen on the same file.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read or the file is too large.
pub fn validate_file_size(file: &File, path: &Path) -> Result<u64> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(file_size)
}

/// Reads a whole file as UTF-8 (lossy), enforcing the size limit
///
/// Returns the text together with the on-disk size in bytes.
pub fn read_capped_file(path: &Path) -> Result<(String, u64)> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let size = validate_file_size(&file, path)?;

    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes).with_context(|| format!("Failed to read {}", path.display()))?;

    let text = match String::from_utf8_lossy(&bytes) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    };
    Ok((text, size))
}

/// Path of the data directory for a project root
pub fn data_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(DATA_DIR_NAME)
}

/// Errors unless `ctxsave init` has been run in `project_dir`
pub fn ensure_initialized(project_dir: &Path) -> Result<PathBuf> {
    let dir = data_dir(project_dir);
    if !dir.is_dir() {
        bail!(
            "not initialized - run 'ctxsave init' first (no {} in {})",
            DATA_DIR_NAME,
            project_dir.display()
        );
    }
    Ok(dir)
}

/// Project label derived from the directory name
pub fn project_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_dir.to_string_lossy().into_owned())
}

/// Resolves a user-supplied output path against the project directory
pub fn resolve_output_path(project_dir: &Path, out: &Path) -> PathBuf {
    if out.is_absolute() { out.to_path_buf() } else { project_dir.join(out) }
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

/// Creates the data directory if missing
pub fn create_data_dir(project_dir: &Path) -> Result<PathBuf> {
    let dir = data_dir(project_dir);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}
