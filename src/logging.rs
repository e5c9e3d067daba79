//! Tracing subscriber setup for the command-line binary

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable that overrides the command-line log flags
pub const LOG_ENV_VAR: &str = "CTXSAVE_LOG";

/// Filter directive for the given flags
///
/// A bare level such as `info` is scoped to this crate; anything containing `=`
/// is passed through untouched.
pub fn filter_directive(verbose: bool, log_level: Option<&str>) -> String {
    match (verbose, log_level) {
        (_, Some(level)) if level.contains('=') => level.to_string(),
        (_, Some(level)) => format!("ctxsave={}", level),
        (true, None) => "ctxsave=debug".to_string(),
        (false, None) => "ctxsave=warn".to_string(),
    }
}

/// Installs a compact stderr subscriber
///
/// `CTXSAVE_LOG`, then `RUST_LOG`, take precedence over the flags.
pub fn init_tracing(verbose: bool, log_level: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(filter_directive(verbose, log_level)))
        .map_err(|e| anyhow!("invalid log filter: {}", e))?;

    let stderr_layer =
        fmt::layer().compact().with_target(false).with_writer(std::io::stderr).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(false, None), "ctxsave=warn");
        assert_eq!(filter_directive(true, None), "ctxsave=debug");
        assert_eq!(filter_directive(true, Some("trace")), "ctxsave=trace");
        assert_eq!(
            filter_directive(false, Some("ctxsave=info,rusqlite=warn")),
            "ctxsave=info,rusqlite=warn"
        );
    }
}
