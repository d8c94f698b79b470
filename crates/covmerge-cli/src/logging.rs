//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter (e.g. `covmerge=debug`)
pub const LOG_ENV: &str = "COVMERGE_LOG";

/// Default filter directive for the given quietness
#[must_use]
pub const fn default_directive(quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `COVMERGE_LOG` takes precedence over the default level. Calling this twice
/// is harmless.
pub fn init_logging(quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "error");
    }

    #[test]
    fn test_init_twice() {
        init_logging(true, false);
        init_logging(false, false);
        // No panic = success
    }
}
