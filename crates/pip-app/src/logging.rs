//! Tracing setup.

use pip_config::schema::LogLevel;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: CLI flag, then `RUST_LOG`, then config.
pub fn filter_directive(cli: Option<&str>, env: Option<&str>, config: LogLevel) -> String {
    cli.or(env)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| config.directive().to_string())
}

/// Install the global subscriber. Logs go to stderr so console output on
/// stdout stays readable.
pub fn init(cli: Option<&str>, config: LogLevel) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(cli, env.as_deref(), config);

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter {directive:?} ({e}), falling back to config level");
        EnvFilter::new(config.directive())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_wins() {
        assert_eq!(
            filter_directive(Some("pip=trace"), Some("warn"), LogLevel::Error),
            "pip=trace"
        );
    }

    #[test]
    fn env_beats_config() {
        assert_eq!(filter_directive(None, Some("warn"), LogLevel::Debug), "warn");
    }

    #[test]
    fn config_is_the_fallback() {
        assert_eq!(filter_directive(None, None, LogLevel::Debug), "pip=debug");
        assert_eq!(filter_directive(None, Some("  "), LogLevel::Info), "pip=info");
    }
}
