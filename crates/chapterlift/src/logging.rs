//! Logging initialization.
//!
//! Logs go to stderr; stdout carries the JSON batch result.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive for the given level settings.
///
/// `RUST_LOG` wins over this when set.
fn default_directive(verbose: bool, configured_level: &str) -> String {
    if verbose {
        return "debug".to_string();
    }
    match configured_level {
        "error" | "warn" | "info" | "debug" | "trace" => configured_level.to_string(),
        _ => "info".to_string(),
    }
}

/// Initialize the global subscriber.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from `[logging]`, with CLI flags taking precedence.
pub fn init_from_config(
    config: &chapterlift_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = default_directive(verbose_override, &config.logging.level);
    let json_format = json_logs_override || config.logging.format == "json";
    init(&level, json_format);
}
