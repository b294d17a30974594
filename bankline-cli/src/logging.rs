//! Tracing initialization for the CLI
//!
//! Logs go to stderr so report output on stdout stays pipeable.

use tracing_subscriber::EnvFilter;

use bankline_core::config::LogSettings;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Safe to call more than once.
pub fn init(settings: &LogSettings, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json || settings.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
