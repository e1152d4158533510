//! Logging setup

use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config_file::LoggingSettings;

/// Build the filter: `RUST_LOG` wins, then the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = if settings.level.contains('=') {
            settings.level.clone()
        } else {
            format!("ac3_spdif_enc={},ac3enc={}", settings.level, settings.level)
        };
        EnvFilter::new(directive)
    })
}

/// Build the subscriber described by `settings`.
///
/// Logs go to stderr so stdout stays free for the encoded stream.
pub fn subscriber(settings: &LoggingSettings) -> Box<dyn Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(env_filter(settings));
    match settings.format.as_deref() {
        Some("json") => Box::new(
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        ),
        _ => Box::new(registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))),
    }
}

/// Initialize logging with tracing
pub fn init_logging(settings: &LoggingSettings) {
    if let Err(e) = subscriber(settings).try_init() {
        tracing::debug!("logging already initialized: {}", e);
    }
}
