//! Structured logging configuration.
//!
//! The client itself only emits `tracing` events; an application decides
//! where they go. [`init_logging`] installs a global subscriber with either
//! pretty text or JSON output, filtered by `RUST_LOG` when set.
//!
//! # Usage
//!
//! ```ignore
//! use netmodel_client::config::ClientConfig;
//! use netmodel_client::observability::{init_logging, LoggingConfig};
//!
//! let config = ClientConfig::from_env()?;
//! init_logging(LoggingConfig::from(&config.logging));
//! ```

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Output format and fallback level for [`init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub json_format: bool,
    /// Used when `RUST_LOG` is unset or unparsable.
    pub default_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from(&LoggingSettings::default())
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            json_format: settings.json,
            default_level: parse_log_level(&settings.level),
        }
    }
}

/// Parses a validated level name; unknown names fall back to INFO.
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
}

/// Installs the global subscriber.
///
/// Only the first call takes effect; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    let output = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().compact().with_target(true).boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(config.default_level))
        .with(output);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

/// Builds a JSON subscriber writing to `writer`, for capturing logs in tests.
pub fn create_json_layer<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(EnvFilter::new("trace"))
        .with(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_current_span(true),
        )
}
