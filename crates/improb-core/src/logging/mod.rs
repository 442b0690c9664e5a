//! Structured logging for the engine and the `improb` binary.
//!
//! stdout carries command payloads only; every log line goes to stderr,
//! either as human-readable text or as JSON lines.
//!
//! ```ignore
//! use improb_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//! tracing::info!(run_id = %improb_core::logging::generate_run_id(), "started");
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel, ENV_LOG, ENV_LOG_FORMAT};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. A second call is a no-op.
///
/// `RUST_LOG` directives, when present, replace the level from `config`.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config.level));

    let result = match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry().with(filter).with(layer).try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_file(config.source_location)
                .with_line_number(config.source_location);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };
    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

/// Filter applied when `RUST_LOG` is unset: engine crates at `level`.
pub fn default_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::new(format!("improb_core={level},improb_math={level}"))
}

/// Initialize from the environment alone.
pub fn init_default_logging() {
    init_logging(&LogConfig::from_env(None, None));
}

/// Short correlation id attached to the top-level span of one invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}
