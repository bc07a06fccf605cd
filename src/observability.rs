//! Logging setup.
//!
//! Logs go to stderr so stdout stays a clean JSON-lines stream of notices
//! and events. `RUST_LOG` overrides the configured level.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable, multi-line.
    #[default]
    Pretty,
    /// Single-line text.
    Compact,
}

/// Initialize the global subscriber. Later calls are no-ops.
///
/// `default_level` is an `EnvFilter` directive (e.g. `info`,
/// `council=debug`) used when `RUST_LOG` is unset or invalid.
pub fn init_logging(format: LogFormat, default_level: &str) {
    let default_level = default_level.to_string();
    INIT.call_once(move || {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let registry = tracing_subscriber::registry().with(env_filter);
        // A subscriber installed elsewhere (e.g. by a test harness) wins.
        let _ = match format {
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init(),
        };
    });
}

/// Span wrapping one `council run` session.
#[must_use]
pub fn session_span(snapshot: Option<&str>, controllers: usize) -> Span {
    tracing::info_span!("session", snapshot = snapshot, controllers = controllers)
}
