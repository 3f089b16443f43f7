//! Tracing subscriber setup
//!
//! Request logs carry a `correlation_id` field; the middleware opens a span
//! with it, so every event inside a request inherits the value.

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CorrelationConfig;
use crate::error::{CorrelationError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.log_filter`.
pub fn init_tracing(config: &CorrelationConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|e| CorrelationError::Logging(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init(),
    };
    result.map_err(|e| CorrelationError::Logging(e.to_string()))?;

    tracing::info!(
        id_strategy = ?config.id_strategy,
        log_format = ?config.log_format,
        "Correlation tracing initialized"
    );
    Ok(())
}
