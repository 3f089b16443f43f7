//! Configuration management
//!
//! Environment variables (all optional):
//! - `CORRELATION_ID_STRATEGY`: `time_ordered` (default) or `random`
//! - `CORRELATION_LOG_FORMAT`: `pretty` (default) or `json`
//! - `CORRELATION_LOG_FILTER`: tracing filter directive (default: `info`)

use serde::Deserialize;

use crate::error::Result;
use crate::id::IdStrategy;
use crate::logging::LogFormat;

const ENV_PREFIX: &str = "CORRELATION_";

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default)]
    pub id_strategy: IdStrategy,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl CorrelationConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }
}
