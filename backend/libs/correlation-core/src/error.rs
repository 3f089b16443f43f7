//! Error types for correlation-core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("invalid correlation configuration: {0}")]
    Config(#[from] envy::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, CorrelationError>;
