//! # Correlation Core
//!
//! Request correlation IDs for Nova services, independent of any web framework.
//!
//! ## Modules
//! - `id`: `CorrelationId` and the generators that mint it
//! - `context`: task-local holder for the current request's ID
//! - `dispatch`: in-process request pipeline and `CorrelationPreProcessor`
//! - `config`: environment-driven configuration
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod logging;

pub use config::CorrelationConfig;
pub use context::{
    current, propagate, scope, set_current, spawn, try_current, CorrelationProvider,
    CORRELATION_ID_HEADER,
};
pub use dispatch::{Correlated, CorrelationPreProcessor, Handler, Pipeline, PreProcessor, Request};
pub use error::{CorrelationError, Result};
pub use id::{CorrelationId, IdGenerator, IdStrategy, RandomIdGenerator, TimeOrderedIdGenerator};
pub use logging::{init_tracing, LogFormat};
