//! # Actix Middleware Library
//!
//! Correlation ID middleware components for Nova Actix services
//!
//! ## Modules
//! - `correlation_id`: reads or seeds the request's correlation ID and echoes it on the response
//! - `on_starting`: per-response hooks fired just before the response leaves the middleware stack
//! - `logging`: request/response logging tagged with the correlation ID

pub mod correlation_id;
pub mod logging;
pub mod on_starting;

pub use correlation_id::{
    get_correlation_id, is_correlated, CorrelationIdMiddleware, CorrelationIdMiddlewareService,
    RequestCorrelationId,
};
pub use logging::Logging;
pub use on_starting::{on_starting, HookError, ResponseStartHooks};
