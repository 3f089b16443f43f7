//! Logging middleware
//!
//! Logs HTTP request/response information using tracing. Wrap it inside
//! `CorrelationIdMiddleware` so both lines carry the request's correlation ID.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use correlation_core::context;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;

/// Middleware that logs HTTP requests and responses
#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let correlation_id = context::current();

        tracing::info!(
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            "HTTP request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let elapsed = start.elapsed();

            match &result {
                Ok(res) => tracing::info!(
                    correlation_id = %correlation_id,
                    method = %method,
                    path = %path,
                    status = %res.status().as_u16(),
                    duration_ms = elapsed.as_millis() as u64,
                    "HTTP request completed"
                ),
                Err(err) => tracing::warn!(
                    correlation_id = %correlation_id,
                    method = %method,
                    path = %path,
                    status = %err.error_response().status().as_u16(),
                    duration_ms = elapsed.as_millis() as u64,
                    "HTTP request failed"
                ),
            }

            result
        })
    }
}
