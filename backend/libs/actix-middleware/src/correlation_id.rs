//! Request correlation ID middleware
//!
//! Gives every request a correlation ID and echoes it on the response.
//!
//! ## Design
//! - Each request runs inside its own correlation scope, seeded with a freshly
//!   generated ID
//! - If request has X-Correlation-ID header: trust it verbatim and make it current
//! - Otherwise: add the seeded ID to the request headers so downstream code
//!   reading headers sees it too
//! - A response-start hook copies the request's X-Correlation-ID onto the
//!   response (insert, never append), falling back to the current ID
//! - Inner service runs inside a `correlation_id` tracing span
//!
//! ## Example
//! ```rust,ignore
//! use actix_middleware::{CorrelationIdMiddleware, Logging};
//! use actix_web::App;
//!
//! let app = App::new()
//!     .wrap(Logging)
//!     .wrap(CorrelationIdMiddleware::new());
//! ```

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use correlation_core::{
    context, CorrelationConfig, CorrelationId, CorrelationProvider, IdGenerator,
    CORRELATION_ID_HEADER,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::Instrument;

use crate::on_starting::ResponseStartHooks;

fn header_name() -> HeaderName {
    HeaderName::from_static(CORRELATION_ID_HEADER)
}

/// Middleware that manages request correlation IDs
///
/// Register it with the last `.wrap(..)` call so it is the outermost layer.
///
/// When an inner service fails, the error is returned as an
/// `InternalError` carrying the already-rendered response (status, body and
/// correlation header). Message and status are unchanged, but outer code can
/// no longer downcast it to the original error type with `as_error::<T>()`.
///
/// # Panics
///
/// Panics when a request without a correlation header arrives while an outer
/// middleware still holds a clone of its `HttpRequest`: adding the header
/// needs unique access to the request head, as actix routing does.
#[derive(Clone, Debug, Default)]
pub struct CorrelationIdMiddleware {
    provider: CorrelationProvider,
}

impl CorrelationIdMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            provider: CorrelationProvider::new(generator),
        }
    }

    pub fn from_config(config: &CorrelationConfig) -> Self {
        Self {
            provider: CorrelationProvider::from_config(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorrelationIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CorrelationIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorrelationIdMiddlewareService {
            service: Rc::new(service),
            provider: self.provider.clone(),
        }))
    }
}

pub struct CorrelationIdMiddlewareService<S> {
    service: Rc<S>,
    provider: CorrelationProvider,
}

impl<S, B> Service<ServiceRequest> for CorrelationIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(self.provider.scope(handle(service, req)))
    }
}

/// Runs inside the request's correlation scope
async fn handle<S, B>(service: Rc<S>, mut req: ServiceRequest) -> Result<ServiceResponse<B>, Error>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    reconcile_inbound(&mut req);

    let hooks = ResponseStartHooks::install(&req);
    hooks.register(write_response_header)?;

    // The request itself must not be cloned before routing, so the error path
    // works from a copy of its headers.
    let request_headers = req.headers().clone();
    let span = tracing::info_span!(
        "http_request",
        correlation_id = %context::current(),
        method = %req.method(),
        path = %req.path(),
    );

    let fut = span.in_scope(|| service.call(req));
    match fut.instrument(span).await {
        Ok(mut res) => {
            let request = res.request().clone();
            hooks.run(request.headers(), res.headers_mut())?;
            Ok(res)
        }
        Err(err) => {
            let mut response = err.error_response();
            hooks.run(&request_headers, response.headers_mut())?;
            Err(InternalError::from_response(err, response).into())
        }
    }
}

/// Make the request header and the current flow agree on one ID
fn reconcile_inbound(req: &mut ServiceRequest) {
    if let Some(value) = req.headers().get(CORRELATION_ID_HEADER) {
        context::set_current(CorrelationId::from_header_bytes(value.as_bytes()));
        return;
    }

    let id = context::current();
    match HeaderValue::from_str(id.as_str()) {
        Ok(value) => {
            req.headers_mut().insert(header_name(), value);
        }
        Err(e) => {
            tracing::warn!(correlation_id = %id, "Generated correlation ID is not a valid header value: {}", e);
        }
    }
}

fn write_response_header(request_headers: &HeaderMap, response_headers: &mut HeaderMap) {
    let value = match request_headers.get(CORRELATION_ID_HEADER) {
        Some(value) => Some(value.clone()),
        None => HeaderValue::from_str(context::current().as_str()).ok(),
    };

    match value {
        Some(value) => {
            response_headers.insert(header_name(), value);
        }
        None => {
            tracing::error!(
                correlation_id = %context::current(),
                "Correlation ID could not be written to the response"
            );
        }
    }
}

/// Correlation ID for a request
///
/// ## Example
/// ```rust,ignore
/// use actix_middleware::get_correlation_id;
/// use actix_web::HttpRequest;
///
/// fn handler(req: HttpRequest) -> String {
///     let id = get_correlation_id(&req);
///     format!("Request ID: {}", id)
/// }
/// ```
pub fn get_correlation_id(req: &HttpRequest) -> CorrelationId {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .map(|value| CorrelationId::from_header_bytes(value.as_bytes()))
        .unwrap_or_else(context::current)
}

/// Correlation ID extracted in handler arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCorrelationId(pub CorrelationId);

impl FromRequest for RequestCorrelationId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(RequestCorrelationId(get_correlation_id(req))))
    }
}

/// True when the correlation middleware is wrapping this request
pub fn is_correlated(req: &HttpRequest) -> bool {
    req.extensions().get::<Rc<ResponseStartHooks>>().is_some()
}
