//! Response-start hooks
//!
//! Actix has no "response is about to start" callback, so the correlation
//! middleware owns one: a per-request list of header writers that fire exactly
//! once, after the inner service produced a response and before it is handed
//! back to the server for transmission.
//!
//! Hooks receive the originating request's headers explicitly instead of
//! looking anything up ambiently.
//!
//! ## Example
//! ```rust,ignore
//! use actix_middleware::on_starting;
//!
//! async fn handler(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
//!     on_starting(&req, |_request_headers, response_headers| {
//!         response_headers.insert(HeaderName::from_static("x-served-by"), HeaderValue::from_static("nova"));
//!     })?;
//!     Ok(HttpResponse::Ok().finish())
//! }
//! ```

use actix_web::{dev::ServiceRequest, http::header::HeaderMap, HttpMessage, HttpRequest, ResponseError};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

type Hook = Box<dyn FnOnce(&HeaderMap, &mut HeaderMap)>;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("response has already started")]
    ResponseAlreadyStarted,

    #[error("no response-start hooks installed for this request")]
    NotInstalled,
}

/// Late registration means a header would silently go missing; surface as 500.
impl ResponseError for HookError {}

/// Hook list owned by one in-flight response
pub struct ResponseStartHooks {
    // `None` once the hooks have fired
    hooks: RefCell<Option<Vec<Hook>>>,
}

impl ResponseStartHooks {
    pub fn new() -> Self {
        Self {
            hooks: RefCell::new(Some(Vec::new())),
        }
    }

    /// Attach a fresh hook list to the request's extensions
    pub fn install(req: &ServiceRequest) -> Rc<Self> {
        let hooks = Rc::new(Self::new());
        req.extensions_mut().insert(Rc::clone(&hooks));
        hooks
    }

    pub fn register<F>(&self, hook: F) -> Result<(), HookError>
    where
        F: FnOnce(&HeaderMap, &mut HeaderMap) + 'static,
    {
        match self.hooks.borrow_mut().as_mut() {
            Some(hooks) => {
                hooks.push(Box::new(hook));
                Ok(())
            }
            None => Err(HookError::ResponseAlreadyStarted),
        }
    }

    pub fn has_started(&self) -> bool {
        self.hooks.borrow().is_none()
    }

    /// Fire every hook once, last registered first
    ///
    /// Returns the number of hooks run. A second call fails with
    /// `ResponseAlreadyStarted`.
    pub fn run(
        &self,
        request_headers: &HeaderMap,
        response_headers: &mut HeaderMap,
    ) -> Result<usize, HookError> {
        let hooks = self
            .hooks
            .borrow_mut()
            .take()
            .ok_or(HookError::ResponseAlreadyStarted)?;

        let count = hooks.len();
        for hook in hooks.into_iter().rev() {
            hook(request_headers, response_headers);
        }
        Ok(count)
    }
}

impl Default for ResponseStartHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// Register a hook for the response to `req`
pub fn on_starting<F>(req: &HttpRequest, hook: F) -> Result<(), HookError>
where
    F: FnOnce(&HeaderMap, &mut HeaderMap) + 'static,
{
    let hooks = req
        .extensions()
        .get::<Rc<ResponseStartHooks>>()
        .cloned()
        .ok_or(HookError::NotInstalled)?;
    hooks.register(hook)
}
