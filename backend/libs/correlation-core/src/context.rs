//! Request-scoped correlation ID context
//!
//! Holds "the current correlation ID" for one logical request flow.
//!
//! ## Design
//! - Storage is a tokio task-local, so the value travels with the future
//!   (across `.await` points and worker threads) rather than with an OS thread
//! - Every request runs inside its own `scope`; concurrent requests never share
//!   a cell, so no locking is involved
//! - `propagate`/`spawn` copy the value into child flows (clone-on-fork); a
//!   later `set_current` on either side is invisible to the other
//!
//! ## Architecture
//! ```text
//! HTTP request
//!   ↓ CorrelationIdMiddleware: provider.scope(..) seeds a fresh ID
//!   ↓ X-Correlation-ID present? set_current(header value)
//! Handler / in-process dispatch
//!   ↓ current() anywhere in the call tree
//! Response-start hook writes X-Correlation-ID back
//! ```

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::CorrelationConfig;
use crate::id::{CorrelationId, IdGenerator, TimeOrderedIdGenerator};

/// HTTP header carrying the correlation ID on both request and response
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

tokio::task_local! {
    static CURRENT: RefCell<CorrelationId>;
}

/// ID reported by code running outside any request flow (startup, background jobs)
static BACKGROUND_ID: Lazy<CorrelationId> = Lazy::new(|| TimeOrderedIdGenerator.generate());

/// Seeds a fresh correlation ID for every flow it opens
#[derive(Clone)]
pub struct CorrelationProvider {
    generator: Arc<dyn IdGenerator>,
}

impl CorrelationProvider {
    pub fn new(generator: Arc<dyn IdGenerator>) -> Self {
        Self { generator }
    }

    pub fn from_config(config: &CorrelationConfig) -> Self {
        Self::new(config.id_strategy.into_generator())
    }

    /// Mint a new ID without opening a flow
    pub fn generate(&self) -> CorrelationId {
        self.generator.generate()
    }

    /// Run `fut` as a new flow seeded with a freshly generated ID
    pub fn scope<F: Future>(&self, fut: F) -> impl Future<Output = F::Output> {
        scope(self.generate(), fut)
    }
}

impl Default for CorrelationProvider {
    fn default() -> Self {
        Self::new(Arc::new(TimeOrderedIdGenerator))
    }
}

impl fmt::Debug for CorrelationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationProvider").finish_non_exhaustive()
    }
}

/// Run `fut` as a new flow whose correlation ID starts as `id`
pub fn scope<F: Future>(id: CorrelationId, fut: F) -> impl Future<Output = F::Output> {
    CURRENT.scope(RefCell::new(id), fut)
}

/// Correlation ID of the calling flow
///
/// Outside any flow this returns the process-wide background ID.
pub fn current() -> CorrelationId {
    try_current().unwrap_or_else(|| BACKGROUND_ID.clone())
}

/// Correlation ID of the calling flow, `None` outside any flow
pub fn try_current() -> Option<CorrelationId> {
    CURRENT.try_with(|cell| cell.borrow().clone()).ok()
}

/// Rebind the calling flow's correlation ID
///
/// Only reads made after this call inside the same flow observe the new value.
/// Outside any flow the call has no effect.
pub fn set_current(id: CorrelationId) {
    let result = CURRENT.try_with(|cell| {
        *cell.borrow_mut() = id;
    });
    if result.is_err() {
        tracing::debug!("set_current called outside a correlation scope; ignored");
    }
}

/// Run `fut` in a child flow seeded with the caller's current ID
pub fn propagate<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    scope(current(), fut)
}

/// `tokio::spawn` that carries the caller's correlation ID into the new task
pub fn spawn<F>(fut: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(propagate(fut))
}
