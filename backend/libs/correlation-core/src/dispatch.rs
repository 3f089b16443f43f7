//! In-process request dispatch
//!
//! A small mediator-style pipeline: pre-processors run in registration order,
//! then the handler. `CorrelationPreProcessor` stamps the flow's correlation ID
//! onto every request that carries one, so handlers can log it without
//! touching the context themselves.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context;
use crate::id::CorrelationId;

/// A message dispatched to exactly one handler
pub trait Request: Send + 'static {
    type Response: Send;
}

/// Requests that carry a correlation ID field
pub trait Correlated {
    fn correlation_id(&self) -> Option<&CorrelationId>;
    fn set_correlation_id(&mut self, id: CorrelationId);
}

#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    type Error: Send;

    async fn handle(&self, request: R) -> Result<R::Response, Self::Error>;
}

/// Hook invoked before the handler sees the request
#[async_trait]
pub trait PreProcessor<R: Request>: Send + Sync {
    async fn process(&self, request: &mut R);
}

/// Copies `context::current()` onto the request
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationPreProcessor;

#[async_trait]
impl<R> PreProcessor<R> for CorrelationPreProcessor
where
    R: Request + Correlated,
{
    async fn process(&self, request: &mut R) {
        request.set_correlation_id(context::current());
    }
}

pub struct Pipeline<R: Request, H> {
    pre_processors: Vec<Arc<dyn PreProcessor<R>>>,
    handler: H,
}

impl<R, H> Pipeline<R, H>
where
    R: Request,
    H: Handler<R>,
{
    pub fn new(handler: H) -> Self {
        Self {
            pre_processors: Vec::new(),
            handler,
        }
    }

    pub fn with_pre_processor<P>(mut self, pre_processor: P) -> Self
    where
        P: PreProcessor<R> + 'static,
    {
        self.pre_processors.push(Arc::new(pre_processor));
        self
    }

    pub async fn send(&self, mut request: R) -> Result<R::Response, H::Error> {
        for pre_processor in &self.pre_processors {
            pre_processor.process(&mut request).await;
        }

        tracing::debug!(
            correlation_id = %context::current(),
            request = std::any::type_name::<R>(),
            "Dispatching in-process request"
        );

        self.handler.handle(request).await
    }
}

impl<R, H> Pipeline<R, H>
where
    R: Request + Correlated,
    H: Handler<R>,
{
    /// Pipeline with `CorrelationPreProcessor` already registered
    pub fn correlated(handler: H) -> Self {
        Self::new(handler).with_pre_processor(CorrelationPreProcessor)
    }
}
