//! Correlation identifiers and the generators that mint them
//!
//! A correlation ID is treated as an opaque string everywhere in this crate.
//! Generators only promise "practically unique, non-empty, header-safe".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque per-request correlation identifier
///
/// Cloning is cheap (shared `Arc<str>`), so the value can be handed to logs,
/// in-process requests and spawned tasks freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Build an ID from a raw inbound header value.
    ///
    /// Caller-supplied values are trusted verbatim. Bytes that are not valid
    /// UTF-8 are replaced lossily; the HTTP echo path copies the original
    /// header bytes and never round-trips through this string.
    pub fn from_header_bytes(bytes: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(id: Uuid) -> Self {
        Self::new(id.to_string())
    }
}

/// Source of fresh correlation IDs
///
/// IDs must be non-empty and valid HTTP header values (visible ASCII). The
/// actix middleware cannot put any other value on the request or response, so
/// such a request gets no correlation header at all, only an error log.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> CorrelationId;
}

/// UUID v7 generator: IDs sort by creation time
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedIdGenerator;

impl IdGenerator for TimeOrderedIdGenerator {
    fn generate(&self) -> CorrelationId {
        Uuid::now_v7().into()
    }
}

/// UUID v4 generator
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> CorrelationId {
        Uuid::new_v4().into()
    }
}

/// Which generator a service should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    TimeOrdered,
    Random,
}

impl IdStrategy {
    pub fn into_generator(self) -> Arc<dyn IdGenerator> {
        match self {
            IdStrategy::TimeOrdered => Arc::new(TimeOrderedIdGenerator),
            IdStrategy::Random => Arc::new(RandomIdGenerator),
        }
    }
}
