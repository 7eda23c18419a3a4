//! The write side: durable storage for build records.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::TrackedResource;

/// Durably records a resource.
///
/// Implementations must be idempotent: persisting the same build twice
/// leaves the store as if it had been persisted once.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn persist(&self, resource: &TrackedResource) -> Result<()>;
}
