//! The read side: where snapshots of tracked resources come from.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::TrackedResource;

/// Returns the current snapshot of resources in a namespace.
#[async_trait]
pub trait Lister: Send + Sync {
    async fn list(&self, namespace: &str) -> Result<Vec<TrackedResource>>;
}

/// Builds a [`Lister`] bound to a namespace. Called once per polling cycle.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, namespace: &str) -> Result<Arc<dyn Lister>>;
}
