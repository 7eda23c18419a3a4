//! Core data model.
//!
//! A tracked resource is one ProwJob as observed in a single listing: its
//! stable UID, the resourceVersion it was observed at, and the build record
//! derived from it.

pub mod job;
pub mod prowjob;

use serde::{Deserialize, Serialize};

pub use job::{Job, JobType, Pull, Results, Source, StorageRefs, TestDetail, TestResults};

/// A resource observed in one snapshot of the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedResource {
    /// Stable across observations (the Kubernetes UID).
    pub id: String,

    /// Changes whenever the resource's state changes.
    pub version: String,

    pub job: Job,
}

impl TrackedResource {
    pub fn new(id: impl Into<String>, version: impl Into<String>, job: Job) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            job,
        }
    }
}
