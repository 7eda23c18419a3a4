//! # periscope
//!
//! Polls ProwJobs from a Kubernetes namespace and records every build in
//! Postgres.
//!
//! Each cycle lists the namespace, drops jobs already synced at their
//! current resourceVersion, and persists the rest on a bounded pool of
//! workers. Failures are collected per job and reported for the cycle.

pub mod cache;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod kube;
pub mod lister;
pub mod model;
pub mod sink;
pub mod telemetry;
