//! Polling configuration file.
//!
//! ```toml
//! [prow]
//! namespace = "ci"
//! workers = 20
//! interval_secs = 30
//! call_timeout_secs = 60
//! mark_seen = "on_success"
//!
//! [prow.cluster]
//! endpoint = "https://k8s.example.com:6443"
//! token_file = "/etc/periscope/token"
//! ca_file = "/etc/periscope/ca.crt"
//! ```
//!
//! Without a `[prow.cluster]` table the in-cluster service account is used.

use crate::engine::dispatch::DEFAULT_WORKERS;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level TOML wrapper. Each table is one polling driver.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    pub prow: Option<ProwConfig>,
}

/// Options for polling ProwJobs in one namespace.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProwConfig {
    pub namespace: String,
    pub cluster: Option<ClusterConfig>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound on each list and persist call. None waits forever.
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
    #[serde(default)]
    pub mark_seen: MarkPolicy,
}

/// Connection parameters for a cluster other than the one we run in.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    pub endpoint: String,
    pub token_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

/// When a resource is recorded in the version cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkPolicy {
    /// After its build record was persisted without error.
    #[default]
    OnSuccess,
    /// Never; every listed resource is re-synced on every cycle.
    Never,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_interval_secs() -> u64 {
    30
}

impl PollConfig {
    /// Read, parse, and validate a polling configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "could not read polling configuration {}: {e}",
                path.display()
            ))
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: PollConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("could not parse polling configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref prow) = self.prow {
            prow.validate()?;
        }
        Ok(())
    }
}

impl ProwConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            cluster: None,
            workers: DEFAULT_WORKERS,
            interval_secs: default_interval_secs(),
            call_timeout_secs: None,
            mark_seen: MarkPolicy::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(Error::Config("prow.namespace must not be empty".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::Config("prow.workers must be at least 1".to_string()));
        }
        if self.interval_secs == 0 {
            return Err(Error::Config(
                "prow.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.call_timeout_secs == Some(0) {
            return Err(Error::Config(
                "prow.call_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(ref cluster) = self.cluster {
            if cluster.endpoint.trim().is_empty() {
                return Err(Error::Config(
                    "prow.cluster.endpoint must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
