//! The build record persisted for every ProwJob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single run of a CI job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,

    /// Build number. None until the job has been scheduled.
    pub build: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Results>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pulls: Vec<Pull>,

    #[serde(
        rename = "storageRefs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_refs: Option<StorageRefs>,
}

impl Job {
    /// A job with only its identity filled in.
    pub fn new(name: impl Into<String>, build: Option<i64>) -> Self {
        Self {
            name: name.into(),
            build,
            results: None,
            source: None,
            pulls: Vec::new(),
            storage_refs: None,
        }
    }
}

/// What triggered a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Periodic,
    Presubmit,
    Postsubmit,
    Batch,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobType::Periodic => "periodic",
            JobType::Presubmit => "presubmit",
            JobType::Postsubmit => "postsubmit",
            JobType::Batch => "batch",
        };
        write!(f, "{s}")
    }
}

impl FromStr for JobType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periodic" => Ok(JobType::Periodic),
            "presubmit" => Ok(JobType::Presubmit),
            "postsubmit" => Ok(JobType::Postsubmit),
            "batch" => Ok(JobType::Batch),
            other => Err(crate::error::Error::Other(format!("unknown job type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<DateTime<Utc>>,
    /// None while the job is still pending or running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(
        rename = "testResults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub test_results: Option<TestResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub succeeded: u32,
    pub skipped: u32,
    pub failed: u32,
    #[serde(
        rename = "failedTests",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub failed_tests: Vec<TestDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetail {
    pub name: String,
    /// Wall time in milliseconds.
    pub duration: u64,
    pub output: String,
    pub stderr: String,
    pub stdout: String,
}

/// The repository state a job ran against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub org: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(rename = "Sha")]
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pull {
    pub id: i64,
    #[serde(rename = "Sha")]
    pub sha: String,
}

/// Where job artifacts were uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRefs {
    #[serde(rename = "url")]
    pub base_url: String,
}
