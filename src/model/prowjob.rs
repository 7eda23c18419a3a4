//! Wire shape of the `prow.k8s.io/v1` ProwJob list endpoint.
//!
//! Only the fields the build record needs are decoded; everything else in
//! the custom resource is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::job::{Job, JobType, Pull, Results, Source, StorageRefs};
use super::TrackedResource;

#[derive(Debug, Clone, Deserialize)]
pub struct ProwJobList {
    #[serde(default)]
    pub items: Vec<ProwJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProwJob {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ProwJobSpec,
    #[serde(default)]
    pub status: ProwJobStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub uid: String,
    pub resource_version: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProwJobSpec {
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub refs: Option<Refs>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Refs {
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub base_ref: String,
    #[serde(default)]
    pub base_sha: String,
    #[serde(default)]
    pub pulls: Vec<RefsPull>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefsPull {
    pub number: i64,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProwJobStatus {
    pub start_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub state: Option<String>,
    #[serde(rename = "build_id")]
    pub build_id: Option<String>,
    pub url: Option<String>,
}

impl ProwJobStatus {
    /// Terminal outcome, if the job has reached one.
    fn success(&self) -> Option<bool> {
        match self.state.as_deref() {
            Some("success") => Some(true),
            Some("failure" | "error" | "aborted") => Some(false),
            _ => None,
        }
    }
}

impl From<ProwJob> for TrackedResource {
    fn from(pj: ProwJob) -> Self {
        let name = if pj.spec.job.is_empty() {
            pj.metadata.name.clone()
        } else {
            pj.spec.job.clone()
        };

        let build = pj
            .status
            .build_id
            .as_deref()
            .and_then(|id| id.parse::<i64>().ok());

        // Unknown job types still get a build row, just without results.
        let results = pj
            .spec
            .job_type
            .as_deref()
            .and_then(|t| t.parse::<JobType>().ok())
            .map(|job_type| Results {
                job_type,
                start: pj.status.start_time,
                finish: pj.status.completion_time,
                success: pj.status.success(),
                test_results: None,
            });

        let (source, pulls) = match pj.spec.refs {
            Some(refs) => {
                let pulls = refs
                    .pulls
                    .into_iter()
                    .map(|p| Pull {
                        id: p.number,
                        sha: p.sha,
                    })
                    .collect();
                let source = Source {
                    org: refs.org,
                    repo: refs.repo,
                    git_ref: refs.base_ref,
                    sha: refs.base_sha,
                };
                (Some(source), pulls)
            }
            None => (None, Vec::new()),
        };

        let job = Job {
            name,
            build,
            results,
            source,
            pulls,
            storage_refs: pj.status.url.map(|base_url| StorageRefs { base_url }),
        };

        TrackedResource::new(pj.metadata.uid, pj.metadata.resource_version, job)
    }
}

impl ProwJobList {
    /// Convert the listing into tracked resources, preserving API order.
    pub fn into_resources(self) -> Vec<TrackedResource> {
        self.items.into_iter().map(TrackedResource::from).collect()
    }
}
