//! Build records: idempotent insert from the poller, listing for operators.
//!
//! Expected table:
//!
//! ```sql
//! CREATE TABLE builds (
//!     job         TEXT        NOT NULL,
//!     build       BIGINT      NOT NULL,
//!     job_type    TEXT,
//!     started_at  TIMESTAMPTZ,
//!     finished_at TIMESTAMPTZ,
//!     success     BOOLEAN,
//!     payload     JSONB       NOT NULL,
//!     recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     PRIMARY KEY (job, build)
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::TrackedResource;
use crate::sink::Sink;
use crate::telemetry::metrics;

/// One row of the `builds` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BuildRecord {
    pub job: String,
    pub build: i64,
    pub job_type: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub success: Option<bool>,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
impl Sink for super::Db {
    /// Insert the build, ignoring it if (job, build) is already recorded.
    ///
    /// Jobs that have not been scheduled yet carry no build number and are
    /// skipped; their resourceVersion changes once they are scheduled.
    async fn persist(&self, resource: &TrackedResource) -> Result<()> {
        let job = &resource.job;
        let Some(build) = job.build else {
            debug!(id = %resource.id, job = %job.name, "no build number yet, skipping");
            return Ok(());
        };

        let results = job.results.as_ref();
        let payload = serde_json::to_value(job)?;

        let rows_affected = sqlx::query(
            "INSERT INTO builds (job, build, job_type, started_at, finished_at, success, payload)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT DO NOTHING",
        )
        .bind(&job.name)
        .bind(build)
        .bind(results.map(|r| r.job_type.to_string()))
        .bind(results.and_then(|r| r.start))
        .bind(results.and_then(|r| r.finish))
        .bind(results.and_then(|r| r.success))
        .bind(&payload)
        .execute(self.pool())
        .await?
        .rows_affected();

        metrics::builds_persisted().add(
            1,
            &[KeyValue::new(
                "result",
                if rows_affected > 0 { "inserted" } else { "duplicate" },
            )],
        );
        info!(id = %resource.id, job = %job.name, build, "synced prowjob");
        Ok(())
    }
}

impl super::Db {
    /// Most recently recorded builds, optionally for a single job.
    pub async fn list_builds(&self, job: Option<&str>, limit: i64) -> Result<Vec<BuildRecord>> {
        let rows: Vec<BuildRecord> = sqlx::query_as(
            "SELECT job, build, job_type, started_at, finished_at, success, recorded_at
             FROM builds
             WHERE ($1::text IS NULL OR job = $1)
             ORDER BY recorded_at DESC, build DESC
             LIMIT $2",
        )
        .bind(job)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
