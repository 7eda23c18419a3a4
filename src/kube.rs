//! ProwJob listing against the Kubernetes API.
//!
//! Talks plain REST to the `prow.k8s.io/v1` custom resource endpoint.
//! Connection parameters either come from the poll config or, when none
//! are given, from the pod's service account.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::config::secrets::read_token_file;
use crate::error::{Error, Result};
use crate::lister::{Connector, Lister};
use crate::model::TrackedResource;
use crate::model::prowjob::ProwJobList;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Builds a fresh [`KubeClient`] for every cycle so rotated service
/// account tokens are picked up without a restart.
#[derive(Debug, Clone, Default)]
pub struct KubeConnector {
    cluster: Option<ClusterConfig>,
}

impl KubeConnector {
    /// `None` selects the in-cluster service account.
    pub fn new(cluster: Option<ClusterConfig>) -> Self {
        Self { cluster }
    }
}

#[async_trait]
impl Connector for KubeConnector {
    async fn connect(&self, namespace: &str) -> Result<Arc<dyn Lister>> {
        let client = match self.cluster {
            Some(ref cluster) => KubeClient::from_cluster(cluster)?,
            None => KubeClient::in_cluster()?,
        };
        info!(namespace, endpoint = %client.endpoint, "created a k8s client");
        Ok(Arc::new(client))
    }
}

/// Minimal client for the ProwJob list endpoint.
pub struct KubeClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
}

impl std::fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClient")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl KubeClient {
    /// Create a client for `endpoint`, optionally trusting an extra CA bundle.
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<SecretString>,
        ca_pem: Option<&[u8]>,
        insecure_skip_tls_verify: bool,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(pem) = ca_pem {
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(pem)?);
        }
        if insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Client for an explicitly configured cluster.
    pub fn from_cluster(cluster: &ClusterConfig) -> Result<Self> {
        let token = cluster
            .token_file
            .as_deref()
            .map(read_token_file)
            .transpose()?;
        let ca = cluster.ca_file.as_deref().map(read_ca).transpose()?;
        Self::new(
            cluster.endpoint.clone(),
            token,
            ca.as_deref(),
            cluster.insecure_skip_tls_verify,
        )
    }

    /// Client for the cluster this process runs in.
    pub fn in_cluster() -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            Error::Config("KUBERNETES_SERVICE_HOST is not set; not running in a cluster".to_string())
        })?;
        let port =
            std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());
        let host = if host.contains(':') {
            format!("[{host}]")
        } else {
            host
        };

        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        let token = read_token_file(&dir.join("token"))?;
        let ca = read_ca(&dir.join("ca.crt"))?;
        Self::new(format!("https://{host}:{port}"), Some(token), Some(ca.as_slice()), false)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Collection URL for ProwJobs in `namespace`.
    pub fn prowjobs_url(&self, namespace: &str) -> String {
        format!(
            "{}/apis/prow.k8s.io/v1/namespaces/{namespace}/prowjobs",
            self.endpoint
        )
    }
}

#[async_trait]
impl Lister for KubeClient {
    async fn list(&self, namespace: &str) -> Result<Vec<TrackedResource>> {
        let url = self.prowjobs_url(namespace);
        let mut request = self.http.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let list: ProwJobList = response.json().await?;
        debug!(namespace, count = list.items.len(), "listed prowjobs");
        Ok(list.into_resources())
    }
}

fn read_ca(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| Error::Config(format!("could not read CA bundle {}: {e}", path.display())))
}
