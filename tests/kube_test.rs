//! ProwJob listing over HTTP against a one-shot local server.

use periscope::config::ClusterConfig;
use periscope::error::Error;
use periscope::kube::{KubeClient, KubeConnector};
use periscope::lister::{Connector, Lister};
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single HTTP response and hand back the raw request it answered.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (endpoint, handle)
}

#[test]
fn prowjobs_url_targets_the_namespace() {
    let client = KubeClient::new("https://k8s.example.com:6443/", None, None, false).unwrap();
    assert_eq!(client.endpoint(), "https://k8s.example.com:6443");
    assert_eq!(
        client.prowjobs_url("ci"),
        "https://k8s.example.com:6443/apis/prow.k8s.io/v1/namespaces/ci/prowjobs"
    );
}

#[test]
fn debug_output_redacts_the_token() {
    let client = KubeClient::new(
        "https://k8s.example.com",
        Some(SecretString::from("super-secret-token".to_string())),
        None,
        false,
    )
    .unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("super-secret-token"));
    assert!(debug.contains("REDACTED"));
}

#[tokio::test]
async fn list_sends_bearer_token_and_decodes_items() {
    let body = serde_json::json!({
        "items": [
            {
                "metadata": {"name": "n1", "uid": "uid-1", "resourceVersion": "10"},
                "spec": {"type": "periodic", "job": "ci-nightly"},
                "status": {"state": "success", "build_id": "77"}
            }
        ]
    })
    .to_string();
    let (endpoint, server) = serve_once("200 OK", body).await;

    let client = KubeClient::new(
        endpoint,
        Some(SecretString::from("t0ken".to_string())),
        None,
        false,
    )
    .unwrap();
    let resources = client.list("ci").await.unwrap();

    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].id, "uid-1");
    assert_eq!(resources[0].job.build, Some(77));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /apis/prow.k8s.io/v1/namespaces/ci/prowjobs "));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer t0ken"));
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let (endpoint, server) = serve_once("403 Forbidden", "{\"reason\":\"Forbidden\"}".to_string()).await;

    let client = KubeClient::new(endpoint, None, None, false).unwrap();
    let err = client.list("ci").await.unwrap_err();
    match err {
        Error::Api { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("Forbidden"));
        }
        other => panic!("expected api error, got {other}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn connector_reads_token_file_for_explicit_cluster() {
    let (endpoint, server) = serve_once("200 OK", "{\"items\":[]}".to_string()).await;
    let mut token = tempfile::NamedTempFile::new().unwrap();
    writeln!(token, "from-file").unwrap();

    let connector = KubeConnector::new(Some(ClusterConfig {
        endpoint,
        token_file: Some(token.path().to_path_buf()),
        ca_file: None,
        insecure_skip_tls_verify: false,
    }));
    let lister = connector.connect("ci").await.unwrap();
    assert!(lister.list("ci").await.unwrap().is_empty());

    let request = server.await.unwrap();
    assert!(request.to_ascii_lowercase().contains("authorization: bearer from-file\r\n"));
}

#[tokio::test]
async fn connector_fails_when_token_file_is_missing() {
    let connector = KubeConnector::new(Some(ClusterConfig {
        endpoint: "https://k8s.example.com".to_string(),
        token_file: Some("/nonexistent/token".into()),
        ca_file: None,
        insecure_skip_tls_verify: false,
    }));
    assert!(matches!(connector.connect("ci").await, Err(Error::Config(_))));
}
