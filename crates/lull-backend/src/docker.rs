//! Docker Engine API backend.
//!
//! Talks to the daemon over its unix socket, one http1 connection per
//! request. The container lookup is deliberately uncached: containers
//! are created and removed outside this process, so every call
//! re-resolves the name against the live container list.

use std::path::PathBuf;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::StatusCode;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::UnixStream;
use tracing::debug;

use crate::backend::{WorkloadBackend, WorkloadHandle};
use crate::error::{BackendError, BackendResult};

const API_VERSION: &str = "v1.43";

/// Workload backend over the Docker Engine HTTP API.
pub struct DockerBackend {
    socket: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ContainerSummary {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Names")]
    names: Vec<String>,
}

#[derive(Deserialize)]
struct ContainerInspect {
    #[serde(rename = "State")]
    state: ContainerState,
}

#[derive(Deserialize)]
struct ContainerState {
    #[serde(rename = "Status")]
    status: String,
}

impl DockerBackend {
    /// Connect to the Docker daemon and verify it responds.
    ///
    /// A daemon that cannot be reached at construction time is fatal
    /// for the caller; there is no partial operation mode.
    pub async fn connect(socket: impl Into<PathBuf>) -> BackendResult<Self> {
        let backend = Self {
            socket: socket.into(),
        };
        let (status, _) = backend
            .request(hyper::Method::GET, "/_ping")
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(BackendError::Unavailable(format!(
                "docker daemon ping returned {status}"
            )));
        }
        Ok(backend)
    }

    /// Issue one request over a fresh socket connection.
    async fn request(
        &self,
        method: hyper::Method,
        path: &str,
    ) -> BackendResult<(StatusCode, Bytes)> {
        let stream = UnixStream::connect(&self.socket).await?;
        let io = TokioIo::new(stream);
        let (mut sender, conn) = http1::handshake(io).await?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "docker connection closed with error");
            }
        });

        let req = http::Request::builder()
            .method(method)
            .uri(format!("/{API_VERSION}{path}"))
            .header("host", "docker")
            .body(Empty::<Bytes>::new())?;

        let resp = sender.send_request(req).await?;
        let status = resp.status();
        let body = resp.into_body().collect().await?.to_bytes();
        Ok((status, body))
    }

    async fn mutate(&self, verb: &str, handle: &WorkloadHandle) -> BackendResult<()> {
        let path = format!("/containers/{}/{verb}", handle.id);
        let (status, body) = self.request(hyper::Method::POST, &path).await?;
        // 304 means the container was already in the requested state.
        if status.is_success() || status == StatusCode::NOT_MODIFIED {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(handle.name.clone()));
        }
        Err(api_error(status, &body))
    }
}

#[async_trait::async_trait]
impl WorkloadBackend for DockerBackend {
    async fn locate(&self, name: &str) -> BackendResult<WorkloadHandle> {
        let (status, body) = self
            .request(hyper::Method::GET, "/containers/json?all=true")
            .await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        let containers: Vec<ContainerSummary> = serde_json::from_slice(&body)?;
        match find_by_name(&containers, name) {
            Some(c) => Ok(WorkloadHandle {
                id: c.id.clone(),
                name: name.to_string(),
            }),
            None => Err(BackendError::NotFound(name.to_string())),
        }
    }

    async fn query_state(&self, handle: &WorkloadHandle) -> BackendResult<String> {
        let path = format!("/containers/{}/json", handle.id);
        let (status, body) = self.request(hyper::Method::GET, &path).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(handle.name.clone()));
        }
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        let inspect: ContainerInspect = serde_json::from_slice(&body)?;
        Ok(inspect.state.status)
    }

    async fn start(&self, handle: &WorkloadHandle) -> BackendResult<()> {
        self.mutate("start", handle).await
    }

    async fn stop(&self, handle: &WorkloadHandle) -> BackendResult<()> {
        self.mutate("stop", handle).await
    }
}

/// Match a workload name against the daemon's naming convention: the
/// first entry of a container's name list, prefixed with a slash.
fn find_by_name<'a>(
    containers: &'a [ContainerSummary],
    name: &str,
) -> Option<&'a ContainerSummary> {
    let wanted = format!("/{name}");
    containers
        .iter()
        .find(|c| c.names.first().is_some_and(|n| n == &wanted))
}

fn api_error(status: StatusCode, body: &[u8]) -> BackendError {
    #[derive(Deserialize)]
    struct ApiMessage {
        message: String,
    }
    let message = serde_json::from_slice::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries() -> Vec<ContainerSummary> {
        serde_json::from_str(
            r#"[
                {"Id": "aaa111", "Names": ["/web"], "State": "running"},
                {"Id": "bbb222", "Names": ["/web-db", "/alias"], "State": "exited"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn find_by_name_matches_exact_slash_prefixed_name() {
        let containers = summaries();
        let found = find_by_name(&containers, "web").unwrap();
        assert_eq!(found.id, "aaa111");
    }

    #[test]
    fn find_by_name_does_not_match_prefix_or_alias() {
        let containers = summaries();
        assert!(find_by_name(&containers, "we").is_none());
        // Only the first name entry is consulted.
        assert!(find_by_name(&containers, "alias").is_none());
    }

    #[test]
    fn inspect_state_decodes() {
        let body = r#"{"Id": "aaa111", "State": {"Status": "running", "Running": true}}"#;
        let inspect: ContainerInspect = serde_json::from_str(body).unwrap();
        assert_eq!(inspect.state.status, "running");
    }

    #[test]
    fn api_error_prefers_structured_message() {
        let err = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"message": "container already started"}"#,
        );
        assert!(err.to_string().contains("container already started"));
        assert!(err.is_transient());
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"upstream broke");
        assert!(err.to_string().contains("upstream broke"));
    }

    #[test]
    fn not_found_is_not_transient() {
        assert!(!BackendError::NotFound("web".to_string()).is_transient());
    }
}
