//! Backend error types.

use thiserror::Error;

/// Errors from workload backend calls.
///
/// `NotFound` is terminal for the call that produced it; everything
/// else may succeed on a retry.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no workload found with name '{0}'")]
    NotFound(String),

    #[error("workload runtime unavailable: {0}")]
    Unavailable(String),

    #[error("runtime API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("i/o error talking to runtime socket: {0}")]
    Socket(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build runtime request: {0}")]
    Request(#[from] http::Error),

    #[error("malformed runtime response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
