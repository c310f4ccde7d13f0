//! Controller error types.

use lull_backend::BackendError;
use thiserror::Error;

/// Errors surfaced to the caller of a touch.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no workload found with name '{0}'")]
    WorkloadNotFound(String),

    #[error("state of workload '{name}' unknown after {attempts} status attempts")]
    UnknownState { name: String, attempts: u32 },

    #[error("failed to start workload '{name}': {source}")]
    StartFailed {
        name: String,
        #[source]
        source: BackendError,
    },
}

pub type ControllerResult<T> = Result<T, ControllerError>;
