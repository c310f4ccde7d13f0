//! Workload backend capability set.

use async_trait::async_trait;

use crate::error::BackendResult;

/// Handle to a located workload.
///
/// Valid for the duration of one touch or stop; never cached across
/// calls, because the underlying container set changes outside this
/// process.
#[derive(Debug, Clone)]
pub struct WorkloadHandle {
    /// Runtime-assigned identifier.
    pub id: String,
    /// The name the workload was located by.
    pub name: String,
}

/// What the idle controller needs from a workload runtime.
///
/// Calls are synchronous from the controller's point of view and are
/// expected to be bounded by the runtime's own timeout conventions.
#[async_trait]
pub trait WorkloadBackend: Send + Sync {
    /// Locate a workload by name, following the runtime's own naming
    /// convention.
    async fn locate(&self, name: &str) -> BackendResult<WorkloadHandle>;

    /// Query the raw lifecycle state of a located workload.
    async fn query_state(&self, handle: &WorkloadHandle) -> BackendResult<String>;

    /// Start a stopped workload.
    async fn start(&self, handle: &WorkloadHandle) -> BackendResult<()>;

    /// Stop a running workload.
    async fn stop(&self, handle: &WorkloadHandle) -> BackendResult<()>;
}
