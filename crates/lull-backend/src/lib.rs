//! lull-backend — the workload runtime abstraction.
//!
//! Defines the capability set the idle controller consumes
//! (`WorkloadBackend`: locate, query state, start, stop), the pure
//! raw-state classifier, and the Docker Engine implementation that
//! talks to the daemon over its unix socket.

pub mod backend;
pub mod docker;
pub mod error;
pub mod status;

pub use backend::{WorkloadBackend, WorkloadHandle};
pub use docker::DockerBackend;
pub use error::{BackendError, BackendResult};
pub use status::WorkloadStatus;
