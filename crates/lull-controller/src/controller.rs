//! Idle-timeout controller — one per workload.
//!
//! Every touch re-derives the workload's state from the backend (the
//! cached classification is diagnostic only), starts the workload if
//! it is down, and pushes the stop deadline out by the touch's idle
//! window. A single watchdog task per workload sleeps until the
//! deadline and stops the workload once the deadline passes untouched.
//!
//! The deadline is the single source of truth for when to stop:
//! touches only ever move it forward, the watchdog recomputes its
//! remaining wait on every wake, and it re-checks the deadline under
//! the workload lock before acting. The same lock covers the
//! decide-then-mutate section of a touch, so a start can never overlap
//! a watchdog-issued stop for the same workload.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use lull_backend::{BackendError, WorkloadBackend, WorkloadHandle, WorkloadStatus};

use crate::error::{ControllerError, ControllerResult};

/// Status query attempts per touch before giving up.
const STATUS_ATTEMPTS: u32 = 3;
/// Pause between status query attempts.
const STATUS_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Outcome of a successful touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// The workload is up; its deadline was extended.
    Started,
    /// The workload is coming up (or a start was just issued).
    Starting,
}

impl TouchOutcome {
    /// Literal wire form consumed by the traffic-routing layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Starting => "starting",
        }
    }
}

/// Mutable state shared between touch flows and the watchdog.
struct Inner {
    /// Absolute point before which the workload must not be stopped.
    /// Only meaningful while a watchdog is active.
    deadline: Instant,
    /// Whether a watchdog task currently owns the deadline.
    watchdog_active: bool,
    /// Classification observed by the most recent touch. Diagnostic
    /// only; every touch queries the backend afresh.
    last_status: WorkloadStatus,
}

/// Per-workload idle-timeout controller.
///
/// Created by the registry on first touch for a name and kept for the
/// life of the process.
pub struct IdleController {
    name: String,
    backend: Arc<dyn WorkloadBackend>,
    /// Guards `Inner` and serializes backend start/stop calls for this
    /// workload.
    inner: Arc<Mutex<Inner>>,
}

impl IdleController {
    pub fn new(name: impl Into<String>, backend: Arc<dyn WorkloadBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
            inner: Arc::new(Mutex::new(Inner {
                deadline: Instant::now(),
                watchdog_active: false,
                last_status: WorkloadStatus::Unknown,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a watchdog task is currently armed for this workload.
    pub async fn is_armed(&self) -> bool {
        self.inner.lock().await.watchdog_active
    }

    /// Classification observed by the most recent touch.
    pub async fn last_status(&self) -> WorkloadStatus {
        self.inner.lock().await.last_status
    }

    /// Handle one touch: make sure the workload is running and keep it
    /// alive for at least `idle_window` from now.
    pub async fn touch(&self, idle_window: Duration) -> ControllerResult<TouchOutcome> {
        let mut inner = self.inner.lock().await;

        let (handle, status) = self.query_status().await?;
        inner.last_status = status;

        match status {
            WorkloadStatus::Up => {
                debug!(name = %self.name, "workload is up");
                extend_deadline(&mut inner, idle_window);
                self.arm_watchdog(&mut inner);
                Ok(TouchOutcome::Started)
            }
            WorkloadStatus::Starting => {
                debug!(name = %self.name, "workload is starting");
                extend_deadline(&mut inner, idle_window);
                self.arm_watchdog(&mut inner);
                Ok(TouchOutcome::Starting)
            }
            WorkloadStatus::Down => {
                info!(name = %self.name, "workload is down, starting it");
                self.backend.start(&handle).await.map_err(|e| match e {
                    BackendError::NotFound(n) => ControllerError::WorkloadNotFound(n),
                    e => ControllerError::StartFailed {
                        name: self.name.clone(),
                        source: e,
                    },
                })?;
                extend_deadline(&mut inner, idle_window);
                self.arm_watchdog(&mut inner);
                Ok(TouchOutcome::Starting)
            }
            // `classify` never yields Unknown from a successful query;
            // query failures surface as errors above.
            WorkloadStatus::Unknown => Err(ControllerError::UnknownState {
                name: self.name.clone(),
                attempts: STATUS_ATTEMPTS,
            }),
        }
    }

    /// Locate and classify the workload, retrying transient failures.
    ///
    /// Not-found is terminal for the touch; any other failure is
    /// retried up to `STATUS_ATTEMPTS` with a short backoff before
    /// surfacing as an unknown-state error.
    async fn query_status(&self) -> ControllerResult<(WorkloadHandle, WorkloadStatus)> {
        let mut attempt = 1;
        loop {
            let result = async {
                let handle = self.backend.locate(&self.name).await?;
                let raw = self.backend.query_state(&handle).await?;
                Ok::<_, BackendError>((handle, raw))
            }
            .await;

            match result {
                Ok((handle, raw)) => {
                    return Ok((handle, WorkloadStatus::classify(&raw)));
                }
                Err(BackendError::NotFound(name)) => {
                    return Err(ControllerError::WorkloadNotFound(name));
                }
                Err(e) if attempt < STATUS_ATTEMPTS => {
                    warn!(
                        name = %self.name,
                        attempt,
                        error = %e,
                        "status query failed, retrying"
                    );
                    tokio::time::sleep(STATUS_RETRY_BACKOFF).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        name = %self.name,
                        attempts = attempt,
                        error = %e,
                        "status query exhausted retries"
                    );
                    return Err(ControllerError::UnknownState {
                        name: self.name.clone(),
                        attempts: attempt,
                    });
                }
            }
        }
    }

    /// Arm the stop watchdog if one is not already running.
    ///
    /// Idempotent: at most one watchdog task exists per workload, and
    /// only the task itself clears the flag, right before it exits.
    fn arm_watchdog(&self, inner: &mut Inner) {
        if inner.watchdog_active {
            return;
        }
        inner.watchdog_active = true;

        let name = self.name.clone();
        let backend = self.backend.clone();
        let shared = self.inner.clone();
        tokio::spawn(async move {
            run_watchdog(name, backend, shared).await;
        });
        debug!(name = %self.name, "watchdog armed");
    }
}

/// Push the deadline out to `now + idle_window`.
///
/// While a watchdog is armed the deadline only ever moves forward; a
/// touch with a shorter window than a previous one never pulls an
/// armed deadline back in.
fn extend_deadline(inner: &mut Inner, idle_window: Duration) {
    let candidate = Instant::now() + idle_window;
    if !inner.watchdog_active || candidate > inner.deadline {
        inner.deadline = candidate;
    }
}

/// The stop watchdog for one workload.
///
/// Sleeps until the current deadline, re-reading it on every wake so a
/// touch that pushed the deadline out simply lengthens the nap. Once
/// the deadline has passed, the stop is issued under the workload lock
/// and the watchdog deactivates itself before exiting; the next touch
/// arms a fresh one.
async fn run_watchdog(name: String, backend: Arc<dyn WorkloadBackend>, shared: Arc<Mutex<Inner>>) {
    loop {
        let mut inner = shared.lock().await;
        if inner.deadline > Instant::now() {
            let deadline = inner.deadline;
            drop(inner);
            tokio::time::sleep_until(deadline).await;
            continue;
        }

        info!(%name, "idle window elapsed, stopping workload");
        match backend.locate(&name).await {
            Ok(handle) => {
                if let Err(e) = backend.stop(&handle).await {
                    // No caller to report to; the workload stays up
                    // until the next stop cycle or outside help.
                    error!(%name, error = %e, "failed to stop workload");
                }
            }
            Err(e) => {
                error!(%name, error = %e, "failed to locate workload for stop");
            }
        }
        inner.watchdog_active = false;
        return;
    }
}
