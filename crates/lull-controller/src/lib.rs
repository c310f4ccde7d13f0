//! lull-controller — per-workload idle-timeout state machine.
//!
//! A touch (`name` + idle window) re-derives the workload's state from
//! the backend, starts it if it is down, and pushes the stop deadline
//! out by the idle window. A single watchdog task per workload sleeps
//! until the deadline and issues the stop once the window elapses
//! untouched. The registry maps workload names to controllers, created
//! lazily on first touch.

pub mod controller;
pub mod error;
pub mod registry;

pub use controller::{IdleController, TouchOutcome};
pub use error::{ControllerError, ControllerResult};
pub use registry::WorkloadRegistry;
