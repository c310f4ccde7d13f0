//! Runtime status classification.

use std::fmt;

/// Classified lifecycle state of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadStatus {
    /// The workload is running.
    Up,
    /// The workload is not running.
    Down,
    /// The workload is coming up.
    Starting,
    /// The last status query failed; the real state was not observed.
    Unknown,
}

impl WorkloadStatus {
    /// Classify a raw runtime lifecycle string.
    ///
    /// Total over Docker's state vocabulary: anything that is not
    /// running or on its way up counts as down. A successful query
    /// never classifies as `Unknown` — that value is reserved for
    /// failed queries.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "running" => Self::Up,
            "restarting" | "starting" => Self::Starting,
            _ => Self::Down,
        }
    }
}

impl fmt::Display for WorkloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Starting => "starting",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_is_up() {
        assert_eq!(WorkloadStatus::classify("running"), WorkloadStatus::Up);
    }

    #[test]
    fn restarting_and_starting_are_starting() {
        assert_eq!(
            WorkloadStatus::classify("restarting"),
            WorkloadStatus::Starting
        );
        assert_eq!(
            WorkloadStatus::classify("starting"),
            WorkloadStatus::Starting
        );
    }

    #[test]
    fn stopped_states_are_down() {
        for raw in ["exited", "created", "paused", "dead", "removing"] {
            assert_eq!(WorkloadStatus::classify(raw), WorkloadStatus::Down);
        }
    }

    #[test]
    fn classify_never_returns_unknown() {
        for raw in ["running", "restarting", "starting", "exited", "created", ""] {
            assert_ne!(WorkloadStatus::classify(raw), WorkloadStatus::Unknown);
        }
    }
}
