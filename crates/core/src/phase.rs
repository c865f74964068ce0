//! Execution phases reported by the remote service.
//!
//! Workflow and task executions share [`ExecutionPhase`]. Node executions use
//! [`NodeExecutionPhase`], which adds `SKIPPED` (a branch that was not taken)
//! and counts it as terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Common surface of the phase enums, used by the sync engine.
pub trait Phase: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Returns `true` if no further transitions will be reported.
    fn is_terminal(&self) -> bool;

    /// Returns `true` for the single successful terminal phase.
    fn is_success(&self) -> bool;
}

/// Phase of a workflow or task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionPhase {
    /// Not reported yet.
    #[default]
    Undefined,
    /// Accepted and waiting for resources.
    Queued,
    /// Actively running.
    Running,
    /// Finishing up after success.
    Succeeding,
    /// Finished successfully.
    Succeeded,
    /// Finishing up after a failure.
    Failing,
    /// Finished with a failure.
    Failed,
    /// A cancellation request is being processed.
    Aborting,
    /// Cancelled.
    Aborted,
    /// Exceeded its time budget.
    TimedOut,
}

impl ExecutionPhase {
    /// Every phase, in lattice order.
    pub const ALL: [Self; 10] = [
        Self::Undefined,
        Self::Queued,
        Self::Running,
        Self::Succeeding,
        Self::Succeeded,
        Self::Failing,
        Self::Failed,
        Self::Aborting,
        Self::Aborted,
        Self::TimedOut,
    ];

    /// The terminal phases of a workflow or task execution.
    pub const TERMINAL: [Self; 4] = [
        Self::Aborted,
        Self::Failed,
        Self::Succeeded,
        Self::TimedOut,
    ];
}

impl Phase for ExecutionPhase {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Aborted | Self::Failed | Self::Succeeded | Self::TimedOut
        )
    }

    fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "UNDEFINED",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeding => "SUCCEEDING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failing => "FAILING",
            Self::Failed => "FAILED",
            Self::Aborting => "ABORTING",
            Self::Aborted => "ABORTED",
            Self::TimedOut => "TIMED_OUT",
        };
        f.write_str(s)
    }
}

/// Phase of a node execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeExecutionPhase {
    /// Not reported yet.
    #[default]
    Undefined,
    /// Waiting on upstream nodes or resources.
    Queued,
    /// Actively running.
    Running,
    /// Finishing up after success.
    Succeeding,
    /// Finished successfully.
    Succeeded,
    /// Finishing up after a failure.
    Failing,
    /// Finished with a failure.
    Failed,
    /// A cancellation request is being processed.
    Aborting,
    /// Cancelled.
    Aborted,
    /// Exceeded its time budget.
    TimedOut,
    /// Not executed because its branch was not taken.
    Skipped,
}

impl Phase for NodeExecutionPhase {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Aborted | Self::Failed | Self::Succeeded | Self::TimedOut | Self::Skipped
        )
    }

    fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for NodeExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("UNDEFINED"),
            Self::Queued => f.write_str("QUEUED"),
            Self::Running => f.write_str("RUNNING"),
            Self::Succeeding => f.write_str("SUCCEEDING"),
            Self::Succeeded => f.write_str("SUCCEEDED"),
            Self::Failing => f.write_str("FAILING"),
            Self::Failed => f.write_str("FAILED"),
            Self::Aborting => f.write_str("ABORTING"),
            Self::Aborted => f.write_str("ABORTED"),
            Self::TimedOut => f.write_str("TIMED_OUT"),
            Self::Skipped => f.write_str("SKIPPED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ExecutionPhase::Undefined, false)]
    #[case(ExecutionPhase::Queued, false)]
    #[case(ExecutionPhase::Running, false)]
    #[case(ExecutionPhase::Succeeding, false)]
    #[case(ExecutionPhase::Succeeded, true)]
    #[case(ExecutionPhase::Failing, false)]
    #[case(ExecutionPhase::Failed, true)]
    #[case(ExecutionPhase::Aborting, false)]
    #[case(ExecutionPhase::Aborted, true)]
    #[case(ExecutionPhase::TimedOut, true)]
    fn execution_phase_terminal_membership(#[case] phase: ExecutionPhase, #[case] terminal: bool) {
        assert_eq!(phase.is_terminal(), terminal, "{phase}");
        assert_eq!(ExecutionPhase::TERMINAL.contains(&phase), terminal);
    }

    #[rstest]
    #[case(NodeExecutionPhase::Running, false)]
    #[case(NodeExecutionPhase::Aborting, false)]
    #[case(NodeExecutionPhase::Succeeded, true)]
    #[case(NodeExecutionPhase::Failed, true)]
    #[case(NodeExecutionPhase::Aborted, true)]
    #[case(NodeExecutionPhase::TimedOut, true)]
    #[case(NodeExecutionPhase::Skipped, true)]
    fn node_phase_terminal_membership(#[case] phase: NodeExecutionPhase, #[case] terminal: bool) {
        assert_eq!(phase.is_terminal(), terminal, "{phase}");
    }

    #[test]
    fn only_succeeded_is_success() {
        let successes: Vec<_> = ExecutionPhase::ALL
            .into_iter()
            .filter(Phase::is_success)
            .collect();
        assert_eq!(successes, vec![ExecutionPhase::Succeeded]);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ExecutionPhase::TimedOut).unwrap();
        assert_eq!(json, "\"TIMED_OUT\"");
        let back: NodeExecutionPhase = serde_json::from_str("\"SKIPPED\"").unwrap();
        assert_eq!(back, NodeExecutionPhase::Skipped);
    }

    #[test]
    fn display_matches_serde() {
        for phase in ExecutionPhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }

    #[test]
    fn default_is_undefined() {
        assert_eq!(ExecutionPhase::default(), ExecutionPhase::Undefined);
        assert_eq!(NodeExecutionPhase::default(), NodeExecutionPhase::Undefined);
    }
}
