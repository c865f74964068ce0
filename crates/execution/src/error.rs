//! Execution error types.

use skiff_core::{FaultKind, Identifier};
use skiff_ports::PortsError;
use skiff_workflow::WorkflowError;
use thiserror::Error;

/// Errors raised by execution handles and the client.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The remote service failed or had no matching record.
    #[error(transparent)]
    Ports(#[from] PortsError),

    /// A fetched definition could not be promoted.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The error of an execution was read before it reached a terminal phase.
    #[error("execution {0} has not completed")]
    Incomplete(String),

    /// A definition was requested without a version and none is configured.
    #[error("no version given for {0} and no default version configured")]
    MissingVersion(String),

    /// A launch omitted required inputs that have no default.
    #[error("launch plan {launch_plan} is missing required inputs {inputs:?}")]
    MissingInputs {
        /// The launch plan being launched.
        launch_plan: Identifier,
        /// Names of the missing inputs.
        inputs: Vec<String>,
    },
}

impl ExecutionError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Ports(err) => err.kind(),
            Self::Workflow(err) => err.kind(),
            Self::Incomplete(_) | Self::MissingVersion(_) | Self::MissingInputs { .. } => {
                FaultKind::User
            }
        }
    }

    /// Returns `true` if the remote service had no matching record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == FaultKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_display() {
        let err = ExecutionError::Incomplete("p/d/e1".into());
        assert_eq!(err.to_string(), "execution p/d/e1 has not completed");
        assert_eq!(err.kind(), FaultKind::User);
    }

    #[test]
    fn ports_errors_keep_their_kind() {
        let err = ExecutionError::from(PortsError::not_found("execution", "p/d/e1"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "execution not found: p/d/e1");

        let err = ExecutionError::from(PortsError::Connection("refused".into()));
        assert_eq!(err.kind(), FaultKind::Network);
    }

    #[test]
    fn workflow_errors_keep_their_kind() {
        let err = ExecutionError::from(WorkflowError::MissingNodeKind("n0".into()));
        assert_eq!(err.kind(), FaultKind::System);
        assert!(!err.is_not_found());
    }
}
