//! Workflow-specific error types.

use skiff_core::{ExecutionPhase, FaultKind, Identifier};
use thiserror::Error;

/// Errors raised while promoting compiled templates or manipulating the graph.
///
/// A promotion that fails never yields a partially linked workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A node record sets none of the executable-reference variants.
    #[error("node {0} has no task, workflow or branch reference")]
    MissingNodeKind(String),

    /// A node record sets more than one executable-reference variant.
    #[error("node {node_id} sets more than one executable reference: {kinds:?}")]
    AmbiguousNodeKind {
        /// The offending node.
        node_id: String,
        /// Names of the variants that were populated.
        kinds: Vec<&'static str>,
    },

    /// A workflow-node reference has neither an inline workflow nor a launch plan.
    #[error("workflow node {0} has neither a sub-workflow nor a launch plan reference")]
    EmptyWorkflowNode(String),

    /// A workflow-node reference has both an inline workflow and a launch plan.
    #[error("workflow node {0} has both a sub-workflow and a launch plan reference")]
    AmbiguousWorkflowNode(String),

    /// A referenced task or sub-workflow is absent from the supplied tables.
    #[error("node {node_id} references {reference}, which is not in the supplied templates")]
    DanglingReference {
        /// The node holding the reference.
        node_id: String,
        /// The missing identifier.
        reference: Identifier,
    },

    /// A node lists an upstream id that is not a node of the same workflow.
    #[error("node {node_id} lists unknown upstream node {upstream_id}")]
    UnknownUpstream {
        /// The downstream node.
        node_id: String,
        /// The id that did not resolve.
        upstream_id: String,
    },

    /// Two records share a node id.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// A sub-workflow (transitively) inlines itself.
    #[error("sub-workflow {0} references itself")]
    RecursiveSubWorkflow(Identifier),

    /// A remote notification record names no delivery target.
    #[error("notification has no email, pager duty or slack target")]
    MissingNotificationTarget,

    /// A node already carries an id.
    #[error("node is already bound to id {0}")]
    AlreadyBound(String),

    /// An operation needs a bound node id.
    #[error("node has not been assigned an id")]
    Unbound,

    /// A node handle does not belong to this graph builder.
    #[error("unknown node handle")]
    UnknownHandle,

    /// The node's interface has no output with this name.
    #[error("node {node_id} has no output named {var}")]
    UnknownOutput {
        /// The node whose outputs were inspected.
        node_id: String,
        /// The requested output.
        var: String,
    },

    /// A notification was constructed with no phases.
    #[error("a notification must specify at least one phase")]
    NotificationWithoutPhases,

    /// A notification was constructed with a non-terminal phase.
    #[error("notifications can only fire on terminal phases, got {0}")]
    NonTerminalNotificationPhase(ExecutionPhase),

    /// The operation is not available on promoted graphs.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl WorkflowError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::MissingNodeKind(_)
            | Self::AmbiguousNodeKind { .. }
            | Self::EmptyWorkflowNode(_)
            | Self::AmbiguousWorkflowNode(_)
            | Self::DanglingReference { .. }
            | Self::UnknownUpstream { .. }
            | Self::DuplicateNodeId(_)
            | Self::RecursiveSubWorkflow(_)
            | Self::MissingNotificationTarget => FaultKind::System,
            Self::AlreadyBound(_)
            | Self::Unbound
            | Self::UnknownHandle
            | Self::UnknownOutput { .. }
            | Self::NotificationWithoutPhases
            | Self::NonTerminalNotificationPhase(_)
            | Self::Unsupported(_) => FaultKind::User,
        }
    }
}
