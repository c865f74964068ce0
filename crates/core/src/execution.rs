//! Execution records as reported by the remote service.
//!
//! A record pairs an identifier and an immutable spec with a [`ExecutionClosure`]:
//! the latest observed status snapshot. Closures are replaced wholesale on every
//! refresh; nothing here computes a phase locally.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{
    Identifier, NodeExecutionIdentifier, TaskExecutionIdentifier, WorkflowExecutionIdentifier,
};
use crate::phase::{ExecutionPhase, NodeExecutionPhase};

/// Who is to blame for a failed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Not classified by the remote service.
    #[default]
    Unknown,
    /// Raised by user code.
    User,
    /// Raised by the platform.
    System,
}

/// Error stored on a closure once an execution fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Location of the full error document, if uploaded.
    #[serde(default)]
    pub error_uri: Option<String>,
    /// Failure classification.
    #[serde(default)]
    pub kind: FailureKind,
}

impl ExecutionFailure {
    /// Create an unclassified failure.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            error_uri: None,
            kind: FailureKind::Unknown,
        }
    }

    /// Set the failure classification.
    #[must_use]
    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Latest observed status of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionClosure<P> {
    /// Current phase.
    pub phase: P,
    /// Error, if any. Only meaningful once `phase` is terminal.
    #[serde(default)]
    pub error: Option<ExecutionFailure>,
    /// Location of the outputs document, once produced.
    #[serde(default)]
    pub outputs_uri: Option<String>,
    /// When the execution started running.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the remote service last updated this closure.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<P> ExecutionClosure<P> {
    /// Create a closure in the given phase with no error.
    #[must_use]
    pub fn new(phase: P) -> Self {
        Self {
            phase,
            error: None,
            outputs_uri: None,
            started_at: None,
            updated_at: None,
        }
    }

    /// Attach an error.
    #[must_use]
    pub fn with_error(mut self, error: ExecutionFailure) -> Self {
        self.error = Some(error);
        self
    }
}

/// How an execution was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Launched by a user.
    #[default]
    Manual,
    /// Launched by a schedule.
    Scheduled,
    /// Launched by the platform.
    System,
    /// A relaunch of an earlier execution.
    Relaunch,
    /// Launched by a node of a parent workflow.
    ChildWorkflow,
}

/// Provenance of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// How the execution was started.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Who started it.
    #[serde(default)]
    pub principal: Option<String>,
    /// The node execution that launched this one, for child workflows.
    #[serde(default)]
    pub parent_node_execution: Option<NodeExecutionIdentifier>,
}

/// What was launched, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSpec {
    /// The launch plan the execution was created from.
    pub launch_plan: Identifier,
    /// Inputs supplied at launch.
    #[serde(default)]
    pub inputs: BTreeMap<String, serde_json::Value>,
    /// Provenance.
    #[serde(default)]
    pub metadata: ExecutionMetadata,
}

/// A workflow execution as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Execution identifier.
    pub id: WorkflowExecutionIdentifier,
    /// Launch spec.
    pub spec: ExecutionSpec,
    /// Latest status.
    pub closure: ExecutionClosure<ExecutionPhase>,
}

/// Node-execution facts that are not part of the status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeExecutionMetadata {
    /// Retry group the execution belongs to, for nodes inside retried subgraphs.
    #[serde(default)]
    pub retry_group: Option<String>,
    /// `true` if the node owns child node executions (sub-workflows, branches).
    #[serde(default)]
    pub is_parent_node: bool,
    /// Id of the node in the workflow template.
    #[serde(default)]
    pub spec_node_id: Option<String>,
    /// Child workflow execution launched by this node, if any.
    #[serde(default)]
    pub child_execution: Option<WorkflowExecutionIdentifier>,
}

/// A node execution as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExecutionRecord {
    /// Node execution identifier.
    pub id: NodeExecutionIdentifier,
    /// Location of the inputs document.
    #[serde(default)]
    pub input_uri: Option<String>,
    /// Latest status.
    pub closure: ExecutionClosure<NodeExecutionPhase>,
    /// Structural facts.
    #[serde(default)]
    pub metadata: NodeExecutionMetadata,
}

/// A log link attached to a task execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    /// Display name of the log stream.
    pub name: String,
    /// Where to read it.
    pub uri: String,
}

/// A task execution attempt as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskExecutionRecord {
    /// Task execution identifier.
    pub id: TaskExecutionIdentifier,
    /// Latest status.
    pub closure: ExecutionClosure<ExecutionPhase>,
    /// `true` if this task fans out into child node executions.
    #[serde(default)]
    pub is_parent: bool,
    /// Log links.
    #[serde(default)]
    pub logs: Vec<TaskLog>,
}
