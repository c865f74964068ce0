//! Compiled templates: the flat, already type-checked workflow representation
//! returned by the remote service.
//!
//! These are plain records. A [`NodeRecord`] carries up to three optional
//! executable references exactly as transmitted; [`NodeRecord::kind`] is the
//! variant resolver that turns them into a single [`NodeKindRecord`] or rejects
//! the record.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skiff_core::Identifier;

use crate::binding::BindingRecord;
use crate::condition::BooleanExpression;
use crate::error::WorkflowError;
use crate::interface::TypedInterface;

/// Per-node execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Node-level timeout.
    #[serde(default, with = "crate::serde_duration_opt")]
    pub timeout: Option<Duration>,
    /// Number of retries on recoverable failure.
    #[serde(default)]
    pub retries: u32,
    /// Whether the node may run on interruptible capacity.
    #[serde(default)]
    pub interruptible: Option<bool>,
}

/// Renames one of a node's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Output variable on the node.
    pub var: String,
    /// Name it is exposed under.
    pub alias: String,
}

/// Task reference on a node record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNodeRecord {
    /// The task template to run.
    pub reference_id: Identifier,
}

/// Workflow reference on a node record: inline sub-workflow or launch plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowNodeRecord {
    /// Launch plan to launch as a child execution.
    #[serde(default)]
    pub launchplan_ref: Option<Identifier>,
    /// Sub-workflow to inline.
    #[serde(default)]
    pub sub_workflow_ref: Option<Identifier>,
}

/// One guarded case of a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlockRecord {
    /// Guard.
    pub condition: BooleanExpression,
    /// Node run when the guard holds.
    pub then_node: Box<NodeRecord>,
}

/// Ordered cases of a branch plus an optional fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfElseRecord {
    /// The first case.
    pub case: IfBlockRecord,
    /// Further cases, in declaration order.
    #[serde(default)]
    pub other: Vec<IfBlockRecord>,
    /// Node run when no case holds.
    #[serde(default)]
    pub else_node: Option<Box<NodeRecord>>,
    /// Error raised when no case holds and there is no else node.
    #[serde(default)]
    pub error: Option<String>,
}

/// Branch definition on a node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNodeRecord {
    /// The cases.
    pub if_else: IfElseRecord,
}

/// One node of a compiled template, as transmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id, unique within its template.
    pub id: String,
    /// Execution settings.
    #[serde(default)]
    pub metadata: NodeMetadata,
    /// Input bindings.
    #[serde(default)]
    pub inputs: Vec<BindingRecord>,
    /// Ids of nodes that must finish first, in declaration order.
    #[serde(default)]
    pub upstream_node_ids: Vec<String>,
    /// Output renames.
    #[serde(default)]
    pub output_aliases: Vec<Alias>,
    /// Task reference.
    #[serde(default)]
    pub task_node: Option<TaskNodeRecord>,
    /// Workflow reference.
    #[serde(default)]
    pub workflow_node: Option<WorkflowNodeRecord>,
    /// Branch definition.
    #[serde(default)]
    pub branch_node: Option<BranchNodeRecord>,
}

/// The single executable reference a record resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKindRecord<'a> {
    /// Run a task.
    Task(&'a Identifier),
    /// Inline a sub-workflow.
    SubWorkflow(&'a Identifier),
    /// Launch a launch plan as a child execution.
    LaunchPlan(&'a Identifier),
    /// Pick one of several nodes at run time.
    Branch(&'a BranchNodeRecord),
}

impl NodeRecord {
    /// A record with only an id; attach a reference with the `with_*` methods.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: NodeMetadata::default(),
            inputs: Vec::new(),
            upstream_node_ids: Vec::new(),
            output_aliases: Vec::new(),
            task_node: None,
            workflow_node: None,
            branch_node: None,
        }
    }

    /// Set the task reference.
    #[must_use]
    pub fn with_task(mut self, reference_id: Identifier) -> Self {
        self.task_node = Some(TaskNodeRecord { reference_id });
        self
    }

    /// Set an inline sub-workflow reference.
    #[must_use]
    pub fn with_sub_workflow(mut self, id: Identifier) -> Self {
        self.workflow_node
            .get_or_insert_with(WorkflowNodeRecord::default)
            .sub_workflow_ref = Some(id);
        self
    }

    /// Set a launch-plan reference.
    #[must_use]
    pub fn with_launch_plan(mut self, id: Identifier) -> Self {
        self.workflow_node
            .get_or_insert_with(WorkflowNodeRecord::default)
            .launchplan_ref = Some(id);
        self
    }

    /// Set the branch definition.
    #[must_use]
    pub fn with_branch(mut self, if_else: IfElseRecord) -> Self {
        self.branch_node = Some(BranchNodeRecord { if_else });
        self
    }

    /// Append an upstream id.
    #[must_use]
    pub fn with_upstream(mut self, id: impl Into<String>) -> Self {
        self.upstream_node_ids.push(id.into());
        self
    }

    /// Append an input binding.
    #[must_use]
    pub fn with_input(mut self, binding: BindingRecord) -> Self {
        self.inputs.push(binding);
        self
    }

    /// Resolve which single executable reference this record carries.
    ///
    /// Zero or several populated variants, or a workflow reference naming
    /// neither or both of sub-workflow and launch plan, are system faults.
    pub fn kind(&self) -> Result<NodeKindRecord<'_>, WorkflowError> {
        let mut populated = Vec::new();
        if self.task_node.is_some() {
            populated.push("task");
        }
        if self.workflow_node.is_some() {
            populated.push("workflow");
        }
        if self.branch_node.is_some() {
            populated.push("branch");
        }
        if populated.len() > 1 {
            return Err(WorkflowError::AmbiguousNodeKind {
                node_id: self.id.clone(),
                kinds: populated,
            });
        }

        if let Some(task) = &self.task_node {
            return Ok(NodeKindRecord::Task(&task.reference_id));
        }
        if let Some(branch) = &self.branch_node {
            return Ok(NodeKindRecord::Branch(branch));
        }
        let Some(workflow) = &self.workflow_node else {
            return Err(WorkflowError::MissingNodeKind(self.id.clone()));
        };
        match (&workflow.sub_workflow_ref, &workflow.launchplan_ref) {
            (Some(sub), None) => Ok(NodeKindRecord::SubWorkflow(sub)),
            (None, Some(lp)) => Ok(NodeKindRecord::LaunchPlan(lp)),
            (None, None) => Err(WorkflowError::EmptyWorkflowNode(self.id.clone())),
            (Some(_), Some(_)) => Err(WorkflowError::AmbiguousWorkflowNode(self.id.clone())),
        }
    }
}

/// What the remote service does when a node fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop scheduling as soon as any node fails.
    #[default]
    FailImmediately,
    /// Let already-runnable nodes finish before failing.
    FailAfterExecutableNodesComplete,
}

/// Workflow-level execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Failure policy.
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Maximum time the execution may sit queued.
    #[serde(default, with = "crate::serde_duration_opt")]
    pub queuing_budget: Option<Duration>,
}

/// Defaults applied to every node that does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowMetadataDefaults {
    /// Default interruptible flag.
    #[serde(default)]
    pub interruptible: bool,
}

/// A compiled workflow template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Workflow identifier.
    pub id: Identifier,
    /// Execution settings.
    #[serde(default)]
    pub metadata: WorkflowMetadata,
    /// Node defaults.
    #[serde(default)]
    pub metadata_defaults: WorkflowMetadataDefaults,
    /// Typed interface.
    #[serde(default)]
    pub interface: TypedInterface,
    /// Nodes in declaration order, including the start and end sentinels.
    pub nodes: Vec<NodeRecord>,
    /// Workflow output bindings.
    #[serde(default)]
    pub outputs: Vec<BindingRecord>,
}

/// Container a task runs in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Container {
    /// Image reference.
    pub image: String,
    /// Entrypoint.
    #[serde(default)]
    pub command: Vec<String>,
    /// Arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment.
    #[serde(default)]
    pub env: Vec<(String, String)>,
}

/// Task-level execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Whether outputs may be served from cache.
    #[serde(default)]
    pub discoverable: bool,
    /// Cache version.
    #[serde(default)]
    pub discovery_version: Option<String>,
    /// Task timeout.
    #[serde(default, with = "crate::serde_duration_opt")]
    pub timeout: Option<Duration>,
    /// Retries on recoverable failure.
    #[serde(default)]
    pub retries: u32,
    /// Whether the task may run on interruptible capacity.
    #[serde(default)]
    pub interruptible: bool,
}

/// A registered task template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Task identifier.
    pub id: Identifier,
    /// Plugin type, e.g. `python-task`.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Execution settings.
    #[serde(default)]
    pub metadata: TaskMetadata,
    /// Typed interface.
    #[serde(default)]
    pub interface: TypedInterface,
    /// Plugin-specific configuration.
    #[serde(default)]
    pub custom: serde_json::Value,
    /// Container, for container-based plugins.
    #[serde(default)]
    pub container: Option<Container>,
}

impl TaskTemplate {
    /// A task template with an empty interface.
    #[must_use]
    pub fn new(id: Identifier, task_type: impl Into<String>) -> Self {
        Self {
            id,
            task_type: task_type.into(),
            metadata: TaskMetadata::default(),
            interface: TypedInterface::default(),
            custom: serde_json::Value::Null,
            container: None,
        }
    }

    /// Set the interface.
    #[must_use]
    pub fn with_interface(mut self, interface: TypedInterface) -> Self {
        self.interface = interface;
        self
    }
}

/// A workflow definition as returned by the remote service: the primary
/// template plus every sub-workflow and task it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledWorkflowClosure {
    /// The requested workflow.
    pub primary: WorkflowTemplate,
    /// Inline sub-workflows, at any depth.
    #[serde(default)]
    pub sub_workflows: Vec<WorkflowTemplate>,
    /// Referenced tasks, at any depth.
    #[serde(default)]
    pub tasks: Vec<TaskTemplate>,
}

impl CompiledWorkflowClosure {
    /// Sub-workflow templates keyed by identifier.
    #[must_use]
    pub fn sub_workflow_table(&self) -> HashMap<Identifier, WorkflowTemplate> {
        self.sub_workflows
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect()
    }

    /// Task templates keyed by identifier.
    #[must_use]
    pub fn task_table(&self) -> HashMap<Identifier, TaskTemplate> {
        self.tasks.iter().map(|t| (t.id.clone(), t.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ComparisonOperator, Primitive};

    fn task_id() -> Identifier {
        Identifier::task("p", "d", "t", "v1")
    }

    #[test]
    fn resolves_task() {
        let record = NodeRecord::new("n0").with_task(task_id());
        assert_eq!(record.kind().unwrap(), NodeKindRecord::Task(&task_id()));
    }

    #[test]
    fn resolves_sub_workflow_and_launch_plan() {
        let sub = Identifier::workflow("p", "d", "sub", "v1");
        let record = NodeRecord::new("n0").with_sub_workflow(sub.clone());
        assert_eq!(record.kind().unwrap(), NodeKindRecord::SubWorkflow(&sub));

        let lp = Identifier::launch_plan("p", "d", "lp", "v1");
        let record = NodeRecord::new("n1").with_launch_plan(lp.clone());
        assert_eq!(record.kind().unwrap(), NodeKindRecord::LaunchPlan(&lp));
    }

    #[test]
    fn resolves_branch() {
        let record = NodeRecord::new("b").with_branch(IfElseRecord {
            case: IfBlockRecord {
                condition: BooleanExpression::compare(
                    ComparisonOperator::Eq,
                    "x",
                    Primitive::Boolean(true),
                ),
                then_node: Box::new(NodeRecord::new("b-n0").with_task(task_id())),
            },
            other: Vec::new(),
            else_node: None,
            error: None,
        });
        assert!(matches!(record.kind().unwrap(), NodeKindRecord::Branch(_)));
    }

    #[test]
    fn rejects_no_reference() {
        let err = NodeRecord::new("n0").kind().unwrap_err();
        assert!(matches!(err, WorkflowError::MissingNodeKind(id) if id == "n0"));
    }

    #[test]
    fn rejects_task_and_workflow() {
        let record = NodeRecord::new("n0")
            .with_task(task_id())
            .with_sub_workflow(Identifier::workflow("p", "d", "sub", "v1"));
        let err = record.kind().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::AmbiguousNodeKind { ref kinds, .. } if kinds == &["task", "workflow"]
        ));
    }

    #[test]
    fn rejects_empty_and_doubled_workflow_node() {
        let mut record = NodeRecord::new("n0");
        record.workflow_node = Some(WorkflowNodeRecord::default());
        assert!(matches!(
            record.kind().unwrap_err(),
            WorkflowError::EmptyWorkflowNode(_)
        ));

        let record = NodeRecord::new("n1")
            .with_sub_workflow(Identifier::workflow("p", "d", "sub", "v1"))
            .with_launch_plan(Identifier::launch_plan("p", "d", "lp", "v1"));
        assert!(matches!(
            record.kind().unwrap_err(),
            WorkflowError::AmbiguousWorkflowNode(_)
        ));
    }

    #[test]
    fn node_record_deserializes_minimal_payload() {
        let json = serde_json::json!({
            "id": "n0",
            "upstream_node_ids": ["start-node"],
            "task_node": {"reference_id": {
                "resource_type": "TASK", "project": "p", "domain": "d", "name": "t", "version": "v1"
            }},
            "metadata": {"name": "double", "timeout": 30000}
        });
        let record: NodeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.metadata.timeout, Some(Duration::from_secs(30)));
        assert_eq!(record.kind().unwrap(), NodeKindRecord::Task(&task_id()));
    }
}
