//! Identifiers for registered definitions and for their executions.
//!
//! Every identifier is an immutable, structurally comparable value so it can
//! be used directly as a lookup key (`HashMap`, `BTreeMap`) in promotion
//! tables and in the remote service port.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of definition an [`Identifier`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// A single task template.
    Task,
    /// A workflow template.
    Workflow,
    /// A launch plan pointing at a workflow.
    LaunchPlan,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Workflow => write!(f, "workflow"),
            Self::LaunchPlan => write!(f, "launch_plan"),
        }
    }
}

/// Names a versioned definition registered with the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    /// What kind of definition this is.
    pub resource_type: ResourceType,
    /// Owning project.
    pub project: String,
    /// Domain within the project (e.g. `development`, `production`).
    pub domain: String,
    /// Definition name.
    pub name: String,
    /// Registered version.
    pub version: String,
}

impl Identifier {
    /// Create an identifier.
    #[must_use]
    pub fn new(
        resource_type: ResourceType,
        project: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            project: project.into(),
            domain: domain.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Shorthand for a [`ResourceType::Task`] identifier.
    #[must_use]
    pub fn task(
        project: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(ResourceType::Task, project, domain, name, version)
    }

    /// Shorthand for a [`ResourceType::Workflow`] identifier.
    #[must_use]
    pub fn workflow(
        project: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(ResourceType::Workflow, project, domain, name, version)
    }

    /// Shorthand for a [`ResourceType::LaunchPlan`] identifier.
    #[must_use]
    pub fn launch_plan(
        project: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(ResourceType::LaunchPlan, project, domain, name, version)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}/{}@{}",
            self.resource_type, self.project, self.domain, self.name, self.version
        )
    }
}

/// Names a single workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowExecutionIdentifier {
    /// Project the execution runs in.
    pub project: String,
    /// Domain the execution runs in.
    pub domain: String,
    /// Execution name, unique within project and domain.
    pub name: String,
}

impl WorkflowExecutionIdentifier {
    /// Create an execution identifier.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            domain: domain.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for WorkflowExecutionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.domain, self.name)
    }
}

/// Names the execution of one node inside a workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeExecutionIdentifier {
    /// Id of the node within its workflow.
    pub node_id: String,
    /// The workflow execution the node ran in.
    pub execution_id: WorkflowExecutionIdentifier,
}

impl NodeExecutionIdentifier {
    /// Create a node execution identifier.
    #[must_use]
    pub fn new(node_id: impl Into<String>, execution_id: WorkflowExecutionIdentifier) -> Self {
        Self {
            node_id: node_id.into(),
            execution_id,
        }
    }
}

impl fmt::Display for NodeExecutionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.execution_id, self.node_id)
    }
}

/// Names one attempt of a task inside a node execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskExecutionIdentifier {
    /// The task that ran.
    pub task_id: Identifier,
    /// The node execution that ran it.
    pub node_execution_id: NodeExecutionIdentifier,
    /// Zero-based attempt number.
    #[serde(default)]
    pub retry_attempt: u32,
}

impl TaskExecutionIdentifier {
    /// Create a task execution identifier.
    #[must_use]
    pub fn new(
        task_id: Identifier,
        node_execution_id: NodeExecutionIdentifier,
        retry_attempt: u32,
    ) -> Self {
        Self {
            task_id,
            node_execution_id,
            retry_attempt,
        }
    }
}

impl fmt::Display for TaskExecutionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}[{}]",
            self.node_execution_id, self.task_id.name, self.retry_attempt
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn identifiers_compare_structurally() {
        let a = Identifier::task("flytesnacks", "development", "double", "v1");
        let b = Identifier::task("flytesnacks", "development", "double", "v1");
        let c = Identifier::task("flytesnacks", "development", "double", "v2");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut table = HashMap::new();
        table.insert(a, 1);
        assert_eq!(table.get(&b), Some(&1));
        assert_eq!(table.get(&c), None);
    }

    #[test]
    fn resource_type_distinguishes_otherwise_equal_ids() {
        let task = Identifier::task("p", "d", "n", "v");
        let workflow = Identifier::workflow("p", "d", "n", "v");
        assert_ne!(task, workflow);
    }

    #[test]
    fn display_formats() {
        let id = Identifier::launch_plan("p", "d", "wf.main", "v3");
        assert_eq!(id.to_string(), "launch_plan p/d/wf.main@v3");

        let exec = WorkflowExecutionIdentifier::new("p", "d", "abc");
        assert_eq!(exec.to_string(), "p/d/abc");

        let node = NodeExecutionIdentifier::new("n0", exec.clone());
        assert_eq!(node.to_string(), "p/d/abc#n0");

        let task = TaskExecutionIdentifier {
            task_id: Identifier::task("p", "d", "t", "v1"),
            node_execution_id: node,
            retry_attempt: 2,
        };
        assert_eq!(task.to_string(), "p/d/abc#n0:t[2]");
    }

    #[test]
    fn resource_type_serializes_screaming_case() {
        let json = serde_json::to_string(&ResourceType::LaunchPlan).unwrap();
        assert_eq!(json, "\"LAUNCH_PLAN\"");
    }
}
