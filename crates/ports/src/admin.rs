//! Remote admin service port.
//!
//! The control plane that stores definitions and runs executions. Skiff only
//! reads from it and asks it to launch or terminate executions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use skiff_core::{
    ExecutionRecord, Identifier, NodeExecutionIdentifier, NodeExecutionRecord,
    TaskExecutionIdentifier, TaskExecutionRecord, WorkflowExecutionIdentifier,
};
use skiff_workflow::{CompiledWorkflowClosure, LaunchPlanRecord};

use crate::error::PortsError;
use crate::filter::Filter;
use crate::page::Page;

/// Operations the remote admin service offers.
///
/// All methods are async and object-safe. Implementations must be `Send + Sync`
/// so one instance can back many handles. Missing records are reported as
/// [`PortsError::NotFound`]. Implementations own any retry or deadline policy.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Compiled definition of a registered workflow.
    async fn get_workflow(&self, id: &Identifier) -> Result<CompiledWorkflowClosure, PortsError>;

    /// A registered launch plan.
    async fn get_launch_plan(&self, id: &Identifier) -> Result<LaunchPlanRecord, PortsError>;

    /// Current record of a workflow execution.
    async fn get_execution(
        &self,
        id: &WorkflowExecutionIdentifier,
    ) -> Result<ExecutionRecord, PortsError>;

    /// Current record of a node execution.
    async fn get_node_execution(
        &self,
        id: &NodeExecutionIdentifier,
    ) -> Result<NodeExecutionRecord, PortsError>;

    /// Current record of a task execution attempt.
    async fn get_task_execution(
        &self,
        id: &TaskExecutionIdentifier,
    ) -> Result<TaskExecutionRecord, PortsError>;

    /// One page of the node executions of a workflow execution.
    async fn list_node_executions(
        &self,
        execution_id: &WorkflowExecutionIdentifier,
        filters: &[Filter],
        token: Option<String>,
    ) -> Result<Page<NodeExecutionRecord>, PortsError>;

    /// One page of the task execution attempts of a node execution.
    async fn list_task_executions(
        &self,
        node_execution_id: &NodeExecutionIdentifier,
        token: Option<String>,
    ) -> Result<Page<TaskExecutionRecord>, PortsError>;

    /// Launch a launch plan. Returns the new execution's identifier.
    async fn launch_execution(
        &self,
        launch_plan_id: &Identifier,
        project: &str,
        domain: &str,
        inputs: BTreeMap<String, serde_json::Value>,
    ) -> Result<WorkflowExecutionIdentifier, PortsError>;

    /// Request cancellation. Returns once the request is accepted.
    async fn terminate_execution(
        &self,
        id: &WorkflowExecutionIdentifier,
        cause: &str,
    ) -> Result<(), PortsError>;
}
