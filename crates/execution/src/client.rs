//! The explicit context every network-bound operation takes.

use std::fmt;
use std::sync::Arc;

use skiff_core::{
    Identifier, NodeExecutionIdentifier, ResourceType, TaskExecutionIdentifier,
    WorkflowExecutionIdentifier,
};
use skiff_ports::AdminService;
use skiff_workflow::Workflow;

use crate::config::ClientConfig;
use crate::error::ExecutionError;
use crate::launch_plan::LaunchPlan;
use crate::node_execution::NodeExecution;
use crate::task_execution::TaskExecution;
use crate::workflow_execution::WorkflowExecution;

/// A remote admin service plus the defaults to apply when talking to it.
///
/// Cheap to clone. Independent clients share nothing, so tests and
/// multi-tenant applications can hold several side by side.
#[derive(Clone)]
pub struct Client {
    remote: Arc<dyn AdminService>,
    config: ClientConfig,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// A client with an empty configuration.
    #[must_use]
    pub fn new(remote: Arc<dyn AdminService>) -> Self {
        Self {
            remote,
            config: ClientConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// The remote admin service.
    #[must_use]
    pub fn remote(&self) -> &dyn AdminService {
        self.remote.as_ref()
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a definition identifier, filling in the configured default
    /// version when `version` is `None`.
    pub fn identifier(
        &self,
        resource_type: ResourceType,
        project: &str,
        domain: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<Identifier, ExecutionError> {
        let version = version
            .or(self.config.default_version.as_deref())
            .ok_or_else(|| {
                ExecutionError::MissingVersion(format!("{resource_type} {project}/{domain}/{name}"))
            })?;
        Ok(Identifier::new(resource_type, project, domain, name, version))
    }

    /// Fetch and promote a registered workflow.
    pub async fn fetch_workflow(
        &self,
        project: &str,
        domain: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<Workflow, ExecutionError> {
        let id = self.identifier(ResourceType::Workflow, project, domain, name, version)?;
        self.fetch_workflow_by_id(&id).await
    }

    /// Fetch and promote a workflow by identifier.
    pub async fn fetch_workflow_by_id(&self, id: &Identifier) -> Result<Workflow, ExecutionError> {
        let closure = self.remote.get_workflow(id).await?;
        let workflow = Workflow::from_closure(&closure)?.with_id(id.clone());
        tracing::debug!(
            workflow = %id,
            nodes = workflow.graph().node_count(),
            sub_workflows = closure.sub_workflows.len(),
            tasks = closure.tasks.len(),
            "fetched workflow"
        );
        Ok(workflow)
    }

    /// Fetch a registered launch plan.
    pub async fn fetch_launch_plan(
        &self,
        project: &str,
        domain: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<LaunchPlan, ExecutionError> {
        LaunchPlan::fetch(self, project, domain, name, version).await
    }

    /// Fetch a workflow execution by its coordinates.
    pub async fn fetch_execution(
        &self,
        project: &str,
        domain: &str,
        name: &str,
    ) -> Result<WorkflowExecution, ExecutionError> {
        self.fetch_execution_by_id(&WorkflowExecutionIdentifier::new(project, domain, name))
            .await
    }

    /// Fetch a workflow execution by identifier. Child collections start
    /// unfetched.
    pub async fn fetch_execution_by_id(
        &self,
        id: &WorkflowExecutionIdentifier,
    ) -> Result<WorkflowExecution, ExecutionError> {
        let record = self.remote.get_execution(id).await?;
        Ok(WorkflowExecution::from_record(record))
    }

    /// Fetch a node execution by identifier.
    pub async fn fetch_node_execution(
        &self,
        id: &NodeExecutionIdentifier,
    ) -> Result<NodeExecution, ExecutionError> {
        let record = self.remote.get_node_execution(id).await?;
        Ok(NodeExecution::from_record(record))
    }

    /// Fetch a task execution attempt by identifier.
    pub async fn fetch_task_execution(
        &self,
        id: &TaskExecutionIdentifier,
    ) -> Result<TaskExecution, ExecutionError> {
        let record = self.remote.get_task_execution(id).await?;
        Ok(TaskExecution::from_record(record))
    }
}
