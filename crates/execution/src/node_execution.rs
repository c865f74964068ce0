//! Node execution handle.

use async_trait::async_trait;
use skiff_core::{
    ExecutionClosure, NodeExecutionIdentifier, NodeExecutionMetadata, NodeExecutionPhase,
    NodeExecutionRecord,
};
use skiff_ports::collect_pages;

use crate::client::Client;
use crate::engine::Execution;
use crate::error::ExecutionError;
use crate::fetch::FetchState;
use crate::task_execution::TaskExecution;
use crate::workflow_execution::WorkflowExecution;

/// A pollable node execution.
///
/// Carries two lazily fetched collections: the task attempts made for the
/// node and the workflow execution it launched, if any.
#[derive(Debug, Clone)]
pub struct NodeExecution {
    record: NodeExecutionRecord,
    task_executions: FetchState<Vec<TaskExecution>>,
    workflow_executions: FetchState<Vec<WorkflowExecution>>,
}

impl NodeExecution {
    /// Wrap a record. Both collections start unfetched.
    #[must_use]
    pub fn from_record(record: NodeExecutionRecord) -> Self {
        Self {
            record,
            task_executions: FetchState::NotFetched,
            workflow_executions: FetchState::NotFetched,
        }
    }

    /// Id of the node this execution runs.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.record.id.node_id
    }

    /// Where the resolved inputs were written.
    #[must_use]
    pub fn input_uri(&self) -> Option<&str> {
        self.record.input_uri.as_deref()
    }

    /// Service-side metadata.
    #[must_use]
    pub fn metadata(&self) -> &NodeExecutionMetadata {
        &self.record.metadata
    }

    /// Task attempts, oldest first.
    #[must_use]
    pub fn task_executions(&self) -> &FetchState<Vec<TaskExecution>> {
        &self.task_executions
    }

    /// Mutable access to the task attempts.
    pub fn task_executions_mut(&mut self) -> Option<&mut Vec<TaskExecution>> {
        self.task_executions.fetched_mut()
    }

    /// Workflow executions launched by this node.
    #[must_use]
    pub fn workflow_executions(&self) -> &FetchState<Vec<WorkflowExecution>> {
        &self.workflow_executions
    }

    /// Mutable access to the launched workflow executions.
    pub fn workflow_executions_mut(&mut self) -> Option<&mut Vec<WorkflowExecution>> {
        self.workflow_executions.fetched_mut()
    }
}

/// Task attempts and launched workflow executions from one sync.
#[derive(Debug)]
pub struct NodeChildren {
    tasks: Vec<TaskExecution>,
    workflows: Vec<WorkflowExecution>,
}

#[async_trait]
impl Execution for NodeExecution {
    type Id = NodeExecutionIdentifier;
    type Phase = NodeExecutionPhase;
    type Record = NodeExecutionRecord;
    type Children = NodeChildren;

    fn id(&self) -> &NodeExecutionIdentifier {
        &self.record.id
    }

    fn closure(&self) -> &ExecutionClosure<NodeExecutionPhase> {
        &self.record.closure
    }

    fn children_fetched(&self) -> bool {
        self.task_executions.is_fetched() && self.workflow_executions.is_fetched()
    }

    async fn fetch_record(&self, client: &Client) -> Result<NodeExecutionRecord, ExecutionError> {
        Ok(client.remote().get_node_execution(&self.record.id).await?)
    }

    async fn fetch_children(
        &self,
        client: &Client,
        record: &NodeExecutionRecord,
    ) -> Result<NodeChildren, ExecutionError> {
        let remote = client.remote();
        let id = &record.id;
        let tasks = collect_pages(move |token| remote.list_task_executions(id, token)).await?;
        let workflows = match &record.metadata.child_execution {
            Some(child) => vec![client.fetch_execution_by_id(child).await?],
            None => Vec::new(),
        };
        Ok(NodeChildren {
            tasks: tasks.into_iter().map(TaskExecution::from_record).collect(),
            workflows,
        })
    }

    fn commit(&mut self, record: NodeExecutionRecord, children: NodeChildren) {
        self.record = record;
        self.task_executions = FetchState::Fetched(children.tasks);
        self.workflow_executions = FetchState::Fetched(children.workflows);
    }
}
