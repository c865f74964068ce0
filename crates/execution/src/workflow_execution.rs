//! Workflow execution handle.

use async_trait::async_trait;
use indexmap::IndexMap;
use skiff_core::{
    ExecutionClosure, ExecutionPhase, ExecutionRecord, ExecutionSpec, WorkflowExecutionIdentifier,
};
use skiff_ports::{Filter, collect_pages};

use crate::client::Client;
use crate::engine::Execution;
use crate::error::ExecutionError;
use crate::fetch::FetchState;
use crate::node_execution::NodeExecution;

/// A pollable workflow execution.
///
/// Node executions are keyed by node id, in the order the service lists them.
#[derive(Debug, Clone)]
pub struct WorkflowExecution {
    record: ExecutionRecord,
    node_executions: FetchState<IndexMap<String, NodeExecution>>,
}

impl WorkflowExecution {
    /// Wrap a record. Node executions start unfetched.
    #[must_use]
    pub fn from_record(record: ExecutionRecord) -> Self {
        Self {
            record,
            node_executions: FetchState::NotFetched,
        }
    }

    /// What was launched, and with which inputs.
    #[must_use]
    pub fn spec(&self) -> &ExecutionSpec {
        &self.record.spec
    }

    /// Node executions as of the latest sync.
    #[must_use]
    pub fn node_executions(&self) -> &FetchState<IndexMap<String, NodeExecution>> {
        &self.node_executions
    }

    /// One node execution by node id. `None` if unfetched or absent.
    #[must_use]
    pub fn node_execution(&self, node_id: &str) -> Option<&NodeExecution> {
        self.node_executions.fetched()?.get(node_id)
    }

    /// Mutable access to one node execution, e.g. to sync it individually.
    pub fn node_execution_mut(&mut self, node_id: &str) -> Option<&mut NodeExecution> {
        self.node_executions.fetched_mut()?.get_mut(node_id)
    }

    /// Ask the service to cancel this execution.
    ///
    /// Returns once the request is accepted; the local closure is unchanged.
    /// Call [`Execution::sync`] afterwards to observe `ABORTING` and `ABORTED`.
    pub async fn terminate(&self, client: &Client, cause: &str) -> Result<(), ExecutionError> {
        client.remote().terminate_execution(&self.record.id, cause).await?;
        tracing::info!(execution = %self.record.id, cause, "termination requested");
        Ok(())
    }

    /// List node executions matching `filters`, following every page.
    ///
    /// Returns a fresh map and leaves this handle's cache alone.
    pub async fn list_node_executions(
        &self,
        client: &Client,
        filters: &[Filter],
    ) -> Result<IndexMap<String, NodeExecution>, ExecutionError> {
        let remote = client.remote();
        let id = &self.record.id;
        let records =
            collect_pages(move |token| remote.list_node_executions(id, filters, token)).await?;
        Ok(records
            .into_iter()
            .map(|record| (record.id.node_id.clone(), NodeExecution::from_record(record)))
            .collect())
    }
}

#[async_trait]
impl Execution for WorkflowExecution {
    type Id = WorkflowExecutionIdentifier;
    type Phase = ExecutionPhase;
    type Record = ExecutionRecord;
    type Children = IndexMap<String, NodeExecution>;

    fn id(&self) -> &WorkflowExecutionIdentifier {
        &self.record.id
    }

    fn closure(&self) -> &ExecutionClosure<ExecutionPhase> {
        &self.record.closure
    }

    fn children_fetched(&self) -> bool {
        self.node_executions.is_fetched()
    }

    async fn fetch_record(&self, client: &Client) -> Result<ExecutionRecord, ExecutionError> {
        Ok(client.remote().get_execution(&self.record.id).await?)
    }

    async fn fetch_children(
        &self,
        client: &Client,
        _record: &ExecutionRecord,
    ) -> Result<IndexMap<String, NodeExecution>, ExecutionError> {
        let nodes = self.list_node_executions(client, &[]).await?;
        tracing::trace!(execution = %self.record.id, nodes = nodes.len(), "listed node executions");
        Ok(nodes)
    }

    fn commit(&mut self, record: ExecutionRecord, children: IndexMap<String, NodeExecution>) {
        self.record = record;
        self.node_executions = FetchState::Fetched(children);
    }
}
