//! Task execution handle.

use async_trait::async_trait;
use skiff_core::{
    ExecutionClosure, ExecutionPhase, TaskExecutionIdentifier, TaskExecutionRecord, TaskLog,
};

use crate::client::Client;
use crate::engine::Execution;
use crate::error::ExecutionError;

/// One attempt at running a task. Has no child collections.
#[derive(Debug, Clone)]
pub struct TaskExecution {
    record: TaskExecutionRecord,
}

impl TaskExecution {
    /// Wrap a record.
    #[must_use]
    pub fn from_record(record: TaskExecutionRecord) -> Self {
        Self { record }
    }

    /// Zero-based retry attempt.
    #[must_use]
    pub fn retry_attempt(&self) -> u32 {
        self.record.id.retry_attempt
    }

    /// Log links reported by the attempt.
    #[must_use]
    pub fn logs(&self) -> &[TaskLog] {
        &self.record.logs
    }

    /// Returns `true` if the attempt spawned node executions of its own.
    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.record.is_parent
    }
}

#[async_trait]
impl Execution for TaskExecution {
    type Id = TaskExecutionIdentifier;
    type Phase = ExecutionPhase;
    type Record = TaskExecutionRecord;
    type Children = ();

    fn id(&self) -> &TaskExecutionIdentifier {
        &self.record.id
    }

    fn closure(&self) -> &ExecutionClosure<ExecutionPhase> {
        &self.record.closure
    }

    fn children_fetched(&self) -> bool {
        true
    }

    async fn fetch_record(&self, client: &Client) -> Result<TaskExecutionRecord, ExecutionError> {
        Ok(client.remote().get_task_execution(&self.record.id).await?)
    }

    async fn fetch_children(
        &self,
        _client: &Client,
        _record: &TaskExecutionRecord,
    ) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn commit(&mut self, record: TaskExecutionRecord, (): ()) {
        self.record = record;
    }
}
