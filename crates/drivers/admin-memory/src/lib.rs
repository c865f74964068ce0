#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skiff Admin Memory Driver
//!
//! In-memory admin service implementing the [`AdminService`] port.
//!
//! Holds definitions and executions in plain maps behind a `parking_lot`
//! mutex, paginates listings with a configurable page size, and counts every
//! call per operation so tests can assert exactly which remote requests a
//! client issued. Executions never progress on their own: tests move them
//! between phases with the `set_*` helpers.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use skiff_core::{
    ExecutionClosure, ExecutionFailure, ExecutionMetadata, ExecutionPhase, ExecutionRecord,
    ExecutionSpec, Identifier, NodeExecutionIdentifier, NodeExecutionPhase, NodeExecutionRecord,
    Phase, TaskExecutionIdentifier, TaskExecutionRecord, WorkflowExecutionIdentifier,
};
use skiff_ports::error::PortsError;
use skiff_ports::{AdminService, Comparator, Filter, Page};
use skiff_workflow::{CompiledWorkflowClosure, LaunchPlanRecord};

const DEFAULT_PAGE_SIZE: usize = 100;

/// Number of calls received per operation. One listing page is one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCounts {
    /// `get_workflow`
    pub get_workflow: usize,
    /// `get_launch_plan`
    pub get_launch_plan: usize,
    /// `get_execution`
    pub get_execution: usize,
    /// `get_node_execution`
    pub get_node_execution: usize,
    /// `get_task_execution`
    pub get_task_execution: usize,
    /// `list_node_executions`
    pub list_node_executions: usize,
    /// `list_task_executions`
    pub list_task_executions: usize,
    /// `launch_execution`
    pub launch_execution: usize,
    /// `terminate_execution`
    pub terminate_execution: usize,
}

impl CallCounts {
    /// Calls across all operations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.get_workflow
            + self.get_launch_plan
            + self.get_execution
            + self.get_node_execution
            + self.get_task_execution
            + self.list_node_executions
            + self.list_task_executions
            + self.launch_execution
            + self.terminate_execution
    }
}

#[derive(Default)]
struct State {
    workflows: HashMap<Identifier, CompiledWorkflowClosure>,
    launch_plans: HashMap<Identifier, LaunchPlanRecord>,
    executions: HashMap<WorkflowExecutionIdentifier, ExecutionRecord>,
    node_executions: IndexMap<NodeExecutionIdentifier, NodeExecutionRecord>,
    task_executions: IndexMap<TaskExecutionIdentifier, TaskExecutionRecord>,
    terminations: Vec<(WorkflowExecutionIdentifier, String)>,
    calls: CallCounts,
    /// Calls still to succeed before the pending failure fires.
    next_failure: Option<(usize, PortsError)>,
}

impl State {
    /// Count the call, then surface an injected failure if it is due.
    fn enter(&mut self, count: impl FnOnce(&mut CallCounts)) -> Result<(), PortsError> {
        count(&mut self.calls);
        match self.next_failure.take() {
            Some((0, err)) => Err(err),
            Some((skip, err)) => {
                self.next_failure = Some((skip - 1, err));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// In-memory admin service.
pub struct MemoryAdmin {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for MemoryAdmin {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdmin {
    /// An empty service with the default page size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set how many items a listing page holds. Zero is treated as one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    // ── Seeding ─────────────────────────────────────────────────────────

    /// Register a compiled workflow under its primary template's id.
    pub fn insert_workflow(&self, closure: CompiledWorkflowClosure) {
        let id = closure.primary.id.clone();
        self.state.lock().workflows.insert(id, closure);
    }

    /// Register a launch plan.
    pub fn insert_launch_plan(&self, record: LaunchPlanRecord) {
        self.state
            .lock()
            .launch_plans
            .insert(record.id.clone(), record);
    }

    /// Insert or replace a workflow execution.
    pub fn insert_execution(&self, record: ExecutionRecord) {
        self.state
            .lock()
            .executions
            .insert(record.id.clone(), record);
    }

    /// Insert or replace a node execution. Listing order is first-insert order.
    pub fn insert_node_execution(&self, record: NodeExecutionRecord) {
        self.state
            .lock()
            .node_executions
            .insert(record.id.clone(), record);
    }

    /// Insert or replace a task execution. Listing order is first-insert order.
    pub fn insert_task_execution(&self, record: TaskExecutionRecord) {
        self.state
            .lock()
            .task_executions
            .insert(record.id.clone(), record);
    }

    // ── Progress ────────────────────────────────────────────────────────

    /// Move a workflow execution to `phase`. Returns `false` if unknown.
    pub fn set_execution_phase(
        &self,
        id: &WorkflowExecutionIdentifier,
        phase: ExecutionPhase,
    ) -> bool {
        let mut state = self.state.lock();
        let Some(record) = state.executions.get_mut(id) else {
            return false;
        };
        touch(&mut record.closure, phase);
        true
    }

    /// Attach an error to a workflow execution. Returns `false` if unknown.
    pub fn set_execution_error(
        &self,
        id: &WorkflowExecutionIdentifier,
        error: ExecutionFailure,
    ) -> bool {
        let mut state = self.state.lock();
        let Some(record) = state.executions.get_mut(id) else {
            return false;
        };
        record.closure.error = Some(error);
        true
    }

    /// Move a node execution to `phase`. Returns `false` if unknown.
    pub fn set_node_execution_phase(
        &self,
        id: &NodeExecutionIdentifier,
        phase: NodeExecutionPhase,
    ) -> bool {
        let mut state = self.state.lock();
        let Some(record) = state.node_executions.get_mut(id) else {
            return false;
        };
        touch(&mut record.closure, phase);
        true
    }

    /// Move a task execution to `phase`. Returns `false` if unknown.
    pub fn set_task_execution_phase(
        &self,
        id: &TaskExecutionIdentifier,
        phase: ExecutionPhase,
    ) -> bool {
        let mut state = self.state.lock();
        let Some(record) = state.task_executions.get_mut(id) else {
            return false;
        };
        touch(&mut record.closure, phase);
        true
    }

    /// Make the next call, whatever the operation, fail with `err`.
    pub fn fail_next(&self, err: PortsError) {
        self.fail_after(0, err);
    }

    /// Let `successes` calls through, then fail the one after with `err`.
    pub fn fail_after(&self, successes: usize, err: PortsError) {
        self.state.lock().next_failure = Some((successes, err));
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// Zero every counter.
    pub fn reset_calls(&self) {
        self.state.lock().calls = CallCounts::default();
    }

    /// Termination requests received, with their causes, in order.
    #[must_use]
    pub fn terminations(&self) -> Vec<(WorkflowExecutionIdentifier, String)> {
        self.state.lock().terminations.clone()
    }

    fn page<T: Clone>(&self, items: &[T], token: Option<&str>) -> Result<Page<T>, PortsError> {
        let start = match token {
            None | Some("") => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                PortsError::remote("INVALID_ARGUMENT", format!("bad token {token}"))
            })?,
        };
        let end = start.saturating_add(self.page_size).min(items.len());
        let slice = items.get(start..end).unwrap_or_default().to_vec();
        Ok(if end < items.len() {
            Page::with_next(slice, end.to_string())
        } else {
            Page::last(slice)
        })
    }
}

fn touch<P>(closure: &mut ExecutionClosure<P>, phase: P) {
    let now = chrono::Utc::now();
    closure.phase = phase;
    closure.started_at.get_or_insert(now);
    closure.updated_at = Some(now);
}

fn node_matches(record: &NodeExecutionRecord, filter: &Filter) -> Result<bool, PortsError> {
    let actual = match filter.field.as_str() {
        "node_id" => record.id.node_id.clone(),
        "phase" => record.closure.phase.to_string(),
        other => {
            return Err(PortsError::remote(
                "INVALID_ARGUMENT",
                format!("unsupported filter field {other}"),
            ));
        }
    };
    match filter.comparator {
        Comparator::Eq => Ok(actual == filter.value),
        Comparator::Neq => Ok(actual != filter.value),
        Comparator::ValueIn => Ok(filter.value.split(';').any(|v| v == actual)),
        other => Err(PortsError::remote(
            "INVALID_ARGUMENT",
            format!("unsupported comparator {}", other.as_str()),
        )),
    }
}

#[async_trait]
impl AdminService for MemoryAdmin {
    async fn get_workflow(&self, id: &Identifier) -> Result<CompiledWorkflowClosure, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.get_workflow += 1)?;
        tracing::trace!(workflow = %id, "get_workflow");
        state
            .workflows
            .get(id)
            .cloned()
            .ok_or_else(|| PortsError::not_found("workflow", id))
    }

    async fn get_launch_plan(&self, id: &Identifier) -> Result<LaunchPlanRecord, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.get_launch_plan += 1)?;
        tracing::trace!(launch_plan = %id, "get_launch_plan");
        state
            .launch_plans
            .get(id)
            .cloned()
            .ok_or_else(|| PortsError::not_found("launch plan", id))
    }

    async fn get_execution(
        &self,
        id: &WorkflowExecutionIdentifier,
    ) -> Result<ExecutionRecord, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.get_execution += 1)?;
        tracing::trace!(execution = %id, "get_execution");
        state
            .executions
            .get(id)
            .cloned()
            .ok_or_else(|| PortsError::not_found("execution", id))
    }

    async fn get_node_execution(
        &self,
        id: &NodeExecutionIdentifier,
    ) -> Result<NodeExecutionRecord, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.get_node_execution += 1)?;
        tracing::trace!(node_execution = %id, "get_node_execution");
        state
            .node_executions
            .get(id)
            .cloned()
            .ok_or_else(|| PortsError::not_found("node execution", id))
    }

    async fn get_task_execution(
        &self,
        id: &TaskExecutionIdentifier,
    ) -> Result<TaskExecutionRecord, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.get_task_execution += 1)?;
        tracing::trace!(task_execution = %id, "get_task_execution");
        state
            .task_executions
            .get(id)
            .cloned()
            .ok_or_else(|| PortsError::not_found("task execution", id))
    }

    async fn list_node_executions(
        &self,
        execution_id: &WorkflowExecutionIdentifier,
        filters: &[Filter],
        token: Option<String>,
    ) -> Result<Page<NodeExecutionRecord>, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.list_node_executions += 1)?;
        tracing::trace!(execution = %execution_id, filters = filters.len(), "list_node_executions");
        if !state.executions.contains_key(execution_id) {
            return Err(PortsError::not_found("execution", execution_id));
        }
        let mut matching = Vec::new();
        for record in state.node_executions.values() {
            if &record.id.execution_id != execution_id {
                continue;
            }
            let mut keep = true;
            for filter in filters {
                keep &= node_matches(record, filter)?;
            }
            if keep {
                matching.push(record.clone());
            }
        }
        self.page(&matching, token.as_deref())
    }

    async fn list_task_executions(
        &self,
        node_execution_id: &NodeExecutionIdentifier,
        token: Option<String>,
    ) -> Result<Page<TaskExecutionRecord>, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.list_task_executions += 1)?;
        tracing::trace!(node_execution = %node_execution_id, "list_task_executions");
        if !state.node_executions.contains_key(node_execution_id) {
            return Err(PortsError::not_found("node execution", node_execution_id));
        }
        let matching: Vec<_> = state
            .task_executions
            .values()
            .filter(|record| &record.id.node_execution_id == node_execution_id)
            .cloned()
            .collect();
        self.page(&matching, token.as_deref())
    }

    async fn launch_execution(
        &self,
        launch_plan_id: &Identifier,
        project: &str,
        domain: &str,
        inputs: BTreeMap<String, serde_json::Value>,
    ) -> Result<WorkflowExecutionIdentifier, PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.launch_execution += 1)?;
        let plan = state
            .launch_plans
            .get(launch_plan_id)
            .ok_or_else(|| PortsError::not_found("launch plan", launch_plan_id))?;

        let mut resolved: BTreeMap<String, serde_json::Value> = plan
            .spec
            .default_inputs
            .iter()
            .filter_map(|(name, param)| Some((name.clone(), param.default.clone()?)))
            .collect();
        resolved.extend(inputs);
        resolved.extend(plan.spec.fixed_inputs.clone());

        let mut name = uuid::Uuid::new_v4().simple().to_string();
        name.truncate(19);
        let id = WorkflowExecutionIdentifier::new(project, domain, format!("f{name}"));

        let mut closure = ExecutionClosure::new(ExecutionPhase::Queued);
        closure.updated_at = Some(chrono::Utc::now());
        let record = ExecutionRecord {
            id: id.clone(),
            spec: ExecutionSpec {
                launch_plan: launch_plan_id.clone(),
                inputs: resolved,
                metadata: ExecutionMetadata::default(),
            },
            closure,
        };
        state.executions.insert(id.clone(), record);
        tracing::trace!(launch_plan = %launch_plan_id, execution = %id, "launch_execution");
        Ok(id)
    }

    async fn terminate_execution(
        &self,
        id: &WorkflowExecutionIdentifier,
        cause: &str,
    ) -> Result<(), PortsError> {
        let mut state = self.state.lock();
        state.enter(|c| c.terminate_execution += 1)?;
        tracing::trace!(execution = %id, cause, "terminate_execution");
        let record = state
            .executions
            .get_mut(id)
            .ok_or_else(|| PortsError::not_found("execution", id))?;
        if !record.closure.phase.is_terminal() {
            touch(&mut record.closure, ExecutionPhase::Aborting);
        }
        state.terminations.push((id.clone(), cause.to_owned()));
        Ok(())
    }
}
