//! Launch plans: fetching them and launching executions from them.

use std::collections::BTreeMap;

use skiff_core::{Identifier, ResourceType};
use skiff_workflow::{LaunchPlanRecord, LaunchPlanSpec, LaunchPlanState, Notification, Workflow};

use crate::client::Client;
use crate::error::ExecutionError;
use crate::workflow_execution::WorkflowExecution;

/// A registered launch plan.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    record: LaunchPlanRecord,
}

impl LaunchPlan {
    /// Wrap a record.
    #[must_use]
    pub fn from_record(record: LaunchPlanRecord) -> Self {
        Self { record }
    }

    /// Fetch by coordinates. Falls back to the configured default version.
    pub async fn fetch(
        client: &Client,
        project: &str,
        domain: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<Self, ExecutionError> {
        let id = client.identifier(ResourceType::LaunchPlan, project, domain, name, version)?;
        Self::fetch_by_id(client, &id).await
    }

    /// Fetch by identifier.
    pub async fn fetch_by_id(client: &Client, id: &Identifier) -> Result<Self, ExecutionError> {
        let record = client.remote().get_launch_plan(id).await?;
        tracing::debug!(
            launch_plan = %id,
            workflow = %record.spec.workflow_id,
            "fetched launch plan"
        );
        Ok(Self::from_record(record))
    }

    /// Launch plan identifier.
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.record.id
    }

    /// The workflow this plan launches.
    #[must_use]
    pub fn workflow_id(&self) -> &Identifier {
        &self.record.spec.workflow_id
    }

    /// Inputs, defaults and notification settings.
    #[must_use]
    pub fn spec(&self) -> &LaunchPlanSpec {
        &self.record.spec
    }

    /// Whether schedules attached to the plan are live.
    #[must_use]
    pub fn state(&self) -> LaunchPlanState {
        self.record.state
    }

    /// Validated notifications.
    pub fn notifications(&self) -> Result<Vec<Notification>, ExecutionError> {
        Ok(self.record.spec.notifications()?)
    }

    /// Launch an execution in `project`/`domain`.
    ///
    /// Required inputs without a default must be present in `inputs`; the
    /// service resolves defaults and fixed inputs. The returned handle carries
    /// whatever phase the service reports for the new execution.
    pub async fn launch(
        &self,
        client: &Client,
        project: &str,
        domain: &str,
        inputs: BTreeMap<String, serde_json::Value>,
    ) -> Result<WorkflowExecution, ExecutionError> {
        let missing = self.record.spec.missing_inputs(&inputs);
        if !missing.is_empty() {
            return Err(ExecutionError::MissingInputs {
                launch_plan: self.record.id.clone(),
                inputs: missing.into_iter().map(str::to_owned).collect(),
            });
        }

        let execution_id = client
            .remote()
            .launch_execution(&self.record.id, project, domain, inputs)
            .await?;
        tracing::info!(launch_plan = %self.record.id, execution = %execution_id, "launched");
        client.fetch_execution_by_id(&execution_id).await
    }

    /// Launch into the configured default project and domain, or the plan's
    /// own when none is configured.
    pub async fn launch_default(
        &self,
        client: &Client,
        inputs: BTreeMap<String, serde_json::Value>,
    ) -> Result<WorkflowExecution, ExecutionError> {
        let config = client.config();
        let project = config
            .default_project
            .as_deref()
            .unwrap_or(&self.record.id.project);
        let domain = config
            .default_domain
            .as_deref()
            .unwrap_or(&self.record.id.domain);
        self.launch(client, project, domain, inputs).await
    }

    /// Fetch and promote the workflow this plan launches.
    pub async fn fetch_workflow(&self, client: &Client) -> Result<Workflow, ExecutionError> {
        client.fetch_workflow_by_id(self.workflow_id()).await
    }
}
