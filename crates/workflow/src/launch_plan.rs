//! Launch-plan records: a versioned pointer to a workflow plus default and
//! fixed inputs, resolved by the remote service at launch time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skiff_core::Identifier;

use crate::error::WorkflowError;
use crate::interface::Variable;
use crate::notification::{Notification, NotificationRecord};

/// A launch-plan input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Declared type.
    pub var: Variable,
    /// Value used when the caller supplies none.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Whether the caller must supply a value when there is no default.
    #[serde(default)]
    pub required: bool,
}

/// Whether a launch plan's schedule is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchPlanState {
    /// Not scheduled.
    #[default]
    Inactive,
    /// Scheduled.
    Active,
}

/// What a launch plan launches, and with what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchPlanSpec {
    /// The workflow launched.
    pub workflow_id: Identifier,
    /// Overridable inputs.
    #[serde(default)]
    pub default_inputs: BTreeMap<String, Parameter>,
    /// Inputs callers cannot override.
    #[serde(default)]
    pub fixed_inputs: BTreeMap<String, serde_json::Value>,
    /// Notifications attached to every execution.
    #[serde(default)]
    pub notifications: Vec<NotificationRecord>,
}

impl LaunchPlanSpec {
    /// Required inputs with no default that `inputs` does not supply, sorted.
    #[must_use]
    pub fn missing_inputs(&self, inputs: &BTreeMap<String, serde_json::Value>) -> Vec<&str> {
        self.default_inputs
            .iter()
            .filter(|(name, param)| {
                param.required && param.default.is_none() && !inputs.contains_key(*name)
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Validated notifications.
    pub fn notifications(&self) -> Result<Vec<Notification>, WorkflowError> {
        self.notifications
            .iter()
            .cloned()
            .map(Notification::try_from)
            .collect()
    }
}

/// A registered launch plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchPlanRecord {
    /// Launch-plan identifier.
    pub id: Identifier,
    /// Specification.
    pub spec: LaunchPlanSpec,
    /// Schedule state.
    #[serde(default)]
    pub state: LaunchPlanState,
}
