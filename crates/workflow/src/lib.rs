#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skiff Workflow
//!
//! Client-side reconstruction of workflow graphs from the compiled templates
//! returned by the remote service.
//!
//! - [`template`]: the flat records as transmitted ([`WorkflowTemplate`],
//!   [`NodeRecord`], [`TaskTemplate`], [`CompiledWorkflowClosure`]) and the
//!   variant resolver [`NodeRecord::kind`]
//! - [`Workflow::promote`]: turns a template plus sub-workflow and task tables
//!   into a linked [`Workflow`], eliding the start and end sentinels and
//!   rewriting start-relative bindings to [`PromiseSource::GlobalInput`]
//! - [`Workflow::sub_workflows`]: nested workflows in declaration order
//! - [`GraphBuilder`] for linking [`Node`]s by handle
//! - [`Notification`] and [`LaunchPlanRecord`] for launch plans

pub mod binding;
pub mod condition;
pub mod error;
pub mod graph;
pub mod interface;
pub mod launch_plan;
pub mod node;
pub mod notification;
mod promote;
pub mod template;
mod walker;
pub mod workflow;

pub use binding::{
    Binding, BindingData, BindingRecord, OutputReference, Promise, PromiseSource,
};
pub use condition::{
    BooleanExpression, ComparisonOperator, ConjunctionOperator, Operand, Primitive,
};
pub use error::WorkflowError;
pub use graph::{GraphBuilder, NodeGraph, NodeHandle};
pub use interface::{LiteralType, SimpleType, TypedInterface, Variable};
pub use launch_plan::{LaunchPlanRecord, LaunchPlanSpec, LaunchPlanState, Parameter};
pub use node::{BranchNode, IfBlock, IfElseBlock, Node, NodeKey, NodeTarget};
pub use notification::{Notification, NotificationRecord, NotificationTarget, RecipientsRecord};
pub use template::{
    CompiledWorkflowClosure, NodeKindRecord, NodeMetadata, NodeRecord, TaskTemplate,
    WorkflowTemplate,
};
pub use workflow::Workflow;

/// Serde helper for `Option<Duration>` serialized as milliseconds.
pub(crate) mod serde_duration_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Serialize an `Option<Duration>` as an optional integer of milliseconds.
    pub fn serialize<S: Serializer>(duration: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(s),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional integer of milliseconds into `Option<Duration>`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(d)?;
        Ok(opt.map(Duration::from_millis))
    }
}
