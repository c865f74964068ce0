#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skiff Execution
//!
//! Pollable handles to remote executions and the client that produces them.
//!
//! - [`Client`]: the explicit context carrying the [`AdminService`] and
//!   [`ClientConfig`] defaults; every network-bound call takes one
//! - [`Execution`]: the shared sync protocol; [`Execution::sync`] is a no-op
//!   once a handle is terminal and its children are fetched
//! - [`WorkflowExecution`], [`NodeExecution`], [`TaskExecution`]: handles
//!   whose child collections are [`FetchState`]s, so "never fetched" and
//!   "fetched, empty" stay distinct
//! - [`LaunchPlan`]: fetch a launch plan and launch executions from it
//!
//! There is no background polling. Callers drive every refresh, and a handle
//! shared between tasks must be synchronized by its owner.
//!
//! [`AdminService`]: skiff_ports::AdminService

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod launch_plan;
pub mod node_execution;
pub mod task_execution;
pub mod workflow_execution;

pub use client::Client;
pub use config::ClientConfig;
pub use engine::{Execution, SyncOutcome};
pub use error::ExecutionError;
pub use fetch::FetchState;
pub use launch_plan::LaunchPlan;
pub use node_execution::{NodeChildren, NodeExecution};
pub use task_execution::TaskExecution;
pub use workflow_execution::WorkflowExecution;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn handles_are_send() {
        assert_send::<WorkflowExecution>();
        assert_send::<NodeExecution>();
        assert_send::<TaskExecution>();
        assert_send::<Client>();
    }
}
