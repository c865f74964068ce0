#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skiff Core
//!
//! Value types shared by every Skiff crate.
//!
//! - **Identifiers**: [`Identifier`] names a registered definition (task,
//!   workflow or launch plan); [`WorkflowExecutionIdentifier`],
//!   [`NodeExecutionIdentifier`] and [`TaskExecutionIdentifier`] name
//!   executions of those definitions.
//! - **Phases**: [`ExecutionPhase`] (workflow and task executions) and
//!   [`NodeExecutionPhase`] (adds `SKIPPED`), both implementing [`Phase`].
//! - **Records**: [`ExecutionRecord`], [`NodeExecutionRecord`] and
//!   [`TaskExecutionRecord`] as reported by the remote service, each carrying an
//!   [`ExecutionClosure`].
//! - **Faults**: [`FaultKind`] classifies every error raised by the Skiff crates.
//!
//! All types here are immutable values; nothing in this crate talks to the
//! network.

pub mod error;
pub mod execution;
pub mod id;
pub mod phase;

pub use error::FaultKind;
pub use execution::{
    ExecutionClosure, ExecutionFailure, ExecutionMetadata, ExecutionMode, ExecutionRecord,
    ExecutionSpec, FailureKind, NodeExecutionMetadata, NodeExecutionRecord, TaskExecutionRecord,
    TaskLog,
};
pub use id::{
    Identifier, NodeExecutionIdentifier, ResourceType, TaskExecutionIdentifier,
    WorkflowExecutionIdentifier,
};
pub use phase::{ExecutionPhase, NodeExecutionPhase, Phase};

/// Reserved id of the synthetic start node injected by the remote compiler.
pub const START_NODE_ID: &str = "start-node";

/// Reserved id of the synthetic end node injected by the remote compiler.
pub const END_NODE_ID: &str = "end-node";

/// Returns `true` if `node_id` names one of the two compiler sentinels.
#[must_use]
pub fn is_sentinel_node(node_id: &str) -> bool {
    node_id == START_NODE_ID || node_id == END_NODE_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_recognised() {
        assert!(is_sentinel_node(START_NODE_ID));
        assert!(is_sentinel_node(END_NODE_ID));
        assert!(!is_sentinel_node("n0"));
        assert!(!is_sentinel_node("start"));
    }
}
