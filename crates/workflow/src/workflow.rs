//! The promoted, fully linked workflow.

use std::collections::BTreeSet;

use skiff_core::Identifier;

use crate::binding::Binding;
use crate::graph::NodeGraph;
use crate::interface::TypedInterface;
use crate::node::Node;
use crate::template::{WorkflowMetadata, WorkflowMetadataDefaults};

/// A named, versioned DAG of nodes with a typed interface.
///
/// Built by promotion (see [`Workflow::promote`]) and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub(crate) id: Identifier,
    pub(crate) interface: TypedInterface,
    pub(crate) graph: NodeGraph,
    pub(crate) outputs: Vec<Binding>,
    pub(crate) metadata: WorkflowMetadata,
    pub(crate) metadata_defaults: WorkflowMetadataDefaults,
}

impl Workflow {
    /// Rename the workflow, e.g. to the identifier it was requested under.
    #[must_use]
    pub fn with_id(mut self, id: Identifier) -> Self {
        self.id = id;
        self
    }

    /// Identifier.
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Typed interface.
    #[must_use]
    pub fn interface(&self) -> &TypedInterface {
        &self.interface
    }

    /// Output bindings, with start-sentinel promises already rewritten.
    #[must_use]
    pub fn outputs(&self) -> &[Binding] {
        &self.outputs
    }

    /// Execution settings.
    #[must_use]
    pub fn metadata(&self) -> &WorkflowMetadata {
        &self.metadata
    }

    /// Node defaults.
    #[must_use]
    pub fn metadata_defaults(&self) -> &WorkflowMetadataDefaults {
        &self.metadata_defaults
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    /// All nodes in declaration order. Sentinels are never included.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.nodes()
    }

    /// Ids of all nodes, in declaration order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes().filter_map(Node::id).collect()
    }

    /// Nodes that must finish before `id` starts.
    #[must_use]
    pub fn upstream_nodes(&self, id: &str) -> Vec<&Node> {
        self.graph.predecessors(id)
    }

    /// Nodes that wait on `id`.
    #[must_use]
    pub fn downstream_nodes(&self, id: &str) -> Vec<&Node> {
        self.graph.successors(id)
    }

    /// Nodes with no upstream dependency.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<&Node> {
        self.graph.entry_nodes()
    }

    /// Every `(upstream, downstream)` id pair.
    #[must_use]
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.graph.edge_set()
    }

    /// Nodes ordered so that every node follows its upstream nodes.
    ///
    /// Compiled templates are trusted to be acyclic; `None` only if that
    /// trust was misplaced.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<&Node>> {
        self.graph.topological_order()
    }

    /// Distinct tasks, workflows and launch plans referenced by this
    /// workflow's own nodes, in first-reference order.
    #[must_use]
    pub fn upstream_entities(&self) -> Vec<&Identifier> {
        let mut seen = BTreeSet::new();
        self.nodes()
            .filter_map(|node| node.target().entity_id())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
