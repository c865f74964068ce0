//! Node graph built on `petgraph`.
//!
//! [`GraphBuilder`] is the only way to link nodes. Edges are added between
//! [`NodeHandle`]s, so two unbound nodes stay distinct while being wired up.
//! An edge `from -> to` means `from` is upstream of `to`.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::WorkflowError;
use crate::node::Node;

/// Opaque reference to a node inside a [`GraphBuilder`] or [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(NodeIndex);

/// Incrementally assembles a [`NodeGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DiGraph<Node, ()>,
    index_map: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, bound or not.
    ///
    /// Fails if the node is bound to an id already present.
    pub fn add_node(&mut self, node: Node) -> Result<NodeHandle, WorkflowError> {
        if let Some(id) = node.id()
            && self.index_map.contains_key(id)
        {
            return Err(WorkflowError::DuplicateNodeId(id.to_owned()));
        }
        let id = node.id().map(str::to_owned);
        let idx = self.graph.add_node(node);
        if let Some(id) = id {
            self.index_map.insert(id, idx);
        }
        Ok(NodeHandle(idx))
    }

    /// Make `from` an upstream dependency of `to`. Repeated edges collapse.
    pub fn add_edge(&mut self, from: NodeHandle, to: NodeHandle) -> Result<(), WorkflowError> {
        self.check(from)?;
        self.check(to)?;
        self.graph.update_edge(from.0, to.0, ());
        Ok(())
    }

    /// Assign an id to a node that was added unbound.
    pub fn assign_id(
        &mut self,
        handle: NodeHandle,
        id: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.check(handle)?;
        let id = id.into();
        if self.index_map.contains_key(&id) {
            return Err(WorkflowError::DuplicateNodeId(id));
        }
        self.graph[handle.0].assign_id(id.clone())?;
        self.index_map.insert(id, handle.0);
        Ok(())
    }

    /// Handle of the node bound to `id`.
    #[must_use]
    pub fn handle(&self, id: &str) -> Option<NodeHandle> {
        self.index_map.get(id).copied().map(NodeHandle)
    }

    /// The node behind `handle`.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.graph.node_weight(handle.0)
    }

    /// Number of nodes added so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Freeze the graph. Every node must be bound by now.
    pub fn finish(self) -> Result<NodeGraph, WorkflowError> {
        if self.graph.node_weights().any(|node| !node.is_bound()) {
            return Err(WorkflowError::Unbound);
        }
        Ok(NodeGraph {
            graph: self.graph,
            index_map: self.index_map,
        })
    }

    fn check(&self, handle: NodeHandle) -> Result<(), WorkflowError> {
        if self.graph.node_weight(handle.0).is_some() {
            Ok(())
        } else {
            Err(WorkflowError::UnknownHandle)
        }
    }
}

/// An immutable graph of bound nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    graph: DiGraph<Node, ()>,
    index_map: HashMap<String, NodeIndex>,
}

impl NodeGraph {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_map.get(id).map(|&idx| &self.graph[idx])
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Direct upstream nodes of `id`, in insertion order.
    #[must_use]
    pub fn predecessors(&self, id: &str) -> Vec<&Node> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct downstream nodes of `id`, in insertion order.
    #[must_use]
    pub fn successors(&self, id: &str) -> Vec<&Node> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes with no upstream dependency.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<&Node> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Every `(upstream, downstream)` id pair.
    #[must_use]
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .filter_map(|(from, to)| {
                Some((
                    self.graph[from].id()?.to_owned(),
                    self.graph[to].id()?.to_owned(),
                ))
            })
            .collect()
    }

    /// Nodes ordered so that every node follows its upstream nodes.
    ///
    /// Returns `None` if the graph has a cycle.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<&Node>> {
        let sorted = algo::toposort(&self.graph, None).ok()?;
        Some(sorted.into_iter().map(|idx| &self.graph[idx]).collect())
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&Node> {
        let Some(&idx) = self.index_map.get(id) else {
            return Vec::new();
        };
        let mut indices: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.graph[i]).collect()
    }
}
