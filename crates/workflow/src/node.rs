//! Promoted workflow nodes.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use skiff_core::Identifier;

use crate::binding::{Binding, OutputReference};
use crate::condition::BooleanExpression;
use crate::error::WorkflowError;
use crate::interface::TypedInterface;
use crate::template::{Alias, NodeMetadata, TaskTemplate};
use crate::workflow::Workflow;

/// Identity of a node: not yet assigned, or a fixed id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// No id yet. Two unbound nodes are never equal.
    Unbound,
    /// Assigned id. Immutable from here on.
    Bound(String),
}

impl NodeKey {
    /// The bound id, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Unbound => None,
            Self::Bound(id) => Some(id),
        }
    }
}

/// The single executable reference a node wraps.
#[derive(Debug, Clone)]
pub enum NodeTarget {
    /// A task template.
    Task(Arc<TaskTemplate>),
    /// An inlined sub-workflow.
    Workflow(Arc<Workflow>),
    /// A launch plan, resolved only when launched.
    LaunchPlan(Identifier),
    /// A conditional branch.
    Branch(BranchNode),
}

impl NodeTarget {
    /// Short name of the variant, for logs and errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Task(_) => "task",
            Self::Workflow(_) => "workflow",
            Self::LaunchPlan(_) => "launch_plan",
            Self::Branch(_) => "branch",
        }
    }

    /// Identifier of the referenced entity; `None` for branches.
    #[must_use]
    pub fn entity_id(&self) -> Option<&Identifier> {
        match self {
            Self::Task(task) => Some(&task.id),
            Self::Workflow(wf) => Some(wf.id()),
            Self::LaunchPlan(id) => Some(id),
            Self::Branch(_) => None,
        }
    }
}

/// One guarded case of a branch.
#[derive(Debug, Clone)]
pub struct IfBlock {
    /// Guard.
    pub condition: BooleanExpression,
    /// Node run when the guard holds.
    pub then_node: Box<Node>,
}

/// Ordered cases plus an optional fallback.
#[derive(Debug, Clone)]
pub struct IfElseBlock {
    /// First case.
    pub case: IfBlock,
    /// Further cases, in declaration order.
    pub other: Vec<IfBlock>,
    /// Fallback node.
    pub else_node: Option<Box<Node>>,
    /// Error raised when nothing matches and there is no fallback.
    pub error: Option<String>,
}

/// A conditional construct. Its targets are embedded nodes, not members of
/// the enclosing workflow's node set.
#[derive(Debug, Clone)]
pub struct BranchNode {
    /// The cases.
    pub if_else: IfElseBlock,
}

impl BranchNode {
    /// Reachable targets in declaration order: the first case, the other
    /// cases, then the else node.
    pub fn targets(&self) -> impl Iterator<Item = &Node> {
        let if_else = &self.if_else;
        std::iter::once(if_else.case.then_node.as_ref())
            .chain(if_else.other.iter().map(|block| block.then_node.as_ref()))
            .chain(if_else.else_node.as_deref())
    }
}

/// A step in a workflow graph.
///
/// Upstream linkage lives in the owning graph, see
/// [`Workflow::upstream_nodes`](crate::Workflow::upstream_nodes). Equality and
/// hashing use the bound id only.
#[derive(Debug, Clone)]
pub struct Node {
    key: NodeKey,
    metadata: NodeMetadata,
    inputs: Vec<Binding>,
    output_aliases: Vec<Alias>,
    upstream_ids: Vec<String>,
    target: NodeTarget,
}

impl Node {
    /// An unbound node wrapping `target`.
    #[must_use]
    pub fn new(target: NodeTarget) -> Self {
        Self {
            key: NodeKey::Unbound,
            metadata: NodeMetadata::default(),
            inputs: Vec::new(),
            output_aliases: Vec::new(),
            upstream_ids: Vec::new(),
            target,
        }
    }

    /// Set the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append an input binding.
    #[must_use]
    pub fn with_input(mut self, binding: Binding) -> Self {
        self.inputs.push(binding);
        self
    }

    /// Set the output aliases.
    #[must_use]
    pub fn with_output_aliases(mut self, aliases: Vec<Alias>) -> Self {
        self.output_aliases = aliases;
        self
    }

    /// Record the upstream ids declared by the template.
    #[must_use]
    pub fn with_upstream_ids(mut self, ids: Vec<String>) -> Self {
        self.upstream_ids = ids;
        self
    }

    /// Assign the node's id. Fails if one is already assigned.
    pub fn assign_id(&mut self, id: impl Into<String>) -> Result<(), WorkflowError> {
        if let NodeKey::Bound(existing) = &self.key {
            return Err(WorkflowError::AlreadyBound(existing.clone()));
        }
        self.key = NodeKey::Bound(id.into());
        Ok(())
    }

    /// Node identity.
    #[must_use]
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// The bound id, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.key.id()
    }

    /// Returns `true` once an id has been assigned.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self.key, NodeKey::Bound(_))
    }

    /// Execution settings.
    #[must_use]
    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    /// Input bindings, with start-sentinel promises already rewritten.
    #[must_use]
    pub fn inputs(&self) -> &[Binding] {
        &self.inputs
    }

    /// Output aliases.
    #[must_use]
    pub fn output_aliases(&self) -> &[Alias] {
        &self.output_aliases
    }

    /// Upstream ids as declared, sentinels excluded.
    #[must_use]
    pub fn upstream_ids(&self) -> &[String] {
        &self.upstream_ids
    }

    /// The executable reference.
    #[must_use]
    pub fn target(&self) -> &NodeTarget {
        &self.target
    }

    /// Interface of the target, when it is known locally.
    #[must_use]
    pub fn interface(&self) -> Option<&TypedInterface> {
        match &self.target {
            NodeTarget::Task(task) => Some(&task.interface),
            NodeTarget::Workflow(wf) => Some(wf.interface()),
            NodeTarget::LaunchPlan(_) | NodeTarget::Branch(_) => None,
        }
    }

    /// Reference to one of this node's outputs, for binding a downstream input.
    pub fn output(&self, var: &str) -> Result<OutputReference, WorkflowError> {
        let id = self.id().ok_or(WorkflowError::Unbound)?;
        if let Some(interface) = self.interface()
            && !interface.has_output(var)
        {
            return Err(WorkflowError::UnknownOutput {
                node_id: id.to_owned(),
                var: var.to_owned(),
            });
        }
        Ok(OutputReference::new(id, var))
    }

    /// Nodes promoted from a compiled template cannot be overridden.
    pub fn with_overrides(&self) -> Result<Self, WorkflowError> {
        Err(WorkflowError::Unsupported("node overrides"))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (&self.key, &other.key) {
            (NodeKey::Bound(a), NodeKey::Bound(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
