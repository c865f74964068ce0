//! Promotion: compiled template records to a linked [`Workflow`].
//!
//! Runs in two passes over the non-sentinel records. The first resolves every
//! record into a bound [`Node`] and registers it with a [`GraphBuilder`]; the
//! second links each node to its declared upstream nodes. Inline sub-workflows
//! are promoted recursively with the same lookup tables and shared by
//! identifier within one promotion. Any error discards the partial graph.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use skiff_core::{Identifier, is_sentinel_node};

use crate::binding::BindingRecord;
use crate::error::WorkflowError;
use crate::graph::GraphBuilder;
use crate::node::{BranchNode, IfBlock, IfElseBlock, Node, NodeTarget};
use crate::template::{
    BranchNodeRecord, CompiledWorkflowClosure, IfBlockRecord, NodeKindRecord, NodeRecord,
    TaskTemplate, WorkflowTemplate,
};
use crate::workflow::Workflow;

impl Workflow {
    /// Promote `template`, resolving references through the two tables.
    pub fn promote(
        template: &WorkflowTemplate,
        sub_workflows: &HashMap<Identifier, WorkflowTemplate>,
        tasks: &HashMap<Identifier, TaskTemplate>,
    ) -> Result<Self, WorkflowError> {
        Promoter::new(sub_workflows, tasks).workflow(template)
    }

    /// Promote the primary template of a compiled closure.
    pub fn from_closure(closure: &CompiledWorkflowClosure) -> Result<Self, WorkflowError> {
        Self::promote(
            &closure.primary,
            &closure.sub_workflow_table(),
            &closure.task_table(),
        )
    }
}

struct Promoter<'a> {
    sub_workflows: &'a HashMap<Identifier, WorkflowTemplate>,
    tasks: &'a HashMap<Identifier, TaskTemplate>,
    promoted_workflows: HashMap<Identifier, Arc<Workflow>>,
    promoted_tasks: HashMap<Identifier, Arc<TaskTemplate>>,
    in_progress: HashSet<Identifier>,
}

impl<'a> Promoter<'a> {
    fn new(
        sub_workflows: &'a HashMap<Identifier, WorkflowTemplate>,
        tasks: &'a HashMap<Identifier, TaskTemplate>,
    ) -> Self {
        Self {
            sub_workflows,
            tasks,
            promoted_workflows: HashMap::new(),
            promoted_tasks: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn workflow(&mut self, template: &WorkflowTemplate) -> Result<Workflow, WorkflowError> {
        self.in_progress.insert(template.id.clone());

        let records: Vec<&NodeRecord> = template
            .nodes
            .iter()
            .filter(|record| !is_sentinel_node(&record.id))
            .collect();

        let mut builder = GraphBuilder::new();
        let mut handles = Vec::with_capacity(records.len());
        for record in &records {
            let node = self.node(record)?;
            handles.push(builder.add_node(node)?);
        }

        for (record, &handle) in records.iter().zip(&handles) {
            for upstream_id in &record.upstream_node_ids {
                if is_sentinel_node(upstream_id) {
                    continue;
                }
                let upstream =
                    builder
                        .handle(upstream_id)
                        .ok_or_else(|| WorkflowError::UnknownUpstream {
                            node_id: record.id.clone(),
                            upstream_id: upstream_id.clone(),
                        })?;
                builder.add_edge(upstream, handle)?;
            }
        }

        let graph = builder.finish()?;
        self.in_progress.remove(&template.id);

        tracing::debug!(
            workflow = %template.id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "promoted workflow"
        );

        Ok(Workflow {
            id: template.id.clone(),
            interface: template.interface.clone(),
            graph,
            outputs: template.outputs.iter().map(BindingRecord::promote).collect(),
            metadata: template.metadata.clone(),
            metadata_defaults: template.metadata_defaults.clone(),
        })
    }

    fn node(&mut self, record: &NodeRecord) -> Result<Node, WorkflowError> {
        let target = match record.kind()? {
            NodeKindRecord::Task(id) => NodeTarget::Task(self.task(&record.id, id)?),
            NodeKindRecord::SubWorkflow(id) => {
                NodeTarget::Workflow(self.sub_workflow(&record.id, id)?)
            }
            NodeKindRecord::LaunchPlan(id) => NodeTarget::LaunchPlan(id.clone()),
            NodeKindRecord::Branch(branch) => NodeTarget::Branch(self.branch(branch)?),
        };

        let mut node = Node::new(target)
            .with_metadata(record.metadata.clone())
            .with_output_aliases(record.output_aliases.clone())
            .with_upstream_ids(
                record
                    .upstream_node_ids
                    .iter()
                    .filter(|id| !is_sentinel_node(id))
                    .cloned()
                    .collect(),
            );
        for binding in &record.inputs {
            node = node.with_input(binding.promote());
        }
        node.assign_id(record.id.clone())?;
        Ok(node)
    }

    fn task(
        &mut self,
        node_id: &str,
        id: &Identifier,
    ) -> Result<Arc<TaskTemplate>, WorkflowError> {
        if let Some(task) = self.promoted_tasks.get(id) {
            return Ok(Arc::clone(task));
        }
        let template = self
            .tasks
            .get(id)
            .ok_or_else(|| WorkflowError::DanglingReference {
                node_id: node_id.to_owned(),
                reference: id.clone(),
            })?;
        let task = Arc::new(template.clone());
        self.promoted_tasks.insert(id.clone(), Arc::clone(&task));
        Ok(task)
    }

    fn sub_workflow(
        &mut self,
        node_id: &str,
        id: &Identifier,
    ) -> Result<Arc<Workflow>, WorkflowError> {
        if let Some(wf) = self.promoted_workflows.get(id) {
            return Ok(Arc::clone(wf));
        }
        if self.in_progress.contains(id) {
            return Err(WorkflowError::RecursiveSubWorkflow(id.clone()));
        }
        let sub_workflows = self.sub_workflows;
        let template = sub_workflows
            .get(id)
            .ok_or_else(|| WorkflowError::DanglingReference {
                node_id: node_id.to_owned(),
                reference: id.clone(),
            })?;
        let wf = Arc::new(self.workflow(template)?);
        self.promoted_workflows.insert(id.clone(), Arc::clone(&wf));
        Ok(wf)
    }

    fn branch(&mut self, branch: &BranchNodeRecord) -> Result<BranchNode, WorkflowError> {
        let if_else = &branch.if_else;
        let case = self.if_block(&if_else.case)?;
        let other = if_else
            .other
            .iter()
            .map(|block| self.if_block(block))
            .collect::<Result<Vec<_>, _>>()?;
        let else_node = match &if_else.else_node {
            Some(record) => Some(Box::new(self.node(record)?)),
            None => None,
        };
        Ok(BranchNode {
            if_else: IfElseBlock {
                case,
                other,
                else_node,
                error: if_else.error.clone(),
            },
        })
    }

    fn if_block(&mut self, block: &IfBlockRecord) -> Result<IfBlock, WorkflowError> {
        Ok(IfBlock {
            condition: block.condition.clone(),
            then_node: Box::new(self.node(&block.then_node)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use skiff_core::{END_NODE_ID, FaultKind, START_NODE_ID};

    use super::*;
    use crate::binding::{BindingData, OutputReference, Promise, PromiseSource};
    use crate::condition::{BooleanExpression, ComparisonOperator, Primitive};
    use crate::interface::{SimpleType, TypedInterface, Variable};
    use crate::template::{IfElseRecord, WorkflowMetadata, WorkflowMetadataDefaults};

    fn task(name: &str) -> TaskTemplate {
        TaskTemplate::new(Identifier::task("p", "d", name, "v1"), "python-task").with_interface(
            TypedInterface::new()
                .with_input("a", Variable::simple(SimpleType::Integer))
                .with_output("o0", Variable::simple(SimpleType::Integer)),
        )
    }

    fn template(name: &str, nodes: Vec<NodeRecord>) -> WorkflowTemplate {
        let mut all = vec![NodeRecord::new(START_NODE_ID)];
        all.extend(nodes);
        all.push(NodeRecord::new(END_NODE_ID));
        WorkflowTemplate {
            id: Identifier::workflow("p", "d", name, "v1"),
            metadata: WorkflowMetadata::default(),
            metadata_defaults: WorkflowMetadataDefaults::default(),
            interface: TypedInterface::new()
                .with_input("a", Variable::simple(SimpleType::Integer)),
            nodes: all,
            outputs: vec![BindingRecord::new(
                "o0",
                BindingData::Promise(OutputReference::new("n1", "o0")),
            )],
        }
    }

    fn tables(
        tasks: &[TaskTemplate],
        subs: &[WorkflowTemplate],
    ) -> (
        HashMap<Identifier, WorkflowTemplate>,
        HashMap<Identifier, TaskTemplate>,
    ) {
        (
            subs.iter().map(|s| (s.id.clone(), s.clone())).collect(),
            tasks.iter().map(|t| (t.id.clone(), t.clone())).collect(),
        )
    }

    fn two_node_template() -> WorkflowTemplate {
        template(
            "wf",
            vec![
                NodeRecord::new("n0")
                    .with_task(task("a").id)
                    .with_upstream(START_NODE_ID)
                    .with_input(BindingRecord::new(
                        "a",
                        BindingData::Promise(OutputReference::new(START_NODE_ID, "a")),
                    )),
                NodeRecord::new("n1")
                    .with_task(task("b").id)
                    .with_upstream("n0")
                    .with_input(BindingRecord::new(
                        "a",
                        BindingData::Promise(OutputReference::new("n0", "o0")),
                    )),
            ],
        )
    }

    #[test]
    fn two_node_chain() {
        let (subs, tasks) = tables(&[task("a"), task("b")], &[]);
        let wf = Workflow::promote(&two_node_template(), &subs, &tasks).unwrap();

        assert_eq!(wf.node_ids(), vec!["n0", "n1"]);
        let upstream: Vec<_> = wf
            .upstream_nodes("n1")
            .into_iter()
            .filter_map(Node::id)
            .collect();
        assert_eq!(upstream, vec!["n0"]);
        assert!(wf.upstream_nodes("n0").is_empty());

        let n0 = wf.node("n0").unwrap();
        assert_eq!(
            n0.inputs()[0].binding,
            BindingData::Promise(Promise::new(PromiseSource::GlobalInput, "a"))
        );
        let n1 = wf.node("n1").unwrap();
        assert_eq!(
            n1.inputs()[0].binding,
            BindingData::Promise(Promise::new(PromiseSource::Node("n0".into()), "o0"))
        );
        assert!(n0.upstream_ids().is_empty());
        assert_eq!(
            wf.outputs()[0].binding,
            BindingData::Promise(Promise::new(PromiseSource::Node("n1".into()), "o0"))
        );
        assert!(wf.node(START_NODE_ID).is_none());
        assert!(wf.node(END_NODE_ID).is_none());
    }

    #[test]
    fn promotion_is_deterministic() {
        let (subs, tasks) = tables(&[task("a"), task("b")], &[]);
        let t = two_node_template();
        let first = Workflow::promote(&t, &subs, &tasks).unwrap();
        let second = Workflow::promote(&t, &subs, &tasks).unwrap();
        assert_eq!(first.node_ids(), second.node_ids());
        assert_eq!(first.edge_set(), second.edge_set());
        assert_eq!(
            first.edge_set(),
            BTreeSet::from([("n0".to_owned(), "n1".to_owned())])
        );
    }

    #[test]
    fn downstream_and_defaults_follow_template() {
        let (subs, tasks) = tables(&[task("a"), task("b")], &[]);
        let mut t = two_node_template();
        t.metadata_defaults.interruptible = true;
        let wf = Workflow::promote(&t, &subs, &tasks).unwrap();

        let downstream: Vec<_> = wf
            .downstream_nodes("n0")
            .into_iter()
            .filter_map(Node::id)
            .collect();
        assert_eq!(downstream, vec!["n1"]);
        assert!(wf.downstream_nodes("n1").is_empty());
        assert!(wf.metadata_defaults().interruptible);
    }

    #[test]
    fn dangling_task_is_system_fault() {
        let (subs, tasks) = tables(&[task("a")], &[]);
        let err = Workflow::promote(&two_node_template(), &subs, &tasks).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::DanglingReference { ref node_id, .. } if node_id == "n1"
        ));
        assert_eq!(err.kind(), FaultKind::System);
    }

    #[test]
    fn ambiguous_record_fails_promotion() {
        let (subs, tasks) = tables(&[task("a")], &[]);
        let t = template(
            "wf",
            vec![
                NodeRecord::new("n0")
                    .with_task(task("a").id)
                    .with_sub_workflow(Identifier::workflow("p", "d", "sub", "v1")),
            ],
        );
        let err = Workflow::promote(&t, &subs, &tasks).unwrap_err();
        assert_eq!(err.kind(), FaultKind::System);

        let t = template("wf", vec![NodeRecord::new("n0")]);
        let err = Workflow::promote(&t, &subs, &tasks).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingNodeKind(_)));
    }

    #[test]
    fn unknown_upstream_is_system_fault() {
        let (subs, tasks) = tables(&[task("a")], &[]);
        let t = template(
            "wf",
            vec![NodeRecord::new("n0").with_task(task("a").id).with_upstream("ghost")],
        );
        let err = Workflow::promote(&t, &subs, &tasks).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::UnknownUpstream { ref upstream_id, .. } if upstream_id == "ghost"
        ));
    }

    #[test]
    fn launch_plan_is_not_expanded() {
        let lp = Identifier::launch_plan("p", "d", "lp", "v1");
        let (subs, tasks) = tables(&[], &[]);
        let t = template("wf", vec![NodeRecord::new("n0").with_launch_plan(lp.clone())]);
        let wf = Workflow::promote(&t, &subs, &tasks).unwrap();
        assert!(matches!(
            wf.node("n0").unwrap().target(),
            NodeTarget::LaunchPlan(id) if *id == lp
        ));
        assert_eq!(wf.upstream_entities(), vec![&lp]);
    }

    #[test]
    fn sub_workflow_shared_by_identifier() {
        let sub = template("sub", vec![NodeRecord::new("s0").with_task(task("a").id)]);
        let (subs, tasks) = tables(&[task("a")], std::slice::from_ref(&sub));
        let t = template(
            "wf",
            vec![
                NodeRecord::new("n0").with_sub_workflow(sub.id.clone()),
                NodeRecord::new("n1").with_sub_workflow(sub.id.clone()),
            ],
        );
        let wf = Workflow::promote(&t, &subs, &tasks).unwrap();
        let (NodeTarget::Workflow(a), NodeTarget::Workflow(b)) = (
            wf.node("n0").unwrap().target(),
            wf.node("n1").unwrap().target(),
        ) else {
            panic!("expected workflow targets");
        };
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.node_ids(), vec!["s0"]);
        assert_eq!(wf.upstream_entities(), vec![&sub.id]);
    }

    #[test]
    fn self_inlining_sub_workflow_rejected() {
        let sub_id = Identifier::workflow("p", "d", "loop", "v1");
        let sub = template("loop", vec![NodeRecord::new("s0").with_sub_workflow(sub_id.clone())]);
        let (subs, tasks) = tables(&[], std::slice::from_ref(&sub));
        let t = template("wf", vec![NodeRecord::new("n0").with_sub_workflow(sub_id.clone())]);
        let err = Workflow::promote(&t, &subs, &tasks).unwrap_err();
        assert!(matches!(err, WorkflowError::RecursiveSubWorkflow(ref id) if *id == sub_id));
    }

    #[test]
    fn branch_targets_are_embedded_not_linked() {
        let (subs, tasks) = tables(&[task("a")], &[]);
        let t = template(
            "wf",
            vec![NodeRecord::new("b").with_branch(IfElseRecord {
                case: IfBlockRecord {
                    condition: BooleanExpression::compare(
                        ComparisonOperator::Gt,
                        "a",
                        Primitive::Integer(0),
                    ),
                    then_node: Box::new(
                        NodeRecord::new("b-n0")
                            .with_task(task("a").id)
                            .with_upstream("b"),
                    ),
                },
                other: Vec::new(),
                else_node: None,
                error: Some("no case matched".into()),
            })],
        );
        let wf = Workflow::promote(&t, &subs, &tasks).unwrap();
        assert_eq!(wf.node_ids(), vec!["b"]);
        let NodeTarget::Branch(branch) = wf.node("b").unwrap().target() else {
            panic!("expected branch");
        };
        let then = &branch.if_else.case.then_node;
        assert_eq!(then.id(), Some("b-n0"));
        assert_eq!(then.upstream_ids(), &["b".to_owned()]);
        assert_eq!(wf.graph().edge_count(), 0);
    }

    #[test]
    fn from_closure_uses_side_tables() {
        let closure = CompiledWorkflowClosure {
            primary: two_node_template(),
            sub_workflows: Vec::new(),
            tasks: vec![task("a"), task("b")],
        };
        let wf = Workflow::from_closure(&closure).unwrap();
        assert_eq!(wf.id(), &Identifier::workflow("p", "d", "wf", "v1"));
        assert_eq!(wf.topological_order().unwrap().len(), 2);
    }
}
