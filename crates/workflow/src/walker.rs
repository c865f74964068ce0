//! Enumeration of nested workflows.

use std::sync::Arc;

use crate::node::{Node, NodeTarget};
use crate::workflow::Workflow;

impl Workflow {
    /// Every nested workflow reachable from this one, depth first in
    /// declaration order.
    ///
    /// Inline sub-workflow nodes contribute their workflow followed by its own
    /// nested workflows. Branch nodes contribute each target that is a
    /// workflow, taken from the first case, then the other cases, then the else
    /// node. Task and launch-plan targets are skipped. A workflow inlined more
    /// than once appears once per reference.
    #[must_use]
    pub fn sub_workflows(&self) -> Vec<Arc<Workflow>> {
        let mut out = Vec::new();
        self.collect_sub_workflows(&mut out);
        out
    }

    fn collect_sub_workflows(&self, out: &mut Vec<Arc<Workflow>>) {
        for node in self.nodes() {
            match node.target() {
                NodeTarget::Workflow(wf) => visit(wf, out),
                NodeTarget::Branch(branch) => {
                    branch
                        .targets()
                        .filter_map(inline_workflow)
                        .for_each(|wf| visit(wf, out));
                }
                NodeTarget::Task(_) | NodeTarget::LaunchPlan(_) => {}
            }
        }
    }
}

fn visit(wf: &Arc<Workflow>, out: &mut Vec<Arc<Workflow>>) {
    out.push(Arc::clone(wf));
    wf.collect_sub_workflows(out);
}

fn inline_workflow(node: &Node) -> Option<&Arc<Workflow>> {
    match node.target() {
        NodeTarget::Workflow(wf) => Some(wf),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use skiff_core::{END_NODE_ID, Identifier, START_NODE_ID};

    use crate::condition::{BooleanExpression, ComparisonOperator, Primitive};
    use crate::interface::TypedInterface;
    use crate::template::{
        IfBlockRecord, IfElseRecord, NodeRecord, TaskTemplate, WorkflowMetadata,
        WorkflowMetadataDefaults, WorkflowTemplate,
    };
    use crate::workflow::Workflow;

    fn wf_id(name: &str) -> Identifier {
        Identifier::workflow("p", "d", name, "v1")
    }

    fn template(name: &str, nodes: Vec<NodeRecord>) -> WorkflowTemplate {
        let mut all = vec![NodeRecord::new(START_NODE_ID)];
        all.extend(nodes);
        all.push(NodeRecord::new(END_NODE_ID));
        WorkflowTemplate {
            id: wf_id(name),
            metadata: WorkflowMetadata::default(),
            metadata_defaults: WorkflowMetadataDefaults::default(),
            interface: TypedInterface::new(),
            nodes: all,
            outputs: Vec::new(),
        }
    }

    fn case(target: NodeRecord) -> IfBlockRecord {
        IfBlockRecord {
            condition: BooleanExpression::compare(
                ComparisonOperator::Eq,
                "x",
                Primitive::Integer(1),
            ),
            then_node: Box::new(target),
        }
    }

    fn names(wfs: &[std::sync::Arc<Workflow>]) -> Vec<String> {
        wfs.iter().map(|wf| wf.id().name.clone()).collect()
    }

    #[test]
    fn branch_targets_in_declaration_order() {
        let t = Identifier::task("p", "d", "t", "v1");
        let tasks = HashMap::from([(t.clone(), TaskTemplate::new(t.clone(), "python-task"))]);

        let subs: HashMap<_, _> = [
            template("b", vec![NodeRecord::new("b0").with_task(t.clone())]),
            template("d", vec![NodeRecord::new("d0").with_sub_workflow(wf_id("inner"))]),
            template("e", vec![NodeRecord::new("e0").with_task(t.clone())]),
            template("inner", vec![NodeRecord::new("i0").with_task(t.clone())]),
        ]
        .into_iter()
        .map(|tpl| (tpl.id.clone(), tpl))
        .collect();

        let primary = template(
            "main",
            vec![NodeRecord::new("branch").with_branch(IfElseRecord {
                case: case(NodeRecord::new("B").with_sub_workflow(wf_id("b"))),
                other: vec![
                    case(NodeRecord::new("C").with_task(t.clone())),
                    case(NodeRecord::new("D").with_sub_workflow(wf_id("d"))),
                ],
                else_node: Some(Box::new(NodeRecord::new("E").with_sub_workflow(wf_id("e")))),
                error: None,
            })],
        );

        let wf = Workflow::promote(&primary, &subs, &tasks).unwrap();
        assert_eq!(names(&wf.sub_workflows()), vec!["b", "d", "inner", "e"]);
    }

    #[test]
    fn inline_nodes_recurse_and_launch_plans_are_skipped() {
        let subs: HashMap<_, _> = [
            template("outer", vec![NodeRecord::new("o0").with_sub_workflow(wf_id("leaf"))]),
            template(
                "leaf",
                vec![NodeRecord::new("l0").with_launch_plan(Identifier::launch_plan(
                    "p", "d", "lp", "v1",
                ))],
            ),
        ]
        .into_iter()
        .map(|tpl| (tpl.id.clone(), tpl))
        .collect();

        let primary = template(
            "main",
            vec![
                NodeRecord::new("n0").with_sub_workflow(wf_id("outer")),
                NodeRecord::new("n1")
                    .with_launch_plan(Identifier::launch_plan("p", "d", "lp", "v1")),
            ],
        );
        let wf = Workflow::promote(&primary, &subs, &HashMap::new()).unwrap();
        assert_eq!(names(&wf.sub_workflows()), vec!["outer", "leaf"]);
    }

    #[test]
    fn flat_workflow_has_none() {
        let t = Identifier::task("p", "d", "t", "v1");
        let tasks = HashMap::from([(t.clone(), TaskTemplate::new(t.clone(), "python-task"))]);
        let primary = template("main", vec![NodeRecord::new("n0").with_task(t)]);
        let wf = Workflow::promote(&primary, &HashMap::new(), &tasks).unwrap();
        assert!(wf.sub_workflows().is_empty());
    }
}
