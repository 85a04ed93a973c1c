use crate::{ExecutionContext, NodeId, Value, Workflow};
use std::collections::HashMap;

/// Producer of an input port: a node and one of its output ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
    pub from_node: NodeId,
    pub from_port: String,
}

/// `to_node → to_port → producer`, derived once per run from the links.
///
/// A port accepts one binding; when several links target the same port the
/// last declared one wins. Links naming unknown nodes are kept here even
/// though the scheduler ignores them.
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    bindings: HashMap<NodeId, HashMap<String, PortRef>>,
}

impl DependencyMap {
    pub fn from_workflow(workflow: &Workflow) -> Self {
        let mut bindings: HashMap<NodeId, HashMap<String, PortRef>> = HashMap::new();
        for link in &workflow.links {
            bindings.entry(link.to_node.clone()).or_default().insert(
                link.to_port.clone(),
                PortRef {
                    from_node: link.from_node.clone(),
                    from_port: link.from_port.clone(),
                },
            );
        }
        Self { bindings }
    }

    pub fn source(&self, node_id: &str, port: &str) -> Option<&PortRef> {
        self.bindings.get(node_id).and_then(|ports| ports.get(port))
    }

    /// Value bound to `(node_id, port)` in the current run, if any.
    ///
    /// Absent covers both an unbound port and a producer that has not
    /// produced that port.
    pub fn resolve<'a>(
        &self,
        node_id: &str,
        port: &str,
        ctx: &'a ExecutionContext,
    ) -> Option<&'a Value> {
        let src = self.source(node_id, port)?;
        ctx.output(&src.from_node, &src.from_port)
    }
}

/// Input lookup for one node, bound to the run's map and context.
#[derive(Clone, Copy)]
pub struct InputResolver<'a> {
    node_id: &'a str,
    map: &'a DependencyMap,
    ctx: &'a ExecutionContext,
}

impl<'a> InputResolver<'a> {
    pub fn new(node_id: &'a str, map: &'a DependencyMap, ctx: &'a ExecutionContext) -> Self {
        Self { node_id, map, ctx }
    }

    pub fn get(&self, port: &str) -> Option<&'a Value> {
        self.map.resolve(self.node_id, port, self.ctx)
    }
}
