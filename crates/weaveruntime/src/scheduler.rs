use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};
use weavecore::{GraphError, NodeSpec, Workflow};

/// Compute the single execution order of a workflow.
///
/// Kahn's algorithm over the links whose endpoints both exist; links naming
/// an unknown node are left out of the ordering. The ready queue is FIFO,
/// seeded in declaration order and refilled in link order, so among nodes
/// that become ready together the first declared runs first.
pub fn schedule(workflow: &Workflow) -> Result<Vec<&NodeSpec>, GraphError> {
    let graph = build_graph(workflow)?;

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.edges_directed(idx, Direction::Incoming).count())
        .collect();

    let mut ready: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(workflow.nodes.len());
    while let Some(idx) = ready.pop_front() {
        order.push(&workflow.nodes[graph[idx]]);

        // petgraph walks edges newest first; restore declaration order
        let mut outgoing: Vec<_> = graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        outgoing.sort_by_key(|(id, _)| *id);

        for (_, target) in outgoing {
            let degree = &mut in_degree[target.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(target);
            }
        }
    }

    if order.len() < workflow.nodes.len() {
        return Err(GraphError::Cycle {
            scheduled: order.len(),
            total: workflow.nodes.len(),
        });
    }

    tracing::debug!(
        order = ?order.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        "Scheduled workflow"
    );
    Ok(order)
}

/// Ordering graph: one vertex per declared node (weight = position in the
/// node list), one edge per link with both endpoints declared.
fn build_graph(workflow: &Workflow) -> Result<DiGraph<usize, ()>, GraphError> {
    let mut graph = DiGraph::with_capacity(workflow.nodes.len(), workflow.links.len());
    let mut node_to_index: HashMap<&str, NodeIndex> = HashMap::new();

    for (position, node) in workflow.nodes.iter().enumerate() {
        let idx = graph.add_node(position);
        if node_to_index.insert(node.id.as_str(), idx).is_some() {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }

    for link in &workflow.links {
        match (
            node_to_index.get(link.from_node.as_str()),
            node_to_index.get(link.to_node.as_str()),
        ) {
            (Some(&from), Some(&to)) => {
                graph.add_edge(from, to, ());
            }
            _ => tracing::debug!(
                "Link {}.{} -> {}.{} references an unknown node; not ordered",
                link.from_node,
                link.from_port,
                link.to_node,
                link.to_port
            ),
        }
    }

    Ok(graph)
}
