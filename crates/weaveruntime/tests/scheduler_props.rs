mod common;

use common::{echo, workflow};
use proptest::prelude::*;
use std::collections::HashMap;
use weavecore::Workflow;
use weaveruntime::schedule;

// Acyclic by construction: a link always goes from a lower to a higher
// index in `ranks`, while node declaration order is shuffled separately.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Workflow> {
    (1..=max_nodes).prop_flat_map(|n| {
        let ranks = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        let edges = proptest::collection::vec((0..n, 0..n), 0..n * 2);
        let dangling = proptest::collection::vec(0..n, 0..3);
        (ranks, edges, dangling).prop_map(move |(ranks, edges, dangling)| {
            let names: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
            let nodes = ranks.iter().map(|&i| echo(&names[i])).collect();
            let mut wf = workflow(nodes, &[]);
            for (a, b) in edges {
                if a < b {
                    wf.connect(names[a].clone(), "out", names[b].clone(), "in");
                }
            }
            for i in dangling {
                wf.connect("ghost", "out", names[i].clone(), "in");
            }
            wf
        })
    })
}

proptest! {
    #[test]
    fn test_order_is_a_linearization(wf in dag_strategy(12)) {
        let order = schedule(&wf).unwrap();
        prop_assert_eq!(order.len(), wf.nodes.len());

        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        for link in &wf.links {
            if let (Some(from), Some(to)) = (
                position.get(link.from_node.as_str()),
                position.get(link.to_node.as_str()),
            ) {
                prop_assert!(from < to, "{} must precede {}", link.from_node, link.to_node);
            }
        }
    }

    #[test]
    fn test_order_is_deterministic(wf in dag_strategy(12)) {
        let first: Vec<_> = schedule(&wf).unwrap().iter().map(|n| n.id.clone()).collect();
        let second: Vec<_> = schedule(&wf).unwrap().iter().map(|n| n.id.clone()).collect();
        prop_assert_eq!(first, second);
    }
}
