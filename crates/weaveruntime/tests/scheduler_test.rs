mod common;

use common::{echo, order_of, workflow};
use weavecore::GraphError;
use weaveruntime::schedule;

#[test]
fn test_independent_nodes_run_in_declaration_order() {
    let wf = workflow(vec![echo("b"), echo("a")], &[]);
    assert_eq!(order_of(&wf), vec!["b", "a"]);
}

#[test]
fn test_links_override_declaration_order() {
    let wf = workflow(
        vec![echo("write"), echo("text")],
        &[("text", "out", "write", "in")],
    );
    assert_eq!(order_of(&wf), vec!["text", "write"]);
}

#[test]
fn test_ready_queue_is_fifo() {
    // a and c start ready; b is released by a after c is already queued
    let wf = workflow(
        vec![echo("a"), echo("b"), echo("c")],
        &[("a", "out", "b", "in")],
    );
    assert_eq!(order_of(&wf), vec!["a", "c", "b"]);
}

#[test]
fn test_targets_released_in_link_order() {
    let wf = workflow(
        vec![echo("root"), echo("x"), echo("y")],
        &[("root", "out", "y", "in"), ("root", "out", "x", "in")],
    );
    assert_eq!(order_of(&wf), vec!["root", "y", "x"]);
}

#[test]
fn test_diamond() {
    let wf = workflow(
        vec![echo("join"), echo("left"), echo("right"), echo("src")],
        &[
            ("src", "out", "left", "in"),
            ("src", "out", "right", "in"),
            ("left", "out", "join", "a"),
            ("right", "out", "join", "b"),
        ],
    );
    assert_eq!(order_of(&wf), vec!["src", "left", "right", "join"]);
}

#[test]
fn test_duplicate_links_count_twice() {
    let wf = workflow(
        vec![echo("b"), echo("a")],
        &[("a", "out", "b", "x"), ("a", "out", "b", "y")],
    );
    assert_eq!(order_of(&wf), vec!["a", "b"]);
}

#[test]
fn test_dangling_links_are_ignored() {
    let wf = workflow(
        vec![echo("b"), echo("a")],
        &[("ghost", "out", "a", "in"), ("b", "out", "nowhere", "in")],
    );
    assert_eq!(order_of(&wf), vec!["b", "a"]);
}

#[test]
fn test_two_node_cycle_is_rejected() {
    let wf = workflow(
        vec![echo("a"), echo("b")],
        &[("a", "out", "b", "in"), ("b", "out", "a", "in")],
    );
    assert_eq!(
        schedule(&wf).unwrap_err(),
        GraphError::Cycle {
            scheduled: 0,
            total: 2
        }
    );
}

#[test]
fn test_self_loop_is_rejected() {
    let wf = workflow(vec![echo("a"), echo("b")], &[("a", "out", "a", "in")]);
    assert_eq!(
        schedule(&wf).unwrap_err(),
        GraphError::Cycle {
            scheduled: 1,
            total: 2
        }
    );
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let wf = workflow(vec![echo("a"), echo("a")], &[]);
    assert_eq!(
        schedule(&wf).unwrap_err(),
        GraphError::DuplicateNodeId("a".to_string())
    );
}

#[test]
fn test_empty_workflow() {
    let wf = workflow(vec![], &[]);
    assert!(schedule(&wf).unwrap().is_empty());
}
