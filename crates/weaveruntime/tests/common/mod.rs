#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weaveruntime::{FlowRuntime, NodeRegistry};
use weavecore::{Node, NodeContext, NodeError, NodeOutput, NodeSpec, Value, Workflow};

/// Passes its `in` input (or `data.value` when unlinked) to `out`, and
/// counts how often it ran.
pub struct EchoNode {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Node for EchoNode {
    fn node_type(&self) -> &str {
        "Echo"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = ctx
            .input("in")
            .or_else(|| ctx.config().get("value"))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(NodeOutput::new().with_output("out", value))
    }
}

/// Always fails with a fixed message.
pub struct FailNode {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Node for FailNode {
    fn node_type(&self) -> &str {
        "Fail"
    }

    async fn execute(&self, _ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NodeError::ExecutionFailed("boom".to_string()))
    }
}

pub struct Harness {
    pub runtime: FlowRuntime,
    pub calls: Arc<AtomicUsize>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let workspace = weavecore::Workspace::open(dir.path()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut registry = NodeRegistry::new();
        registry.register(Arc::new(EchoNode {
            calls: calls.clone(),
        }));
        registry.register(Arc::new(FailNode {
            calls: calls.clone(),
        }));

        Self {
            runtime: FlowRuntime::with_registry(Arc::new(registry), workspace),
            calls,
            _dir: dir,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn echo(id: &str) -> NodeSpec {
    NodeSpec::new(id, "Echo")
}

pub fn echo_value(id: &str, value: impl Into<Value>) -> NodeSpec {
    NodeSpec::new(id, "Echo").with_config("value", value)
}

pub fn workflow(nodes: Vec<NodeSpec>, links: &[(&str, &str, &str, &str)]) -> Workflow {
    let mut wf = Workflow::new();
    for node in nodes {
        wf.add_node(node);
    }
    for (from_node, from_port, to_node, to_port) in links {
        wf.connect(*from_node, *from_port, *to_node, *to_port);
    }
    wf
}

pub fn order_of(wf: &Workflow) -> Vec<String> {
    weaveruntime::schedule(wf)
        .unwrap()
        .into_iter()
        .map(|n| n.id.clone())
        .collect()
}
