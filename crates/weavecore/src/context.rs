use crate::{NodeId, NodeSpec, PortMap, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle marker of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Running,
    Done,
    Error,
}

/// One entry of the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub step: u64,
    pub node: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<PortMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-run mutable state: captured outputs, the ordered log and the step
/// counter shared by every node of the run.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    outputs: BTreeMap<NodeId, PortMap>,
    logs: Vec<LogEntry>,
    step: u64,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> &BTreeMap<NodeId, PortMap> {
        &self.outputs
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Output of a completed node on the given port.
    pub fn output(&self, node_id: &str, port: &str) -> Option<&Value> {
        self.outputs.get(node_id).and_then(|ports| ports.get(port))
    }

    pub fn log_running(&mut self, node: &NodeSpec) {
        self.push(node, NodeStatus::Running, None, None);
    }

    /// Captures the node's outputs and logs its completion.
    pub fn record_done(&mut self, node: &NodeSpec, outputs: PortMap) {
        self.outputs.insert(node.id.clone(), outputs.clone());
        self.push(node, NodeStatus::Done, Some(outputs), None);
    }

    pub fn record_error(&mut self, node: &NodeSpec, message: impl Into<String>) {
        self.push(node, NodeStatus::Error, None, Some(message.into()));
    }

    pub fn into_parts(self) -> (BTreeMap<NodeId, PortMap>, Vec<LogEntry>) {
        (self.outputs, self.logs)
    }

    fn push(
        &mut self,
        node: &NodeSpec,
        status: NodeStatus,
        outputs: Option<PortMap>,
        error: Option<String>,
    ) {
        self.step += 1;
        self.logs.push(LogEntry {
            step: self.step,
            node: node.id.clone(),
            node_type: node.node_type.clone(),
            status,
            outputs,
            error,
        });
    }
}
