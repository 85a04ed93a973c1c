use crate::{NodeConfig, Value};
use serde::{Deserialize, Serialize};

pub type NodeId = String;

/// Complete graph submitted for one run.
///
/// Node order is the scheduling tie-break and link order decides which
/// binding wins when two links feed the same input port, so both are kept
/// as ordered sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<Link>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeSpec) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    pub fn connect(
        &mut self,
        from_node: impl Into<NodeId>,
        from_port: impl Into<String>,
        to_node: impl Into<NodeId>,
        to_port: impl Into<String>,
    ) {
        self.links.push(Link {
            from_node: from_node.into(),
            from_port: from_port.into(),
            to_node: to_node.into(),
            to_port: to_port.into(),
        });
    }

    pub fn find_node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Node specification in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    /// Editor placement; the engine ignores it.
    #[serde(default)]
    pub position: serde_json::Map<String, Value>,
    #[serde(default)]
    pub data: NodeConfig,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position: serde_json::Map::new(),
            data: NodeConfig::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key, value);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position.insert("x".to_string(), x.into());
        self.position.insert("y".to_string(), y.into());
        self
    }
}

/// Directed binding from one node's output port to another node's input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from_node: NodeId,
    pub from_port: String,
    pub to_node: NodeId,
    pub to_port: String,
}
