use crate::{ExecutionContext, InputResolver, NodeConfig, NodeError, NodeSpec, PortMap, Value};
use async_trait::async_trait;

/// Core trait that all executable nodes implement
#[async_trait]
pub trait Node: Send + Sync {
    /// Type tag this handler is registered under (e.g. "Text", "WriteFile")
    fn node_type(&self) -> &str;

    /// Execute the node with given context
    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError>;

    /// Description and declared ports, for listings
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::default()
    }
}

/// What a handler sees of the run while it executes.
#[derive(Clone, Copy)]
pub struct NodeContext<'a> {
    pub node: &'a NodeSpec,
    pub inputs: InputResolver<'a>,
    /// Read access to outputs captured so far
    pub run: &'a ExecutionContext,
}

impl<'a> NodeContext<'a> {
    pub fn new(node: &'a NodeSpec, inputs: InputResolver<'a>, run: &'a ExecutionContext) -> Self {
        Self { node, inputs, run }
    }

    pub fn node_id(&self) -> &'a str {
        &self.node.id
    }

    pub fn config(&self) -> &'a NodeConfig {
        &self.node.data
    }

    pub fn input(&self, port: &str) -> Option<&'a Value> {
        self.inputs.get(port)
    }

    pub fn require_input(&self, port: &str) -> Result<&'a Value, NodeError> {
        self.input(port)
            .ok_or_else(|| NodeError::MissingInput(port.to_string()))
    }

    /// Linked input if it carries something, otherwise the same key from config.
    ///
    /// Null and empty strings count as nothing on either side.
    pub fn input_or_config(&self, port: &str) -> Option<&'a Value> {
        self.input(port)
            .filter(|v| is_present(v))
            .or_else(|| self.config().get(port).filter(|v| is_present(v)))
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Output from node execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutput {
    pub outputs: PortMap,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, port: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(port.into(), value.into());
        self
    }
}

/// Metadata about a node type
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub description: String,
    pub category: String,
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortDefinition {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl PortDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
        }
    }
}
