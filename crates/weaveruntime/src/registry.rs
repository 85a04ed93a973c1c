use std::collections::HashMap;
use std::sync::Arc;
use weavecore::{FlowError, Node, NodeMetadata};

/// Registry of available node types
///
/// Built once at startup and handed to the runtime; a run only reads it.
#[derive(Default)]
pub struct NodeRegistry {
    handlers: HashMap<String, Arc<dyn Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its type tag, replacing any previous one
    pub fn register(&mut self, handler: Arc<dyn Node>) {
        let node_type = handler.node_type().to_string();
        tracing::info!("Registering node type: {}", node_type);
        self.handlers.insert(node_type, handler);
    }

    /// Handler for a type tag
    pub fn get(&self, node_type: &str) -> Result<&Arc<dyn Node>, FlowError> {
        self.handlers
            .get(node_type)
            .ok_or_else(|| FlowError::UnsupportedNode {
                node_type: node_type.to_string(),
            })
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    /// Get all registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: &str) -> Option<NodeMetadata> {
        self.handlers.get(node_type).map(|h| h.metadata())
    }
}
