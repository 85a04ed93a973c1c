use thiserror::Error;

/// Run-level failure taxonomy. The first one raised aborts the run.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Unsupported node type: {node_type}")]
    UnsupportedNode { node_type: String },

    #[error("Node '{node_id}' ({node_type}) failed: {source}")]
    NodeExecution {
        node_id: String,
        node_type: String,
        #[source]
        source: NodeError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a node handler while it runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Invalid config value for '{key}': expected {expected}, got {actual}")]
    InvalidConfig {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Path escapes the workspace: {0}")]
    PathEscapesWorkspace(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Io(err.to_string())
    }
}

/// Structural problems found while ordering the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph contains a cycle or unresolvable links: scheduled {scheduled} of {total} nodes")]
    Cycle { scheduled: usize, total: usize },

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),
}
