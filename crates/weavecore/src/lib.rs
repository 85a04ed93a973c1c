//! Core abstractions for the workflow engine
//!
//! This crate provides the graph model, the per-run execution context, the
//! input resolver and the handler contract that every other crate builds on.
//! It does no scheduling, and no I/O beyond the workspace sandbox.

mod context;
mod error;
mod node;
mod resolver;
mod value;
mod workflow;
mod workspace;

pub use context::{ExecutionContext, LogEntry, NodeStatus};
pub use error::{FlowError, GraphError, NodeError};
pub use node::{Node, NodeContext, NodeMetadata, NodeOutput, PortDefinition};
pub use resolver::{DependencyMap, InputResolver, PortRef};
pub use value::{type_name, NodeConfig, PortMap, Value};
pub use workflow::{Link, NodeId, NodeSpec, Workflow};
pub use workspace::Workspace;

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
