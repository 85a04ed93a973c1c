//! Workflow execution runtime
//!
//! This crate provides the engine that runs workflows: the node registry,
//! the topological scheduler and the sequential, fail-fast executor.

mod executor;
mod registry;
mod runtime;
mod scheduler;

pub use executor::{ExecutionFailure, ExecutionId, ExecutionResult, WorkflowExecutor};
pub use registry::NodeRegistry;
pub use runtime::{FlowRuntime, RunReport, RuntimeConfig, WORKSPACE_ENV};
pub use scheduler::schedule;
