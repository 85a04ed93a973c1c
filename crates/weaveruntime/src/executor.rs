use crate::registry::NodeRegistry;
use crate::scheduler;
use std::collections::BTreeMap;
use std::time::Instant;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;
use weavecore::{
    DependencyMap, ExecutionContext, FlowError, InputResolver, LogEntry, NodeContext, NodeId,
    PortMap, Workflow,
};

pub type ExecutionId = Uuid;

/// Executes workflows one node at a time in scheduled order
#[derive(Debug, Default)]
pub struct WorkflowExecutor;

impl WorkflowExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a workflow and return results
    ///
    /// Fail-fast: the first error ends the run. The failure keeps whatever
    /// was captured and logged up to that point.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        registry: &NodeRegistry,
    ) -> Result<ExecutionResult, ExecutionFailure> {
        let execution_id = ExecutionId::new_v4();
        let span = tracing::info_span!("run", %execution_id);
        self.execute_inner(execution_id, workflow, registry)
            .instrument(span)
            .await
    }

    async fn execute_inner(
        &self,
        execution_id: ExecutionId,
        workflow: &Workflow,
        registry: &NodeRegistry,
    ) -> Result<ExecutionResult, ExecutionFailure> {
        let start_time = Instant::now();
        let mut ctx = ExecutionContext::new();

        tracing::info!(
            "Starting workflow execution: {} nodes, {} links",
            workflow.nodes.len(),
            workflow.links.len()
        );

        let inputs = DependencyMap::from_workflow(workflow);
        let order = match scheduler::schedule(workflow) {
            Ok(order) => order,
            Err(e) => {
                tracing::error!("Workflow rejected: {}", e);
                return Err(ExecutionFailure::new(e.into(), ctx));
            }
        };

        for node in order {
            ctx.log_running(node);

            let handler = match registry.get(&node.node_type) {
                Ok(handler) => handler,
                Err(e) => {
                    tracing::error!("Node {} has no handler: {}", node.id, e);
                    return Err(ExecutionFailure::new(e, ctx));
                }
            };

            let node_start = Instant::now();
            let result = handler
                .execute(NodeContext::new(
                    node,
                    InputResolver::new(&node.id, &inputs, &ctx),
                    &ctx,
                ))
                .await;
            let duration_ms = node_start.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    tracing::info!("Node {} ({}) completed in {}ms", node.id, node.node_type, duration_ms);
                    ctx.record_done(node, output.outputs);
                }
                Err(e) => {
                    tracing::error!("Node {} ({}) failed: {}", node.id, node.node_type, e);
                    ctx.record_error(node, e.to_string());
                    let error = FlowError::NodeExecution {
                        node_id: node.id.clone(),
                        node_type: node.node_type.clone(),
                        source: e,
                    };
                    return Err(ExecutionFailure::new(error, ctx));
                }
            }
        }

        tracing::info!(
            "Workflow completed successfully in {}ms",
            start_time.elapsed().as_millis()
        );

        let (outputs, logs) = ctx.into_parts();
        Ok(ExecutionResult {
            execution_id,
            outputs,
            logs,
        })
    }
}

/// Result of workflow execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub execution_id: ExecutionId,
    pub outputs: BTreeMap<NodeId, PortMap>,
    pub logs: Vec<LogEntry>,
}

/// A failed run: the error that ended it plus the partial trail.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ExecutionFailure {
    #[source]
    pub error: FlowError,
    pub outputs: BTreeMap<NodeId, PortMap>,
    pub logs: Vec<LogEntry>,
}

impl ExecutionFailure {
    fn new(error: FlowError, ctx: ExecutionContext) -> Self {
        let (outputs, logs) = ctx.into_parts();
        Self {
            error,
            outputs,
            logs,
        }
    }
}
