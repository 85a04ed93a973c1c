use crate::executor::{ExecutionFailure, WorkflowExecutor};
use crate::registry::NodeRegistry;
use crate::scheduler;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use weavecore::{GraphError, LogEntry, NodeId, PortMap, Workflow, Workspace};

/// Environment variable naming the workspace root
pub const WORKSPACE_ENV: &str = "WEAVE_WORKSPACE";

/// Main runtime for executing workflows
pub struct FlowRuntime {
    registry: Arc<NodeRegistry>,
    executor: WorkflowExecutor,
    workspace: Workspace,
}

impl FlowRuntime {
    /// Create a runtime around a pre-configured registry
    ///
    /// The registry's handlers should have been built against the same
    /// workspace.
    pub fn with_registry(registry: Arc<NodeRegistry>, workspace: Workspace) -> Self {
        Self {
            registry,
            executor: WorkflowExecutor::new(),
            workspace,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Execute a workflow once
    pub async fn run(&self, workflow: &Workflow) -> Result<RunReport, ExecutionFailure> {
        let result = self.executor.execute(workflow, &self.registry).await?;
        Ok(RunReport {
            ok: true,
            workspace: self.workspace.root().display().to_string(),
            outputs: result.outputs,
            logs: result.logs,
        })
    }

    /// Order the workflow without running anything
    pub fn validate(&self, workflow: &Workflow) -> Result<Vec<NodeId>, GraphError> {
        Ok(scheduler::schedule(workflow)?
            .into_iter()
            .map(|node| node.id.clone())
            .collect())
    }
}

/// Successful run as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ok: bool,
    pub workspace: String,
    pub outputs: BTreeMap<NodeId, PortMap>,
    pub logs: Vec<LogEntry>,
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub workspace_root: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("WORKSPACE"),
        }
    }
}

impl RuntimeConfig {
    /// Defaults, with the workspace root taken from `WEAVE_WORKSPACE` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(WORKSPACE_ENV).filter(|v| !v.is_empty()) {
            config.workspace_root = PathBuf::from(root);
        }
        config
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Create the workspace directory if needed and open it
    pub fn open_workspace(&self) -> std::io::Result<Workspace> {
        Workspace::open(&self.workspace_root)
    }
}
