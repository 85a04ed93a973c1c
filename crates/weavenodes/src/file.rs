use crate::text::render;
use async_trait::async_trait;
use weavecore::{
    Node, NodeContext, NodeError, NodeMetadata, NodeOutput, PortDefinition, Workspace,
};

const DEFAULT_MAX_CHARS: u64 = 20_000;
const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Reads a UTF-8 text file from the workspace
pub struct ReadFileNode {
    workspace: Workspace,
}

impl ReadFileNode {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Node for ReadFileNode {
    fn node_type(&self) -> &str {
        "ReadFile"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let config = ctx.config();
        let rel = config.require_str("path")?;
        let max_chars = config.u64_or("max_chars", DEFAULT_MAX_CHARS)? as usize;

        let path = self.workspace.resolve(&rel)?;
        if !path.is_file() {
            return Err(NodeError::ResourceNotFound(rel));
        }

        let bytes = tokio::fs::read(&path).await?;
        let mut text = String::from_utf8_lossy(&bytes).into_owned();

        // Cap what ends up in the run log
        if let Some((cut, _)) = text.char_indices().nth(max_chars) {
            tracing::debug!("ReadFile {}: truncating to {} chars", rel, max_chars);
            text.truncate(cut);
            text.push_str(TRUNCATION_MARKER);
        }

        Ok(NodeOutput::new().with_output("text", text))
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Read a text file from the workspace".to_string(),
            category: "file".to_string(),
            inputs: vec![],
            outputs: vec![PortDefinition::new("text", "File contents", false)],
        }
    }
}

/// Writes text to a file in the workspace
pub struct WriteFileNode {
    workspace: Workspace,
}

impl WriteFileNode {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Node for WriteFileNode {
    fn node_type(&self) -> &str {
        "WriteFile"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let config = ctx.config();
        let rel = config.require_str("path")?;

        // A null from the producer counts as no input
        let content = match ctx.input("text").filter(|v| !v.is_null()) {
            Some(value) => render(value),
            None => config.get("text").map(render).unwrap_or_default(),
        };
        let overwrite = config.bool_or("overwrite", true)?;

        let path = self.workspace.resolve(&rel)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !overwrite && tokio::fs::try_exists(&path).await? {
            return Err(NodeError::ExecutionFailed(format!(
                "{} already exists and overwrite is false",
                rel
            )));
        }

        tokio::fs::write(&path, content.as_bytes()).await?;

        Ok(NodeOutput::new().with_output("path", self.workspace.relative(&path)?))
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Write text to a file in the workspace".to_string(),
            category: "file".to_string(),
            inputs: vec![PortDefinition::new(
                "text",
                "Content to write (falls back to data.text)",
                false,
            )],
            outputs: vec![PortDefinition::new(
                "path",
                "Workspace-relative path written",
                false,
            )],
        }
    }
}
