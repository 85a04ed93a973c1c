use async_trait::async_trait;
use weavecore::{Node, NodeContext, NodeError, NodeMetadata, NodeOutput, PortDefinition, Value};

/// Emits `data.text` on its `text` port
pub struct TextNode;

#[async_trait]
impl Node for TextNode {
    fn node_type(&self) -> &str {
        "Text"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let text = ctx.config().get("text").map(render).unwrap_or_default();
        Ok(NodeOutput::new().with_output("text", text))
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Emit a fixed piece of text".to_string(),
            category: "text".to_string(),
            inputs: vec![],
            outputs: vec![PortDefinition::new("text", "The configured text", false)],
        }
    }
}

/// Text form of a value: strings verbatim, null as empty, anything else as JSON.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
