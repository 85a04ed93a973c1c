use super::{existing_file, output_file, path_arg, Ffmpeg};
use async_trait::async_trait;
use std::ffi::OsString;
use weavecore::{
    Node, NodeContext, NodeError, NodeMetadata, NodeOutput, PortDefinition, Workspace,
};

/// Mixes two audio tracks into one, padded to the longer of the two
pub struct MergeAudioNode {
    workspace: Workspace,
    ffmpeg: Ffmpeg,
}

impl MergeAudioNode {
    pub fn new(workspace: Workspace, ffmpeg: Ffmpeg) -> Self {
        Self { workspace, ffmpeg }
    }
}

#[async_trait]
impl Node for MergeAudioNode {
    fn node_type(&self) -> &str {
        "MergeAudio"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let a_rel = path_arg(&ctx, "a")?;
        let b_rel = path_arg(&ctx, "b")?;

        let config = ctx.config();
        let out_rel = config.str_or("output", "out/merged.mp3")?;
        let vol_a = config.f64_or("vol_a", 1.0)?;
        let vol_b = config.f64_or("vol_b", 1.0)?;

        let a = existing_file(&self.workspace, &a_rel)?;
        let b = existing_file(&self.workspace, &b_rel)?;
        let out = output_file(&self.workspace, &out_rel).await?;

        let filter = format!(
            "[0:a]volume={}[a0];[1:a]volume={}[a1];[a0][a1]amix=inputs=2:duration=longest:normalize=0[mix]",
            vol_a, vol_b
        );
        let args: Vec<OsString> = vec![
            "-i".into(),
            a.into_os_string(),
            "-i".into(),
            b.into_os_string(),
            "-filter_complex".into(),
            filter.into(),
            "-map".into(),
            "[mix]".into(),
            out.clone().into_os_string(),
        ];
        self.ffmpeg.run(args).await?;

        Ok(NodeOutput::new().with_output("audio", self.workspace.relative(&out)?))
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Mix two audio files with per-track volume".to_string(),
            category: "media".to_string(),
            inputs: vec![
                PortDefinition::new("a", "First audio path (falls back to data.a)", true),
                PortDefinition::new("b", "Second audio path (falls back to data.b)", true),
            ],
            outputs: vec![PortDefinition::new(
                "audio",
                "Workspace-relative path of the mix",
                false,
            )],
        }
    }
}
