use super::{existing_file, output_file, path_arg, Ffmpeg, MediaInfo};
use async_trait::async_trait;
use std::ffi::OsString;
use weavecore::{
    type_name, Node, NodeContext, NodeError, NodeMetadata, NodeOutput, PortDefinition, Value,
    Workspace,
};

/// Encoding knobs shared by the video nodes
struct Encoding {
    fps: u64,
    preset: String,
    threads: u64,
}

impl Encoding {
    fn from_config(ctx: &NodeContext<'_>) -> Result<Self, NodeError> {
        let config = ctx.config();
        Ok(Self {
            fps: config.u64_or("fps", 24)?,
            preset: config.str_or("preset", "ultrafast")?,
            threads: config.u64_or("threads", 2)?,
        })
    }

    fn args(&self) -> Vec<OsString> {
        vec![
            "-r".into(),
            self.fps.to_string().into(),
            "-preset".into(),
            self.preset.clone().into(),
            "-threads".into(),
            self.threads.to_string().into(),
        ]
    }
}

/// Still image plus an audio track rendered to a video
pub struct VideoClipNode {
    workspace: Workspace,
    ffmpeg: Ffmpeg,
}

impl VideoClipNode {
    pub fn new(workspace: Workspace, ffmpeg: Ffmpeg) -> Self {
        Self { workspace, ffmpeg }
    }
}

#[async_trait]
impl Node for VideoClipNode {
    fn node_type(&self) -> &str {
        "VideoClip"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let image_rel = path_arg(&ctx, "image")?;
        let audio_rel = path_arg(&ctx, "audio")?;

        let config = ctx.config();
        // Empty means "as long as the audio"
        let duration = config.opt_f64("duration")?;
        let out_rel = config.str_or("output", "out/videoclip.mp4")?;
        let codec = config.str_or("codec", "libx264")?;
        let audio_codec = config.str_or("audio_codec", "aac")?;
        let encoding = Encoding::from_config(&ctx)?;

        let image = existing_file(&self.workspace, &image_rel)?;
        let audio = existing_file(&self.workspace, &audio_rel)?;
        let out = output_file(&self.workspace, &out_rel).await?;

        let mut args: Vec<OsString> = vec![
            "-loop".into(),
            "1".into(),
            "-i".into(),
            image.into_os_string(),
            "-i".into(),
            audio.into_os_string(),
        ];
        match duration {
            Some(seconds) => {
                args.push("-t".into());
                args.push(seconds.to_string().into());
            }
            None => args.push("-shortest".into()),
        }
        let codecs: Vec<OsString> = vec![
            "-c:v".into(),
            codec.into(),
            "-c:a".into(),
            audio_codec.into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ];
        args.extend(codecs);
        args.extend(encoding.args());
        args.push(out.clone().into_os_string());

        self.ffmpeg.run(args).await?;

        Ok(NodeOutput::new().with_output("video", self.workspace.relative(&out)?))
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Render a still image over an audio track".to_string(),
            category: "media".to_string(),
            inputs: vec![
                PortDefinition::new("image", "Image path (falls back to data.image)", true),
                PortDefinition::new("audio", "Audio path (falls back to data.audio)", true),
            ],
            outputs: vec![PortDefinition::new(
                "video",
                "Workspace-relative path of the clip",
                false,
            )],
        }
    }
}

/// Joins several videos end to end
pub struct ConcatVideoNode {
    workspace: Workspace,
    ffmpeg: Ffmpeg,
}

impl ConcatVideoNode {
    pub fn new(workspace: Workspace, ffmpeg: Ffmpeg) -> Self {
        Self { workspace, ffmpeg }
    }
}

#[async_trait]
impl Node for ConcatVideoNode {
    fn node_type(&self) -> &str {
        "ConcatVideo"
    }

    async fn execute(&self, ctx: NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let videos = match ctx.input_or_config("videos") {
            Some(value) => parse_video_list(value)?,
            None => return Err(NodeError::MissingInput("videos".to_string())),
        };
        if videos.is_empty() {
            return Err(NodeError::MissingInput("videos".to_string()));
        }

        let out_rel = ctx.config().str_or("output", "out/concat.mp4")?;
        let encoding = Encoding::from_config(&ctx)?;

        let mut inputs = Vec::with_capacity(videos.len());
        for rel in &videos {
            inputs.push(existing_file(&self.workspace, rel)?);
        }
        let out = output_file(&self.workspace, &out_rel).await?;

        let mut infos = Vec::with_capacity(inputs.len());
        for path in &inputs {
            infos.push(self.ffmpeg.probe(path).await?);
        }
        let plan = ConcatPlan::new(&videos, &infos, encoding.fps)?;

        let mut args: Vec<OsString> = Vec::new();
        for path in inputs {
            args.push("-i".into());
            args.push(path.into_os_string());
        }
        let filter: Vec<OsString> = vec![
            "-filter_complex".into(),
            plan.filter.into(),
            "-map".into(),
            "[v]".into(),
            "-c:v".into(),
            "libx264".into(),
        ];
        args.extend(filter);
        if plan.audio {
            let audio: Vec<OsString> =
                vec!["-map".into(), "[a]".into(), "-c:a".into(), "aac".into()];
            args.extend(audio);
        }
        args.extend(encoding.args());
        args.push(out.clone().into_os_string());

        self.ffmpeg.run(args).await?;

        Ok(NodeOutput::new().with_output("video", self.workspace.relative(&out)?))
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            description: "Concatenate videos in order".to_string(),
            category: "media".to_string(),
            inputs: vec![PortDefinition::new(
                "videos",
                "JSON list or ';'-separated paths (falls back to data.videos)",
                true,
            )],
            outputs: vec![PortDefinition::new(
                "video",
                "Workspace-relative path of the result",
                false,
            )],
        }
    }
}

/// Filter graph joining clips of any size, with or without sound.
///
/// Every clip is centered on a canvas as large as the largest clip. When at
/// least one clip has sound, silent clips get a silent track of their own
/// length; otherwise the result has no audio at all.
#[derive(Debug, PartialEq)]
struct ConcatPlan {
    filter: String,
    audio: bool,
}

impl ConcatPlan {
    fn new(names: &[String], infos: &[MediaInfo], fps: u64) -> Result<Self, NodeError> {
        let (mut width, mut height) = (0, 0);
        for (name, info) in names.iter().zip(infos) {
            let (w, h) = info.size.ok_or_else(|| {
                NodeError::ExecutionFailed(format!("{} has no video stream", name))
            })?;
            width = width.max(w);
            height = height.max(h);
        }
        // yuv420p needs even dimensions
        width += width % 2;
        height += height % 2;

        let audio = infos.iter().any(|info| info.has_audio);
        let mut filter = String::new();
        let mut pairs = String::new();
        for (i, (name, info)) in names.iter().zip(infos).enumerate() {
            filter.push_str(&format!(
                "[{i}:v]pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}[v{i}];"
            ));
            pairs.push_str(&format!("[v{i}]"));
            if !audio {
                continue;
            }
            if info.has_audio {
                filter.push_str(&format!(
                    "[{i}:a]aformat=sample_rates=44100:channel_layouts=stereo[a{i}];"
                ));
            } else {
                let duration = info.duration.ok_or_else(|| {
                    NodeError::ExecutionFailed(format!("{} has no known duration", name))
                })?;
                filter.push_str(&format!(
                    "anullsrc=r=44100:cl=stereo,atrim=duration={duration}[a{i}];"
                ));
            }
            pairs.push_str(&format!("[a{i}]"));
        }

        let n = infos.len();
        if audio {
            filter.push_str(&format!("{pairs}concat=n={n}:v=1:a=1[v][a]"));
        } else {
            filter.push_str(&format!("{pairs}concat=n={n}:v=1:a=0[v]"));
        }
        Ok(Self { filter, audio })
    }
}

/// Accepts a JSON array of paths, a string holding one, or `a.mp4;b.mp4`.
fn parse_video_list(value: &Value) -> Result<Vec<String>, NodeError> {
    let invalid = |actual: String| NodeError::InvalidConfig {
        key: "videos".to_string(),
        expected: "list of paths".to_string(),
        actual,
    };

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(invalid(format!("list containing {}", type_name(other)))),
            })
            .collect(),
        Value::String(s) => {
            let s = s.trim();
            if s.starts_with('[') {
                serde_json::from_str::<Vec<String>>(s).map_err(|e| invalid(e.to_string()))
            } else {
                Ok(s.split(';')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect())
            }
        }
        other => Err(invalid(type_name(other).to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_video_list, ConcatPlan};
    use crate::media::MediaInfo;
    use serde_json::json;

    fn clip(width: u64, height: u64, has_audio: bool, duration: f64) -> MediaInfo {
        MediaInfo {
            size: Some((width, height)),
            has_audio,
            duration: Some(duration),
        }
    }

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("v{i}.mp4")).collect()
    }

    #[test]
    fn mixed_sizes_and_a_silent_clip() {
        let plan = ConcatPlan::new(
            &names(2),
            &[clip(640, 360, true, 3.0), clip(320, 241, false, 2.5)],
            24,
        )
        .unwrap();

        assert!(plan.audio);
        assert_eq!(
            plan.filter,
            "[0:v]pad=640:360:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=24[v0];\
             [0:a]aformat=sample_rates=44100:channel_layouts=stereo[a0];\
             [1:v]pad=640:360:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=24[v1];\
             anullsrc=r=44100:cl=stereo,atrim=duration=2.5[a1];\
             [v0][a0][v1][a1]concat=n=2:v=1:a=1[v][a]"
        );
    }

    #[test]
    fn all_silent_clips_produce_no_audio() {
        let plan = ConcatPlan::new(
            &names(2),
            &[clip(321, 240, false, 1.0), clip(320, 240, false, 1.0)],
            30,
        )
        .unwrap();

        assert!(!plan.audio);
        assert_eq!(
            plan.filter,
            "[0:v]pad=322:240:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=30[v0];\
             [1:v]pad=322:240:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=30[v1];\
             [v0][v1]concat=n=2:v=1:a=0[v]"
        );
    }

    #[test]
    fn clip_without_video_is_rejected() {
        let audio_only = MediaInfo {
            size: None,
            has_audio: true,
            duration: Some(1.0),
        };
        assert!(ConcatPlan::new(&names(2), &[clip(2, 2, true, 1.0), audio_only], 24).is_err());
    }

    #[test]
    fn semicolon_separated() {
        assert_eq!(
            parse_video_list(&json!(" out/v1.mp4; out/v2.mp4 ;")).unwrap(),
            vec!["out/v1.mp4", "out/v2.mp4"]
        );
    }

    #[test]
    fn json_list_in_a_string() {
        assert_eq!(
            parse_video_list(&json!("[\"a.mp4\", \"b.mp4\"]")).unwrap(),
            vec!["a.mp4", "b.mp4"]
        );
    }

    #[test]
    fn linked_array() {
        assert_eq!(
            parse_video_list(&json!(["a.mp4"])).unwrap(),
            vec!["a.mp4"]
        );
        assert!(parse_video_list(&json!([1, 2])).is_err());
        assert!(parse_video_list(&json!(3)).is_err());
    }
}
