//! Audio and video nodes backed by an external `ffmpeg` process.

mod audio;
mod video;

pub use audio::MergeAudioNode;
pub use video::{ConcatVideoNode, VideoClipNode};

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use weavecore::{type_name, NodeContext, NodeError, Value, Workspace};

/// Environment variable overriding the ffmpeg binary
pub const FFMPEG_ENV: &str = "FFMPEG_BIN";
/// Environment variable overriding the ffprobe binary
pub const FFPROBE_ENV: &str = "FFPROBE_BIN";

/// How much of ffmpeg's stderr is kept in error messages
const STDERR_TAIL: usize = 800;

/// Launcher for the ffmpeg and ffprobe binaries
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: OsString,
    probe: OsString,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            probe: "ffprobe".into(),
        }
    }

    pub fn with_probe(mut self, probe: impl Into<OsString>) -> Self {
        self.probe = probe.into();
        self
    }

    /// `FFMPEG_BIN`/`FFPROBE_BIN` if set, otherwise the binaries from `PATH`
    pub fn from_env() -> Self {
        let ffmpeg = std::env::var_os(FFMPEG_ENV)
            .filter(|v| !v.is_empty())
            .map(Self::new)
            .unwrap_or_default();
        match std::env::var_os(FFPROBE_ENV).filter(|v| !v.is_empty()) {
            Some(probe) => ffmpeg.with_probe(probe),
            None => ffmpeg,
        }
    }

    /// Run ffmpeg to completion.
    ///
    /// The child is killed if this future is dropped before it exits.
    pub async fn run(&self, args: Vec<OsString>) -> Result<(), NodeError> {
        let mut full: Vec<OsString> = vec!["-hide_banner".into(), "-y".into()];
        full.extend(args);
        capture(&self.program, &full).await?;
        Ok(())
    }

    /// Stream layout of one media file, as reported by ffprobe.
    pub async fn probe(&self, path: &Path) -> Result<MediaInfo, NodeError> {
        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-show_entries".into(),
            "stream=codec_type,width,height:format=duration".into(),
            "-of".into(),
            "json".into(),
            path.as_os_str().to_os_string(),
        ];
        let stdout = capture(&self.probe, &args).await?;
        let report: Value = serde_json::from_slice(&stdout).map_err(|e| {
            NodeError::ExecutionFailed(format!(
                "Unreadable ffprobe output for {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(MediaInfo::from_probe(&report))
    }
}

/// What the video nodes need to know about an input file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaInfo {
    /// Width and height of the first video stream
    pub size: Option<(u64, u64)>,
    pub has_audio: bool,
    /// Container duration in seconds
    pub duration: Option<f64>,
}

impl MediaInfo {
    fn from_probe(report: &Value) -> Self {
        let streams = report["streams"].as_array().map(Vec::as_slice).unwrap_or_default();
        let size = streams
            .iter()
            .filter(|s| s["codec_type"] == "video")
            .find_map(|s| Some((s["width"].as_u64()?, s["height"].as_u64()?)));
        let has_audio = streams.iter().any(|s| s["codec_type"] == "audio");
        // ffprobe prints durations as strings
        let duration = match &report["format"]["duration"] {
            Value::String(s) => s.parse().ok(),
            other => other.as_f64(),
        };
        Self {
            size,
            has_audio,
            duration,
        }
    }
}

/// Run a process to completion and return its stdout.
async fn capture(program: &OsStr, args: &[OsString]) -> Result<Vec<u8>, NodeError> {
    tracing::debug!("Running {:?} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            NodeError::ExecutionFailed(format!(
                "Failed to spawn {}: {}",
                program.to_string_lossy(),
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NodeError::ExecutionFailed(format!(
            "{} exited with status: {}. stderr: {}",
            program.to_string_lossy(),
            output.status,
            tail(stderr.trim(), STDERR_TAIL)
        )));
    }
    Ok(output.stdout)
}

/// Path string from a linked input, falling back to the same config key.
fn path_arg(ctx: &NodeContext<'_>, port: &str) -> Result<String, NodeError> {
    match ctx.input_or_config(port) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(NodeError::InvalidConfig {
            key: port.to_string(),
            expected: "path string".to_string(),
            actual: type_name(other).to_string(),
        }),
        None => Err(NodeError::MissingInput(port.to_string())),
    }
}

/// Resolve a path that must already exist in the workspace.
fn existing_file(workspace: &Workspace, rel: &str) -> Result<PathBuf, NodeError> {
    let path = workspace.resolve(rel)?;
    if !path.is_file() {
        return Err(NodeError::ResourceNotFound(rel.to_string()));
    }
    Ok(path)
}

/// Resolve a destination path, creating its parent directories.
async fn output_file(workspace: &Workspace, rel: &str) -> Result<PathBuf, NodeError> {
    let path = workspace.resolve(rel)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(path)
}

fn tail(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    match s.char_indices().nth(count - max_chars) {
        Some((start, _)) => &s[start..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::{tail, MediaInfo};
    use serde_json::json;

    #[test]
    fn tail_keeps_the_end() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("ééé", 2), "éé");
    }

    #[test]
    fn stream_report_with_video_and_audio() {
        let info = MediaInfo::from_probe(&json!({
            "programs": [],
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 640, "height": 360}
            ],
            "format": {"duration": "3.500000"}
        }));
        assert_eq!(
            info,
            MediaInfo {
                size: Some((640, 360)),
                has_audio: true,
                duration: Some(3.5),
            }
        );
    }

    #[test]
    fn stream_report_of_a_silent_clip() {
        let info = MediaInfo::from_probe(&json!({
            "streams": [{"codec_type": "video", "width": 320, "height": 240}],
            "format": {}
        }));
        assert_eq!(info.size, Some((320, 240)));
        assert!(!info.has_audio);
        assert_eq!(info.duration, None);
    }
}
