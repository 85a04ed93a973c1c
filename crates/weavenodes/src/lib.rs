//! Standard node library
//!
//! Built-in handlers for text, workspace files and ffmpeg-backed media.

mod file;
mod media;
mod text;

pub use file::{ReadFileNode, WriteFileNode};
pub use media::{
    ConcatVideoNode, Ffmpeg, MediaInfo, MergeAudioNode, VideoClipNode, FFMPEG_ENV, FFPROBE_ENV,
};
pub use text::TextNode;
use weaveruntime::NodeRegistry;
use weavecore::Workspace;

use std::sync::Arc;

/// Register all standard nodes with a registry
///
/// File and media nodes are confined to `workspace`.
pub fn register_all(registry: &mut NodeRegistry, workspace: &Workspace) {
    let ffmpeg = Ffmpeg::from_env();

    registry.register(Arc::new(TextNode));
    registry.register(Arc::new(ReadFileNode::new(workspace.clone())));
    registry.register(Arc::new(WriteFileNode::new(workspace.clone())));
    registry.register(Arc::new(MergeAudioNode::new(workspace.clone(), ffmpeg.clone())));
    registry.register(Arc::new(VideoClipNode::new(workspace.clone(), ffmpeg.clone())));
    registry.register(Arc::new(ConcatVideoNode::new(workspace.clone(), ffmpeg)));
}
