use crate::audio::VolumeEnvelope;
use crate::foundation::color::Rgb8;
use crate::foundation::core::{Canvas, Fps, TimeMs};
use crate::profile::{AudioEncoding, ContainerFormat, PixelFormat, VideoEncoding};
use crate::transitions::EffectKind;
use smallvec::SmallVec;
use std::path::PathBuf;

/// Version of the serialized render graph. Bumped on any incompatible change.
pub const RENDER_GRAPH_VERSION: u32 = 1;

/// Index into [`RenderGraph::inputs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InputId(pub u32);

/// Index into [`RenderGraph::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// A stream consumed by a node: an input file or an earlier node's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRef {
    Input(InputId),
    Node(NodeId),
}

/// Kind of stream flowing along a graph edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    /// Finished container; only produced by `mux`.
    Container,
}

/// An original file read by the encoder.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphInput {
    /// A still image presented as a video stream of `duration` at `fps`.
    Image {
        path: PathBuf,
        duration: TimeMs,
        fps: Fps,
    },
    /// An audio file, repeated indefinitely when `looped`.
    Audio { path: PathBuf, looped: bool },
}

impl GraphInput {
    pub fn kind(&self) -> StreamKind {
        match self {
            Self::Image { .. } => StreamKind::Video,
            Self::Audio { .. } => StreamKind::Audio,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Image { path, .. } | Self::Audio { path, .. } => path,
        }
    }
}

/// How `scale` treats the source aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFit {
    /// Cover the box; one side may overflow.
    Cover,
    /// Fit inside the box; one side may fall short.
    Contain,
    /// Exact `width`; `height` is ignored and follows the aspect ratio (rounded to even).
    Width,
}

/// Corner an overlay is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Operation performed by a node, with exactly the parameters it needs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum NodeOp {
    Scale {
        width: u32,
        height: u32,
        fit: ScaleFit,
    },
    /// Centered crop.
    Crop { width: u32, height: u32 },
    /// Centered pad.
    Pad { width: u32, height: u32, color: Rgb8 },
    /// Square pixels, constant frame rate and pixel format.
    Normalize { fps: Fps, pixel_format: PixelFormat },
    /// Second input drawn over the first.
    Overlay { corner: Corner, margin: u32 },
    /// Blend the end of the first input into the start of the second, beginning at `offset` on
    /// the first input's timeline.
    Crossfade {
        effect: EffectKind,
        duration: TimeMs,
        offset: TimeMs,
    },
    /// Play the second input right after the first (hard cut).
    Concat,
    AudioTrim { start: TimeMs, end: TimeMs },
    AudioDelay { delay: TimeMs },
    AudioVolumeEnvelope { envelope: VolumeEnvelope },
    /// Sum all inputs without normalization.
    AudioMix,
    /// Combine one video stream and optionally one audio stream into the output container.
    Mux {
        container: ContainerFormat,
        canvas: Canvas,
        fps: Fps,
        video: VideoEncoding,
        audio: AudioEncoding,
        duration: TimeMs,
    },
}

impl NodeOp {
    /// Stable op name (matches the serialized tag).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scale { .. } => "scale",
            Self::Crop { .. } => "crop",
            Self::Pad { .. } => "pad",
            Self::Normalize { .. } => "normalize",
            Self::Overlay { .. } => "overlay",
            Self::Crossfade { .. } => "crossfade",
            Self::Concat => "concat",
            Self::AudioTrim { .. } => "audio_trim",
            Self::AudioDelay { .. } => "audio_delay",
            Self::AudioVolumeEnvelope { .. } => "audio_volume_envelope",
            Self::AudioMix => "audio_mix",
            Self::Mux { .. } => "mux",
        }
    }

    /// Kind of the stream this op produces.
    pub fn output_kind(&self) -> StreamKind {
        match self {
            Self::Scale { .. }
            | Self::Crop { .. }
            | Self::Pad { .. }
            | Self::Normalize { .. }
            | Self::Overlay { .. }
            | Self::Crossfade { .. }
            | Self::Concat => StreamKind::Video,
            Self::AudioTrim { .. }
            | Self::AudioDelay { .. }
            | Self::AudioVolumeEnvelope { .. }
            | Self::AudioMix => StreamKind::Audio,
            Self::Mux { .. } => StreamKind::Container,
        }
    }
}

/// One step of the render graph.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderGraphNode {
    pub id: NodeId,
    pub inputs: SmallVec<[StreamRef; 2]>,
    #[serde(flatten)]
    pub op: NodeOp,
}

/// Backend-agnostic instruction list for one render.
///
/// Nodes are ordered: each consumes only inputs or strictly earlier nodes, and the last node is
/// the single `mux`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderGraph {
    pub version: u32,
    pub duration: TimeMs,
    pub inputs: Vec<GraphInput>,
    pub nodes: Vec<RenderGraphNode>,
}
