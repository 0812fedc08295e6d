//! Slidereel turns an ordered list of product images plus narration into a finished slideshow
//! video.
//!
//! The pipeline is staged and deterministic for a fixed selector seed:
//!
//! - Probe and prepare a product once ([`prepare_product`])
//! - Plan a render for each output shape ([`plan_render`]): timeline, cross-fades, ducked audio
//!   lanes and a versioned [`RenderGraph`]
//! - Execute the graph with an [`EncoderBackend`] ([`render`])
#![forbid(unsafe_code)]

mod foundation;

/// Asset probing.
pub mod assets;
/// Audio lane planning and ducking envelopes.
pub mod audio;
/// Smart background compositor and processed-image cache.
pub mod background;
/// Run configuration.
pub mod config;
/// Encoder backends.
pub mod encode;
/// Render graph wire format and emitter.
pub mod graph;
/// Staged product pipeline.
pub mod pipeline;
/// Output profile selection.
pub mod profile;
/// Timeline construction.
pub mod timeline;
/// Transition scheduling.
pub mod transitions;

pub use crate::foundation::color::Rgb8;
pub use crate::foundation::core::{Canvas, Fps, TimeMs};
pub use crate::foundation::error::{ReelError, ReelResult, Stage};
pub use crate::foundation::fallback::{DegradedFallback, Recovered, Strategy, first_success};
pub use crate::foundation::process::is_tool_on_path;

pub use crate::assets::{MediaAsset, MediaKind, Prober, SystemProber};
pub use crate::config::ReelConfig;
pub use crate::encode::{EncoderBackend, FfmpegBackend};
pub use crate::graph::{RENDER_GRAPH_VERSION, RenderGraph, RenderGraphNode};
pub use crate::pipeline::{
    PreparedProduct, RenderOutcome, RenderPlan, RenderRequest, TimingReport, plan_render,
    prepare_product, render,
};
pub use crate::profile::{OutputProfile, QualityTier, ScalingPolicy, VideoShape, select_profile};
pub use crate::transitions::{EffectKind, EffectSelector, SeededSelector};
