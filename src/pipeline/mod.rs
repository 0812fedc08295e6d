//! Staged pipeline: prepare a product once, then plan and render any number of output shapes
//! from the same prepared assets.
//!
//! ```text
//! RenderRequest -> prepare_product -> PreparedProduct
//!                                        |-> plan_render(Horizontal) -> render
//!                                        `-> plan_render(Vertical)   -> render
//! ```
//!
//! Only preparation and encoding touch the filesystem or external tools. Planning is a pure
//! function of the prepared product, the configuration and the selector.

pub(crate) mod report;
pub(crate) mod request;

pub use report::{LaneReport, SegmentReport, TimingReport, TransitionReport};
pub use request::{BookendRequest, DEFAULT_BOOKEND_DURATION, RenderRequest};

use crate::assets::{MediaAsset, Prober, probe_images};
use crate::audio::{AudioLane, NarrationSet, plan_lanes, select_music};
use crate::background::{ProcessedImageSet, process_images};
use crate::config::ReelConfig;
use crate::encode::EncoderBackend;
use crate::foundation::error::ReelResult;
use crate::foundation::fallback::DegradedFallback;
use crate::graph::{RenderGraph, emit_render_graph};
use crate::profile::{OutputProfile, VideoShape, reference_canvas, select_profile};
use crate::timeline::{ClipSpec, Timeline};
use crate::transitions::{EffectSelector, Transition, TransitionPolicy, schedule_transitions};
use std::path::{Path, PathBuf};

/// Probed and processed inputs shared by every render of one product.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedProduct {
    pub product_id: String,
    /// Main-block images, processed against the reference canvas.
    pub images: ProcessedImageSet,
    pub intro: Option<ClipSpec>,
    pub outro: Option<ClipSpec>,
    pub narration: NarrationSet,
    pub music: Option<MediaAsset>,
    /// Everything that fell back to a simpler equivalent while preparing.
    pub degradations: Vec<DegradedFallback>,
}

/// Everything needed to encode one output shape.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub profile: OutputProfile,
    pub timeline: Timeline,
    pub transitions: Vec<Transition>,
    pub lanes: Vec<AudioLane>,
    pub graph: RenderGraph,
    pub report: TimingReport,
}

/// A finished output file.
#[derive(Clone, Debug)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub report: TimingReport,
}

/// Probe every input, build the shared processed-image set and pick background music.
///
/// Unreadable images or narration abort; a failed smart background or unavailable music is
/// recorded as a degradation.
#[tracing::instrument(skip_all, fields(product = %request.product_id, images = request.images.len()))]
pub fn prepare_product(
    request: &RenderRequest,
    config: &ReelConfig,
    prober: &dyn Prober,
    selector: &mut dyn EffectSelector,
) -> ReelResult<PreparedProduct> {
    request.validate()?;
    config.validate()?;
    let workers = config.process.workers;

    let (intro_req, outro_req) = if config.style.enable_intro_outro {
        (request.intro.as_ref(), request.outro.as_ref())
    } else {
        (None, None)
    };

    let mut paths = request.images.clone();
    paths.extend(intro_req.map(|b| b.image.clone()));
    paths.extend(outro_req.map(|b| b.image.clone()));
    let assets = probe_images(prober, &paths, workers)?;

    let main = prober.probe_audio(&request.narration)?;
    main.require_duration()?;
    let probe_narration = |b: Option<&BookendRequest>| -> ReelResult<Option<MediaAsset>> {
        match b.and_then(|b| b.narration.as_ref()) {
            Some(path) => {
                let asset = prober.probe_audio(path)?;
                asset.require_duration()?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    };
    let intro_narration = probe_narration(intro_req)?;
    let outro_narration = probe_narration(outro_req)?;

    let canvas = reference_canvas(config.style.quality);
    let mut processed = process_images(&assets, canvas, &config.background, workers)?;
    let mut degradations = std::mem::take(&mut processed.degradations);

    // Bookend images were appended after the main images, outro last.
    let outro = match outro_req {
        Some(b) => {
            let image = processed.images.pop();
            let duration = b.resolve_duration(outro_narration.as_ref().and_then(|a| a.duration))?;
            image.map(|p| ClipSpec {
                asset: p.asset,
                duration,
            })
        }
        None => None,
    };
    let intro = match intro_req {
        Some(b) => {
            let image = processed.images.pop();
            let duration = b.resolve_duration(intro_narration.as_ref().and_then(|a| a.duration))?;
            image.map(|p| ClipSpec {
                asset: p.asset,
                duration,
            })
        }
        None => None,
    };

    let (music, music_degraded) = select_music(
        config.style.enable_background_music,
        &config.mix,
        prober,
        selector,
    )?;
    degradations.extend(music_degraded);

    tracing::debug!(
        images = processed.images.len(),
        intro = intro.is_some(),
        outro = outro.is_some(),
        music = music.is_some(),
        degraded = degradations.len(),
        "product prepared"
    );
    Ok(PreparedProduct {
        product_id: request.product_id.clone(),
        images: processed,
        intro,
        outro,
        narration: NarrationSet {
            main,
            intro: intro_narration,
            outro: outro_narration,
        },
        music,
        degradations,
    })
}

/// Plan one output shape: profile, timeline, transitions, lanes, render graph and report.
#[tracing::instrument(skip_all, fields(product = %prepared.product_id, shape = shape.as_str()))]
pub fn plan_render(
    prepared: &PreparedProduct,
    shape: VideoShape,
    config: &ReelConfig,
    selector: &mut dyn EffectSelector,
) -> ReelResult<RenderPlan> {
    let profile = select_profile(shape, config.style.quality);
    let main = prepared.narration.main.require_duration()?;

    let mut timeline = Timeline::build(
        &prepared.images.assets(),
        main,
        prepared.intro.clone(),
        prepared.outro.clone(),
        &config.timeline,
    )?;
    let policy = TransitionPolicy {
        caps: config.transitions.caps_for(shape),
        palette: &config.transitions.palette,
        across_bookends: config.transitions.crossfade_intro_outro,
    };
    let transitions = schedule_transitions(&mut timeline, &policy, selector)?;
    let lanes = plan_lanes(
        &timeline,
        &prepared.narration,
        prepared.music.as_ref(),
        &config.mix,
    )?;
    let graph = emit_render_graph(
        &timeline,
        &transitions,
        &lanes,
        &profile,
        config.watermark.as_ref(),
    )?;
    let report = TimingReport::new(
        &prepared.product_id,
        &profile,
        &timeline,
        &transitions,
        &lanes,
        &prepared.degradations,
    );
    tracing::debug!(
        total = %timeline.total_duration(),
        transitions = transitions.len(),
        nodes = graph.nodes.len(),
        "render planned"
    );
    Ok(RenderPlan {
        profile,
        timeline,
        transitions,
        lanes,
        graph,
        report,
    })
}

/// Encode `plan` into `out` with `backend`.
#[tracing::instrument(skip_all, fields(backend = backend.name(), out = %out.display()))]
pub fn render(
    plan: &RenderPlan,
    backend: &dyn EncoderBackend,
    out: &Path,
) -> ReelResult<RenderOutcome> {
    tracing::info!(
        shape = plan.profile.shape.as_str(),
        total = %plan.report.total,
        "encoding"
    );
    backend.encode(&plan.graph, out)?;
    Ok(RenderOutcome {
        path: out.to_path_buf(),
        report: plan.report.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/pipeline.rs"]
mod tests;
