use crate::audio::VolumeEnvelope;
use crate::foundation::error::{ReelError, ReelResult};
use crate::graph::{
    Corner, GraphInput, NodeOp, RenderGraph, RenderGraphNode, ScaleFit, StreamKind, StreamRef,
};
use crate::transitions::EffectKind;

/// `xfade` transition name for an effect.
pub fn xfade_name(effect: EffectKind) -> &'static str {
    match effect {
        EffectKind::Fade => "fade",
        EffectKind::FadeBlack => "fadeblack",
        EffectKind::FadeWhite => "fadewhite",
        EffectKind::Dissolve => "dissolve",
        EffectKind::Pixelize => "pixelize",
        EffectKind::WipeLeft => "wipeleft",
        EffectKind::WipeRight => "wiperight",
        EffectKind::WipeUp => "wipeup",
        EffectKind::WipeDown => "wipedown",
        EffectKind::SlideLeft => "slideleft",
        EffectKind::SlideRight => "slideright",
        EffectKind::SlideUp => "slideup",
        EffectKind::SlideDown => "slidedown",
        EffectKind::CircleOpen => "circleopen",
        EffectKind::CircleClose => "circleclose",
        EffectKind::HorzOpen => "horzopen",
        EffectKind::HorzClose => "horzclose",
        EffectKind::VertOpen => "vertopen",
        EffectKind::VertClose => "vertclose",
    }
}

/// Filter-graph label of a stream (`[0:v]`, `[n3]`).
pub(crate) fn stream_label(graph: &RenderGraph, r: StreamRef) -> String {
    match r {
        StreamRef::Input(id) => {
            let suffix = match graph.input(id).map(GraphInput::kind) {
                Some(StreamKind::Audio) => "a",
                _ => "v",
            };
            format!("[{}:{suffix}]", id.0)
        }
        StreamRef::Node(id) => format!("[n{}]", id.0),
    }
}

/// Compile every non-mux node into one `-filter_complex` script.
///
/// Only typed node parameters reach the script; file paths never do.
pub fn filter_complex(graph: &RenderGraph) -> ReelResult<String> {
    let mut chains = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let Some(filter) = node_filter(node)? else {
            continue;
        };
        let inputs: String = node
            .inputs
            .iter()
            .map(|r| stream_label(graph, *r))
            .collect();
        chains.push(format!("{inputs}{filter}[n{}]", node.id.0));
    }
    Ok(chains.join(";"))
}

fn node_filter(node: &RenderGraphNode) -> ReelResult<Option<String>> {
    let f = match &node.op {
        NodeOp::Scale { width, height, fit } => match fit {
            ScaleFit::Cover => {
                format!("scale={width}:{height}:force_original_aspect_ratio=increase")
            }
            ScaleFit::Contain => {
                format!("scale={width}:{height}:force_original_aspect_ratio=decrease")
            }
            ScaleFit::Width => format!("scale={width}:-2"),
        },
        NodeOp::Crop { width, height } => format!("crop={width}:{height}"),
        NodeOp::Pad {
            width,
            height,
            color,
        } => format!(
            "pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color={}",
            color.to_ffmpeg()
        ),
        NodeOp::Normalize { fps, pixel_format } => format!(
            "setsar=1,fps={},format={}",
            fps.ratio_string(),
            pixel_format.as_str()
        ),
        NodeOp::Overlay { corner, margin } => {
            let m = margin;
            let (x, y) = match corner {
                Corner::TopLeft => (format!("{m}"), format!("{m}")),
                Corner::TopRight => (format!("main_w-overlay_w-{m}"), format!("{m}")),
                Corner::BottomLeft => (format!("{m}"), format!("main_h-overlay_h-{m}")),
                Corner::BottomRight => (
                    format!("main_w-overlay_w-{m}"),
                    format!("main_h-overlay_h-{m}"),
                ),
            };
            format!("overlay={x}:{y}:eof_action=pass")
        }
        NodeOp::Crossfade {
            effect,
            duration,
            offset,
        } => format!(
            "xfade=transition={}:duration={}:offset={}",
            xfade_name(*effect),
            duration.secs_string(),
            offset.secs_string()
        ),
        NodeOp::Concat => "concat=n=2:v=1:a=0".to_string(),
        NodeOp::AudioTrim { start, end } => format!(
            "atrim=start={}:end={},asetpts=PTS-STARTPTS",
            start.secs_string(),
            end.secs_string()
        ),
        NodeOp::AudioDelay { delay } => format!("adelay=delays={}:all=1", delay.as_millis()),
        NodeOp::AudioVolumeEnvelope { envelope } => volume_filter(envelope)?,
        NodeOp::AudioMix => format!(
            "amix=inputs={}:duration=longest:normalize=0",
            node.inputs.len()
        ),
        NodeOp::Mux { .. } => return Ok(None),
    };
    Ok(Some(f))
}

/// `volume` filter evaluating the envelope per frame as a nested `if` over its breakpoints.
pub fn volume_filter(envelope: &VolumeEnvelope) -> ReelResult<String> {
    let gains = std::iter::once(envelope.initial_gain)
        .chain(envelope.breakpoints.iter().map(|b| b.gain));
    for g in gains {
        if !g.is_finite() || g < 0.0 {
            return Err(ReelError::validation(format!("invalid envelope gain {g}")));
        }
    }
    if envelope.breakpoints.is_empty() {
        return Ok(format!("volume={:.4}", envelope.initial_gain));
    }

    let mut expr = String::new();
    let mut current = envelope.initial_gain;
    for b in &envelope.breakpoints {
        expr.push_str(&format!("if(lt(t,{}),{current:.4},", b.at.secs_string()));
        current = b.gain;
    }
    expr.push_str(&format!("{current:.4}"));
    expr.push_str(&")".repeat(envelope.breakpoints.len()));
    Ok(format!("volume='{expr}':eval=frame"))
}
