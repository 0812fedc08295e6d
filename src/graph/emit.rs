use crate::audio::AudioLane;
use crate::config::WatermarkConfig;
use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::graph::model::{
    Corner, GraphInput, InputId, NodeId, NodeOp, RENDER_GRAPH_VERSION, RenderGraph,
    RenderGraphNode, ScaleFit, StreamRef,
};
use crate::profile::{OutputProfile, ScalingPolicy};
use crate::timeline::{Segment, Timeline};
use crate::transitions::Transition;
use smallvec::SmallVec;

/// Compile the finished timeline, transitions and audio lanes into a render graph for `profile`.
///
/// Performs no I/O. Every segment becomes an image input sized to its source duration and fitted
/// to the canvas per the profile's scaling policy; segments are chained with `crossfade` at
/// scheduled junctions and `concat` elsewhere. Each lane is trimmed, delayed and shaped, then
/// all lanes are summed and muxed with the video chain.
#[tracing::instrument(skip_all, fields(segments = timeline.len(), lanes = lanes.len()))]
pub fn emit_render_graph(
    timeline: &Timeline,
    transitions: &[Transition],
    lanes: &[AudioLane],
    profile: &OutputProfile,
    watermark: Option<&WatermarkConfig>,
) -> ReelResult<RenderGraph> {
    let total = timeline.total_duration();
    let mut b = GraphBuilder::default();

    let junctions = index_junctions(timeline, transitions)?;
    let mut chain: Option<(StreamRef, TimeMs)> = None;
    for seg in timeline.segments() {
        let clip = b.segment_clip(seg, profile);
        let len = seg.source_duration();
        chain = Some(match chain {
            None => (clip, len),
            Some((prev, chain_len)) => match junctions[seg.index - 1] {
                Some(t) => {
                    if t.offset + t.duration != chain_len {
                        return Err(ReelError::invariant(
                            Stage::Emit,
                            format!(
                                "crossfade into segment {} starts at {} but the chain ends at {chain_len}",
                                seg.index, t.offset
                            ),
                            timeline.dump(transitions),
                        ));
                    }
                    let node = b.node(
                        NodeOp::Crossfade {
                            effect: t.effect,
                            duration: t.duration,
                            offset: t.offset,
                        },
                        &[prev, clip],
                    );
                    (node, (chain_len + len).saturating_sub(t.duration))
                }
                None => (b.node(NodeOp::Concat, &[prev, clip]), chain_len + len),
            },
        });
    }
    let Some((mut video, chain_len)) = chain else {
        return Err(ReelError::validation("cannot emit a graph for an empty timeline"));
    };
    if chain_len != total {
        return Err(ReelError::invariant(
            Stage::Emit,
            format!("video chain lasts {chain_len}, timeline lasts {total}"),
            timeline.dump(transitions),
        ));
    }

    if let Some(wm) = watermark {
        video = b.watermark(video, wm, profile, total);
    }

    let lane_outs: Vec<StreamRef> = lanes.iter().map(|lane| b.lane(lane)).collect();
    let audio = match lane_outs.as_slice() {
        [] => None,
        [single] => Some(*single),
        many => Some(b.node(NodeOp::AudioMix, many)),
    };

    let mut mux_inputs: SmallVec<[StreamRef; 2]> = SmallVec::new();
    mux_inputs.push(video);
    mux_inputs.extend(audio);
    b.node(
        NodeOp::Mux {
            container: profile.container,
            canvas: profile.canvas,
            fps: profile.fps,
            video: profile.video,
            audio: profile.audio,
            duration: total,
        },
        &mux_inputs,
    );

    let graph = RenderGraph {
        version: RENDER_GRAPH_VERSION,
        duration: total,
        inputs: b.inputs,
        nodes: b.nodes,
    };
    graph.validate()?;
    tracing::debug!(
        inputs = graph.inputs.len(),
        nodes = graph.nodes.len(),
        "render graph emitted"
    );
    Ok(graph)
}

/// Transition per junction `i -> i + 1`, or `None` for a hard cut.
fn index_junctions<'a>(
    timeline: &Timeline,
    transitions: &'a [Transition],
) -> ReelResult<Vec<Option<&'a Transition>>> {
    let mut junctions = vec![None; timeline.len().saturating_sub(1)];
    for t in transitions {
        match junctions.get_mut(t.between_segment) {
            Some(slot) if slot.is_none() => *slot = Some(t),
            _ => {
                return Err(ReelError::invariant(
                    Stage::Emit,
                    format!(
                        "transition after segment {} is duplicated or out of range",
                        t.between_segment
                    ),
                    timeline.dump(transitions),
                ));
            }
        }
    }
    Ok(junctions)
}

#[derive(Default)]
struct GraphBuilder {
    inputs: Vec<GraphInput>,
    nodes: Vec<RenderGraphNode>,
}

impl GraphBuilder {
    fn input(&mut self, input: GraphInput) -> StreamRef {
        let id = InputId(self.inputs.len() as u32);
        self.inputs.push(input);
        StreamRef::Input(id)
    }

    fn node(&mut self, op: NodeOp, inputs: &[StreamRef]) -> StreamRef {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RenderGraphNode {
            id,
            inputs: SmallVec::from_slice(inputs),
            op,
        });
        StreamRef::Node(id)
    }

    fn segment_clip(&mut self, seg: &Segment, profile: &OutputProfile) -> StreamRef {
        let input = self.input(GraphInput::Image {
            path: seg.asset.path.clone(),
            duration: seg.source_duration(),
            fps: profile.fps,
        });
        let (width, height) = (profile.canvas.width, profile.canvas.height);
        let fitted = match profile.scaling_policy {
            ScalingPolicy::IncreaseThenCrop => {
                let scaled = self.node(
                    NodeOp::Scale {
                        width,
                        height,
                        fit: ScaleFit::Cover,
                    },
                    &[input],
                );
                self.node(NodeOp::Crop { width, height }, &[scaled])
            }
            ScalingPolicy::DecreaseThenPad => {
                let scaled = self.node(
                    NodeOp::Scale {
                        width,
                        height,
                        fit: ScaleFit::Contain,
                    },
                    &[input],
                );
                self.node(
                    NodeOp::Pad {
                        width,
                        height,
                        color: seg.asset.dominant_color.unwrap_or(profile.pad_color),
                    },
                    &[scaled],
                )
            }
        };
        self.node(
            NodeOp::Normalize {
                fps: profile.fps,
                pixel_format: profile.video.pixel_format,
            },
            &[fitted],
        )
    }

    fn watermark(
        &mut self,
        video: StreamRef,
        wm: &WatermarkConfig,
        profile: &OutputProfile,
        total: TimeMs,
    ) -> StreamRef {
        let input = self.input(GraphInput::Image {
            path: wm.path.clone(),
            duration: total,
            fps: profile.fps,
        });
        let width = (profile.canvas.width * wm.width_permille / 1000).max(2) & !1;
        let scaled = self.node(
            NodeOp::Scale {
                width,
                height: 0,
                fit: ScaleFit::Width,
            },
            &[input],
        );
        self.node(
            NodeOp::Overlay {
                corner: Corner::BottomRight,
                margin: wm.margin_px,
            },
            &[video, scaled],
        )
    }

    fn lane(&mut self, lane: &AudioLane) -> StreamRef {
        let mut out = self.input(GraphInput::Audio {
            path: lane.source.path.clone(),
            looped: lane.looped,
        });
        out = self.node(
            NodeOp::AudioTrim {
                start: lane.trim_start,
                end: lane.trim_end,
            },
            &[out],
        );
        if !lane.delay.is_zero() {
            out = self.node(NodeOp::AudioDelay { delay: lane.delay }, &[out]);
        }
        if let Some(envelope) = &lane.envelope {
            out = self.node(
                NodeOp::AudioVolumeEnvelope {
                    envelope: envelope.clone(),
                },
                &[out],
            );
        }
        out
    }
}
