use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::graph::model::{
    GraphInput, InputId, NodeId, NodeOp, RENDER_GRAPH_VERSION, RenderGraph, RenderGraphNode,
    StreamKind, StreamRef,
};
use std::fmt::Write as _;

impl RenderGraph {
    /// The terminal `mux` node, if the graph has one.
    pub fn mux(&self) -> Option<&RenderGraphNode> {
        self.nodes
            .last()
            .filter(|n| matches!(n.op, NodeOp::Mux { .. }))
    }

    pub fn input(&self, id: InputId) -> Option<&GraphInput> {
        self.inputs.get(id.0 as usize)
    }

    pub fn node(&self, id: NodeId) -> Option<&RenderGraphNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Kind of the stream behind `r`, if it resolves.
    pub fn stream_kind(&self, r: StreamRef) -> Option<StreamKind> {
        match r {
            StreamRef::Input(id) => self.input(id).map(GraphInput::kind),
            StreamRef::Node(id) => self.node(id).map(|n| n.op.output_kind()),
        }
    }

    /// Structural checks every backend relies on.
    ///
    /// Nodes are numbered by position and only consume inputs or strictly earlier nodes, so the
    /// graph is acyclic. Stream kinds must agree with each op, every stream is consumed exactly
    /// once, and the last node is the only `mux`.
    pub fn validate(&self) -> ReelResult<()> {
        let fail = |message: String| Err(ReelError::invariant(Stage::Emit, message, self.dump()));

        if self.version != RENDER_GRAPH_VERSION {
            return fail(format!(
                "unsupported render graph version {} (expected {RENDER_GRAPH_VERSION})",
                self.version
            ));
        }
        let mut input_uses = vec![0usize; self.inputs.len()];
        let mut node_uses = vec![0usize; self.nodes.len()];

        for (pos, node) in self.nodes.iter().enumerate() {
            if node.id.0 as usize != pos {
                return fail(format!("node at position {pos} has id n#{}", node.id.0));
            }
            let mut kinds = Vec::with_capacity(node.inputs.len());
            for r in &node.inputs {
                match *r {
                    StreamRef::Input(id) if (id.0 as usize) < self.inputs.len() => {
                        input_uses[id.0 as usize] += 1;
                    }
                    StreamRef::Node(id) if (id.0 as usize) < pos => {
                        node_uses[id.0 as usize] += 1;
                    }
                    other => {
                        return fail(format!(
                            "n#{pos} {} consumes {} which is not an input or earlier node",
                            node.op.name(),
                            stream_label(other)
                        ));
                    }
                }
                kinds.extend(self.stream_kind(*r));
            }
            if let Err(msg) = check_arity_and_kinds(&node.op, &kinds) {
                return fail(format!("n#{pos} {}: {msg}", node.op.name()));
            }
            if let NodeOp::Crossfade { duration, .. } = &node.op
                && duration.is_zero()
            {
                return fail(format!("n#{pos} crossfade has zero duration"));
            }
            if let NodeOp::AudioTrim { start, end } = &node.op
                && end <= start
            {
                return fail(format!("n#{pos} audio_trim window [{start}, {end}) is empty"));
            }
        }

        let muxes = self
            .nodes
            .iter()
            .filter(|n| matches!(n.op, NodeOp::Mux { .. }))
            .count();
        let Some(mux) = self.mux() else {
            return fail("graph does not end with a mux node".to_string());
        };
        if muxes != 1 {
            return fail(format!("graph has {muxes} mux nodes"));
        }
        if let NodeOp::Mux { duration, .. } = &mux.op
            && *duration != self.duration
        {
            return fail(format!(
                "mux duration {duration} differs from graph duration {}",
                self.duration
            ));
        }

        if let Some(i) = input_uses.iter().position(|&n| n != 1) {
            return fail(format!("in#{i} consumed {} times", input_uses[i]));
        }
        let last = self.nodes.len() - 1;
        if let Some(i) = node_uses[..last].iter().position(|&n| n != 1) {
            return fail(format!("n#{i} output consumed {} times", node_uses[i]));
        }
        Ok(())
    }

    /// Deterministic, line-oriented description of the graph.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "render_graph v{} duration={}", self.version, self.duration);
        for (i, input) in self.inputs.iter().enumerate() {
            match input {
                GraphInput::Image {
                    path,
                    duration,
                    fps,
                } => {
                    let _ = writeln!(
                        s,
                        "  in#{i} image {} duration={duration} fps={}",
                        path.display(),
                        fps.ratio_string()
                    );
                }
                GraphInput::Audio { path, looped } => {
                    let _ = writeln!(s, "  in#{i} audio {} looped={looped}", path.display());
                }
            }
        }
        for node in &self.nodes {
            let refs: Vec<_> = node.inputs.iter().map(|r| stream_label(*r)).collect();
            let _ = writeln!(
                s,
                "  n#{} {} [{}]{}",
                node.id.0,
                node.op.name(),
                refs.join(", "),
                describe(&node.op)
            );
        }
        s
    }

    pub fn to_json(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelError::serde(e.to_string()))
    }

    /// Parse and validate a serialized graph.
    pub fn from_json(s: &str) -> ReelResult<Self> {
        let graph: Self = serde_json::from_str(s).map_err(|e| ReelError::serde(e.to_string()))?;
        graph.validate()?;
        Ok(graph)
    }
}

fn stream_label(r: StreamRef) -> String {
    match r {
        StreamRef::Input(id) => format!("in#{}", id.0),
        StreamRef::Node(id) => format!("n#{}", id.0),
    }
}

fn check_arity_and_kinds(op: &NodeOp, kinds: &[StreamKind]) -> Result<(), String> {
    use StreamKind::{Audio, Video};

    let all = |want: StreamKind| kinds.iter().all(|k| *k == want);
    let (ok_arity, ok_kinds, expected) = match op {
        NodeOp::Scale { .. } | NodeOp::Crop { .. } | NodeOp::Pad { .. } | NodeOp::Normalize { .. } => {
            (kinds.len() == 1, all(Video), "one video stream")
        }
        NodeOp::Overlay { .. } | NodeOp::Crossfade { .. } | NodeOp::Concat => {
            (kinds.len() == 2, all(Video), "two video streams")
        }
        NodeOp::AudioTrim { .. } | NodeOp::AudioDelay { .. } | NodeOp::AudioVolumeEnvelope { .. } => {
            (kinds.len() == 1, all(Audio), "one audio stream")
        }
        NodeOp::AudioMix => (kinds.len() >= 2, all(Audio), "two or more audio streams"),
        NodeOp::Mux { .. } => (
            matches!(kinds.len(), 1 | 2),
            kinds.first() == Some(&Video) && kinds.get(1).is_none_or(|k| *k == Audio),
            "a video stream and an optional audio stream",
        ),
    };
    if ok_arity && ok_kinds {
        Ok(())
    } else {
        Err(format!("expects {expected}, got {kinds:?}"))
    }
}

fn describe(op: &NodeOp) -> String {
    match op {
        NodeOp::Scale { width, height, fit } => format!(" {width}x{height} fit={fit:?}"),
        NodeOp::Crop { width, height } => format!(" {width}x{height}"),
        NodeOp::Pad {
            width,
            height,
            color,
        } => format!(" {width}x{height} color={}", color.to_hex()),
        NodeOp::Normalize { fps, pixel_format } => {
            format!(" fps={} pix={}", fps.ratio_string(), pixel_format.as_str())
        }
        NodeOp::Overlay { corner, margin } => format!(" corner={corner:?} margin={margin}"),
        NodeOp::Crossfade {
            effect,
            duration,
            offset,
        } => format!(" effect={} dur={duration} offset={offset}", effect.as_str()),
        NodeOp::Concat | NodeOp::AudioMix => String::new(),
        NodeOp::AudioTrim { start, end } => format!(" [{start}, {end})"),
        NodeOp::AudioDelay { delay } => format!(" delay={delay}"),
        NodeOp::AudioVolumeEnvelope { envelope } => {
            let mut s = format!(" initial={:.3}", envelope.initial_gain);
            for b in &envelope.breakpoints {
                let _ = write!(s, " @{}={:.3}", b.at, b.gain);
            }
            s
        }
        NodeOp::Mux {
            container,
            canvas,
            fps,
            video,
            audio,
            duration,
        } => format!(
            " {} {}x{}@{} {} {} crf={} {} aac {}k duration={duration}",
            container.extension(),
            canvas.width,
            canvas.height,
            fps.ratio_string(),
            video.profile.as_str(),
            video.level,
            video.crf,
            video.preset.as_str(),
            audio.bitrate_kbps
        ),
    }
}
