use crate::audio::{AudioLane, LaneRole};
use crate::foundation::core::{Canvas, Fps, TimeMs};
use crate::foundation::fallback::DegradedFallback;
use crate::profile::{OutputProfile, VideoShape};
use crate::timeline::{SegmentRole, Timeline};
use crate::transitions::{EffectKind, Transition};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Structured timing metadata for one planned render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub product_id: String,
    pub shape: VideoShape,
    pub canvas: Canvas,
    pub fps: Fps,
    pub total: TimeMs,
    pub total_frames: u64,
    pub segments: Vec<SegmentReport>,
    pub transitions: Vec<TransitionReport>,
    pub lanes: Vec<LaneReport>,
    pub degradations: Vec<DegradedFallback>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentReport {
    pub index: usize,
    pub role: SegmentRole,
    pub image: PathBuf,
    pub start: TimeMs,
    pub duration: TimeMs,
    /// Presentation duration plus overlap extensions.
    pub source_duration: TimeMs,
    pub start_frame: u64,
    pub frames: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    pub after_segment: usize,
    pub effect: EffectKind,
    pub offset: TimeMs,
    pub duration: TimeMs,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneReport {
    pub role: LaneRole,
    pub source: PathBuf,
    pub delay: TimeMs,
    pub trim_start: TimeMs,
    pub trim_end: TimeMs,
    pub looped: bool,
}

impl TimingReport {
    pub fn new(
        product_id: &str,
        profile: &OutputProfile,
        timeline: &Timeline,
        transitions: &[Transition],
        lanes: &[AudioLane],
        degradations: &[DegradedFallback],
    ) -> Self {
        let spans = timeline.frame_spans(profile.fps);
        let segments = timeline
            .segments()
            .iter()
            .zip(spans)
            .map(|(s, span)| SegmentReport {
                index: s.index,
                role: s.role,
                image: s.asset.path.clone(),
                start: s.start_offset,
                duration: s.duration,
                source_duration: s.source_duration(),
                start_frame: span.start_frame,
                frames: span.frames,
            })
            .collect();
        Self {
            product_id: product_id.to_string(),
            shape: profile.shape,
            canvas: profile.canvas,
            fps: profile.fps,
            total: timeline.total_duration(),
            total_frames: timeline.total_frames(profile.fps),
            segments,
            transitions: transitions
                .iter()
                .map(|t| TransitionReport {
                    after_segment: t.between_segment,
                    effect: t.effect,
                    offset: t.offset,
                    duration: t.duration,
                })
                .collect(),
            lanes: lanes
                .iter()
                .map(|l| LaneReport {
                    role: l.role,
                    source: l.source.path.clone(),
                    delay: l.delay,
                    trim_start: l.trim_start,
                    trim_end: l.trim_end,
                    looped: l.looped,
                })
                .collect(),
            degradations: degradations.to_vec(),
        }
    }

    /// Human-readable summary for logs and `plan` output.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "{} {} {}x{}@{} total={} frames={}",
            self.product_id,
            self.shape.as_str(),
            self.canvas.width,
            self.canvas.height,
            self.fps.ratio_string(),
            self.total,
            self.total_frames
        );
        for seg in &self.segments {
            let _ = writeln!(
                s,
                "  seg#{:<2} {:<5} start={} dur={} src={} frames={}+{} {}",
                seg.index,
                seg.role.as_str(),
                seg.start,
                seg.duration,
                seg.source_duration,
                seg.start_frame,
                seg.frames,
                seg.image.display()
            );
        }
        for t in &self.transitions {
            let _ = writeln!(
                s,
                "  xfade {}->{} {} offset={} dur={}",
                t.after_segment,
                t.after_segment + 1,
                t.effect.as_str(),
                t.offset,
                t.duration
            );
        }
        for l in &self.lanes {
            let _ = writeln!(
                s,
                "  lane {} delay={} trim=[{}, {}) looped={}",
                l.role.as_str(),
                l.delay,
                l.trim_start,
                l.trim_end,
                l.looped
            );
        }
        for d in &self.degradations {
            let _ = writeln!(s, "  degraded [{}] {}: {}", d.stage, d.subject, d.reason);
        }
        s
    }
}
