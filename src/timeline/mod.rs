//! Timeline construction.
//!
//! Turns an ordered image list and the main narration duration into presentation segments,
//! optionally framed by intro/outro segments of independent duration. All arithmetic is exact
//! integer milliseconds; the total always equals `intro + main + outro`.

pub(crate) mod model;
pub(crate) mod verify;

pub use model::{ClipSpec, FrameSpan, Segment, SegmentRole};

use crate::assets::MediaAsset;
use crate::config::TimelineConfig;
use crate::foundation::core::{Fps, TimeMs};
use crate::foundation::error::{ReelError, ReelResult};
use crate::transitions::Transition;
use std::ops::Range;

/// Ordered presentation segments for one render.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
    intro: TimeMs,
    main: TimeMs,
    outro: TimeMs,
}

/// Split `total` into `count` parts: every part but the last is `total / count` rounded down to
/// `quantum`; the last absorbs the remainder so the parts sum to `total` exactly.
pub fn split_evenly(total: TimeMs, count: usize, quantum: TimeMs) -> ReelResult<Vec<TimeMs>> {
    if count == 0 {
        return Err(ReelError::validation("cannot split a duration into zero parts"));
    }
    let n = count as u64;
    let base = TimeMs::from_millis(total.as_millis() / n).floor_to(quantum);
    let head = TimeMs::from_millis(base.as_millis() * (n - 1));
    let last = total
        .checked_sub(head)
        .ok_or_else(|| ReelError::validation("split quantum larger than the duration"))?;

    let mut parts = vec![base; count - 1];
    parts.push(last);
    Ok(parts)
}

impl Timeline {
    /// Build the timeline for `images` over `main_narration`, with optional bookends.
    #[tracing::instrument(skip(images, intro, outro, config), fields(images = images.len()))]
    pub fn build(
        images: &[MediaAsset],
        main_narration: TimeMs,
        intro: Option<ClipSpec>,
        outro: Option<ClipSpec>,
        config: &TimelineConfig,
    ) -> ReelResult<Self> {
        if images.is_empty() {
            return Err(ReelError::validation("at least one image is required"));
        }
        if main_narration.is_zero() {
            return Err(ReelError::validation("main narration duration must be > 0"));
        }
        if main_narration > TimeMs::MAX_INPUT {
            return Err(ReelError::validation(format!(
                "main narration of {main_narration} exceeds the {} limit",
                TimeMs::MAX_INPUT
            )));
        }
        for (name, clip) in [("intro", &intro), ("outro", &outro)] {
            if let Some(c) = clip {
                if c.duration.is_zero() {
                    return Err(ReelError::validation(format!("{name} duration must be > 0")));
                }
                if c.duration > TimeMs::MAX_INPUT {
                    return Err(ReelError::validation(format!(
                        "{name} duration of {} exceeds the {} limit",
                        c.duration,
                        TimeMs::MAX_INPUT
                    )));
                }
                c.asset.require_image()?;
            }
        }
        for img in images {
            img.require_image()?;
        }

        let parts = split_evenly(main_narration, images.len(), config.split_quantum())?;
        if parts[0] < config.min_image() {
            return Err(ReelError::validation(format!(
                "narration of {main_narration} is too short for {} images (each would get {}, minimum {})",
                images.len(),
                parts[0],
                config.min_image()
            )));
        }

        let mut segments = Vec::with_capacity(images.len() + 2);
        let mut cursor = TimeMs::ZERO;
        let mut push = |asset: MediaAsset, role: SegmentRole, duration: TimeMs| {
            segments.push(Segment {
                index: segments.len(),
                asset,
                role,
                start_offset: cursor,
                duration,
                lead_in: TimeMs::ZERO,
                lead_out: TimeMs::ZERO,
            });
            cursor += duration;
        };

        let intro_duration = intro.as_ref().map_or(TimeMs::ZERO, |c| c.duration);
        let outro_duration = outro.as_ref().map_or(TimeMs::ZERO, |c| c.duration);
        if let Some(c) = intro {
            push(c.asset, SegmentRole::Intro, c.duration);
        }
        for (asset, duration) in images.iter().zip(parts) {
            push(asset.clone(), SegmentRole::Main, duration);
        }
        if let Some(c) = outro {
            push(c.asset, SegmentRole::Outro, c.duration);
        }

        let timeline = Self {
            segments,
            intro: intro_duration,
            main: main_narration,
            outro: outro_duration,
        };
        timeline.verify_presentation(&[])?;
        tracing::debug!(
            segments = timeline.segments.len(),
            total = %timeline.total_duration(),
            "timeline built"
        );
        Ok(timeline)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn intro_duration(&self) -> TimeMs {
        self.intro
    }

    pub fn main_duration(&self) -> TimeMs {
        self.main
    }

    pub fn outro_duration(&self) -> TimeMs {
        self.outro
    }

    pub fn has_intro(&self) -> bool {
        self.segments.first().is_some_and(Segment::is_intro)
    }

    pub fn has_outro(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_outro)
    }

    /// Exact presentation length: `intro + main + outro`.
    pub fn total_duration(&self) -> TimeMs {
        self.intro + self.main + self.outro
    }

    /// Presentation window `[start, end)` of the main block.
    pub fn main_window(&self) -> (TimeMs, TimeMs) {
        (self.intro, self.intro + self.main)
    }

    /// Maximal runs of segments that may cross-fade into each other.
    ///
    /// Without `across_bookends`, intro and outro each form their own group so the junctions into
    /// and out of the main block are hard cuts.
    pub fn crossfade_groups(&self, across_bookends: bool) -> Vec<Range<usize>> {
        if self.segments.is_empty() {
            return Vec::new();
        }
        if across_bookends {
            return vec![0..self.segments.len()];
        }
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..self.segments.len() {
            if self.segments[i].role != self.segments[i - 1].role {
                groups.push(start..i);
                start = i;
            }
        }
        groups.push(start..self.segments.len());
        groups
    }

    /// Record the overlap extension each transition adds to its two segments.
    pub fn apply_overlap_extensions(&mut self, transitions: &[Transition]) -> ReelResult<()> {
        for s in &mut self.segments {
            s.lead_in = TimeMs::ZERO;
            s.lead_out = TimeMs::ZERO;
        }
        for t in transitions {
            let next = t.between_segment + 1;
            if next >= self.segments.len() {
                return Err(ReelError::validation(format!(
                    "transition after segment {} has no following segment",
                    t.between_segment
                )));
            }
            let half = t.duration.half();
            self.segments[t.between_segment].lead_out = half;
            self.segments[next].lead_in = half;
        }
        Ok(())
    }

    /// Frame-grid placement of every segment at `fps`.
    ///
    /// Spans are derived from cumulative boundaries, so their frame counts sum to the frame
    /// count of the whole timeline.
    pub fn frame_spans(&self, fps: Fps) -> Vec<FrameSpan> {
        self.segments
            .iter()
            .map(|s| {
                let start_frame = fps.frame_at(s.start_offset);
                FrameSpan {
                    index: s.index,
                    start_frame,
                    frames: fps.frame_at(s.end()) - start_frame,
                }
            })
            .collect()
    }

    /// Total frame count at `fps`.
    pub fn total_frames(&self, fps: Fps) -> u64 {
        fps.frame_at(self.total_duration())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/timeline.rs"]
mod tests;
