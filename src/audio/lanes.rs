use crate::assets::MediaAsset;
use crate::audio::envelope::{VolumeEnvelope, merge_intervals};
use crate::config::MixConfig;
use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::timeline::Timeline;
use std::fmt::Write as _;

/// What a lane carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneRole {
    IntroNarration,
    MainNarration,
    OutroNarration,
    Music,
}

impl LaneRole {
    pub fn is_narration(self) -> bool {
        !matches!(self, Self::Music)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntroNarration => "intro_narration",
            Self::MainNarration => "main_narration",
            Self::OutroNarration => "outro_narration",
            Self::Music => "music",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One source in the final mix.
///
/// The source is cut to `[trim_start, trim_end)` and then starts at presentation time `delay`.
pub struct AudioLane {
    pub role: LaneRole,
    pub source: MediaAsset,
    pub trim_start: TimeMs,
    pub trim_end: TimeMs,
    pub delay: TimeMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<VolumeEnvelope>,
    /// The source repeats to fill its trim window.
    #[serde(default)]
    pub looped: bool,
}

impl AudioLane {
    pub fn audible_duration(&self) -> TimeMs {
        self.trim_end.saturating_sub(self.trim_start)
    }

    /// Presentation window `[start, end)` in which the lane is audible.
    pub fn active_window(&self) -> (TimeMs, TimeMs) {
        (self.delay, self.delay + self.audible_duration())
    }
}

/// Narration sources for one product.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NarrationSet {
    pub main: MediaAsset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<MediaAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outro: Option<MediaAsset>,
}

/// Build the mix: narration lanes aligned to their blocks plus an optional ducked music lane.
///
/// Intro narration plays from 0 and is cut at the intro's end; main narration starts exactly
/// when the intro ends and never runs past the main block; outro narration starts with the
/// outro. Music spans the whole timeline at `duck_gain` while any narration is audible and
/// `ambient_gain` elsewhere.
#[tracing::instrument(skip_all, fields(total = %timeline.total_duration()))]
pub fn plan_lanes(
    timeline: &Timeline,
    narration: &NarrationSet,
    music: Option<&MediaAsset>,
    mix: &MixConfig,
) -> ReelResult<Vec<AudioLane>> {
    let mut lanes = Vec::with_capacity(4);
    let (main_start, main_end) = timeline.main_window();

    if timeline.has_intro()
        && let Some(intro) = &narration.intro
    {
        lanes.push(narration_lane(
            LaneRole::IntroNarration,
            intro,
            TimeMs::ZERO,
            timeline.intro_duration(),
        )?);
    }

    lanes.push(narration_lane(
        LaneRole::MainNarration,
        &narration.main,
        main_start,
        timeline.main_duration(),
    )?);

    if timeline.has_outro()
        && let Some(outro) = &narration.outro
    {
        lanes.push(narration_lane(
            LaneRole::OutroNarration,
            outro,
            main_end,
            timeline.outro_duration(),
        )?);
    }

    if let Some(track) = music {
        let total = timeline.total_duration();
        let source_len = track.require_duration()?;
        let active: Vec<_> = lanes.iter().map(AudioLane::active_window).collect();
        lanes.push(AudioLane {
            role: LaneRole::Music,
            source: track.clone(),
            trim_start: TimeMs::ZERO,
            trim_end: total,
            delay: TimeMs::ZERO,
            envelope: Some(VolumeEnvelope::ducking(
                &active,
                mix.duck_gain,
                mix.ambient_gain,
            )),
            looped: source_len < total,
        });
    }

    verify_lanes(timeline, &lanes, mix)?;
    tracing::debug!(lanes = lanes.len(), "audio lanes planned");
    Ok(lanes)
}

fn narration_lane(
    role: LaneRole,
    source: &MediaAsset,
    delay: TimeMs,
    window: TimeMs,
) -> ReelResult<AudioLane> {
    let len = source.require_duration()?;
    Ok(AudioLane {
        role,
        source: source.clone(),
        trim_start: TimeMs::ZERO,
        trim_end: len.min(window),
        delay,
        envelope: None,
        looped: false,
    })
}

/// Check lane alignment and the music envelope against the timeline.
pub fn verify_lanes(timeline: &Timeline, lanes: &[AudioLane], mix: &MixConfig) -> ReelResult<()> {
    let fail = |message: String| {
        Err(ReelError::invariant(
            Stage::Audio,
            message,
            dump_lanes(timeline, lanes),
        ))
    };
    let (main_start, main_end) = timeline.main_window();
    let total = timeline.total_duration();

    let mains: Vec<_> = lanes
        .iter()
        .filter(|l| l.role == LaneRole::MainNarration)
        .collect();
    let [main] = mains.as_slice() else {
        return fail(format!("expected one main narration lane, found {}", mains.len()));
    };
    if main.delay != main_start {
        return fail(format!(
            "main narration delayed by {}, intro lasts {main_start}",
            main.delay
        ));
    }

    for lane in lanes {
        if lane.trim_end < lane.trim_start {
            return fail(format!("{} lane has an inverted trim", lane.role.as_str()));
        }
        let (start, end) = lane.active_window();
        let (lo, hi) = match lane.role {
            LaneRole::IntroNarration => (TimeMs::ZERO, main_start),
            LaneRole::MainNarration => (main_start, main_end),
            LaneRole::OutroNarration => (main_end, total),
            LaneRole::Music => (TimeMs::ZERO, total),
        };
        if start < lo || end > hi {
            return fail(format!(
                "{} lane audible over [{start}, {end}) outside its window [{lo}, {hi})",
                lane.role.as_str()
            ));
        }
    }

    let narration: Vec<_> = lanes
        .iter()
        .filter(|l| l.role.is_narration())
        .map(AudioLane::active_window)
        .collect();
    let covered = merge_intervals(&narration);
    let is_covered = |t: TimeMs| covered.iter().any(|(s, e)| *s <= t && t < *e);

    for lane in lanes.iter().filter(|l| l.role == LaneRole::Music) {
        let Some(envelope) = &lane.envelope else {
            return fail("music lane has no envelope".to_string());
        };
        for span in envelope.spans(total) {
            let expected = if is_covered(span.start) {
                mix.duck_gain
            } else {
                mix.ambient_gain
            };
            let inside = |t: TimeMs| span.start < t && t < span.end;
            let uniform = mix.duck_gain == mix.ambient_gain
                || covered.iter().all(|(s, e)| !inside(*s) && !inside(*e));
            if span.gain != expected || !uniform {
                return fail(format!(
                    "music gain {} over [{}, {}) does not match narration coverage",
                    span.gain, span.start, span.end
                ));
            }
        }
    }
    Ok(())
}

/// Deterministic, human-readable lane dump.
pub fn dump_lanes(timeline: &Timeline, lanes: &[AudioLane]) -> String {
    let mut s = String::new();
    let (main_start, main_end) = timeline.main_window();
    let _ = writeln!(
        s,
        "audio total={} main_window=[{main_start}, {main_end})",
        timeline.total_duration()
    );
    for lane in lanes {
        let (start, end) = lane.active_window();
        let _ = writeln!(
            s,
            "  {:<15} delay={} trim=[{}, {}) audible=[{start}, {end}) looped={} src={}",
            lane.role.as_str(),
            lane.delay,
            lane.trim_start,
            lane.trim_end,
            lane.looped,
            lane.source.path.display()
        );
        if let Some(env) = &lane.envelope {
            let _ = write!(s, "    envelope initial={:.3}", env.initial_gain);
            for b in &env.breakpoints {
                let _ = write!(s, " @{}={:.3}", b.at, b.gain);
            }
            let _ = writeln!(s);
        }
    }
    s
}

#[cfg(test)]
#[path = "../../tests/unit/audio/lanes.rs"]
mod tests;
