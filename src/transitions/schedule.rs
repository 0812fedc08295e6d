use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::timeline::Timeline;
use crate::transitions::caps::{TRANSITION_QUANTUM, TransitionCaps};
use crate::transitions::effect::{EffectKind, EffectSelector, choose_effect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A cross-fade between segment `between_segment` and the one after it.
pub struct Transition {
    pub between_segment: usize,
    pub effect: EffectKind,
    pub duration: TimeMs,
    /// Time on the combined video chain at which the blend begins.
    pub offset: TimeMs,
}

/// Scheduling rules for one render.
#[derive(Clone, Copy, Debug)]
pub struct TransitionPolicy<'a> {
    pub caps: TransitionCaps,
    pub palette: &'a [EffectKind],
    /// Cross-fade into and out of the intro/outro instead of cutting.
    pub across_bookends: bool,
}

/// Plan every cross-fade of `timeline`, apply the overlap extensions they need, and verify the
/// result.
///
/// Groups with a single segment get no transition. Offsets are positions on the chained output:
/// each blend starts `duration` before the chain built so far ends, which is the presentation
/// boundary minus half the duration.
#[tracing::instrument(skip_all, fields(segments = timeline.len()))]
pub fn schedule_transitions(
    timeline: &mut Timeline,
    policy: &TransitionPolicy<'_>,
    selector: &mut dyn EffectSelector,
) -> ReelResult<Vec<Transition>> {
    if policy.palette.is_empty() {
        return Err(ReelError::validation("transition palette is empty"));
    }

    let mut planned = Vec::new();
    let mut previous = None;
    {
        let segments = timeline.segments();
        for group in timeline.crossfade_groups(policy.across_bookends) {
            if group.len() < 2 {
                continue;
            }
            for i in group.start..group.end - 1 {
                let (a, b) = (&segments[i], &segments[i + 1]);
                let duration = policy.caps.duration_for(a.duration, b.duration);
                if duration.is_zero() {
                    tracing::debug!(junction = i, "segments too short to cross-fade, cutting");
                    continue;
                }
                let effect = choose_effect(selector, policy.palette, previous)
                    .ok_or_else(|| ReelError::validation("transition palette is empty"))?;
                previous = Some(effect);
                planned.push(Transition {
                    between_segment: i,
                    effect,
                    duration,
                    offset: TimeMs::ZERO,
                });
            }
        }
    }

    timeline.apply_overlap_extensions(&planned)?;
    assign_chain_offsets(timeline, &mut planned)?;
    verify_transitions(timeline, &planned, policy)?;

    tracing::debug!(transitions = planned.len(), "transitions scheduled");
    Ok(planned)
}

fn assign_chain_offsets(timeline: &Timeline, planned: &mut [Transition]) -> ReelResult<()> {
    let mut chain = TimeMs::ZERO;
    let mut next = 0;
    for (k, seg) in timeline.segments().iter().enumerate() {
        let src = seg.source_duration();
        match planned.get_mut(next) {
            Some(t) if k > 0 && t.between_segment == k - 1 => {
                t.offset = chain.checked_sub(t.duration).ok_or_else(|| {
                    ReelError::invariant(
                        Stage::Transitions,
                        format!("transition {}->{k} is longer than the chain before it", k - 1),
                        timeline.dump(&[]),
                    )
                })?;
                chain = (chain + src).saturating_sub(t.duration);
                next += 1;
            }
            _ => chain += src,
        }
    }
    Ok(())
}

/// Check every scheduling invariant, failing with the full timing dump.
pub fn verify_transitions(
    timeline: &Timeline,
    transitions: &[Transition],
    policy: &TransitionPolicy<'_>,
) -> ReelResult<()> {
    let fail = |message: String| {
        Err(ReelError::invariant(
            Stage::Transitions,
            message,
            timeline.dump(transitions),
        ))
    };
    let segments = timeline.segments();
    let groups = timeline.crossfade_groups(policy.across_bookends);

    let mut expected = Vec::new();
    for group in &groups {
        for i in group.start..group.end.saturating_sub(1) {
            if !policy
                .caps
                .duration_for(segments[i].duration, segments[i + 1].duration)
                .is_zero()
            {
                expected.push(i);
            }
        }
    }
    let actual: Vec<usize> = transitions.iter().map(|t| t.between_segment).collect();
    if actual != expected {
        return fail(format!(
            "transitions at junctions {actual:?}, expected {expected:?}"
        ));
    }

    for (n, t) in transitions.iter().enumerate() {
        let (a, b) = (&segments[t.between_segment], &segments[t.between_segment + 1]);
        let limit = policy.caps.limit(a.duration, b.duration);
        if t.duration.is_zero() || t.duration > limit {
            return fail(format!(
                "transition {n} lasts {}, allowed (0, {limit}]",
                t.duration
            ));
        }
        if t.duration.floor_to(TRANSITION_QUANTUM) != t.duration {
            return fail(format!("transition {n} duration {} is off-quantum", t.duration));
        }
        let half = t.duration.half();
        if a.lead_out != half || b.lead_in != half {
            return fail(format!(
                "transition {n} overlap extensions are {}/{}, expected {half}",
                a.lead_out, b.lead_in
            ));
        }
        let expected_offset = a.end().checked_sub(half);
        if expected_offset != Some(t.offset) {
            return fail(format!(
                "transition {n} starts at {}, expected boundary {} minus {half}",
                t.offset,
                a.end()
            ));
        }
        if n > 0 && transitions[n - 1].effect == t.effect && distinct_effects(policy.palette) > 1 {
            return fail(format!(
                "transitions {} and {n} repeat effect {}",
                n - 1,
                t.effect.as_str()
            ));
        }
    }

    timeline.verify_presentation(transitions)
}

fn distinct_effects(palette: &[EffectKind]) -> usize {
    let mut seen: Vec<EffectKind> = Vec::with_capacity(palette.len());
    for e in palette {
        if !seen.contains(e) {
            seen.push(*e);
        }
    }
    seen.len()
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/schedule.rs"]
mod tests;
