use crate::foundation::core::TimeMs;

/// Gain change taking effect at `at`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Breakpoint {
    pub at: TimeMs,
    pub gain: f32,
}

/// Piecewise-constant gain curve: `initial_gain` until the first breakpoint, then each
/// breakpoint's gain until the next one.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeEnvelope {
    pub initial_gain: f32,
    pub breakpoints: Vec<Breakpoint>,
}

/// A constant-gain stretch `[start, end)` of an envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainSpan {
    pub start: TimeMs,
    pub end: TimeMs,
    pub gain: f32,
}

/// Sort and merge `[start, end)` intervals, joining touching ones and dropping empty ones.
pub fn merge_intervals(intervals: &[(TimeMs, TimeMs)]) -> Vec<(TimeMs, TimeMs)> {
    let mut sorted: Vec<_> = intervals.iter().copied().filter(|(s, e)| s < e).collect();
    sorted.sort();
    let mut merged: Vec<(TimeMs, TimeMs)> = Vec::with_capacity(sorted.len());
    for (s, e) in sorted {
        match merged.last_mut() {
            Some(last) if s <= last.1 => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }
    merged
}

impl VolumeEnvelope {
    pub fn constant(gain: f32) -> Self {
        Self {
            initial_gain: gain,
            breakpoints: Vec::new(),
        }
    }

    /// `low` wherever any of `active` covers, `high` everywhere else.
    pub fn ducking(active: &[(TimeMs, TimeMs)], low: f32, high: f32) -> Self {
        let merged = merge_intervals(active);
        let initial_gain = match merged.first() {
            Some((s, _)) if s.is_zero() => low,
            _ => high,
        };
        let mut breakpoints = Vec::with_capacity(merged.len() * 2);
        for (s, e) in merged {
            if !s.is_zero() {
                breakpoints.push(Breakpoint { at: s, gain: low });
            }
            breakpoints.push(Breakpoint { at: e, gain: high });
        }
        Self {
            initial_gain,
            breakpoints,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.breakpoints.iter().all(|b| b.gain == self.initial_gain)
    }

    /// Gain in effect at `t`.
    pub fn gain_at(&self, t: TimeMs) -> f32 {
        self.breakpoints
            .iter()
            .take_while(|b| b.at <= t)
            .last()
            .map_or(self.initial_gain, |b| b.gain)
    }

    /// Constant-gain spans covering `[0, until)`, with equal neighbours merged.
    pub fn spans(&self, until: TimeMs) -> Vec<GainSpan> {
        let mut spans: Vec<GainSpan> = Vec::new();
        let mut start = TimeMs::ZERO;
        let mut gain = self.initial_gain;
        for b in &self.breakpoints {
            if b.at >= until {
                break;
            }
            if b.at > start {
                push_span(&mut spans, start, b.at, gain);
            }
            start = start.max(b.at);
            gain = b.gain;
        }
        if until > start {
            push_span(&mut spans, start, until, gain);
        }
        spans
    }
}

fn push_span(spans: &mut Vec<GainSpan>, start: TimeMs, end: TimeMs, gain: f32) {
    match spans.last_mut() {
        Some(last) if last.gain == gain && last.end == start => last.end = end,
        _ => spans.push(GainSpan { start, end, gain }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/envelope.rs"]
mod tests;
