use crate::foundation::core::TimeMs;

/// Transition durations are multiples of this, so half a transition is an exact millisecond
/// value.
pub const TRANSITION_QUANTUM: TimeMs = TimeMs::from_millis(10);

/// Upper bounds on a cross-fade's duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionCaps {
    /// Absolute cap.
    #[serde(rename = "max_ms")]
    pub max: TimeMs,
    /// Cap relative to the shorter adjacent segment, in percent.
    pub percent_of_shorter: u32,
}

impl TransitionCaps {
    /// Long-form (horizontal) caps: 0.8 s or 20 % of the shorter segment.
    pub const LONG_FORM: Self = Self {
        max: TimeMs::from_millis(800),
        percent_of_shorter: 20,
    };

    /// Short-form (vertical) caps: 0.5 s or 15 % of the shorter segment.
    pub const SHORT_FORM: Self = Self {
        max: TimeMs::from_millis(500),
        percent_of_shorter: 15,
    };

    /// Largest duration these caps allow between segments of length `a` and `b`, before
    /// quantization.
    pub fn limit(self, a: TimeMs, b: TimeMs) -> TimeMs {
        let relative = a.min(b).mul_permille(self.percent_of_shorter.saturating_mul(10));
        self.max.min(relative)
    }

    /// Scheduled duration between segments of length `a` and `b`: the cap, rounded down to the
    /// transition quantum. Zero means the pair is too short to cross-fade.
    pub fn duration_for(self, a: TimeMs, b: TimeMs) -> TimeMs {
        self.limit(a, b).floor_to(TRANSITION_QUANTUM)
    }
}
