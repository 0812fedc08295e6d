use crate::foundation::error::{ReelError, ReelResult};

/// Timeline duration or offset with exact millisecond precision.
///
/// All composition arithmetic happens on this integer type; floating point seconds are only
/// accepted (and rounded once) at the input boundary.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct TimeMs(pub u64);

impl TimeMs {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Build from whole milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Build from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    /// Longest duration accepted for a single input (24 hours).
    pub const MAX_INPUT: Self = Self::from_secs(24 * 60 * 60);

    /// Round floating-point seconds to the nearest millisecond.
    ///
    /// Values above [`TimeMs::MAX_INPUT`] are rejected so that sums of inputs cannot overflow.
    pub fn from_secs_f64(secs: f64) -> ReelResult<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ReelError::validation(format!(
                "duration must be finite and >= 0, got {secs}"
            )));
        }
        let ms = (secs * 1000.0).round();
        if ms > Self::MAX_INPUT.0 as f64 {
            return Err(ReelError::validation(format!(
                "duration of {secs}s exceeds the {} limit",
                Self::MAX_INPUT
            )));
        }
        Ok(Self(ms as u64))
    }

    /// Raw millisecond count.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Seconds as `f64` (lossless for any realistic duration).
    pub fn as_secs_f64(self) -> f64 {
        (self.0 as f64) / 1000.0
    }

    /// `true` for a zero duration.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtraction clamped at zero.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Round down to a multiple of `quantum` (identity for a zero quantum).
    pub const fn floor_to(self, quantum: Self) -> Self {
        if quantum.0 == 0 {
            return self;
        }
        Self(self.0 / quantum.0 * quantum.0)
    }

    /// Half the duration, rounded down.
    pub const fn half(self) -> Self {
        Self(self.0 / 2)
    }

    /// Scale by `permille / 1000`, rounding down to whole milliseconds.
    pub const fn mul_permille(self, permille: u32) -> Self {
        Self(self.0 * permille as u64 / 1000)
    }

    /// Seconds formatted with millisecond precision (`12.345`), as used in filter arguments.
    pub fn secs_string(self) -> String {
        format!("{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl std::ops::Add for TimeMs {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for TimeMs {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for TimeMs {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|t| t.0).sum())
    }
}

impl std::fmt::Display for TimeMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.secs_string())
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Index of the frame boundary nearest to `t`.
    ///
    /// Frame counts derived from differences of boundaries always sum to the count of the
    /// enclosing span, which is what keeps per-segment frame accounting exact.
    pub fn frame_at(self, t: TimeMs) -> u64 {
        let num = u128::from(t.0) * u128::from(self.num);
        let den = 1000u128 * u128::from(self.den);
        ((num + (den / 2)) / den) as u64
    }

    /// Number of frames covering `[start, start + len)` on the global frame grid.
    pub fn frames_between(self, start: TimeMs, end: TimeMs) -> u64 {
        self.frame_at(end).saturating_sub(self.frame_at(start))
    }

    /// Rational string form used by encoders (`30/1`).
    pub fn ratio_string(self) -> String {
        format!("{}/{}", self.num, self.den)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas with non-zero, even dimensions (yuv420p requirement).
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// `true` when the canvas is taller than it is wide.
    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
