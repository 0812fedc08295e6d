//! Run configuration.
//!
//! [`ReelConfig`] is loaded once (JSON, every section optional), validated, and then passed by
//! reference into every stage. Nothing reads configuration from ambient state.

use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult};
use crate::profile::{QualityTier, VideoShape};
use crate::transitions::{EffectKind, TransitionCaps};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for concurrent image operations.
pub const MAX_WORKERS: usize = 4;

/// Complete configuration for preparing and rendering one product.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    pub style: StyleOptions,
    pub timeline: TimelineConfig,
    pub transitions: TransitionConfig,
    pub mix: MixConfig,
    pub background: BackgroundConfig,
    pub process: ProcessConfig,
    /// Optional logo overlay drawn over the finished video chain.
    pub watermark: Option<WatermarkConfig>,
}

/// Caller-facing style switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOptions {
    pub quality: QualityTier,
    pub enable_intro_outro: bool,
    pub enable_background_music: bool,
    /// Shape rendered by default when the caller does not ask for a specific one.
    pub target_shape: VideoShape,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            quality: QualityTier::High,
            enable_intro_outro: true,
            enable_background_music: true,
            target_shape: VideoShape::Horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineConfig {
    /// Granularity of the per-image split; the final image absorbs the remainder.
    pub split_quantum_ms: u64,
    /// Shortest main-block image duration accepted.
    pub min_image_ms: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            split_quantum_ms: 10,
            min_image_ms: 100,
        }
    }
}

impl TimelineConfig {
    pub fn split_quantum(&self) -> TimeMs {
        TimeMs::from_millis(self.split_quantum_ms)
    }

    pub fn min_image(&self) -> TimeMs {
        TimeMs::from_millis(self.min_image_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub long_form: TransitionCaps,
    pub short_form: TransitionCaps,
    /// Effects the selector may draw from.
    pub palette: Vec<EffectKind>,
    /// Cross-fade the intro into the main block and the main block into the outro instead of
    /// cutting.
    pub crossfade_intro_outro: bool,
    /// Fixed selector seed; `None` draws one from system entropy.
    pub seed: Option<u64>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            long_form: TransitionCaps::LONG_FORM,
            short_form: TransitionCaps::SHORT_FORM,
            palette: EffectKind::ALL.to_vec(),
            crossfade_intro_outro: false,
            seed: None,
        }
    }
}

impl TransitionConfig {
    /// Caps for the given output shape.
    pub fn caps_for(&self, shape: VideoShape) -> TransitionCaps {
        match shape {
            VideoShape::Horizontal => self.long_form,
            VideoShape::Vertical => self.short_form,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MixConfig {
    /// Music gain while any narration lane is active.
    pub duck_gain: f32,
    /// Music gain everywhere else.
    pub ambient_gain: f32,
    /// Directory holding the background music pool.
    pub music_dir: Option<PathBuf>,
    /// Files whose stem contains one of these (case-insensitive) are never used as music.
    pub reserved_names: Vec<String>,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            duck_gain: 0.18,
            ambient_gain: 0.55,
            music_dir: None,
            reserved_names: vec![
                "notification".to_string(),
                "alert".to_string(),
                "system".to_string(),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    pub enabled: bool,
    /// Relative aspect-ratio difference still treated as a match.
    pub aspect_tolerance: f64,
    /// Processed-image cache shared by every render of a product.
    pub cache_dir: PathBuf,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            aspect_tolerance: 0.01,
            cache_dir: PathBuf::from("target/slidereel-cache"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub probe_timeout_secs: u64,
    pub encode_timeout_secs: u64,
    /// Extra attempts when an external tool fails to start.
    pub spawn_retries: u32,
    /// Concurrent image operations (probing, background generation).
    pub workers: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            probe_timeout_secs: 30,
            encode_timeout_secs: 3600,
            spawn_retries: 2,
            workers: MAX_WORKERS,
        }
    }
}

impl ProcessConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.encode_timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatermarkConfig {
    pub path: PathBuf,
    /// Distance from the bottom-right canvas corner, in pixels.
    #[serde(default = "default_watermark_margin")]
    pub margin_px: u32,
    /// Watermark width as a fraction of the canvas width, in permille.
    #[serde(default = "default_watermark_width")]
    pub width_permille: u32,
}

fn default_watermark_margin() -> u32 {
    24
}

fn default_watermark_width() -> u32 {
    120
}

impl ReelConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::validation(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check cross-field constraints, reporting every problem at once.
    pub fn validate(&self) -> ReelResult<()> {
        let mut errors = ConfigErrors::default();

        if self.timeline.split_quantum_ms == 0 {
            errors.push("timeline.split_quantum_ms", "must be > 0");
        }
        let min_image_in_range =
            (1..=TimeMs::MAX_INPUT.as_millis()).contains(&self.timeline.min_image_ms);
        if !min_image_in_range {
            errors.push("timeline.min_image_ms", "must be > 0 and at most 24 hours");
        }

        for (name, caps) in [
            ("transitions.long_form", &self.transitions.long_form),
            ("transitions.short_form", &self.transitions.short_form),
        ] {
            if caps.max.is_zero() {
                errors.push(name, "max_ms must be > 0");
            }
            if !(1..=50).contains(&caps.percent_of_shorter) {
                errors.push(name, "percent_of_shorter must be in 1..=50");
            } else if min_image_in_range && !caps.max.is_zero() {
                let shortest = self.timeline.min_image();
                if caps.duration_for(shortest, shortest).is_zero() {
                    errors.push(
                        name,
                        "transition between two timeline.min_image_ms images would round to zero",
                    );
                }
            }
        }
        if self.transitions.palette.is_empty() {
            errors.push("transitions.palette", "must name at least one effect");
        }

        for (name, gain) in [
            ("mix.duck_gain", self.mix.duck_gain),
            ("mix.ambient_gain", self.mix.ambient_gain),
        ] {
            if !gain.is_finite() || !(0.0..=1.0).contains(&gain) {
                errors.push(name, "must be within [0, 1]");
            }
        }
        if self.mix.duck_gain > self.mix.ambient_gain {
            errors.push("mix.duck_gain", "must not exceed mix.ambient_gain");
        }

        let tol = self.background.aspect_tolerance;
        if !tol.is_finite() || !(0.0..0.5).contains(&tol) {
            errors.push("background.aspect_tolerance", "must be within [0, 0.5)");
        }

        if !(1..=MAX_WORKERS).contains(&self.process.workers) {
            errors.push("process.workers", format!("must be in 1..={MAX_WORKERS}"));
        }
        if self.process.probe_timeout_secs == 0 {
            errors.push("process.probe_timeout_secs", "must be > 0");
        }
        if self.process.encode_timeout_secs == 0 {
            errors.push("process.encode_timeout_secs", "must be > 0");
        }

        if let Some(wm) = &self.watermark
            && !(1..=500).contains(&wm.width_permille)
        {
            errors.push("watermark.width_permille", "must be in 1..=500");
        }

        errors.into_result()
    }
}

#[derive(Default)]
struct ConfigErrors {
    errors: Vec<(&'static str, String)>,
}

impl ConfigErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    fn into_result(self) -> ReelResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ReelError::validation(format!("invalid config:\n{self}")))
        }
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "$.{field}: {message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
