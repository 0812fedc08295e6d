//! Output profile selection.
//!
//! Maps a requested video shape and quality tier to a canvas, scaling policy and a conservative
//! H.264/MP4 encoding profile. Profiles deliberately stay on Baseline/Main at levels every
//! hardware decoder of the last decade handles, rather than the most efficient settings.

use crate::foundation::color::Rgb8;
use crate::foundation::core::{Canvas, Fps};

/// Target frame shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoShape {
    /// Long-form 16:9 video.
    #[default]
    Horizontal,
    /// Short-form 9:16 video.
    Vertical,
}

impl VideoShape {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Requested output quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// 480p-class output, fastest encode.
    Low,
    /// 720p-class output.
    Medium,
    /// 1080p-class output.
    #[default]
    High,
    /// 1080p-class output with a higher bitrate budget.
    Ultra,
}

/// How a source image is fitted to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingPolicy {
    /// Scale until the canvas is covered, then crop the overflow (no letterboxing).
    IncreaseThenCrop,
    /// Scale until the image fits entirely, then pad with a solid color.
    DecreaseThenPad,
}

/// H.264 profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecProfile {
    /// Constrained feature set; widest decoder support.
    Baseline,
    /// The common denominator for TVs, phones and browsers.
    Main,
}

impl CodecProfile {
    /// Encoder argument value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Main => "main",
        }
    }
}

/// H.264 level such as `4.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CodecLevel {
    /// Major part.
    pub major: u8,
    /// Minor part.
    pub minor: u8,
}

impl CodecLevel {
    /// Build a level value.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// `(max macroblocks per frame, max macroblocks per second)` from the H.264 level table.
    pub fn limits(self) -> Option<(u32, u32)> {
        match (self.major, self.minor) {
            (3, 0) => Some((1_620, 40_500)),
            (3, 1) => Some((3_600, 108_000)),
            (3, 2) => Some((5_120, 216_000)),
            (4, 0) | (4, 1) => Some((8_192, 245_760)),
            (4, 2) => Some((8_704, 522_240)),
            (5, 0) => Some((22_080, 589_824)),
            (5, 1) => Some((36_864, 983_040)),
            _ => None,
        }
    }

    /// `true` when `canvas` at `fps` fits this level's frame size and throughput limits.
    pub fn supports(self, canvas: Canvas, fps: Fps) -> bool {
        let Some((max_fs, max_mbps)) = self.limits() else {
            return false;
        };
        let mbs = canvas.width.div_ceil(16) * canvas.height.div_ceil(16);
        let per_sec = u64::from(mbs) * u64::from(fps.num) / u64::from(fps.den).max(1);
        mbs <= max_fs && per_sec <= u64::from(max_mbps)
    }
}

impl std::fmt::Display for CodecLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Output container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// MP4 with the index moved to the front for progressive playback.
    Mp4,
}

impl ContainerFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
        }
    }
}

/// Pixel layout of encoded frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit 4:2:0, the only layout every H.264 decoder supports.
    Yuv420p,
}

impl PixelFormat {
    /// Encoder argument value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
        }
    }
}

/// Encoder speed/quality trade-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderPreset {
    /// Fastest.
    Veryfast,
    /// Fast.
    Fast,
    /// Balanced.
    Medium,
    /// Slow, smallest output.
    Slow,
}

impl EncoderPreset {
    /// Encoder argument value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Veryfast => "veryfast",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        }
    }
}

/// Video stream encoding settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoEncoding {
    /// H.264 profile.
    pub profile: CodecProfile,
    /// H.264 level.
    pub level: CodecLevel,
    /// Encoded pixel format.
    pub pixel_format: PixelFormat,
    /// Constant rate factor (lower is better quality).
    pub crf: u8,
    /// Encoder preset.
    pub preset: EncoderPreset,
}

/// Audio stream encoding settings (AAC-LC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioEncoding {
    /// Bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Resolved target settings for one render. Immutable for the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputProfile {
    /// Requested shape.
    pub shape: VideoShape,
    /// Requested tier.
    pub tier: QualityTier,
    /// Output canvas.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Fit policy for every image.
    pub scaling_policy: ScalingPolicy,
    /// Fill color for [`ScalingPolicy::DecreaseThenPad`] when the image has no dominant color.
    pub pad_color: Rgb8,
    /// Video stream settings.
    pub video: VideoEncoding,
    /// Audio stream settings.
    pub audio: AudioEncoding,
    /// Output container.
    pub container: ContainerFormat,
}

const OUTPUT_FPS: Fps = Fps { num: 30, den: 1 };

/// Choose the output profile for `shape` at `tier`.
///
/// Horizontal output always fills the canvas (increase-then-crop); vertical output always fits
/// and pads (decrease-then-pad), since vertical renders mostly carry landscape imagery that must
/// not be cropped beyond recognition.
pub fn select_profile(shape: VideoShape, tier: QualityTier) -> OutputProfile {
    // Long edge x short edge per tier; orientation applied below.
    let (long, short, level) = match tier {
        QualityTier::Low => (854, 480, CodecLevel::new(3, 1)),
        QualityTier::Medium => (1280, 720, CodecLevel::new(3, 1)),
        QualityTier::High | QualityTier::Ultra => (1920, 1080, CodecLevel::new(4, 0)),
    };
    let (canvas, scaling_policy) = match shape {
        VideoShape::Horizontal => (
            Canvas {
                width: long,
                height: short,
            },
            ScalingPolicy::IncreaseThenCrop,
        ),
        VideoShape::Vertical => (
            Canvas {
                width: short,
                height: long,
            },
            ScalingPolicy::DecreaseThenPad,
        ),
    };
    let (profile, crf, preset, bitrate_kbps) = match tier {
        QualityTier::Low => (CodecProfile::Baseline, 28, EncoderPreset::Veryfast, 96),
        QualityTier::Medium => (CodecProfile::Main, 23, EncoderPreset::Fast, 128),
        QualityTier::High => (CodecProfile::Main, 20, EncoderPreset::Medium, 192),
        QualityTier::Ultra => (CodecProfile::Main, 18, EncoderPreset::Slow, 192),
    };

    OutputProfile {
        shape,
        tier,
        canvas,
        fps: OUTPUT_FPS,
        scaling_policy,
        pad_color: Rgb8::BLACK,
        video: VideoEncoding {
            profile,
            level,
            pixel_format: PixelFormat::Yuv420p,
            crf,
            preset,
        },
        audio: AudioEncoding {
            bitrate_kbps,
            sample_rate: 48_000,
            channels: 2,
        },
        container: ContainerFormat::Mp4,
    }
}

/// Canvas the shared processed-image set is built against for a given tier.
///
/// Both the long-form and the short-form render consume images processed for this canvas.
pub fn reference_canvas(tier: QualityTier) -> Canvas {
    select_profile(VideoShape::Horizontal, tier).canvas
}

#[cfg(test)]
#[path = "../../tests/unit/profile/profile.rs"]
mod tests;
