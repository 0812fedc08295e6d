use crate::foundation::color::Rgb8;
use crate::foundation::core::{Canvas, TimeMs};
use crate::foundation::error::{ReelError, ReelResult};
use std::path::{Path, PathBuf};

/// Kind of a probed input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A probed input file. Immutable once probed.
///
/// Images carry dimensions and a dominant color but no duration (the timeline assigns one);
/// audio carries its probed duration.
pub struct MediaAsset {
    pub path: PathBuf,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeMs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_color: Option<Rgb8>,
}

impl MediaAsset {
    /// A probed still image.
    pub fn image(path: impl Into<PathBuf>, width: u32, height: u32, dominant_color: Rgb8) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Image,
            duration: None,
            width: Some(width),
            height: Some(height),
            dominant_color: Some(dominant_color),
        }
    }

    /// A probed audio file.
    pub fn audio(path: impl Into<PathBuf>, duration: TimeMs) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Audio,
            duration: Some(duration),
            width: None,
            height: None,
            dominant_color: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }

    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }

    /// Pixel dimensions, when both are known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// Width over height, when dimensions are known.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.dimensions()
            .filter(|(_, h)| *h > 0)
            .map(|(w, h)| f64::from(w) / f64::from(h))
    }

    /// `true` when the image aspect ratio is within `tolerance` (relative) of `canvas`.
    pub fn matches_aspect(&self, canvas: Canvas, tolerance: f64) -> bool {
        self.aspect_ratio()
            .is_some_and(|a| (a / canvas.aspect_ratio() - 1.0).abs() <= tolerance)
    }

    /// Probed duration of an audio asset.
    pub fn require_duration(&self) -> ReelResult<TimeMs> {
        match (self.kind, self.duration) {
            (MediaKind::Audio, Some(d)) if !d.is_zero() => Ok(d),
            (MediaKind::Audio, _) => Err(ReelError::asset_unreadable(
                &self.path,
                "audio has no usable duration",
            )),
            (MediaKind::Image, _) => Err(ReelError::validation(format!(
                "'{}' is an image, expected audio",
                self.path.display()
            ))),
        }
    }

    /// Fail unless this asset is an image.
    pub fn require_image(&self) -> ReelResult<&Self> {
        if self.is_image() && self.dimensions().is_some() {
            Ok(self)
        } else {
            Err(ReelError::validation(format!(
                "'{}' is not a probed image",
                self.path.display()
            )))
        }
    }
}
