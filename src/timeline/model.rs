use crate::assets::MediaAsset;
use crate::foundation::core::TimeMs;

/// Which block of the video a segment belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRole {
    Intro,
    Main,
    Outro,
}

impl SegmentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Main => "main",
            Self::Outro => "outro",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One image shown for a fixed presentation window.
///
/// `start_offset` and `duration` describe the presentation window. The source clip additionally
/// runs `lead_in` before and `lead_out` after it so adjoining cross-fades blend real frames; the
/// extensions never change presentation timing.
pub struct Segment {
    pub index: usize,
    pub asset: MediaAsset,
    pub role: SegmentRole,
    pub start_offset: TimeMs,
    pub duration: TimeMs,
    /// Half of the incoming transition, zero at a hard cut.
    pub lead_in: TimeMs,
    /// Half of the outgoing transition, zero at a hard cut.
    pub lead_out: TimeMs,
}

impl Segment {
    pub fn is_intro(&self) -> bool {
        self.role == SegmentRole::Intro
    }

    pub fn is_outro(&self) -> bool {
        self.role == SegmentRole::Outro
    }

    /// End of the presentation window.
    pub fn end(&self) -> TimeMs {
        self.start_offset + self.duration
    }

    /// Total overlap extension added to the source clip.
    pub fn overlap_extension(&self) -> TimeMs {
        self.lead_in + self.lead_out
    }

    /// Length of the source clip fed to the encoder.
    pub fn source_duration(&self) -> TimeMs {
        self.duration + self.overlap_extension()
    }
}

/// An intro or outro visual with its own duration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClipSpec {
    pub asset: MediaAsset,
    pub duration: TimeMs,
}

/// Frame-grid placement of one segment's presentation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    pub index: usize,
    pub start_frame: u64,
    pub frames: u64,
}
