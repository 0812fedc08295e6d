use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Bookend length used when neither an explicit duration nor bookend narration is given.
pub const DEFAULT_BOOKEND_DURATION: TimeMs = TimeMs::from_secs(5);

/// One product to turn into a video: ordered local images plus narration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRequest {
    pub product_id: String,
    /// Main-block images in presentation order.
    pub images: Vec<PathBuf>,
    /// Main narration audio.
    pub narration: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<BookendRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outro: Option<BookendRequest>,
}

/// Intro or outro card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookendRequest {
    pub image: PathBuf,
    /// Voice-over played over the card, cut at the card's end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<PathBuf>,
    /// Card length in seconds. Defaults to the narration length, then to 5 s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl BookendRequest {
    /// Card length given the probed narration length, if any.
    pub fn resolve_duration(&self, narration: Option<TimeMs>) -> ReelResult<TimeMs> {
        match (self.duration_secs, narration) {
            (Some(secs), _) => TimeMs::from_secs_f64(secs),
            (None, Some(len)) => Ok(len),
            (None, None) => Ok(DEFAULT_BOOKEND_DURATION),
        }
    }
}

impl RenderRequest {
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let req: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("invalid render request: {e}")))?;
        req.validate()?;
        Ok(req)
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!(
                "failed to open render request '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.product_id.trim().is_empty() {
            return Err(ReelError::validation("product_id must not be empty"));
        }
        if self.images.is_empty() {
            return Err(ReelError::validation("at least one image is required"));
        }
        for (name, bookend) in [("intro", &self.intro), ("outro", &self.outro)] {
            if let Some(b) = bookend
                && let Some(secs) = b.duration_secs
                && !(secs.is_finite() && secs > 0.0 && secs <= TimeMs::MAX_INPUT.as_secs_f64())
            {
                return Err(ReelError::validation(format!(
                    "{name}.duration_secs must be within (0, {}], got {secs}",
                    TimeMs::MAX_INPUT.secs_string()
                )));
            }
        }
        Ok(())
    }
}
