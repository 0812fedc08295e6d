use crate::assets::{MediaAsset, Prober};
use crate::config::MixConfig;
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::foundation::fallback::{DegradedFallback, Strategy, first_success};
use crate::transitions::EffectSelector;
use std::path::{Path, PathBuf};

/// File extensions accepted as background music.
pub const MUSIC_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "aac", "ogg", "flac"];

/// Directory of candidate background tracks.
#[derive(Clone, Debug)]
pub struct MusicLibrary {
    dir: PathBuf,
    reserved: Vec<String>,
}

impl MusicLibrary {
    pub fn new(dir: impl Into<PathBuf>, reserved: &[String]) -> Self {
        Self {
            dir: dir.into(),
            reserved: reserved.iter().map(|r| r.to_lowercase()).collect(),
        }
    }

    /// `true` for files kept for notification/system sounds.
    pub fn is_reserved(&self, path: &Path) -> bool {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.reserved.iter().any(|r| !r.is_empty() && stem.contains(r))
    }

    /// Eligible tracks sorted by path.
    pub fn candidates(&self) -> ReelResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            ReelError::tool(
                Stage::Audio,
                format!("read music directory '{}': {e}", self.dir.display()),
            )
        })?;
        let mut out: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .map(|x| x.to_string_lossy().to_lowercase())
                    .is_some_and(|x| MUSIC_EXTENSIONS.contains(&x.as_str()))
            })
            .filter(|p| !self.is_reserved(p))
            .collect();
        out.sort();
        Ok(out)
    }

    /// Pick one eligible track.
    pub fn pick(&self, selector: &mut dyn EffectSelector) -> ReelResult<PathBuf> {
        let mut pool = self.candidates()?;
        if pool.is_empty() {
            return Err(ReelError::validation(format!(
                "no eligible music in '{}'",
                self.dir.display()
            )));
        }
        let i = selector.pick_index(pool.len()).min(pool.len() - 1);
        Ok(pool.swap_remove(i))
    }
}

/// Choose and probe a background track, or fall back to narration-only output.
///
/// Returns `None` without a degradation when music is disabled; every other reason for having no
/// music is recorded as a degradation.
#[tracing::instrument(skip_all, fields(enabled = enabled))]
pub fn select_music(
    enabled: bool,
    mix: &MixConfig,
    prober: &dyn Prober,
    selector: &mut dyn EffectSelector,
) -> ReelResult<(Option<MediaAsset>, Vec<DegradedFallback>)> {
    if !enabled {
        return Ok((None, Vec::new()));
    }
    let recovered = first_success(
        Stage::Audio,
        "background music",
        vec![
            Strategy::new("music_library", || {
                let dir = mix
                    .music_dir
                    .as_ref()
                    .ok_or_else(|| ReelError::validation("no music directory configured"))?;
                let path = MusicLibrary::new(dir, &mix.reserved_names).pick(selector)?;
                let track = prober.probe_audio(&path)?;
                track.require_duration()?;
                tracing::debug!(path = %path.display(), "background music selected");
                Ok(Some(track))
            }),
            Strategy::new("narration_only", || Ok(None)),
        ],
    )?;
    Ok((recovered.value, recovered.degradations))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/music.rs"]
mod tests;
