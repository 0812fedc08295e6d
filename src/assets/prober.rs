use crate::assets::imaging::probe_image_file;
use crate::assets::media::{FfprobeSettings, probe_audio_file};
use crate::assets::model::MediaAsset;
use crate::config::ProcessConfig;
use crate::foundation::error::ReelResult;
use crate::foundation::pool::bounded_map;
use std::path::{Path, PathBuf};

/// Source of probed asset metadata.
///
/// Implementations perform reads only. Tests substitute a fixed prober so the pipeline can run
/// without media files or external tools.
pub trait Prober: Send + Sync {
    /// Dimensions and dominant color of an image.
    fn probe_image(&self, path: &Path) -> ReelResult<MediaAsset>;
    /// Duration of an audio file.
    fn probe_audio(&self, path: &Path) -> ReelResult<MediaAsset>;
}

/// Prober backed by the filesystem, the `image` crate and `ffprobe`.
#[derive(Clone, Debug)]
pub struct SystemProber {
    ffprobe: FfprobeSettings,
}

impl SystemProber {
    pub fn new(process: &ProcessConfig) -> Self {
        Self {
            ffprobe: FfprobeSettings {
                program: process.ffprobe.clone(),
                timeout: process.probe_timeout(),
                spawn_retries: process.spawn_retries,
            },
        }
    }
}

impl Prober for SystemProber {
    fn probe_image(&self, path: &Path) -> ReelResult<MediaAsset> {
        probe_image_file(path)
    }

    fn probe_audio(&self, path: &Path) -> ReelResult<MediaAsset> {
        probe_audio_file(&self.ffprobe, path)
    }
}

/// Probe every image on at most `workers` threads. Output order follows `paths`.
#[tracing::instrument(skip(prober, paths), fields(count = paths.len()))]
pub fn probe_images(
    prober: &dyn Prober,
    paths: &[PathBuf],
    workers: usize,
) -> ReelResult<Vec<MediaAsset>> {
    let assets = bounded_map(workers, paths, |p| prober.probe_image(p))?;
    tracing::debug!(probed = assets.len(), "images probed");
    Ok(assets)
}
