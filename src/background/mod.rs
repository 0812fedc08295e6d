//! Smart background compositor.
//!
//! Images whose aspect ratio disagrees with the target canvas are fitted inside it and padded
//! with a solid fill derived from their own dominant color instead of black bars. Results land in
//! a content-addressed cache so every render of a product reads the same processed set.

use crate::assets::MediaAsset;
use crate::assets::imaging::decode;
use crate::config::BackgroundConfig;
use crate::foundation::color::Rgb8;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::foundation::fallback::{DegradedFallback, Strategy, first_success};
use crate::foundation::pool::bounded_map;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// How a processed image was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Treatment {
    /// Aspect ratio already matched; the original file is used.
    Unchanged,
    /// Fitted and padded with a fill color.
    SmartBackground { fill: Rgb8 },
    /// Background generation failed or is disabled; the original file is used as-is.
    Original,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One entry of the processed image set.
pub struct ProcessedImage {
    /// Image the timeline should use.
    pub asset: MediaAsset,
    /// Probed source it came from.
    pub source: PathBuf,
    pub treatment: Treatment,
}

/// The processed image set shared by every render of one product.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessedImageSet {
    /// Canvas the set was processed against.
    pub canvas: Canvas,
    pub images: Vec<ProcessedImage>,
    /// Images that fell back to their original file.
    pub degradations: Vec<DegradedFallback>,
}

impl ProcessedImageSet {
    /// Assets in timeline order.
    pub fn assets(&self) -> Vec<MediaAsset> {
        self.images.iter().map(|p| p.asset.clone()).collect()
    }
}

/// Content-addressed directory of processed images.
#[derive(Clone, Debug)]
pub struct ProcessedImageCache {
    dir: PathBuf,
}

impl ProcessedImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic file name for `source_bytes` fitted to `canvas` over `fill`.
    pub fn path_for(
        &self,
        source: &Path,
        source_bytes: &[u8],
        canvas: Canvas,
        fill: Rgb8,
    ) -> PathBuf {
        let mut key = Vec::with_capacity(source_bytes.len() + 11);
        key.extend_from_slice(source_bytes);
        key.extend_from_slice(&canvas.width.to_le_bytes());
        key.extend_from_slice(&canvas.height.to_le_bytes());
        key.extend_from_slice(&[fill.r, fill.g, fill.b]);
        let hash = xxhash_rust::xxh3::xxh3_64(&key);

        let stem = source
            .file_stem()
            .map(|s| sanitize_stem(&s.to_string_lossy()))
            .unwrap_or_else(|| "image".to_string());
        self.dir.join(format!(
            "{stem}-{hash:016x}-{}x{}.png",
            canvas.width, canvas.height
        ))
    }
}

fn sanitize_stem(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(48)
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Largest `(w, h)` with the source aspect ratio that fits inside `canvas`.
pub fn fit_within(width: u32, height: u32, canvas: Canvas) -> (u32, u32) {
    let (w, h) = (u64::from(width.max(1)), u64::from(height.max(1)));
    let (cw, ch) = (u64::from(canvas.width), u64::from(canvas.height));
    // Compare w/h against cw/ch without floating point.
    if w * ch >= h * cw {
        let fitted_h = ((h * cw + w / 2) / w).clamp(1, ch);
        (canvas.width, fitted_h as u32)
    } else {
        let fitted_w = ((w * ch + h / 2) / h).clamp(1, cw);
        (fitted_w as u32, canvas.height)
    }
}

/// Fit `asset` inside `canvas` over its dominant color and store the result in `cache`.
///
/// An existing cached file for the same source bytes, canvas and fill is reused untouched.
pub fn render_smart_background(
    asset: &MediaAsset,
    canvas: Canvas,
    cache: &ProcessedImageCache,
) -> ReelResult<ProcessedImage> {
    let source = asset.path();
    let fill = asset.dominant_color.ok_or_else(|| {
        ReelError::validation(format!("'{}' has no dominant color", source.display()))
    })?;
    let bytes = std::fs::read(source)
        .map_err(|e| ReelError::asset_unreadable(source, format!("read failed: {e}")))?;
    let out = cache.path_for(source, &bytes, canvas, fill);

    if out.is_file() {
        tracing::debug!(path = %out.display(), "smart background cache hit");
    } else {
        let img = decode(source)?.to_rgb8();
        let (fw, fh) = fit_within(img.width(), img.height(), canvas);
        let fitted = image::imageops::resize(&img, fw, fh, FilterType::Lanczos3);

        let mut composed =
            RgbImage::from_pixel(canvas.width, canvas.height, Rgb([fill.r, fill.g, fill.b]));
        let x = i64::from((canvas.width - fw) / 2);
        let y = i64::from((canvas.height - fh) / 2);
        image::imageops::overlay(&mut composed, &fitted, x, y);

        write_atomically(&composed, &out)?;
        tracing::debug!(path = %out.display(), fill = %fill.to_hex(), "smart background written");
    }

    Ok(ProcessedImage {
        asset: MediaAsset::image(&out, canvas.width, canvas.height, fill),
        source: source.to_path_buf(),
        treatment: Treatment::SmartBackground { fill },
    })
}

fn write_atomically(img: &RgbImage, out: &Path) -> ReelResult<()> {
    let dir = out
        .parent()
        .ok_or_else(|| ReelError::validation(format!("'{}' has no parent", out.display())))?;
    std::fs::create_dir_all(dir).map_err(|e| {
        ReelError::tool(Stage::Background, format!("create '{}': {e}", dir.display()))
    })?;

    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let tmp = out.with_extension(format!("tmp{}-{seq}.png", std::process::id()));
    img.save_with_format(&tmp, image::ImageFormat::Png)
        .map_err(|e| ReelError::tool(Stage::Background, format!("encode png: {e}")))?;
    std::fs::rename(&tmp, out).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ReelError::tool(Stage::Background, format!("publish '{}': {e}", out.display()))
    })
}

fn unprocessed(asset: &MediaAsset, treatment: Treatment) -> ProcessedImage {
    ProcessedImage {
        asset: asset.clone(),
        source: asset.path.clone(),
        treatment,
    }
}

/// Process one image: unchanged when its aspect already matches, otherwise a smart background,
/// degrading to the original file if that fails. Never fails the pipeline.
pub fn compose(
    asset: &MediaAsset,
    canvas: Canvas,
    config: &BackgroundConfig,
    cache: &ProcessedImageCache,
) -> ReelResult<(ProcessedImage, Vec<DegradedFallback>)> {
    asset.require_image()?;
    if asset.matches_aspect(canvas, config.aspect_tolerance) {
        return Ok((unprocessed(asset, Treatment::Unchanged), Vec::new()));
    }
    if !config.enabled {
        return Ok((unprocessed(asset, Treatment::Original), Vec::new()));
    }

    let subject = asset.path.display().to_string();
    let recovered = first_success(
        Stage::Background,
        &subject,
        vec![
            Strategy::new("smart_background", || {
                render_smart_background(asset, canvas, cache)
            }),
            Strategy::new("original", || Ok(unprocessed(asset, Treatment::Original))),
        ],
    )?;
    Ok((recovered.value, recovered.degradations))
}

/// Build the processed image set for `assets` against `canvas` on at most `workers` threads.
#[tracing::instrument(skip(assets, config), fields(count = assets.len(), canvas = %canvas))]
pub fn process_images(
    assets: &[MediaAsset],
    canvas: Canvas,
    config: &BackgroundConfig,
    workers: usize,
) -> ReelResult<ProcessedImageSet> {
    let cache = ProcessedImageCache::new(&config.cache_dir);
    let results = bounded_map(workers, assets, |a| compose(a, canvas, config, &cache))?;

    let mut images = Vec::with_capacity(results.len());
    let mut degradations = Vec::new();
    for (image, degraded) in results {
        images.push(image);
        degradations.extend(degraded);
    }
    tracing::debug!(
        processed = images
            .iter()
            .filter(|p| matches!(p.treatment, Treatment::SmartBackground { .. }))
            .count(),
        degraded = degradations.len(),
        "processed image set ready"
    );
    Ok(ProcessedImageSet {
        canvas,
        images,
        degradations,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/background/background.rs"]
mod tests;
