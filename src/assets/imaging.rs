use crate::assets::model::MediaAsset;
use crate::foundation::color::Rgb8;
use crate::foundation::error::{ReelError, ReelResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Decode an image file and report its dimensions and dominant color.
pub fn probe_image_file(path: &Path) -> ReelResult<MediaAsset> {
    if !path.is_file() {
        return Err(ReelError::asset_unreadable(path, "file not found"));
    }
    let img = decode(path)?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ReelError::asset_unreadable(path, "image has zero size"));
    }
    Ok(MediaAsset::image(path, width, height, dominant_color(&img)))
}

pub(crate) fn decode(path: &Path) -> ReelResult<DynamicImage> {
    image::ImageReader::open(path)
        .map_err(|e| ReelError::asset_unreadable(path, format!("open failed: {e}")))?
        .with_guessed_format()
        .map_err(|e| ReelError::asset_unreadable(path, format!("format detection failed: {e}")))?
        .decode()
        .map_err(|e| ReelError::asset_unreadable(path, format!("decode failed: {e}")))
}

/// Dominant color as the average RGB of the image.
///
/// This is a lossy, deterministic approximation: the image is downsampled to a single pixel
/// with a triangle filter and that pixel is read back. It is not perceptual color extraction,
/// so a picture with two strong colors yields their blend. Alpha is ignored.
pub fn dominant_color(img: &DynamicImage) -> Rgb8 {
    let rgb = img.to_rgb8();
    let px = image::imageops::resize(&rgb, 1, 1, FilterType::Triangle);
    let p = px.get_pixel(0, 0);
    Rgb8::new(p[0], p[1], p[2])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/imaging.rs"]
mod tests;
