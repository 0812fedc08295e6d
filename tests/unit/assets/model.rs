use super::*;
use crate::foundation::color::Rgb8;
use crate::foundation::core::{Canvas, TimeMs};
use crate::foundation::error::{ReelError, ReelResult};
use std::path::{Path, PathBuf};

#[test]
fn aspect_matching_uses_relative_tolerance() {
    let canvas = Canvas {
        width: 1920,
        height: 1080,
    };
    let exact = MediaAsset::image("a.png", 1280, 720, Rgb8::BLACK);
    let close = MediaAsset::image("b.png", 1000, 560, Rgb8::BLACK);
    let square = MediaAsset::image("c.png", 800, 800, Rgb8::BLACK);
    assert!(exact.matches_aspect(canvas, 0.01));
    assert!(close.matches_aspect(canvas, 0.01));
    assert!(!square.matches_aspect(canvas, 0.01));
    assert!(!MediaAsset::audio("x.wav", TimeMs::from_secs(1)).matches_aspect(canvas, 0.5));
}

#[test]
fn audio_duration_is_required_and_checked() {
    let a = MediaAsset::audio("n.wav", TimeMs::from_millis(8_000));
    assert_eq!(a.require_duration().unwrap(), TimeMs::from_millis(8_000));

    let zero = MediaAsset::audio("z.wav", TimeMs::ZERO);
    assert!(matches!(
        zero.require_duration(),
        Err(ReelError::AssetUnreadable { .. })
    ));

    let img = MediaAsset::image("i.png", 2, 2, Rgb8::BLACK);
    assert!(matches!(
        img.require_duration(),
        Err(ReelError::Validation(_))
    ));
    assert!(img.require_image().is_ok());
}

#[test]
fn serialized_image_omits_duration() {
    let img = MediaAsset::image("i.png", 4, 2, Rgb8::new(1, 2, 3));
    let v = serde_json::to_value(&img).unwrap();
    assert_eq!(v["kind"], "image");
    assert_eq!(v["dominant_color"], "#010203");
    assert!(v.get("duration").is_none());
    let back: MediaAsset = serde_json::from_value(v).unwrap();
    assert_eq!(back, img);
}

struct CountingProber;

impl Prober for CountingProber {
    fn probe_image(&self, path: &Path) -> ReelResult<MediaAsset> {
        let n = path.to_string_lossy().len() as u32;
        Ok(MediaAsset::image(path, n * 2, n, Rgb8::BLACK))
    }

    fn probe_audio(&self, path: &Path) -> ReelResult<MediaAsset> {
        Ok(MediaAsset::audio(path, TimeMs::from_secs(1)))
    }
}

#[test]
fn parallel_probe_keeps_order() {
    let paths: Vec<PathBuf> = (0..12)
        .map(|i| PathBuf::from("x".repeat(i + 1)))
        .collect();
    let assets = probe_images(&CountingProber, &paths, 4).unwrap();
    let got: Vec<_> = assets.iter().map(|a| a.path.clone()).collect();
    assert_eq!(got, paths);
    assert_eq!(assets[3].dimensions(), Some((8, 4)));
}
