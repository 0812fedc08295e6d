use super::*;

const TIERS: [QualityTier; 4] = [
    QualityTier::Low,
    QualityTier::Medium,
    QualityTier::High,
    QualityTier::Ultra,
];

#[test]
fn horizontal_always_crops_and_vertical_always_pads() {
    for tier in TIERS {
        assert_eq!(
            select_profile(VideoShape::Horizontal, tier).scaling_policy,
            ScalingPolicy::IncreaseThenCrop
        );
        assert_eq!(
            select_profile(VideoShape::Vertical, tier).scaling_policy,
            ScalingPolicy::DecreaseThenPad
        );
    }
}

#[test]
fn high_tier_canvases_are_1080p() {
    let h = select_profile(VideoShape::Horizontal, QualityTier::High);
    assert_eq!((h.canvas.width, h.canvas.height), (1920, 1080));
    assert_eq!(h.scaling_policy, ScalingPolicy::IncreaseThenCrop);

    let v = select_profile(VideoShape::Vertical, QualityTier::High);
    assert_eq!((v.canvas.width, v.canvas.height), (1080, 1920));
    assert_eq!(v.scaling_policy, ScalingPolicy::DecreaseThenPad);
}

#[test]
fn every_profile_fits_its_declared_level_and_stays_conservative() {
    for shape in [VideoShape::Horizontal, VideoShape::Vertical] {
        for tier in TIERS {
            let p = select_profile(shape, tier);
            assert!(
                p.video.level.supports(p.canvas, p.fps),
                "{shape:?}/{tier:?} {} exceeds level {}",
                p.canvas,
                p.video.level
            );
            assert!(matches!(
                p.video.profile,
                CodecProfile::Baseline | CodecProfile::Main
            ));
            assert_eq!(p.video.pixel_format, PixelFormat::Yuv420p);
            assert_eq!(p.container, ContainerFormat::Mp4);
            assert!(p.canvas.width % 2 == 0 && p.canvas.height % 2 == 0);
        }
    }
}

#[test]
fn level_limits_reject_oversized_canvases() {
    let fps = Fps::new(30, 1).unwrap();
    let uhd = Canvas {
        width: 3840,
        height: 2160,
    };
    assert!(!CodecLevel::new(4, 0).supports(uhd, fps));
    assert!(CodecLevel::new(5, 1).supports(uhd, fps));
    assert!(!CodecLevel::new(9, 9).supports(uhd, fps));
}

#[test]
fn reference_canvas_is_horizontal() {
    assert_eq!(
        reference_canvas(QualityTier::Medium),
        Canvas {
            width: 1280,
            height: 720
        }
    );
}

#[test]
fn level_display() {
    assert_eq!(CodecLevel::new(4, 0).to_string(), "4.0");
    assert_eq!(CodecLevel::new(3, 1).to_string(), "3.1");
}
