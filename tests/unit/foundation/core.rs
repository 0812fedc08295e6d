use super::*;

#[test]
fn secs_round_to_nearest_millisecond() {
    assert_eq!(TimeMs::from_secs_f64(10.0).unwrap(), TimeMs(10_000));
    assert_eq!(TimeMs::from_secs_f64(3.3334).unwrap(), TimeMs(3_333));
    assert_eq!(TimeMs::from_secs_f64(3.3336).unwrap(), TimeMs(3_334));
    assert!(TimeMs::from_secs_f64(-1.0).is_err());
    assert!(TimeMs::from_secs_f64(f64::NAN).is_err());
}

#[test]
fn absurdly_long_durations_are_rejected() {
    assert!(TimeMs::from_secs_f64(1e20).is_err());
    assert!(TimeMs::from_secs_f64(86_400.001).is_err());
    assert_eq!(TimeMs::from_secs_f64(86_400.0).unwrap(), TimeMs::MAX_INPUT);
}

#[test]
fn floor_and_half() {
    assert_eq!(TimeMs(3_337).floor_to(TimeMs(10)), TimeMs(3_330));
    assert_eq!(TimeMs(3_337).floor_to(TimeMs::ZERO), TimeMs(3_337));
    assert_eq!(TimeMs(400).half(), TimeMs(200));
    assert_eq!(TimeMs(2_000).mul_permille(200), TimeMs(400));
}

#[test]
fn display_uses_millisecond_precision() {
    assert_eq!(TimeMs(17_000).to_string(), "17.000s");
    assert_eq!(TimeMs(5).secs_string(), "0.005");
}

#[test]
fn sum_is_exact() {
    let total: TimeMs = [TimeMs(3_330), TimeMs(3_330), TimeMs(3_340)]
        .into_iter()
        .sum();
    assert_eq!(total, TimeMs(10_000));
}

#[test]
fn frame_boundaries_use_rational_fps() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frame_at(TimeMs(1_000)), 30);
    assert_eq!(fps.frame_at(TimeMs(3_330)), 100);

    let ntsc = Fps::new(30_000, 1001).unwrap();
    assert_eq!(ntsc.frame_at(TimeMs(1_001)), 30);
}

#[test]
fn frame_spans_sum_to_total() {
    let fps = Fps::new(30, 1).unwrap();
    let cuts = [0u64, 3_330, 6_660, 10_000];
    let frames: u64 = cuts
        .windows(2)
        .map(|w| fps.frames_between(TimeMs(w[0]), TimeMs(w[1])))
        .sum();
    assert_eq!(frames, fps.frame_at(TimeMs(10_000)));
}

#[test]
fn fps_and_canvas_validation() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(11, 10).is_err());
    let c = Canvas::new(1080, 1920).unwrap();
    assert!(c.is_portrait());
    assert_eq!(c.to_string(), "1080x1920");
}
