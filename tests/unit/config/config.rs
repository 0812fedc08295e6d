use super::*;

#[test]
fn empty_json_yields_validated_defaults() {
    let cfg = ReelConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, ReelConfig::default());
    cfg.validate().unwrap();
    assert_eq!(cfg.style.quality, QualityTier::High);
    assert!(cfg.style.enable_intro_outro);
    assert!(!cfg.transitions.crossfade_intro_outro);
    assert_eq!(cfg.transitions.palette.len(), EffectKind::ALL.len());
    assert_eq!(cfg.process.workers, MAX_WORKERS);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = ReelConfig::from_json_str(
        r#"{
            "style": { "quality": "low", "target_shape": "vertical" },
            "transitions": { "palette": ["fade", "wipe_left"], "seed": 7 },
            "mix": { "duck_gain": 0.2 },
            "watermark": { "path": "logo.png" }
        }"#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.style.quality, QualityTier::Low);
    assert_eq!(cfg.style.target_shape, VideoShape::Vertical);
    assert!(cfg.style.enable_background_music);
    assert_eq!(
        cfg.transitions.palette,
        vec![EffectKind::Fade, EffectKind::WipeLeft]
    );
    assert_eq!(cfg.transitions.seed, Some(7));
    assert_eq!(cfg.mix.ambient_gain, 0.55);
    let wm = cfg.watermark.unwrap();
    assert_eq!(wm.margin_px, 24);
    assert_eq!(wm.width_permille, 120);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ReelConfig::from_json_str(r#"{ "style": { "qualty": "low" } }"#).unwrap_err();
    assert!(err.to_string().contains("qualty"));
}

#[test]
fn validation_reports_every_problem_with_its_path() {
    let mut cfg = ReelConfig::default();
    cfg.mix.duck_gain = 0.9;
    cfg.process.workers = 9;
    cfg.transitions.palette.clear();
    let msg = cfg.validate().unwrap_err().to_string();
    assert!(msg.contains("$.mix.duck_gain"), "{msg}");
    assert!(msg.contains("$.process.workers"), "{msg}");
    assert!(msg.contains("$.transitions.palette"), "{msg}");
}

#[test]
fn caps_that_round_to_zero_at_the_shortest_image_are_rejected() {
    let mut cfg = ReelConfig::default();
    cfg.timeline.min_image_ms = 20;
    let msg = cfg.validate().unwrap_err().to_string();
    assert!(msg.contains("$.transitions.long_form"), "{msg}");
    assert!(msg.contains("$.transitions.short_form"), "{msg}");

    let mut cfg = ReelConfig::default();
    cfg.transitions.long_form.percent_of_shorter = 1;
    let msg = cfg.validate().unwrap_err().to_string();
    assert!(msg.contains("$.transitions.long_form"), "{msg}");
    assert!(!msg.contains("$.transitions.short_form"), "{msg}");

    let mut cfg = ReelConfig::default();
    cfg.timeline.min_image_ms = 70;
    cfg.validate().unwrap();

    cfg.timeline.min_image_ms = 0;
    let msg = cfg.validate().unwrap_err().to_string();
    assert!(msg.contains("$.timeline.min_image_ms"), "{msg}");
}

#[test]
fn caps_follow_shape() {
    let cfg = ReelConfig::default();
    assert_eq!(
        cfg.transitions.caps_for(VideoShape::Horizontal),
        TransitionCaps::LONG_FORM
    );
    assert_eq!(
        cfg.transitions.caps_for(VideoShape::Vertical),
        TransitionCaps::SHORT_FORM
    );
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = ReelConfig::from_path("target/does-not-exist/config.json").unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}
