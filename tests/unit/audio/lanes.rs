use super::*;
use crate::config::TimelineConfig;
use crate::foundation::color::Rgb8;
use crate::timeline::ClipSpec;

fn ms(v: u64) -> TimeMs {
    TimeMs::from_millis(v)
}

fn images(n: usize) -> Vec<MediaAsset> {
    (0..n)
        .map(|i| MediaAsset::image(format!("img{i}.png"), 1920, 1080, Rgb8::BLACK))
        .collect()
}

fn bookend(name: &str, d: u64) -> ClipSpec {
    ClipSpec {
        asset: MediaAsset::image(name, 1920, 1080, Rgb8::BLACK),
        duration: ms(d),
    }
}

fn narration(main: u64) -> NarrationSet {
    NarrationSet {
        main: MediaAsset::audio("main.wav", ms(main)),
        intro: None,
        outro: None,
    }
}

#[test]
fn single_image_without_bookends() {
    let t = Timeline::build(&images(1), ms(8_000), None, None, &TimelineConfig::default()).unwrap();
    let music = MediaAsset::audio("bed.mp3", ms(60_000));
    let lanes = plan_lanes(&t, &narration(8_000), Some(&music), &MixConfig::default()).unwrap();

    assert_eq!(lanes.len(), 2);
    let main = &lanes[0];
    assert_eq!(main.role, LaneRole::MainNarration);
    assert_eq!(main.delay, TimeMs::ZERO);
    assert_eq!(main.trim_end, ms(8_000));

    let bed = &lanes[1];
    assert!(!bed.looped);
    let env = bed.envelope.as_ref().unwrap();
    assert_eq!(env.breakpoints.len(), 1);
    assert_eq!(env.breakpoints[0].at, ms(8_000));
}

#[test]
fn bookended_main_narration_is_delayed_and_trimmed() {
    let t = Timeline::build(
        &images(3),
        ms(12_000),
        Some(bookend("intro.png", 5_000)),
        Some(bookend("outro.png", 5_000)),
        &TimelineConfig::default(),
    )
    .unwrap();
    let lanes = plan_lanes(&t, &narration(12_000), None, &MixConfig::default()).unwrap();
    assert_eq!(t.total_duration(), ms(22_000));
    assert_eq!(lanes.len(), 1);
    assert_eq!(lanes[0].delay, ms(5_000));
    assert_eq!(lanes[0].active_window(), (ms(5_000), ms(17_000)));
}

#[test]
fn intro_and_outro_narration_are_cut_to_their_blocks() {
    let t = Timeline::build(
        &images(2),
        ms(10_000),
        Some(bookend("intro.png", 3_000)),
        Some(bookend("outro.png", 4_000)),
        &TimelineConfig::default(),
    )
    .unwrap();
    let set = NarrationSet {
        main: MediaAsset::audio("main.wav", ms(10_000)),
        intro: Some(MediaAsset::audio("intro.wav", ms(3_500))),
        outro: Some(MediaAsset::audio("outro.wav", ms(2_000))),
    };
    let music = MediaAsset::audio("bed.mp3", ms(5_000));
    let mix = MixConfig::default();
    let lanes = plan_lanes(&t, &set, Some(&music), &mix).unwrap();

    let by_role = |r| lanes.iter().find(|l| l.role == r).unwrap();
    let intro = by_role(LaneRole::IntroNarration);
    assert_eq!((intro.trim_start, intro.trim_end, intro.delay), (ms(0), ms(3_000), ms(0)));
    let outro = by_role(LaneRole::OutroNarration);
    assert_eq!(outro.delay, ms(13_000));
    assert_eq!(outro.active_window(), (ms(13_000), ms(15_000)));

    let bed = by_role(LaneRole::Music);
    assert!(bed.looped);
    assert_eq!(bed.trim_end, ms(17_000));
    let env = bed.envelope.as_ref().unwrap();
    // Narration covers [0, 15 s); ambient for the last 2 s of the outro.
    assert_eq!(env.gain_at(ms(0)), mix.duck_gain);
    assert_eq!(env.gain_at(ms(14_999)), mix.duck_gain);
    assert_eq!(env.gain_at(ms(15_000)), mix.ambient_gain);
}

#[test]
fn bookend_narration_is_ignored_without_bookend_segments() {
    let t = Timeline::build(&images(2), ms(6_000), None, None, &TimelineConfig::default()).unwrap();
    let set = NarrationSet {
        intro: Some(MediaAsset::audio("intro.wav", ms(3_000))),
        ..narration(6_000)
    };
    let lanes = plan_lanes(&t, &set, None, &MixConfig::default()).unwrap();
    assert_eq!(lanes.len(), 1);
}

#[test]
fn misaligned_main_lane_is_an_invariant_violation() {
    let t = Timeline::build(
        &images(2),
        ms(6_000),
        Some(bookend("intro.png", 2_000)),
        None,
        &TimelineConfig::default(),
    )
    .unwrap();
    let mut lanes = plan_lanes(&t, &narration(6_000), None, &MixConfig::default()).unwrap();
    lanes[0].delay = ms(1_000);
    let err = verify_lanes(&t, &lanes, &MixConfig::default()).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Audio));
    assert!(err.to_string().contains("main_narration"));
}

#[test]
fn wrong_envelope_is_an_invariant_violation() {
    let t = Timeline::build(&images(1), ms(4_000), None, None, &TimelineConfig::default()).unwrap();
    let mix = MixConfig::default();
    let music = MediaAsset::audio("bed.mp3", ms(60_000));
    let mut lanes = plan_lanes(&t, &narration(4_000), Some(&music), &mix).unwrap();
    lanes[1].envelope = Some(VolumeEnvelope::constant(mix.ambient_gain));
    assert!(verify_lanes(&t, &lanes, &mix).is_err());
}

#[test]
fn image_given_as_narration_is_rejected() {
    let t = Timeline::build(&images(1), ms(4_000), None, None, &TimelineConfig::default()).unwrap();
    let set = NarrationSet {
        main: MediaAsset::image("oops.png", 2, 2, Rgb8::BLACK),
        intro: None,
        outro: None,
    };
    assert!(plan_lanes(&t, &set, None, &MixConfig::default()).is_err());
}
