use super::*;
use crate::assets::MediaAsset;
use crate::audio::{NarrationSet, VolumeEnvelope, plan_lanes};
use crate::config::{MixConfig, ProcessConfig, TimelineConfig};
use crate::foundation::color::Rgb8;
use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, Stage};
use crate::graph::emit_render_graph;
use crate::profile::{QualityTier, VideoShape, select_profile};
use crate::timeline::Timeline;
use crate::transitions::{
    EffectKind, SeededSelector, TransitionCaps, TransitionPolicy, schedule_transitions,
};
use std::ffi::OsString;
use std::path::PathBuf;

fn ms(v: u64) -> TimeMs {
    TimeMs::from_millis(v)
}

fn graph(n: usize, main: u64, narration: bool, music_len: Option<u64>) -> RenderGraph {
    let images: Vec<_> = (0..n)
        .map(|i| MediaAsset::image(format!("img{i}.png"), 1920, 1080, Rgb8::BLACK))
        .collect();
    let mut t = Timeline::build(&images, ms(main), None, None, &TimelineConfig::default()).unwrap();
    let policy = TransitionPolicy {
        caps: TransitionCaps::LONG_FORM,
        palette: &[EffectKind::FadeBlack, EffectKind::WipeLeft],
        across_bookends: false,
    };
    let transitions = schedule_transitions(&mut t, &policy, &mut SeededSelector::new(2)).unwrap();
    let set = NarrationSet {
        main: MediaAsset::audio("voice over.wav", ms(main)),
        intro: None,
        outro: None,
    };
    let music = music_len.map(|d| MediaAsset::audio("bed.mp3", ms(d)));
    let lanes = if narration {
        plan_lanes(&t, &set, music.as_ref(), &MixConfig::default()).unwrap()
    } else {
        Vec::new()
    };
    let profile = select_profile(VideoShape::Horizontal, QualityTier::High);
    emit_render_graph(&t, &transitions, &lanes, &profile, None).unwrap()
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().to_string()).collect()
}

fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
    let i = args.iter().position(|a| a == flag).unwrap();
    &args[i + 1]
}

fn backend() -> FfmpegBackend {
    FfmpegBackend::new(&ProcessConfig::default())
}

#[test]
fn stills_are_looped_inputs_with_their_source_duration() {
    let g = graph(1, 8_000, true, None);
    let args = strings(&backend().compile_args(&g, Path::new("out/reel.mp4")).unwrap());
    let first_input: Vec<_> = args[4..11].to_vec();
    assert_eq!(
        first_input,
        vec!["-loop", "1", "-framerate", "30/1", "-t", "8.000", "-i"]
    );
    assert_eq!(args[11], "img0.png");
    assert_eq!(args.last().unwrap(), "out/reel.mp4");
}

#[test]
fn paths_never_reach_the_filter_script() {
    let g = graph(3, 9_000, true, Some(2_000));
    let args = strings(&backend().compile_args(&g, Path::new("reel.mp4")).unwrap());
    let script = value_after(&args, "-filter_complex");
    assert!(!script.contains(".png"));
    assert!(!script.contains(".wav"));
    assert!(args.iter().any(|a| a == "voice over.wav"));
    assert!(script.contains("xfade=transition="));
    assert!(script.contains("amix=inputs=2:duration=longest:normalize=0"));
    assert!(script.contains("atrim=start=0.000:end=9.000,asetpts=PTS-STARTPTS"));
}

#[test]
fn short_music_is_stream_looped() {
    let g = graph(1, 8_000, true, Some(3_000));
    let args = strings(&backend().compile_args(&g, Path::new("reel.mp4")).unwrap());
    let i = args.iter().position(|a| a == "bed.mp3").unwrap();
    assert_eq!(&args[i - 3..i], &["-stream_loop", "-1", "-i"]);
}

#[test]
fn codec_settings_follow_the_profile() {
    let g = graph(2, 6_000, true, None);
    let args = strings(&backend().compile_args(&g, Path::new("reel.mp4")).unwrap());
    assert_eq!(value_after(&args, "-c:v"), "libx264");
    assert_eq!(value_after(&args, "-profile:v"), "main");
    assert_eq!(value_after(&args, "-level:v"), "4.0");
    assert_eq!(value_after(&args, "-crf"), "20");
    assert_eq!(value_after(&args, "-pix_fmt"), "yuv420p");
    assert_eq!(value_after(&args, "-b:a"), "192k");
    assert_eq!(value_after(&args, "-movflags"), "+faststart");
    assert_eq!(value_after(&args, "-map"), "[n6]");
}

#[test]
fn graph_without_lanes_is_silent() {
    let g = graph(1, 4_000, false, None);
    let args = strings(&backend().compile_args(&g, Path::new("reel.mp4")).unwrap());
    assert!(args.iter().any(|a| a == "-an"));
    assert!(!args.iter().any(|a| a == "-c:a"));
}

#[test]
fn envelope_compiles_to_a_frame_evaluated_volume_expression() {
    let env = VolumeEnvelope::ducking(&[(ms(0), ms(8_000))], 0.18, 0.55);
    assert_eq!(
        volume_filter(&env).unwrap(),
        "volume='if(lt(t,8.000),0.1800,0.5500)':eval=frame"
    );
    let env = VolumeEnvelope::ducking(&[(ms(1_000), ms(2_500))], 0.2, 0.6);
    assert_eq!(
        volume_filter(&env).unwrap(),
        "volume='if(lt(t,1.000),0.6000,if(lt(t,2.500),0.2000,0.6000))':eval=frame"
    );
    assert_eq!(
        volume_filter(&VolumeEnvelope::constant(0.55)).unwrap(),
        "volume=0.5500"
    );
    assert!(volume_filter(&VolumeEnvelope::constant(f32::NAN)).is_err());
}

#[test]
fn every_effect_has_a_distinct_xfade_name() {
    let mut names: Vec<_> = EffectKind::ALL.iter().map(|e| xfade_name(*e)).collect();
    assert!(names.iter().all(|n| !n.contains('_')));
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), EffectKind::ALL.len());
}

#[test]
fn missing_encoder_binary_is_a_tool_error() {
    let backend = FfmpegBackend::new(&ProcessConfig {
        ffmpeg: "slidereel-no-such-encoder".to_string(),
        spawn_retries: 0,
        ..ProcessConfig::default()
    });
    let out = PathBuf::from("target/unit_fixtures/encode/missing.mp4");
    let err = backend.encode(&graph(1, 2_000, true, None), &out).unwrap_err();
    assert!(matches!(err, ReelError::Tool { stage: Stage::Encode, .. }));
}

#[cfg(unix)]
#[test]
fn non_zero_exit_is_an_encode_failure() {
    let backend = FfmpegBackend::new(&ProcessConfig {
        ffmpeg: "false".to_string(),
        spawn_retries: 0,
        ..ProcessConfig::default()
    });
    let out = PathBuf::from("target/unit_fixtures/encode/failed.mp4");
    let err = backend.encode(&graph(1, 2_000, true, None), &out).unwrap_err();
    assert!(matches!(err, ReelError::EncodeFailed { .. }));
    assert_eq!(err.stage(), Some(Stage::Encode));
    assert!(!out.exists());
}
