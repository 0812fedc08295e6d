use super::*;
use crate::foundation::error::Stage;

#[test]
fn container_duration_is_rounded_to_millis() {
    let json = br#"{
        "streams": [{"codec_type": "audio", "duration": "12.000000"}],
        "format": {"duration": "12.0004"}
    }"#;
    assert_eq!(
        parse_ffprobe_audio_duration(json).unwrap(),
        TimeMs::from_millis(12_000)
    );
}

#[test]
fn stream_duration_is_used_when_format_has_none() {
    let json = br#"{
        "streams": [{"codec_type": "video"}, {"codec_type": "audio", "duration": "3.3336"}],
        "format": {}
    }"#;
    assert_eq!(
        parse_ffprobe_audio_duration(json).unwrap(),
        TimeMs::from_millis(3_334)
    );
}

#[test]
fn files_without_audio_are_rejected() {
    let json = br#"{"streams": [{"codec_type": "video"}], "format": {"duration": "1.0"}}"#;
    assert!(
        parse_ffprobe_audio_duration(json)
            .unwrap_err()
            .contains("no audio")
    );
}

#[test]
fn garbage_and_zero_durations_are_rejected() {
    assert!(parse_ffprobe_audio_duration(b"not json").is_err());
    let zero = br#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "0.0"}}"#;
    assert!(parse_ffprobe_audio_duration(zero).is_err());
    let nan = br#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "N/A"}}"#;
    assert!(parse_ffprobe_audio_duration(nan).is_err());
}

#[test]
fn missing_file_fails_before_spawning() {
    let settings = FfprobeSettings {
        program: "slidereel-no-such-ffprobe".to_string(),
        timeout: Duration::from_secs(1),
        spawn_retries: 0,
    };
    let err = probe_audio_file(&settings, Path::new("target/unit_fixtures/none.wav")).unwrap_err();
    assert!(matches!(err, ReelError::AssetUnreadable { .. }));
}

#[test]
fn unrunnable_ffprobe_reports_the_asset_as_unreadable() {
    let dir = Path::new("target/unit_fixtures");
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("narration_without_ffprobe.wav");
    std::fs::write(&path, b"RIFF").unwrap();
    let settings = FfprobeSettings {
        program: "slidereel-no-such-ffprobe".to_string(),
        timeout: Duration::from_secs(5),
        spawn_retries: 0,
    };
    let err = probe_audio_file(&settings, &path).unwrap_err();
    assert!(matches!(err, ReelError::AssetUnreadable { .. }), "{err}");
    assert_eq!(err.stage(), Some(Stage::Probe));
}
