use super::*;
use crate::foundation::core::TimeMs;
use crate::transitions::SeededSelector;

fn library_dir(name: &str, files: &[&str]) -> PathBuf {
    let dir = PathBuf::from("target")
        .join("unit_fixtures")
        .join("music")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for f in files {
        std::fs::write(dir.join(f), b"x").unwrap();
    }
    dir
}

struct FixedProber;

impl Prober for FixedProber {
    fn probe_image(&self, path: &Path) -> ReelResult<MediaAsset> {
        Err(ReelError::asset_unreadable(path, "not an image"))
    }

    fn probe_audio(&self, path: &Path) -> ReelResult<MediaAsset> {
        if path.to_string_lossy().contains("broken") {
            return Err(ReelError::asset_unreadable(path, "corrupt"));
        }
        Ok(MediaAsset::audio(path, TimeMs::from_secs(90)))
    }
}

fn mix_for(dir: Option<PathBuf>) -> MixConfig {
    MixConfig {
        music_dir: dir,
        ..MixConfig::default()
    }
}

#[test]
fn reserved_and_foreign_files_are_excluded() {
    let dir = library_dir(
        "pool",
        &[
            "calm.mp3",
            "Notification_Ping.wav",
            "system-beep.mp3",
            "upbeat.M4A",
            "cover.png",
            "alert.ogg",
        ],
    );
    let lib = MusicLibrary::new(&dir, &MixConfig::default().reserved_names);
    let names: Vec<_> = lib
        .candidates()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["calm.mp3", "upbeat.M4A"]);
}

#[test]
fn picks_are_deterministic_for_a_seed() {
    let dir = library_dir("seeded", &["a.mp3", "b.mp3", "c.mp3", "d.mp3"]);
    let lib = MusicLibrary::new(&dir, &[]);
    let a = lib.pick(&mut SeededSelector::new(8)).unwrap();
    let b = lib.pick(&mut SeededSelector::new(8)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn disabled_music_is_not_a_degradation() {
    let (track, degraded) = select_music(
        false,
        &mix_for(None),
        &FixedProber,
        &mut SeededSelector::new(1),
    )
    .unwrap();
    assert!(track.is_none());
    assert!(degraded.is_empty());
}

#[test]
fn missing_directory_degrades_to_narration_only() {
    let (track, degraded) = select_music(
        true,
        &mix_for(None),
        &FixedProber,
        &mut SeededSelector::new(1),
    )
    .unwrap();
    assert!(track.is_none());
    assert_eq!(degraded.len(), 1);
    assert_eq!(degraded[0].stage, Stage::Audio);
    assert!(degraded[0].reason.contains("no music directory"));
}

#[test]
fn pool_of_only_reserved_sounds_degrades() {
    let dir = library_dir("reserved_only", &["notification.mp3", "system.wav"]);
    let (track, degraded) = select_music(
        true,
        &mix_for(Some(dir)),
        &FixedProber,
        &mut SeededSelector::new(1),
    )
    .unwrap();
    assert!(track.is_none());
    assert_eq!(degraded.len(), 1);
}

#[test]
fn unprobeable_track_degrades() {
    let dir = library_dir("broken", &["broken.mp3"]);
    let (track, degraded) = select_music(
        true,
        &mix_for(Some(dir)),
        &FixedProber,
        &mut SeededSelector::new(1),
    )
    .unwrap();
    assert!(track.is_none());
    assert!(degraded[0].reason.contains("corrupt"));
}

#[test]
fn available_track_is_selected() {
    let dir = library_dir("ok", &["bed.mp3"]);
    let (track, degraded) = select_music(
        true,
        &mix_for(Some(dir.clone())),
        &FixedProber,
        &mut SeededSelector::new(1),
    )
    .unwrap();
    assert_eq!(track.unwrap().path, dir.join("bed.mp3"));
    assert!(degraded.is_empty());
}
