use crate::assets::model::MediaAsset;
use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::process::{ToolCommand, run_tool};
use std::path::Path;
use std::time::Duration;

/// How `ffprobe` is invoked.
#[derive(Clone, Debug)]
pub struct FfprobeSettings {
    pub program: String,
    pub timeout: Duration,
    pub spawn_retries: u32,
}

/// Probe an audio file's duration through `ffprobe`.
pub fn probe_audio_file(settings: &FfprobeSettings, path: &Path) -> ReelResult<MediaAsset> {
    if !path.is_file() {
        return Err(ReelError::asset_unreadable(path, "file not found"));
    }

    let cmd = ToolCommand::new(&settings.program, settings.timeout, settings.spawn_retries)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path);
    let out = run_tool(&cmd)
        .map_err(|e| ReelError::asset_unreadable(path, format!("ffprobe could not run: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::asset_unreadable(
            path,
            format!("ffprobe failed ({}): {}", out.status, out.stderr_lossy()),
        ));
    }

    let duration = parse_ffprobe_audio_duration(&out.stdout)
        .map_err(|reason| ReelError::asset_unreadable(path, reason))?;
    Ok(MediaAsset::audio(path, duration))
}

/// Extract the duration of a file with at least one audio stream from `ffprobe` JSON.
///
/// The container duration is preferred; the audio stream's own duration is used when the
/// container does not report one.
pub(crate) fn parse_ffprobe_audio_duration(json: &[u8]) -> Result<TimeMs, String> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut =
        serde_json::from_slice(json).map_err(|e| format!("ffprobe json parse failed: {e}"))?;
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| "no audio stream found".to_string())?;

    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .or_else(|| audio.duration.clone())
        .ok_or_else(|| "ffprobe reported no duration".to_string())?;
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid duration '{raw}': {e}"))?;
    let d = TimeMs::from_secs_f64(secs).map_err(|e| e.to_string())?;
    if d.is_zero() {
        return Err("audio duration is zero".to_string());
    }
    Ok(d)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
