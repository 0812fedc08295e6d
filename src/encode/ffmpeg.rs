use crate::config::ProcessConfig;
use crate::encode::filters::{filter_complex, stream_label};
use crate::encode::{EncoderBackend, ensure_parent_dir};
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::foundation::process::{ToolCommand, ToolFailure, run_tool};
use crate::graph::{GraphInput, NodeOp, RenderGraph, StreamRef};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// Executes render graphs with the system `ffmpeg` binary.
///
/// We intentionally use the system binary rather than linking FFmpeg, so no native dev headers
/// are needed to build.
#[derive(Clone, Debug)]
pub struct FfmpegBackend {
    program: String,
    timeout: Duration,
    spawn_retries: u32,
}

impl FfmpegBackend {
    pub fn new(process: &ProcessConfig) -> Self {
        Self {
            program: process.ffmpeg.clone(),
            timeout: process.encode_timeout(),
            spawn_retries: process.spawn_retries,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector for rendering `graph` into `out`.
    ///
    /// Paths only ever appear as standalone `-i` values or as the final output argument.
    pub fn compile_args(&self, graph: &RenderGraph, out: &Path) -> ReelResult<Vec<OsString>> {
        graph.validate()?;
        let Some(mux) = graph.mux() else {
            return Err(ReelError::validation("render graph has no mux node"));
        };
        let NodeOp::Mux {
            fps,
            video,
            audio,
            duration,
            ..
        } = &mux.op
        else {
            return Err(ReelError::validation("render graph has no mux node"));
        };

        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();
        for input in &graph.inputs {
            args.extend(input_args(input));
        }

        let script = filter_complex(graph)?;
        if !script.is_empty() {
            args.push("-filter_complex".into());
            args.push(script.into());
        }

        let video_ref = mux.inputs[0];
        args.push("-map".into());
        args.push(map_label(graph, video_ref).into());
        let audio_ref = mux.inputs.get(1).copied();
        if let Some(a) = audio_ref {
            args.push("-map".into());
            args.push(map_label(graph, a).into());
        }

        let tail = [
            "-c:v".to_string(),
            "libx264".to_string(),
            "-profile:v".to_string(),
            video.profile.as_str().to_string(),
            "-level:v".to_string(),
            video.level.to_string(),
            "-preset".to_string(),
            video.preset.as_str().to_string(),
            "-crf".to_string(),
            video.crf.to_string(),
            "-pix_fmt".to_string(),
            video.pixel_format.as_str().to_string(),
            "-r".to_string(),
            fps.ratio_string(),
        ];
        args.extend(tail.into_iter().map(OsString::from));
        if audio_ref.is_some() {
            let audio_args = [
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                format!("{}k", audio.bitrate_kbps),
                "-ar".to_string(),
                audio.sample_rate.to_string(),
                "-ac".to_string(),
                audio.channels.to_string(),
            ];
            args.extend(audio_args.into_iter().map(OsString::from));
        } else {
            args.push("-an".into());
        }
        args.push("-t".into());
        args.push(duration.secs_string().into());
        args.push("-movflags".into());
        args.push("+faststart".into());
        args.push(out.as_os_str().to_owned());
        Ok(args)
    }
}

fn input_args(input: &GraphInput) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(8);
    match input {
        GraphInput::Image {
            path,
            duration,
            fps,
        } => {
            args.extend(["-loop", "1", "-framerate"].map(OsString::from));
            args.push(fps.ratio_string().into());
            args.push("-t".into());
            args.push(duration.secs_string().into());
            args.push("-i".into());
            args.push(path.as_os_str().to_owned());
        }
        GraphInput::Audio { path, looped } => {
            if *looped {
                args.extend(["-stream_loop", "-1"].map(OsString::from));
            }
            args.push("-i".into());
            args.push(path.as_os_str().to_owned());
        }
    }
    args
}

/// `-map` argument: filter outputs keep their brackets, raw inputs use `index:kind`.
fn map_label(graph: &RenderGraph, r: StreamRef) -> String {
    let label = stream_label(graph, r);
    match r {
        StreamRef::Input(_) => label.trim_matches(['[', ']']).to_string(),
        StreamRef::Node(_) => label,
    }
}

impl EncoderBackend for FfmpegBackend {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    #[tracing::instrument(skip(self, graph), fields(out = %out.display(), duration = %graph.duration))]
    fn encode(&self, graph: &RenderGraph, out: &Path) -> ReelResult<()> {
        let args = self.compile_args(graph, out)?;
        ensure_parent_dir(out)?;
        let cmd = ToolCommand::new(&self.program, self.timeout, self.spawn_retries).args(args);
        tracing::debug!(command = %cmd.display(), "starting encoder");

        let output = match run_tool(&cmd) {
            Ok(output) => output,
            Err(e @ ToolFailure::Spawn { .. }) => {
                return Err(ReelError::tool(Stage::Encode, e.to_string()));
            }
            Err(e) => {
                let _ = std::fs::remove_file(out);
                return Err(ReelError::encode_failed(e.to_string(), e.diagnostics()));
            }
        };
        if !output.status.success() {
            let _ = std::fs::remove_file(out);
            return Err(ReelError::encode_failed(
                format!("{} exited with {}", self.program, output.status),
                output.stderr_lossy(),
            ));
        }
        if !out.is_file() {
            return Err(ReelError::encode_failed(
                format!("{} reported success but wrote no output", self.program),
                output.stderr_lossy(),
            ));
        }
        tracing::info!("encode finished");
        Ok(())
    }
}
