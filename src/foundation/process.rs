use std::ffi::OsString;
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const SPAWN_BACKOFF: Duration = Duration::from_millis(150);

/// One invocation of an external tool (`ffprobe`, `ffmpeg`).
#[derive(Clone, Debug)]
pub(crate) struct ToolCommand {
    pub(crate) program: String,
    pub(crate) args: Vec<OsString>,
    pub(crate) timeout: Duration,
    /// Extra attempts made only when the process fails to start.
    pub(crate) spawn_retries: u32,
}

impl ToolCommand {
    pub(crate) fn new(program: impl Into<String>, timeout: Duration, spawn_retries: u32) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
            spawn_retries,
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for logs and diagnostics. Never executed through a shell.
    pub(crate) fn display(&self) -> String {
        let mut s = self.program.clone();
        for a in &self.args {
            s.push(' ');
            let a = a.to_string_lossy();
            if a.contains(char::is_whitespace) || a.is_empty() {
                s.push_str(&format!("'{a}'"));
            } else {
                s.push_str(&a);
            }
        }
        s
    }
}

#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
}

impl ToolOutput {
    pub(crate) fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ToolFailure {
    #[error("failed to start '{program}' after {attempts} attempt(s): {source}")]
    Spawn {
        program: String,
        attempts: u32,
        source: std::io::Error,
    },
    #[error("'{program}' timed out after {timeout:?}")]
    TimedOut {
        program: String,
        timeout: Duration,
        stderr: String,
    },
    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
}

impl ToolFailure {
    /// Diagnostic output captured before the failure, if any.
    pub(crate) fn diagnostics(&self) -> &str {
        match self {
            Self::TimedOut { stderr, .. } => stderr,
            Self::Spawn { .. } | Self::Wait { .. } => "",
        }
    }
}

/// Run `cmd` to completion, enforcing its timeout.
///
/// Only start-up failures are retried. A process that ran and failed is reported through the
/// returned exit status, never retried here.
pub(crate) fn run_tool(cmd: &ToolCommand) -> Result<ToolOutput, ToolFailure> {
    let attempts = cmd.spawn_retries + 1;
    let mut attempt = 0u32;
    let mut child = loop {
        attempt += 1;
        let spawned = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        match spawned {
            Ok(child) => break child,
            Err(source) if attempt >= attempts => {
                return Err(ToolFailure::Spawn {
                    program: cmd.program.clone(),
                    attempts,
                    source,
                });
            }
            Err(e) => {
                tracing::warn!(program = %cmd.program, attempt, "spawn failed, retrying: {e}");
                std::thread::sleep(SPAWN_BACKOFF * attempt);
            }
        }
    };

    let stdout_drain = child.stdout.take().map(drain);
    let stderr_drain = child.stderr.take().map(drain);

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= cmd.timeout => {
                let _ = child.kill();
                let _ = child.wait();
                let stderr = join_drain(stderr_drain);
                return Err(ToolFailure::TimedOut {
                    program: cmd.program.clone(),
                    timeout: cmd.timeout,
                    stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(ToolFailure::Wait {
                    program: cmd.program.clone(),
                    source,
                });
            }
        }
    };

    Ok(ToolOutput {
        status,
        stdout: join_drain(stdout_drain),
        stderr: join_drain(stderr_drain),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Return `true` when `program -version` can be invoked from `PATH`.
pub fn is_tool_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/process.rs"]
mod tests;
