//! Encoder backends: execute a [`RenderGraph`] into a finished container file.

pub(crate) mod ffmpeg;
pub(crate) mod filters;

pub use ffmpeg::FfmpegBackend;
pub use filters::{filter_complex, volume_filter, xfade_name};

use crate::foundation::error::ReelResult;
use crate::graph::RenderGraph;
use std::path::Path;

/// Something that can turn a render graph into an output file.
///
/// One call is one blocking encode. Failures are reported, never retried.
pub trait EncoderBackend: Send + Sync {
    /// Short backend name for logs and reports.
    fn name(&self) -> &'static str;

    /// Render `graph` into `out`, replacing any existing file.
    fn encode(&self, graph: &RenderGraph, out: &Path) -> ReelResult<()>;
}

pub(crate) fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
