use std::path::PathBuf;

/// Convenience result type used across slidereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Pipeline stage a failure or degradation is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Asset probing (image dimensions/color, audio duration).
    Probe,
    /// Smart background generation.
    Background,
    /// Timeline construction.
    Timeline,
    /// Transition scheduling.
    Transitions,
    /// Audio lane planning.
    Audio,
    /// Output profile selection.
    Profile,
    /// Render graph emission.
    Emit,
    /// External encoder execution.
    Encode,
}

impl Stage {
    /// Stable lowercase name used in messages and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Background => "background",
            Self::Timeline => "timeline",
            Self::Transitions => "transitions",
            Self::Audio => "audio",
            Self::Profile => "profile",
            Self::Emit => "emit",
            Self::Encode => "encode",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error taxonomy used by composition APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided request or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An input asset is missing or could not be decoded/probed. Aborts the render.
    #[error("[probe] asset unreadable '{}': {reason}", path.display())]
    AssetUnreadable {
        /// Offending asset path.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Computed timing does not satisfy a structural invariant. Always a defect.
    #[error("[{stage}] invariant violation: {message}\n{dump}")]
    InvariantViolation {
        /// Stage whose output broke the invariant.
        stage: Stage,
        /// Short description of the broken invariant.
        message: String,
        /// Full timing dump captured at the point of failure.
        dump: String,
    },

    /// The external encoder exited non-zero or timed out.
    #[error("[encode] encode failed: {reason}\n{diagnostics}")]
    EncodeFailed {
        /// Short failure cause (exit status, timeout).
        reason: String,
        /// Captured encoder diagnostic output.
        diagnostics: String,
    },

    /// An external tool (outside of encoding) could not be started or timed out.
    #[error("[{stage}] external tool error: {message}")]
    Tool {
        /// Stage that invoked the tool.
        stage: Stage,
        /// Failure description.
        message: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::AssetUnreadable`] value.
    pub fn asset_unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AssetUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ReelError::InvariantViolation`] value.
    pub fn invariant(stage: Stage, message: impl Into<String>, dump: impl Into<String>) -> Self {
        Self::InvariantViolation {
            stage,
            message: message.into(),
            dump: dump.into(),
        }
    }

    /// Build a [`ReelError::EncodeFailed`] value.
    pub fn encode_failed(reason: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Build a [`ReelError::Tool`] value.
    pub fn tool(stage: Stage, message: impl Into<String>) -> Self {
        Self::Tool {
            stage,
            message: message.into(),
        }
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Stage the error is attributed to, when it belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::AssetUnreadable { .. } => Some(Stage::Probe),
            Self::InvariantViolation { stage, .. } | Self::Tool { stage, .. } => Some(*stage),
            Self::EncodeFailed { .. } => Some(Stage::Encode),
            Self::Validation(_) | Self::Serde(_) | Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
