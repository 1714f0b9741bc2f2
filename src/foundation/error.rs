use crate::foundation::core::Stage;

/// Convenience result type used across spritepipe.
pub type SpriteResult<T> = Result<T, SpriteError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SpriteError {
    /// The external video decoder (`ffmpeg`) is not installed or not runnable.
    #[error("tool missing: {0}")]
    ToolMissing(String),

    /// Probing the source video failed. Callers usually recover with default assumptions.
    #[error("probe failed: {0}")]
    ProbeFailed(String),

    /// The decoder ran but could not produce frames.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// A stage expected a non-empty frame sequence.
    #[error("no frames found: {0}")]
    NoFramesFound(String),

    /// Malformed user-provided argument (numeric value, mask rectangle, pass list).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Inconsistent data, e.g. frames of different sizes in one sequence.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing the atlas manifest.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A pipeline stage failed; `source` carries the underlying cause.
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        /// Stage that was running when the failure happened.
        stage: Stage,
        /// Underlying cause.
        #[source]
        source: Box<SpriteError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpriteError {
    /// Build a [`SpriteError::ToolMissing`] value.
    pub fn tool_missing(msg: impl Into<String>) -> Self {
        Self::ToolMissing(msg.into())
    }

    /// Build a [`SpriteError::ProbeFailed`] value.
    pub fn probe_failed(msg: impl Into<String>) -> Self {
        Self::ProbeFailed(msg.into())
    }

    /// Build a [`SpriteError::ExtractionFailed`] value.
    pub fn extraction_failed(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed(msg.into())
    }

    /// Build a [`SpriteError::NoFramesFound`] value.
    pub fn no_frames(msg: impl Into<String>) -> Self {
        Self::NoFramesFound(msg.into())
    }

    /// Build a [`SpriteError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`SpriteError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SpriteError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Wrap `self` as the cause of a failed pipeline stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through [`SpriteError::StageFailed`] wrappers.
    pub fn root_cause(&self) -> &SpriteError {
        match self {
            Self::StageFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
