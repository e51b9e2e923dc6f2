//! PromptCut Error Definitions
//!
//! Defines error types used throughout the engine. Every variant maps onto
//! exactly one failure class of the error taxonomy (interpretation,
//! validation, execution, resource, usage, config) via [`EditError::class`].

use thiserror::Error;

/// Failure taxonomy for surfacing errors to the shell.
///
/// All failures are local to the attempted operation: the history and the
/// current video handle are never left partially mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    /// AI response missing, malformed, or referencing an unknown operation.
    Interpretation,
    /// Well-formed response but a parameter is outside its schema range.
    Validation,
    /// The underlying transform could not be applied.
    Execution,
    /// File not found, unsupported format, out of memory.
    Resource,
    /// Misuse of the session API (nothing to undo, edit in flight, ...).
    Usage,
    /// Startup-time configuration problem (missing API key, bad settings).
    Config,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Interpretation => "interpretation",
            FailureClass::Validation => "validation",
            FailureClass::Execution => "execution",
            FailureClass::Resource => "resource",
            FailureClass::Usage => "usage",
            FailureClass::Config => "config",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core engine error types
#[derive(Error, Debug)]
pub enum EditError {
    // =========================================================================
    // Interpretation Errors
    // =========================================================================
    #[error("AI request failed: {0}")]
    AiRequestFailed(String),

    #[error("AI response could not be parsed: {0}")]
    AiResponseMalformed(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unsupported request: {0}")]
    Unsupported(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid time range: {0}~{1} seconds")]
    InvalidTimeRange(f64, f64),

    // =========================================================================
    // Execution Errors
    // =========================================================================
    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported media format: {0}")]
    UnsupportedFormat(String),

    #[error("FFmpeg not found. Install FFmpeg or set PROMPTCUT_FFMPEG.")]
    BackendNotFound,

    // =========================================================================
    // Session / Usage Errors
    // =========================================================================
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("An edit is already in progress")]
    EditInProgress,

    #[error("No video loaded")]
    NoVideoLoaded,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type EditResult<T> = Result<T, EditError>;

impl EditError {
    /// Returns the failure class this error belongs to.
    pub fn class(&self) -> FailureClass {
        match self {
            EditError::AiRequestFailed(_)
            | EditError::AiResponseMalformed(_)
            | EditError::UnknownOperation(_)
            | EditError::Unsupported(_) => FailureClass::Interpretation,

            EditError::ValidationError(_) | EditError::InvalidTimeRange(_, _) => {
                FailureClass::Validation
            }

            EditError::TransformFailed(_)
            | EditError::ProbeFailed(_)
            | EditError::Timeout(_)
            | EditError::Internal(_) => FailureClass::Execution,

            EditError::FileNotFound(_)
            | EditError::UnsupportedFormat(_)
            | EditError::BackendNotFound
            | EditError::IoError(_)
            | EditError::JsonError(_) => FailureClass::Resource,

            EditError::NothingToUndo
            | EditError::NothingToRedo
            | EditError::EditInProgress
            | EditError::NoVideoLoaded => FailureClass::Usage,

            EditError::Config(_) | EditError::NotSupported(_) => FailureClass::Config,
        }
    }

    /// Convert to a user-friendly status message for the shell.
    pub fn to_status_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            EditError::UnknownOperation("warp".into()).class(),
            FailureClass::Interpretation
        );
        assert_eq!(
            EditError::ValidationError("position out of range".into()).class(),
            FailureClass::Validation
        );
        assert_eq!(
            EditError::TransformFailed("exit code 1".into()).class(),
            FailureClass::Execution
        );
        assert_eq!(
            EditError::FileNotFound("a.mp4".into()).class(),
            FailureClass::Resource
        );
        assert_eq!(EditError::NothingToUndo.class(), FailureClass::Usage);
        assert_eq!(
            EditError::Config("missing API key".into()).class(),
            FailureClass::Config
        );
    }

    #[test]
    fn test_error_display() {
        let err = EditError::InvalidTimeRange(5.0, 2.0);
        assert!(err.to_string().contains("5~2"));

        let err = EditError::EditInProgress;
        assert!(err.to_string().contains("already in progress"));
    }
}
