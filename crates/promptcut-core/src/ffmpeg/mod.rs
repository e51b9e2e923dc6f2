//! FFmpeg Integration Module
//!
//! All video decode/encode work is delegated to FFmpeg subprocesses:
//! - `ffprobe` for media metadata
//! - `ffmpeg` for transforms planned by the edit executor and for preview
//!   frame extraction
//!
//! Supports system-installed FFmpeg; the binary location can be overridden
//! with the `PROMPTCUT_FFMPEG` / `PROMPTCUT_FFPROBE` environment variables.

mod detection;
mod runner;

pub use detection::{detect, FFmpegInfo};
pub use runner::{AudioStreamInfo, FFmpegRunner, MediaInfo, VideoStreamInfo};

use crate::error::EditError;

/// FFmpeg-related error types
#[derive(Debug, thiserror::Error)]
pub enum FFmpegError {
    #[error("FFmpeg not found. Install FFmpeg or set PROMPTCUT_FFMPEG.")]
    NotFound,

    #[error("FFmpeg execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid input file: {0}")]
    InvalidInput(String),

    #[error("Output path error: {0}")]
    OutputError(String),

    #[error("FFprobe error: {0}")]
    ProbeError(String),

    #[error("Process error: {0}")]
    ProcessError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type FFmpegResult<T> = Result<T, FFmpegError>;

impl From<FFmpegError> for EditError {
    fn from(err: FFmpegError) -> Self {
        match err {
            FFmpegError::NotFound => EditError::BackendNotFound,
            FFmpegError::InvalidInput(msg) => EditError::FileNotFound(msg),
            FFmpegError::ExecutionFailed(msg) => EditError::TransformFailed(msg),
            FFmpegError::ProbeError(msg) | FFmpegError::ParseError(msg) => {
                EditError::ProbeFailed(msg)
            }
            FFmpegError::OutputError(msg) => EditError::Internal(msg),
            FFmpegError::ProcessError(e) => EditError::IoError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureClass;

    #[test]
    fn test_ffmpeg_error_display() {
        let err = FFmpegError::NotFound;
        assert!(err.to_string().contains("FFmpeg not found"));

        let err = FFmpegError::ExecutionFailed("exit code 1".to_string());
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn test_ffmpeg_error_classes() {
        let err: EditError = FFmpegError::NotFound.into();
        assert_eq!(err.class(), FailureClass::Resource);

        let err: EditError = FFmpegError::ExecutionFailed("boom".into()).into();
        assert_eq!(err.class(), FailureClass::Execution);
    }
}
