//! FFmpeg Detection Module
//!
//! Handles detection and validation of FFmpeg/FFprobe binaries.
//! Environment overrides take precedence over the system PATH search.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{FFmpegError, FFmpegResult};

/// Environment variable overriding the ffmpeg binary location
pub const FFMPEG_ENV: &str = "PROMPTCUT_FFMPEG";
/// Environment variable overriding the ffprobe binary location
pub const FFPROBE_ENV: &str = "PROMPTCUT_FFPROBE";

/// Information about a detected FFmpeg installation
#[derive(Debug, Clone)]
pub struct FFmpegInfo {
    /// Path to the ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// Path to the ffprobe binary
    pub ffprobe_path: PathBuf,
    /// FFmpeg version string
    pub version: String,
}

/// Detects FFmpeg and FFprobe, preferring environment overrides, then the
/// system PATH.
pub fn detect() -> FFmpegResult<FFmpegInfo> {
    let ffmpeg_path = locate_binary(FFMPEG_ENV, "ffmpeg")?;
    let ffprobe_path = locate_binary(FFPROBE_ENV, "ffprobe")?;

    let version = get_version(&ffmpeg_path)?;
    debug!(
        ffmpeg = %ffmpeg_path.display(),
        ffprobe = %ffprobe_path.display(),
        version = %version,
        "Detected FFmpeg installation"
    );

    Ok(FFmpegInfo {
        ffmpeg_path,
        ffprobe_path,
        version,
    })
}

fn locate_binary(env_var: &str, name: &str) -> FFmpegResult<PathBuf> {
    if let Ok(path) = std::env::var(env_var) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        return Err(FFmpegError::InvalidInput(format!(
            "{} points to a missing file: {}",
            env_var,
            path.display()
        )));
    }

    which(name).ok_or(FFmpegError::NotFound)
}

/// Searches the PATH environment variable for a binary.
fn which(name: &str) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let file_name = format!("{}.exe", name);
    #[cfg(not(target_os = "windows"))]
    let file_name = name.to_string();

    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Runs `ffmpeg -version` and extracts the version string.
fn get_version(ffmpeg_path: &Path) -> FFmpegResult<String> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .map_err(|_| FFmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FFmpegError::ExecutionFailed(
            "ffmpeg -version returned a non-zero exit code".to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_version_line(&stdout))
}

fn parse_version_line(stdout: &str) -> String {
    stdout
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("ffmpeg version "))
        .map(|rest| rest.split_whitespace().next().unwrap_or(rest).to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_line() {
        let stdout = "ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers\n\
                      built with gcc 13";
        assert_eq!(parse_version_line(stdout), "6.1.1");
    }

    #[test]
    fn test_parse_version_line_unknown() {
        assert_eq!(parse_version_line("garbage"), "unknown");
    }
}
