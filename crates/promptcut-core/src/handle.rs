//! Video Handle Module
//!
//! A `VideoHandle` is an immutable-by-convention reference to a decoded
//! video resource: a file on disk plus its probed metadata. Every edit
//! produces a new handle pointing at a new file; the source file is never
//! modified in place, which is what makes undo a pure cursor move.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::ffmpeg::MediaInfo;

/// Reference to an immutable decoded video state
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHandle {
    /// Unique handle id
    pub id: String,
    /// File backing this handle
    pub path: PathBuf,
    /// Probed metadata
    pub media: MediaInfo,
}

impl VideoHandle {
    /// Creates a handle for a probed file.
    pub fn new(path: PathBuf, media: MediaInfo) -> Self {
        Self {
            id: Ulid::new().to_string(),
            path,
            media,
        }
    }

    /// Duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.media.duration_sec
    }

    /// Resolution of the primary video stream, if any.
    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.media.resolution()
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Output file name for the `n`-th edit derived from this handle's stem,
    /// e.g. `clip_edit_003_trim.mp4`.
    pub fn derived_file_name(&self, edit_index: usize, kind: &str) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        // Strip a previous _edit_NNN_kind suffix so names don't snowball.
        let stem = match stem.find("_edit_") {
            Some(idx) => stem[..idx].to_string(),
            None => stem,
        };
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "mp4".to_string());
        format!("{}_edit_{:03}_{}.{}", stem, edit_index, kind, ext)
    }

    /// Whether the backing file still exists.
    pub fn exists(&self) -> bool {
        Path::new(&self.path).exists()
    }
}
