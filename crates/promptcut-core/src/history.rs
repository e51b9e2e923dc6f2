//! Edit History Module
//!
//! Linear undo/redo stack of video handles with a cursor. The sequence is
//! never reordered; applying a new edit while not at the tail truncates the
//! redo branch first. The cursor always points at a valid, previously
//! produced handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::descriptor::OperationDescriptor;
use crate::error::{EditError, EditResult};
use crate::handle::VideoHandle;

/// Default cap on retained history entries
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// One entry in the edit history
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Entry id
    pub id: String,
    /// The video handle produced by this step
    pub handle: VideoHandle,
    /// The operation that produced it (None for the initially loaded video)
    pub descriptor: Option<OperationDescriptor>,
    /// When the entry was pushed
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(handle: VideoHandle, descriptor: Option<OperationDescriptor>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            handle,
            descriptor,
            timestamp: Utc::now(),
        }
    }
}

/// Undo/redo stack of video handles with a cursor
#[derive(Clone, Debug, Default)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    /// Index of the current entry; meaningless while `entries` is empty.
    cursor: usize,
    cap: usize,
}

impl EditHistory {
    /// Creates an empty history with the default cap.
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_HISTORY_CAP)
    }

    /// Creates an empty history retaining at most `cap` entries.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            cap: cap.max(1),
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty (no video loaded yet).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current entry's handle.
    pub fn current(&self) -> EditResult<&VideoHandle> {
        self.entries
            .get(self.cursor)
            .map(|e| &e.handle)
            .ok_or(EditError::NoVideoLoaded)
    }

    /// The current entry, if any.
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// All entries in order, oldest first, for display.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Cursor position within `entries()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Resets the history to a single freshly loaded handle.
    pub fn reset(&mut self, handle: VideoHandle) {
        self.entries = vec![HistoryEntry::new(handle, None)];
        self.cursor = 0;
    }

    /// Appends a new edit result, truncating any redo branch beyond the
    /// cursor first.
    pub fn push(&mut self, handle: VideoHandle, descriptor: OperationDescriptor) {
        if !self.entries.is_empty() {
            let discarded = self.entries.len() - (self.cursor + 1);
            if discarded > 0 {
                debug!(discarded, "Discarding redo branch");
            }
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(HistoryEntry::new(handle, Some(descriptor)));
        self.cursor = self.entries.len() - 1;

        // Cap retained entries by dropping the oldest; the cursor keeps
        // pointing at the same entry.
        while self.entries.len() > self.cap && self.cursor > 0 {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Whether `undo` would succeed.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether `redo` would succeed.
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Moves the cursor back one entry and returns the handle it lands on.
    pub fn undo(&mut self) -> EditResult<&VideoHandle> {
        if !self.can_undo() {
            return Err(EditError::NothingToUndo);
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "Undo");
        self.current()
    }

    /// Moves the cursor forward one entry and returns the handle it lands on.
    pub fn redo(&mut self) -> EditResult<&VideoHandle> {
        if !self.can_redo() {
            return Err(EditError::NothingToRedo);
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "Redo");
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Operation, OperationDescriptor};
    use crate::ffmpeg::MediaInfo;
    use std::path::PathBuf;

    fn handle(name: &str) -> VideoHandle {
        VideoHandle::new(
            PathBuf::from(format!("/tmp/{}.mp4", name)),
            MediaInfo {
                duration_sec: 10.0,
                video: None,
                audio: None,
                format: "mp4".to_string(),
                size_bytes: 0,
            },
        )
    }

    fn descriptor() -> OperationDescriptor {
        OperationDescriptor::from_operation(Operation::Grayscale).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let history = EditHistory::new();
        assert!(history.is_empty());
        assert!(matches!(history.current(), Err(EditError::NoVideoLoaded)));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_at_start_is_error() {
        let mut history = EditHistory::new();
        history.reset(handle("source"));
        assert!(matches!(history.undo(), Err(EditError::NothingToUndo)));
    }

    #[test]
    fn test_redo_at_tail_is_error() {
        let mut history = EditHistory::new();
        history.reset(handle("source"));
        history.push(handle("a"), descriptor());
        assert!(matches!(history.redo(), Err(EditError::NothingToRedo)));
    }

    #[test]
    fn test_undo_then_redo_is_idempotent() {
        let mut history = EditHistory::new();
        history.reset(handle("source"));
        history.push(handle("a"), descriptor());
        history.push(handle("b"), descriptor());

        let before = history.current().unwrap().id.clone();
        history.undo().unwrap();
        history.redo().unwrap();
        assert_eq!(history.current().unwrap().id, before);
    }

    #[test]
    fn test_push_after_undo_discards_redo_branch() {
        let mut history = EditHistory::new();
        history.reset(handle("source"));
        history.push(handle("a"), descriptor());
        let b = handle("b");
        let b_id = b.id.clone();
        history.push(b, descriptor());

        history.undo().unwrap();
        history.push(handle("c"), descriptor());

        assert!(!history.can_redo());
        assert!(history.entries().iter().all(|e| e.handle.id != b_id));
        assert_eq!(history.len(), 3); // source, a, c
    }

    #[test]
    fn test_undo_walks_back_to_source() {
        let mut history = EditHistory::new();
        let source = handle("source");
        let source_id = source.id.clone();
        history.reset(source);
        history.push(handle("a"), descriptor());
        history.push(handle("b"), descriptor());

        history.undo().unwrap();
        history.undo().unwrap();
        assert_eq!(history.current().unwrap().id, source_id);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn test_cap_drops_oldest_entries() {
        let mut history = EditHistory::with_cap(3);
        history.reset(handle("source"));
        for i in 0..5 {
            history.push(handle(&format!("e{}", i)), descriptor());
        }

        assert_eq!(history.len(), 3);
        // Cursor still points at the newest entry.
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current().unwrap().file_name(), "e4.mp4");
    }

    #[test]
    fn test_reset_clears_previous_session() {
        let mut history = EditHistory::new();
        history.reset(handle("first"));
        history.push(handle("a"), descriptor());

        history.reset(handle("second"));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
