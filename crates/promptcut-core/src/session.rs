//! Edit Session Module
//!
//! Ties the interpreter, executor and history together around one loaded
//! video. Every intermediate result lives in a session-scoped scratch
//! directory that is removed when the session is dropped; `export` copies the
//! current state out of it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{info, warn};

use crate::ai::AIProvider;
use crate::descriptor::OperationDescriptor;
use crate::error::{EditError, EditResult};
use crate::executor::{EditExecutor, TransformOutcome};
use crate::ffmpeg::{detect, FFmpegRunner};
use crate::handle::VideoHandle;
use crate::history::EditHistory;
use crate::interpreter::{InterpreterConfig, PromptInterpreter};
use crate::settings::Settings;

// =============================================================================
// Outcome
// =============================================================================

/// What one applied prompt produced
#[derive(Clone, Debug)]
pub enum EditOutcome {
    /// A new video state, now current in the history
    Edited {
        descriptor: OperationDescriptor,
        handle: VideoHandle,
    },
    /// A side file (e.g. extracted audio); the video state is unchanged
    SideOutput {
        descriptor: OperationDescriptor,
        path: PathBuf,
    },
}

// =============================================================================
// Session
// =============================================================================

/// One interactive editing session over a single video
pub struct EditSession {
    history: EditHistory,
    interpreter: PromptInterpreter,
    executor: EditExecutor,
    scratch: TempDir,
    in_flight: Arc<AtomicBool>,
    edit_count: usize,
}

impl EditSession {
    /// Creates a session on a detected ffmpeg installation.
    pub fn new(provider: Arc<dyn AIProvider>, settings: &Settings) -> EditResult<Self> {
        let info = detect()?;
        info!(version = %info.version, "FFmpeg detected");
        Self::with_runner(provider, FFmpegRunner::new(info), settings)
    }

    /// Creates a session on an explicit runner.
    pub fn with_runner(
        provider: Arc<dyn AIProvider>,
        runner: FFmpegRunner,
        settings: &Settings,
    ) -> EditResult<Self> {
        let config = InterpreterConfig {
            max_retries: settings.max_retries,
            temperature: settings.temperature,
            ..InterpreterConfig::default()
        };
        Ok(Self {
            history: EditHistory::with_cap(settings.history_cap),
            interpreter: PromptInterpreter::new(provider).with_config(config),
            executor: EditExecutor::new(runner),
            scratch: tempfile::tempdir()?,
            in_flight: Arc::new(AtomicBool::new(false)),
            edit_count: 0,
        })
    }

    /// The runner, for building a preview driver on the same installation.
    pub fn runner(&self) -> FFmpegRunner {
        self.executor.runner().clone()
    }

    pub fn provider_name(&self) -> &str {
        self.interpreter.provider_name()
    }

    /// Probes and loads a video, resetting the history to it.
    pub async fn load(&mut self, path: &Path) -> EditResult<&VideoHandle> {
        if !path.exists() {
            return Err(EditError::FileNotFound(path.display().to_string()));
        }
        let media = self.executor.runner().probe(path).await?;
        if media.video.is_none() {
            return Err(EditError::UnsupportedFormat(format!(
                "{} has no video stream",
                path.display()
            )));
        }
        let handle = VideoHandle::new(path.to_path_buf(), media);
        info!(
            path = %path.display(),
            duration_sec = handle.duration_sec(),
            "Video loaded"
        );
        self.history.reset(handle);
        self.edit_count = 0;
        self.history.current()
    }

    /// The current video state.
    pub fn current(&self) -> EditResult<&VideoHandle> {
        self.history.current()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Interprets a natural-language prompt and applies the resulting
    /// operation. One edit at a time: a prompt arriving while another is in
    /// flight is rejected, not queued.
    pub async fn apply_prompt(&mut self, prompt: &str) -> EditResult<EditOutcome> {
        let _guard = self.begin_edit()?;
        let media = self.history.current()?.media.clone();
        let descriptor = self.interpreter.interpret(prompt, &media).await?;
        self.apply_inner(descriptor).await
    }

    /// Applies an already-built operation, bypassing interpretation.
    pub async fn apply_descriptor(
        &mut self,
        descriptor: OperationDescriptor,
    ) -> EditResult<EditOutcome> {
        let _guard = self.begin_edit()?;
        self.apply_inner(descriptor).await
    }

    async fn apply_inner(&mut self, descriptor: OperationDescriptor) -> EditResult<EditOutcome> {
        let current = self.history.current()?.clone();
        let outcome = self
            .executor
            .execute(&descriptor, &current, self.scratch.path(), self.edit_count + 1)
            .await?;

        match outcome {
            TransformOutcome::NewHandle(handle) => {
                self.edit_count += 1;
                self.history.push(handle.clone(), descriptor.clone());
                Ok(EditOutcome::Edited { descriptor, handle })
            }
            TransformOutcome::SideOutput(path) => {
                Ok(EditOutcome::SideOutput { descriptor, path })
            }
        }
    }

    /// Steps back one edit. The undone file stays on disk for redo.
    pub fn undo(&mut self) -> EditResult<VideoHandle> {
        let handle = self.history.undo()?.clone();
        info!(state = %handle.file_name(), "Undo");
        Ok(handle)
    }

    /// Re-applies the most recently undone edit.
    pub fn redo(&mut self) -> EditResult<VideoHandle> {
        let handle = self.history.redo()?.clone();
        info!(state = %handle.file_name(), "Redo");
        Ok(handle)
    }

    /// Copies the current state out of the scratch directory.
    pub async fn export(&self, dest: &Path) -> EditResult<PathBuf> {
        let current = self.history.current()?;
        if !current.exists() {
            return Err(EditError::FileNotFound(
                current.path.display().to_string(),
            ));
        }
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::copy(&current.path, dest).await?;
        info!(from = %current.path.display(), to = %dest.display(), "Exported");
        Ok(dest.to_path_buf())
    }

    fn begin_edit(&self) -> EditResult<FlightGuard> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected prompt: an edit is already in progress");
            return Err(EditError::EditInProgress);
        }
        Ok(FlightGuard(Arc::clone(&self.in_flight)))
    }
}

/// Releases the single-flight flag even when an edit fails. Owns its own
/// handle on the flag so the session stays free to mutate while the guard
/// is live.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockProvider;
    use crate::ffmpeg::FFmpegInfo;

    fn test_session(provider: MockProvider) -> EditSession {
        let info = FFmpegInfo {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            ffprobe_path: PathBuf::from("/nonexistent/ffprobe"),
            version: "test".to_string(),
        };
        EditSession::with_runner(
            Arc::new(provider),
            FFmpegRunner::new(info),
            &Settings::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_prompt_without_video_fails() {
        let mut session = test_session(MockProvider::new("mock"));
        let err = session.apply_prompt("make it grayscale").await.unwrap_err();
        assert!(matches!(err, EditError::NoVideoLoaded));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let mut session = test_session(MockProvider::new("mock"));
        let err = session
            .load(Path::new("/nonexistent/video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_second_prompt_rejected_while_in_flight() {
        let mut session = test_session(MockProvider::new("mock"));
        session.in_flight.store(true, Ordering::SeqCst);
        let err = session.apply_prompt("trim to 5 seconds").await.unwrap_err();
        assert!(matches!(err, EditError::EditInProgress));
    }

    #[tokio::test]
    async fn test_flight_flag_released_after_failure() {
        let mut session = test_session(MockProvider::new("mock"));
        // Fails early (no video loaded); the flag must be clear afterwards.
        assert!(session.apply_prompt("grayscale").await.is_err());
        assert!(!session.in_flight.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_sequential_prompts_each_acquire_flag() {
        let mut session = test_session(MockProvider::new("mock"));
        // Each attempt fails on the missing video, never on the flag: the
        // guard from the previous call must not outlive it.
        let first = session.apply_prompt("grayscale").await.unwrap_err();
        assert!(matches!(first, EditError::NoVideoLoaded));
        let second = session.apply_prompt("invert the colors").await.unwrap_err();
        assert!(matches!(second, EditError::NoVideoLoaded));
    }

    #[tokio::test]
    async fn test_undo_empty_history() {
        let mut session = test_session(MockProvider::new("mock"));
        assert!(matches!(session.undo(), Err(EditError::NoVideoLoaded) | Err(EditError::NothingToUndo)));
    }

    #[tokio::test]
    async fn test_export_without_video() {
        let session = test_session(MockProvider::new("mock"));
        let err = session.export(Path::new("/tmp/out.mp4")).await.unwrap_err();
        assert!(matches!(err, EditError::NoVideoLoaded));
    }
}
