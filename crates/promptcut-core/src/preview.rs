//! Preview Module
//!
//! Lightweight playback state over the current video handle. The driver does
//! not decode video itself; it advances a playhead at the clip's frame rate
//! and publishes positions over a watch channel, and still frames are pulled
//! through ffmpeg on demand.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::ffmpeg::FFmpegRunner;
use crate::handle::VideoHandle;

const FALLBACK_FPS: f64 = 30.0;

// =============================================================================
// Status
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Published on every playhead tick and on state transitions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewStatus {
    pub state: PlaybackState,
    pub position_sec: f64,
}

impl PreviewStatus {
    fn stopped() -> Self {
        Self {
            state: PlaybackState::Stopped,
            position_sec: 0.0,
        }
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Drives preview playback for one loaded clip
pub struct PreviewDriver {
    runner: FFmpegRunner,
    handle: Option<VideoHandle>,
    status_tx: watch::Sender<PreviewStatus>,
    paused: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl PreviewDriver {
    pub fn new(runner: FFmpegRunner) -> Self {
        let (status_tx, _) = watch::channel(PreviewStatus::stopped());
        Self {
            runner,
            handle: None,
            status_tx,
            paused: Arc::new(AtomicBool::new(false)),
            ticker: None,
        }
    }

    /// Points the driver at a new handle; playback stops and the playhead
    /// returns to zero.
    pub fn load(&mut self, handle: VideoHandle) {
        self.stop();
        debug!(path = %handle.path.display(), "Preview target changed");
        self.handle = Some(handle);
    }

    /// Observers receive every position update.
    pub fn subscribe(&self) -> watch::Receiver<PreviewStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> PreviewStatus {
        *self.status_tx.borrow()
    }

    /// Starts (or resumes) playback from the current playhead.
    pub fn play(&mut self) -> EditResult<()> {
        let handle = self.handle.as_ref().ok_or(EditError::NoVideoLoaded)?;

        // A ticker that ran to end-of-clip is done, not paused.
        if self.ticker.as_ref().is_some_and(|t| t.is_finished()) {
            self.ticker = None;
        }
        if self.ticker.is_some() {
            // Resume from pause.
            self.paused.store(false, Ordering::SeqCst);
            self.send_state(PlaybackState::Playing);
            return Ok(());
        }

        let duration = handle.duration_sec();
        let fps = handle.media.fps().unwrap_or(FALLBACK_FPS).max(1.0);
        let step = 1.0 / fps;

        self.paused.store(false, Ordering::SeqCst);
        self.send_state(PlaybackState::Playing);

        let tx = self.status_tx.clone();
        let paused = Arc::clone(&self.paused);
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs_f64(step));
            loop {
                interval.tick().await;
                if paused.load(Ordering::SeqCst) {
                    continue;
                }
                let position = tx.borrow().position_sec + step;
                if position >= duration {
                    tx.send_replace(PreviewStatus::stopped());
                    break;
                }
                tx.send_replace(PreviewStatus {
                    state: PlaybackState::Playing,
                    position_sec: position,
                });
            }
        }));
        Ok(())
    }

    /// Freezes the playhead; `play` resumes from the same position.
    pub fn pause(&mut self) -> EditResult<()> {
        if self.handle.is_none() {
            return Err(EditError::NoVideoLoaded);
        }
        self.paused.store(true, Ordering::SeqCst);
        self.send_state(PlaybackState::Paused);
        Ok(())
    }

    /// Halts playback and rewinds to zero.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.paused.store(false, Ordering::SeqCst);
        self.status_tx.send_replace(PreviewStatus::stopped());
    }

    /// Moves the playhead. Positions at or past the clip's end are rejected
    /// rather than clamped.
    pub fn seek(&mut self, position_sec: f64) -> EditResult<()> {
        let handle = self.handle.as_ref().ok_or(EditError::NoVideoLoaded)?;
        if position_sec < 0.0 || position_sec >= handle.duration_sec() {
            return Err(EditError::ValidationError(format!(
                "Seek position {:.3}s is outside the video (duration {:.3}s)",
                position_sec,
                handle.duration_sec()
            )));
        }
        let state = self.status_tx.borrow().state;
        // send_replace updates the channel even when nobody subscribes yet;
        // `send` would drop the value and leave the playhead stale.
        self.status_tx.send_replace(PreviewStatus {
            state,
            position_sec,
        });
        Ok(())
    }

    /// Extracts the frame at `time_sec` as a PNG.
    pub async fn frame_at(&self, time_sec: f64, output: &Path) -> EditResult<()> {
        let handle = self.handle.as_ref().ok_or(EditError::NoVideoLoaded)?;
        if time_sec < 0.0 || time_sec >= handle.duration_sec() {
            return Err(EditError::ValidationError(format!(
                "Frame position {:.3}s is outside the video (duration {:.3}s)",
                time_sec,
                handle.duration_sec()
            )));
        }
        self.runner
            .extract_frame(&handle.path, time_sec, output)
            .await?;
        Ok(())
    }

    fn send_state(&self, state: PlaybackState) {
        let position_sec = self.status_tx.borrow().position_sec;
        self.status_tx.send_replace(PreviewStatus {
            state,
            position_sec,
        });
    }
}

impl Drop for PreviewDriver {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
