//! # promptcut-core
//!
//! Core library for PromptCut, a prompt-driven video editor. Free-text
//! instructions are interpreted by an AI provider into a closed catalog of
//! edit operations, validated strictly against that catalog, and executed
//! through FFmpeg subprocesses. Every edit produces a new file; undo and redo
//! move a cursor over the resulting chain of immutable video states.
//!
//! ## Architecture
//!
//! - `registry`: the operation catalog (kinds, parameters, ranges)
//! - `descriptor`: typed operations, strict decoding and validation
//! - `interpreter`: prompt plus media context in, validated descriptor out
//! - `executor`: one FFmpeg invocation per operation via a pure planning step
//! - `history`: cursor-based undo/redo over video handles
//! - `session`: orchestrates the above around one loaded video
//! - `preview`: playhead state and on-demand frame extraction
//! - `ai`: provider abstraction (Gemini, OpenAI, Anthropic) and a mock

pub mod ai;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod ffmpeg;
pub mod handle;
pub mod history;
pub mod interpreter;
pub mod position;
pub mod preview;
pub mod registry;
pub mod session;
pub mod settings;

pub use descriptor::{Operation, OperationDescriptor};
pub use error::{EditError, EditResult, FailureClass};
pub use handle::VideoHandle;
pub use history::{EditHistory, HistoryEntry};
pub use registry::OperationKind;
pub use session::{EditOutcome, EditSession};
pub use settings::Settings;
