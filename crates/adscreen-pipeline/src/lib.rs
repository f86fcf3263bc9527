//! Analysis orchestration.
//!
//! Sequences transcript acquisition, frame sourcing, classifier
//! invocation, result validation, and best-effort persistence for one
//! creative. The caller-facing unit of work: one invocation either returns
//! a fully validated result or an error, never a hybrid.

pub mod error;
pub mod orchestrator;
pub mod sources;
pub mod stage;
pub mod traits;

pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{AnalysisContext, AnalysisOrchestrator};
pub use sources::ProvidedFrames;
pub use stage::AnalysisStage;
pub use traits::{FrameSource, HistoryStore, PolicyClassifier, Transcriber};
