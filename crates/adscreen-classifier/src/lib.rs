//! OpenAI client for the AdScreen pipeline.
//!
//! Two adapters over the same HTTP client:
//! - Whisper audio transcription (best-effort from the caller's view)
//! - GPT-4o multimodal policy classification with a strict JSON-object
//!   output directive
//!
//! Classification returns the raw JSON value; schema validation happens at
//! the orchestrator boundary.

pub mod client;
pub mod error;
pub mod prompt;

pub use client::OpenAiClient;
pub use error::{ClassifierError, ClassifierResult};
pub use prompt::{build_user_prompt, SYSTEM_PROMPT};
