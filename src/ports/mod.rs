//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the generation pipelines and an
//! external system (time, filesystem, hosted model). Implementations live in
//! `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod llm;

pub use clock::{Clock, SleepFuture};
pub use filesystem::FileSystem;
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};
