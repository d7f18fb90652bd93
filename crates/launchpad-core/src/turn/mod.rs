//! One generation turn, end to end.
//!
//! - `engine`: request assembly and GenAI-instrumented provider calls
//! - `reader`: stream draining, running text, live preview
//! - `status`: caller-facing status transitions
//! - `orchestrator`: generate, finalize, deploy

pub mod engine;
pub mod orchestrator;
pub mod prompt;
pub mod reader;
pub mod status;

pub use engine::GenerationEngine;
pub use orchestrator::{TurnOrchestrator, TurnReport, follow_up_message};
pub use reader::{StreamEnd, StreamSummary, TokenStreamReader};
pub use status::StatusTracker;
