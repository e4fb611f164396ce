//! Build orchestration: one-shot runs and the persistent watch loop.
//!
//! - [`orchestrator`] — mode selection, the one-shot pass, initial watch passes
//! - [`watch`] — the two independent watch subscriptions
//! - [`error`] — [`RunnerError`]

pub mod error;
pub mod orchestrator;
pub mod watch;

pub use error::RunnerError;
pub use orchestrator::{run_once, run_watch, start_blocking, BuildMode};
