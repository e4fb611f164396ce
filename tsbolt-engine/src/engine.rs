//! The build-engine seam.
//!
//! The core never performs code emission itself; it drives an engine through
//! these two traits. [`BuildEngine::build`] performs a cold build and hands
//! back a handle; watch mode keeps that handle alive and calls
//! [`IncrementalBuild::rebuild`] on every code change.

use tsbolt_core::types::CodeBuildOptions;

use crate::error::EngineError;

/// A code-build engine capable of one cold build per invocation.
#[allow(async_fn_in_trait)]
pub trait BuildEngine {
    type Build: IncrementalBuild;

    /// Run one cold build and return a persistent rebuild handle.
    async fn build(&self, options: &CodeBuildOptions) -> Result<Self::Build, EngineError>;
}

/// A persistent build session supporting repeated rebuilds.
///
/// Incremental semantics (what state is reused, how much faster a rebuild
/// is) are owned by the engine, not by the orchestrator.
#[allow(async_fn_in_trait)]
pub trait IncrementalBuild {
    async fn rebuild(&mut self) -> Result<(), EngineError>;
}
