//! Code-build engine seam and the esbuild CLI implementation.
//!
//! The orchestrator only knows the [`engine::BuildEngine`] trait; tests
//! substitute fake engines, production wires in [`esbuild::EsbuildCli`].

pub mod engine;
pub mod error;
pub mod esbuild;

pub use engine::{BuildEngine, IncrementalBuild};
pub use error::EngineError;
pub use esbuild::EsbuildCli;
