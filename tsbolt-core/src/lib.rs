//! tsbolt core library — configuration types, layered resolution, build plan.
//!
//! Public API surface:
//! - [`types`] — compiler/user configuration inputs and the [`types::BuildPlan`]
//! - [`resolver`] — layered precedence resolution into a build plan
//! - [`tsconfig`] — compiler-configuration locator/parser
//! - [`userconfig`] — user-configuration loader
//! - [`error`] — [`ConfigError`]

pub mod error;
pub mod resolver;
pub mod tsconfig;
pub mod types;
pub mod userconfig;

pub use error::ConfigError;
pub use types::{
    AssetOptions, AssetsConfig, BuildPlan, CodeBuildOptions, CompilerConfig, CompilerOptions,
    EsbuildConfig, SourceMapMode, UserConfig,
};
