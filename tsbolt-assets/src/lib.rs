//! Asset-copy services: glob matching, recursive copy, output clearing.

pub mod copy;
pub mod error;
pub mod output;

pub use copy::{copy_assets, AssetMatcher, CopyStats};
pub use error::AssetError;
pub use output::clear_output;
