//! Chrome to Firefox Extension Build
//!
//! Builds a Firefox-loadable copy of a Chrome MV3 extension source tree.
//! Handles namespace rewriting, manifest synthesis, the
//! webextension-polyfill shim, and the text-to-speech substitution.

pub mod builder;
pub mod config;
pub mod error;
pub mod models;
pub mod packager;
pub mod parser;
pub mod report;
pub mod transformer;
pub mod validator;

#[cfg(feature = "cli")]
pub mod cli;

pub use builder::{BuildProgress, Builder, SilentProgress};
pub use config::{load_config, BuildConfig, MissPolicy};
pub use error::{BuildError, BuildResult};
pub use models::{BuildReport, BuildStep, FirefoxManifest, SourceManifest};

use std::path::Path;

/// Main entry point: build the Firefox tree for the extension at `source_root`
/// into the configured output directory.
pub fn build_extension(source_root: &Path, config: BuildConfig) -> BuildResult<BuildReport> {
    Builder::new(source_root, config)?.build()
}
