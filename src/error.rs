//! Error taxonomy for a build run

use crate::models::BuildStep;
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("[{step}] I/O error on {}: {source}", .path.display())]
    Io {
        step: BuildStep,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{step}] required input not found: {}", .path.display())]
    MissingInput { step: BuildStep, path: PathBuf },

    #[error("[{step}] failed to parse {}: {message}", .path.display())]
    ManifestParse {
        step: BuildStep,
        path: PathBuf,
        message: String,
    },

    #[error("[synthesize-manifest] synthesized manifest is invalid: {0}")]
    ManifestInvalid(String),

    #[error(
        "[{step}] rewrite rule '{rule}' did not match {}; the source no longer has the expected shape",
        .path.display()
    )]
    PatternMiss {
        step: BuildStep,
        path: PathBuf,
        rule: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("[{step}] failed to serialize {}: {source}", .path.display())]
    Serialize {
        step: BuildStep,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    pub fn io(step: BuildStep, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            step,
            path: path.into(),
            source,
        }
    }

    pub fn missing(step: BuildStep, path: impl Into<PathBuf>) -> Self {
        Self::MissingInput {
            step,
            path: path.into(),
        }
    }

    /// Step the error was raised in, if it belongs to one.
    pub fn step(&self) -> Option<BuildStep> {
        match self {
            Self::Io { step, .. }
            | Self::MissingInput { step, .. }
            | Self::ManifestParse { step, .. }
            | Self::PatternMiss { step, .. }
            | Self::Serialize { step, .. } => Some(*step),
            Self::ManifestInvalid(_) => Some(BuildStep::SynthesizeManifest),
            Self::Config(_) => None,
        }
    }
}

impl From<regex::Error> for BuildError {
    fn from(err: regex::Error) -> Self {
        Self::Config(format!("invalid pattern: {err}"))
    }
}
