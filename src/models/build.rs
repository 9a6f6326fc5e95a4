//! Build steps and the report a build run produces

use std::fmt;
use std::path::PathBuf;

/// The fixed sequence of steps a build runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStep {
    Clean,
    MirrorAssets,
    TransformScripts,
    InstallShim,
    SynthesizeManifest,
    AdaptBackground,
    AdaptContent,
    PatchMarkup,
}

impl BuildStep {
    pub const ALL: [BuildStep; 8] = [
        BuildStep::Clean,
        BuildStep::MirrorAssets,
        BuildStep::TransformScripts,
        BuildStep::InstallShim,
        BuildStep::SynthesizeManifest,
        BuildStep::AdaptBackground,
        BuildStep::AdaptContent,
        BuildStep::PatchMarkup,
    ];

    /// 1-based position in the sequence.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildStep::Clean => "clean",
            BuildStep::MirrorAssets => "mirror-assets",
            BuildStep::TransformScripts => "transform-scripts",
            BuildStep::InstallShim => "install-shim",
            BuildStep::SynthesizeManifest => "synthesize-manifest",
            BuildStep::AdaptBackground => "adapt-background",
            BuildStep::AdaptContent => "adapt-content",
            BuildStep::PatchMarkup => "patch-markup",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BuildStep::Clean => "Cleaning output directory",
            BuildStep::MirrorAssets => "Copying static assets",
            BuildStep::TransformScripts => "Copying and converting scripts",
            BuildStep::InstallShim => "Installing webextension-polyfill",
            BuildStep::SynthesizeManifest => "Generating Firefox manifest.json",
            BuildStep::AdaptBackground => "Adapting background script",
            BuildStep::AdaptContent => "Adapting content script",
            BuildStep::PatchMarkup => "Patching HTML entry points",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one capability-substitution rule on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRecord {
    pub file: PathBuf,
    pub rule: String,
    pub applied: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub extension_name: String,
    pub extension_version: String,
    pub output_dir: PathBuf,
    pub completed_steps: Vec<BuildStep>,
    pub assets_mirrored: Vec<PathBuf>,
    pub scripts_transformed: Vec<PathBuf>,
    pub files_passed_through: Vec<PathBuf>,
    pub api_aliases_rewritten: usize,
    pub substitutions: Vec<SubstitutionRecord>,
    pub markup_patched: Vec<PathBuf>,
    pub dropped_manifest_keys: Vec<String>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn missed_substitutions(&self) -> impl Iterator<Item = &SubstitutionRecord> {
        self.substitutions.iter().filter(|s| !s.applied)
    }

    pub fn is_complete(&self) -> bool {
        self.completed_steps.len() == BuildStep::ALL.len()
    }
}
