//! Build configuration
//!
//! Every table the build consults (asset lists, namespace aliases, the fixed
//! Firefox permission list, speech parameters) lives here and is handed to
//! components at construction. Defaults describe the VocabMeld source layout;
//! a `firefox-port.toml` next to the source manifest overrides any of it.

use crate::error::{BuildError, BuildResult};
use crate::parser::MANIFEST_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "firefox-port.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub paths: PathsConfig,
    pub namespace: NamespaceConfig,
    pub manifest: ManifestConfig,
    pub speech: SpeechConfig,
    pub on_pattern_miss: MissPolicy,
    /// Copy non-script files found under script paths instead of dropping them.
    pub passthrough_non_scripts: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            namespace: NamespaceConfig::default(),
            manifest: ManifestConfig::default(),
            speech: SpeechConfig::default(),
            on_pattern_miss: MissPolicy::Fail,
            passthrough_non_scripts: true,
        }
    }
}

/// What to do when a capability-substitution rule finds nothing to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    Fail,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Output directory, relative to the source root unless absolute.
    pub output_dir: PathBuf,
    pub static_assets: Vec<String>,
    pub script_paths: Vec<String>,
    pub script_extension: String,
    /// Directory prefix of `<script src=...>` references patched in markup.
    pub script_dir: String,
    pub background_script: String,
    pub content_script: String,
    pub content_stylesheet: String,
    pub markup_entry_points: Vec<String>,
    pub shim_source: String,
    pub shim_destination: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist/firefox"),
            static_assets: strings(&["popup.html", "options.html", "css", "icons", "_locales"]),
            script_paths: strings(&["js/popup.js", "js/options.js", "js/core", "js/services"]),
            script_extension: "js".to_string(),
            script_dir: "js".to_string(),
            background_script: "js/background.js".to_string(),
            content_script: "js/content.js".to_string(),
            content_stylesheet: "css/content.css".to_string(),
            markup_entry_points: strings(&["popup.html", "options.html"]),
            shim_source: "node_modules/webextension-polyfill/dist/browser-polyfill.min.js"
                .to_string(),
            shim_destination: "lib/browser-polyfill.min.js".to_string(),
        }
    }
}

/// A dotted API path and its replacement, e.g. `chrome.storage` -> `browser.storage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAlias {
    pub from: String,
    pub to: String,
}

impl ApiAlias {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub aliases: Vec<ApiAlias>,
    /// Applied to the background script only, after `aliases`.
    pub menu_aliases: Vec<ApiAlias>,
}

impl NamespaceConfig {
    pub const SOURCE: &'static str = "chrome";
    pub const TARGET: &'static str = "browser";
    pub const MEMBERS: [&'static str; 6] =
        ["storage", "runtime", "tabs", "commands", "action", "scripting"];
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        let aliases = Self::MEMBERS
            .iter()
            .map(|member| {
                ApiAlias::new(
                    format!("{}.{member}", Self::SOURCE),
                    format!("{}.{member}", Self::TARGET),
                )
            })
            .collect();

        Self {
            aliases,
            menu_aliases: vec![
                ApiAlias::new("chrome.contextMenus", "browser.menus"),
                ApiAlias::new("browser.contextMenus", "browser.menus"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub permissions: Vec<String>,
    pub gecko_id: String,
    pub strict_min_version: Option<String>,
    pub strict_max_version: Option<String>,
    pub data_collection_required: Vec<String>,
    pub data_collection_optional: Vec<String>,
    pub content_matches: Vec<String>,
    pub content_run_at: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            permissions: strings(&["storage", "activeTab", "scripting", "menus"]),
            gecko_id: "vocabmeld@vocabmeld.com".to_string(),
            strict_min_version: Some("140.0".to_string()),
            strict_max_version: None,
            data_collection_required: strings(&["none"]),
            data_collection_optional: Vec::new(),
            content_matches: strings(&["<all_urls>"]),
            content_run_at: "document_idle".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Comment line that opens the native speech handler in the background script.
    pub marker: String,
    pub speak_action: String,
    pub in_page_action: String,
    pub default_lang: String,
    pub rate: f64,
    pub log_tag: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            marker: "// 语音合成".to_string(),
            speak_action: "speak".to_string(),
            in_page_action: "speakInPage".to_string(),
            default_lang: "en-US".to_string(),
            rate: 0.9,
            log_tag: "[VocabMeld]".to_string(),
        }
    }
}

impl BuildConfig {
    /// Resolve the config for a source root: an explicit file must exist,
    /// otherwise `firefox-port.toml` in the root is used when present.
    pub fn resolve(source_root: &Path, explicit: Option<&Path>) -> BuildResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(BuildError::Config(format!(
                "config file {} does not exist",
                path.display()
            ))),
            Some(path) => load_config(path),
            None => load_config(&source_root.join(CONFIG_FILE_NAME)),
        }
    }

    /// Output directory resolved against the source root.
    pub fn output_dir(&self, source_root: &Path) -> PathBuf {
        if self.paths.output_dir.is_absolute() {
            self.paths.output_dir.clone()
        } else {
            source_root.join(&self.paths.output_dir)
        }
    }

    /// Source-relative paths the build reads from.
    pub fn declared_inputs(&self) -> Vec<&str> {
        let paths = &self.paths;
        let mut inputs = vec![
            MANIFEST_FILE_NAME,
            paths.shim_source.as_str(),
            paths.background_script.as_str(),
            paths.content_script.as_str(),
            paths.content_stylesheet.as_str(),
        ];
        inputs.extend(paths.static_assets.iter().map(String::as_str));
        inputs.extend(paths.script_paths.iter().map(String::as_str));
        inputs.extend(paths.markup_entry_points.iter().map(String::as_str));
        inputs
    }

    /// The output directory is wiped on every build and written while inputs
    /// are walked, so it may neither hold nor sit inside a declared input.
    pub fn check_output_root(&self, source_root: &Path, output_root: &Path) -> BuildResult<()> {
        let output = normalize(output_root)?;
        for input in self.declared_inputs() {
            let input_path = normalize(&source_root.join(input))?;
            if output.starts_with(&input_path) || input_path.starts_with(&output) {
                return Err(BuildError::Config(format!(
                    "output directory {} overlaps source input {input}",
                    output_root.display()
                )));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> BuildResult<()> {
        for alias in self.namespace.aliases.iter().chain(&self.namespace.menu_aliases) {
            let qualified = alias
                .from
                .split_once('.')
                .is_some_and(|(ns, member)| !ns.is_empty() && !member.is_empty());
            if !qualified {
                return Err(BuildError::Config(format!(
                    "alias '{}' must name a namespace member (namespace.member)",
                    alias.from
                )));
            }
        }

        if self.paths.script_extension.is_empty() {
            return Err(BuildError::Config("script_extension must not be empty".into()));
        }
        if self.paths.shim_destination.is_empty() {
            return Err(BuildError::Config("shim_destination must not be empty".into()));
        }
        if !(self.speech.rate > 0.0) {
            return Err(BuildError::Config(format!(
                "speech rate must be positive, got {}",
                self.speech.rate
            )));
        }
        if self.speech.marker.trim().is_empty() {
            return Err(BuildError::Config("speech marker must not be empty".into()));
        }

        Ok(())
    }
}

/// Load a `BuildConfig` from a TOML file. Returns defaults if the file doesn't exist.
pub fn load_config(config_path: &Path) -> BuildResult<BuildConfig> {
    if !config_path.exists() {
        return Ok(BuildConfig::default());
    }
    let content = fs::read_to_string(config_path).map_err(|e| {
        BuildError::Config(format!("failed to read {}: {e}", config_path.display()))
    })?;
    toml::from_str(&content).map_err(|e| {
        BuildError::Config(format!("failed to parse {}: {e}", config_path.display()))
    })
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
fn normalize(path: &Path) -> BuildResult<PathBuf> {
    let absolute = std::path::absolute(path)
        .map_err(|e| BuildError::Config(format!("cannot resolve {}: {e}", path.display())))?;

    let mut normal = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }
    Ok(normal)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
