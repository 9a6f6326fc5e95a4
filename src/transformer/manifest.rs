//! Firefox manifest synthesis

use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::models::{
    Background, BrowserSpecificSettings, ContentScript, DataCollectionPermissions,
    FirefoxManifest, GeckoSettings, SourceManifest,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Firefox email-style add-on id: [a-zA-Z0-9-._]*@[a-zA-Z0-9-._]+
    static ref GECKO_ID_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9\-._]*@[a-zA-Z0-9\-._]+$").unwrap();
}

pub const FIREFOX_MANIFEST_VERSION: u8 = 3;

pub struct ManifestSynthesizer {
    config: BuildConfig,
}

impl ManifestSynthesizer {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Build the Firefox manifest. Identity and UI fields move over untouched;
    /// permissions, background, content scripts and gecko settings come from
    /// configuration.
    pub fn synthesize(&self, source: SourceManifest) -> FirefoxManifest {
        FirefoxManifest {
            manifest_version: FIREFOX_MANIFEST_VERSION,
            name: source.name,
            description: source.description,
            version: source.version,
            default_locale: source.default_locale,
            browser_specific_settings: self.browser_specific_settings(),
            icons: source.icons,
            action: source.action,
            permissions: self.config.manifest.permissions.clone(),
            host_permissions: source.host_permissions,
            background: self.background(),
            content_scripts: vec![self.content_script()],
            options_ui: source.options_ui,
            commands: source.commands,
            web_accessible_resources: source.web_accessible_resources,
        }
    }

    fn browser_specific_settings(&self) -> BrowserSpecificSettings {
        let manifest = &self.config.manifest;
        let data_collection_permissions = if manifest.data_collection_required.is_empty()
            && manifest.data_collection_optional.is_empty()
        {
            None
        } else {
            Some(DataCollectionPermissions {
                required: manifest.data_collection_required.clone(),
                optional: manifest.data_collection_optional.clone(),
            })
        };

        BrowserSpecificSettings {
            gecko: GeckoSettings {
                id: manifest.gecko_id.clone(),
                strict_min_version: manifest.strict_min_version.clone(),
                strict_max_version: manifest.strict_max_version.clone(),
                data_collection_permissions,
            },
        }
    }

    /// Firefox loads background scripts as an ordered list; the polyfill goes first.
    fn background(&self) -> Background {
        let paths = &self.config.paths;
        Background {
            scripts: Some(vec![
                paths.shim_destination.clone(),
                paths.background_script.clone(),
            ]),
            ..Background::default()
        }
    }

    fn content_script(&self) -> ContentScript {
        let paths = &self.config.paths;
        ContentScript {
            matches: self.config.manifest.content_matches.clone(),
            js: vec![paths.shim_destination.clone(), paths.content_script.clone()],
            css: vec![paths.content_stylesheet.clone()],
            run_at: Some(self.config.manifest.content_run_at.clone()),
            all_frames: false,
        }
    }
}

/// Reject manifests Firefox would refuse to load.
pub fn validate_manifest(manifest: &FirefoxManifest) -> BuildResult<()> {
    let id = &manifest.browser_specific_settings.gecko.id;
    if !GECKO_ID_PATTERN.is_match(id) {
        return Err(BuildError::ManifestInvalid(format!(
            "gecko id '{id}' is not an email-style add-on id"
        )));
    }
    if manifest.background.scripts.as_ref().map_or(true, Vec::is_empty) {
        return Err(BuildError::ManifestInvalid("background.scripts is empty".into()));
    }
    Ok(())
}

/// Source manifest keys that do not reach the Firefox manifest.
pub fn dropped_keys(source: &SourceManifest) -> Vec<String> {
    let mut dropped: Vec<String> = source.extra.keys().cloned().collect();
    if source.background.as_ref().is_some_and(|b| b.service_worker.is_some()) {
        dropped.push("background.service_worker".to_string());
    }
    dropped
}
