//! Manifest data structures for the Chrome source and the Firefox output

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chrome MV3 manifest as read from the source tree.
///
/// Fields the synthesizer carries over are kept as raw JSON values so they
/// reach the output exactly as written. Keys outside the known set land in
/// `extra` and are not carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_version: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_permissions: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_scripts: Vec<ContentScript>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_ui: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_accessible_resources: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Firefox MV3 manifest. Field order is the order written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirefoxManifest {
    pub manifest_version: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    pub browser_specific_settings: BrowserSpecificSettings,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,

    pub permissions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_permissions: Option<Value>,

    pub background: Background,

    pub content_scripts: Vec<ContentScript>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_ui: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_accessible_resources: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Background {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_worker: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<String>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentScript {
    pub matches: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub js: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub all_frames: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserSpecificSettings {
    pub gecko: GeckoSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeckoSettings {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_min_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_max_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_collection_permissions: Option<DataCollectionPermissions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCollectionPermissions {
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SourceManifest {
    /// Declared manifest version, accepting either integer or float spelling.
    pub fn declared_version(&self) -> Option<u64> {
        self.manifest_version.as_ref().and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as u64))
        })
    }
}

impl FirefoxManifest {
    /// Extension-relative paths of every file this manifest loads.
    pub fn referenced_files(&self) -> Vec<String> {
        let mut files = Vec::new();

        if let Some(scripts) = &self.background.scripts {
            files.extend(scripts.iter().cloned());
        }
        for content_script in &self.content_scripts {
            files.extend(content_script.js.iter().cloned());
            files.extend(content_script.css.iter().cloned());
        }
        if let Some(page) = string_at(&self.options_ui, "page") {
            files.push(page);
        }
        if let Some(popup) = string_at(&self.action, "default_popup") {
            files.push(popup);
        }

        let mut seen = std::collections::HashSet::new();
        files.retain(|f| seen.insert(f.clone()));
        files
    }
}

fn string_at(value: &Option<Value>, key: &str) -> Option<String> {
    value
        .as_ref()
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}
