//! Source manifest parsing

use crate::error::{BuildError, BuildResult};
use crate::models::{BuildStep, SourceManifest};
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Parse manifest.json from bytes. `origin` only labels errors.
pub fn parse_manifest(content: &[u8], origin: &Path) -> BuildResult<SourceManifest> {
    let parse_error = |message: String| BuildError::ManifestParse {
        step: BuildStep::SynthesizeManifest,
        path: origin.to_path_buf(),
        message,
    };

    let content_str = std::str::from_utf8(content)
        .map_err(|e| parse_error(format!("invalid UTF-8: {e}")))?;

    // json5 accepts comments and trailing commas, which hand-edited manifests tend to have
    let manifest: SourceManifest =
        json5::from_str(content_str).map_err(|e| parse_error(e.to_string()))?;

    if let Some(version) = manifest.declared_version() {
        if version != 2 && version != 3 {
            return Err(parse_error(format!("unsupported manifest version: {version}")));
        }
    }

    Ok(manifest)
}

/// Read and parse `manifest.json` from a source root.
pub fn parse_manifest_from_dir(source_root: &Path) -> BuildResult<SourceManifest> {
    let path = source_root.join(MANIFEST_FILE_NAME);
    if !path.is_file() {
        return Err(BuildError::missing(BuildStep::SynthesizeManifest, path));
    }
    let content =
        fs::read(&path).map_err(|e| BuildError::io(BuildStep::SynthesizeManifest, &path, e))?;
    parse_manifest(&content, &path)
}

/// Parse manifest.json from string
pub fn parse_manifest_from_str(content: &str) -> BuildResult<SourceManifest> {
    parse_manifest(content.as_bytes(), Path::new(MANIFEST_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_manifest() {
        let json = r#"{
            "manifest_version": 3,
            "name": "VocabMeld",
            "version": "1.2.0"
        }"#;

        let manifest = parse_manifest_from_str(json).unwrap();
        assert_eq!(manifest.declared_version(), Some(3));
        assert_eq!(manifest.name.as_deref(), Some("VocabMeld"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_parse_with_background() {
        let json = r#"{
            "manifest_version": 3,
            "name": "Test",
            "version": "1.0",
            "permissions": ["storage", "tts"],
            "background": {
                "service_worker": "js/background.js",
                "type": "module"
            }
        }"#;

        let manifest = parse_manifest_from_str(json).unwrap();
        let background = manifest.background.unwrap();
        assert_eq!(background.service_worker.as_deref(), Some("js/background.js"));
        assert_eq!(background.type_.as_deref(), Some("module"));
        assert_eq!(manifest.permissions, vec!["storage", "tts"]);
    }

    #[test]
    fn test_parse_with_comments() {
        let json = r#"{
            // This is a comment
            "manifest_version": 3,
            "name": "Test Extension", // inline comment
            /* Block comment */
            "version": "1.0.0",
        }"#;

        let manifest = parse_manifest_from_str(json).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("Test Extension"));
    }

    #[test]
    fn test_unknown_keys_collected() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "minimum_chrome_version": "110"
        }"#;

        let manifest = parse_manifest_from_str(json).unwrap();
        assert!(manifest.extra.contains_key("minimum_chrome_version"));
    }

    #[test]
    fn test_malformed_manifest_is_fatal() {
        let err = parse_manifest_from_str(r#"{ "name": "Broken", "version": "#).unwrap_err();
        assert!(matches!(err, BuildError::ManifestParse { .. }));
        assert!(err.to_string().contains("manifest.json"));
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let err = parse_manifest_from_str(r#"{ "version": "1.0" }"#).unwrap_err();
        assert!(matches!(err, BuildError::ManifestParse { .. }));
    }

    #[test]
    fn test_missing_manifest_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = parse_manifest_from_dir(temp_dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::MissingInput { .. }));
    }
}
