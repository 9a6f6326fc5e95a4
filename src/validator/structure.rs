//! Structural checks on a finished output tree

use crate::models::FirefoxManifest;
use std::path::Path;

/// Every file the manifest references must exist in the output tree.
/// Returns one message per missing file.
pub fn validate_references(output_root: &Path, manifest: &FirefoxManifest) -> Vec<String> {
    manifest
        .referenced_files()
        .into_iter()
        .filter(|file| !output_root.join(file).is_file())
        .map(|file| format!("manifest references {file}, which is not in the output"))
        .collect()
}

/// Markup entry points should load the polyfill before anything else from the
/// script directory.
pub fn validate_markup_order(markup: &str, shim_path: &str, script_dir: &str) -> Option<String> {
    let first_script = markup.find(&format!(r#"src="{}/"#, script_dir.trim_end_matches('/')))?;
    match markup.find(&format!(r#"src="{shim_path}""#)) {
        Some(shim) if shim < first_script => None,
        Some(_) => Some(format!("{shim_path} is loaded after the first {script_dir}/ script")),
        None => Some(format!("{shim_path} is not referenced")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::parser::manifest::parse_manifest_from_str;
    use crate::transformer::ManifestSynthesizer;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_references_reported() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = ManifestSynthesizer::new(&BuildConfig::default()).synthesize(
            parse_manifest_from_str(
                r#"{ "name": "T", "version": "1", "options_ui": { "page": "options.html" } }"#,
            )
            .unwrap(),
        );
        fs::create_dir_all(temp_dir.path().join("js")).unwrap();
        fs::write(temp_dir.path().join("js/background.js"), "").unwrap();

        let problems = validate_references(temp_dir.path(), &manifest);

        assert!(problems.iter().any(|p| p.contains("lib/browser-polyfill.min.js")));
        assert!(problems.iter().any(|p| p.contains("options.html")));
        assert!(!problems.iter().any(|p| p.contains("js/background.js")));
    }

    #[test]
    fn test_markup_order() {
        let shim = "lib/browser-polyfill.min.js";
        let shim_tag = r#"<script src="lib/browser-polyfill.min.js"></script>"#;
        let script_tag = r#"<script src="js/a.js"></script>"#;
        let good = format!("{shim_tag}{script_tag}");
        let late = format!("{script_tag}{shim_tag}");

        assert_eq!(validate_markup_order(&good, shim, "js"), None);
        assert!(validate_markup_order(&late, shim, "js").is_some());
        assert_eq!(validate_markup_order("<p>no scripts</p>", shim, "js"), None);
    }
}
