//! Validation module

pub mod structure;

use crate::config::BuildConfig;
use crate::models::FirefoxManifest;
use std::fs;
use std::path::Path;

/// Non-fatal post-build checks. Returns warnings for the build report.
pub fn validate_output(
    output_root: &Path,
    manifest: &FirefoxManifest,
    config: &BuildConfig,
) -> Vec<String> {
    let mut warnings = structure::validate_references(output_root, manifest);

    for page in &config.paths.markup_entry_points {
        if let Ok(markup) = fs::read_to_string(output_root.join(page)) {
            if let Some(problem) = structure::validate_markup_order(
                &markup,
                &config.paths.shim_destination,
                &config.paths.script_dir,
            ) {
                warnings.push(format!("{page}: {problem}"));
            }
        }
    }

    warnings
}
