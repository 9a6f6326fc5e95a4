//! Report generation

use crate::models::BuildReport;

pub fn generate_markdown_report(report: &BuildReport) -> String {
    let mut out = String::new();

    out.push_str("# Firefox Build Report\n\n");

    // Summary
    out.push_str("## Summary\n\n");
    out.push_str(&format!(
        "- **Extension**: {} v{}\n",
        report.extension_name, report.extension_version
    ));
    out.push_str(&format!("- **Output**: {}\n", report.output_dir.display()));
    out.push_str(&format!(
        "- **Build Status**: {}\n",
        if report.is_complete() { "✅ Complete" } else { "❌ Incomplete" }
    ));
    out.push_str(&format!("- **Assets Mirrored**: {}\n", report.assets_mirrored.len()));
    out.push_str(&format!("- **Scripts Converted**: {}\n", report.scripts_transformed.len()));
    out.push_str(&format!("- **Files Passed Through**: {}\n", report.files_passed_through.len()));
    out.push_str(&format!("- **API Calls Rewritten**: {}\n", report.api_aliases_rewritten));
    out.push_str(&format!("- **Pages Patched**: {}\n\n", report.markup_patched.len()));

    // Capability substitutions
    if !report.substitutions.is_empty() {
        out.push_str("## Capability Substitutions\n\n");
        for record in &report.substitutions {
            let status = if record.applied { "applied" } else { "**missed**" };
            out.push_str(&format!(
                "- `{}` on {}: {}\n",
                record.rule,
                record.file.display(),
                status
            ));
        }
        out.push('\n');
    }

    // Converted scripts
    if !report.scripts_transformed.is_empty() {
        out.push_str("## Converted Scripts\n\n");
        for path in &report.scripts_transformed {
            out.push_str(&format!("- {}\n", path.display()));
        }
        out.push('\n');
    }

    if !report.dropped_manifest_keys.is_empty() {
        out.push_str("## Manifest Keys Not Carried Over\n\n");
        for key in &report.dropped_manifest_keys {
            out.push_str(&format!("- `{key}`\n"));
        }
        out.push('\n');
    }

    // Warnings
    if !report.warnings.is_empty() {
        out.push_str("## ℹ️ Warnings\n\n");
        for warning in &report.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildStep, SubstitutionRecord};
    use std::path::PathBuf;

    #[test]
    fn test_report_lists_missed_substitution() {
        let report = BuildReport {
            extension_name: "VocabMeld".to_string(),
            extension_version: "1.4.2".to_string(),
            completed_steps: BuildStep::ALL.to_vec(),
            substitutions: vec![SubstitutionRecord {
                file: PathBuf::from("js/content.js"),
                rule: "speak-in-page-receiver".to_string(),
                applied: false,
            }],
            warnings: vec!["rule missed".to_string()],
            ..BuildReport::default()
        };

        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("VocabMeld v1.4.2"));
        assert!(markdown.contains("✅ Complete"));
        assert!(markdown.contains("`speak-in-page-receiver` on js/content.js: **missed**"));
        assert!(markdown.contains("- rule missed"));
    }
}
