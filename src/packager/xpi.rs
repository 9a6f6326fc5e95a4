//! Firefox XPI packaging of a built output tree

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Zip `source_dir` into `zip_path`. Entries are sorted and use `/` separators.
pub fn create_xpi(source_dir: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk output directory")?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let relative_path = path
            .strip_prefix(source_dir)
            .context("Failed to get relative path")?;
        let name = relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name, options)?;
        let content = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        zip.write_all(&content)?;
    }

    zip.finish()?;
    Ok(())
}
