//! Output tree plumbing: cleaning, copying, script conversion and packaging

pub mod mirror;
pub mod scripts;
pub mod shim;
pub mod xpi;

pub use mirror::mirror_path;
pub use scripts::{ScriptTreeTransformer, ScriptTreeOutcome};
pub use shim::install_shim;
pub use xpi::create_xpi;

use crate::error::{BuildError, BuildResult};
use crate::models::BuildStep;
use std::fs;
use std::path::Path;

/// Remove and recreate the output directory.
pub fn clean_output(source_root: &Path, output_root: &Path) -> BuildResult<()> {
    let step = BuildStep::Clean;
    let source = source_root
        .canonicalize()
        .map_err(|e| BuildError::io(step, source_root, e))?;
    if let Ok(output) = output_root.canonicalize() {
        if source.starts_with(&output) {
            return Err(BuildError::Config(format!(
                "output directory {} contains the source tree",
                output_root.display()
            )));
        }
    }

    if output_root.exists() {
        fs::remove_dir_all(output_root).map_err(|e| BuildError::io(step, output_root, e))?;
    }
    fs::create_dir_all(output_root).map_err(|e| BuildError::io(step, output_root, e))
}

/// Copy one file, creating the destination's parent directories.
pub(crate) fn copy_file(step: BuildStep, from: &Path, to: &Path) -> BuildResult<()> {
    ensure_parent(step, to)?;
    fs::copy(from, to).map_err(|e| BuildError::io(step, from, e))?;
    Ok(())
}

pub(crate) fn write_file(step: BuildStep, to: &Path, content: &str) -> BuildResult<()> {
    ensure_parent(step, to)?;
    fs::write(to, content).map_err(|e| BuildError::io(step, to, e))
}

fn ensure_parent(step: BuildStep, path: &Path) -> BuildResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(step, parent, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("dist/firefox");
        fs::create_dir_all(output.join("js")).unwrap();
        fs::write(output.join("js/stale.js"), "old").unwrap();

        clean_output(temp_dir.path(), &output).unwrap();

        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_refuses_source_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("manifest.json"), "{}").unwrap();

        let err = clean_output(temp_dir.path(), temp_dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
        assert!(temp_dir.path().join("manifest.json").exists());
    }
}
