//! Byte-for-byte mirroring of static assets

use super::copy_file;
use crate::error::{BuildError, BuildResult};
use crate::models::BuildStep;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy `relative` (file or directory) from the source root into the output
/// root at the same relative location. Returns the relative paths of the
/// files copied.
pub fn mirror_path(
    source_root: &Path,
    output_root: &Path,
    relative: &str,
) -> BuildResult<Vec<PathBuf>> {
    let step = BuildStep::MirrorAssets;
    let src = source_root.join(relative);
    let dest = output_root.join(relative);

    if !src.exists() {
        return Err(BuildError::missing(step, src));
    }

    if src.is_file() {
        copy_file(step, &src, &dest)?;
        return Ok(vec![PathBuf::from(relative)]);
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(&src).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src.as_path()).to_path_buf();
            BuildError::io(step, path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(source_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        let target = output_root.join(&rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BuildError::io(step, &target, e))?;
        } else {
            copy_file(step, entry.path(), &target)?;
            copied.push(rel);
        }
    }

    Ok(copied)
}
