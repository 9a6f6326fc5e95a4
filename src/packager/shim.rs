//! Installs the prebuilt webextension-polyfill, unmodified

use super::copy_file;
use crate::error::{BuildError, BuildResult};
use crate::models::BuildStep;
use std::path::{Path, PathBuf};

/// Copy the shim from `shim_source` (relative to the source root, or
/// absolute) to `destination` inside the output root.
pub fn install_shim(
    source_root: &Path,
    output_root: &Path,
    shim_source: &str,
    destination: &str,
) -> BuildResult<PathBuf> {
    let step = BuildStep::InstallShim;
    let src = source_root.join(shim_source);
    if !src.is_file() {
        return Err(BuildError::missing(step, src));
    }

    let dest = output_root.join(destination);
    copy_file(step, &src, &dest)?;
    tracing::debug!(from = %src.display(), to = %dest.display(), "installed shim");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SHIM_SOURCE: &str = "node_modules/webextension-polyfill/dist/browser-polyfill.min.js";

    #[test]
    fn test_shim_copied_verbatim() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let shim = source.path().join(SHIM_SOURCE);
        fs::create_dir_all(shim.parent().unwrap()).unwrap();
        // chrome.* inside the shim must survive untouched
        fs::write(&shim, "(function(){if(chrome.runtime){}})();").unwrap();

        let dest = install_shim(
            source.path(),
            output.path(),
            SHIM_SOURCE,
            "lib/browser-polyfill.min.js",
        )
        .unwrap();

        assert_eq!(dest, output.path().join("lib/browser-polyfill.min.js"));
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&shim).unwrap());
    }

    #[test]
    fn test_missing_shim_is_fatal() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let err = install_shim(
            source.path(),
            output.path(),
            SHIM_SOURCE,
            "lib/browser-polyfill.min.js",
        )
        .unwrap_err();
        assert_eq!(err.step(), Some(BuildStep::InstallShim));
        assert!(err.to_string().contains("browser-polyfill.min.js"));
    }
}
