//! Copies declared script paths into the output, rewriting API namespaces

use super::{copy_file, write_file};
use crate::error::{BuildError, BuildResult};
use crate::models::BuildStep;
use crate::transformer::NamespaceRewriter;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const STEP: BuildStep = BuildStep::TransformScripts;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTreeOutcome {
    pub transformed: Vec<PathBuf>,
    pub passed_through: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub aliases_rewritten: usize,
}

impl ScriptTreeOutcome {
    fn merge(&mut self, other: ScriptTreeOutcome) {
        self.transformed.extend(other.transformed);
        self.passed_through.extend(other.passed_through);
        self.skipped.extend(other.skipped);
        self.aliases_rewritten += other.aliases_rewritten;
    }
}

pub struct ScriptTreeTransformer {
    rewriter: NamespaceRewriter,
    extension: String,
    passthrough_non_scripts: bool,
}

impl ScriptTreeTransformer {
    pub fn new(
        rewriter: NamespaceRewriter,
        extension: &str,
        passthrough_non_scripts: bool,
    ) -> Self {
        Self {
            rewriter,
            extension: extension.trim_start_matches('.').to_string(),
            passthrough_non_scripts,
        }
    }

    /// Transform a file, or every file under a directory, at `relative`.
    pub fn transform(
        &self,
        source_root: &Path,
        output_root: &Path,
        relative: &str,
    ) -> BuildResult<ScriptTreeOutcome> {
        let src = source_root.join(relative);
        if !src.exists() {
            return Err(BuildError::missing(STEP, src));
        }

        let mut outcome = ScriptTreeOutcome::default();
        for entry in WalkDir::new(&src).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(src.as_path()).to_path_buf();
                BuildError::io(STEP, path, e.into())
            })?;
            let rel = entry
                .path()
                .strip_prefix(source_root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());

            if entry.file_type().is_dir() {
                let target = output_root.join(&rel);
                fs::create_dir_all(&target).map_err(|e| BuildError::io(STEP, &target, e))?;
                continue;
            }
            outcome.merge(self.transform_file(entry.path(), &output_root.join(&rel), rel)?);
        }

        Ok(outcome)
    }

    fn transform_file(
        &self,
        src: &Path,
        dest: &Path,
        rel: PathBuf,
    ) -> BuildResult<ScriptTreeOutcome> {
        let mut outcome = ScriptTreeOutcome::default();

        if self.is_script(src) {
            let content = fs::read_to_string(src).map_err(|e| BuildError::io(STEP, src, e))?;
            let (rewritten, count) = self.rewriter.rewrite_counted(&content);
            write_file(STEP, dest, &rewritten)?;
            tracing::debug!(file = %rel.display(), aliases = count, "converted script");
            outcome.aliases_rewritten = count;
            outcome.transformed.push(rel);
        } else if self.passthrough_non_scripts {
            copy_file(STEP, src, dest)?;
            outcome.passed_through.push(rel);
        } else {
            tracing::debug!(file = %rel.display(), "skipped non-script file");
            outcome.skipped.push(rel);
        }

        Ok(outcome)
    }

    fn is_script(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamespaceConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn transformer(passthrough: bool) -> ScriptTreeTransformer {
        let rewriter = NamespaceRewriter::new(&NamespaceConfig::default().aliases).unwrap();
        ScriptTreeTransformer::new(rewriter, "js", passthrough)
    }

    fn source_tree() -> TempDir {
        let source = TempDir::new().unwrap();
        let js = source.path().join("js");
        fs::create_dir_all(js.join("core")).unwrap();
        fs::create_dir_all(js.join("services/providers")).unwrap();
        fs::write(js.join("popup.js"), "chrome.tabs.query({});").unwrap();
        fs::write(
            js.join("core/storage.js"),
            "export const get = () => chrome.storage.sync.get();",
        )
        .unwrap();
        fs::write(
            js.join("services/providers/openai.js"),
            "chrome.runtime.getURL('x'); // chrome://settings",
        )
        .unwrap();
        fs::write(js.join("services/providers/models.json"), r#"{"default":"gpt"}"#).unwrap();
        source
    }

    #[test]
    fn test_single_file() {
        let source = source_tree();
        let output = TempDir::new().unwrap();

        let outcome = transformer(true)
            .transform(source.path(), output.path(), "js/popup.js")
            .unwrap();

        assert_eq!(outcome.transformed, vec![PathBuf::from("js/popup.js")]);
        assert_eq!(
            fs::read_to_string(output.path().join("js/popup.js")).unwrap(),
            "browser.tabs.query({});"
        );
    }

    #[test]
    fn test_directory_recursion_preserves_structure() {
        let source = source_tree();
        let output = TempDir::new().unwrap();

        let outcome = transformer(true)
            .transform(source.path(), output.path(), "js/services")
            .unwrap();

        assert_eq!(outcome.transformed, vec![PathBuf::from("js/services/providers/openai.js")]);
        assert_eq!(outcome.aliases_rewritten, 1);
        assert_eq!(
            fs::read_to_string(output.path().join("js/services/providers/openai.js")).unwrap(),
            "browser.runtime.getURL('x'); // chrome://settings"
        );
    }

    #[test]
    fn test_non_script_passthrough() {
        let source = source_tree();
        let output = TempDir::new().unwrap();

        let outcome = transformer(true)
            .transform(source.path(), output.path(), "js/services")
            .unwrap();

        assert_eq!(
            outcome.passed_through,
            vec![PathBuf::from("js/services/providers/models.json")]
        );
        assert_eq!(
            fs::read(output.path().join("js/services/providers/models.json")).unwrap(),
            br#"{"default":"gpt"}"#
        );
    }

    #[test]
    fn test_non_script_dropped_when_disabled() {
        let source = source_tree();
        let output = TempDir::new().unwrap();

        let outcome = transformer(false)
            .transform(source.path(), output.path(), "js/services")
            .unwrap();

        assert_eq!(outcome.skipped, vec![PathBuf::from("js/services/providers/models.json")]);
        assert!(!output.path().join("js/services/providers/models.json").exists());
    }

    #[test]
    fn test_missing_script_path_is_fatal() {
        let source = source_tree();
        let output = TempDir::new().unwrap();

        let err = transformer(true)
            .transform(source.path(), output.path(), "js/options.js")
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::MissingInput { step: BuildStep::TransformScripts, .. }
        ));
    }
}
