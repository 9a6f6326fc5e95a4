//! Inserts the polyfill `<script>` ahead of extension scripts in HTML pages

use crate::error::{BuildError, BuildResult};
use crate::models::BuildStep;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct HtmlPatcher {
    script_ref: Regex,
    duplicate_shim: Regex,
    shim_tag: String,
    script_prefix: String,
}

impl HtmlPatcher {
    /// `shim_path` is the extension-relative polyfill path, `script_dir` the
    /// directory whose script references get the polyfill in front of them.
    pub fn new(shim_path: &str, script_dir: &str) -> BuildResult<Self> {
        let script_dir = script_dir.trim_end_matches('/');
        let shim_tag = format!(r#"<script src="{shim_path}"></script>"#);

        Ok(Self {
            script_ref: Regex::new(&format!(
                r#"<script\s+src="{}/"#,
                regex::escape(script_dir)
            ))?,
            duplicate_shim: Regex::new(&format!(r"{}\s*", regex::escape(&shim_tag)))?,
            script_prefix: format!(r#"<script src="{script_dir}/"#),
            shim_tag,
        })
    }

    /// Insert then collapse, in that order: insertion is what creates the
    /// duplicates when a page has several script references.
    pub fn patch(&self, markup: &str) -> String {
        let inserted = self
            .script_ref
            .replace_all(
                markup,
                NoExpand(&format!("{}\n  {}", self.shim_tag, self.script_prefix)),
            )
            .into_owned();

        self.collapse_duplicates(&inserted)
    }

    /// Keep the first shim reference, drop every later one with its trailing whitespace.
    fn collapse_duplicates(&self, markup: &str) -> String {
        let Some(first) = markup.find(&self.shim_tag) else {
            return markup.to_string();
        };
        let (head, tail) = markup.split_at(first + self.shim_tag.len());
        format!("{head}{}", self.duplicate_shim.replace_all(tail, ""))
    }

    /// Patch an already-copied page in place.
    pub fn patch_file(&self, path: &Path) -> BuildResult<bool> {
        if !path.is_file() {
            return Err(BuildError::missing(BuildStep::PatchMarkup, path));
        }
        let markup = fs::read_to_string(path)
            .map_err(|e| BuildError::io(BuildStep::PatchMarkup, path, e))?;
        let patched = self.patch(&markup);
        let changed = patched != markup;
        if changed {
            fs::write(path, patched).map_err(|e| BuildError::io(BuildStep::PatchMarkup, path, e))?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_case::test_case;

    const SHIM: &str = r#"<script src="lib/browser-polyfill.min.js"></script>"#;

    fn patcher() -> HtmlPatcher {
        HtmlPatcher::new("lib/browser-polyfill.min.js", "js").unwrap()
    }

    fn page(scripts: usize) -> String {
        let tags: String = (0..scripts)
            .map(|i| format!("  <script src=\"js/part{i}.js\"></script>\n"))
            .collect();
        format!("<html>\n<body>\n  <div id=\"app\"></div>\n{tags}</body>\n</html>\n")
    }

    #[test_case(1 ; "single script")]
    #[test_case(3 ; "three scripts")]
    fn test_single_shim_before_first_script(scripts: usize) {
        let patched = patcher().patch(&page(scripts));

        assert_eq!(patched.matches(SHIM).count(), 1);
        let shim = patched.find(SHIM).unwrap();
        let first_script = patched.find(r#"<script src="js/part0.js""#).unwrap();
        assert!(shim < first_script);
        for i in 0..scripts {
            assert!(patched.contains(&format!(r#"<script src="js/part{i}.js"></script>"#)));
        }
    }

    #[test]
    fn test_exact_layout() {
        let input = "<body>\n  <script src=\"js/a.js\"></script>\n  <script src=\"js/b.js\"></script>\n</body>";
        let expected = "<body>\n  <script src=\"lib/browser-polyfill.min.js\"></script>\n  <script src=\"js/a.js\"></script>\n  <script src=\"js/b.js\"></script>\n</body>";
        assert_eq!(patcher().patch(input), expected);
    }

    #[test]
    fn test_other_scripts_untouched() {
        let input = "<script src=\"vendor/lib.js\"></script>\n<script>inline()</script>";
        assert_eq!(patcher().patch(input), input);
    }

    #[test]
    fn test_patching_twice_is_stable() {
        let once = patcher().patch(&page(2));
        let twice = patcher().patch(&once);
        assert_eq!(twice.matches(SHIM).count(), 1);
    }

    #[test]
    fn test_patch_file_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("popup.html");
        fs::write(&path, page(1)).unwrap();

        assert!(patcher().patch_file(&path).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains(SHIM));
    }

    #[test]
    fn test_patch_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = patcher().patch_file(&temp_dir.path().join("options.html")).unwrap_err();
        assert!(matches!(err, BuildError::MissingInput { step: BuildStep::PatchMarkup, .. }));
    }
}
