//! Word-boundary namespace rewriting (`chrome.storage` -> `browser.storage`)
//!
//! Purely textual: no parsing, so scoping and computed member names are out of
//! reach. Each alias matches only `namespace.member` with word boundaries on
//! both ends, which keeps `chrome://` URLs and identifiers such as
//! `mychrome.storage` or `chrome.storageArea` untouched.

use crate::config::ApiAlias;
use crate::error::{BuildError, BuildResult};
use regex::{NoExpand, Regex};

#[derive(Debug, Clone)]
struct CompiledAlias {
    pattern: Regex,
    replacement: String,
}

#[derive(Debug, Clone)]
pub struct NamespaceRewriter {
    aliases: Vec<CompiledAlias>,
}

impl NamespaceRewriter {
    pub fn new(aliases: &[ApiAlias]) -> BuildResult<Self> {
        let aliases = aliases
            .iter()
            .map(|alias| {
                if !alias.from.contains('.') {
                    return Err(BuildError::Config(format!(
                        "alias '{}' would match the bare namespace",
                        alias.from
                    )));
                }
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&alias.from)))?;
                Ok(CompiledAlias {
                    pattern,
                    replacement: alias.to.clone(),
                })
            })
            .collect::<BuildResult<Vec<_>>>()?;

        Ok(Self { aliases })
    }

    pub fn rewrite(&self, source: &str) -> String {
        self.rewrite_counted(source).0
    }

    /// Rewrite and report how many occurrences were replaced.
    pub fn rewrite_counted(&self, source: &str) -> (String, usize) {
        let mut text = source.to_string();
        let mut count = 0;

        for alias in &self.aliases {
            let hits = alias.pattern.find_iter(&text).count();
            if hits == 0 {
                continue;
            }
            count += hits;
            text = alias
                .pattern
                .replace_all(&text, NoExpand(&alias.replacement))
                .into_owned();
        }

        (text, count)
    }
}
