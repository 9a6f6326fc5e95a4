//! Named, pattern-described rewrite rules
//!
//! A rule either replaces a delimited block wholesale or inserts a fragment
//! right after an anchor. Rules fire at most once per text and report whether
//! they matched, so a source that drifted from the expected shape is visible
//! to the caller instead of passing through unnoticed.

use regex::Regex;

#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Replace the whole matched span.
    ReplaceBlock(String),
    /// Keep the matched span and append the fragment after it.
    InsertAfter(String),
}

#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    /// Tried in order; the first pattern that matches wins.
    patterns: Vec<Regex>,
    action: RuleAction,
}

impl RewriteRule {
    /// Block running from `start` through the nearest following `end`.
    /// Both are regex fragments; the span between them is matched lazily.
    pub fn delimited(
        name: impl Into<String>,
        start: &str,
        end: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?:{start})[\s\S]*?(?:{end})"))?;
        Ok(Self {
            name: name.into(),
            patterns: vec![pattern],
            action: RuleAction::ReplaceBlock(replacement.into()),
        })
    }

    pub fn insert_after(
        name: impl Into<String>,
        anchors: Vec<Regex>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            patterns: anchors,
            action: RuleAction::InsertAfter(fragment.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the rule to `text`. Returns `None` when no pattern matched.
    pub fn apply(&self, text: &str) -> Option<String> {
        let found = self.patterns.iter().find_map(|p| p.find(text))?;

        let mut output = String::with_capacity(text.len() + 512);
        output.push_str(&text[..found.start()]);
        match &self.action {
            RuleAction::ReplaceBlock(replacement) => output.push_str(replacement),
            RuleAction::InsertAfter(fragment) => {
                output.push_str(found.as_str());
                output.push_str(fragment);
            }
        }
        output.push_str(&text[found.end()..]);

        Some(output)
    }

    /// Number of places the first matching pattern would fire.
    pub fn match_count(&self, text: &str) -> usize {
        self.patterns
            .iter()
            .map(|p| p.find_iter(text).count())
            .find(|count| *count > 0)
            .unwrap_or(0)
    }
}

/// Result of adapting one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adaptation {
    pub text: String,
    pub aliases_rewritten: usize,
    pub applied: Vec<String>,
    pub missed: Vec<String>,
}

impl Adaptation {
    pub fn new(text: String, aliases_rewritten: usize) -> Self {
        Self {
            text,
            aliases_rewritten,
            ..Self::default()
        }
    }

    /// Run `rule` over the current text, recording the outcome.
    pub fn apply(&mut self, rule: &RewriteRule) {
        match rule.apply(&self.text) {
            Some(text) => {
                if rule.match_count(&self.text) > 1 {
                    tracing::warn!(
                        rule = rule.name(),
                        "rule matched more than once; only the first occurrence was rewritten"
                    );
                }
                self.text = text;
                self.applied.push(rule.name().to_string());
            }
            None => self.missed.push(rule.name().to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missed.is_empty()
    }
}
