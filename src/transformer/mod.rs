//! Text and manifest transformations from Chrome to Firefox

pub mod background;
pub mod content;
pub mod html;
pub mod manifest;
pub mod namespace;
pub mod rules;

pub use background::BackgroundAdapter;
pub use content::ContentAdapter;
pub use html::HtmlPatcher;
pub use manifest::ManifestSynthesizer;
pub use namespace::NamespaceRewriter;
pub use rules::{Adaptation, RewriteRule};

/// Quote `value` as a single-quoted JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
