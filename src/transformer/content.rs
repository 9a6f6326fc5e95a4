//! Content script adaptation: the in-page receiver for forwarded speak requests

use super::js_string;
use super::namespace::NamespaceRewriter;
use super::rules::{Adaptation, RewriteRule};
use crate::config::{BuildConfig, NamespaceConfig};
use crate::error::BuildResult;
use regex::Regex;

pub const SPEAK_RECEIVER_RULE: &str = "speak-in-page-receiver";

#[derive(Debug, Clone)]
pub struct ContentAdapter {
    namespace: NamespaceRewriter,
    receiver: RewriteRule,
}

impl ContentAdapter {
    pub fn new(config: &BuildConfig) -> BuildResult<Self> {
        let source_runtime = format!("{}.runtime", NamespaceConfig::SOURCE);
        let target_runtime = config
            .namespace
            .aliases
            .iter()
            .find(|a| a.from == source_runtime)
            .map_or_else(|| source_runtime.clone(), |a| a.to.clone());

        // rewritten spelling first, original spelling as fallback
        let anchors = [target_runtime.as_str(), source_runtime.as_str()]
            .iter()
            .map(|runtime| Regex::new(&listener_anchor(runtime)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            namespace: NamespaceRewriter::new(&config.namespace.aliases)?,
            receiver: RewriteRule::insert_after(
                SPEAK_RECEIVER_RULE,
                anchors,
                receiver_fragment(config),
            ),
        })
    }

    pub fn adapt(&self, source: &str) -> Adaptation {
        let (text, count) = self.namespace.rewrite_counted(source);
        let mut adaptation = Adaptation::new(text, count);
        adaptation.apply(&self.receiver);
        adaptation
    }
}

/// Opening of `<runtime>.onMessage.addListener((message, sender, sendResponse) => {`,
/// with `async`, `sender` and `sendResponse` optional.
fn listener_anchor(runtime: &str) -> String {
    format!(
        r"{}\.onMessage\.addListener\s*\(\s*(?:async\s*)?\(\s*message(?:\s*,\s*sender)?(?:\s*,\s*sendResponse)?\s*\)\s*=>\s*\{{",
        regex::escape(runtime)
    )
}

fn receiver_fragment(config: &BuildConfig) -> String {
    let speech = &config.speech;
    format!(
        r#"
  // Firefox: speak requests forwarded by the background script
  if (message.action === {in_page}) {{
    if ('speechSynthesis' in window) {{
      const utterance = new SpeechSynthesisUtterance(message.text);
      utterance.lang = message.lang || {lang};
      utterance.rate = {rate};
      speechSynthesis.speak(utterance);
    }}
    return;
  }}
"#,
        in_page = js_string(&speech.in_page_action),
        lang = js_string(&speech.default_lang),
        rate = speech.rate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn adapter() -> ContentAdapter {
        ContentAdapter::new(&BuildConfig::default()).unwrap()
    }

    #[test]
    fn test_receiver_precedes_existing_branches() {
        let code = "chrome.runtime.onMessage.addListener((message, sender, sendResponse) => { if (message.action === 'toggle') { toggle(); } });";
        let adaptation = adapter().adapt(code);

        assert!(adaptation.is_complete());
        let receiver = adaptation.text.find("message.action === 'speakInPage'").unwrap();
        let existing = adaptation.text.find("message.action === 'toggle'").unwrap();
        assert!(receiver < existing);
        assert!(adaptation.text.starts_with("browser.runtime.onMessage.addListener("));
    }

    #[test]
    fn test_receiver_consumes_message() {
        let code = "chrome.runtime.onMessage.addListener((message) => {\n  handle(message);\n});";
        let text = adapter().adapt(code).text;
        let branch_start = text.find("if (message.action === 'speakInPage')").unwrap();
        let branch = &text[branch_start..text.find("handle(message)").unwrap()];

        assert!(branch.contains("if ('speechSynthesis' in window)"));
        assert!(branch.contains("new SpeechSynthesisUtterance(message.text)"));
        assert!(branch.contains("utterance.lang = message.lang || 'en-US';"));
        assert!(branch.contains("utterance.rate = 0.9;"));
        assert!(branch.contains("speechSynthesis.speak(utterance);"));
        assert!(branch.contains("return;"));
    }

    #[test_case("(message, sender, sendResponse) =>" ; "all parameters")]
    #[test_case("(message, sender) =>" ; "without send response")]
    #[test_case("(message) =>" ; "message only")]
    #[test_case("async (message, sender, sendResponse) =>" ; "async handler")]
    #[test_case("( message ,sender ) =>" ; "irregular spacing")]
    fn test_listener_shapes(params: &str) {
        let code = format!("chrome.runtime.onMessage.addListener({params} {{\n  work();\n}});");
        let adaptation = adapter().adapt(&code);
        assert_eq!(adaptation.applied, vec![SPEAK_RECEIVER_RULE]);
    }

    #[test]
    fn test_falls_back_to_source_spelling() {
        // runtime alias removed, so the listener keeps its chrome spelling
        let mut config = BuildConfig::default();
        config.namespace.aliases.retain(|a| a.from != "chrome.runtime");
        let adapter = ContentAdapter::new(&config).unwrap();

        let adaptation =
            adapter.adapt("chrome.runtime.onMessage.addListener((message) => { go(); });");
        assert!(adaptation.is_complete());
        assert!(adaptation.text.contains("speakInPage"));
    }

    #[test]
    fn test_function_listener_is_a_miss() {
        let code = "chrome.runtime.onMessage.addListener(function (message) { go(); });";
        let adaptation = adapter().adapt(code);

        assert_eq!(adaptation.missed, vec![SPEAK_RECEIVER_RULE]);
        assert!(!adaptation.text.contains("speakInPage"));
        assert_eq!(
            adaptation.text,
            "browser.runtime.onMessage.addListener(function (message) { go(); });"
        );
    }

    #[test]
    fn test_only_first_listener_receives_fragment() {
        let code = "chrome.runtime.onMessage.addListener((message) => { a(); });\nchrome.runtime.onMessage.addListener((message) => { b(); });";
        let text = adapter().adapt(code).text;
        assert_eq!(text.matches("speakInPage").count(), 1);
    }
}
