//! Background script adaptation
//!
//! Firefox has no `tts` API. The native speak handler in the background
//! script is swapped for a block that forwards the request to the active
//! tab, where the content script speaks it with the Web Speech API.

use super::namespace::NamespaceRewriter;
use super::rules::{Adaptation, RewriteRule};
use super::js_string;
use crate::config::BuildConfig;
use crate::error::BuildResult;

pub const SPEAK_HANDLER_RULE: &str = "speak-handler";

#[derive(Debug, Clone)]
pub struct BackgroundAdapter {
    namespace: NamespaceRewriter,
    menus: NamespaceRewriter,
    speak_handler: RewriteRule,
}

impl BackgroundAdapter {
    pub fn new(config: &BuildConfig) -> BuildResult<Self> {
        let speech = &config.speech;

        let start = format!(
            r#"{marker}[\s\S]*?if\s*\(\s*message\.action\s*===\s*['"]{action}['"]\s*\)\s*\{{"#,
            marker = regex::escape(&speech.marker),
            action = regex::escape(&speech.speak_action),
        );
        let speak_handler = RewriteRule::delimited(
            SPEAK_HANDLER_RULE,
            &start,
            r"return true;\s*\}",
            forwarding_block(config),
        )?;

        Ok(Self {
            namespace: NamespaceRewriter::new(&config.namespace.aliases)?,
            menus: NamespaceRewriter::new(&config.namespace.menu_aliases)?,
            speak_handler,
        })
    }

    pub fn adapt(&self, source: &str) -> Adaptation {
        let (text, api_count) = self.namespace.rewrite_counted(source);
        // menu aliases run second so both chrome.* and browser.* spellings are caught
        let (text, menu_count) = self.menus.rewrite_counted(&text);

        let mut adaptation = Adaptation::new(text, api_count + menu_count);
        adaptation.apply(&self.speak_handler);
        adaptation
    }
}

fn forwarding_block(config: &BuildConfig) -> String {
    let speech = &config.speech;
    let target = &config.namespace;
    let tabs = target
        .aliases
        .iter()
        .find(|a| a.from.ends_with(".tabs"))
        .map_or("browser.tabs", |a| a.to.as_str());

    format!(
        r#"{marker} (Firefox: spoken in the page via the Web Speech API)
  if (message.action === {speak}) {{
    {tabs}.query({{active: true, currentWindow: true}}).then(tabs => {{
      if (tabs[0]) {{
        {tabs}.sendMessage(tabs[0].id, {{
          action: {in_page},
          text: message.text,
          lang: message.lang || {lang}
        }}).catch(() => {{
          console.log({log});
        }});
      }}
    }});
    sendResponse({{ success: true }});
    return true;
  }}"#,
        marker = speech.marker,
        speak = js_string(&speech.speak_action),
        in_page = js_string(&speech.in_page_action),
        lang = js_string(&speech.default_lang),
        log = js_string(&format!(
            "{} Could not send TTS message to content script",
            speech.log_tag
        )),
    )
}
