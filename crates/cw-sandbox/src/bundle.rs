//! Pinned runtime capabilities loaded by every sandbox document.

use serde::{Deserialize, Serialize};

/// Standalone JSX transpiler.
const DEFAULT_TRANSPILER_URL: &str = "https://unpkg.com/@babel/standalone/babel.min.js";
/// UI runtime core.
const DEFAULT_RUNTIME_URL: &str = "https://unpkg.com/react@18/umd/react.development.js";
/// UI runtime DOM renderer.
const DEFAULT_RENDERER_URL: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";

/// The fixed set of scripts a sandbox document depends on.
///
/// The transpiler is loaded first, then the runtime core and its DOM
/// renderer. The component script only runs once all three have loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeBundle {
    /// JSX transpiler that compiles `text/babel` scripts in the browser.
    pub transpiler_url: String,
    /// UI runtime providing `React`.
    pub runtime_url: String,
    /// DOM renderer providing `ReactDOM.createRoot`.
    pub renderer_url: String,
}

impl Default for RuntimeBundle {
    fn default() -> Self {
        Self {
            transpiler_url: DEFAULT_TRANSPILER_URL.to_owned(),
            runtime_url: DEFAULT_RUNTIME_URL.to_owned(),
            renderer_url: DEFAULT_RENDERER_URL.to_owned(),
        }
    }
}

impl RuntimeBundle {
    /// Script URLs in load order.
    #[must_use]
    pub fn urls(&self) -> [&str; 3] {
        [
            self.transpiler_url.as_str(),
            self.runtime_url.as_str(),
            self.renderer_url.as_str(),
        ]
    }

    /// Distinct `scheme://host[:port]` origins of the bundle scripts.
    ///
    /// URLs without a recognisable origin are skipped.
    #[must_use]
    pub fn origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = Vec::new();
        for url in self.urls() {
            if let Some(origin) = origin_of(url)
                && !origins.iter().any(|o| o == origin)
            {
                origins.push(origin.to_owned());
            }
        }
        origins
    }
}

/// Extract `scheme://authority` from an absolute URL.
fn origin_of(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")?;
    let authority_start = scheme_end + 3;
    let authority_len = url[authority_start..]
        .find(['/', '?', '#'])
        .unwrap_or(url.len() - authority_start);
    if authority_len == 0 {
        return None;
    }
    Some(&url[..authority_start + authority_len])
}
