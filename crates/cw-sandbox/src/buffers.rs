//! Source buffers for one editable project.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{}()=;:,])\s*").unwrap());

const STARTER_COMPONENT: &str = r#"// Welcome to CodeWorkspace
import React from 'react';

function App() {
  return (
    <div className="app">
      <h1>Hello, Developer!</h1>
      <p>Start coding your React components here.</p>
      <button onClick={() => alert('Welcome!')}>
        Click Me
      </button>
    </div>
  );
}

export default App;"#;

const STARTER_STYLESHEET: &str = "/* CSS Editor */
.app {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  text-align: center;
  padding: 40px;
  max-width: 800px;
  margin: 0 auto;
}

h1 {
  color: #007acc;
  margin-bottom: 20px;
}

p {
  color: #666;
  line-height: 1.6;
  margin-bottom: 30px;
}

button {
  background: #007acc;
  color: white;
  border: none;
  padding: 12px 24px;
  border-radius: 8px;
  font-size: 16px;
  cursor: pointer;
  transition: background 0.3s;
}

button:hover {
  background: #005d99;
}";

const STARTER_STRUCTURE: &str = r#"<!-- HTML Editor -->
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>CodeWorkspace Project</title>
  <link rel="stylesheet" href="styles.css">
</head>
<body>
  <div id="root"></div>
  <script src="app.js"></script>
</body>
</html>"#;

/// Which of the three buffers an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// JSX component source.
    #[serde(rename = "jsx")]
    Component,
    /// CSS stylesheet.
    #[serde(rename = "css")]
    Stylesheet,
    /// HTML structure.
    #[serde(rename = "html")]
    Structure,
}

impl Language {
    /// All languages in editor tab order.
    pub const ALL: [Self; 3] = [Self::Component, Self::Stylesheet, Self::Structure];

    /// Short tag used in URLs and messages.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Component => "jsx",
            Self::Stylesheet => "css",
            Self::Structure => "html",
        }
    }

    /// Next language in tab order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Component => Self::Stylesheet,
            Self::Stylesheet => Self::Structure,
            Self::Structure => Self::Component,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown language tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown language: {0} (expected jsx, css or html)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jsx" => Ok(Self::Component),
            "css" => Ok(Self::Stylesheet),
            "html" => Ok(Self::Structure),
            other => Err(UnknownLanguage(other.to_owned())),
        }
    }
}

/// The three text buffers of one project.
///
/// Missing keys deserialize as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceBuffers {
    /// Component source (JSX).
    #[serde(rename = "jsx")]
    pub component: String,
    /// Stylesheet source (CSS).
    #[serde(rename = "css")]
    pub stylesheet: String,
    /// Structure source (HTML). Carried for completeness, never rendered.
    #[serde(rename = "html")]
    pub structure: String,
}

impl SourceBuffers {
    /// Create buffers from the three sources.
    #[must_use]
    pub fn new(
        component: impl Into<String>,
        stylesheet: impl Into<String>,
        structure: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            stylesheet: stylesheet.into(),
            structure: structure.into(),
        }
    }

    /// The starter project shown when a workspace opens.
    #[must_use]
    pub fn starter() -> Self {
        Self::new(STARTER_COMPONENT, STARTER_STYLESHEET, STARTER_STRUCTURE)
    }

    /// Text of one buffer.
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Component => &self.component,
            Language::Stylesheet => &self.stylesheet,
            Language::Structure => &self.structure,
        }
    }

    /// Replace one buffer. Returns `true` if the text changed.
    pub fn set(&mut self, language: Language, text: impl Into<String>) -> bool {
        let text = text.into();
        let slot = self.slot_mut(language);
        if *slot == text {
            return false;
        }
        *slot = text;
        true
    }

    /// Empty one buffer. Returns `true` if it had content.
    pub fn clear(&mut self, language: Language) -> bool {
        self.set(language, String::new())
    }

    /// Compact one buffer: whitespace runs collapse to a single space and
    /// punctuation is followed by exactly one space.
    ///
    /// Returns `true` if the text changed.
    pub fn format(&mut self, language: Language) -> bool {
        let formatted = format_source(self.get(language));
        self.set(language, formatted)
    }

    fn slot_mut(&mut self, language: Language) -> &mut String {
        match language {
            Language::Component => &mut self.component,
            Language::Stylesheet => &mut self.stylesheet,
            Language::Structure => &mut self.structure,
        }
    }
}

/// Collapse whitespace and normalise spacing around punctuation.
fn format_source(source: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(source, " ");
    PUNCTUATION_RE
        .replace_all(&collapsed, "${1} ")
        .trim()
        .to_owned()
}
