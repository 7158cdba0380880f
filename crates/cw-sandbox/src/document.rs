//! Sandbox document assembly.

use std::fmt::{self, Write};

use crate::buffers::SourceBuffers;
use crate::bundle::RuntimeBundle;
use crate::transform::{ENTRY_BINDING, clean_component};

/// Text rendered when the component source exports nothing.
pub const PLACEHOLDER_TEXT: &str = "Edit JSX code to see preview";

/// Id of the mount element.
const MOUNT_ID: &str = "root";

/// Script-local binding holding the mount element.
const MOUNT_BINDING: &str = "__previewMount";

/// Component rendered when nothing is exported but a function of this name exists.
const FALLBACK_ENTRY: &str = "App";

/// Baseline reset and font stack applied before user styles.
const BASE_STYLES: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, sans-serif; padding: 20px; }
";

/// Style for error blocks written into the mount element.
const ERROR_STYLES: &str = "
.error {
  background: #fee;
  color: #c00;
  padding: 15px;
  border-radius: 5px;
  margin: 10px 0;
  font-family: monospace;
}
";

/// Defines the handler used by `onerror` on bundle scripts.
const LOAD_FAILURE_SCRIPT: &str = "<script>
function __reportBundleFailure(url) {
  const block = document.createElement('div');
  block.className = 'error';
  const label = document.createElement('strong');
  label.textContent = 'Error:';
  block.append(label, ' Failed to load ' + url);
  document.getElementById('root').append(block);
}
</script>
";

/// Options controlling document assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Scripts providing the transpiler and UI runtime.
    pub bundle: RuntimeBundle,
    /// Render an `.error` block when a bundle script fails to load.
    ///
    /// Off by default: the preview then stays blank on network failures.
    pub report_load_failures: bool,
}

/// A fully assembled, self-contained preview document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SandboxDocument(String);

impl SandboxDocument {
    /// Document text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Document length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SandboxDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SandboxDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the preview document for a set of buffers.
///
/// Deterministic and infallible. The `structure` buffer is accepted but not
/// interpolated: the body always holds a single fixed mount element.
pub fn build_document(buffers: &SourceBuffers, options: &BuildOptions) -> SandboxDocument {
    let cleaned = clean_component(&buffers.component);

    let mut html = String::with_capacity(
        2048 + buffers.component.len() + buffers.stylesheet.len(),
    );

    // Head
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    html.push_str("<style>\n");
    html.push_str(BASE_STYLES);
    html.push_str(&buffers.stylesheet);
    html.push('\n');
    html.push_str(ERROR_STYLES);
    html.push_str("</style>\n</head>\n<body>\n");

    // Mount point and runtime bundle
    let _ = writeln!(html, "<div id=\"{MOUNT_ID}\"></div>");
    if options.report_load_failures {
        html.push_str(LOAD_FAILURE_SCRIPT);
    }
    let on_error = if options.report_load_failures {
        " onerror=\"__reportBundleFailure(this.src)\""
    } else {
        ""
    };
    let bundle = &options.bundle;
    let _ = writeln!(
        html,
        "<script src=\"{}\"{on_error}></script>",
        escape(&bundle.transpiler_url)
    );
    let _ = writeln!(
        html,
        "<script crossorigin src=\"{}\"{on_error}></script>",
        escape(&bundle.runtime_url)
    );
    let _ = writeln!(
        html,
        "<script crossorigin src=\"{}\"{on_error}></script>",
        escape(&bundle.renderer_url)
    );

    // Component execution
    render_component_script(&mut html, &cleaned.source);

    html.push_str("</body>\n</html>\n");

    tracing::debug!(
        bytes = html.len(),
        entry = cleaned.entry.as_deref().unwrap_or("<none>"),
        "Built sandbox document"
    );

    SandboxDocument(html)
}

/// Render the transpiled script that runs user code and mounts the result.
///
/// Everything runs inside a function scope so the entry binding never
/// becomes a property of the global object. Every name the script declares
/// next to user code carries the `__preview` prefix.
fn render_component_script(html: &mut String, component: &str) {
    html.push_str("<script type=\"text/babel\" data-presets=\"react\">\n");
    html.push_str("(function () {\n");
    let _ = writeln!(html, "  let {ENTRY_BINDING};");
    let _ = writeln!(
        html,
        "  const {MOUNT_BINDING} = document.getElementById('{MOUNT_ID}');"
    );
    html.push_str("  try {\n");
    html.push_str(component);
    html.push_str("\n\n");
    // A top-level `function App` without an export is still picked up.
    let _ = writeln!(
        html,
        "    if (typeof {ENTRY_BINDING} === 'undefined' && typeof {FALLBACK_ENTRY} === 'function') {{"
    );
    let _ = writeln!(html, "      {ENTRY_BINDING} = {FALLBACK_ENTRY};");
    html.push_str("    }\n");
    let _ = writeln!(html, "    if (typeof {ENTRY_BINDING} === 'undefined') {{");
    let _ = writeln!(
        html,
        "      {ENTRY_BINDING} = () => React.createElement('div', null, '{PLACEHOLDER_TEXT}');"
    );
    html.push_str("    }\n\n");
    let _ = writeln!(
        html,
        "    ReactDOM.createRoot({MOUNT_BINDING}).render(React.createElement({ENTRY_BINDING}));"
    );
    html.push_str("  } catch (__previewError) {\n");
    html.push_str("    const __previewBlock = document.createElement('div');\n");
    html.push_str("    __previewBlock.className = 'error';\n");
    html.push_str("    const __previewLabel = document.createElement('strong');\n");
    html.push_str("    __previewLabel.textContent = 'Error:';\n");
    html.push_str(
        "    __previewBlock.append(__previewLabel, ' ' + (__previewError && __previewError.message));\n",
    );
    let _ = writeln!(html, "    {MOUNT_BINDING}.replaceChildren(__previewBlock);");
    html.push_str("  }\n");
    html.push_str("})();\n");
    html.push_str("</script>\n");
}

/// Escape a value for use inside a double-quoted attribute.
fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(component: &str, stylesheet: &str) -> SandboxDocument {
        build_document(
            &SourceBuffers::new(component, stylesheet, ""),
            &BuildOptions::default(),
        )
    }

    /// Text of the `text/babel` script block.
    fn component_script(document: &SandboxDocument) -> &str {
        let html = document.as_str();
        let start = html.find("<script type=\"text/babel\"").unwrap();
        let end = html[start..].find("</script>").unwrap();
        &html[start..start + end]
    }

    #[test]
    fn test_build_is_deterministic() {
        let buffers = SourceBuffers::starter();
        let options = BuildOptions::default();

        assert_eq!(
            build_document(&buffers, &options),
            build_document(&buffers, &options)
        );
    }

    #[test]
    fn test_export_default_assigns_entry() {
        let document = build("function Foo() { return null; }\nexport default Foo;", "");
        let script = component_script(&document);

        assert!(script.contains("__previewEntry = Foo;"));
        assert!(!document.as_str().contains("export default"));
    }

    #[test]
    fn test_imports_do_not_survive() {
        let component = "import React from 'react';\nimport { useState } from 'react';\nexport default App;";
        let document = build(component, "");

        assert!(!document.as_str().contains("import React from 'react';"));
        assert!(!document.as_str().contains("import { useState } from 'react';"));
        assert_eq!(
            document.as_str().matches("// Import removed for preview").count(),
            2
        );
    }

    #[test]
    fn test_empty_component_falls_back_to_placeholder() {
        let document = build("", "");
        let script = component_script(&document);

        assert!(script.contains("if (typeof __previewEntry === 'undefined')"));
        assert!(script.contains(PLACEHOLDER_TEXT));
        assert!(script.contains("ReactDOM.createRoot(__previewMount)"));
    }

    #[test]
    fn test_user_code_runs_inside_try() {
        let document = build("const broken = missingVariable;", "");
        let script = component_script(&document);

        let try_at = script.find("try {").unwrap();
        let code_at = script.find("const broken = missingVariable;").unwrap();
        let catch_at = script.find("} catch (__previewError) {").unwrap();
        assert!(try_at < code_at && code_at < catch_at);
        assert!(script[catch_at..].contains("__previewBlock.className = 'error';"));
        assert!(script[catch_at..].contains("__previewError.message"));
    }

    #[test]
    fn test_stylesheet_sits_between_reset_and_error_block() {
        let document = build("", "body{color:red}");
        let html = document.as_str();

        let reset_at = html.find("box-sizing: border-box").unwrap();
        let user_at = html.find("body{color:red}").unwrap();
        let error_at = html.find(".error {").unwrap();
        assert!(reset_at < user_at && user_at < error_at);
    }

    #[test]
    fn test_bundle_scripts_precede_component_script() {
        let document = build("", "");
        let html = document.as_str();

        let mount_at = html.find("<div id=\"root\"></div>").unwrap();
        let babel_at = html.find("@babel/standalone").unwrap();
        let react_at = html.find("react@18/umd/react.development.js").unwrap();
        let dom_at = html.find("react-dom@18").unwrap();
        let script_at = html.find("text/babel").unwrap();
        assert!(mount_at < babel_at);
        assert!(babel_at < react_at && react_at < dom_at && dom_at < script_at);
    }

    #[test]
    fn test_structure_buffer_is_inert() {
        let with_structure = build_document(
            &SourceBuffers::new("", "", "<main id=\"custom\">hello</main>"),
            &BuildOptions::default(),
        );

        assert_eq!(with_structure, build("", ""));
    }

    #[test]
    fn test_load_failure_reporting_is_opt_in() {
        let plain = build("", "");
        assert!(!plain.as_str().contains("onerror"));

        let options = BuildOptions {
            report_load_failures: true,
            ..BuildOptions::default()
        };
        let hardened = build_document(&SourceBuffers::default(), &options);

        assert_eq!(
            hardened
                .as_str()
                .matches("onerror=\"__reportBundleFailure(this.src)\"")
                .count(),
            3
        );
        assert!(hardened.as_str().contains("function __reportBundleFailure(url)"));
    }

    #[test]
    fn test_bundle_urls_are_escaped() {
        let options = BuildOptions {
            bundle: RuntimeBundle {
                transpiler_url: "https://cdn.example.com/babel.js?a=1&b=\"2\"".to_owned(),
                ..RuntimeBundle::default()
            },
            report_load_failures: false,
        };
        let document = build_document(&SourceBuffers::default(), &options);

        assert!(
            document
                .as_str()
                .contains("src=\"https://cdn.example.com/babel.js?a=1&amp;b=&quot;2&quot;\"")
        );
    }

    #[test]
    fn test_entry_is_not_a_global() {
        let document = build("export default App;", "");

        assert!(!document.as_str().contains("window.App"));
        assert!(component_script(&document).contains("(function () {"));
    }

    #[test]
    fn test_generated_names_do_not_collide_with_user_code() {
        let document = build("", "");
        let script = component_script(&document);
        let declaration = regex::Regex::new(r"\b(?:let|const|var|function)\s+(\w+)").unwrap();
        let catch_param = regex::Regex::new(r"catch \((\w+)\)").unwrap();

        let names: Vec<&str> = declaration
            .captures_iter(script)
            .chain(catch_param.captures_iter(script))
            .map(|c| c.get(1).unwrap().as_str())
            .collect();

        assert!(!names.is_empty());
        for name in names {
            assert!(name.starts_with("__preview"), "unprefixed binding: {name}");
        }
    }

    #[test]
    fn test_user_mount_function_does_not_shadow_mount_element() {
        let document = build(
            "function mount() {}\nfunction Foo() { return 'ok'; }\nexport default Foo;",
            "",
        );
        let script = component_script(&document);

        assert!(script.contains("ReactDOM.createRoot(__previewMount)"));
        assert!(script.contains("__previewMount.replaceChildren(__previewBlock)"));
        assert!(!script.contains("createRoot(mount)"));
    }

    #[test]
    fn test_unexported_app_function_is_rendered() {
        let document = build("function App() { return 'hi'; }", "");
        let script = component_script(&document);

        let fallback_at = script
            .find("if (typeof __previewEntry === 'undefined' && typeof App === 'function') {")
            .unwrap();
        let placeholder_at = script.find(PLACEHOLDER_TEXT).unwrap();
        assert!(fallback_at < placeholder_at);
        assert!(script.contains("__previewEntry = App;"));
    }

    #[test]
    fn test_display_matches_as_str() {
        let document = build("", "");

        assert_eq!(document.to_string(), document.as_str());
        assert!(!document.is_empty());
        assert_eq!(document.len(), document.as_str().len());
    }
}
