//! Cleanup of component source before it runs inside the sandbox.
//!
//! Two purely textual rewrites are applied, nothing more:
//!
//! - `export default <Identifier>;` becomes an assignment to [`ENTRY_BINDING`]
//! - `import ... from '...';` becomes [`IMPORT_PLACEHOLDER`]
//!
//! The patterns match the statement shapes only. Anything else, including
//! `export default function App() {}`, is left for the transpiler to judge.

use std::sync::LazyLock;

use regex::Regex;

/// Local binding the execution script mounts. Export statements assign to it.
pub const ENTRY_BINDING: &str = "__previewEntry";

/// Replacement text for stripped import statements.
pub const IMPORT_PLACEHOLDER: &str = "// Import removed for preview";

static EXPORT_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+default\s+(\w+);?").unwrap());

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"import\s+.*?\s+from\s+['"].*?['"];?"#).unwrap());

/// Component source with module syntax removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanedComponent {
    /// Rewritten source, ready to embed in the execution script.
    pub source: String,
    /// Identifier named by the last `export default` statement, if any.
    pub entry: Option<String>,
}

/// Strip `export default` and `import` statements from component source.
pub fn clean_component(source: &str) -> CleanedComponent {
    let entry = EXPORT_DEFAULT_RE
        .captures_iter(source)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned());

    let exported =
        EXPORT_DEFAULT_RE.replace_all(source, format!("{ENTRY_BINDING} = ${{1}};").as_str());
    let cleaned = IMPORT_RE.replace_all(&exported, IMPORT_PLACEHOLDER);

    CleanedComponent {
        source: cleaned.into_owned(),
        entry,
    }
}
