//! Configuration management for CodeWorkspace.
//!
//! Parses `cw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `runtime.transpiler_url`
//! - `runtime.runtime_url`
//! - `runtime.renderer_url`

mod expand;

use std::path::{Path, PathBuf};

use cw_sandbox::{BuildOptions, Language, RuntimeBundle};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override project directory.
    pub project_dir: Option<PathBuf>,
    /// Override project file watching.
    pub watch_enabled: Option<bool>,
    /// Override bundle load failure reporting.
    pub report_load_failures: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cw.toml";

/// Upper bound for the watcher debounce window.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Project configuration (paths are relative strings from TOML).
    project: ProjectConfigRaw,
    /// Runtime bundle loaded by every preview document.
    pub runtime: RuntimeBundle,
    /// Preview document options.
    pub preview: PreviewConfig,
    /// Project file watching.
    pub watch: WatchConfig,

    /// Resolved project configuration (set after loading).
    #[serde(skip)]
    pub project_resolved: ProjectConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
        }
    }
}

/// Raw project configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ProjectConfigRaw {
    dir: Option<String>,
    component_file: Option<String>,
    stylesheet_file: Option<String>,
    structure_file: Option<String>,
}

/// Resolved project configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Directory holding the three project files.
    pub dir: PathBuf,
    /// Component source file name.
    pub component_file: String,
    /// Stylesheet file name.
    pub stylesheet_file: String,
    /// Structure file name.
    pub structure_file: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("playground"),
            component_file: "App.jsx".to_owned(),
            stylesheet_file: "styles.css".to_owned(),
            structure_file: "index.html".to_owned(),
        }
    }
}

impl ProjectConfig {
    /// File name backing one buffer.
    #[must_use]
    pub fn file_name(&self, language: Language) -> &str {
        match language {
            Language::Component => &self.component_file,
            Language::Stylesheet => &self.stylesheet_file,
            Language::Structure => &self.structure_file,
        }
    }

    /// Absolute path of the file backing one buffer.
    #[must_use]
    pub fn file_path(&self, language: Language) -> PathBuf {
        self.dir.join(self.file_name(language))
    }

    /// Buffer backed by the given file name, if any.
    #[must_use]
    pub fn language_for(&self, file_name: &str) -> Option<Language> {
        Language::ALL
            .into_iter()
            .find(|language| self.file_name(*language) == file_name)
    }
}

/// Preview document options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Render an error block when a runtime bundle script fails to load.
    pub report_load_failures: bool,
}

/// Project file watching configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Whether project files are watched for changes.
    pub enabled: bool,
    /// Debounce window for file events, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 100,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`CW_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Build options for sandbox documents.
    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            bundle: self.runtime.clone(),
            report_load_failures: self.preview.report_load_failures,
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(project_dir) = &settings.project_dir {
            self.project_resolved.dir.clone_from(project_dir);
        }
        if let Some(watch_enabled) = settings.watch_enabled {
            self.watch.enabled = watch_enabled;
        }
        if let Some(report_load_failures) = settings.report_load_failures {
            self.preview.report_load_failures = report_load_failures;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            project: ProjectConfigRaw::default(),
            runtime: RuntimeBundle::default(),
            preview: PreviewConfig::default(),
            watch: WatchConfig::default(),
            project_resolved: ProjectConfig {
                dir: base.join("playground"),
                ..ProjectConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_runtime()?;
        self.validate_project()?;
        self.validate_watch()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_runtime(&self) -> Result<(), ConfigError> {
        let fields = [
            (&self.runtime.transpiler_url, "runtime.transpiler_url"),
            (&self.runtime.runtime_url, "runtime.runtime_url"),
            (&self.runtime.renderer_url, "runtime.renderer_url"),
        ];
        for (url, field) in fields {
            require_non_empty(url, field)?;
            require_http_url(url, field)?;
        }
        Ok(())
    }

    fn validate_project(&self) -> Result<(), ConfigError> {
        let project = &self.project_resolved;
        for language in Language::ALL {
            let field = format!("project.{}_file", field_prefix(language));
            let name = project.file_name(language);
            require_non_empty(name, &field)?;
            if name.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "{field} must be a file name, not a path"
                )));
            }
        }

        let names = Language::ALL.map(|language| project.file_name(language));
        if names[0] == names[1] || names[1] == names[2] || names[0] == names[2] {
            return Err(ConfigError::Validation(
                "project file names must be distinct".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_watch(&self) -> Result<(), ConfigError> {
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.debounce_ms must be greater than 0".to_owned(),
            ));
        }
        if self.watch.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "watch.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let runtime = &mut self.runtime;
        runtime.transpiler_url =
            expand::expand_env(&runtime.transpiler_url, "runtime.transpiler_url")?;
        runtime.runtime_url = expand::expand_env(&runtime.runtime_url, "runtime.runtime_url")?;
        runtime.renderer_url =
            expand::expand_env(&runtime.renderer_url, "runtime.renderer_url")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = ProjectConfig::default();
        let raw = &self.project;

        self.project_resolved = ProjectConfig {
            dir: config_dir.join(raw.dir.as_deref().unwrap_or("playground")),
            component_file: raw
                .component_file
                .clone()
                .unwrap_or(defaults.component_file),
            stylesheet_file: raw
                .stylesheet_file
                .clone()
                .unwrap_or(defaults.stylesheet_file),
            structure_file: raw
                .structure_file
                .clone()
                .unwrap_or(defaults.structure_file),
        };
    }
}

/// Config key prefix for a buffer's file name.
fn field_prefix(language: Language) -> &'static str {
    match language {
        Language::Component => "component",
        Language::Stylesheet => "stylesheet",
        Language::Structure => "structure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert_eq!(
            config.project_resolved.dir,
            PathBuf::from("/test/playground")
        );
        assert_eq!(config.project_resolved.component_file, "App.jsx");
        assert_eq!(config.runtime, RuntimeBundle::default());
        assert!(!config.preview.report_load_failures);
        assert!(config.watch.enabled);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.runtime, RuntimeBundle::default());
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_parse_runtime_config() {
        let toml = r#"
[runtime]
transpiler_url = "http://localhost:9000/babel.min.js"
runtime_url = "http://localhost:9000/react.js"
renderer_url = "http://localhost:9000/react-dom.js"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.runtime.transpiler_url,
            "http://localhost:9000/babel.min.js"
        );
        assert_eq!(
            config.build_options().bundle.renderer_url,
            "http://localhost:9000/react-dom.js"
        );
    }

    #[test]
    fn test_parse_preview_and_watch_config() {
        let toml = r"
[preview]
report_load_failures = true

[watch]
enabled = false
debounce_ms = 250
";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.preview.report_load_failures);
        assert!(config.build_options().report_load_failures);
        assert!(!config.watch.enabled);
        assert_eq!(config.watch.debounce_ms, 250);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[project]
dir = "demo"
component_file = "Main.jsx"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.project_resolved,
            ProjectConfig {
                dir: PathBuf::from("/project/demo"),
                component_file: "Main.jsx".to_owned(),
                stylesheet_file: "styles.css".to_owned(),
                structure_file: "index.html".to_owned(),
            }
        );
        assert_eq!(
            config.project_resolved.file_path(Language::Component),
            PathBuf::from("/project/demo/Main.jsx")
        );
    }

    #[test]
    fn test_language_for_file_name() {
        let project = ProjectConfig::default();

        assert_eq!(project.language_for("App.jsx"), Some(Language::Component));
        assert_eq!(project.language_for("styles.css"), Some(Language::Stylesheet));
        assert_eq!(project.language_for("index.html"), Some(Language::Structure));
        assert_eq!(project.language_for("notes.md"), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cw.toml");
        std::fs::write(&path, "[server]\nport = 9100\n\n[project]\ndir = \"src\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.project_resolved.dir, dir.path().join("src"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/cw.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cw.toml");
        std::fs::write(&path, "[server\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_apply_cli_settings_host() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 7878); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_project_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            project_dir: Some(PathBuf::from("/custom/project")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.project_resolved.dir,
            PathBuf::from("/custom/project")
        );
        assert_eq!(config.project_resolved.component_file, "App.jsx"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_flags() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(9000),
            watch_enabled: Some(false),
            report_load_failures: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.port, 9000);
        assert!(!config.watch.enabled);
        assert!(config.preview.report_load_failures);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert!(config.watch.enabled);
    }

    #[test]
    fn test_expand_env_vars_runtime_urls() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CW_TEST_BUNDLE_HOST", "mirror.example.com");
        }
        let toml = r#"
[runtime]
transpiler_url = "https://${CW_TEST_BUNDLE_HOST}/babel.js"
runtime_url = "https://${CW_TEST_BUNDLE_HOST}/react.js"
renderer_url = "https://${CW_TEST_BUNDLE_HOST}/react-dom.js"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.runtime.transpiler_url,
            "https://mirror.example.com/babel.js"
        );
        assert_eq!(
            config.runtime.renderer_url,
            "https://mirror.example.com/react-dom.js"
        );
        unsafe {
            std::env::remove_var("CW_TEST_BUNDLE_HOST");
        }
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_runtime_url_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.runtime.runtime_url = "ftp://cdn.example.com/react.js".to_owned();
        assert_validation_error(&config, &["runtime.runtime_url", "http"]);
    }

    #[test]
    fn test_validate_runtime_url_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.runtime.transpiler_url = String::new();
        assert_validation_error(&config, &["runtime.transpiler_url", "empty"]);
    }

    #[test]
    fn test_validate_project_file_is_path() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.project_resolved.stylesheet_file = "css/styles.css".to_owned();
        assert_validation_error(&config, &["project.stylesheet_file", "file name"]);
    }

    #[test]
    fn test_validate_project_files_distinct() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.project_resolved.structure_file = "App.jsx".to_owned();
        assert_validation_error(&config, &["distinct"]);
    }

    #[test]
    fn test_validate_debounce_bounds() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.watch.debounce_ms = 0;
        assert_validation_error(&config, &["debounce_ms", "greater than 0"]);

        config.watch.debounce_ms = 60_000;
        assert_validation_error(&config, &["debounce_ms", "10000"]);
    }
}
