//! `cw serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use cw_config::{CliSettings, Config};
use cw_server::{run_server, server_config_from_cw_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover cw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project directory holding App.jsx, styles.css and index.html (overrides config).
    #[arg(short = 'd', long)]
    project_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (preview state transitions and file events).
    #[arg(short, long)]
    pub verbose: bool,

    /// Watch project files (default: enabled).
    #[arg(long)]
    watch: Option<bool>,

    /// Disable watching project files.
    #[arg(long, conflicts_with = "watch")]
    no_watch: bool,

    /// Show an error in the preview when a runtime script fails to load.
    #[arg(long)]
    report_load_failures: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host.clone(),
            port: self.port,
            project_dir: self.project_dir.clone(),
            watch_enabled: self.resolve_watch_enabled(),
            report_load_failures: self.report_load_failures.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let server_config = server_config_from_cw_config(&config, version.to_owned());

        output.highlight(&format!(
            "CodeWorkspace running at http://{}:{}",
            config.server.host, config.server.port
        ));
        if let Some(project) = &server_config.project {
            output.field("Project", project.dir.display());
            output.field(
                "Watching",
                if server_config.watch_enabled { "enabled" } else { "disabled" },
            );
        } else {
            output.warning(&format!(
                "Project directory {} not found, serving the starter template in memory \
                 (run `cw init` to create it)",
                config.project_resolved.dir.display()
            ));
        }
        output.field("Runtime", config.runtime.urls().join(", "));

        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }

    /// Resolve `watch_enabled` from --watch/--no-watch flags.
    fn resolve_watch_enabled(&self) -> Option<bool> {
        self.no_watch.then_some(false).or(self.watch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        TestCli::parse_from(std::iter::once("serve").chain(args.iter().copied())).args
    }

    #[test]
    fn test_watch_defaults_to_config() {
        assert_eq!(parse(&[]).resolve_watch_enabled(), None);
    }

    #[test]
    fn test_no_watch_disables() {
        assert_eq!(parse(&["--no-watch"]).resolve_watch_enabled(), Some(false));
    }

    #[test]
    fn test_watch_explicit_value() {
        assert_eq!(
            parse(&["--watch", "true"]).resolve_watch_enabled(),
            Some(true)
        );
    }

    #[test]
    fn test_overrides_parse() {
        let args = parse(&["-d", "demo", "--port", "9000", "--verbose"]);

        assert_eq!(args.project_dir, Some(PathBuf::from("demo")));
        assert_eq!(args.port, Some(9000));
        assert!(args.verbose);
    }
}
