//! `cw init` command implementation.

use std::path::PathBuf;

use clap::Args;
use cw_config::{CliSettings, Config};
use cw_server::project;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the init command.
#[derive(Args)]
pub(crate) struct InitArgs {
    /// Path to configuration file (default: auto-discover cw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project directory to create (overrides config).
    #[arg(short = 'd', long)]
    project_dir: Option<PathBuf>,

    /// Overwrite existing project files.
    #[arg(short, long)]
    force: bool,
}

impl InitArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            project_dir: self.project_dir.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let project = &config.project_resolved;

        let written = project::write_starter(project, self.force)?;
        if written.is_empty() {
            output.warning(&format!(
                "Project files already exist in {} (use --force to overwrite)",
                project.dir.display()
            ));
            return Ok(());
        }

        for path in &written {
            output.field("Created", path.display());
        }
        output.success(&format!(
            "Project ready in {}. Run `cw serve` to start editing.",
            project.dir.display()
        ));
        Ok(())
    }
}
