//! `cw build` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use cw_config::{CliSettings, Config, ProjectConfig};
use cw_sandbox::{BuildOptions, SandboxDocument, build_document};
use cw_server::project;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover cw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project directory (overrides config).
    #[arg(short = 'd', long)]
    project_dir: Option<PathBuf>,

    /// Write the document to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show an error in the preview when a runtime script fails to load.
    #[arg(long)]
    report_load_failures: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            project_dir: self.project_dir.clone(),
            report_load_failures: self.report_load_failures.then_some(true),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let document = render(&config.project_resolved, &config.build_options())?;

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, document.as_str())?;
                output.success(&format!(
                    "Wrote {} bytes to {}",
                    document.len(),
                    path.display()
                ));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(document.as_str().as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

/// Read the project files and assemble the preview document.
fn render(project: &ProjectConfig, options: &BuildOptions) -> Result<SandboxDocument, CliError> {
    if !project.dir.is_dir() {
        return Err(CliError::Validation(format!(
            "Project directory not found: {}",
            project.dir.display()
        )));
    }
    let buffers = project::load_buffers(project)?;
    Ok(build_document(&buffers, options))
}
