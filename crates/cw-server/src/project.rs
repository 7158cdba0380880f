//! Project files on disk.
//!
//! A project is a directory with one file per buffer. Missing files read as
//! empty buffers.

use std::fs;
use std::io;
use std::path::PathBuf;

use cw_config::ProjectConfig;
use cw_sandbox::{Language, SourceBuffers};

/// Read the file backing one buffer. A missing file reads as empty.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read_buffer(project: &ProjectConfig, language: Language) -> io::Result<String> {
    match fs::read_to_string(project.file_path(language)) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

/// Read all three project files.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read.
pub fn load_buffers(project: &ProjectConfig) -> io::Result<SourceBuffers> {
    let mut buffers = SourceBuffers::default();
    for language in Language::ALL {
        buffers.set(language, read_buffer(project, language)?);
    }
    Ok(buffers)
}

/// Write the starter template into the project directory.
///
/// Creates the directory if needed. Existing files are left alone unless
/// `force` is set. Returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_starter(project: &ProjectConfig, force: bool) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(&project.dir)?;

    let starter = SourceBuffers::starter();
    let mut written = Vec::new();
    for language in Language::ALL {
        let path = project.file_path(language);
        if path.exists() && !force {
            tracing::debug!(path = %path.display(), "Keeping existing project file");
            continue;
        }
        fs::write(&path, starter.get(language))?;
        written.push(path);
    }
    Ok(written)
}
