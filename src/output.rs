//! Release of verified content
//!
//! A sink is handed the plaintext only after verification succeeded, and at
//! most once per run.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::OutputTarget;
use crate::error::{GpgetError, GpgetResult};

/// Destination label used for standard output
pub const STDOUT_DESTINATION: &str = "<stdout>";

/// Accepts verified content
pub trait Sink {
    /// Write `content` for the artifact `name`; returns where it went
    fn release(&mut self, name: &str, content: &[u8]) -> GpgetResult<String>;
}

/// Sink writing to the configured [`OutputTarget`]
#[derive(Debug, Clone)]
pub struct TargetSink {
    target: OutputTarget,
}

impl TargetSink {
    pub fn new(target: OutputTarget) -> Self {
        Self { target }
    }

    /// Path the content for `name` would be written to, `None` for stdout
    pub fn destination_path(&self, name: &str) -> Option<PathBuf> {
        match &self.target {
            OutputTarget::Stdout => None,
            OutputTarget::Directory(dir) => Some(dir.join(name)),
            OutputTarget::File(path) => Some(path.clone()),
        }
    }
}

impl Sink for TargetSink {
    fn release(&mut self, name: &str, content: &[u8]) -> GpgetResult<String> {
        match self.destination_path(name) {
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(content)
                    .and_then(|()| stdout.flush())
                    .map_err(|source| GpgetError::Output {
                        destination: STDOUT_DESTINATION.to_string(),
                        source,
                    })?;
                Ok(STDOUT_DESTINATION.to_string())
            }
            Some(path) => {
                let destination = path.display().to_string();
                write_atomic(&path, content).map_err(|source| GpgetError::Output {
                    destination: destination.clone(),
                    source,
                })?;
                debug!(%destination, bytes = content.len(), "wrote verified content");
                Ok(destination)
            }
        }
    }
}

/// Write to a temp file next to `path`, then rename over it. A failed write
/// leaves nothing at `path`; the temp file is removed on drop.
fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Sink that keeps released content in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub released: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for MemorySink {
    fn release(&mut self, name: &str, content: &[u8]) -> GpgetResult<String> {
        self.released.push((name.to_string(), content.to_vec()));
        Ok(format!("memory:{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::exit::ExitCode;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_directory_target_uses_artifact_name() {
        let dir = TempDir::new().unwrap();
        let mut sink = TargetSink::new(OutputTarget::Directory(dir.path().to_path_buf()));
        let destination = sink.release("release.txt", b"verified").unwrap();

        let path = dir.path().join("release.txt");
        assert_eq!(destination, path.display().to_string());
        assert_eq!(fs::read(path).unwrap(), b"verified");
    }

    #[test]
    fn test_file_target_ignores_artifact_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chosen.bin");
        let mut sink = TargetSink::new(OutputTarget::File(path.clone()));
        sink.release("release.txt", b"verified").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"verified");
        assert!(!dir.path().join("release.txt").exists());
    }

    #[test]
    fn test_unwritable_destination_is_output_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no/such/dir");
        let mut sink = TargetSink::new(OutputTarget::Directory(missing));
        let err = sink.release("release.txt", b"verified").unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::Output);
    }

    #[test]
    fn test_failed_rename_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let occupied = dir.path().join("release.txt");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("keep"), b"x").unwrap();

        let mut sink = TargetSink::new(OutputTarget::File(occupied.clone()));
        let err = sink.release("release.txt", b"verified").unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::Output);
        assert_eq!(entries(dir.path()), vec!["release.txt".to_string()]);
        assert_eq!(entries(&occupied), vec!["keep".to_string()]);
    }

    #[test]
    fn test_existing_file_is_replaced_whole() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.txt");
        fs::write(&path, b"an older and much longer release").unwrap();

        let mut sink = TargetSink::new(OutputTarget::Directory(dir.path().to_path_buf()));
        sink.release("release.txt", b"verified").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"verified");
        assert_eq!(entries(dir.path()), vec!["release.txt".to_string()]);
    }

    #[test]
    fn test_stdout_has_no_path() {
        let sink = TargetSink::new(OutputTarget::Stdout);
        assert_eq!(sink.destination_path("release.txt"), None);
    }

    #[test]
    fn test_memory_sink_records() {
        let mut sink = MemorySink::new();
        sink.release("a", b"1").unwrap();
        assert_eq!(sink.released, vec![("a".to_string(), b"1".to_vec())]);
    }
}
