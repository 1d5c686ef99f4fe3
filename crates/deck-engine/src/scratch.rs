//! Scoped scratch directories
//!
//! Every backend that needs disk space (Helm `--output-dir`, git checkouts,
//! unpacked archives) owns a [`ScratchDir`]. The directory is removed when the
//! value is dropped. Live directories are also tracked in a process-wide
//! registry so an interrupt handler can remove them before the process exits.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::error::Result;

const PREFIX: &str = "deck-";

static LIVE: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// A temporary directory removed on drop
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl ScratchDir {
    /// Create a fresh scratch directory under the system temp dir
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir()?;
        let path = dir.path().to_path_buf();
        register(&path);
        tracing::debug!("Created scratch directory {}", path.display());
        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now, reporting failures
    pub fn close(mut self) -> Result<()> {
        unregister(&self.path);
        if let Some(dir) = self.dir.take() {
            dir.close()?;
        }
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        unregister(&self.path);
    }
}

fn register(path: &Path) {
    if let Ok(mut live) = LIVE.lock() {
        live.insert(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut live) = LIVE.lock() {
        live.remove(path);
    }
}

/// Remove every live scratch directory
///
/// Meant for interrupt handlers: the owning values are never dropped when the
/// process exits from a signal.
pub fn cleanup_scratch_dirs() {
    remove_live(|_| true);
}

fn remove_live(selected: impl Fn(&Path) -> bool) {
    let paths: Vec<PathBuf> = match LIVE.lock() {
        Ok(mut live) => {
            let paths: Vec<PathBuf> = live.iter().filter(|p| selected(p)).cloned().collect();
            for path in &paths {
                live.remove(path);
            }
            paths
        }
        Err(_) => return,
    };

    for path in paths {
        if let Err(e) = std::fs::remove_dir_all(&path) {
            tracing::warn!("Failed to remove scratch directory {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("file.yaml"), "kind: Pod").unwrap();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_close() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::create_dir_all(path.join("nested/dir")).unwrap();

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_registry_cleanup() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();
        assert!(LIVE.lock().unwrap().contains(&path));

        // Only touch our own directory, other tests run concurrently
        remove_live(|p| p == path);
        assert!(!path.exists());
        assert!(!LIVE.lock().unwrap().contains(&path));

        // Dropping afterwards must not fail even though the directory is gone
        drop(scratch);
    }
}
