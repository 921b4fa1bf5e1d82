//! Temporary audio files created during a session

use crate::speech::AudioFormat;
use crate::Result;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Append-only list of temp files, deleted in one sweep at shutdown
#[derive(Debug)]
pub struct TempFileRegistry {
    dir: PathBuf,
    paths: Mutex<Vec<PathBuf>>,
}

impl TempFileRegistry {
    /// Registry creating its files in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.paths.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create an empty file with the right extension and register it
    ///
    /// The file outlives its handle; only `cleanup` removes it.
    pub fn create(&self, format: AudioFormat) -> Result<PathBuf> {
        let suffix = format!(".{}", format.extension());
        let file = tempfile::Builder::new()
            .prefix("speakwave-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;

        debug!("Created temp file {}", path.display());
        self.register(path.clone());
        Ok(path)
    }

    /// Track a file created elsewhere
    pub fn register(&self, path: PathBuf) {
        self.lock().push(path);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the registered paths
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Delete every registered file and empty the registry
    ///
    /// Individual failures (already gone, permission denied) are skipped.
    /// Returns how many paths were attempted.
    pub fn cleanup(&self) -> usize {
        let paths = std::mem::take(&mut *self.lock());
        for path in &paths {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("{} already gone", path.display())
                }
                Err(e) => warn!("Could not remove {}: {}", path.display(), e),
            }
        }
        paths.len()
    }
}

impl Default for TempFileRegistry {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}
