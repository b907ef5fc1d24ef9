use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;

/// File extension of every artifact written by the harness.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Names and locates checkpoint files inside one artifact directory.
///
/// Checkpoint ids come from a counter owned by the store. It starts at the
/// number of entries already present so earlier runs are not overwritten,
/// then increases by one per checkpoint. The directory is assumed to have a
/// single writer.
#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    next_id: AtomicUsize,
}

impl ArtifactStore {
    /// Creates `dir` if needed and seeds the id counter from its contents.
    pub fn open(dir: impl Into<PathBuf>) -> Result<ArtifactStore> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let existing = std::fs::read_dir(&dir)?.count();
        tracing::debug!(dir = %dir.display(), existing, "opened artifact directory");
        Ok(ArtifactStore { dir, next_id: AtomicUsize::new(existing) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fresh checkpoint path `{dir}/{run_name}_{id}.json`.
    pub fn next_checkpoint_path(&self, run_name: &str) -> PathBuf {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("{run_name}_{id}.{ARTIFACT_EXTENSION}"))
    }

    /// Path of the best-of-experiment model, `{dir}/{run_name}_best.json`.
    pub fn best_path(&self, run_name: &str) -> PathBuf {
        self.dir.join(format!("{run_name}_best.{ARTIFACT_EXTENSION}"))
    }
}
