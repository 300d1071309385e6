use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// Intermediate files produced while processing videos.
///
/// Owned by the caller of the pipeline and threaded through every
/// acquisition step. Paths are only ever appended; [`ArtifactSet::cleanup`]
/// reads them once at the end of a run.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(path = %path.display(), "recorded artifact");
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every recorded artifact, newest first.
    ///
    /// Best-effort: failures are logged and collected, never returned as an
    /// error. Paths that are already gone count as removed. Directories are
    /// removed with their contents, so only record directories the run
    /// created itself.
    pub fn cleanup(self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for path in self.paths.into_iter().rev() {
            match remove_path(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) if e.kind() == ErrorKind::NotFound => report.removed.push(path),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to clean up artifact");
                    report.failed.push(CleanupFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of [`ArtifactSet::cleanup`].
#[derive(Debug, Default, Serialize)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
