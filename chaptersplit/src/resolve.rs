use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Appended to a track name each time its path is already taken.
pub const COPY_MARKER: &str = " copy";

/// Finds collision-free output paths.
///
/// A path counts as taken when something exists there on disk or when this
/// resolver already handed it out. Nothing is created or reserved on disk;
/// a concurrent writer can still race between resolution and creation.
#[derive(Debug)]
pub struct PathResolver {
    extension: String,
    max_duplicates: usize,
    claimed: HashSet<PathBuf>,
}

impl PathResolver {
    pub fn new(extension: impl Into<String>, max_duplicates: usize) -> Self {
        Self {
            extension: extension.into(),
            max_duplicates,
            claimed: HashSet::new(),
        }
    }

    /// Resolve `directory/base_name.<ext>`, appending [`COPY_MARKER`] until
    /// a free path is found.
    ///
    /// Fails with [`Error::TooManyDuplicates`] after `max_duplicates` markers.
    pub fn resolve(&mut self, directory: &Path, base_name: &str) -> Result<PathBuf> {
        let mut name = base_name.to_string();

        for _ in 0..=self.max_duplicates {
            let candidate = directory.join(format!("{name}.{}", self.extension));
            if !candidate.exists() && !self.claimed.contains(&candidate) {
                debug!(path = %candidate.display(), "resolved output path");
                self.claimed.insert(candidate.clone());
                return Ok(candidate);
            }
            name.push_str(COPY_MARKER);
        }

        Err(Error::TooManyDuplicates {
            path: directory.join(format!("{base_name}.{}", self.extension)),
            limit: self.max_duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_free_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolver = PathResolver::new("mp3", 10);
        let path = resolver.resolve(tmp.path(), "Intro").unwrap();
        assert_eq!(path, tmp.path().join("Intro.mp3"));
    }

    #[test]
    fn test_resolve_existing_file_gets_marker() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Track.mp3"), b"x").unwrap();

        let mut resolver = PathResolver::new("mp3", 10);
        let path = resolver.resolve(tmp.path(), "Track").unwrap();
        assert_eq!(path, tmp.path().join("Track copy.mp3"));
        assert!(!path.exists());
    }

    #[test]
    fn test_resolve_collision_chain() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Track.mp3"), b"x").unwrap();
        fs::write(tmp.path().join("Track copy.mp3"), b"x").unwrap();
        fs::write(tmp.path().join("Track copy copy.mp3"), b"x").unwrap();

        let mut resolver = PathResolver::new("mp3", 10);
        let path = resolver.resolve(tmp.path(), "Track").unwrap();
        assert_eq!(path, tmp.path().join("Track copy copy copy.mp3"));
    }

    #[test]
    fn test_resolve_twice_without_creating_gives_distinct_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolver = PathResolver::new("mp3", 10);
        let first = resolver.resolve(tmp.path(), "Track").unwrap();
        let second = resolver.resolve(tmp.path(), "Track").unwrap();
        assert_ne!(first, second);
        assert!(!first.exists());
        assert!(!second.exists());
    }

    #[test]
    fn test_resolve_cap_reached() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Track.mp3"), b"x").unwrap();
        fs::write(tmp.path().join("Track copy.mp3"), b"x").unwrap();

        let mut resolver = PathResolver::new("mp3", 1);
        let err = resolver.resolve(tmp.path(), "Track").unwrap_err();
        assert!(matches!(err, Error::TooManyDuplicates { limit: 1, .. }));
    }

    #[test]
    fn test_resolve_zero_cap_allows_free_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolver = PathResolver::new("mp3", 0);
        assert!(resolver.resolve(tmp.path(), "Only").is_ok());
        assert!(resolver.resolve(tmp.path(), "Only").is_err());
    }

    #[test]
    fn test_resolve_uses_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolver = PathResolver::new("m4a", 10);
        let path = resolver.resolve(tmp.path(), "Song").unwrap();
        assert_eq!(path.extension().unwrap(), "m4a");
    }
}
