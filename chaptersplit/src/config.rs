use std::path::{Path, PathBuf};

/// Default parent directory for per-video output when no link list is used.
pub const DEFAULT_OUTPUT_ROOT: &str = "download";

/// Default cap on " copy" markers appended while resolving a track path.
pub const DEFAULT_MAX_DUPLICATES: usize = 100;

/// What to do when one video in a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop at the first failing video and return its error.
    #[default]
    FailFast,
    /// Record the failure in the batch report and move on to the next link.
    ContinueOnError,
}

/// Builder for pipeline options.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Parent of the per-video output directories.
    pub output_root: PathBuf,
    /// Where downloads, metadata dumps, and thumbnails go.
    pub work_dir: Option<PathBuf>,
    /// Retain intermediate artifacts instead of deleting them at the end.
    pub keep_artifacts: bool,
    pub max_duplicates: usize,
    /// Container extension of the produced tracks.
    pub audio_extension: String,
    pub batch_policy: BatchPolicy,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            work_dir: None,
            keep_artifacts: false,
            max_duplicates: DEFAULT_MAX_DUPLICATES,
            audio_extension: "mp3".into(),
            batch_policy: BatchPolicy::FailFast,
        }
    }
}

impl SplitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_root = dir.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    pub fn max_duplicates(mut self, max: usize) -> Self {
        self.max_duplicates = max;
        self
    }

    pub fn audio_extension(mut self, ext: impl Into<String>) -> Self {
        self.audio_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }

    /// Resolve the work directory, defaulting to ~/.cache/chaptersplit/tmp.
    pub fn resolve_work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|d| d.join("chaptersplit"))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tmp")
        })
    }
}

/// Output root for a run: the link list's path without its extension, or
/// [`DEFAULT_OUTPUT_ROOT`] for a single link.
pub fn default_output_root(link_list: Option<&Path>) -> PathBuf {
    match link_list {
        Some(path) => path.with_extension(""),
        None => PathBuf::from(DEFAULT_OUTPUT_ROOT),
    }
}
