use std::path::PathBuf;

/// Why writing tags onto an extracted track failed.
///
/// Kept separate from extraction failures: the audio file exists and is
/// playable, it just carries no (or partial) metadata.
#[derive(Debug, thiserror::Error)]
pub enum TagFailure {
    #[error("cover image bytes are missing")]
    MissingCover,

    #[error("could not read audio container: {0}")]
    Unreadable(String),

    #[error("could not write audio container: {0}")]
    Unwritable(String),

    #[error("unsupported container format: {0}")]
    UnsupportedContainer(String),
}

/// All errors that can occur in chaptersplit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("acquisition failed: {0}")]
    Acquisition(String),

    #[error("invalid link (must start with http:// or https://): {0}")]
    InvalidLink(String),

    #[error("{tool} not found: install it and make sure it is on PATH")]
    ToolNotFound { tool: &'static str },

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid chapter layout: {0}")]
    InvalidChapterLayout(String),

    #[error("name is empty after removing unsafe characters: \"{original}\"")]
    EmptyNameAfterSanitization { original: String },

    #[error("chapter title has no usable characters: \"{raw}\"")]
    InvalidTrackName { raw: String },

    #[error("extraction of {path} failed: {diagnostic}")]
    ExtractionFailed { path: PathBuf, diagnostic: String },

    #[error("tagging {path} failed: {cause}")]
    TaggingFailed { path: PathBuf, cause: TagFailure },

    #[error("more than {limit} duplicates of {path}")]
    TooManyDuplicates { path: PathBuf, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of characters of collaborator output kept in an error.
pub(crate) const MAX_DIAGNOSTIC_CHARS: usize = 1000;

/// Trim subprocess stderr down to something that fits in an error message.
///
/// Tools print warnings first and the fatal message last, so the tail is
/// what gets kept.
pub(crate) fn diagnostic(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let excess = text.chars().count().saturating_sub(MAX_DIAGNOSTIC_CHARS);
    text.chars().skip(excess).collect::<String>().trim_start().to_string()
}
