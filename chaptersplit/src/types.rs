use std::path::PathBuf;

use serde::Serialize;

use crate::artifacts::CleanupReport;
use crate::pipeline::Stage;
use crate::timestamp::Timestamp;

/// A named sub-range of a video, starting at `start` seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    /// Title as published; may contain characters unsafe for file names.
    pub title: String,
    pub start: f64,
}

/// Everything the pipeline needs to know about one video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    /// Video title, already sanitized.
    pub title: String,
    /// Channel name.
    pub artist: String,
    /// Total duration in seconds.
    pub duration: f64,
    pub chapters: Vec<Chapter>,
}

impl VideoMetadata {
    pub fn chapter_starts(&self) -> Vec<f64> {
        self.chapters.iter().map(|c| c.start).collect()
    }
}

/// Encoded cover image plus its MIME type.
#[derive(Debug, Clone, Default)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl CoverArt {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Guess the MIME type from an image file extension. Falls back to JPEG.
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "image/jpeg",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Metadata written onto one track.
#[derive(Debug, Clone, Serialize)]
pub struct TagSet {
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(skip)]
    pub cover: CoverArt,
}

/// One extracted and tagged chapter.
#[derive(Debug, Clone, Serialize)]
pub struct OutputTrack {
    /// Zero-based chapter index.
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
    pub start: Timestamp,
    pub end: Timestamp,
    pub tags: TagSet,
}

/// What happened to a single video.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoOutcome {
    /// The output directory already existed; nothing was downloaded.
    Skipped { title: String, directory: PathBuf },
    Completed {
        title: String,
        directory: PathBuf,
        tracks: Vec<OutputTrack>,
    },
}

impl VideoOutcome {
    pub fn title(&self) -> &str {
        match self {
            VideoOutcome::Skipped { title, .. } | VideoOutcome::Completed { title, .. } => title,
        }
    }

    pub fn tracks(&self) -> &[OutputTrack] {
        match self {
            VideoOutcome::Skipped { .. } => &[],
            VideoOutcome::Completed { tracks, .. } => tracks,
        }
    }
}

/// A link whose processing failed while the batch kept going.
#[derive(Debug, Clone, Serialize)]
pub struct LinkFailure {
    pub link: String,
    /// Last stage the video reached before failing.
    pub stage: Stage,
    pub error: String,
}

/// Result of processing a list of links.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub videos: Vec<VideoOutcome>,
    pub failures: Vec<LinkFailure>,
    pub cleanup: CleanupReport,
}

impl BatchReport {
    pub fn track_count(&self) -> usize {
        self.videos.iter().map(|v| v.tracks().len()).sum()
    }

    /// Format as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
