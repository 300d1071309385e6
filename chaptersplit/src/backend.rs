//! External collaborators the pipeline drives.
//!
//! [`MediaBackend`] has one method per external operation so the pipeline
//! can run against an in-memory fake in tests. [`ToolBackend`] is the real
//! implementation on top of the `yt-dlp` and `ffmpeg` binaries.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::timestamp::Timestamp;
use crate::{ffmpeg, ytdlp};

#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    /// Fetch the metadata dump (JSON text) for `link`.
    async fn fetch_metadata(&self, link: &str) -> Result<String>;

    /// Download the audio of `link` into `work_dir`, named after `stem`.
    async fn fetch_audio(&self, link: &str, work_dir: &Path, stem: &str) -> Result<PathBuf>;

    /// Download the thumbnail of `link` into `work_dir`, named after `stem`.
    async fn fetch_thumbnail(&self, link: &str, work_dir: &Path, stem: &str) -> Result<PathBuf>;

    /// Write a square crop of `image` to `dest`.
    async fn crop_to_square(&self, image: &Path, dest: &Path) -> Result<()>;

    /// Copy `[start, end)` of `source` into `dest`.
    async fn extract_range(
        &self,
        source: &Path,
        start: Timestamp,
        end: Timestamp,
        dest: &Path,
    ) -> Result<()>;
}

/// Backend that shells out to `yt-dlp` and `ffmpeg`.
#[derive(Debug, Clone)]
pub struct ToolBackend {
    audio_format: String,
}

impl ToolBackend {
    pub fn new(audio_format: impl Into<String>) -> Self {
        Self {
            audio_format: audio_format.into(),
        }
    }

    /// Fail early with [`crate::Error::ToolNotFound`] when a binary is missing.
    pub async fn check_tools(&self) -> Result<()> {
        ytdlp::check_installed().await?;
        ffmpeg::check_installed().await
    }
}

impl Default for ToolBackend {
    fn default() -> Self {
        Self::new("mp3")
    }
}

impl MediaBackend for ToolBackend {
    async fn fetch_metadata(&self, link: &str) -> Result<String> {
        ytdlp::dump_metadata(link).await
    }

    async fn fetch_audio(&self, link: &str, work_dir: &Path, stem: &str) -> Result<PathBuf> {
        ytdlp::download_audio(link, work_dir, stem, &self.audio_format).await
    }

    async fn fetch_thumbnail(&self, link: &str, work_dir: &Path, stem: &str) -> Result<PathBuf> {
        ytdlp::download_thumbnail(link, work_dir, stem).await
    }

    async fn crop_to_square(&self, image: &Path, dest: &Path) -> Result<()> {
        ffmpeg::crop_to_square(image, dest).await
    }

    async fn extract_range(
        &self,
        source: &Path,
        start: Timestamp,
        end: Timestamp,
        dest: &Path,
    ) -> Result<()> {
        ffmpeg::extract_range(source, start, end, dest).await
    }
}
