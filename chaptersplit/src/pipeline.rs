use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::artifacts::ArtifactSet;
use crate::backend::{MediaBackend, ToolBackend};
use crate::config::{BatchPolicy, SplitOptions};
use crate::error::{Error, Result};
use crate::extract::{extract_chapter, ChapterJob};
use crate::metadata::parse_metadata;
use crate::resolve::PathResolver;
use crate::tagging::{Id3Writer, TagWriter};
use crate::timestamp::{check_layout, compute_boundaries, Timestamp};
use crate::types::{BatchReport, CoverArt, LinkFailure, OutputTrack, VideoMetadata, VideoOutcome};

/// Where a video is in its processing.
///
/// A video that stops early ends in a [`VideoFailure`], which records the
/// last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    MetadataAcquired,
    ThumbnailAcquired,
    Segmenting(usize),
    Done,
}

/// Terminal failure of one video: why it stopped, and at which stage.
#[derive(Debug, thiserror::Error)]
#[error("failed at stage {stage:?}: {error}")]
pub struct VideoFailure {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

/// Drives videos from link to tagged chapter files, one at a time.
pub struct Pipeline<B = ToolBackend, W = Id3Writer> {
    backend: B,
    writer: W,
    options: SplitOptions,
}

impl Pipeline {
    /// Pipeline backed by yt-dlp, ffmpeg, and ID3 tags.
    pub fn new(options: SplitOptions) -> Self {
        let backend = ToolBackend::new(options.audio_extension.clone());
        Self::with_backend(backend, Id3Writer, options)
    }
}

impl<B: MediaBackend, W: TagWriter> Pipeline<B, W> {
    pub fn with_backend(backend: B, writer: W, options: SplitOptions) -> Self {
        Self {
            backend,
            writer,
            options,
        }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Process every link in order, then clean up intermediate artifacts
    /// unless the options ask to keep them.
    ///
    /// With [`BatchPolicy::FailFast`] the first failing video ends the batch
    /// and its error is returned; cleanup still runs.
    pub async fn run(&self, links: &[String]) -> Result<BatchReport> {
        let work_dir = self.options.resolve_work_dir();
        let mut artifacts = ArtifactSet::new();
        if !tokio::fs::try_exists(&work_dir).await? {
            tokio::fs::create_dir_all(&work_dir).await?;
            artifacts.push(&work_dir);
        }
        tokio::fs::create_dir_all(&self.options.output_root).await?;

        let mut report = BatchReport::default();
        let mut fatal = None;

        for link in links {
            match self.process_video(link, &mut artifacts).await {
                Ok(outcome) => report.videos.push(outcome),
                Err(failure) => match self.options.batch_policy {
                    BatchPolicy::FailFast => {
                        fatal = Some(failure.error);
                        break;
                    }
                    BatchPolicy::ContinueOnError => {
                        warn!(%link, "video failed, continuing with next link");
                        report.failures.push(LinkFailure {
                            link: link.clone(),
                            stage: failure.stage,
                            error: failure.error.to_string(),
                        });
                    }
                },
            }
        }

        if self.options.keep_artifacts {
            info!(count = artifacts.len(), dir = %work_dir.display(), "keeping intermediate files");
        } else {
            report.cleanup = artifacts.cleanup();
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Process a single video. Intermediate files are recorded in `artifacts`.
    pub async fn process_video(
        &self,
        link: &str,
        artifacts: &mut ArtifactSet,
    ) -> std::result::Result<VideoOutcome, VideoFailure> {
        let mut stage = Stage::Pending;
        let result = self.drive(link, artifacts, &mut stage).await;
        result.map_err(|error| {
            warn!(%link, ?stage, %error, "video processing failed");
            VideoFailure { stage, error }
        })
    }

    async fn drive(
        &self,
        link: &str,
        artifacts: &mut ArtifactSet,
        stage: &mut Stage,
    ) -> Result<VideoOutcome> {
        info!(%link, "processing video");
        let work_dir = self.options.resolve_work_dir();
        tokio::fs::create_dir_all(&work_dir).await?;

        let json = self.backend.fetch_metadata(link).await?;
        let meta = parse_metadata(&json)?;

        let directory = output_dir_for(&self.options.output_root, &meta.title);
        if tokio::fs::try_exists(&directory).await? {
            info!(dir = %directory.display(), "output folder exists, skipping");
            return Ok(VideoOutcome::Skipped {
                title: meta.title,
                directory,
            });
        }

        let boundaries = compute_boundaries(&meta.chapter_starts(), meta.duration)?;
        check_layout(&boundaries)?;
        advance(stage, Stage::MetadataAcquired);

        let dump_path = work_dir.join(format!("{}.json", meta.title));
        tokio::fs::write(&dump_path, &json).await?;
        artifacts.push(&dump_path);

        tokio::fs::create_dir_all(&directory).await?;
        let result = self
            .split(link, &meta, &boundaries, &work_dir, &directory, artifacts, stage)
            .await;

        if result.is_err() && tokio::fs::remove_dir(&directory).await.is_ok() {
            debug!(dir = %directory.display(), "removed empty output folder");
        }

        let tracks = result?;
        info!(title = %meta.title, tracks = tracks.len(), "finished splitting into tracks");
        Ok(VideoOutcome::Completed {
            title: meta.title,
            directory,
            tracks,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn split(
        &self,
        link: &str,
        meta: &VideoMetadata,
        boundaries: &[Timestamp],
        work_dir: &Path,
        directory: &Path,
        artifacts: &mut ArtifactSet,
        stage: &mut Stage,
    ) -> Result<Vec<OutputTrack>> {
        let audio = self.backend.fetch_audio(link, work_dir, &meta.title).await?;
        artifacts.push(&audio);

        let cover = self.acquire_cover(link, &meta.title, work_dir, artifacts).await?;
        advance(stage, Stage::ThumbnailAcquired);

        let mut resolver =
            PathResolver::new(self.options.audio_extension.clone(), self.options.max_duplicates);
        let mut tracks = Vec::with_capacity(meta.chapters.len());

        for (i, chapter) in meta.chapters.iter().enumerate() {
            advance(stage, Stage::Segmenting(i));
            info!(chapter = i + 1, total = meta.chapters.len(), title = %chapter.title, "splitting");

            let job = ChapterJob {
                index: i,
                start: boundaries[i],
                end: boundaries[i + 1],
                raw_title: &chapter.title,
                source: &audio,
                output_dir: directory,
                album: &meta.title,
                artist: &meta.artist,
                cover: &cover,
            };
            tracks.push(extract_chapter(&self.backend, &self.writer, &mut resolver, &job).await?);
        }

        advance(stage, Stage::Done);
        Ok(tracks)
    }

    async fn acquire_cover(
        &self,
        link: &str,
        title: &str,
        work_dir: &Path,
        artifacts: &mut ArtifactSet,
    ) -> Result<CoverArt> {
        let thumbnail = self.backend.fetch_thumbnail(link, work_dir, title).await?;
        artifacts.push(&thumbnail);

        let cover_path = work_dir.join(format!("{title}.cover.jpg"));
        artifacts.push(&cover_path);
        self.backend.crop_to_square(&thumbnail, &cover_path).await?;

        let data = tokio::fs::read(&cover_path).await.map_err(|e| {
            Error::Acquisition(format!(
                "trouble opening cover image {}: {e}",
                cover_path.display()
            ))
        })?;
        if data.is_empty() {
            return Err(Error::Acquisition(format!(
                "cover image {} is empty",
                cover_path.display()
            )));
        }

        Ok(CoverArt::new(data, CoverArt::mime_for_extension("jpg")))
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?stage, to = ?next, "stage transition");
    *stage = next;
}

/// Read a newline-delimited list of links, skipping blank lines.
pub fn read_link_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_link_list(&text))
}

fn parse_link_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Per-video output directory for a sanitized title.
pub fn output_dir_for(output_root: &Path, title: &str) -> PathBuf {
    output_root.join(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_list() {
        let text = "https://a.test/1\r\n\n  https://a.test/2  \n\n";
        assert_eq!(parse_link_list(text), ["https://a.test/1", "https://a.test/2"]);
    }

    #[test]
    fn test_parse_link_list_empty() {
        assert!(parse_link_list("\n\n").is_empty());
    }

    #[test]
    fn test_read_link_list_missing_file() {
        let result = read_link_list(Path::new("/nonexistent/links.txt"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_advance_updates_stage() {
        let mut stage = Stage::Pending;
        advance(&mut stage, Stage::Segmenting(2));
        assert_eq!(stage, Stage::Segmenting(2));
    }
}
