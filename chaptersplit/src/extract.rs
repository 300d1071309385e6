use std::path::Path;

use tracing::info;

use crate::backend::MediaBackend;
use crate::error::{Error, Result};
use crate::resolve::PathResolver;
use crate::sanitize::sanitize;
use crate::tagging::TagWriter;
use crate::timestamp::Timestamp;
use crate::types::{CoverArt, OutputTrack, TagSet};

/// Inputs for cutting and tagging one chapter.
#[derive(Debug, Clone, Copy)]
pub struct ChapterJob<'a> {
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub raw_title: &'a str,
    pub source: &'a Path,
    pub output_dir: &'a Path,
    pub album: &'a str,
    pub artist: &'a str,
    pub cover: &'a CoverArt,
}

/// Cut one chapter out of the source audio and tag it.
///
/// On [`Error::TaggingFailed`] the extracted file is left on disk untagged.
pub async fn extract_chapter<B, W>(
    backend: &B,
    writer: &W,
    resolver: &mut PathResolver,
    job: &ChapterJob<'_>,
) -> Result<OutputTrack>
where
    B: MediaBackend,
    W: TagWriter,
{
    let name = sanitize(job.raw_title).trim().to_string();
    if name.is_empty() {
        return Err(Error::InvalidTrackName {
            raw: job.raw_title.to_string(),
        });
    }

    let path = resolver.resolve(job.output_dir, &name)?;

    backend
        .extract_range(job.source, job.start, job.end, &path)
        .await?;

    let tags = TagSet {
        title: name.clone(),
        artist: job.artist.to_string(),
        album: job.album.to_string(),
        cover: job.cover.clone(),
    };

    writer
        .write_tags(&path, &tags)
        .map_err(|cause| Error::TaggingFailed {
            path: path.clone(),
            cause,
        })?;

    info!(index = job.index, path = %path.display(), "track written");

    Ok(OutputTrack {
        index: job.index,
        name,
        path,
        start: job.start,
        end: job.end,
        tags,
    })
}
