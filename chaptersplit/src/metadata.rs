use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sanitize::sanitize_non_empty;
use crate::types::{Chapter, VideoMetadata};

/// The subset of `yt-dlp --dump-json` output the pipeline reads.
#[derive(Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    chapters: Option<Vec<YtDlpChapter>>,
}

#[derive(Deserialize)]
struct YtDlpChapter {
    title: Option<String>,
    start_time: f64,
}

/// Parse a metadata dump into [`VideoMetadata`].
///
/// The title is sanitized here because it becomes a directory name. A
/// video without chapters yields one chapter spanning the whole video,
/// named after the video.
pub fn parse_metadata(json: &str) -> Result<VideoMetadata> {
    let info: YtDlpInfo = serde_json::from_str(json)
        .map_err(|e| Error::Acquisition(format!("malformed metadata dump: {e}")))?;

    let raw_title = info
        .title
        .ok_or_else(|| Error::Acquisition("metadata has no title".into()))?;
    let title = sanitize_non_empty(&raw_title)?;

    let artist = info
        .channel
        .or(info.uploader)
        .ok_or_else(|| Error::Acquisition("metadata has no channel or uploader".into()))?;

    let duration = info
        .duration
        .ok_or_else(|| Error::Acquisition("metadata has no duration".into()))?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(Error::InvalidDuration(format!("video duration {duration}")));
    }

    let mut chapters: Vec<Chapter> = info
        .chapters
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, c)| Chapter {
            title: c.title.unwrap_or_else(|| format!("Chapter {}", i + 1)),
            start: c.start_time,
        })
        .collect();

    if chapters.is_empty() {
        debug!(%title, "no chapters, treating the whole video as one track");
        chapters.push(Chapter {
            title: title.clone(),
            start: 0.0,
        });
    }

    Ok(VideoMetadata {
        title,
        artist,
        duration,
        chapters,
    })
}
