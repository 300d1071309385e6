//! Chaptered video in, one tagged audio file per chapter out.
//!
//! **chaptersplit** handles the full pipeline: fetching metadata, audio, and
//! thumbnail (via yt-dlp), cutting each chapter without re-encoding and
//! cropping the cover (via ffmpeg), then writing title/artist/album and a
//! front cover onto every track (ID3v2.4).
//!
//! # Quick start
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> chaptersplit::Result<()> {
//! let report = chaptersplit::split("https://example.com/watch?v=abc").await?;
//! for video in &report.videos {
//!     for track in video.tracks() {
//!         println!("{}", track.path.display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub(crate) mod ffmpeg;
pub mod metadata;
pub mod pipeline;
pub mod resolve;
pub mod sanitize;
pub mod tagging;
pub mod timestamp;
pub mod types;
pub(crate) mod ytdlp;

pub use artifacts::{ArtifactSet, CleanupReport};
pub use backend::{MediaBackend, ToolBackend};
pub use config::{default_output_root, BatchPolicy, SplitOptions};
pub use error::{Error, Result, TagFailure};
pub use pipeline::{read_link_list, Pipeline, Stage, VideoFailure};
pub use tagging::{Id3Writer, TagWriter};
pub use timestamp::Timestamp;
pub use types::{BatchReport, Chapter, OutputTrack, TagSet, VideoMetadata, VideoOutcome};

/// Split one video with default options.
pub async fn split(link: &str) -> Result<BatchReport> {
    split_with_options(&[link.to_string()], SplitOptions::default()).await
}

/// Split every link with custom options, checking for yt-dlp and ffmpeg first.
pub async fn split_with_options(links: &[String], options: SplitOptions) -> Result<BatchReport> {
    let pipeline = Pipeline::new(options);
    ToolBackend::default().check_tools().await?;
    pipeline.run(links).await
}
