use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};
use tracing::debug;

use crate::error::TagFailure;
use crate::types::TagSet;

/// Writes title/artist/album and a front cover onto an audio file.
pub trait TagWriter {
    fn write_tags(&self, path: &Path, tags: &TagSet) -> std::result::Result<(), TagFailure>;
}

/// ID3v2.4 tag writer for MP3 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3Writer;

impl Id3Writer {
    const COVER_DESCRIPTION: &'static str = "Front cover";
}

impl TagWriter for Id3Writer {
    fn write_tags(&self, path: &Path, tags: &TagSet) -> std::result::Result<(), TagFailure> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext != "mp3" {
            return Err(TagFailure::UnsupportedContainer(if ext.is_empty() {
                "no file extension".into()
            } else {
                ext
            }));
        }

        if tags.cover.is_empty() {
            return Err(TagFailure::MissingCover);
        }

        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
            Err(e) => return Err(TagFailure::Unreadable(e.to_string())),
        };

        tag.set_title(tags.title.as_str());
        tag.set_artist(tags.artist.as_str());
        tag.set_album(tags.album.as_str());
        tag.remove_picture_by_type(PictureType::CoverFront);
        tag.add_frame(Picture {
            mime_type: tags.cover.mime_type.clone(),
            picture_type: PictureType::CoverFront,
            description: Self::COVER_DESCRIPTION.to_string(),
            data: tags.cover.data.clone(),
        });

        tag.write_to_path(path, Version::Id3v24)
            .map_err(|e| TagFailure::Unwritable(e.to_string()))?;

        debug!(path = %path.display(), title = %tags.title, "tags written");
        Ok(())
    }
}
