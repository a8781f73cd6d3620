//! Media file models.
//!
//! One variant per file hierarchy member: video parts, artwork
//! images, subtitle files. Files never point back at the media that
//! owns them; the owning entity is always in scope where a file is
//! handled.

use crate::core::subtitles::SrtDocument;
use serde::{Deserialize, Serialize};

/// Artwork image classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImageKind {
    CoverFront,
    CoverBack,
    Poster,
    Backdrop,
    SeasonCover,
    SeasonPoster,
    SeasonBackdrop,
    EpisodeCover,
    ExtraBackdrop,
    ExtraCover,
    Unknown,
}

impl ImageKind {
    /// Whether this is one of the four base (series/movie level) kinds.
    pub fn is_base(self) -> bool {
        matches!(
            self,
            ImageKind::CoverFront | ImageKind::CoverBack | ImageKind::Poster | ImageKind::Backdrop
        )
    }

    /// The season-scoped counterpart of a base kind, used when a
    /// member series is folded into a media group.
    pub fn season_kind(self) -> Option<ImageKind> {
        match self {
            ImageKind::Backdrop => Some(ImageKind::SeasonBackdrop),
            ImageKind::CoverFront => Some(ImageKind::SeasonCover),
            ImageKind::Poster => Some(ImageKind::SeasonPoster),
            _ => None,
        }
    }

    /// Filename token for this kind.
    pub fn token(self) -> &'static str {
        match self {
            ImageKind::CoverFront => "coverfront",
            ImageKind::CoverBack => "coverback",
            ImageKind::Poster => "poster",
            ImageKind::Backdrop => "backdrop",
            ImageKind::SeasonCover => "cover",
            ImageKind::SeasonPoster => "poster",
            ImageKind::SeasonBackdrop => "backdrop",
            ImageKind::EpisodeCover => "episodecover",
            ImageKind::ExtraBackdrop => "extrabackdrop",
            ImageKind::ExtraCover => "extracover",
            ImageKind::Unknown => "image",
        }
    }
}

/// Season scoping of an artwork image or an actor record.
///
/// The catalog encodes these as `-1` (all seasons), `0` (specials),
/// a positive season number, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeasonScope {
    #[default]
    Unscoped,
    AllSeasons,
    Specials,
    Season(u32),
}

impl SeasonScope {
    /// Shift a numeric season by `offset`; all other scopes are fixed.
    pub fn shifted(self, offset: u32) -> SeasonScope {
        match self {
            SeasonScope::Season(n) => SeasonScope::Season(n + offset),
            other => other,
        }
    }
}

/// Fields shared by every media file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileBase {
    /// Free-text description from the catalog link entry.
    pub description: String,
    /// Path or URL as the catalog recorded it.
    pub source_path: String,
    /// Resolved path on the owning server's filesystem.
    pub local_path: String,
    /// Published filename, extension-qualified. Empty means the file
    /// is excluded from publication.
    pub filename: String,
    /// Normalized extension.
    pub extension: String,
    /// Index of the server the file resolved to.
    pub server: Option<usize>,
    /// Language tags carried by the file, ISO codes.
    pub languages: Vec<String>,
}

impl FileBase {
    /// Whether the file takes part in publication.
    pub fn is_published(&self) -> bool {
        !self.filename.is_empty()
    }

    /// Whether the file carries the given language, treating an
    /// untagged file as language-neutral.
    pub fn has_language(&self, code: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == code)
    }
}

/// A physical video file ("part") of a movie or episode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoFile {
    pub file: FileBase,
    /// Extra/bonus material, published into the specials partition.
    pub is_special: bool,
}

/// An artwork image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageFile {
    pub file: FileBase,
    pub kind: ImageKind,
    pub season: SeasonScope,
    /// Ordinal among images of the same kind (extra fanart slots).
    pub index: u32,
}

impl Default for ImageKind {
    fn default() -> Self {
        ImageKind::Unknown
    }
}

/// A subtitle file with its parsed SRT content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitleFile {
    pub file: FileBase,
    /// ISO code of the subtitle language.
    pub language: String,
    /// Forced-subtitles track.
    pub forced: bool,
    /// Parsed entries, present once the source file has been read.
    pub document: Option<SrtDocument>,
}
