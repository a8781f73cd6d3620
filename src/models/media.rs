//! Media entity models.
//!
//! A closed variant model: `Movie`, `Series` and `Episode` each embed
//! the shared `VideoBase`/`MediaBase` structs instead of inheriting
//! from them. Episodes are owned by their series and carry no back
//! reference; operations that need series context take the series as
//! a parameter.

use crate::models::files::{ImageFile, SubtitleFile, VideoFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Video codec as the catalog tags it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodec {
    Tv,
    BluRay,
    H264,
    H265,
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoCodec::Tv => write!(f, "TV"),
            VideoCodec::BluRay => write!(f, "BluRay"),
            VideoCodec::H264 => write!(f, "H264"),
            VideoCodec::H265 => write!(f, "H265"),
        }
    }
}

/// Video definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoDefinition {
    Sd,
    Hd,
}

impl std::fmt::Display for VideoDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoDefinition::Sd => write!(f, "SD"),
            VideoDefinition::Hd => write!(f, "HD"),
        }
    }
}

/// Display aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    Ratio4x3,
    Ratio16x9,
    Ratio21x9,
}

impl AspectRatio {
    /// Numeric form used in stream details.
    pub fn as_number(self) -> f32 {
        match self {
            AspectRatio::Ratio4x3 => 1.33,
            AspectRatio::Ratio16x9 => 1.78,
            AspectRatio::Ratio21x9 => 2.33,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AspectRatio::Ratio4x3 => write!(f, "4:3"),
            AspectRatio::Ratio16x9 => write!(f, "16:9"),
            AspectRatio::Ratio21x9 => write!(f, "21:9"),
        }
    }
}

/// A crew member (director or writer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
}

/// A cast member, optionally scoped to a season of a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: String,
    pub order: u32,
    /// Season the actor appears in; `None` means the whole run.
    pub season: Option<u32>,
}

/// A declared audio stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioStream {
    pub language: String,
    pub codec: String,
    pub channels: u32,
}

/// A declared subtitle stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitleStream {
    pub language: String,
    pub forced: bool,
    /// Source path of an external subtitle file, when one exists.
    pub source_path: String,
}

/// Fields shared by every media entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaBase {
    pub id: String,
    pub title: String,
    pub title_sort: String,
    pub title_original: String,
    /// User-assigned grouping label; empty when ungrouped.
    pub media_group: String,
    pub rating: Option<f32>,
    pub publishing_year: Option<u16>,
    /// Full release date (YYYY-MM-DD), empty when unknown.
    pub publishing_date: String,
    pub plot: String,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    pub country: String,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub images: Vec<ImageFile>,
    /// Language variants this entry is published in, ISO codes.
    /// Never empty once decoding and fallback have run.
    pub media_languages: Vec<String>,
    /// Published folder/file stem, derived from title and year.
    pub filename: String,
}

impl MediaBase {
    /// Recompute the published filename from title and year.
    pub fn derive_filename(&mut self) {
        self.filename =
            crate::generators::filename::media_filename(&self.title, self.publishing_year);
    }
}

/// Fields shared by movies, series and episodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoBase {
    pub base: MediaBase,
    pub mpaa: String,
    pub play_count: u32,
    /// Date last played (YYYY-MM-DD), empty when never played.
    pub play_date: String,
    pub imdb_id: String,
    pub tmdb_id: String,
    pub directors: Vec<Person>,
    pub writers: Vec<Person>,
    pub actors: Vec<Actor>,
    pub video_codec: Option<VideoCodec>,
    pub video_definition: Option<VideoDefinition>,
    pub aspect_ratio: Option<AspectRatio>,
    pub audio_streams: Vec<AudioStream>,
    pub subtitle_streams: Vec<SubtitleStream>,
}

/// A movie entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movie {
    pub video: VideoBase,
    /// Ordered physical parts; at least one for a publishable movie.
    pub files: Vec<VideoFile>,
    pub subtitles: Vec<SubtitleFile>,
}

/// One episode of a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Episode {
    pub video: VideoBase,
    /// Physical season; 0 means special.
    pub actual_season: u32,
    /// Position within the physical season.
    pub actual_episode: u32,
    /// Season shown in the library UI; specials may display inline
    /// within a real season.
    pub display_season: u32,
    pub display_episode: u32,
    pub is_special: bool,
    pub files: Vec<VideoFile>,
    pub subtitles: Vec<SubtitleFile>,
}

/// A series entry with its episodes and season bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    pub video: VideoBase,
    pub episodes: Vec<Episode>,
    pub number_of_total_episodes: u32,
    /// Excludes specials.
    pub number_of_episodes: u32,
    pub number_of_specials: u32,
    /// Episode count per physical season; index 0 counts specials.
    pub episodes_per_season: Vec<u32>,
}

/// A top-level library entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MediaItem {
    Movie(Movie),
    Series(Series),
}

impl Episode {
    /// Servers this episode's files resolve to.
    pub fn servers(&self) -> BTreeSet<usize> {
        let mut set = BTreeSet::new();
        set.extend(self.files.iter().filter_map(|f| f.file.server));
        set.extend(self.subtitles.iter().filter_map(|s| s.file.server));
        set.extend(self.video.base.images.iter().filter_map(|i| i.file.server));
        set
    }
}

impl Movie {
    /// Servers this movie's files resolve to. Derived, never stored.
    pub fn servers(&self) -> BTreeSet<usize> {
        let mut set = BTreeSet::new();
        set.extend(self.files.iter().filter_map(|f| f.file.server));
        set.extend(self.subtitles.iter().filter_map(|s| s.file.server));
        set.extend(self.video.base.images.iter().filter_map(|i| i.file.server));
        set
    }

    /// Whether any owned part is tagged as special/extra material.
    pub fn has_specials(&self) -> bool {
        self.files.iter().any(|f| f.is_special)
    }
}

impl Series {
    /// Servers this series' files resolve to, unioned over episodes.
    pub fn servers(&self) -> BTreeSet<usize> {
        let mut set: BTreeSet<usize> = self
            .video
            .base
            .images
            .iter()
            .filter_map(|i| i.file.server)
            .collect();
        for episode in &self.episodes {
            set.extend(episode.servers());
        }
        set
    }

    /// Recompute episode counters from the owned episodes, keeping the
    /// per-season invariant intact after filtering or merging.
    pub fn recount(&mut self) {
        self.number_of_total_episodes = self.episodes.len() as u32;
        self.number_of_specials = self.episodes.iter().filter(|e| e.is_special).count() as u32;
        self.number_of_episodes = self.number_of_total_episodes - self.number_of_specials;

        let max_season = self
            .episodes
            .iter()
            .map(|e| e.actual_season)
            .max()
            .unwrap_or(0);
        let mut per_season = vec![0u32; max_season as usize + 1];
        for episode in &self.episodes {
            per_season[episode.actual_season as usize] += 1;
        }
        self.episodes_per_season = per_season;
    }

    /// Highest physical season among the owned episodes.
    pub fn max_season(&self) -> u32 {
        self.episodes
            .iter()
            .map(|e| e.actual_season)
            .max()
            .unwrap_or(0)
    }
}

impl MediaItem {
    pub fn video(&self) -> &VideoBase {
        match self {
            MediaItem::Movie(m) => &m.video,
            MediaItem::Series(s) => &s.video,
        }
    }

    pub fn video_mut(&mut self) -> &mut VideoBase {
        match self {
            MediaItem::Movie(m) => &mut m.video,
            MediaItem::Series(s) => &mut s.video,
        }
    }

    pub fn title(&self) -> &str {
        &self.video().base.title
    }

    pub fn servers(&self) -> BTreeSet<usize> {
        match self {
            MediaItem::Movie(m) => m.servers(),
            MediaItem::Series(s) => s.servers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::FileBase;

    fn video_file_on(server: usize) -> VideoFile {
        VideoFile {
            file: FileBase {
                server: Some(server),
                filename: "part.mkv".to_string(),
                ..Default::default()
            },
            is_special: false,
        }
    }

    #[test]
    fn test_movie_servers_derived_from_files() {
        let movie = Movie {
            files: vec![video_file_on(0), video_file_on(2), video_file_on(0)],
            ..Default::default()
        };
        let servers: Vec<usize> = movie.servers().into_iter().collect();
        assert_eq!(servers, vec![0, 2]);
    }

    #[test]
    fn test_series_servers_union_over_episodes() {
        let mut series = Series::default();
        series.episodes.push(Episode {
            files: vec![video_file_on(1)],
            ..Default::default()
        });
        series.episodes.push(Episode {
            files: vec![video_file_on(3)],
            ..Default::default()
        });
        let servers: Vec<usize> = series.servers().into_iter().collect();
        assert_eq!(servers, vec![1, 3]);
    }

    #[test]
    fn test_recount_per_season_invariant() {
        let mut series = Series::default();
        for (season, special) in [(1, false), (1, false), (0, true), (2, false)] {
            series.episodes.push(Episode {
                actual_season: season,
                is_special: special,
                ..Default::default()
            });
        }
        series.recount();
        assert_eq!(series.number_of_total_episodes, 4);
        assert_eq!(series.number_of_episodes, 3);
        assert_eq!(series.number_of_specials, 1);
        assert_eq!(series.episodes_per_season, vec![1, 2, 1]);
    }
}
