//! Catalog entry builder.
//!
//! Classifies each export entry as movie or series and builds the
//! entity graph: field extraction with permissive defaults, tag
//! decoding, crew role filtering, stream declarations, file and
//! artwork resolution, and the discs-to-episodes hierarchy with its
//! season bookkeeping.

use crate::core::export::ExportNode;
use crate::core::images::read_images;
use crate::core::resolve::{qualify_filename, resolve_file};
use crate::core::storage::StorageMap;
use crate::core::tags::TagDecoder;
use crate::models::config::Settings;
use crate::models::files::{FileBase, SeasonScope, SubtitleFile, VideoFile};
use crate::models::media::{
    Actor, AspectRatio, AudioStream, Episode, MediaItem, Movie, Person, Series, SubtitleStream,
    VideoBase, VideoDefinition,
};
use crate::Result;
use std::collections::HashMap;

/// Outcome of classifying one export entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Movie,
    Series,
    Unclassified,
}

/// What the builder produced over a whole export.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub items: Vec<MediaItem>,
    /// Titles of entries carrying neither classification field.
    pub unclassified: Vec<String>,
    /// Titles and messages of entries that failed resolution.
    pub failed: Vec<(String, String)>,
}

fn is_yes(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("ja")
}

/// Classify an entry by its user-defined fields.
pub fn classify(entry: &ExportNode) -> Classification {
    let mut movie = false;
    let mut series = false;
    if let Some(fields) = entry.child("userfields") {
        for field in fields.children_named("field") {
            match field.attr("name", "").as_str() {
                "XBMC Movie" if is_yes(&field.text) => movie = true,
                "XBMC Serie" if is_yes(&field.text) => series = true,
                _ => {}
            }
        }
    }
    if movie {
        Classification::Movie
    } else if series {
        Classification::Series
    } else {
        Classification::Unclassified
    }
}

/// Builds entities out of export entries.
#[derive(Debug)]
pub struct CatalogBuilder<'a> {
    settings: &'a Settings,
    storage: &'a StorageMap,
    decoder: TagDecoder,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(settings: &'a Settings, storage: &'a StorageMap) -> Self {
        Self {
            settings,
            storage,
            decoder: TagDecoder::new(settings),
        }
    }

    /// Build all entries under the export root. One bad entry never
    /// aborts the batch; it is logged and reported.
    pub fn build(&self, root: &ExportNode) -> BuildReport {
        let mut report = BuildReport::default();

        let movies = root.child("movies");
        let entries: Vec<&ExportNode> = movies
            .map(|m| m.children_named("movie").collect())
            .unwrap_or_default();

        for entry in entries {
            let raw_title = entry.text_of("title", "");
            match classify(entry) {
                Classification::Unclassified => {
                    tracing::warn!("skipped unclassified catalog entry: {raw_title}");
                    report.unclassified.push(raw_title);
                }
                Classification::Movie => match self.build_movie(entry) {
                    Ok(movie) => report.items.push(MediaItem::Movie(movie)),
                    Err(e) => {
                        tracing::warn!("skipped movie '{raw_title}': {e}");
                        report.failed.push((raw_title, e.to_string()));
                    }
                },
                Classification::Series => match self.build_series(entry) {
                    Ok(series) => report.items.push(MediaItem::Series(series)),
                    Err(e) => {
                        tracing::warn!("skipped series '{raw_title}': {e}");
                        report.failed.push((raw_title, e.to_string()));
                    }
                },
            }
        }

        report
    }

    /// Shared fields of movies, series and episodes.
    fn build_video_base(&self, entry: &ExportNode) -> VideoBase {
        let mut video = VideoBase::default();

        let (title, tags) = self.decoder.decode(&entry.text_of("title", ""));
        video.base.title = title.clone();
        let (title_sort, _) = self.decoder.decode(&entry.text_of("titlesort", &title));
        video.base.title_sort = title_sort;
        video.base.title_original = entry.text_of("originaltitle", &title);
        video.base.media_group = entry.text_of("series", "");
        video.base.id = entry.attr("id", "");

        video.base.rating = entry.text_of("imdbrating", "").parse().ok();
        video.base.publishing_year = entry.text_of("year", "").parse().ok();
        video.base.publishing_date = entry.text_of("releasedate", "");
        video.base.plot = entry.text_of("plot", "");
        video.base.runtime = entry.text_of("runtime", "").parse().ok();
        video.base.country = entry.text_of("country", "");
        video.imdb_id = entry.text_of("imdbid", "");
        video.tmdb_id = entry.text_of("tmdbid", "");
        video.mpaa = entry.text_of("mpaa", "");

        if is_yes(&entry.text_of("seen", "")) {
            video.play_count = 1;
            video.play_date = entry.text_of("viewdate", "");
        }

        if let Some(genres) = entry.child("genres") {
            video.base.genres = genres.children_named("genre").map(|g| g.text.clone()).collect();
        }
        if let Some(studios) = entry.child("studios") {
            video.base.studios = studios
                .children_named("studio")
                .map(|s| s.text.clone())
                .collect();
        }

        if let Some(crew) = entry.child("crew") {
            for person in crew.children_named("person") {
                let name = person.attr("name", "");
                if name.is_empty() {
                    continue;
                }
                match person.attr("role", "").as_str() {
                    "director" => video.directors.push(Person { name }),
                    "writer" => video.writers.push(Person { name }),
                    "actor" => video.actors.push(Actor {
                        name,
                        role: person.attr("character", ""),
                        order: video.actors.len() as u32,
                        season: person.attr("season", "").parse().ok(),
                    }),
                    // Other crew roles are not published.
                    _ => {}
                }
            }
        }

        match entry.text_of("ratio", "").as_str() {
            "4:3" => video.aspect_ratio = Some(AspectRatio::Ratio4x3),
            "16:9" => video.aspect_ratio = Some(AspectRatio::Ratio16x9),
            "21:9" => video.aspect_ratio = Some(AspectRatio::Ratio21x9),
            _ => {}
        }
        match entry.text_of("condition", "").as_str() {
            "SD" => video.video_definition = Some(VideoDefinition::Sd),
            "HD" => video.video_definition = Some(VideoDefinition::Hd),
            _ => {}
        }

        if let Some(audios) = entry.child("audios") {
            for audio in audios.children_named("audio") {
                video.audio_streams.push(AudioStream {
                    language: audio.attr("language", ""),
                    codec: audio.attr("codec", ""),
                    channels: audio.attr("channels", "0").parse().unwrap_or(0),
                });
            }
        }
        if let Some(subtitles) = entry.child("subtitles") {
            for subtitle in subtitles.children_named("subtitle") {
                video.subtitle_streams.push(SubtitleStream {
                    language: subtitle.attr("language", ""),
                    forced: is_yes(&subtitle.attr("forced", "")),
                    source_path: subtitle.attr("path", ""),
                });
            }
        }

        // Tag-decoded attributes win over the declared nodes.
        tags.apply_to(&mut video);
        video
    }

    /// One video part from a `<file>` node.
    fn build_video_file(&self, node: &ExportNode, stem: &str) -> Result<VideoFile> {
        let (_, tags) = self.decoder.decode(&node.attr("description", ""));
        let mut file = FileBase {
            description: node.attr("description", ""),
            source_path: node.attr("path", ""),
            ..Default::default()
        };
        resolve_file(self.storage, &mut file)?;
        file.filename = qualify_filename(stem, &file.extension);
        if let Some(languages) = tags.languages {
            file.languages = languages;
        }
        Ok(VideoFile {
            file,
            is_special: tags.special || tags.movie,
        })
    }

    /// Subtitle files for the declared external subtitle streams.
    fn build_subtitle_files(&self, video: &VideoBase, stem: &str) -> Result<Vec<SubtitleFile>> {
        let mut subtitles = Vec::new();
        for stream in &video.subtitle_streams {
            if stream.source_path.is_empty() {
                continue;
            }
            let mut file = FileBase {
                source_path: stream.source_path.clone(),
                ..Default::default()
            };
            resolve_file(self.storage, &mut file)?;
            file.filename = qualify_filename(stem, &file.extension);
            let language = file
                .languages
                .first()
                .cloned()
                .unwrap_or_else(|| stream.language.clone());
            subtitles.push(SubtitleFile {
                forced: stream.forced || file.extension.contains(".forced."),
                language,
                file,
                document: None,
            });
        }
        Ok(subtitles)
    }

    fn apply_language_fallback(&self, video: &mut VideoBase, parent: Option<&[String]>) {
        if video.base.media_languages.is_empty() {
            if let Some(parent) = parent {
                video.base.media_languages = parent.to_vec();
            }
        }
        if video.base.media_languages.is_empty() {
            video.base.media_languages = vec![self.settings.catalog.default_language.clone()];
        }
    }

    /// Build a movie entry.
    pub fn build_movie(&self, entry: &ExportNode) -> Result<Movie> {
        let mut video = self.build_video_base(entry);
        self.apply_language_fallback(&mut video, None);
        video.base.derive_filename();
        let stem = video.base.filename.clone();

        read_images(entry, &mut video, false, &self.decoder, self.storage)?;

        let mut movie = Movie {
            video,
            files: Vec::new(),
            subtitles: Vec::new(),
        };
        if let Some(files) = entry.child("files") {
            for node in files.children_named("file") {
                movie.files.push(self.build_video_file(node, &stem)?);
            }
        }
        movie.subtitles = self.build_subtitle_files(&movie.video, &stem)?;
        Ok(movie)
    }

    /// Build a series entry with its discs-to-episodes hierarchy.
    pub fn build_series(&self, entry: &ExportNode) -> Result<Series> {
        let mut video = self.build_video_base(entry);
        self.apply_language_fallback(&mut video, None);
        video.base.derive_filename();
        let stem = video.base.filename.clone();

        read_images(entry, &mut video, true, &self.decoder, self.storage)?;

        let mut series = Series {
            video,
            ..Default::default()
        };

        let mut actual_counters: HashMap<u32, u32> = HashMap::new();
        let mut display_counters: HashMap<u32, u32> = HashMap::new();
        let mut last_regular_season = 0u32;
        let mut synthesized_name_counter = 0u32;

        if let Some(discs) = entry.child("discs") {
            for disc in discs.children_named("disc") {
                let (_, disc_tags) = self.decoder.decode(&disc.attr("name", ""));
                let disc_special = disc_tags.special;
                let season = match disc_tags.season {
                    Some(SeasonScope::Season(n)) => n,
                    Some(SeasonScope::Specials) => 0,
                    _ if disc_special => 0,
                    _ => last_regular_season + 1,
                };
                if season > 0 {
                    last_regular_season = season;
                }

                let episode_nodes: Vec<&ExportNode> = disc.children_named("episode").collect();
                if episode_nodes.is_empty() {
                    // Unsplit discs record episodes as a chapter count.
                    let chapters: u32 = disc.attr("chapters", "0").parse().unwrap_or(0);
                    for _ in 0..chapters {
                        synthesized_name_counter += 1;
                        let episode = self.build_episode(
                            None,
                            &format!("Episode {}", synthesized_name_counter),
                            season,
                            disc_special,
                            &series,
                            &stem,
                            &mut actual_counters,
                            &mut display_counters,
                        )?;
                        series.episodes.push(episode);
                    }
                } else {
                    for node in episode_nodes {
                        let episode = self.build_episode(
                            Some(node),
                            &node.attr("name", ""),
                            season,
                            disc_special,
                            &series,
                            &stem,
                            &mut actual_counters,
                            &mut display_counters,
                        )?;
                        series.episodes.push(episode);
                    }
                }
            }
        }

        series.recount();
        Ok(series)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_episode(
        &self,
        node: Option<&ExportNode>,
        raw_name: &str,
        disc_season: u32,
        disc_special: bool,
        series: &Series,
        series_stem: &str,
        actual_counters: &mut HashMap<u32, u32>,
        display_counters: &mut HashMap<u32, u32>,
    ) -> Result<Episode> {
        let (title, tags) = self.decoder.decode(raw_name);
        let is_special = disc_special || tags.special;

        let actual_season = if is_special { 0 } else { disc_season };
        // A special may still display inline within a real season.
        let display_season = match tags.season {
            Some(SeasonScope::Season(n)) => n,
            _ => actual_season,
        };

        let actual = actual_counters.entry(actual_season).or_insert(0);
        *actual += 1;
        let actual_episode = *actual;
        let display = display_counters.entry(display_season).or_insert(0);
        *display += 1;
        let display_episode = *display;

        let mut video = VideoBase {
            base: crate::models::media::MediaBase {
                title,
                ..Default::default()
            },
            ..Default::default()
        };
        if let Some(node) = node {
            video.base.plot = node.attr("plot", node.text_of("plot", "").as_str());
            video.base.publishing_date = node.attr("aired", "");
        }
        tags.apply_to(&mut video);
        self.apply_language_fallback(&mut video, Some(&series.video.base.media_languages));

        let mut episode = Episode {
            video,
            actual_season,
            actual_episode,
            display_season,
            display_episode,
            is_special,
            files: Vec::new(),
            subtitles: Vec::new(),
        };

        if let Some(node) = node {
            let cover = node.attr("cover", "");
            if !cover.is_empty() {
                let mut file = FileBase {
                    source_path: cover,
                    ..Default::default()
                };
                resolve_file(self.storage, &mut file)?;
                file.filename = qualify_filename(
                    &format!("episode_s{}e{}", actual_season, actual_episode),
                    &file.extension,
                );
                episode.video.base.images.push(crate::models::files::ImageFile {
                    file,
                    kind: crate::models::files::ImageKind::EpisodeCover,
                    season: SeasonScope::Unscoped,
                    index: 0,
                });
            }
            for file_node in node.children_named("file") {
                episode
                    .files
                    .push(self.build_video_file(file_node, series_stem)?);
            }
            for subtitle_node in node.children_named("subtitle") {
                let path = subtitle_node.attr("path", "");
                if path.is_empty() {
                    continue;
                }
                let mut file = FileBase {
                    source_path: path,
                    ..Default::default()
                };
                resolve_file(self.storage, &mut file)?;
                file.filename = qualify_filename(series_stem, &file.extension);
                let language = file
                    .languages
                    .first()
                    .cloned()
                    .unwrap_or_else(|| subtitle_node.attr("language", ""));
                episode.subtitles.push(SubtitleFile {
                    forced: file.extension.contains(".forced."),
                    language,
                    file,
                    document: None,
                });
            }
        }

        Ok(episode)
    }
}

/// Convert a movie to a single-episode series, used when movie
/// collections are published as shows.
pub fn series_from_movie(movie: Movie) -> Series {
    let mut episode = Episode {
        video: movie.video.clone(),
        actual_season: 1,
        actual_episode: 1,
        display_season: 1,
        display_episode: 1,
        is_special: false,
        files: movie.files,
        subtitles: movie.subtitles,
    };
    // The episode inherits identity but not grouping; the series
    // carries the group.
    episode.video.base.media_group.clear();
    episode.video.base.images.clear();

    let mut series = Series {
        video: movie.video,
        episodes: vec![episode],
        ..Default::default()
    };
    series.recount();
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ServerEntry;

    fn fixtures() -> (Settings, StorageMap) {
        let mut settings = Settings::default();
        settings.servers.servers.push(ServerEntry {
            name: "atlas".to_string(),
            drive_letter: "M".to_string(),
            storage_path: "/srv/atlas/media".to_string(),
            publication_path: "/srv/atlas/kodi".to_string(),
        });
        let storage = StorageMap::new(&settings.servers).unwrap();
        (settings, storage)
    }

    fn movie_entry() -> &'static str {
        r#"<movie>
            <title>The Quiet Earth (HD)(16:9)</title>
            <year>1985</year>
            <imdbrating>6.8</imdbrating>
            <imdbid>tt0089869</imdbid>
            <plot>The last man on earth wakes up.</plot>
            <runtime>91</runtime>
            <mpaa>R</mpaa>
            <country>New Zealand</country>
            <seen>Ja</seen>
            <viewdate>2013-05-01</viewdate>
            <genres><genre>Sci-Fi</genre><genre>Drama</genre></genres>
            <studios><studio>Cinepro</studio></studios>
            <crew>
                <person role="director" name="Geoff Murphy"/>
                <person role="writer" name="Bill Baer"/>
                <person role="actor" name="Bruno Lawrence" character="Zac Hobson"/>
                <person role="producer" name="Ignored"/>
            </crew>
            <userfields><field name="XBMC Movie">Yes</field></userfields>
            <files><file path="M:\Movies\quiet_earth.mkv"/></files>
        </movie>"#
    }

    #[test]
    fn test_classify() {
        let entry = ExportNode::parse(movie_entry()).unwrap();
        assert_eq!(classify(&entry), Classification::Movie);

        let series = ExportNode::parse(
            r#"<movie><userfields><field name="XBMC Serie">Ja</field></userfields></movie>"#,
        )
        .unwrap();
        assert_eq!(classify(&series), Classification::Series);

        let neither = ExportNode::parse("<movie><title>X</title></movie>").unwrap();
        assert_eq!(classify(&neither), Classification::Unclassified);
    }

    #[test]
    fn test_build_movie_fields() {
        let (settings, storage) = fixtures();
        let builder = CatalogBuilder::new(&settings, &storage);
        let entry = ExportNode::parse(movie_entry()).unwrap();
        let movie = builder.build_movie(&entry).unwrap();

        assert_eq!(movie.video.base.title, "The Quiet Earth");
        assert_eq!(movie.video.base.filename, "The Quiet Earth (1985)");
        assert_eq!(
            movie.video.video_definition,
            Some(VideoDefinition::Hd)
        );
        assert_eq!(movie.video.aspect_ratio, Some(AspectRatio::Ratio16x9));
        assert_eq!(movie.video.play_count, 1);
        assert_eq!(movie.video.play_date, "2013-05-01");
        assert_eq!(movie.video.directors.len(), 1);
        assert_eq!(movie.video.writers.len(), 1);
        assert_eq!(movie.video.actors.len(), 1);
        assert_eq!(movie.video.base.genres.len(), 2);
        // Default language fallback applied.
        assert_eq!(movie.video.base.media_languages, vec!["en".to_string()]);

        assert_eq!(movie.files.len(), 1);
        assert_eq!(movie.files[0].file.server, Some(0));
        assert_eq!(
            movie.files[0].file.local_path,
            "/srv/atlas/media/Movies/quiet_earth.mkv"
        );
        assert_eq!(
            movie.files[0].file.filename,
            "The Quiet Earth (1985).mkv"
        );
    }

    #[test]
    fn test_unsupported_extension_fails_entry() {
        let (settings, storage) = fixtures();
        let builder = CatalogBuilder::new(&settings, &storage);
        let entry = ExportNode::parse(
            r#"<movie>
                <title>Broken</title>
                <userfields><field name="XBMC Movie">Yes</field></userfields>
                <files><file path="M:\Movies\broken.docx"/></files>
            </movie>"#,
        )
        .unwrap();
        assert!(builder.build_movie(&entry).is_err());
    }

    #[test]
    fn test_build_report_per_item_boundary() {
        let (settings, storage) = fixtures();
        let builder = CatalogBuilder::new(&settings, &storage);
        let root = ExportNode::parse(&format!(
            r#"<catalog><movies>
                {}
                <movie>
                    <title>Broken</title>
                    <userfields><field name="XBMC Movie">Yes</field></userfields>
                    <files><file path="Z:\nowhere\broken.mkv"/></files>
                </movie>
                <movie><title>Mystery</title></movie>
            </movies></catalog>"#,
            movie_entry()
        ))
        .unwrap();

        let report = builder.build(&root);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.unclassified, vec!["Mystery".to_string()]);
    }

    #[test]
    fn test_build_series_discs_and_numbering() {
        let (settings, storage) = fixtures();
        let builder = CatalogBuilder::new(&settings, &storage);
        let entry = ExportNode::parse(
            r#"<movie>
                <title>Show (L de en)</title>
                <year>2001</year>
                <userfields><field name="XBMC Serie">Yes</field></userfields>
                <discs>
                    <disc name="Season 1">
                        <episode name="Pilot" cover="M:\Series\s01e01.jpg"><file path="M:\Series\s01e01.mkv"/></episode>
                        <episode name="Two"><file path="M:\Series\s01e02.mkv"/></episode>
                    </disc>
                    <disc name="Bonus (Special)">
                        <episode name="Gag Reel (S1)"><file path="M:\Series\gag.mkv"/></episode>
                    </disc>
                    <disc name="Season 2 (S2)">
                        <episode name="Opener"><file path="M:\Series\s02e01.mkv"/></episode>
                    </disc>
                </discs>
            </movie>"#,
        )
        .unwrap();

        let series = builder.build_series(&entry).unwrap();
        assert_eq!(series.video.base.title, "Show");
        assert_eq!(
            series.video.base.media_languages,
            vec!["de".to_string(), "en".to_string()]
        );
        assert_eq!(series.number_of_total_episodes, 4);
        assert_eq!(series.number_of_episodes, 3);
        assert_eq!(series.number_of_specials, 1);
        assert_eq!(series.episodes_per_season, vec![1, 2, 1]);

        let special = &series.episodes[2];
        assert!(special.is_special);
        assert_eq!(special.actual_season, 0);
        // Display override puts the special inside season 1.
        assert_eq!(special.display_season, 1);
        assert_eq!(special.display_episode, 3);

        let pilot = &series.episodes[0];
        assert_eq!(pilot.video.base.images.len(), 1);
        assert_eq!(
            pilot.video.base.images[0].kind,
            crate::models::files::ImageKind::EpisodeCover
        );

        let s2 = &series.episodes[3];
        assert_eq!(s2.actual_season, 2);
        assert_eq!(s2.actual_episode, 1);
        // Episodes inherit the series language set.
        assert_eq!(
            s2.video.base.media_languages,
            vec!["de".to_string(), "en".to_string()]
        );
    }

    #[test]
    fn test_chapter_count_synthesizes_episodes() {
        let (settings, storage) = fixtures();
        let builder = CatalogBuilder::new(&settings, &storage);
        let entry = ExportNode::parse(
            r#"<movie>
                <title>Show</title>
                <userfields><field name="XBMC Serie">Yes</field></userfields>
                <discs><disc name="Season 1" chapters="3"/></discs>
            </movie>"#,
        )
        .unwrap();
        let series = builder.build_series(&entry).unwrap();
        assert_eq!(series.number_of_episodes, 3);
        assert_eq!(series.episodes[2].video.base.title, "Episode 3");
    }

    #[test]
    fn test_series_from_movie() {
        let mut movie = Movie::default();
        movie.video.base.title = "Part One".to_string();
        movie.video.base.media_group = "Saga".to_string();
        movie.files.push(VideoFile::default());
        let series = series_from_movie(movie);
        assert_eq!(series.episodes.len(), 1);
        assert_eq!(series.episodes[0].actual_season, 1);
        assert_eq!(series.video.base.media_group, "Saga");
        assert!(series.episodes[0].video.base.media_group.is_empty());
    }
}
