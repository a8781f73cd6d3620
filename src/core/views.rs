//! Per-server view builder.
//!
//! Filters the grouped collection down to what actually lives on one
//! server, cloning each entry with its files and episodes reduced to
//! that server. Movies are taken in two passes: the regular parts,
//! and the extra material published as a separate " (Specials)"
//! entry.

use crate::models::files::{ImageFile, SubtitleFile, VideoFile};
use crate::models::media::{MediaItem, Movie, Series};

/// Marker appended to the specials partition of a movie.
const SPECIALS_SUFFIX: &str = " (Specials)";

fn files_on_server(files: &[VideoFile], server: usize, specials: bool) -> Vec<VideoFile> {
    files
        .iter()
        .filter(|f| {
            f.file.server == Some(server) && f.file.is_published() && f.is_special == specials
        })
        .cloned()
        .collect()
}

fn subtitles_on_server(subtitles: &[SubtitleFile], server: usize) -> Vec<SubtitleFile> {
    subtitles
        .iter()
        .filter(|s| s.file.server == Some(server) && s.file.is_published())
        .cloned()
        .collect()
}

/// Web-linked images carry no server and stay in every view.
fn images_on_server(images: &[ImageFile], server: usize) -> Vec<ImageFile> {
    images
        .iter()
        .filter(|i| i.file.server.is_none() || i.file.server == Some(server))
        .cloned()
        .collect()
}

/// Clone a movie down to one server and one partition. Returns `None`
/// when no video file of that partition lives there.
fn clone_movie_for_server(movie: &Movie, server: usize, specials: bool) -> Option<Movie> {
    let files = files_on_server(&movie.files, server, specials);
    if files.is_empty() {
        return None;
    }
    let mut clone = movie.clone();
    clone.files = files;
    clone.subtitles = subtitles_on_server(&movie.subtitles, server);
    clone.video.base.images = images_on_server(&movie.video.base.images, server);
    if specials {
        let base = &mut clone.video.base;
        base.title.push_str(SPECIALS_SUFFIX);
        base.title_sort.push_str(SPECIALS_SUFFIX);
        if !base.title_original.is_empty() {
            base.title_original.push_str(SPECIALS_SUFFIX);
        }
        base.filename.push_str(SPECIALS_SUFFIX);
    }
    Some(clone)
}

/// Clone a series down to one server. Returns `None` when no episode
/// has a video file there. Episode numbering is left untouched so the
/// library numbering agrees across servers.
fn clone_series_for_server(series: &Series, server: usize) -> Option<Series> {
    let mut clone = series.clone();
    clone.episodes = series
        .episodes
        .iter()
        .filter_map(|episode| {
            let files: Vec<VideoFile> = episode
                .files
                .iter()
                .filter(|f| f.file.server == Some(server) && f.file.is_published())
                .cloned()
                .collect();
            if files.is_empty() {
                return None;
            }
            let mut episode = episode.clone();
            episode.files = files;
            episode.subtitles = subtitles_on_server(&episode.subtitles, server);
            episode.video.base.images = images_on_server(&episode.video.base.images, server);
            Some(episode)
        })
        .collect();
    if clone.episodes.is_empty() {
        return None;
    }
    clone.video.base.images = images_on_server(&series.video.base.images, server);
    clone.recount();
    Some(clone)
}

/// Build the view of the collection for one server.
pub fn list_per_server(items: &[MediaItem], server: usize) -> Vec<MediaItem> {
    let mut view = Vec::new();
    for item in items {
        if !item.servers().contains(&server) {
            continue;
        }
        match item {
            MediaItem::Movie(movie) => {
                if let Some(regular) = clone_movie_for_server(movie, server, false) {
                    view.push(MediaItem::Movie(regular));
                }
                // Extra material surfaces as its own library entry.
                if let Some(specials) = clone_movie_for_server(movie, server, true) {
                    view.push(MediaItem::Movie(specials));
                }
            }
            MediaItem::Series(series) => {
                if let Some(filtered) = clone_series_for_server(series, server) {
                    view.push(MediaItem::Series(filtered));
                }
            }
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::FileBase;
    use crate::models::media::Episode;

    fn video_file(server: usize, special: bool) -> VideoFile {
        VideoFile {
            file: FileBase {
                filename: "part.mkv".to_string(),
                extension: "mkv".to_string(),
                server: Some(server),
                ..Default::default()
            },
            is_special: special,
        }
    }

    fn movie_with(files: Vec<VideoFile>) -> Movie {
        let mut movie = Movie::default();
        movie.video.base.title = "Foo".to_string();
        movie.video.base.title_sort = "Foo".to_string();
        movie.video.base.title_original = "Foo".to_string();
        movie.video.base.filename = "Foo (2005)".to_string();
        movie.files = files;
        movie
    }

    #[test]
    fn test_movie_absent_from_other_server() {
        let items = vec![MediaItem::Movie(movie_with(vec![video_file(0, false)]))];
        assert_eq!(list_per_server(&items, 1).len(), 0);
        assert_eq!(list_per_server(&items, 0).len(), 1);
    }

    #[test]
    fn test_specials_become_separate_entry() {
        let items = vec![MediaItem::Movie(movie_with(vec![
            video_file(0, false),
            video_file(0, true),
        ]))];
        let view = list_per_server(&items, 0);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].title(), "Foo");
        assert_eq!(view[1].title(), "Foo (Specials)");
        match &view[1] {
            MediaItem::Movie(m) => {
                assert_eq!(m.video.base.filename, "Foo (2005) (Specials)");
                assert!(m.files.iter().all(|f| f.is_special));
            }
            _ => panic!("expected movie"),
        }
    }

    #[test]
    fn test_series_episodes_filtered_and_recounted() {
        let mut series = Series::default();
        series.video.base.title = "Show".to_string();
        series.episodes.push(Episode {
            actual_season: 1,
            files: vec![video_file(0, false)],
            ..Default::default()
        });
        series.episodes.push(Episode {
            actual_season: 1,
            files: vec![video_file(1, false)],
            ..Default::default()
        });
        series.recount();

        let items = vec![MediaItem::Series(series)];
        let view = list_per_server(&items, 0);
        assert_eq!(view.len(), 1);
        match &view[0] {
            MediaItem::Series(s) => {
                assert_eq!(s.episodes.len(), 1);
                assert_eq!(s.number_of_total_episodes, 1);
            }
            _ => panic!("expected series"),
        }
    }

    #[test]
    fn test_blanked_files_excluded() {
        let mut movie = movie_with(vec![video_file(0, false)]);
        movie.files[0].file.filename.clear();
        let items = vec![MediaItem::Movie(movie)];
        // The only file is blanked, so nothing is published.
        assert!(list_per_server(&items, 0).is_empty());
    }
}
