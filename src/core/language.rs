//! Per-language expansion.
//!
//! A catalog entry declaring several languages is published once per
//! language. Each variant is a deep clone with every language-tagged
//! string rewritten to the target language: the ISO token `(xx)` and
//! its configured word form, in title, sort title, media group,
//! filename, and every owned file's filename and URL. Files tagged
//! with languages that exclude the target are blanked so they drop
//! out of publication.

use crate::models::config::CatalogSettings;
use crate::models::files::FileBase;
use crate::models::media::{Episode, MediaBase, MediaItem, Movie, Series};

#[derive(Debug)]
pub struct LanguageExpander<'a> {
    catalog: &'a CatalogSettings,
}

impl<'a> LanguageExpander<'a> {
    pub fn new(catalog: &'a CatalogSettings) -> Self {
        Self { catalog }
    }

    /// Expand an entry into one clone per declared language. An entry
    /// with a single language passes through as-is.
    pub fn expand(&self, item: &MediaItem) -> Vec<MediaItem> {
        let languages = item.video().base.media_languages.clone();
        if languages.len() <= 1 {
            return vec![item.clone()];
        }
        languages
            .iter()
            .map(|target| match item {
                MediaItem::Movie(movie) => {
                    MediaItem::Movie(self.clone_movie_for_language(movie, &languages, target))
                }
                MediaItem::Series(series) => {
                    MediaItem::Series(self.clone_series_for_language(series, &languages, target))
                }
            })
            .collect()
    }

    /// Rewrite one language's token and word form to the target's.
    fn rewrite(&self, s: &str, from: &str, to: &str) -> String {
        if s.is_empty() {
            return String::new();
        }
        let mut out = s.replace(&format!("({})", from), &format!("({})", to));
        let from_word = self.catalog.language_word(from);
        let to_word = self.catalog.language_word(to);
        if from_word != from {
            out = out.replace(&from_word, &to_word);
        }
        out
    }

    fn rewrite_file(&self, file: &mut FileBase, from: &str, to: &str) {
        file.filename = self.rewrite(&file.filename, from, to);
        file.source_path = self.rewrite(&file.source_path, from, to);
    }

    fn rewrite_base(&self, base: &mut MediaBase, from: &str, to: &str) {
        base.title = self.rewrite(&base.title, from, to);
        base.title_sort = self.rewrite(&base.title_sort, from, to);
        base.media_group = self.rewrite(&base.media_group, from, to);
        base.filename = self.rewrite(&base.filename, from, to);
        for image in &mut base.images {
            self.rewrite_file(&mut image.file, from, to);
        }
    }

    /// Blank out files not tagged for the target language. Rewriting
    /// an already-blank filename stays a no-op.
    fn blank_foreign_files(files: &mut [FileBase], target: &str) {
        for file in files {
            if !file.has_language(target) {
                file.filename.clear();
            }
        }
    }

    pub fn clone_movie_for_language(
        &self,
        movie: &Movie,
        replace: &[String],
        target: &str,
    ) -> Movie {
        let mut clone = movie.clone();

        for file in &mut clone.files {
            if !file.file.has_language(target) {
                file.file.filename.clear();
            }
        }
        for subtitle in &mut clone.subtitles {
            if !subtitle.file.has_language(target) {
                subtitle.file.filename.clear();
            }
        }

        for from in replace {
            if from == target {
                continue;
            }
            self.rewrite_base(&mut clone.video.base, from, target);
            for file in &mut clone.files {
                self.rewrite_file(&mut file.file, from, target);
            }
            for subtitle in &mut clone.subtitles {
                self.rewrite_file(&mut subtitle.file, from, target);
            }
        }

        clone.video.base.media_languages = vec![target.to_string()];
        clone
    }

    pub fn clone_series_for_language(
        &self,
        series: &Series,
        replace: &[String],
        target: &str,
    ) -> Series {
        let mut clone = series.clone();

        for from in replace {
            if from == target {
                continue;
            }
            self.rewrite_base(&mut clone.video.base, from, target);
        }

        // An episode may declare a language set diverging from its
        // series; its own first language joins the replace set.
        let episodes = std::mem::take(&mut clone.episodes);
        clone.episodes = episodes
            .iter()
            .map(|episode| {
                let mut ep_replace = replace.to_vec();
                if let Some(first) = episode.video.base.media_languages.first() {
                    if !ep_replace.contains(first) {
                        ep_replace.push(first.clone());
                    }
                }
                self.clone_episode_for_language(episode, &ep_replace, target)
            })
            .collect();

        clone.video.base.media_languages = vec![target.to_string()];
        clone
    }

    fn clone_episode_for_language(
        &self,
        episode: &Episode,
        replace: &[String],
        target: &str,
    ) -> Episode {
        let mut clone = episode.clone();

        for file in &mut clone.files {
            if !file.file.has_language(target) {
                file.file.filename.clear();
            }
        }
        for subtitle in &mut clone.subtitles {
            if !subtitle.file.has_language(target) {
                subtitle.file.filename.clear();
            }
        }

        for from in replace {
            if from == target {
                continue;
            }
            self.rewrite_base(&mut clone.video.base, from, target);
            for file in &mut clone.files {
                self.rewrite_file(&mut file.file, from, target);
            }
            for subtitle in &mut clone.subtitles {
                self.rewrite_file(&mut subtitle.file, from, target);
            }
        }

        clone.video.base.media_languages = vec![target.to_string()];
        clone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::VideoFile;

    fn expander_fixture() -> CatalogSettings {
        CatalogSettings::default()
    }

    fn movie_fixture() -> Movie {
        let mut movie = Movie::default();
        movie.video.base.title = "Foo (de)".to_string();
        movie.video.base.title_sort = "Foo (de)".to_string();
        movie.video.base.filename = "Foo (de) (2005)".to_string();
        movie.video.base.media_languages = vec!["de".to_string(), "en".to_string()];
        movie.files.push(VideoFile {
            file: FileBase {
                filename: "Foo (de) (2005).mkv".to_string(),
                languages: vec!["de".to_string(), "en".to_string()],
                ..Default::default()
            },
            is_special: false,
        });
        movie.files.push(VideoFile {
            file: FileBase {
                filename: "Bonus (de).mkv".to_string(),
                languages: vec!["de".to_string()],
                ..Default::default()
            },
            is_special: true,
        });
        movie
    }

    #[test]
    fn test_clone_rewrites_tokens_and_words() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let movie = movie_fixture();
        let clone =
            expander.clone_movie_for_language(&movie, &["de".into(), "en".into()], "en");
        assert_eq!(clone.video.base.title, "Foo (en)");
        assert_eq!(clone.video.base.filename, "Foo (en) (2005)");
        assert_eq!(clone.files[0].file.filename, "Foo (en) (2005).mkv");
        assert_eq!(clone.video.base.media_languages, vec!["en".to_string()]);
    }

    #[test]
    fn test_clone_is_isolated_from_original() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let movie = movie_fixture();
        let mut clone =
            expander.clone_movie_for_language(&movie, &["de".into(), "en".into()], "en");
        clone.video.base.title = "Mutated".to_string();
        assert_eq!(movie.video.base.title, "Foo (de)");
    }

    #[test]
    fn test_foreign_file_blanked() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let movie = movie_fixture();
        let clone =
            expander.clone_movie_for_language(&movie, &["de".into(), "en".into()], "en");
        // The German-only bonus file drops out of the English variant.
        assert!(clone.files[1].file.filename.is_empty());
        assert!(!clone.files[0].file.filename.is_empty());
    }

    #[test]
    fn test_word_form_rewritten() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let mut movie = movie_fixture();
        movie.video.base.media_group = "Foo German Cut".to_string();
        let clone =
            expander.clone_movie_for_language(&movie, &["de".into(), "en".into()], "en");
        assert_eq!(clone.video.base.media_group, "Foo English Cut");
    }

    #[test]
    fn test_expand_single_language_passthrough() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let mut movie = movie_fixture();
        movie.video.base.media_languages = vec!["de".to_string()];
        let expanded = expander.expand(&MediaItem::Movie(movie));
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_expand_produces_one_clone_per_language() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let expanded = expander.expand(&MediaItem::Movie(movie_fixture()));
        assert_eq!(expanded.len(), 2);
        let titles: Vec<&str> = expanded.iter().map(|i| i.title()).collect();
        assert!(titles.contains(&"Foo (de)"));
        assert!(titles.contains(&"Foo (en)"));
    }

    #[test]
    fn test_episode_divergent_language_joins_replace_set() {
        let catalog = expander_fixture();
        let expander = LanguageExpander::new(&catalog);
        let mut series = Series::default();
        series.video.base.title = "Show (de)".to_string();
        series.video.base.media_languages = vec!["de".to_string(), "en".to_string()];
        series.episodes.push(Episode {
            video: crate::models::media::VideoBase {
                base: MediaBase {
                    title: "Pilot (fr)".to_string(),
                    media_languages: vec!["fr".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        });

        let clone = expander.clone_series_for_language(
            &series,
            &["de".to_string(), "en".to_string()],
            "en",
        );
        assert_eq!(clone.video.base.title, "Show (en)");
        // The episode's own French tag was part of the replace set.
        assert_eq!(clone.episodes[0].video.base.title, "Pilot (en)");
    }
}
