//! Publish script generator.
//!
//! Emits one POSIX shell script per server: directory setup, sidecar
//! and subtitle copies from the staging area, copy-or-link commands
//! for media files already on the server's storage, artwork copies
//! under Kodi naming conventions, and removal of folders a grouping
//! pass made obsolete.

use crate::core::storage::StorageMap;
use crate::generators::filename::{episode_stem, part_stem};
use crate::models::config::{LinkMode, Settings};
use crate::models::files::{ImageFile, ImageKind, SeasonScope};
use crate::models::media::{MediaItem, Movie, Series};

/// Line-oriented script writer.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    lines: Vec<String>,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Quote a literal for a double-quoted shell context.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Per-server publish script generator.
#[derive(Debug)]
pub struct ScriptGenerator<'a> {
    settings: &'a Settings,
    storage: &'a StorageMap,
    server: usize,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(settings: &'a Settings, storage: &'a StorageMap, server: usize) -> Self {
        Self {
            settings,
            storage,
            server,
        }
    }

    fn place_command(&self) -> &'static str {
        match self.settings.servers.link_mode {
            LinkMode::Copy => "cp",
            LinkMode::Symlink => "ln -sf",
        }
    }

    /// Generate the full script for this server's view of the
    /// collection.
    pub fn generate(&self, items: &[MediaItem], obsolete: &[String], stage_dir: &str) -> String {
        let mut w = ScriptWriter::new();
        w.line("#!/bin/sh");
        w.line(format!(
            "# Publish script for server '{}'",
            self.storage.name(self.server)
        ));
        w.line("set -e");
        w.blank();
        w.line(format!("STAGE={}", quoted(stage_dir)));
        w.line(format!(
            "PUB={}",
            quoted(self.storage.publication_path(self.server))
        ));
        w.blank();

        if !obsolete.is_empty() {
            w.line("# Folders superseded by media-group publishing");
            for folder in obsolete {
                w.line(format!(
                    "rm -rf \"$PUB/{}/{}\"",
                    self.settings.servers.series_dir, folder
                ));
            }
            w.blank();
        }

        for item in items {
            match item {
                MediaItem::Movie(movie) => self.emit_movie(&mut w, movie),
                MediaItem::Series(series) => self.emit_series(&mut w, series),
            }
            w.blank();
        }

        w.render()
    }

    fn emit_movie(&self, w: &mut ScriptWriter, movie: &Movie) {
        let stem = &movie.video.base.filename;
        let dir = format!("$PUB/{}/{}", self.settings.servers.movies_dir, stem);
        let stage = format!("$STAGE/{}/{}", self.settings.servers.movies_dir, stem);

        w.line(format!("# {}", movie.video.base.title));
        w.line(format!("mkdir -p \"{}\"", dir));
        w.line(format!("cp -r \"{}/.\" \"{}/\"", stage, dir));

        let published: Vec<_> = movie
            .files
            .iter()
            .filter(|f| f.file.server == Some(self.server) && f.file.is_published())
            .collect();
        let count = published.len();
        for (index, part) in published.iter().enumerate() {
            let name = format!(
                "{}.{}",
                part_stem(stem, index, count),
                part.file.extension
            );
            w.line(format!(
                "{} {} \"{}/{}\"",
                self.place_command(),
                quoted(&part.file.local_path),
                dir,
                name
            ));
        }

        for subtitle in &movie.subtitles {
            if subtitle.file.server == Some(self.server)
                && subtitle.file.is_published()
                && subtitle.document.is_none()
            {
                w.line(format!(
                    "cp {} \"{}/{}.{}\"",
                    quoted(&subtitle.file.local_path),
                    dir,
                    stem,
                    subtitle.file.extension
                ));
            }
        }

        self.emit_images(w, &dir, &movie.video.base.images);
    }

    fn emit_series(&self, w: &mut ScriptWriter, series: &Series) {
        let stem = &series.video.base.filename;
        let dir = format!("$PUB/{}/{}", self.settings.servers.series_dir, stem);
        let stage = format!("$STAGE/{}/{}", self.settings.servers.series_dir, stem);

        w.line(format!("# {}", series.video.base.title));
        w.line(format!("mkdir -p \"{}\"", dir));
        w.line(format!("cp -r \"{}/.\" \"{}/\"", stage, dir));

        for episode in &series.episodes {
            let ep_stem = episode_stem(stem, episode.actual_season, episode.actual_episode);
            let published: Vec<_> = episode
                .files
                .iter()
                .filter(|f| f.file.server == Some(self.server) && f.file.is_published())
                .collect();
            let count = published.len();
            for (index, part) in published.iter().enumerate() {
                let name = format!(
                    "{}.{}",
                    part_stem(&ep_stem, index, count),
                    part.file.extension
                );
                w.line(format!(
                    "{} {} \"{}/{}\"",
                    self.place_command(),
                    quoted(&part.file.local_path),
                    dir,
                    name
                ));
            }
            for subtitle in &episode.subtitles {
                if subtitle.file.server == Some(self.server)
                    && subtitle.file.is_published()
                    && subtitle.document.is_none()
                {
                    w.line(format!(
                        "cp {} \"{}/{}.{}\"",
                        quoted(&subtitle.file.local_path),
                        dir,
                        ep_stem,
                        subtitle.file.extension
                    ));
                }
            }
            for image in &episode.video.base.images {
                if image.file.server == Some(self.server) && image.file.is_published() {
                    w.line(format!(
                        "cp {} \"{}/{}-thumb.{}\"",
                        quoted(&image.file.local_path),
                        dir,
                        ep_stem,
                        image.file.extension
                    ));
                }
            }
        }

        self.emit_images(w, &dir, &series.video.base.images);
    }

    fn emit_images(&self, w: &mut ScriptWriter, dir: &str, images: &[ImageFile]) {
        let mut extrafanart_made = false;
        let mut extrathumbs_made = false;
        for image in images {
            if image.file.server != Some(self.server) || !image.file.is_published() {
                continue;
            }
            let name = artwork_name(image);
            if name.starts_with("extrafanart/") && !extrafanart_made {
                w.line(format!("mkdir -p \"{}/extrafanart\"", dir));
                extrafanart_made = true;
            }
            if name.starts_with("extrathumbs/") && !extrathumbs_made {
                w.line(format!("mkdir -p \"{}/extrathumbs\"", dir));
                extrathumbs_made = true;
            }
            w.line(format!(
                "cp {} \"{}/{}\"",
                quoted(&image.file.local_path),
                dir,
                name
            ));
        }
    }
}

/// Kodi artwork filename for an image.
fn artwork_name(image: &ImageFile) -> String {
    let ext = &image.file.extension;
    let season_part = |token: &str| match image.season {
        SeasonScope::Season(n) => format!("season{:02}-{}.{}", n, token, ext),
        SeasonScope::Specials => format!("season-specials-{}.{}", token, ext),
        SeasonScope::AllSeasons => format!("season-all-{}.{}", token, ext),
        SeasonScope::Unscoped => format!("season01-{}.{}", token, ext),
    };
    match image.kind {
        ImageKind::CoverFront => format!("folder.{}", ext),
        ImageKind::Poster => format!("poster.{}", ext),
        ImageKind::Backdrop => format!("fanart.{}", ext),
        ImageKind::ExtraBackdrop => format!("extrafanart/fanart{}.{}", image.index, ext),
        ImageKind::ExtraCover => format!("extrathumbs/thumb{}.{}", image.index, ext),
        ImageKind::SeasonPoster => season_part("poster"),
        ImageKind::SeasonCover => season_part("thumb"),
        ImageKind::SeasonBackdrop => season_part("fanart"),
        ImageKind::CoverBack | ImageKind::EpisodeCover | ImageKind::Unknown => {
            image.file.filename.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ServerEntry;
    use crate::models::files::{FileBase, VideoFile};

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.servers.servers.push(ServerEntry {
            name: "atlas".to_string(),
            drive_letter: "M".to_string(),
            storage_path: "/srv/atlas/media".to_string(),
            publication_path: "/srv/atlas/kodi".to_string(),
        });
        settings
    }

    fn movie_on_server() -> Movie {
        let mut movie = Movie::default();
        movie.video.base.title = "Foo".to_string();
        movie.video.base.filename = "Foo (2005)".to_string();
        movie.files.push(VideoFile {
            file: FileBase {
                local_path: "/srv/atlas/media/Movies/foo.mkv".to_string(),
                filename: "Foo (2005).mkv".to_string(),
                extension: "mkv".to_string(),
                server: Some(0),
                ..Default::default()
            },
            is_special: false,
        });
        movie
    }

    #[test]
    fn test_movie_script_commands() {
        let settings = settings();
        let storage = StorageMap::new(&settings.servers).unwrap();
        let gen = ScriptGenerator::new(&settings, &storage, 0);
        let script = gen.generate(
            &[MediaItem::Movie(movie_on_server())],
            &[],
            "/tmp/stage/atlas",
        );

        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("mkdir -p \"$PUB/Movies/Foo (2005)\""));
        assert!(script
            .contains("ln -sf \"/srv/atlas/media/Movies/foo.mkv\" \"$PUB/Movies/Foo (2005)/Foo (2005).mkv\""));
    }

    #[test]
    fn test_obsolete_folders_removed() {
        let settings = settings();
        let storage = StorageMap::new(&settings.servers).unwrap();
        let gen = ScriptGenerator::new(&settings, &storage, 0);
        let script = gen.generate(&[], &["Old Show (2001)".to_string()], "/tmp/stage/atlas");
        assert!(script.contains("rm -rf \"$PUB/Series/Old Show (2001)\""));
    }

    #[test]
    fn test_artwork_names() {
        let image = |kind, season, index| ImageFile {
            file: FileBase {
                extension: "jpg".to_string(),
                filename: "x.jpg".to_string(),
                ..Default::default()
            },
            kind,
            season,
            index,
        };
        assert_eq!(
            artwork_name(&image(ImageKind::CoverFront, SeasonScope::Unscoped, 0)),
            "folder.jpg"
        );
        assert_eq!(
            artwork_name(&image(ImageKind::Backdrop, SeasonScope::Unscoped, 0)),
            "fanart.jpg"
        );
        assert_eq!(
            artwork_name(&image(ImageKind::SeasonPoster, SeasonScope::Season(2), 0)),
            "season02-poster.jpg"
        );
        assert_eq!(
            artwork_name(&image(ImageKind::SeasonCover, SeasonScope::Specials, 0)),
            "season-specials-thumb.jpg"
        );
        assert_eq!(
            artwork_name(&image(ImageKind::ExtraBackdrop, SeasonScope::Unscoped, 1)),
            "extrafanart/fanart1.jpg"
        );
    }
}
