//! Publish pipeline orchestrator.
//!
//! Runs the whole batch: parse the export, build the entity graph,
//! read subtitle payloads, expand per language, merge media groups,
//! then emit per-server staging trees and publish scripts. One bad
//! catalog entry is logged and skipped; the run always completes.

use crate::core::catalog::{series_from_movie, CatalogBuilder};
use crate::core::export::ExportNode;
use crate::core::grouping::{group_by_media_group, obsolete_folders};
use crate::core::language::LanguageExpander;
use crate::core::storage::StorageMap;
use crate::core::subtitles;
use crate::core::views::list_per_server;
use crate::generators::filename::episode_stem;
use crate::generators::nfo::{
    generate_episode_nfo, generate_movie_nfo, generate_tvshow_nfo, ArtworkContext,
};
use crate::generators::script::ScriptGenerator;
use crate::models::config::Settings;
use crate::models::files::SubtitleFile;
use crate::models::media::MediaItem;
use crate::utils::fs::write_text;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a publish run produced.
#[derive(Debug, Default, Serialize)]
pub struct PublishSummary {
    pub created_at: String,
    pub movies: usize,
    pub series: usize,
    pub unclassified: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub obsolete_folders: Vec<String>,
    pub scripts: Vec<PathBuf>,
}

/// Batch publisher.
#[derive(Debug)]
pub struct Publisher<'a> {
    settings: &'a Settings,
    storage: StorageMap,
}

impl<'a> Publisher<'a> {
    pub fn new(settings: &'a Settings) -> Result<Self> {
        if settings.servers.servers.is_empty() {
            return Err(Error::InvalidConfig("no servers configured".to_string()));
        }
        let storage = StorageMap::new(&settings.servers)?;
        Ok(Self { settings, storage })
    }

    pub fn storage(&self) -> &StorageMap {
        &self.storage
    }

    /// Run the pipeline end to end, writing staging trees and scripts
    /// under `output_dir`.
    pub fn run(&self, output_dir: &Path) -> Result<PublishSummary> {
        let export_path = &self.settings.catalog.export_path;
        tracing::info!("reading export {:?}", export_path);
        let xml = std::fs::read_to_string(export_path)
            .map_err(|_| Error::PathNotFound(export_path.display().to_string()))?;
        let root = ExportNode::parse(&xml)?;

        let builder = CatalogBuilder::new(self.settings, &self.storage);
        let report = builder.build(&root);
        tracing::info!(
            "built {} entries ({} unclassified, {} failed)",
            report.items.len(),
            report.unclassified.len(),
            report.failed.len()
        );

        let mut items = report.items;
        if self.settings.kodi.movies_as_series {
            items = items
                .into_iter()
                .map(|item| match item {
                    MediaItem::Movie(movie) if !movie.video.base.media_group.is_empty() => {
                        MediaItem::Series(series_from_movie(movie))
                    }
                    other => other,
                })
                .collect();
        }

        for item in &mut items {
            load_subtitle_documents(item);
        }

        // Expand per language, then merge series sharing a media
        // group. Movies pass the grouping stage unchanged.
        let expander = LanguageExpander::new(&self.settings.catalog);
        let expanded: Vec<MediaItem> = items.iter().flat_map(|i| expander.expand(i)).collect();

        let mut movies = Vec::new();
        let mut series = Vec::new();
        for item in expanded {
            match item {
                MediaItem::Movie(m) => movies.push(m),
                MediaItem::Series(s) => series.push(s),
            }
        }
        let outcome = group_by_media_group(series);
        let obsolete = obsolete_folders(&outcome);

        let mut collection: Vec<MediaItem> =
            movies.into_iter().map(MediaItem::Movie).collect();
        collection.extend(outcome.grouped.iter().cloned().map(MediaItem::Series));

        let mut summary = PublishSummary {
            created_at: chrono::Utc::now().to_rfc3339(),
            movies: collection
                .iter()
                .filter(|i| matches!(i, MediaItem::Movie(_)))
                .count(),
            series: outcome.grouped.len(),
            unclassified: report.unclassified,
            failed: report.failed,
            obsolete_folders: obsolete.clone(),
            scripts: Vec::new(),
        };

        for server in 0..self.storage.server_count() {
            let script = self.emit_server(&collection, &obsolete, server, output_dir)?;
            summary.scripts.push(script);
        }

        let manifest = output_dir.join("publish_manifest.json");
        write_text(&manifest, &serde_json::to_string_pretty(&summary)?)?;

        Ok(summary)
    }

    /// Stage sidecars and regenerated subtitles for one server and
    /// write its publish script.
    fn emit_server(
        &self,
        collection: &[MediaItem],
        obsolete: &[String],
        server: usize,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let server_name = self.storage.name(server);
        let stage_dir = output_dir.join(server_name);
        let view = list_per_server(collection, server);
        tracing::info!(
            "server '{}': {} items in view",
            server_name,
            view.len()
        );

        let pb = ProgressBar::new(view.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message(format!("staging {}", server_name));

        for item in &view {
            match item {
                MediaItem::Movie(movie) => {
                    let stem = &movie.video.base.filename;
                    let dir = stage_dir
                        .join(&self.settings.servers.movies_dir)
                        .join(stem);
                    let ctx = ArtworkContext {
                        server_name,
                        publication_root: self.storage.publication_path(server),
                        library_dir: &self.settings.servers.movies_dir,
                    };
                    write_text(
                        &dir.join(format!("{}.nfo", stem)),
                        &generate_movie_nfo(movie, &ctx),
                    )?;
                    for subtitle in &movie.subtitles {
                        stage_subtitle(&dir, stem, subtitle)?;
                    }
                }
                MediaItem::Series(series) => {
                    let stem = &series.video.base.filename;
                    let dir = stage_dir
                        .join(&self.settings.servers.series_dir)
                        .join(stem);
                    let ctx = ArtworkContext {
                        server_name,
                        publication_root: self.storage.publication_path(server),
                        library_dir: &self.settings.servers.series_dir,
                    };
                    write_text(&dir.join("tvshow.nfo"), &generate_tvshow_nfo(series, &ctx))?;
                    for episode in &series.episodes {
                        let ep_stem =
                            episode_stem(stem, episode.actual_season, episode.actual_episode);
                        write_text(
                            &dir.join(format!("{}.nfo", ep_stem)),
                            &generate_episode_nfo(series, episode, &ctx),
                        )?;
                        for subtitle in &episode.subtitles {
                            stage_subtitle(&dir, &ep_stem, subtitle)?;
                        }
                    }
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let generator = ScriptGenerator::new(self.settings, &self.storage, server);
        let script = generator.generate(&view, obsolete, &stage_dir.display().to_string());
        let script_path = output_dir.join(format!("publish_{}.sh", server_name));
        write_text(&script_path, &script)?;
        Ok(script_path)
    }
}

/// Write a regenerated SRT into the staging directory.
fn stage_subtitle(dir: &Path, stem: &str, subtitle: &SubtitleFile) -> Result<()> {
    if let Some(ref document) = subtitle.document {
        write_text(
            &dir.join(format!("{}.{}", stem, subtitle.file.extension)),
            &subtitles::serialize(document),
        )?;
    }
    Ok(())
}

/// Read and parse every reachable subtitle source on an item. Missing
/// or unreadable sources are logged and left for a raw copy.
fn load_subtitle_documents(item: &mut MediaItem) {
    let mut load = |subtitle: &mut SubtitleFile| {
        if subtitle.document.is_some() || subtitle.file.local_path.is_empty() {
            return;
        }
        let path = Path::new(&subtitle.file.local_path);
        if !path.exists() {
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(text) => subtitle.document = Some(subtitles::parse(&text)),
            Err(e) => {
                tracing::warn!("failed to read subtitle {:?}: {}", path, e);
            }
        }
    };

    match item {
        MediaItem::Movie(movie) => {
            for subtitle in &mut movie.subtitles {
                load(subtitle);
            }
        }
        MediaItem::Series(series) => {
            for episode in &mut series.episodes {
                for subtitle in &mut episode.subtitles {
                    load(subtitle);
                }
            }
        }
    }
}
