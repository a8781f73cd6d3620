//! Artwork ingestion.
//!
//! Extracts the four base images of a catalog entry, walks its
//! image-typed link entries for per-season artwork, and synthesizes a
//! season poster for every season that only supplies a cover.

use crate::core::export::ExportNode;
use crate::core::resolve::{classify_extension, qualify_filename, resolve_source};
use crate::core::storage::StorageMap;
use crate::core::tags::TagDecoder;
use crate::models::files::{FileBase, ImageFile, ImageKind, SeasonScope};
use crate::models::media::VideoBase;
use crate::Result;

fn is_web_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Build one image file from a catalog source path.
fn make_image(
    storage: &StorageMap,
    source: &str,
    description: &str,
    kind: ImageKind,
    season: SeasonScope,
    index: u32,
    stem: &str,
) -> Result<ImageFile> {
    let mut file = FileBase {
        description: description.to_string(),
        source_path: source.to_string(),
        ..Default::default()
    };
    if is_web_url(source) {
        file.extension = classify_extension(source)
            .map(|(ext, _, _)| ext)
            .unwrap_or_else(|_| "jpg".to_string());
        file.local_path = source.to_string();
    } else {
        let resolved = resolve_source(storage, source)?;
        file.extension = resolved.extension;
        file.local_path = resolved.local_path;
        file.server = Some(resolved.server);
    }
    file.filename = qualify_filename(stem, &file.extension);
    Ok(ImageFile {
        file,
        kind,
        season,
        index,
    })
}

/// Filename stem for a scoped image; `_all` marks all-seasons
/// artwork, specials live under season 0.
fn scoped_stem(token: &str, season: SeasonScope, index: u32) -> String {
    match season {
        SeasonScope::Season(n) => format!("season{}_{}", n, token),
        SeasonScope::Specials => format!("season0_{}", token),
        SeasonScope::AllSeasons => format!("{}_all", token),
        SeasonScope::Unscoped if index > 0 => format!("{}{}", token, index),
        SeasonScope::Unscoped => token.to_string(),
    }
}

/// Read all artwork of a catalog entry onto the target entity.
pub fn read_images(
    entry: &ExportNode,
    video: &mut VideoBase,
    is_series: bool,
    decoder: &TagDecoder,
    storage: &StorageMap,
) -> Result<()> {
    let mut images: Vec<ImageFile> = Vec::new();
    let mut extra_backdrop_index = 0u32;
    let mut extra_cover_index = 0u32;

    // Base images. The poster falls back to the front cover so every
    // entry has a poster candidate; the backdrop doubles as the first
    // extra-fanart entry for skins with an extrafanart folder.
    if let Some(node) = entry.child("images") {
        let front = node.text_of("coverfront", "");
        if !front.is_empty() {
            images.push(make_image(
                storage,
                &front,
                "",
                ImageKind::CoverFront,
                SeasonScope::Unscoped,
                0,
                "coverfront",
            )?);
        }
        let back = node.text_of("coverback", "");
        if !back.is_empty() {
            images.push(make_image(
                storage,
                &back,
                "",
                ImageKind::CoverBack,
                SeasonScope::Unscoped,
                0,
                "coverback",
            )?);
        }
        let poster = node.text_of("poster", "");
        let poster_source = if poster.is_empty() { front } else { poster };
        if !poster_source.is_empty() {
            images.push(make_image(
                storage,
                &poster_source,
                "",
                ImageKind::Poster,
                SeasonScope::Unscoped,
                0,
                "poster",
            )?);
        }
        let backdrop = node.text_of("backdrop", "");
        if !backdrop.is_empty() {
            images.push(make_image(
                storage,
                &backdrop,
                "",
                ImageKind::Backdrop,
                SeasonScope::Unscoped,
                0,
                "backdrop",
            )?);
            extra_backdrop_index = 1;
            images.push(make_image(
                storage,
                &backdrop,
                "",
                ImageKind::ExtraBackdrop,
                SeasonScope::Unscoped,
                extra_backdrop_index,
                "extrabackdrop1",
            )?);
        }
    }

    // Per-season and extra artwork from image-typed link entries.
    if let Some(links) = entry.child("links") {
        for link in links.children_named("link") {
            if link.attr("type", "") != "Image" {
                continue;
            }
            let url = link.attr("url", "");
            if url.is_empty() {
                continue;
            }
            let raw_description = link.attr("description", "");
            let (description, tags) = decoder.decode(&raw_description);
            let season = tags.season.unwrap_or(SeasonScope::Unscoped);
            let lower = description.to_lowercase();

            let (kind, season, index) = if lower.contains("extrabackdrop") {
                extra_backdrop_index += 1;
                (ImageKind::ExtraBackdrop, SeasonScope::Unscoped, extra_backdrop_index)
            } else if lower.contains("extracover") {
                // Cover-type extras only exist for movie folders.
                if is_series {
                    tracing::warn!("ignoring extra cover on series image link: {raw_description}");
                    continue;
                }
                extra_cover_index += 1;
                (ImageKind::ExtraCover, SeasonScope::Unscoped, extra_cover_index)
            } else if lower.contains("backdrop") {
                match season {
                    SeasonScope::Unscoped => {
                        extra_backdrop_index += 1;
                        (ImageKind::ExtraBackdrop, SeasonScope::Unscoped, extra_backdrop_index)
                    }
                    scoped => (ImageKind::SeasonBackdrop, scoped, 0),
                }
            } else if lower.contains("poster") {
                match season {
                    SeasonScope::Unscoped => (ImageKind::Poster, SeasonScope::Unscoped, 1),
                    scoped => (ImageKind::SeasonPoster, scoped, 0),
                }
            } else if lower.contains("cover") {
                match season {
                    SeasonScope::Unscoped => (ImageKind::CoverFront, SeasonScope::Unscoped, 1),
                    scoped => (ImageKind::SeasonCover, scoped, 0),
                }
            } else {
                tracing::debug!("unrecognized image link description: {raw_description}");
                (ImageKind::Unknown, season, 0)
            };

            let stem = scoped_stem(kind.token(), season, index);
            images.push(make_image(
                storage,
                &url,
                &raw_description,
                kind,
                season,
                index,
                &stem,
            )?);
        }
    }

    synthesize_season_posters(&mut images);

    video.base.images = images;
    Ok(())
}

/// Every season that has a cover but no poster gets one cloned from
/// the cover, so the library always finds a poster candidate.
pub fn synthesize_season_posters(images: &mut Vec<ImageFile>) {
    let cover_seasons: Vec<SeasonScope> = images
        .iter()
        .filter(|i| i.kind == ImageKind::SeasonCover)
        .map(|i| i.season)
        .collect();

    for season in cover_seasons {
        let has_poster = images
            .iter()
            .any(|i| i.kind == ImageKind::SeasonPoster && i.season == season);
        if has_poster {
            continue;
        }
        let cover = images
            .iter()
            .find(|i| i.kind == ImageKind::SeasonCover && i.season == season)
            .cloned();
        if let Some(cover) = cover {
            let mut poster = cover;
            poster.kind = ImageKind::SeasonPoster;
            poster.file.filename = poster.file.filename.replace("cover", "poster");
            images.push(poster);
        }
    }
}
