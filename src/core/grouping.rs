//! Media-group merging.
//!
//! Series sharing a media group are published as one synthetic series
//! whose seasons stack in `(media_group, title_sort)` order. Episode
//! numbering accumulates strictly in traversal order, member images
//! are reclassified into season artwork, and the original ungrouped
//! collection is kept so folders a previous publish run laid out per
//! member can be removed.

use crate::models::files::{ImageFile, ImageKind, SeasonScope};
use crate::models::media::Series;
use std::collections::BTreeSet;

/// Result of a grouping pass.
#[derive(Debug, Clone, Default)]
pub struct GroupingOutcome {
    /// One entry per distinct media group (or the original entry when
    /// ungrouped).
    pub grouped: Vec<Series>,
    /// The per-language-expanded input, ordered as traversed. Kept
    /// for obsolete-folder detection only.
    pub ungrouped: Vec<Series>,
}

/// Merge series sharing a media group.
pub fn group_by_media_group(series: Vec<Series>) -> GroupingOutcome {
    let mut sorted = series;
    // Stable sort: ties keep input order.
    sorted.sort_by(|a, b| {
        (&a.video.base.media_group, &a.video.base.title_sort)
            .cmp(&(&b.video.base.media_group, &b.video.base.title_sort))
    });

    let mut grouped = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let group = &sorted[start].video.base.media_group;
        let mut end = start + 1;
        if !group.is_empty() {
            while end < sorted.len() && &sorted[end].video.base.media_group == group {
                end += 1;
            }
        }
        if end - start == 1 {
            grouped.push(sorted[start].clone());
        } else {
            grouped.push(merge_run(&sorted[start..end]));
            tracing::debug!(
                "merged {} series into media group '{}'",
                end - start,
                group
            );
        }
        start = end;
    }

    GroupingOutcome {
        grouped,
        ungrouped: sorted,
    }
}

/// Folder stems of ungrouped entries that a merged series supersedes.
pub fn obsolete_folders(outcome: &GroupingOutcome) -> Vec<String> {
    let mut folders = Vec::new();
    for series in &outcome.ungrouped {
        let group = &series.video.base.media_group;
        if group.is_empty() {
            continue;
        }
        let superseded = outcome
            .grouped
            .iter()
            .any(|merged| {
                &merged.video.base.media_group == group
                    && merged.video.base.filename != series.video.base.filename
            });
        if superseded && !folders.contains(&series.video.base.filename) {
            folders.push(series.video.base.filename.clone());
        }
    }
    folders
}

/// Merge one run of series sharing a media group into a synthetic
/// series.
fn merge_run(members: &[Series]) -> Series {
    let first = &members[0];
    let group = first.video.base.media_group.clone();

    let mut merged = Series {
        video: first.video.clone(),
        ..Default::default()
    };
    // The merged entry is named by its group; descriptive fields stay
    // the first member's.
    merged.video.base.title = group.clone();
    merged.video.base.title_sort = group.clone();
    merged.video.base.title_original = group;
    merged.video.base.images.clear();
    merged.video.actors.clear();

    // Only the first member's non-season-scoped base images seed the
    // synthetic series' own artwork.
    for image in &first.video.base.images {
        if image.kind.is_base() && image.season == SeasonScope::Unscoped {
            merged.video.base.images.push(image.clone());
        }
    }

    // Season slot 0 is reserved for specials; regular seasons stack
    // from 1.
    let mut current_season_count: u32 = 1;
    let mut seen_all_seasons: BTreeSet<ImageKind> = BTreeSet::new();
    let mut seen_specials: BTreeSet<ImageKind> = BTreeSet::new();
    let mut per_season: Vec<u32> = vec![0];
    let mut total_episodes: u32 = 0;
    let mut regular_episodes: u32 = 0;
    let mut specials: u32 = 0;

    for (member_index, member) in members.iter().enumerate() {
        let first_season_in_series = current_season_count;
        let offset = first_season_in_series - 1;

        merge_member_images(
            &mut merged,
            member,
            member_index == 0,
            offset,
            &mut seen_all_seasons,
            &mut seen_specials,
        );

        for actor in &member.video.actors {
            let mut actor = actor.clone();
            if let Some(season) = actor.season {
                if season > 0 {
                    actor.season = Some(season + offset);
                }
            }
            let duplicate = merged
                .video
                .actors
                .iter()
                .any(|a| a.name == actor.name && a.season == actor.season);
            if !duplicate {
                actor.order = merged.video.actors.len() as u32;
                merged.video.actors.push(actor);
            }
        }

        for episode in &member.episodes {
            let mut episode = episode.clone();
            if episode.actual_season != 0 {
                episode.actual_season += offset;
            }
            if episode.display_season > 0 {
                episode.display_season += offset;
            }

            let season_slot = episode.actual_season as usize;
            if per_season.len() <= season_slot {
                per_season.resize(season_slot + 1, 0);
            }
            per_season[season_slot] += 1;
            total_episodes += 1;
            if episode.is_special {
                specials += 1;
            } else {
                regular_episodes += 1;
            }
            // Numbering is the running count at time of insertion.
            episode.actual_episode = per_season[season_slot];
            episode.display_episode = total_episodes;

            if !episode.is_special && episode.video.base.plot.is_empty() {
                episode.video.base.plot = member.video.base.plot.clone();
            }
            for director in &member.video.directors {
                if !episode.video.directors.contains(director) {
                    episode.video.directors.push(director.clone());
                }
            }
            for writer in &member.video.writers {
                if !episode.video.writers.contains(writer) {
                    episode.video.writers.push(writer.clone());
                }
            }
            for actor in &member.video.actors {
                if !episode.video.actors.iter().any(|a| a.name == actor.name) {
                    let mut actor = actor.clone();
                    actor.order = episode.video.actors.len() as u32;
                    episode.video.actors.push(actor);
                }
            }

            merged.episodes.push(episode);
        }

        current_season_count += member.max_season();
    }

    merged.number_of_total_episodes = total_episodes;
    merged.number_of_episodes = regular_episodes;
    merged.number_of_specials = specials;
    merged.episodes_per_season = per_season;

    // Filename last, once all episodes are attached.
    merged.video.base.derive_filename();
    merged
}

/// Fold one member's artwork into the merged series.
fn merge_member_images(
    merged: &mut Series,
    member: &Series,
    is_first: bool,
    offset: u32,
    seen_all_seasons: &mut BTreeSet<ImageKind>,
    seen_specials: &mut BTreeSet<ImageKind>,
) {
    // Kinds for which this member carries its own season-1 artwork;
    // an unscoped image of such a kind would collide with it.
    let member_season1: BTreeSet<ImageKind> = member
        .video
        .base
        .images
        .iter()
        .filter(|i| i.season == SeasonScope::Season(1))
        .map(|i| i.kind.season_kind().unwrap_or(i.kind))
        .collect();

    for image in &member.video.base.images {
        let mut image: ImageFile = image.clone();

        if let Some(season_kind) = image.kind.season_kind() {
            image.kind = season_kind;
        } else if image.season == SeasonScope::Unscoped {
            // Unscoped artwork without a season counterpart (back
            // covers, extra fanart) stays base-level and only the
            // first member contributes it.
            if !is_first {
                continue;
            }
            if image.kind.is_base() {
                // Already seeded from the first member's base images.
                continue;
            }
            merged.video.base.images.push(image);
            continue;
        }

        if image.season == SeasonScope::Unscoped {
            if member_season1.contains(&image.kind) {
                continue;
            }
            image.season = SeasonScope::Season(1);
        }

        match image.season {
            SeasonScope::AllSeasons => {
                if !seen_all_seasons.insert(image.kind) {
                    continue;
                }
            }
            SeasonScope::Specials => {
                if !seen_specials.insert(image.kind) {
                    continue;
                }
            }
            SeasonScope::Season(n) => {
                image.season = SeasonScope::Season(n + offset);
            }
            SeasonScope::Unscoped => {}
        }

        merged.video.base.images.push(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::{FileBase, VideoFile};
    use crate::models::media::{Episode, Person};

    fn episode(season: u32, special: bool) -> Episode {
        Episode {
            actual_season: season,
            display_season: season,
            is_special: special,
            files: vec![VideoFile {
                file: FileBase {
                    filename: "part.mkv".to_string(),
                    server: Some(0),
                    ..Default::default()
                },
                is_special: false,
            }],
            ..Default::default()
        }
    }

    fn member(group: &str, sort: &str, episodes: Vec<Episode>) -> Series {
        let mut series = Series::default();
        series.video.base.title = sort.to_string();
        series.video.base.title_sort = sort.to_string();
        series.video.base.media_group = group.to_string();
        series.video.base.publishing_year = Some(2001);
        series.episodes = episodes;
        series.recount();
        series.video.base.derive_filename();
        series
    }

    #[test]
    fn test_singleton_run_passes_through() {
        let outcome = group_by_media_group(vec![member("", "Solo", vec![episode(1, false)])]);
        assert_eq!(outcome.grouped.len(), 1);
        assert_eq!(outcome.grouped[0].video.base.title, "Solo");
    }

    #[test]
    fn test_empty_groups_never_merge() {
        let outcome = group_by_media_group(vec![
            member("", "A", vec![episode(1, false)]),
            member("", "B", vec![episode(1, false)]),
        ]);
        assert_eq!(outcome.grouped.len(), 2);
    }

    #[test]
    fn test_episode_numbering_accumulates() {
        // A: 2 regular + 1 special; B: 3 regular. Shared group.
        let a = member(
            "Saga",
            "Saga A",
            vec![episode(1, false), episode(1, false), episode(0, true)],
        );
        let b = member(
            "Saga",
            "Saga B",
            vec![episode(1, false), episode(1, false), episode(1, false)],
        );
        let outcome = group_by_media_group(vec![a, b]);
        assert_eq!(outcome.grouped.len(), 1);
        let merged = &outcome.grouped[0];

        assert_eq!(merged.number_of_episodes, 5);
        assert_eq!(merged.number_of_specials, 1);
        assert_eq!(merged.number_of_total_episodes, 6);

        // B's first episode: first within its shifted season, fourth
        // in the running total.
        let b_first = &merged.episodes[3];
        assert_eq!(b_first.actual_episode, 1);
        assert_eq!(b_first.display_episode, 4);
    }

    #[test]
    fn test_season_shifting() {
        // A spans specials + season 1, so B's season 1 lands on 2.
        let a = member(
            "Saga",
            "Saga A",
            vec![episode(1, false), episode(1, false), episode(0, true)],
        );
        let b = member("Saga", "Saga B", vec![episode(1, false), episode(0, true)]);
        let outcome = group_by_media_group(vec![a, b]);
        let merged = &outcome.grouped[0];

        let b_regular = &merged.episodes[3];
        assert_eq!(b_regular.actual_season, 2);
        let b_special = &merged.episodes[4];
        assert_eq!(b_special.actual_season, 0);
        assert_eq!(merged.episodes_per_season, vec![2, 2, 1]);
    }

    #[test]
    fn test_plot_inheritance_and_crew_union() {
        let mut a = member("Saga", "Saga A", vec![episode(1, false)]);
        a.video.base.plot = "Member plot".to_string();
        a.video.directors.push(Person {
            name: "R. Director".to_string(),
        });
        let b = member("Saga", "Saga B", vec![episode(1, false)]);
        let outcome = group_by_media_group(vec![a, b]);
        let merged = &outcome.grouped[0];

        assert_eq!(merged.episodes[0].video.base.plot, "Member plot");
        assert_eq!(merged.episodes[0].video.directors.len(), 1);
    }

    #[test]
    fn test_base_images_reclassified_per_member() {
        let image = |kind, season| ImageFile {
            file: FileBase {
                filename: format!("{}.jpg", ImageKind::token(kind)),
                ..Default::default()
            },
            kind,
            season,
            index: 0,
        };
        let mut a = member("Saga", "Saga A", vec![episode(1, false)]);
        a.video.base.images = vec![
            image(ImageKind::CoverFront, SeasonScope::Unscoped),
            image(ImageKind::Backdrop, SeasonScope::Unscoped),
        ];
        let mut b = member("Saga", "Saga B", vec![episode(1, false)]);
        b.video.base.images = vec![image(ImageKind::CoverFront, SeasonScope::Unscoped)];

        let outcome = group_by_media_group(vec![a, b]);
        let merged = &outcome.grouped[0];

        // First member seeds base artwork.
        assert!(merged
            .video
            .base
            .images
            .iter()
            .any(|i| i.kind == ImageKind::CoverFront && i.season == SeasonScope::Unscoped));
        // Member covers became season covers: A on season 1, B on 2.
        let season_covers: Vec<SeasonScope> = merged
            .video
            .base
            .images
            .iter()
            .filter(|i| i.kind == ImageKind::SeasonCover)
            .map(|i| i.season)
            .collect();
        assert_eq!(
            season_covers,
            vec![SeasonScope::Season(1), SeasonScope::Season(2)]
        );
    }

    #[test]
    fn test_all_seasons_image_kept_once_per_kind() {
        let image = |kind, season| ImageFile {
            file: FileBase::default(),
            kind,
            season,
            index: 0,
        };
        let mut a = member("Saga", "Saga A", vec![episode(1, false)]);
        a.video.base.images = vec![image(ImageKind::SeasonBackdrop, SeasonScope::AllSeasons)];
        let mut b = member("Saga", "Saga B", vec![episode(1, false)]);
        b.video.base.images = vec![image(ImageKind::SeasonBackdrop, SeasonScope::AllSeasons)];

        let outcome = group_by_media_group(vec![a, b]);
        let count = outcome.grouped[0]
            .video
            .base
            .images
            .iter()
            .filter(|i| i.season == SeasonScope::AllSeasons)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unscoped_default_suppressed_by_own_season1() {
        let image = |kind, season| ImageFile {
            file: FileBase::default(),
            kind,
            season,
            index: 0,
        };
        let mut a = member("Saga", "Saga A", vec![episode(1, false)]);
        // Member already carries an explicit season-1 cover; the
        // unscoped cover must not produce a duplicate default.
        a.video.base.images = vec![
            image(ImageKind::SeasonCover, SeasonScope::Season(1)),
            image(ImageKind::CoverFront, SeasonScope::Unscoped),
        ];
        let b = member("Saga", "Saga B", vec![episode(1, false)]);

        let outcome = group_by_media_group(vec![a, b]);
        let season1_covers = outcome.grouped[0]
            .video
            .base
            .images
            .iter()
            .filter(|i| i.kind == ImageKind::SeasonCover && i.season == SeasonScope::Season(1))
            .count();
        assert_eq!(season1_covers, 1);
    }

    #[test]
    fn test_actor_season_scope_shifted() {
        let mut a = member("Saga", "Saga A", vec![episode(1, false)]);
        a.video.actors.push(crate::models::media::Actor {
            name: "A. Lead".to_string(),
            season: Some(1),
            ..Default::default()
        });
        let mut b = member("Saga", "Saga B", vec![episode(1, false)]);
        b.video.actors.push(crate::models::media::Actor {
            name: "B. Lead".to_string(),
            season: Some(1),
            ..Default::default()
        });

        let outcome = group_by_media_group(vec![a, b]);
        let merged = &outcome.grouped[0];
        let b_lead = merged
            .video
            .actors
            .iter()
            .find(|a| a.name == "B. Lead")
            .unwrap();
        assert_eq!(b_lead.season, Some(2));
    }

    #[test]
    fn test_merged_identity_and_obsolete_folders() {
        let a = member("Saga", "Saga A", vec![episode(1, false)]);
        let b = member("Saga", "Saga B", vec![episode(1, false)]);
        let outcome = group_by_media_group(vec![a, b]);
        let merged = &outcome.grouped[0];
        assert_eq!(merged.video.base.title, "Saga");
        assert_eq!(merged.video.base.filename, "Saga (2001)");

        let obsolete = obsolete_folders(&outcome);
        assert_eq!(
            obsolete,
            vec!["Saga A (2001)".to_string(), "Saga B (2001)".to_string()]
        );
    }
}
