//! NFO file generator (Kodi compatible).

use crate::models::files::{ImageFile, ImageKind, SeasonScope};
use crate::models::media::{Episode, Movie, Series, VideoBase, VideoDefinition};

/// Where published artwork lives, for building share references.
#[derive(Debug, Clone)]
pub struct ArtworkContext<'a> {
    /// Server name used as the share host.
    pub server_name: &'a str,
    /// Publication root on that server.
    pub publication_root: &'a str,
    /// Library subdirectory (movies or series).
    pub library_dir: &'a str,
}

impl ArtworkContext<'_> {
    /// Share reference for a published image, or the original URL for
    /// images the catalog linked from the web.
    pub fn image_url(&self, media_stem: &str, image: &ImageFile) -> String {
        if image.file.server.is_none() {
            return image.file.source_path.clone();
        }
        format!(
            "smb://{}/{}/{}/{}/{}",
            self.server_name,
            self.publication_root.trim_matches('/'),
            self.library_dir,
            media_stem,
            image.file.filename
        )
    }
}

/// Generate movie NFO content (Kodi/Emby/Jellyfin compatible).
pub fn generate_movie_nfo(movie: &Movie, ctx: &ArtworkContext<'_>) -> String {
    let video = &movie.video;
    let base = &video.base;
    let mut nfo = String::new();

    nfo.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    nfo.push_str("<movie>\n");

    push_common_header(&mut nfo, video);

    if !base.publishing_date.is_empty() {
        nfo.push_str(&format!("  <premiered>{}</premiered>\n", base.publishing_date));
    }

    push_crew(&mut nfo, video);
    push_fileinfo(&mut nfo, video);

    for image in images_of_kind(base, ImageKind::Poster)
        .chain(images_of_kind(base, ImageKind::CoverFront))
    {
        nfo.push_str(&format!(
            "  <thumb aspect=\"poster\">{}</thumb>\n",
            escape_xml(&ctx.image_url(&base.filename, image))
        ));
    }
    push_fanart(&mut nfo, base, ctx);

    nfo.push_str("</movie>\n");
    nfo
}

/// Generate TV show NFO content.
pub fn generate_tvshow_nfo(series: &Series, ctx: &ArtworkContext<'_>) -> String {
    let video = &series.video;
    let base = &video.base;
    let mut nfo = String::new();

    nfo.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    nfo.push_str("<tvshow>\n");

    push_common_header(&mut nfo, video);

    if !base.publishing_date.is_empty() {
        nfo.push_str(&format!("  <premiered>{}</premiered>\n", base.publishing_date));
    }
    nfo.push_str(&format!("  <season>{}</season>\n", series.max_season()));
    nfo.push_str(&format!("  <episode>{}</episode>\n", series.number_of_episodes));

    push_crew(&mut nfo, video);

    for image in images_of_kind(base, ImageKind::Poster)
        .chain(images_of_kind(base, ImageKind::CoverFront))
    {
        nfo.push_str(&format!(
            "  <thumb aspect=\"poster\">{}</thumb>\n",
            escape_xml(&ctx.image_url(&base.filename, image))
        ));
    }
    for image in base.images.iter().filter(|i| i.kind == ImageKind::SeasonPoster) {
        let season = match image.season {
            SeasonScope::Season(n) => n.to_string(),
            SeasonScope::Specials => "0".to_string(),
            SeasonScope::AllSeasons => "-1".to_string(),
            SeasonScope::Unscoped => continue,
        };
        nfo.push_str(&format!(
            "  <thumb aspect=\"poster\" type=\"season\" season=\"{}\">{}</thumb>\n",
            season,
            escape_xml(&ctx.image_url(&base.filename, image))
        ));
    }
    push_fanart(&mut nfo, base, ctx);

    nfo.push_str("</tvshow>\n");
    nfo
}

/// Generate episode NFO content.
pub fn generate_episode_nfo(
    series: &Series,
    episode: &Episode,
    ctx: &ArtworkContext<'_>,
) -> String {
    let video = &episode.video;
    let base = &video.base;
    let mut nfo = String::new();

    nfo.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    nfo.push_str("<episodedetails>\n");

    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&base.title)));
    nfo.push_str(&format!(
        "  <showtitle>{}</showtitle>\n",
        escape_xml(&series.video.base.title)
    ));
    nfo.push_str(&format!("  <season>{}</season>\n", episode.actual_season));
    nfo.push_str(&format!("  <episode>{}</episode>\n", episode.actual_episode));
    if episode.is_special
        && (episode.display_season != episode.actual_season
            || episode.display_episode != episode.actual_episode)
    {
        nfo.push_str(&format!(
            "  <displayseason>{}</displayseason>\n",
            episode.display_season
        ));
        nfo.push_str(&format!(
            "  <displayepisode>{}</displayepisode>\n",
            episode.display_episode
        ));
    }

    if let Some(rating) = base.rating {
        nfo.push_str(&format!("  <rating>{:.1}</rating>\n", rating));
    }
    if !base.publishing_date.is_empty() {
        nfo.push_str(&format!("  <aired>{}</aired>\n", base.publishing_date));
    }
    if !base.plot.is_empty() {
        nfo.push_str(&format!("  <plot>{}</plot>\n", escape_xml(&base.plot)));
    }
    if video.play_count > 0 {
        nfo.push_str(&format!("  <playcount>{}</playcount>\n", video.play_count));
        if !video.play_date.is_empty() {
            nfo.push_str(&format!("  <lastplayed>{}</lastplayed>\n", video.play_date));
        }
    }

    push_crew(&mut nfo, video);
    push_fileinfo(&mut nfo, video);

    for image in images_of_kind(base, ImageKind::EpisodeCover) {
        nfo.push_str(&format!(
            "  <thumb>{}</thumb>\n",
            escape_xml(&ctx.image_url(&series.video.base.filename, image))
        ));
    }

    nfo.push_str("</episodedetails>\n");
    nfo
}

/// Shared title/identity/descriptive block.
fn push_common_header(nfo: &mut String, video: &VideoBase) {
    let base = &video.base;

    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&base.title)));
    if !base.title_sort.is_empty() {
        nfo.push_str(&format!(
            "  <sorttitle>{}</sorttitle>\n",
            escape_xml(&base.title_sort)
        ));
    }
    if !base.title_original.is_empty() {
        nfo.push_str(&format!(
            "  <originaltitle>{}</originaltitle>\n",
            escape_xml(&base.title_original)
        ));
    }
    if !base.media_group.is_empty() {
        nfo.push_str(&format!("  <set>{}</set>\n", escape_xml(&base.media_group)));
    }
    if let Some(rating) = base.rating {
        nfo.push_str(&format!("  <rating>{:.1}</rating>\n", rating));
    }
    if let Some(year) = base.publishing_year {
        nfo.push_str(&format!("  <year>{}</year>\n", year));
    }
    if !base.plot.is_empty() {
        nfo.push_str(&format!("  <plot>{}</plot>\n", escape_xml(&base.plot)));
        nfo.push_str(&format!("  <outline>{}</outline>\n", escape_xml(&base.plot)));
    }
    if let Some(runtime) = base.runtime {
        nfo.push_str(&format!("  <runtime>{}</runtime>\n", runtime));
    }
    if !video.mpaa.is_empty() {
        nfo.push_str(&format!("  <mpaa>{}</mpaa>\n", escape_xml(&video.mpaa)));
    }
    if video.play_count > 0 {
        nfo.push_str(&format!("  <playcount>{}</playcount>\n", video.play_count));
        if !video.play_date.is_empty() {
            nfo.push_str(&format!("  <lastplayed>{}</lastplayed>\n", video.play_date));
        }
    }
    if !video.imdb_id.is_empty() {
        nfo.push_str(&format!("  <id>{}</id>\n", video.imdb_id));
        nfo.push_str(&format!(
            "  <uniqueid type=\"imdb\" default=\"true\">{}</uniqueid>\n",
            video.imdb_id
        ));
    }
    if !video.tmdb_id.is_empty() {
        nfo.push_str(&format!(
            "  <uniqueid type=\"tmdb\">{}</uniqueid>\n",
            video.tmdb_id
        ));
    }
    if !base.country.is_empty() {
        nfo.push_str(&format!("  <country>{}</country>\n", escape_xml(&base.country)));
    }
    for genre in &base.genres {
        nfo.push_str(&format!("  <genre>{}</genre>\n", escape_xml(genre)));
    }
    for studio in &base.studios {
        nfo.push_str(&format!("  <studio>{}</studio>\n", escape_xml(studio)));
    }
}

/// Crew and cast block.
fn push_crew(nfo: &mut String, video: &VideoBase) {
    for writer in &video.writers {
        nfo.push_str(&format!("  <credits>{}</credits>\n", escape_xml(&writer.name)));
    }
    for director in &video.directors {
        nfo.push_str(&format!(
            "  <director>{}</director>\n",
            escape_xml(&director.name)
        ));
    }
    for actor in &video.actors {
        nfo.push_str("  <actor>\n");
        nfo.push_str(&format!("    <name>{}</name>\n", escape_xml(&actor.name)));
        if !actor.role.is_empty() {
            nfo.push_str(&format!("    <role>{}</role>\n", escape_xml(&actor.role)));
        }
        nfo.push_str(&format!("    <order>{}</order>\n", actor.order));
        nfo.push_str("  </actor>\n");
    }
}

/// Technical stream details block.
fn push_fileinfo(nfo: &mut String, video: &VideoBase) {
    let has_video_info = video.video_codec.is_some()
        || video.aspect_ratio.is_some()
        || video.video_definition.is_some();
    if !has_video_info && video.audio_streams.is_empty() && video.subtitle_streams.is_empty() {
        return;
    }

    nfo.push_str("  <fileinfo>\n");
    nfo.push_str("    <streamdetails>\n");

    if has_video_info {
        nfo.push_str("      <video>\n");
        if let Some(codec) = video.video_codec {
            nfo.push_str(&format!(
                "        <codec>{}</codec>\n",
                codec.to_string().to_lowercase()
            ));
        }
        if let Some(aspect) = video.aspect_ratio {
            nfo.push_str(&format!("        <aspect>{:.2}</aspect>\n", aspect.as_number()));
        }
        if let Some(definition) = video.video_definition {
            let (width, height) = match definition {
                VideoDefinition::Sd => (720, 576),
                VideoDefinition::Hd => (1920, 1080),
            };
            nfo.push_str(&format!("        <width>{}</width>\n", width));
            nfo.push_str(&format!("        <height>{}</height>\n", height));
        }
        nfo.push_str("      </video>\n");
    }

    for audio in &video.audio_streams {
        nfo.push_str("      <audio>\n");
        if !audio.codec.is_empty() {
            nfo.push_str(&format!("        <codec>{}</codec>\n", escape_xml(&audio.codec)));
        }
        if !audio.language.is_empty() {
            nfo.push_str(&format!(
                "        <language>{}</language>\n",
                escape_xml(&audio.language)
            ));
        }
        if audio.channels > 0 {
            nfo.push_str(&format!("        <channels>{}</channels>\n", audio.channels));
        }
        nfo.push_str("      </audio>\n");
    }

    for subtitle in &video.subtitle_streams {
        nfo.push_str("      <subtitle>\n");
        nfo.push_str(&format!(
            "        <language>{}</language>\n",
            escape_xml(&subtitle.language)
        ));
        nfo.push_str("      </subtitle>\n");
    }

    nfo.push_str("    </streamdetails>\n");
    nfo.push_str("  </fileinfo>\n");
}

/// Fanart block from backdrop-type images.
fn push_fanart(
    nfo: &mut String,
    base: &crate::models::media::MediaBase,
    ctx: &ArtworkContext<'_>,
) {
    let backdrops: Vec<&ImageFile> = base
        .images
        .iter()
        .filter(|i| matches!(i.kind, ImageKind::Backdrop | ImageKind::ExtraBackdrop))
        .collect();
    if backdrops.is_empty() {
        return;
    }
    nfo.push_str("  <fanart>\n");
    for image in backdrops {
        nfo.push_str(&format!(
            "    <thumb>{}</thumb>\n",
            escape_xml(&ctx.image_url(&base.filename, image))
        ));
    }
    nfo.push_str("  </fanart>\n");
}

fn images_of_kind(
    base: &crate::models::media::MediaBase,
    kind: ImageKind,
) -> impl Iterator<Item = &ImageFile> {
    base.images.iter().filter(move |i| i.kind == kind)
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
