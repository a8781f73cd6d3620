//! Inline title-tag decoder.
//!
//! Catalog titles carry bracket-delimited tokens describing technical
//! attributes, e.g. `"Foo (HD)(16:9)(L en de)"`. The decoder scans a
//! raw title, collects the structured attributes, and returns the
//! cleaned title with every recognized token removed. Decoding a
//! title without tokens returns it unchanged.

use crate::models::config::Settings;
use crate::models::files::SeasonScope;
use crate::models::media::{AspectRatio, VideoBase, VideoCodec, VideoDefinition};
use regex::Regex;

/// Skin whose Kodi build renders TV/BluRay sources through H264.
const H264_ONLY_SKIN: &str = "Transparency!";

/// Structured attributes decoded out of a title.
#[derive(Debug, Clone, Default)]
pub struct DecodedTags {
    pub codec: Option<VideoCodec>,
    pub definition: Option<VideoDefinition>,
    pub aspect_ratio: Option<AspectRatio>,
    /// MPAA override from an `(F...)` token.
    pub mpaa: Option<String>,
    /// User rating override from an `(R...)` token.
    pub rating: Option<f32>,
    /// Season override from an `(S...)` token.
    pub season: Option<SeasonScope>,
    /// Language set replacement from the rightmost `(L...)` token.
    pub languages: Option<Vec<String>>,
    pub special: bool,
    pub movie: bool,
}

impl DecodedTags {
    /// Write the video-level attributes onto a target entity. Season,
    /// special and movie markers are context-dependent and consumed
    /// by the caller.
    pub fn apply_to(&self, video: &mut VideoBase) {
        if let Some(codec) = self.codec {
            video.video_codec = Some(codec);
        }
        if let Some(definition) = self.definition {
            video.video_definition = Some(definition);
        }
        if let Some(aspect) = self.aspect_ratio {
            video.aspect_ratio = Some(aspect);
        }
        if let Some(ref mpaa) = self.mpaa {
            video.mpaa = mpaa.clone();
        }
        if let Some(rating) = self.rating {
            video.base.rating = Some(rating);
        }
        if let Some(ref languages) = self.languages {
            video.base.media_languages = languages.clone();
        }
    }
}

/// Title-tag decoder, configured once per run.
#[derive(Debug)]
pub struct TagDecoder {
    map_to_h264: bool,
    specials_marker: String,
    movies_marker: String,
    mpaa_re: Regex,
    rating_re: Regex,
    season_re: Regex,
    language_re: Regex,
}

impl TagDecoder {
    pub fn new(settings: &Settings) -> Self {
        Self {
            map_to_h264: settings.kodi.skin == H264_ONLY_SKIN,
            specials_marker: settings.catalog.specials_marker.clone(),
            movies_marker: settings.catalog.movies_marker.clone(),
            mpaa_re: Regex::new(r"\(F([0-9A-Za-z-]+)\)").unwrap(),
            rating_re: Regex::new(r"\(R(\d+(?:[.,]\d+)?)\)").unwrap(),
            season_re: Regex::new(r"\(S(\d+|all|spe)\)").unwrap(),
            language_re: Regex::new(r"\(L((?:\s+[A-Za-z]{2,3})+)\)").unwrap(),
        }
    }

    /// Decode a raw title into the cleaned title and its tags.
    pub fn decode(&self, raw: &str) -> (String, DecodedTags) {
        let mut tags = DecodedTags::default();
        let mut title = raw.to_string();
        let mut removed = false;

        let tv_codec = if self.map_to_h264 {
            VideoCodec::H264
        } else {
            VideoCodec::Tv
        };
        let bluray_codec = if self.map_to_h264 {
            VideoCodec::H264
        } else {
            VideoCodec::BluRay
        };

        let mut take = |title: &mut String, token: &str| -> bool {
            if title.contains(token) {
                *title = title.replace(token, "");
                removed = true;
                true
            } else {
                false
            }
        };

        if take(&mut title, "(TV)") {
            tags.codec = Some(tv_codec);
        }
        if take(&mut title, "(BluRay)") {
            tags.codec = Some(bluray_codec);
        }
        if take(&mut title, "(H264)") {
            tags.codec = Some(VideoCodec::H264);
        }
        if take(&mut title, "(H265)") {
            tags.codec = Some(VideoCodec::H265);
        }
        if take(&mut title, "(SD)") {
            tags.definition = Some(VideoDefinition::Sd);
        }
        if take(&mut title, "(HD)") {
            tags.definition = Some(VideoDefinition::Hd);
        }
        if take(&mut title, "(4:3)") {
            tags.aspect_ratio = Some(AspectRatio::Ratio4x3);
        }
        if take(&mut title, "(16:9)") {
            tags.aspect_ratio = Some(AspectRatio::Ratio16x9);
        }
        if take(&mut title, "(21:9)") {
            tags.aspect_ratio = Some(AspectRatio::Ratio21x9);
        }
        if take(&mut title, "(Special)") {
            tags.special = true;
        }
        if !self.specials_marker.is_empty() && take(&mut title, &self.specials_marker) {
            tags.special = true;
        }
        if !self.movies_marker.is_empty() && take(&mut title, &self.movies_marker) {
            tags.movie = true;
        }

        if let Some(caps) = self.mpaa_re.captures(&title) {
            tags.mpaa = Some(caps[1].to_string());
            title = self.mpaa_re.replace_all(&title, "").into_owned();
            removed = true;
        }
        if let Some(caps) = self.rating_re.captures(&title) {
            tags.rating = caps[1].replace(',', ".").parse::<f32>().ok();
            title = self.rating_re.replace_all(&title, "").into_owned();
            removed = true;
        }
        if let Some(caps) = self.season_re.captures(&title) {
            tags.season = Some(match &caps[1] {
                "all" => SeasonScope::AllSeasons,
                "spe" => SeasonScope::Specials,
                number => SeasonScope::Season(number.parse().unwrap_or(0)),
            });
            title = self.season_re.replace_all(&title, "").into_owned();
            removed = true;
        }
        // A title may carry several parenthetical groups; only the
        // rightmost language tag is honored.
        if let Some(caps) = self.language_re.captures_iter(&title).last() {
            tags.languages = Some(
                caps[1]
                    .split_whitespace()
                    .map(|code| code.to_lowercase())
                    .collect(),
            );
            title = self.language_re.replace_all(&title, "").into_owned();
            removed = true;
        }

        if removed {
            title = collapse_whitespace(&title);
        }
        (title, tags)
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !last_was_space {
                out.push(c);
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> TagDecoder {
        TagDecoder::new(&Settings::default())
    }

    #[test]
    fn test_clean_title_unchanged() {
        let (title, tags) = decoder().decode("The Quiet Earth");
        assert_eq!(title, "The Quiet Earth");
        assert!(tags.codec.is_none());
        assert!(tags.languages.is_none());
        assert!(!tags.special);
    }

    #[test]
    fn test_decode_is_idempotent() {
        let decoder = decoder();
        let (once, _) = decoder.decode("Foo (HD)(16:9)");
        let (twice, tags) = decoder.decode(&once);
        assert_eq!(once, twice);
        assert!(tags.definition.is_none());
    }

    #[test]
    fn test_combined_tokens() {
        let (title, tags) = decoder().decode("Foo (HD)(16:9)(L en de)");
        assert_eq!(title, "Foo");
        assert_eq!(tags.definition, Some(VideoDefinition::Hd));
        assert_eq!(tags.aspect_ratio, Some(AspectRatio::Ratio16x9));
        assert_eq!(
            tags.languages,
            Some(vec!["en".to_string(), "de".to_string()])
        );
    }

    #[test]
    fn test_rightmost_language_tag_wins() {
        let (title, tags) = decoder().decode("Foo (L en)(L de fr)");
        assert_eq!(title, "Foo");
        assert_eq!(
            tags.languages,
            Some(vec!["de".to_string(), "fr".to_string()])
        );
    }

    #[test]
    fn test_codec_tokens() {
        let (_, tags) = decoder().decode("Foo (TV)");
        assert_eq!(tags.codec, Some(VideoCodec::Tv));
        let (_, tags) = decoder().decode("Foo (BluRay)");
        assert_eq!(tags.codec, Some(VideoCodec::BluRay));
        let (_, tags) = decoder().decode("Foo (H265)");
        assert_eq!(tags.codec, Some(VideoCodec::H265));
    }

    #[test]
    fn test_transparency_skin_maps_to_h264() {
        let mut settings = Settings::default();
        settings.kodi.skin = "Transparency!".to_string();
        let decoder = TagDecoder::new(&settings);
        let (_, tags) = decoder.decode("Foo (TV)");
        assert_eq!(tags.codec, Some(VideoCodec::H264));
        let (_, tags) = decoder.decode("Foo (BluRay)");
        assert_eq!(tags.codec, Some(VideoCodec::H264));
    }

    #[test]
    fn test_mpaa_and_rating_overrides() {
        let (title, tags) = decoder().decode("Foo (F16)(R7,5)");
        assert_eq!(title, "Foo");
        assert_eq!(tags.mpaa.as_deref(), Some("16"));
        assert_eq!(tags.rating, Some(7.5));
    }

    #[test]
    fn test_season_override_variants() {
        let (_, tags) = decoder().decode("Disc 2 (S3)");
        assert_eq!(tags.season, Some(SeasonScope::Season(3)));
        let (_, tags) = decoder().decode("Backdrop (Sall)");
        assert_eq!(tags.season, Some(SeasonScope::AllSeasons));
        let (_, tags) = decoder().decode("Backdrop (Sspe)");
        assert_eq!(tags.season, Some(SeasonScope::Specials));
    }

    #[test]
    fn test_special_and_marker_strings() {
        let (title, tags) = decoder().decode("Gag Reel (Special)");
        assert_eq!(title, "Gag Reel");
        assert!(tags.special);

        let (_, tags) = decoder().decode("Extras (Specials)");
        assert!(tags.special);
        let (_, tags) = decoder().decode("Extras (Movies)");
        assert!(tags.movie);
    }

    #[test]
    fn test_apply_to_video() {
        let (_, tags) = decoder().decode("Foo (HD)(21:9)(F12)(L de)");
        let mut video = VideoBase::default();
        tags.apply_to(&mut video);
        assert_eq!(video.video_definition, Some(VideoDefinition::Hd));
        assert_eq!(video.aspect_ratio, Some(AspectRatio::Ratio21x9));
        assert_eq!(video.mpaa, "12");
        assert_eq!(video.base.media_languages, vec!["de".to_string()]);
    }
}
