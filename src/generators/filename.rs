//! Filename generator.

/// Strip characters that are illegal in published file and folder
/// names.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Published folder/file stem for a media entry.
///
/// Format: `Title (Year)`, year omitted when unknown.
pub fn media_filename(title: &str, year: Option<u16>) -> String {
    let stem = match year {
        Some(year) => format!("{} ({})", title, year),
        None => title.to_string(),
    };
    sanitize_filename(&stem).trim().to_string()
}

/// Published file stem for an episode within a series.
///
/// Format: `Series Stem S02E05`.
pub fn episode_stem(series_stem: &str, season: u32, episode: u32) -> String {
    format!("{} S{:02}E{:02}", series_stem, season, episode)
}

/// Published file stem for one part of a multi-part movie.
///
/// The first part keeps the plain stem; later parts get a `-cdN`
/// suffix so players group them.
pub fn part_stem(stem: &str, part_index: usize, part_count: usize) -> String {
    if part_count > 1 {
        format!("{}-cd{}", stem, part_index + 1)
    } else {
        stem.to_string()
    }
}
