//! Media file path resolution.
//!
//! Converts a catalog-side path into its local filesystem path,
//! normalized extension and owning server. Subtitle files carry a
//! two-part extension (`<lang>.srt` or `<lang>.forced.srt`); video
//! and image extensions pass through the recognized sets.

use crate::core::storage::StorageMap;
use crate::models::files::FileBase;
use crate::utils::lookup;
use crate::{Error, Result};

/// Outcome of resolving a catalog path.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    pub server: usize,
    pub local_path: String,
    /// Normalized extension, including the language part for
    /// subtitles (`de.srt`, `de.forced.srt`).
    pub extension: String,
    /// Subtitle language, when the path is a subtitle file.
    pub language: Option<String>,
    pub forced: bool,
}

/// Append an extension to a filename unless it is already qualified
/// with it. Re-appending a matching extension is a no-op.
pub fn qualify_filename(name: &str, extension: &str) -> String {
    if extension.is_empty() || name.is_empty() {
        return name.to_string();
    }
    let suffix = format!(".{}", extension.to_lowercase());
    if name.to_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Basename of a path in either separator convention.
fn basename(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

fn is_language_code(part: &str) -> bool {
    (2..=3).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphabetic())
}

/// Classify the extension of a catalog path.
///
/// Returns `(extension, language, forced)`. Unrecognized extensions
/// fail; the caller is expected to skip the owning media item, not
/// abort the run.
pub fn classify_extension(path: &str) -> Result<(String, Option<String>, bool)> {
    let name = basename(path);
    let parts: Vec<&str> = name.split('.').collect();

    let last = parts
        .last()
        .map(|p| lookup::normalize_extension(p))
        .unwrap_or_default();

    if last == lookup::SUBTITLE_EXTENSION {
        // foo.de.srt / foo.de.forced.srt
        if parts.len() >= 3 && parts[parts.len() - 2].eq_ignore_ascii_case("forced") {
            let lang = parts[parts.len() - 3];
            if parts.len() >= 4 && is_language_code(lang) {
                let lang = lang.to_lowercase();
                return Ok((format!("{}.forced.srt", lang), Some(lang), true));
            }
        } else if parts.len() >= 3 && is_language_code(parts[parts.len() - 2]) {
            let lang = parts[parts.len() - 2].to_lowercase();
            return Ok((format!("{}.srt", lang), Some(lang), false));
        }
        return Err(Error::UnsupportedExtension {
            path: path.to_string(),
            extension: last,
        });
    }

    if lookup::is_video_extension(&last) || lookup::is_image_extension(&last) {
        return Ok((last, None, false));
    }

    Err(Error::UnsupportedExtension {
        path: path.to_string(),
        extension: last,
    })
}

/// Resolve a catalog path against the storage map.
pub fn resolve_source(storage: &StorageMap, source_path: &str) -> Result<ResolvedPath> {
    let (extension, language, forced) = classify_extension(source_path)?;
    let (server, local_path) = storage.resolve(source_path)?;
    Ok(ResolvedPath {
        server,
        local_path,
        extension,
        language,
        forced,
    })
}

/// Resolve a file in place: local path, extension and owning server.
/// The published filename is left to the caller, which knows the
/// owning media's naming.
pub fn resolve_file(storage: &StorageMap, file: &mut FileBase) -> Result<()> {
    let resolved = resolve_source(storage, &file.source_path)?;
    file.local_path = resolved.local_path;
    file.extension = resolved.extension;
    file.server = Some(resolved.server);
    if let Some(lang) = resolved.language {
        if !file.languages.contains(&lang) {
            file.languages.push(lang);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_video_and_image() {
        let (ext, lang, forced) = classify_extension("M:\\Movies\\x.MKV").unwrap();
        assert_eq!(ext, "mkv");
        assert!(lang.is_none());
        assert!(!forced);

        let (ext, _, _) = classify_extension("M:\\Movies\\cover.JPEG").unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_classify_subtitle_suffixes() {
        let (ext, lang, forced) = classify_extension("M:\\Movies\\x.de.srt").unwrap();
        assert_eq!(ext, "de.srt");
        assert_eq!(lang.as_deref(), Some("de"));
        assert!(!forced);

        let (ext, lang, forced) = classify_extension("M:\\Movies\\x.en.forced.srt").unwrap();
        assert_eq!(ext, "en.forced.srt");
        assert_eq!(lang.as_deref(), Some("en"));
        assert!(forced);
    }

    #[test]
    fn test_bare_srt_is_unsupported() {
        assert!(matches!(
            classify_extension("M:\\Movies\\x.srt"),
            Err(Error::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = classify_extension("M:\\Movies\\x.docx").unwrap_err();
        match err {
            Error::UnsupportedExtension { extension, .. } => assert_eq!(extension, "docx"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_qualify_filename_is_idempotent() {
        assert_eq!(qualify_filename("Foo (2005)", "mkv"), "Foo (2005).mkv");
        assert_eq!(qualify_filename("Foo (2005).mkv", "mkv"), "Foo (2005).mkv");
        assert_eq!(qualify_filename("Foo (2005).MKV", "mkv"), "Foo (2005).MKV");
        assert_eq!(qualify_filename("", "mkv"), "");
    }
}
