//! Static lookup tables: recognized extensions, MIME types, and
//! ISO-639 language names.

/// Supported video file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    // Common formats
    "mkv", "mp4", "avi", "mov", "wmv", // Additional formats
    "m4v", "ts", "m2ts", "flv", "webm", // Less common but supported
    "mpg", "mpeg", "vob", "ogv", "divx", "iso",
];

/// Supported image file extensions (after normalization).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "tbn", "bmp", "gif"];

/// Subtitle container extension; always carries a language part in
/// front (`<lang>.srt` or `<lang>.forced.srt`).
pub const SUBTITLE_EXTENSION: &str = "srt";

/// Normalize an extension: lowercase, `jpeg` folded into `jpg`.
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_lowercase();
    if lower == "jpeg" {
        "jpg".to_string()
    } else {
        lower
    }
}

/// Whether the (normalized) extension is a recognized video format.
pub fn is_video_extension(ext: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&normalize_extension(ext).as_str())
}

/// Whether the (normalized) extension is a recognized image format.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&normalize_extension(ext).as_str())
}

/// MIME type for a recognized extension.
pub fn mime_type(ext: &str) -> &'static str {
    match normalize_extension(ext).as_str() {
        "mkv" => "video/x-matroska",
        "mp4" | "m4v" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "ts" | "m2ts" => "video/mp2t",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "mpg" | "mpeg" | "vob" => "video/mpeg",
        "ogv" => "video/ogg",
        "divx" => "video/x-msvideo",
        "iso" => "application/x-iso9660-image",
        "jpg" => "image/jpeg",
        "png" => "image/png",
        "tbn" => "image/jpeg",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "srt" => "application/x-subrip",
        _ => "application/octet-stream",
    }
}

/// English name for an ISO-639-1 language code; falls back to the
/// code itself for unknown codes.
pub fn language_name(code: &str) -> &str {
    match code.to_lowercase().as_str() {
        "en" => "English",
        "de" => "German",
        "fr" => "French",
        "es" => "Spanish",
        "it" => "Italian",
        "nl" => "Dutch",
        "pt" => "Portuguese",
        "sv" => "Swedish",
        "no" => "Norwegian",
        "da" => "Danish",
        "fi" => "Finnish",
        "pl" => "Polish",
        "ru" => "Russian",
        "cs" => "Czech",
        "hu" => "Hungarian",
        "el" => "Greek",
        "tr" => "Turkish",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "he" => "Hebrew",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("JPEG"), "jpg");
        assert_eq!(normalize_extension("jpeg"), "jpg");
        assert_eq!(normalize_extension("MKV"), "mkv");
        assert_eq!(normalize_extension("png"), "png");
    }

    #[test]
    fn test_is_video_extension() {
        assert!(is_video_extension("mkv"));
        assert!(is_video_extension("MKV"));
        assert!(is_video_extension("iso"));
        assert!(!is_video_extension("jpg"));
        assert!(!is_video_extension("srt"));
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("mkv"), "video/x-matroska");
        assert_eq!(mime_type("JPEG"), "image/jpeg");
        assert_eq!(mime_type("srt"), "application/x-subrip");
        assert_eq!(mime_type("xyz"), "application/octet-stream");
    }

    #[test]
    fn test_language_name_fallback() {
        assert_eq!(language_name("de"), "German");
        assert_eq!(language_name("DE"), "German");
        assert_eq!(language_name("xx"), "xx");
    }
}
