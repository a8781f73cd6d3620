//! Configuration model.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Kodi-side settings.
    pub kodi: KodiSettings,
    /// Catalog-side settings.
    pub catalog: CatalogSettings,
    /// Server-side settings.
    pub servers: ServerSettings,
}

/// Kodi-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KodiSettings {
    /// Name of the Kodi skin the output is tuned for.
    pub skin: String,
    /// Publish movie collections as series (one episode per movie).
    pub movies_as_series: bool,
}

/// Catalog-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Path to the catalog XML export.
    pub export_path: PathBuf,
    /// Marker string the catalog uses to tag specials.
    pub specials_marker: String,
    /// Marker string the catalog uses to tag movie extras.
    pub movies_marker: String,
    /// Fallback language (ISO code) when an entry declares none.
    pub default_language: String,
    /// ISO code -> descriptive word, used when rewriting titles
    /// between language variants.
    pub language_words: BTreeMap<String, String>,
}

/// Server-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Storage servers, in index order.
    pub servers: Vec<ServerEntry>,
    /// How catalog paths map onto server filesystems.
    pub path_style: PathStyle,
    /// Whether publish scripts copy or symlink media files.
    pub link_mode: LinkMode,
    /// Subdirectory for movies under each publication root.
    pub movies_dir: String,
    /// Subdirectory for series under each publication root.
    pub series_dir: String,
}

/// One storage server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Server name, used in share URLs and script names.
    pub name: String,
    /// Drive letter the catalog uses for this server's storage.
    pub drive_letter: String,
    /// Local path the drive letter maps to.
    pub storage_path: String,
    /// Root the publish script writes the library into.
    pub publication_path: String,
}

/// Path separator convention of the server filesystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Windows,
    Unix,
}

/// How the publish scripts place media files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    Copy,
    Symlink,
}

impl Default for KodiSettings {
    fn default() -> Self {
        Self {
            skin: "Confluence".to_string(),
            movies_as_series: false,
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        let mut language_words = BTreeMap::new();
        for (code, word) in [
            ("en", "English"),
            ("de", "German"),
            ("fr", "French"),
            ("es", "Spanish"),
            ("it", "Italian"),
            ("nl", "Dutch"),
        ] {
            language_words.insert(code.to_string(), word.to_string());
        }
        Self {
            export_path: PathBuf::from("export.xml"),
            specials_marker: "(Specials)".to_string(),
            movies_marker: "(Movies)".to_string(),
            default_language: "en".to_string(),
            language_words,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            path_style: PathStyle::Unix,
            link_mode: LinkMode::Symlink,
            movies_dir: "Movies".to_string(),
            series_dir: "Series".to_string(),
        }
    }
}

impl CatalogSettings {
    /// Descriptive word for a language code, falling back to the
    /// static lookup table and finally the code itself.
    pub fn language_word(&self, code: &str) -> String {
        if let Some(word) = self.language_words.get(code) {
            return word.clone();
        }
        crate::utils::lookup::language_name(code).to_string()
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_publisher")
}

/// Default location of the settings file.
pub fn default_settings_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load settings from an explicit file, surfacing parse errors.
pub fn load_settings_from(path: &std::path::Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load settings from the default location, falling back to defaults.
pub fn load_settings() -> Settings {
    let config_path = default_settings_path();

    if config_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(settings) = toml::from_str(&content) {
                return settings;
            }
        }
    }

    Settings::default()
}
