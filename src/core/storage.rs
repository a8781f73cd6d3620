//! Storage server map.
//!
//! Resolves the catalog's drive-letter paths onto configured storage
//! servers. Built once from the settings and used by every
//! path-resolution step.

use crate::models::config::{PathStyle, ServerSettings};
use crate::{Error, Result};

/// Bidirectional lookup between server index, name, drive letter and
/// local paths.
#[derive(Debug, Clone)]
pub struct StorageMap {
    entries: Vec<ServerMapping>,
    style: PathStyle,
}

#[derive(Debug, Clone)]
struct ServerMapping {
    name: String,
    drive_letter: char,
    storage_path: String,
    publication_path: String,
}

impl StorageMap {
    /// Build the map from server settings, validating drive letters.
    pub fn new(settings: &ServerSettings) -> Result<Self> {
        let mut entries = Vec::with_capacity(settings.servers.len());
        for server in &settings.servers {
            let mut chars = server.drive_letter.chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
                _ => {
                    return Err(Error::InvalidConfig(format!(
                        "server '{}' has invalid drive letter '{}'",
                        server.name, server.drive_letter
                    )))
                }
            };
            if entries.iter().any(|e: &ServerMapping| e.drive_letter == letter) {
                return Err(Error::DuplicateDriveLetter(letter));
            }
            entries.push(ServerMapping {
                name: server.name.clone(),
                drive_letter: letter,
                storage_path: server.storage_path.clone(),
                publication_path: server.publication_path.clone(),
            });
        }
        Ok(Self {
            entries,
            style: settings.path_style,
        })
    }

    pub fn server_count(&self) -> usize {
        self.entries.len()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.entries[index].name
    }

    pub fn drive_letter(&self, index: usize) -> char {
        self.entries[index].drive_letter
    }

    pub fn storage_path(&self, index: usize) -> &str {
        &self.entries[index].storage_path
    }

    pub fn publication_path(&self, index: usize) -> &str {
        &self.entries[index].publication_path
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn index_of_drive(&self, letter: char) -> Option<usize> {
        let upper = letter.to_ascii_uppercase();
        self.entries.iter().position(|e| e.drive_letter == upper)
    }

    /// Resolve a catalog path (`X:\dir\file`) to the owning server
    /// and its local filesystem path. An unmapped drive letter is an
    /// error; files on unknown drives would silently vanish from
    /// every per-server view otherwise.
    pub fn resolve(&self, catalog_path: &str) -> Result<(usize, String)> {
        let mut chars = catalog_path.chars();
        let (letter, colon) = (chars.next(), chars.next());
        let letter = match (letter, colon) {
            (Some(l), Some(':')) if l.is_ascii_alphabetic() => l,
            _ => return Err(Error::UnresolvedServer(catalog_path.to_string())),
        };

        let index = self
            .index_of_drive(letter)
            .ok_or_else(|| Error::UnresolvedServer(catalog_path.to_string()))?;

        let rest = &catalog_path[2..];
        let rest = rest.trim_start_matches(['\\', '/']);
        let local = match self.style {
            PathStyle::Windows => {
                format!("{}\\{}", self.storage_path(index).trim_end_matches('\\'), rest)
            }
            PathStyle::Unix => format!(
                "{}/{}",
                self.storage_path(index).trim_end_matches('/'),
                rest.replace('\\', "/")
            ),
        };
        Ok((index, local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ServerEntry;

    fn settings() -> ServerSettings {
        ServerSettings {
            servers: vec![
                ServerEntry {
                    name: "atlas".to_string(),
                    drive_letter: "M".to_string(),
                    storage_path: "/srv/atlas/media".to_string(),
                    publication_path: "/srv/atlas/kodi".to_string(),
                },
                ServerEntry {
                    name: "borei".to_string(),
                    drive_letter: "N".to_string(),
                    storage_path: "/srv/borei/media".to_string(),
                    publication_path: "/srv/borei/kodi".to_string(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_round_trip() {
        let map = StorageMap::new(&settings()).unwrap();
        for index in 0..map.server_count() {
            let path = format!("{}:\\Movies\\x.mkv", map.drive_letter(index));
            let (server, local) = map.resolve(&path).unwrap();
            assert_eq!(server, index);
            assert_eq!(local, format!("{}/Movies/x.mkv", map.storage_path(index)));
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let map = StorageMap::new(&settings()).unwrap();
        let (server, _) = map.resolve("m:\\Movies\\x.mkv").unwrap();
        assert_eq!(server, 0);
    }

    #[test]
    fn test_unmapped_drive_is_error() {
        let map = StorageMap::new(&settings()).unwrap();
        let result = map.resolve("Z:\\Movies\\x.mkv");
        assert!(matches!(result, Err(Error::UnresolvedServer(_))));
    }

    #[test]
    fn test_duplicate_drive_letter_rejected() {
        let mut cfg = settings();
        cfg.servers[1].drive_letter = "m".to_string();
        assert!(matches!(
            StorageMap::new(&cfg),
            Err(Error::DuplicateDriveLetter('M'))
        ));
    }
}
