//! # File Management Module
//!
//! Questo modulo gestisce la discovery delle immagini sorgente (il catalogo).
//!
//! ## Responsabilità:
//! - Discovery ricorsiva delle immagini nella cartella sorgente
//! - Filtro per formati supportati e per il filtro `--include` opzionale
//! - Ordinamento stabile per path relativo (numerazione deterministica)
//! - Utilità per calcoli dimensioni e percentuali
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati in input:
//! - JPG, JPEG, PNG, BMP, TIFF, TIF, WebP
//!
//! ## Garanzie:
//! - Sola lettura: il catalogo non scrive mai nulla sul filesystem
//! - Un catalogo vuoto non è un errore
//!
//! ## Esempio:
//! ```rust,ignore
//! let include = FileManager::parse_include("jpg,.png");
//! let catalog = FileManager::build_catalog(Path::new("vacation"), include.as_deref())?;
//! for entry in &catalog {
//!     println!("{} ({} bytes)", entry.relative_path.display(), entry.size);
//! }
//! ```

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Input extensions the decoder is built for
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// A discovered source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Absolute (or as-walked) path of the file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative_path: PathBuf,
    /// Lower-cased extension without the dot
    pub extension: String,
    /// Size in bytes at discovery time
    pub size: u64,
}

/// Manages file discovery and size helpers
pub struct FileManager;

impl FileManager {
    /// Normalizza una lista di estensioni: minuscolo, senza punto iniziale, senza vuoti
    pub fn normalize_extensions<I, S>(raw: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = raw
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        set.into_iter().collect()
    }

    /// Parse the comma separated `--include` value
    pub fn parse_include(csv: &str) -> Vec<String> {
        Self::normalize_extensions(csv.split(','))
    }

    /// Build the ordered catalog of eligible images below `source_root`
    pub fn build_catalog(source_root: &Path, include: Option<&[String]>) -> Result<Vec<SourceEntry>> {
        let allowed: Vec<String> = match include {
            Some(filter) => {
                let wanted = Self::normalize_extensions(filter);
                let allowed: Vec<String> = wanted
                    .into_iter()
                    .filter(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
                    .collect();
                if allowed.is_empty() {
                    warn!("No valid image extensions found in --include filter");
                    return Ok(Vec::new());
                }
                allowed
            }
            None => SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        };

        let mut catalog = Vec::new();

        for entry in WalkDir::new(source_root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", source_root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = Self::extension_of(path) else {
                continue;
            };
            if !allowed.contains(&extension) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Skipping {}: cannot read metadata: {}", path.display(), e);
                    continue;
                }
            };

            let relative_path = path
                .strip_prefix(source_root)
                .unwrap_or(path)
                .to_path_buf();

            catalog.push(SourceEntry {
                path: path.to_path_buf(),
                relative_path,
                extension,
                size,
            });
        }

        catalog.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!("Catalog built: {} images under {}", catalog.len(), source_root.display());

        Ok(catalog)
    }

    /// Lower-cased extension without the leading dot
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction (negative when the output grew)
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, bytes: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![0u8; bytes]).unwrap();
    }

    fn names(catalog: &[SourceEntry]) -> Vec<String> {
        catalog
            .iter()
            .map(|e| e.relative_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_normalize_extensions() {
        let normalized = FileManager::parse_include(" JPG, .png ,,.Webp, jpg");
        assert_eq!(normalized, vec!["jpg", "png", "webp"]);
    }

    #[test]
    fn test_catalog_is_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("b.JPG"), 10);
        touch(&root.join("a.png"), 20);
        touch(&root.join("sub/c.tiff"), 30);
        touch(&root.join("notes.txt"), 5);
        touch(&root.join("anim.gif"), 5);

        let catalog = FileManager::build_catalog(root, None).unwrap();
        assert_eq!(names(&catalog), vec!["a.png", "b.JPG", "sub/c.tiff"]);

        let b = &catalog[1];
        assert_eq!(b.extension, "jpg");
        assert_eq!(b.size, 10);
        assert_eq!(b.path, root.join("b.JPG"));
    }

    #[test]
    fn test_include_filter() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("one.jpg"), 1);
        touch(&root.join("two.png"), 1);
        touch(&root.join("three.webp"), 1);
        touch(&root.join("four.gif"), 1);

        let include = FileManager::parse_include("jpg,.png");
        let catalog = FileManager::build_catalog(root, Some(&include)).unwrap();
        assert_eq!(names(&catalog), vec!["one.jpg", "two.png"]);
    }

    #[test]
    fn test_include_filter_without_supported_formats() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("one.gif"), 1);
        touch(&temp.path().join("two.jpg"), 1);

        let include = FileManager::parse_include("gif");
        let catalog = FileManager::build_catalog(temp.path(), Some(&include)).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_empty_folder_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let catalog = FileManager::build_catalog(temp.path(), None).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_is_deterministic() {
        let temp = TempDir::new().unwrap();
        for name in ["z.jpg", "m.png", "a/b.webp", "a.bmp"] {
            touch(&temp.path().join(name), 1);
        }
        let first = FileManager::build_catalog(temp.path(), None).unwrap();
        let second = FileManager::build_catalog(temp.path(), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(10 * 1024 * 1024), "10.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
        assert!(FileManager::calculate_reduction(100, 150) < 0.0);
    }
}
