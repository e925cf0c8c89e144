//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione robusta dei parametri di input prima di ogni elaborazione
//! - Rifiuta le combinazioni di flag incompatibili
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `format`: Formato di output (`jpg` o `webp`, default: jpg)
//! - `quality`: Qualità encoder (1-100, default: 87 per jpg, 82 per webp)
//! - `max_size`: Dimensione massima del lato più lungo in pixel (default: 2400)
//! - `workers`: Numero di worker paralleli (1-16, default: 1)
//! - `naming` / `layout`: Politiche di naming e struttura directory
//! - `skip_existing`: Salta i file già presenti in destinazione
//! - `dry_run`: Simulazione senza scrivere nulla (default: false)
//! - `include`: Filtro opzionale sulle estensioni
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100 e max_size > 0
//! - Controlla che workers sia 1-16 (mai clampato silenziosamente)
//! - Rifiuta naming sequenziale con `--preserve-dirs`
//! - Rifiuta `--skip-existing` senza `--keep-names`
//! - Controlla che sorgente e destinazione esistano e siano directory
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     source_dir: PathBuf::from("vacation"),
//!     destination_base: PathBuf::from("out"),
//!     format: OutputFormat::Webp,
//!     quality: 70,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use crate::optimizer::path_resolver::{LayoutPolicy, NamingPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of parallel workers accepted on the command line
pub const MAX_WORKERS: usize = 16;

/// Default longest-side limit in pixels
pub const DEFAULT_MAX_SIZE: u32 = 2400;

/// Formato di output supportato
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Webp,
}

impl OutputFormat {
    /// Estensione canonica (senza punto)
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    /// Qualità di default quando l'utente non la specifica
    pub fn default_quality(&self) -> u8 {
        match self {
            OutputFormat::Jpg => 87,
            OutputFormat::Webp => 82,
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpg
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source folder to scan recursively
    pub source_dir: PathBuf,
    /// Base folder; outputs land in `destination_base/<source folder name>`
    pub destination_base: PathBuf,
    /// Output format
    pub format: OutputFormat,
    /// Encoder quality (1-100)
    pub quality: u8,
    /// Longest side limit in pixels
    pub max_size: u32,
    /// Number of parallel workers (1-16)
    pub workers: usize,
    /// Output file naming
    pub naming: NamingPolicy,
    /// Output directory layout
    pub layout: LayoutPolicy,
    /// Skip items whose destination already exists
    pub skip_existing: bool,
    /// Dry run - discover and name, never decode or write
    pub dry_run: bool,
    /// Optional extension allow-list (already normalized or raw, both accepted)
    pub include: Option<Vec<String>>,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            destination_base: PathBuf::new(),
            format: OutputFormat::Jpg,
            quality: OutputFormat::Jpg.default_quality(),
            max_size: DEFAULT_MAX_SIZE,
            workers: 1,
            naming: NamingPolicy::Sequential,
            layout: LayoutPolicy::Flatten,
            skip_existing: false,
            dry_run: false,
            include: None,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(OptimizeError::Configuration(format!(
                "Number of processes must be between 1 and {} (got {})",
                MAX_WORKERS, self.workers
            )));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(OptimizeError::Configuration(format!(
                "Quality must be between 1 and 100 (got {})",
                self.quality
            )));
        }

        if self.max_size == 0 {
            return Err(OptimizeError::Configuration(
                "Max size must be a positive number of pixels".to_string(),
            ));
        }

        if self.naming == NamingPolicy::Sequential && self.layout == LayoutPolicy::PreserveDirs {
            return Err(OptimizeError::Configuration(
                "--preserve-dirs requires --keep-names (sequential numbering flattens the output)"
                    .to_string(),
            ));
        }

        // Sequential naming can't reliably map existing files to source files
        if self.skip_existing && self.naming == NamingPolicy::Sequential {
            return Err(OptimizeError::Configuration(
                "--skip-existing only works together with --keep-names".to_string(),
            ));
        }

        if !self.source_dir.is_dir() {
            return Err(OptimizeError::Configuration(format!(
                "Source folder '{}' does not exist or is not a directory",
                self.source_dir.display()
            )));
        }

        if !self.destination_base.is_dir() {
            return Err(OptimizeError::Configuration(format!(
                "Destination '{}' does not exist or is not a directory",
                self.destination_base.display()
            )));
        }

        self.source_name()?;

        Ok(())
    }

    /// Nome della cartella sorgente, usato come prefisso e come cartella di output
    pub fn source_name(&self) -> Result<String, OptimizeError> {
        source_folder_name(&self.source_dir)
    }
}

/// Nome della cartella così come l'ha scritto l'utente (un symlink tiene il
/// proprio nome). Solo `.` e `..` vengono risolti sul path reale.
pub fn source_folder_name(source_dir: &Path) -> Result<String, OptimizeError> {
    let name = match source_dir.file_name() {
        Some(name) => Some(name.to_os_string()),
        None => source_dir
            .canonicalize()
            .ok()
            .and_then(|resolved| resolved.file_name().map(|name| name.to_os_string())),
    };

    name.map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            OptimizeError::Configuration(format!(
                "Cannot derive a folder name from '{}'",
                source_dir.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config(temp: &TempDir) -> Config {
        let source = temp.path().join("vacation");
        let destination = temp.path().join("out");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(&destination).unwrap();

        Config {
            source_dir: source,
            destination_base: destination,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.format, OutputFormat::Jpg);
        assert_eq!(config.quality, 87);
        assert_eq!(config.max_size, 2400);
        assert_eq!(config.workers, 1);
        assert_eq!(config.naming, NamingPolicy::Sequential);
        assert_eq!(config.layout, LayoutPolicy::Flatten);
        assert!(!config.dry_run);
        assert!(!config.skip_existing);
    }

    #[test]
    fn test_format_defaults() {
        assert_eq!(OutputFormat::Jpg.default_quality(), 87);
        assert_eq!(OutputFormat::Webp.default_quality(), 82);
        assert_eq!(OutputFormat::Webp.extension(), "webp");
        assert_eq!(OutputFormat::Jpg.to_string(), "JPG");
    }

    #[test]
    fn test_config_validation() {
        let temp = TempDir::new().unwrap();
        let mut config = valid_config(&temp);
        assert!(config.validate().is_ok());

        config.workers = 0;
        assert!(config.validate().is_err());
        config.workers = 17;
        assert!(config.validate().is_err());
        config.workers = 16;
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().is_err());
        config.quality = 101;
        assert!(config.validate().is_err());
        config.quality = 100;
        assert!(config.validate().is_ok());

        config.max_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_sequential_with_preserve_dirs() {
        let temp = TempDir::new().unwrap();
        let mut config = valid_config(&temp);
        config.layout = LayoutPolicy::PreserveDirs;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, OptimizeError::Configuration(_)));

        config.naming = NamingPolicy::KeepNames;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_skip_existing_without_keep_names() {
        let temp = TempDir::new().unwrap();
        let mut config = valid_config(&temp);
        config.skip_existing = true;
        assert!(matches!(
            config.validate(),
            Err(OptimizeError::Configuration(_))
        ));

        config.naming = NamingPolicy::KeepNames;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_missing_folders() {
        let temp = TempDir::new().unwrap();
        let mut config = valid_config(&temp);
        config.source_dir = temp.path().join("missing");
        assert!(config.validate().is_err());

        let mut config = valid_config(&temp);
        config.destination_base = temp.path().join("missing");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_name() {
        let temp = TempDir::new().unwrap();
        let config = valid_config(&temp);
        assert_eq!(config.source_name().unwrap(), "vacation");

        // Trailing slash e `..` finiscono comunque sul nome della cartella
        let with_slash = PathBuf::from(format!("{}/", config.source_dir.display()));
        assert_eq!(source_folder_name(&with_slash).unwrap(), "vacation");
        std::fs::create_dir_all(config.source_dir.join("day1")).unwrap();
        assert_eq!(
            source_folder_name(&config.source_dir.join("day1").join("..")).unwrap(),
            "vacation"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_source_name_keeps_symlink_name() {
        let temp = TempDir::new().unwrap();
        let config = valid_config(&temp);
        let link = temp.path().join("pics");
        std::os::unix::fs::symlink(&config.source_dir, &link).unwrap();

        assert_eq!(source_folder_name(&link).unwrap(), "pics");

        let config = Config {
            source_dir: link,
            ..config
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.source_name().unwrap(), "pics");
    }
}
