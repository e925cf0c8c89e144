//! # Task Optimizer Module
//!
//! Worker per l'elaborazione di singoli `WorkItem`.
//! Decide al momento dell'esecuzione se simulare, saltare o convertire,
//! così il controllo "già esistente" non corre contro la pianificazione.

use crate::{
    config::Config,
    image_processor::ImageProcessor,
    optimizer::path_resolver::WorkItem,
    outcome::{Outcome, SkipReason},
};
use tracing::debug;

/// Worker ottimizzato per elaborazione singoli file
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    pub image_processor: ImageProcessor,
    pub skip_existing: bool,
    pub dry_run: bool,
}

impl TaskOptimizer {
    /// Crea nuovo task optimizer
    pub fn new(config: &Config) -> Self {
        Self {
            image_processor: ImageProcessor::new(config.format, config.quality, config.max_size),
            skip_existing: config.skip_existing,
            dry_run: config.dry_run,
        }
    }

    /// Processa un singolo item. Bloccante: va eseguito fuori dal runtime async.
    pub fn process(&self, item: &WorkItem) -> Outcome {
        if self.dry_run {
            debug!("[DRY RUN] {} -> {}", item.entry.path.display(), item.destination.display());
            return Outcome::skipped(SkipReason::DryRun);
        }

        if self.skip_existing && item.destination.exists() {
            debug!(
                "[SKIP] Output already exists: {} -> {}",
                item.entry.path.display(),
                item.destination.display()
            );
            return Outcome::skipped(SkipReason::AlreadyExists);
        }

        self.image_processor
            .transform(&item.entry.path, &item.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_manager::SourceEntry;
    use crate::outcome::FailureKind;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn work_item(source: &Path, destination: &Path) -> WorkItem {
        WorkItem {
            entry: SourceEntry {
                path: source.to_path_buf(),
                relative_path: source.file_name().unwrap().into(),
                extension: "png".to_string(),
                size: fs::metadata(source).map(|m| m.len()).unwrap_or(0),
            },
            destination: destination.to_path_buf(),
            index: 1,
        }
    }

    fn source_png(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("a.png");
        RgbImage::from_pixel(20, 10, Rgb([40, 80, 120]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let source = source_png(temp.path());
        let destination = temp.path().join("out/vacation/a.jpg");

        let task = TaskOptimizer::new(&Config {
            dry_run: true,
            ..Default::default()
        });

        assert_eq!(
            task.process(&work_item(&source, &destination)),
            Outcome::Skipped { reason: SkipReason::DryRun }
        );
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_skip_existing_leaves_file_unchanged() {
        let temp = TempDir::new().unwrap();
        let source = source_png(temp.path());
        let destination = temp.path().join("a.jpg");
        fs::write(&destination, b"previous run").unwrap();

        let task = TaskOptimizer::new(&Config {
            skip_existing: true,
            ..Default::default()
        });

        assert_eq!(
            task.process(&work_item(&source, &destination)),
            Outcome::Skipped { reason: SkipReason::AlreadyExists }
        );
        assert_eq!(fs::read(&destination).unwrap(), b"previous run");
    }

    #[test]
    fn test_skip_existing_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let source = source_png(temp.path());
        let destination = temp.path().join("fresh/a.jpg");

        let task = TaskOptimizer::new(&Config {
            skip_existing: true,
            ..Default::default()
        });

        assert!(matches!(
            task.process(&work_item(&source, &destination)),
            Outcome::Success { .. }
        ));
        assert!(destination.exists());
    }

    #[test]
    fn test_overwrites_without_skip_existing() {
        let temp = TempDir::new().unwrap();
        let source = source_png(temp.path());
        let destination = temp.path().join("a.jpg");
        fs::write(&destination, b"stale").unwrap();

        let task = TaskOptimizer::new(&Config::default());
        assert!(matches!(
            task.process(&work_item(&source, &destination)),
            Outcome::Success { .. }
        ));
        assert_ne!(fs::read(&destination).unwrap(), b"stale");
    }

    #[test]
    fn test_missing_source_is_a_decode_failure() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("gone.png");
        let destination = temp.path().join("gone.jpg");

        let task = TaskOptimizer::new(&Config::default());
        let outcome = task.process(&work_item(&source, &destination));
        assert!(matches!(outcome, Outcome::Failed { kind: FailureKind::Decode, .. }));
    }
}
