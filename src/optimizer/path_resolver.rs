//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path di output.
//! Trasforma il catalogo in una lista ordinata di `WorkItem`, uno per file.
//! Non controlla l'esistenza dei file: lo skip è deciso dal worker.

use crate::config::OutputFormat;
use crate::file_manager::SourceEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Minimum width of the sequential counter
const MIN_COUNTER_DIGITS: usize = 4;

/// Come vengono chiamati i file di output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `<folder>-0001.<ext>`, numbered in catalog order
    Sequential,
    /// Original file stem with the output extension
    KeepNames,
}

/// Come viene organizzata la cartella di output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPolicy {
    Flatten,
    PreserveDirs,
}

/// One source-to-destination conversion task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub entry: SourceEntry,
    pub destination: PathBuf,
    /// 1-based position in the catalog
    pub index: usize,
}

/// Utility per calcolare i path di output in modo centralizzato
#[derive(Debug, Clone)]
pub struct PathResolver {
    source_name: String,
    destination_root: PathBuf,
    naming: NamingPolicy,
    layout: LayoutPolicy,
    format: OutputFormat,
}

impl PathResolver {
    /// `destination_base/<source_name>` diventa la radice di tutti gli output
    pub fn new(
        source_name: impl Into<String>,
        destination_base: &Path,
        naming: NamingPolicy,
        layout: LayoutPolicy,
        format: OutputFormat,
    ) -> Self {
        let source_name = source_name.into();
        let destination_root = destination_base.join(&source_name);
        Self {
            source_name,
            destination_root,
            naming,
            layout,
            format,
        }
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Calcola il path di output per ogni file del catalogo, in ordine
    pub fn resolve(&self, catalog: Vec<SourceEntry>) -> Vec<WorkItem> {
        let digits = Self::counter_digits(catalog.len());

        catalog
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                let index = position + 1;
                let destination = self.output_path(&entry, index, digits);
                debug!("Resolved {} -> {}", entry.relative_path.display(), destination.display());
                WorkItem {
                    entry,
                    destination,
                    index,
                }
            })
            .collect()
    }

    /// Larghezza del contatore: almeno 4 cifre, di più se il catalogo lo richiede
    pub fn counter_digits(total: usize) -> usize {
        total.to_string().len().max(MIN_COUNTER_DIGITS)
    }

    /// Nome sequenziale tipo `vacation-0001.webp`
    pub fn sequential_name(&self, index: usize, digits: usize) -> String {
        format!(
            "{}-{:0width$}.{}",
            self.source_name,
            index,
            self.format.extension(),
            width = digits
        )
    }

    fn output_path(&self, entry: &SourceEntry, index: usize, digits: usize) -> PathBuf {
        match self.naming {
            // Il layout è irrilevante con la numerazione sequenziale
            NamingPolicy::Sequential => self
                .destination_root
                .join(self.sequential_name(index, digits)),
            NamingPolicy::KeepNames => {
                let stem = entry
                    .relative_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let filename = format!("{}.{}", stem, self.format.extension());

                match self.layout {
                    LayoutPolicy::Flatten => self.destination_root.join(filename),
                    LayoutPolicy::PreserveDirs => {
                        let relative_dir = entry.relative_path.parent().unwrap_or(Path::new(""));
                        self.destination_root.join(relative_dir).join(filename)
                    }
                }
            }
        }
    }
}
