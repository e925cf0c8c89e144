//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (`--json`) per chi
//! pilota il tool da script o da un'altra applicazione.
//!
//! ## Responsabilità:
//! - Emette messaggi JSON, uno per riga, su stdout
//! - Sostituisce la progress bar quando attivo (i log restano su stderr)
//! - Fornisce interfaccia standardizzata per comunicazione inter-processo
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio della run (catalogo e configurazione)
//! - `file_complete`: Fine elaborazione di un file, con esito
//! - `progress`: Progresso corrente dopo ogni file
//! - `complete`: Fine run con il `RunSummary` finale
//! - `error`: Errore fatale (configurazione o runtime)

use crate::config::{Config, OutputFormat};
use crate::optimizer::path_resolver::{LayoutPolicy, NamingPolicy};
use crate::outcome::Outcome;
use crate::progress::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della run
    #[serde(rename = "start")]
    Start {
        source_dir: PathBuf,
        destination_root: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Progresso corrente
    #[serde(rename = "progress")]
    Progress {
        current: usize,
        total: usize,
        percentage: f64,
        succeeded: usize,
        skipped: usize,
        failed: usize,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        index: usize,
        path: PathBuf,
        destination: PathBuf,
        status: String,
        original_size: Option<u64>,
        output_size: Option<u64>,
        reason: Option<String>,
    },

    /// Run completata
    #[serde(rename = "complete")]
    Complete {
        total: usize,
        succeeded: usize,
        failed: usize,
        skipped: usize,
        original_bytes: u64,
        output_bytes: u64,
        bytes_saved: u64,
        reduction_percent: f64,
        duration_seconds: f64,
    },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub format: OutputFormat,
    pub quality: u8,
    pub max_size: u32,
    pub workers: usize,
    pub naming: NamingPolicy,
    pub layout: LayoutPolicy,
    pub skip_existing: bool,
    pub dry_run: bool,
}

impl JsonMessage {
    /// Serializza il messaggio su una riga
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_line() {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(source_dir: PathBuf, destination_root: PathBuf, total_files: usize, config: JsonConfig) -> Self {
        Self::Start {
            source_dir,
            destination_root,
            total_files,
            config,
        }
    }

    /// Crea un messaggio di progresso
    pub fn progress(current: usize, total: usize, summary: &RunSummary) -> Self {
        let percentage = if total > 0 {
            (current as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self::Progress {
            current,
            total,
            percentage,
            succeeded: summary.succeeded,
            skipped: summary.skipped,
            failed: summary.failed,
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(index: usize, path: &Path, destination: &Path, outcome: &Outcome) -> Self {
        let (original_size, output_size, reason) = match outcome {
            Outcome::Success {
                original_bytes,
                output_bytes,
            } => (Some(*original_bytes), Some(*output_bytes), None),
            Outcome::Skipped { reason } => (None, None, Some(reason.to_string())),
            Outcome::Failed { kind, message } => (None, None, Some(format!("{}: {}", kind, message))),
        };

        Self::FileComplete {
            index,
            path: path.to_path_buf(),
            destination: destination.to_path_buf(),
            status: outcome.status().to_string(),
            original_size,
            output_size,
            reason,
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(summary: &RunSummary) -> Self {
        Self::Complete {
            total: summary.total(),
            succeeded: summary.succeeded,
            failed: summary.failed,
            skipped: summary.skipped,
            original_bytes: summary.original_bytes,
            output_bytes: summary.output_bytes,
            bytes_saved: summary.bytes_saved(),
            reduction_percent: summary.reduction_percent(),
            duration_seconds: summary.elapsed.as_secs_f64(),
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

/// Converti Config in JsonConfig
impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            format: config.format,
            quality: config.quality,
            max_size: config.max_size,
            workers: config.workers,
            naming: config.naming,
            layout: config.layout,
            skip_existing: config.skip_existing,
            dry_run: config.dry_run,
        }
    }
}
