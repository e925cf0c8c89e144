//! # Progress Tracking Module
//!
//! Aggregatore unico degli esiti: consuma i `CompletedItem` nell'ordine di
//! arrivo, aggiorna progress bar (o eventi JSON) e accumula il `RunSummary`.
//! È l'unico scrittore delle statistiche: nessun contatore condiviso tra worker.

use crate::{
    json_output::JsonMessage,
    outcome::Outcome,
    progress::{ProgressManager, RunSummary},
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Esito di un item, come viene consegnato dal worker all'aggregatore
#[derive(Debug, Clone)]
pub struct CompletedItem {
    pub index: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: Outcome,
}

/// Tracker che possiede il `RunSummary` della run
pub struct ProgressTracker {
    pub total_files: usize,
    processed: usize,
    summary: RunSummary,
    progress_manager: ProgressManager,
    json_output: bool,
}

impl ProgressTracker {
    /// Crea un nuovo tracker con progress bar visibile
    pub fn new(total_files: usize) -> Self {
        Self::with_manager(total_files, ProgressManager::new(total_files as u64), false)
    }

    /// Tracker per la modalità JSON: nessuna barra, un evento per file
    pub fn json(total_files: usize) -> Self {
        Self::with_manager(total_files, ProgressManager::hidden(total_files as u64), true)
    }

    /// Tracker silenzioso, usato dai test
    pub fn hidden(total_files: usize) -> Self {
        Self::with_manager(total_files, ProgressManager::hidden(total_files as u64), false)
    }

    fn with_manager(total_files: usize, progress_manager: ProgressManager, json_output: bool) -> Self {
        Self {
            total_files,
            processed: 0,
            summary: RunSummary::new(),
            progress_manager,
            json_output,
        }
    }

    /// Registra il completamento di un file
    pub fn record(&mut self, item: CompletedItem) {
        self.processed += 1;

        match &item.outcome {
            Outcome::Success {
                original_bytes,
                output_bytes,
            } => self.summary.add_success(*original_bytes, *output_bytes),
            Outcome::Skipped { .. } => self.summary.add_skipped(),
            Outcome::Failed { kind, message } => {
                self.summary.add_failed();
                if !self.json_output {
                    self.progress_manager.suspend(|| {
                        warn!("Failed to process {} ({}): {}", item.source.display(), kind, message)
                    });
                }
            }
        }

        if self.json_output {
            JsonMessage::file_complete(item.index, &item.source, &item.destination, &item.outcome).emit();
            JsonMessage::progress(self.processed, self.total_files, &self.summary).emit();
        } else {
            let message = format!(
                "[{}] {}",
                status_tag(&item.outcome),
                display_name(&item.source)
            );
            self.progress_manager.update(&message);
        }
    }

    /// Chiude la barra e restituisce il riepilogo finale
    pub fn finish(mut self, elapsed: Duration) -> RunSummary {
        self.summary.elapsed = elapsed;
        if !self.json_output {
            self.progress_manager.finish(&self.summary.format_summary());
        }
        self.summary
    }
}

fn status_tag(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Success { .. } => "OK",
        Outcome::Skipped { .. } => "SKIP",
        Outcome::Failed { .. } => "ERROR",
    }
}

/// Nome file a larghezza fissa, così la barra non salta
pub fn display_name(path: &Path) -> String {
    const WIDTH: usize = 30;

    let name: String = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    let shown = if name.chars().count() > WIDTH {
        let head: String = name.chars().take(WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        name
    };

    format!("{:<width$}", shown, width = WIDTH)
}
