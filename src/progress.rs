//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche di conversione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Accumulo delle statistiche della run (`RunSummary`)
//! - Calcolo percentuali di riduzione e byte risparmiati
//! - Report finale con statistiche aggregate
//!
//! ## Componenti principali:
//! - `ProgressManager`: Gestisce progress bar principale
//! - `RunSummary`: Conteggi e totali, scritto solo dall'aggregatore
//!
//! ## Statistiche tracciate:
//! - **succeeded**: File convertiti con successo
//! - **failed**: File non convertiti (decode, encode, write)
//! - **skipped**: File saltati (dry run o output già presente)
//! - **original_bytes** / **output_bytes**: Somma delle dimensioni dei soli successi
//! - **elapsed**: Tempo totale della run
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) [OK] photo.jpg
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a conversion run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager che non disegna nulla (modalità JSON e test)
    pub fn hidden(total_files: u64) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::hidden()),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Esegue `f` nascondendo temporaneamente la barra (per i warning)
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Accumulated counts and byte totals of a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub original_bytes: u64,
    pub output_bytes: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, original_bytes: u64, output_bytes: u64) {
        self.succeeded += 1;
        self.original_bytes += original_bytes;
        self.output_bytes += output_bytes;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_failed(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    pub fn bytes_saved(&self) -> u64 {
        self.original_bytes.saturating_sub(self.output_bytes)
    }

    pub fn reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.original_bytes, self.output_bytes)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Succeeded: {} | Failed: {} | Skipped: {} | Saved: {} ({:.1}%)",
            self.succeeded,
            self.failed,
            self.skipped,
            FileManager::format_size(self.bytes_saved()),
            self.reduction_percent()
        )
    }

    /// Righe del report finale, nell'ordine in cui vengono stampate
    pub fn report_lines(&self) -> Vec<String> {
        vec![
            format!("Succeeded: {}", self.succeeded),
            format!("Failed: {}", self.failed),
            format!("Skipped: {}", self.skipped),
            format!("Original size: {}", FileManager::format_size(self.original_bytes)),
            format!("Output size: {}", FileManager::format_size(self.output_bytes)),
            format!("Reduction: {:.1}%", self.reduction_percent()),
            format!("Space saved: {}", FileManager::format_size(self.bytes_saved())),
            format!("Elapsed: {:.2}s", self.elapsed.as_secs_f64()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accumulates() {
        let mut summary = RunSummary::new();
        summary.add_success(1000, 250);
        summary.add_success(3000, 750);
        summary.add_failed();
        summary.add_skipped();

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.original_bytes, 4000);
        assert_eq!(summary.output_bytes, 1000);
        assert_eq!(summary.bytes_saved(), 3000);
        assert_eq!(summary.reduction_percent(), 75.0);
    }

    #[test]
    fn test_summary_when_output_grows() {
        let mut summary = RunSummary::new();
        summary.add_success(100, 150);
        assert_eq!(summary.bytes_saved(), 0);
        assert_eq!(summary.reduction_percent(), -50.0);
    }

    #[test]
    fn test_report_lines() {
        let mut summary = RunSummary::new();
        summary.add_success(2048, 1024);
        summary.elapsed = Duration::from_millis(1500);

        let lines = summary.report_lines();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Succeeded: 1");
        assert_eq!(lines[5], "Reduction: 50.0%");
        assert_eq!(lines[6], "Space saved: 1.00 KB");
        assert_eq!(lines[7], "Elapsed: 1.50s");
    }

    #[test]
    fn test_hidden_progress_counts() {
        let progress = ProgressManager::hidden(3);
        progress.update("a");
        progress.update("b");
        assert_eq!(progress.bar.length(), Some(3));
        assert_eq!(progress.bar.position(), 2);
        assert!(progress.bar.is_hidden());
    }
}
