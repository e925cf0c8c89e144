//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore principale che delega responsabilità ai moduli specializzati:
//! catalogo → path di output → pool di worker → aggregatore → report.
//!
//! ## Gestione concorrenza:
//! - Un `Semaphore` con `workers` permessi limita i worker attivi
//! - Ogni item gira in `spawn_blocking` (decode/resize/encode sono CPU-bound)
//! - Gli esiti viaggiano su un canale mpsc verso l'unico aggregatore
//! - Un worker che va in panic produce comunque un esito (`Crashed`)

use crate::{
    config::Config,
    error::OptimizeError,
    file_manager::FileManager,
    json_output::{JsonConfig, JsonMessage},
    optimizer::{
        path_resolver::{NamingPolicy, PathResolver, WorkItem},
        progress_tracker::{CompletedItem, ProgressTracker},
        task_optimizer::TaskOptimizer,
    },
    outcome::{FailureKind, Outcome},
    progress::RunSummary,
};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

/// Number of mappings shown by the dry-run preview
const PREVIEW_LIMIT: usize = 5;

/// Orchestratore principale
pub struct MediaOptimizer {
    config: Config,
    source_dir: PathBuf,
    resolver: PathResolver,
}

impl MediaOptimizer {
    /// Crea nuova istanza dell'ottimizzatore, validando la configurazione
    pub fn new(config: Config) -> Result<Self, OptimizeError> {
        config.validate()?;

        let source_dir = config.source_dir.canonicalize().map_err(|e| {
            OptimizeError::Configuration(format!(
                "Cannot access source folder '{}': {}",
                config.source_dir.display(),
                e
            ))
        })?;

        let resolver = PathResolver::new(
            config.source_name()?,
            &config.destination_base,
            config.naming,
            config.layout,
            config.format,
        );

        Ok(Self {
            config,
            source_dir,
            resolver,
        })
    }

    /// Costruisce catalogo e work item, senza toccare la destinazione
    pub fn plan(&self) -> Result<Vec<WorkItem>> {
        let catalog = FileManager::build_catalog(&self.source_dir, self.config.include.as_deref())?;
        Ok(self.resolver.resolve(catalog))
    }

    /// Esegue il processo di conversione
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();

        if !self.config.json_output {
            info!("Scanning for images in {}", self.source_dir.display());
        }
        let items = self.plan()?;

        self.emit_start_message(items.len());
        self.log_configuration(items.len());

        if !self.config.dry_run {
            let root = self.resolver.destination_root();
            std::fs::create_dir_all(root).map_err(|e| {
                OptimizeError::Configuration(format!(
                    "Cannot create destination folder '{}': {}",
                    root.display(),
                    e
                ))
            })?;
        }

        if items.is_empty() {
            let summary = RunSummary {
                elapsed: start_time.elapsed(),
                ..Default::default()
            };
            if !self.config.json_output {
                info!("No image files found in the source folder");
            }
            self.print_final_stats(&summary);
            return Ok(summary);
        }

        if self.config.dry_run && !self.config.json_output {
            self.preview(&items);
        }

        let tracker = if self.config.json_output {
            ProgressTracker::json(items.len())
        } else {
            ProgressTracker::new(items.len())
        };

        let summary = self.process_concurrently(items, tracker, start_time).await?;
        self.print_final_stats(&summary);

        Ok(summary)
    }

    /// Distribuisce gli item sul pool e aggrega gli esiti man mano che arrivano
    pub async fn process_concurrently(
        &self,
        items: Vec<WorkItem>,
        mut tracker: ProgressTracker,
        start_time: Instant,
    ) -> Result<RunSummary> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<CompletedItem>();
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let task_optimizer = TaskOptimizer::new(&self.config);

        let dispatcher = tokio::spawn(dispatch(items, task_optimizer, semaphore, sender));

        // Il canale si chiude quando l'ultimo worker ha consegnato il suo esito
        while let Some(completed) = receiver.recv().await {
            tracker.record(completed);
        }

        dispatcher.await??;

        Ok(tracker.finish(start_time.elapsed()))
    }

    /// Invia messaggio di inizio
    fn emit_start_message(&self, total_files: usize) {
        if self.config.json_output {
            JsonMessage::start(
                self.source_dir.clone(),
                self.resolver.destination_root().to_path_buf(),
                total_files,
                JsonConfig::from(&self.config),
            )
            .emit();
        } else {
            info!("Found {} images to process", total_files);
            info!("Output will be saved to: {}", self.resolver.destination_root().display());
        }
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self, total_files: usize) {
        if self.config.json_output {
            return;
        }

        info!(
            "Mode: {} (quality: {}, max size: {}px, processes: {})",
            self.config.format, self.config.quality, self.config.max_size, self.config.workers
        );
        match self.config.naming {
            NamingPolicy::Sequential => info!("Naming: Sequential"),
            NamingPolicy::KeepNames => info!("Naming: Keep original"),
        }
        debug!("Layout: {:?}", self.config.layout);

        if self.config.skip_existing {
            info!("Skip mode: Will skip files where output already exists");
        }
        if self.config.dry_run {
            info!("Dry run mode: {} files would be processed, nothing will be written", total_files);
        }
    }

    /// Anteprima dei primi nomi di output in dry run
    fn preview(&self, items: &[WorkItem]) {
        info!("=== DRY RUN PREVIEW ===");
        for item in items.iter().take(PREVIEW_LIMIT) {
            info!(
                "  {} → {}",
                item.entry.relative_path.display(),
                item.destination
                    .strip_prefix(self.resolver.destination_root())
                    .unwrap_or(&item.destination)
                    .display()
            );
        }
        if items.len() > PREVIEW_LIMIT {
            info!("  ... and {} more files", items.len() - PREVIEW_LIMIT);
        }
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, summary: &RunSummary) {
        if self.config.json_output {
            JsonMessage::complete(summary).emit();
            return;
        }

        info!("=== Optimization Complete ===");
        for line in summary.report_lines() {
            info!("{}", line);
        }
    }
}

/// Assegna gli item ai worker rispettando il limite del semaforo
async fn dispatch(
    items: Vec<WorkItem>,
    task_optimizer: TaskOptimizer,
    semaphore: Arc<Semaphore>,
    sender: mpsc::UnboundedSender<CompletedItem>,
) -> Result<()> {
    for item in items {
        let permit = semaphore.clone().acquire_owned().await?;
        let task_optimizer = task_optimizer.clone();
        let sender = sender.clone();

        let index = item.index;
        let source = item.entry.path.clone();
        let destination = item.destination.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let _permit = permit; // rilasciato anche in caso di panic
            task_optimizer.process(&item)
        });

        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Worker crashed while processing {}: {}", source.display(), e);
                    Outcome::failed(FailureKind::Crashed, e.to_string())
                }
            };

            // Il receiver vive finché c'è almeno un sender
            let _ = sender.send(CompletedItem {
                index,
                source,
                destination,
                outcome,
            });
        });
    }

    Ok(())
}
