//! # Picks Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `outcome`: Esito di ogni singolo file
//! - `file_manager`: Discovery delle immagini (catalogo)
//! - `image_processor`: Decode, orientamento, trasparenza, resize, encode
//! - `optimizer`: Path di output, worker pool e aggregazione
//! - `progress`: Progress bar e statistiche della run
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use picks::{Config, MediaOptimizer};
//!
//! let config = Config {
//!     source_dir: "vacation".into(),
//!     destination_base: "out".into(),
//!     ..Default::default()
//! };
//! let summary = MediaOptimizer::new(config)?.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod file_manager;
pub mod image_processor;
pub mod optimizer;
pub mod progress;
pub mod json_output;

pub use config::{Config, OutputFormat};
pub use error::OptimizeError;
pub use outcome::{FailureKind, Outcome, SkipReason};
pub use optimizer::{LayoutPolicy, MediaOptimizer, NamingPolicy};
pub use progress::RunSummary;
