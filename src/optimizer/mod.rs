//! # Optimizer Module
//!
//! Modulo che separa le responsabilità della pipeline in sottomoduli:
//! - `media_optimizer`: Orchestratore principale e pool di worker
//! - `task_optimizer`: Worker per singoli file
//! - `progress_tracker`: Aggregatore unico degli esiti
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod media_optimizer;
pub mod task_optimizer;
pub mod progress_tracker;
pub mod path_resolver;

// Re-export delle struct principali
pub use media_optimizer::MediaOptimizer;
pub use task_optimizer::TaskOptimizer;
pub use progress_tracker::{CompletedItem, ProgressTracker};
pub use path_resolver::{LayoutPolicy, NamingPolicy, PathResolver, WorkItem};
