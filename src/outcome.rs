//! # Outcome Module
//!
//! Risultato terminale dell'elaborazione di un singolo `WorkItem`.
//! Ogni item produce esattamente un `Outcome`, consumato una sola volta
//! dall'aggregatore.

use serde::Serialize;
use std::fmt;

/// Motivo per cui un file non è stato convertito (non è un errore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    DryRun,
    AlreadyExists,
}

/// Categoria di fallimento per singolo file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Decode,
    Encode,
    Write,
    /// The worker panicked while handling the item
    Crashed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DryRun => write!(f, "dry run"),
            SkipReason::AlreadyExists => write!(f, "already exists"),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Decode => write!(f, "DecodeError"),
            FailureKind::Encode => write!(f, "EncodeError"),
            FailureKind::Write => write!(f, "WriteError"),
            FailureKind::Crashed => write!(f, "WorkerCrashed"),
        }
    }
}

/// Tagged result of processing one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { original_bytes: u64, output_bytes: u64 },
    Skipped { reason: SkipReason },
    Failed { kind: FailureKind, message: String },
}

impl Outcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Outcome::Skipped { reason }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Outcome::Failed {
            kind,
            message: message.into(),
        }
    }

    /// Etichetta breve usata nei messaggi di progresso e negli eventi JSON
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Failed { .. } => "failed",
        }
    }
}
