//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Separa gli errori fatali (configurazione) da quelli per singolo file
//! - Integra con `thiserror` per automatic error conversion
//! - Mappa gli errori per singolo file su `FailureKind` per l'`Outcome`
//!
//! ## Categorie di errori:
//! - `Configuration`: Parametri invalidi o combinazioni di flag rifiutate (exit code 1)
//! - `Decode`: Immagine sorgente illeggibile o corrotta
//! - `Encode`: L'encoder rifiuta i pixel (es. limiti dimensione WebP)
//! - `Write`: Impossibile scrivere il file di destinazione
//!
//! ## Esempio:
//! ```rust,ignore
//! if !(1..=16).contains(&workers) {
//!     return Err(OptimizeError::Configuration("processes must be between 1 and 16".into()));
//! }
//! ```

use crate::outcome::FailureKind;
use std::path::PathBuf;

/// Custom error types for image optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OptimizeError {
    /// Categoria da riportare nell'`Outcome::Failed` di un singolo file
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            OptimizeError::Decode { .. } => FailureKind::Decode,
            OptimizeError::Encode { .. } => FailureKind::Encode,
            OptimizeError::Write { .. } => FailureKind::Write,
            // Non dovrebbe mai arrivare a livello di singolo file
            OptimizeError::Configuration(_) => FailureKind::Crashed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_mapping() {
        let write = OptimizeError::Write {
            path: PathBuf::from("out/a.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(write.failure_kind(), FailureKind::Write);

        let encode = OptimizeError::Encode {
            path: PathBuf::from("out/a.webp"),
            message: "too large".to_string(),
        };
        assert_eq!(encode.failure_kind(), FailureKind::Encode);
        assert!(encode.to_string().contains("out/a.webp"));
    }

    #[test]
    fn test_configuration_flag() {
        let err = OptimizeError::Configuration("bad".to_string());
        assert!(matches!(err, OptimizeError::Configuration(_)));
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
