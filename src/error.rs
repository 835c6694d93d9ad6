//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare i fallimenti di conversione
//! - Fornisce messaggi di errore descrittivi da mostrare nelle righe `[ERR]`
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Decode`: Immagine sorgente corrotta o codifica non supportata
//! - `Encode`: Il codec di destinazione ha rifiutato l'immagine
//! - `EmptyOutput`: Il file temporaneo prodotto è vuoto
//! - `Io`: Errori di filesystem (permessi, rename, delete, etc.)
//! - `RootNotFound`: La directory da scansionare non esiste (fatale per il run)
//! - `RootNotDirectory`: La root esiste ma non è una directory (fatale per il run)
//!
//! `TargetExists` e l'estensione non supportata NON sono errori: sono esiti
//! (`OutcomeKind`) prodotti dal converter.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !root.exists() {
//!     return Err(ConvertError::RootNotFound(root.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for image conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Resulting file is empty")]
    EmptyOutput,

    #[error("Directory {} not found!", .0.display())]
    RootNotFound(PathBuf),

    #[error("{} is not a directory!", .0.display())]
    RootNotDirectory(PathBuf),
}

impl ConvertError {
    /// Errors that stop the run before any file is touched
    pub fn is_root_error(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::RootNotDirectory(_))
    }
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
