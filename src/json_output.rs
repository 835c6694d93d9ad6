//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per chi invoca il
//! converter da script (`--json`).
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout, taggato con `type`
//! - Riusa `RunSummary` e `ConversionOutcome` senza duplicare la logica
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run con la configurazione effettiva
//! - `file_complete`: Esito di un file (converted, dry_run, skipped, error)
//! - `complete`: Fine del run con le statistiche finali
//! - `error`: Errore fatale (es. directory non trovata)

use crate::config::Config;
use crate::converter::{ConversionOutcome, OutcomeKind};
use crate::file_manager::FileManager;
use crate::format::TargetFormat;
use crate::progress::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-file status reported in `file_complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Converted,
    DryRun,
    Skipped,
    Error,
}

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        root_dir: PathBuf,
        format: TargetFormat,
        quality: u8,
        dry_run: bool,
        backup: bool,
        total_files: usize,
    },

    FileComplete {
        path: PathBuf,
        status: FileStatus,
        original_size: u64,
        new_size: u64,
        reduction_percent: f64,
        error: Option<String>,
    },

    Complete {
        files_processed: usize,
        files_skipped: usize,
        errors: usize,
        files_dry_run: usize,
        total_original_size: u64,
        total_new_size: u64,
        space_saved: i64,
        duration_seconds: f64,
    },

    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config, total_files: usize) -> Self {
        Self::Start {
            root_dir: config.root_dir.clone(),
            format: config.format,
            quality: config.quality,
            dry_run: config.dry_run,
            backup: config.backup,
            total_files,
        }
    }

    /// `None` for unsupported files, which are never reported
    pub fn file_complete(path: PathBuf, outcome: &ConversionOutcome) -> Option<Self> {
        let (status, error) = match &outcome.kind {
            OutcomeKind::Converted => (FileStatus::Converted, None),
            OutcomeKind::DryRun => (FileStatus::DryRun, None),
            OutcomeKind::TargetExists => (FileStatus::Skipped, None),
            OutcomeKind::Failed(e) => (FileStatus::Error, Some(e.to_string())),
            OutcomeKind::UnsupportedExtension => return None,
        };

        let reduction_percent = if status == FileStatus::Converted {
            FileManager::calculate_reduction(outcome.original_size, outcome.new_size)
        } else {
            0.0
        };

        Some(Self::FileComplete {
            path,
            status,
            original_size: outcome.original_size,
            new_size: outcome.new_size,
            reduction_percent,
            error,
        })
    }

    pub fn complete(summary: &RunSummary) -> Self {
        Self::Complete {
            files_processed: summary.processed,
            files_skipped: summary.skipped,
            errors: summary.errors,
            files_dry_run: summary.dry_run,
            total_original_size: summary.total_original_size,
            total_new_size: summary.total_new_size,
            space_saved: summary.space_saved().clamp(i64::MIN as i128, i64::MAX as i128) as i64,
            duration_seconds: summary.elapsed.as_secs_f64(),
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn test_file_complete_serialization() {
        let outcome = ConversionOutcome {
            kind: OutcomeKind::Converted,
            original_size: 1000,
            new_size: 250,
        };
        let msg = JsonMessage::file_complete(PathBuf::from("a.jpg"), &outcome).unwrap();
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["status"], "converted");
        assert_eq!(value["reduction_percent"], 75.0);
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_file_complete_error_and_unsupported() {
        let failed = ConversionOutcome {
            kind: OutcomeKind::Failed(ConvertError::EmptyOutput),
            original_size: 0,
            new_size: 0,
        };
        let value =
            serde_json::to_value(JsonMessage::file_complete(PathBuf::from("b.png"), &failed).unwrap())
                .unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "Resulting file is empty");

        let unsupported = ConversionOutcome {
            kind: OutcomeKind::UnsupportedExtension,
            original_size: 0,
            new_size: 0,
        };
        assert!(JsonMessage::file_complete(PathBuf::from("c.txt"), &unsupported).is_none());
    }

    #[test]
    fn test_start_reflects_config() {
        let config = Config::default();
        let value = serde_json::to_value(JsonMessage::start(&config, 3)).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["format"], "webp");
        assert_eq!(value["quality"], 90);
        assert_eq!(value["total_files"], 3);
    }
}
