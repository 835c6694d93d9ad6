//! # Main Optimizer Orchestrator Module
//!
//! Questo è il modulo che orchestra il run di conversione su un intero albero.
//!
//! ## Responsabilità:
//! - Verifica che la root esista e sia una directory prima di toccare qualsiasi file
//! - Discovery dei file JPEG/PNG (già filtrati per estensione)
//! - Invocazione del converter, un file alla volta, nell'ordine di scansione
//! - Classificazione degli esiti in `RunSummary`
//! - Log per file e report finale (testo o JSON)
//!
//! ## Flusso di esecuzione:
//! 1. **Header**: root, formato, qualità, dry run
//! 2. **Root check**: `ConvertError::RootNotFound` se manca,
//!    `ConvertError::RootNotDirectory` se è un file, zero conversioni in entrambi i casi
//! 3. **File discovery**: lista completa prima di convertire, così i file
//!    `.webp`/`.avif` appena creati non vengono rivisitati
//! 4. **Processing sequenziale**: un file completamente finito prima del successivo
//! 5. **Reporting**: `[OK]`, `[DRY]`, `[ERR]` per file (gli skip sono silenziosi),
//!    poi il summary
//!
//! ## Error handling:
//! - Gli errori per singolo file arrivano come `OutcomeKind::Failed` e non
//!   interrompono il run
//! - Ogni fallimento per file viene loggato con `error!` oltre alla riga `[ERR]`
//! - Solo una root mancante o non directory termina il run
//!
//! ## Esempio:
//! ```rust,ignore
//! let optimizer = Optimizer::new(config)?;
//! let summary = optimizer.run().await?;
//! ```

use crate::{
    config::Config,
    converter::{ConversionOutcome, ConversionRequest, Converter, OutcomeKind},
    error::{ConvertError, ConvertResult},
    file_manager::FileManager,
    image_processor::{ImageCodec, ImageProcessor},
    json_output::JsonMessage,
    progress::{ProgressManager, RunSummary, RULE},
};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

/// Drives one conversion run over a directory tree
pub struct Optimizer<C = ImageProcessor> {
    config: Config,
    converter: Converter<C>,
}

impl Optimizer<ImageProcessor> {
    /// Create an optimizer using the built-in codecs
    pub fn new(config: Config) -> Result<Self> {
        Self::with_converter(config, Converter::new())
    }
}

impl<C: ImageCodec> Optimizer<C> {
    pub fn with_converter(config: Config, converter: Converter<C>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, converter })
    }

    /// Run the conversion over `config.root_dir`
    pub async fn run(&self) -> ConvertResult<RunSummary> {
        let config = &self.config;
        let root = config.root_dir.as_path();

        if !config.json_output {
            self.print_header();
        }

        if !root.exists() {
            return Err(ConvertError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ConvertError::RootNotDirectory(root.to_path_buf()));
        }

        info!("Starting conversion in: {}", root.display());
        if config.dry_run {
            info!("Dry run mode: no files will be modified");
        }
        if config.backup {
            info!("Backup mode: originals are copied to .bak before the first change");
        }

        let start_time = Instant::now();
        let files = FileManager::find_image_files(root);
        info!("Found {} candidate images", files.len());

        if config.json_output {
            JsonMessage::start(config, files.len()).emit();
        }

        let progress = if config.json_output || files.is_empty() {
            None
        } else {
            Some(ProgressManager::new(files.len() as u64))
        };

        let mut summary = RunSummary::new();

        for file_path in files {
            let request = ConversionRequest::new(file_path.clone(), config.format, config.quality)
                .dry_run(config.dry_run)
                .backup(config.backup);

            let outcome = self.converter.convert(&request).await;
            debug!("{} -> {}", file_path.display(), outcome.message());
            if let OutcomeKind::Failed(e) = &outcome.kind {
                error!("Failed to convert {}: {}", file_path.display(), e);
            }
            summary.record(&outcome);

            if config.json_output {
                if let Some(msg) = JsonMessage::file_complete(file_path.clone(), &outcome) {
                    msg.emit();
                }
            } else if let Some(line) = Self::format_file_line(&file_path, &outcome) {
                match &progress {
                    Some(bar) => bar.println(&line),
                    None => println!("{}", line),
                }
            }

            if let Some(bar) = &progress {
                bar.update(&display_name(&file_path));
            }
        }

        summary.elapsed = start_time.elapsed();

        if let Some(bar) = &progress {
            bar.finish();
        }

        if config.json_output {
            JsonMessage::complete(&summary).emit();
        } else {
            println!("{}", summary.format_report(config.dry_run));
        }

        info!(
            "Run finished: {} processed, {} skipped, {} errors, {} -> {} ({:.1}% reduction)",
            summary.processed,
            summary.skipped,
            summary.errors,
            FileManager::format_size(summary.total_original_size),
            FileManager::format_size(summary.total_new_size),
            summary.overall_reduction_percent()
        );

        Ok(summary)
    }

    fn print_header(&self) {
        println!("Starting optimization...");
        println!("Root: {}", self.config.root_dir.display());
        println!("Format: {}", self.config.format);
        println!("Quality: {}", self.config.quality);
        println!("Dry Run: {}", self.config.dry_run);
        println!("{}", RULE);
    }

    /// Console line for one file. Skips and unsupported files stay silent.
    ///
    /// The percentage is the signed size change, so a shrink prints `-75.0%`
    /// and an output that grew prints `+12.5%`.
    fn format_file_line(path: &Path, outcome: &ConversionOutcome) -> Option<String> {
        let name = display_name(path);
        match &outcome.kind {
            OutcomeKind::Converted => Some(format!(
                "[OK] {}: {:.1}KB -> {:.1}KB ({:+.1}%)",
                name,
                FileManager::to_kb(outcome.original_size),
                FileManager::to_kb(outcome.new_size),
                size_change_percent(outcome.original_size, outcome.new_size)
            )),
            OutcomeKind::DryRun => Some(format!(
                "[DRY] {}: {:.1}KB -> ?? (Dry Run)",
                name,
                FileManager::to_kb(outcome.original_size)
            )),
            OutcomeKind::Failed(_) => Some(format!("[ERR] {}: {}", name, outcome.message())),
            OutcomeKind::TargetExists | OutcomeKind::UnsupportedExtension => None,
        }
    }
}

fn size_change_percent(original_size: u64, new_size: u64) -> f64 {
    let reduction = FileManager::calculate_reduction(original_size, new_size);
    if reduction == 0.0 {
        0.0
    } else {
        -reduction
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    fn outcome(kind: OutcomeKind, original_size: u64, new_size: u64) -> ConversionOutcome {
        ConversionOutcome {
            kind,
            original_size,
            new_size,
        }
    }

    #[test]
    fn test_file_lines() {
        let path = Path::new("assets/red/shoe.jpg");

        let ok = Optimizer::<ImageProcessor>::format_file_line(
            path,
            &outcome(OutcomeKind::Converted, 2048, 512),
        );
        assert_eq!(ok.as_deref(), Some("[OK] shoe.jpg: 2.0KB -> 0.5KB (-75.0%)"));

        let grew = Optimizer::<ImageProcessor>::format_file_line(
            path,
            &outcome(OutcomeKind::Converted, 4096, 4608),
        );
        assert_eq!(grew.as_deref(), Some("[OK] shoe.jpg: 4.0KB -> 4.5KB (+12.5%)"));

        let same = Optimizer::<ImageProcessor>::format_file_line(
            path,
            &outcome(OutcomeKind::Converted, 1024, 1024),
        );
        assert_eq!(same.as_deref(), Some("[OK] shoe.jpg: 1.0KB -> 1.0KB (+0.0%)"));

        let dry = Optimizer::<ImageProcessor>::format_file_line(
            path,
            &outcome(OutcomeKind::DryRun, 1024, 0),
        );
        assert_eq!(dry.as_deref(), Some("[DRY] shoe.jpg: 1.0KB -> ?? (Dry Run)"));

        let err = Optimizer::<ImageProcessor>::format_file_line(
            path,
            &outcome(OutcomeKind::Failed(ConvertError::EmptyOutput), 0, 0),
        );
        assert_eq!(err.as_deref(), Some("[ERR] shoe.jpg: error: Resulting file is empty"));

        let skip = Optimizer::<ImageProcessor>::format_file_line(
            path,
            &outcome(OutcomeKind::TargetExists, 0, 0),
        );
        assert!(skip.is_none());
    }

    #[test]
    fn test_new_rejects_invalid_quality() {
        let config = Config {
            quality: 0,
            ..Default::default()
        };
        assert!(Optimizer::new(config).is_err());
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            root_dir: temp_dir.path().join("does-not-exist"),
            ..Default::default()
        };

        let err = Optimizer::new(config).unwrap().run().await.unwrap_err();
        assert!(matches!(err, ConvertError::RootNotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_file_root_is_fatal_and_untouched() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let lone = temp_dir.path().join("a.jpg");
        image::RgbImage::from_pixel(8, 8, image::Rgb([200, 40, 40]))
            .save(&lone)
            .unwrap();
        let before = std::fs::read(&lone).unwrap();

        let config = Config {
            root_dir: lone.clone(),
            ..Default::default()
        };

        let err = Optimizer::new(config).unwrap().run().await.unwrap_err();
        assert!(matches!(err, ConvertError::RootNotDirectory(_)));
        assert!(err.is_root_error());
        assert!(err.to_string().contains("not a directory"));
        assert_eq!(std::fs::read(&lone).unwrap(), before);
        assert!(!temp_dir.path().join("a.webp").exists());
    }
}
