//! # Converter Module
//!
//! Questo modulo decide il destino di un singolo file e, se la conversione
//! procede, la esegue senza mai esporre stati intermedi.
//!
//! ## Macchina a stati per file:
//! 1. **Filtro estensione**: solo `.jpg`, `.jpeg`, `.png` (case-insensitive)
//! 2. **Destinazione**: stesso path con estensione `.webp` / `.avif`
//! 3. **Skip**: se la destinazione esiste già ed è diversa dalla sorgente
//! 4. **Dry run**: legge solo la dimensione, nessuna scrittura
//! 5. **Backup**: `<file>.bak` se richiesto e non già presente
//! 6. **Decode + encode** in `<dest>.tmp` (dentro `spawn_blocking`)
//! 7. **Validazione**: un file temporaneo vuoto è un errore
//! 8. **Publish**: rimuove la vecchia destinazione, rinomina il temporaneo
//! 9. **Rimozione originale**: solo dopo il publish e solo se dest != sorgente
//!
//! ## Garanzie sugli errori:
//! - Qualsiasi errore viene restituito come `OutcomeKind::Failed`, mai propagato
//! - Il file `.tmp` viene sempre rimosso in caso di errore
//! - L'originale non viene mai cancellato prima che la destinazione esista
//!
//! ## Esempio:
//! ```rust,ignore
//! let request = ConversionRequest::new(path, TargetFormat::Webp, 90);
//! let outcome = Converter::new().convert(&request).await;
//! if outcome.succeeded() {
//!     println!("{} -> {} bytes", outcome.original_size, outcome.new_size);
//! }
//! ```

use crate::{
    error::{ConvertError, ConvertResult},
    file_manager::FileManager,
    format::{self, TargetFormat},
    image_processor::{ImageCodec, ImageProcessor},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Everything needed to convert one file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source_path: PathBuf,
    pub format: TargetFormat,
    /// Passed to the codec as-is; range checks belong to `Config::validate`
    pub quality: u8,
    pub dry_run: bool,
    pub backup: bool,
}

impl ConversionRequest {
    pub fn new(source_path: impl Into<PathBuf>, format: TargetFormat, quality: u8) -> Self {
        Self {
            source_path: source_path.into(),
            format,
            quality,
            dry_run: false,
            backup: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }
}

/// Why a conversion ended the way it did
#[derive(Debug)]
pub enum OutcomeKind {
    /// Destination published and original removed
    Converted,
    /// Dry run: nothing was touched
    DryRun,
    /// Not a JPEG/PNG; callers ignore it entirely
    UnsupportedExtension,
    /// Destination already present; counted as a skip
    TargetExists,
    Failed(ConvertError),
}

/// Result of converting one file
#[derive(Debug)]
pub struct ConversionOutcome {
    pub kind: OutcomeKind,
    pub original_size: u64,
    pub new_size: u64,
}

impl ConversionOutcome {
    fn new(kind: OutcomeKind, original_size: u64, new_size: u64) -> Self {
        Self {
            kind,
            original_size,
            new_size,
        }
    }

    fn failed(error: ConvertError) -> Self {
        Self::new(OutcomeKind::Failed(error), 0, 0)
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.kind, OutcomeKind::Converted | OutcomeKind::DryRun)
    }

    pub fn message(&self) -> String {
        match &self.kind {
            OutcomeKind::Converted => "converted".to_string(),
            OutcomeKind::DryRun => "would convert".to_string(),
            OutcomeKind::UnsupportedExtension => "unsupported extension".to_string(),
            OutcomeKind::TargetExists => "target exists".to_string(),
            OutcomeKind::Failed(e) => format!("error: {}", e),
        }
    }
}

/// Runs the per-file conversion state machine
#[derive(Debug, Clone, Default)]
pub struct Converter<C = ImageProcessor> {
    codec: C,
}

impl Converter<ImageProcessor> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ImageCodec> Converter<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Convert one file. Never returns an error: every failure is folded
    /// into the outcome after the temporary file has been cleaned up.
    pub async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        let source = &request.source_path;

        if !format::is_supported_extension(source) {
            debug!("Ignoring unsupported file: {}", source.display());
            return ConversionOutcome::new(OutcomeKind::UnsupportedExtension, 0, 0);
        }

        let destination = FileManager::destination_path(source, request.format);

        if destination != *source {
            match fs::try_exists(&destination).await {
                Ok(true) => {
                    debug!("Skipping, target exists: {}", destination.display());
                    return ConversionOutcome::new(OutcomeKind::TargetExists, 0, 0);
                }
                Ok(false) => {}
                Err(e) => return ConversionOutcome::failed(e.into()),
            }
        }

        let original_size = match FileManager::get_file_size(source).await {
            Ok(size) => size,
            Err(e) => return ConversionOutcome::failed(e.into()),
        };

        if request.dry_run {
            return ConversionOutcome::new(OutcomeKind::DryRun, original_size, 0);
        }

        let temp = FileManager::temp_path(&destination);
        match self.replace(request, &destination, &temp).await {
            Ok(new_size) => ConversionOutcome::new(OutcomeKind::Converted, original_size, new_size),
            Err(e) => {
                debug!("Conversion of {} failed: {}", source.display(), e);
                FileManager::discard_temp(&temp).await;
                ConversionOutcome::failed(e)
            }
        }
    }

    /// Backup, encode, publish, remove original. Order matters: the original
    /// is only deleted once the destination is visible under its final name.
    async fn replace(
        &self,
        request: &ConversionRequest,
        destination: &Path,
        temp: &Path,
    ) -> ConvertResult<u64> {
        let source = &request.source_path;

        if request.backup {
            FileManager::create_backup(source).await?;
        }

        let codec = self.codec.clone();
        let (format, quality) = (request.format, request.quality);
        let (source_owned, temp_owned) = (source.clone(), temp.to_path_buf());
        tokio::task::spawn_blocking(move || {
            codec.transcode(&source_owned, &temp_owned, format, quality)
        })
        .await
        .map_err(|e| ConvertError::Encode(format!("encoder task failed: {}", e)))??;

        let new_size = FileManager::get_file_size(temp).await?;
        if new_size == 0 {
            return Err(ConvertError::EmptyOutput);
        }

        FileManager::publish(temp, destination).await?;
        debug!("Published {}", destination.display());

        if destination != source.as_path() {
            fs::remove_file(source).await?;
            debug!("Removed original {}", source.display());
        }

        Ok(new_size)
    }
}
