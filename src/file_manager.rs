//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di file JPEG/PNG in directory
//! - Calcolo dei path derivati (destinazione, backup, temporaneo)
//! - Backup che preserva i timestamp dell'originale
//! - Publish atomico via rename del file temporaneo
//! - Utilità per calcoli dimensioni e percentuali
//!
//! ## Path derivati:
//! - Destinazione: `foto.jpg` -> `foto.webp`
//! - Backup: `foto.jpg` -> `foto.jpg.bak`
//! - Temporaneo: `foto.webp` -> `foto.webp.tmp`
//!
//! ## Sicurezza operazioni:
//! - Il backup non sovrascrive mai un `.bak` esistente
//! - Il publish rimuove la vecchia destinazione e poi rinomina il temporaneo,
//!   quindi la destinazione non è mai visibile a metà scrittura
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_image_files(Path::new("public/assets"));
//! for file in files {
//!     let dest = FileManager::destination_path(&file, TargetFormat::Webp);
//! }
//! ```

use crate::format::{self, TargetFormat};
use std::ffi::OsString;
use std::fs::FileTimes;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn get_file_size(path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Find all convertible images under a directory.
    ///
    /// Only entries below `root` are returned, never `root` itself.
    /// Symlinks are not followed, so every regular file is visited once.
    /// Unreadable entries are logged and skipped.
    pub fn find_image_files(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && format::is_supported_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files
    }

    /// Source path with its extension replaced by the target format's
    pub fn destination_path(source: &Path, format: TargetFormat) -> PathBuf {
        source.with_extension(format.extension())
    }

    /// `photo.jpg` -> `photo.jpg.bak`
    pub fn backup_path(source: &Path) -> PathBuf {
        Self::append_suffix(source, ".bak")
    }

    /// `photo.webp` -> `photo.webp.tmp`
    pub fn temp_path(destination: &Path) -> PathBuf {
        Self::append_suffix(destination, ".tmp")
    }

    fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
        let mut name: OsString = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Copy `source` to its `.bak` sibling unless one already exists.
    ///
    /// Access and modification times are carried over to the copy.
    /// Returns `true` when a new backup was written.
    pub async fn create_backup(source: &Path) -> io::Result<bool> {
        let backup = Self::backup_path(source);
        if fs::try_exists(&backup).await? {
            debug!("Backup already present, leaving it untouched: {}", backup.display());
            return Ok(false);
        }

        // Read before copying: the copy itself may bump the source atime
        let metadata = fs::metadata(source).await?;
        fs::copy(source, &backup).await?;

        let mut times = FileTimes::new();
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }
        let backup_file = std::fs::OpenOptions::new().write(true).open(&backup)?;
        backup_file.set_times(times)?;

        debug!("Created backup: {}", backup.display());
        Ok(true)
    }

    /// Make `temp` visible as `destination`.
    ///
    /// Any file already at `destination` is removed first, then the rename
    /// publishes the new content in one step.
    pub async fn publish(temp: &Path, destination: &Path) -> io::Result<()> {
        if fs::try_exists(destination).await? {
            debug!("Removing stale destination: {}", destination.display());
            fs::remove_file(destination).await?;
        }
        fs::rename(temp, destination).await
    }

    /// Remove a leftover temporary file, logging instead of failing
    pub async fn discard_temp(temp: &Path) {
        match fs::remove_file(temp).await {
            Ok(()) => debug!("Removed temporary file: {}", temp.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary file {}: {}", temp.display(), e),
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn to_kb(bytes: u64) -> f64 {
        bytes as f64 / BYTES_PER_KB
    }

    pub fn to_mb(bytes: i128) -> f64 {
        bytes as f64 / BYTES_PER_MB
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
