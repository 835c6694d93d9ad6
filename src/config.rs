//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default espliciti (nessuno stato globale)
//!
//! ## Parametri di configurazione:
//! - `root_dir`: Directory da scansionare (default: `public/assets/products`)
//! - `format`: Codec di destinazione, webp o avif (default: webp)
//! - `quality`: Qualità lossy 1-100 (default: 90, "visually lossless")
//! - `dry_run`: Simulazione senza modifiche (default: false)
//! - `backup`: Crea `<file>.bak` prima di modificare (default: false)
//! - `json_output`: Eventi JSON al posto del report testuale (default: false)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//!
//! Il converter passa `quality` al codec così com'è: il range va validato
//! qui, prima di avviare il run.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     format: TargetFormat::Avif,
//!     quality: 80,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::format::TargetFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_DIR: &str = "public/assets/products";
pub const DEFAULT_QUALITY: u8 = 90;

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned recursively for JPEG/PNG files
    pub root_dir: PathBuf,
    /// Output codec
    pub format: TargetFormat,
    /// Lossy quality (1-100, codec-native semantics)
    pub quality: u8,
    /// Dry run - only read sizes, never write or delete
    pub dry_run: bool,
    /// Keep a `.bak` copy of each original before the first modification
    pub backup: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            format: TargetFormat::Webp,
            quality: DEFAULT_QUALITY,
            dry_run: false,
            backup: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        Ok(())
    }

    /// Load configuration from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
