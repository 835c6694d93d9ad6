//! # Image Format Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Merge tra file di configurazione opzionale e flag CLI
//! - Creazione dell'optimizer e avvio del run
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (root, formato, qualità, dry run, backup)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` vince)
//! 3. Carica `--config` se presente, poi applica i flag espliciti
//! 4. Valida la configurazione e avvia `Optimizer::run`
//! 5. Root mancante o non directory: diagnostica stampata, uscita senza errore
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-converter --root-dir public/assets/products --format avif --quality 80 --backup
//! ```

use anyhow::Result;
use clap::Parser;
use image_format_converter::{json_output::JsonMessage, Config, Optimizer, TargetFormat};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-converter")]
#[command(about = "Convert JPEG/PNG product images to WebP or AVIF in place")]
struct Args {
    /// Root directory to scan recursively [default: public/assets/products]
    #[arg(long)]
    root_dir: Option<PathBuf>,

    /// Output format [default: webp]
    #[arg(long, value_enum)]
    format: Option<TargetFormat>,

    /// Lossy image quality (1-100), 90 is visually lossless [default: 90]
    #[arg(long)]
    quality: Option<u8>,

    /// Simulate without changes
    #[arg(long)]
    dry_run: bool,

    /// Create .bak files before overwriting
    #[arg(long)]
    backup: bool,

    /// Load settings from a JSON config file; explicit flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit JSON events on stdout instead of the text report
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(root_dir) = &self.root_dir {
            config.root_dir = root_dir.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        config.dry_run |= self.dry_run;
        config.backup |= self.backup;
        config.json_output |= self.json;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let base = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::from_file(path).await?
        }
        None => Config::default(),
    };
    let config = args.apply_to(base);
    let json_output = config.json_output;

    let optimizer = Optimizer::new(config)?;

    match optimizer.run().await {
        Ok(_) => Ok(()),
        Err(e) if e.is_root_error() => {
            // Known limitation: a bad root is reported but not an exit failure
            if json_output {
                JsonMessage::error(e.to_string(), None).emit();
            } else {
                println!("Error: {}", e);
            }
            error!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
