//! # Image Format Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione esplicita con default documentati
//! - `error`: Tipi di errore custom per i fallimenti di conversione
//! - `format`: Formati di destinazione ed estensioni supportate
//! - `file_manager`: Discovery file, path derivati, backup e publish atomico
//! - `image_processor`: Decodifica e codifica WebP/AVIF
//! - `converter`: Macchina a stati per singolo file
//! - `optimizer`: Orchestratore del run sull'intero albero
//! - `progress`: Progress bar e `RunSummary`
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_format_converter::{Config, Optimizer};
//!
//! let optimizer = Optimizer::new(Config::default())?;
//! let summary = optimizer.run().await?;
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod format;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod progress;

pub use config::Config;
pub use converter::{ConversionOutcome, ConversionRequest, Converter, OutcomeKind};
pub use error::ConvertError;
pub use format::TargetFormat;
pub use image_processor::{ImageCodec, ImageProcessor};
pub use optimizer::Optimizer;
pub use progress::RunSummary;
