//! # Target Format Module
//!
//! Definisce i codec di destinazione supportati e le estensioni di input
//! accettate.
//!
//! ## Responsabilità:
//! - `TargetFormat`: enum WebP/AVIF usata da CLI, config e converter
//! - Estensione di output associata a ogni formato
//! - Riconoscimento case-insensitive delle estensioni raster di input

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Raster extensions eligible for conversion, lowercase, without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Output codec for a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Webp,
    Avif,
}

impl TargetFormat {
    /// File extension written for this format, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Webp => "webp",
            TargetFormat::Avif => "avif",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Check whether a path carries one of the supported raster extensions
pub fn is_supported_extension(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_case_insensitive() {
        assert!(is_supported_extension(Path::new("a/b/photo.jpg")));
        assert!(is_supported_extension(Path::new("photo.JPEG")));
        assert!(is_supported_extension(Path::new("logo.Png")));
        assert!(!is_supported_extension(Path::new("notes.txt")));
        assert!(!is_supported_extension(Path::new("photo.webp")));
        assert!(!is_supported_extension(Path::new("photo.jpg.bak")));
        assert!(!is_supported_extension(Path::new("README")));
    }

    #[test]
    fn test_format_extension_and_serde() {
        assert_eq!(TargetFormat::default(), TargetFormat::Webp);
        assert_eq!(TargetFormat::Avif.to_string(), "avif");
        assert_eq!(serde_json::to_string(&TargetFormat::Webp).unwrap(), "\"webp\"");
        let parsed: TargetFormat = serde_json::from_str("\"avif\"").unwrap();
        assert_eq!(parsed, TargetFormat::Avif);
    }
}
