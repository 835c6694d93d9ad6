//! # Image Processing Module
//!
//! Questo modulo gestisce decodifica e codifica delle immagini, interamente
//! in-process.
//!
//! ## Responsabilità:
//! - Decodifica di JPEG/PNG tramite il crate `image` (formato rilevato dal contenuto)
//! - Codifica lossy in WebP tramite libwebp (`webp` crate)
//! - Codifica lossy in AVIF tramite l'encoder rav1e del crate `image`
//! - Scrittura del risultato su un path dato (il file temporaneo del converter)
//!
//! ## Parametri codec:
//!
//! | Formato | Qualità        | Sforzo               | Modalità |
//! |---------|----------------|----------------------|----------|
//! | WebP    | `quality` 1-100 | `method = 6` (max)  | lossy    |
//! | AVIF    | `quality` 1-100 | `speed = 1` (max)   | lossy    |
//!
//! Nessuno dei due encoder espone un flag "optimize" separato: lo sforzo
//! massimo copre già quella richiesta.
//!
//! ## Threading:
//! Tutto il lavoro qui è CPU-bound e sincrono. Il converter lo esegue dentro
//! `tokio::task::spawn_blocking`, un file alla volta.

use crate::error::{ConvertError, ConvertResult};
use crate::format::TargetFormat;
use image::codecs::avif::AvifEncoder;
use image::{DynamicImage, ImageReader};
use libwebp_sys::WebPConfig;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// libwebp's slowest, best-compressing method
const WEBP_MAX_METHOD: i32 = 6;
/// rav1e speed 1 is the slowest preset `AvifEncoder` accepts
const AVIF_MAX_EFFORT_SPEED: u8 = 1;

/// Turns one source raster into an encoded file in the target format.
///
/// [`ImageProcessor`] is the production codec; tests substitute their own to
/// exercise the converter's failure paths.
pub trait ImageCodec: Clone + Send + 'static {
    fn transcode(
        &self,
        source: &Path,
        output: &Path,
        format: TargetFormat,
        quality: u8,
    ) -> ConvertResult<()>;
}

/// Decodes source rasters and encodes them to the target codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProcessor;

impl ImageCodec for ImageProcessor {
    fn transcode(
        &self,
        source: &Path,
        output: &Path,
        format: TargetFormat,
        quality: u8,
    ) -> ConvertResult<()> {
        let img = Self::decode(source)?;
        Self::encode_to_file(&img, output, format, quality)
    }
}

impl ImageProcessor {
    /// Decode an image file, sniffing the real format from its content
    pub fn decode(path: &Path) -> ConvertResult<DynamicImage> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let img = reader.decode()?;
        debug!(
            "Decoded {} ({}x{}, {:?})",
            path.display(),
            img.width(),
            img.height(),
            img.color()
        );
        Ok(img)
    }

    /// Encode an already decoded image into `output`
    pub fn encode_to_file(
        img: &DynamicImage,
        output: &Path,
        format: TargetFormat,
        quality: u8,
    ) -> ConvertResult<()> {
        match format {
            TargetFormat::Webp => {
                let data = Self::encode_webp(img, quality)?;
                std::fs::write(output, &data)?;
            }
            TargetFormat::Avif => Self::encode_avif(img, output, quality)?,
        }
        debug!("Encoded {} as {} (quality {})", output.display(), format, quality);
        Ok(())
    }

    fn encode_webp(img: &DynamicImage, quality: u8) -> ConvertResult<Vec<u8>> {
        let mut config = WebPConfig::new()
            .map_err(|_| ConvertError::Encode("libwebp rejected its default config".to_string()))?;
        config.lossless = 0;
        config.quality = f32::from(quality);
        config.method = WEBP_MAX_METHOD;

        let (width, height) = (img.width(), img.height());
        let has_alpha = img.color().has_alpha();
        let pixels = if has_alpha {
            img.to_rgba8().into_raw()
        } else {
            img.to_rgb8().into_raw()
        };
        let encoder = if has_alpha {
            webp::Encoder::from_rgba(&pixels, width, height)
        } else {
            webp::Encoder::from_rgb(&pixels, width, height)
        };
        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| ConvertError::Encode(format!("WebP encode failed: {:?}", e)))?;

        Ok(memory.to_vec())
    }

    fn encode_avif(img: &DynamicImage, output: &Path, quality: u8) -> ConvertResult<()> {
        // rav1e asserts on quality outside 1..=100
        let quality = quality.clamp(1, 100);

        let normalized = if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };

        let mut writer = BufWriter::new(File::create(output)?);
        let encoder = AvifEncoder::new_with_speed_quality(&mut writer, AVIF_MAX_EFFORT_SPEED, quality);
        normalized
            .write_with_encoder(encoder)
            .map_err(|e| ConvertError::Encode(format!("AVIF encode failed: {}", e)))?;
        writer.flush()?;
        Ok(())
    }
}
