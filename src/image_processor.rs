//! # Image Processing Module
//!
//! Questo modulo trasforma una singola immagine sorgente nel file di output,
//! interamente in memoria con il crate `image` (e `webp` per l'encoding lossy).
//!
//! ## Pipeline di Trasformazione
//!
//! 1. **Decode**: Legge il file e rileva il formato dal contenuto (non dall'estensione)
//! 2. **Orientamento**: Applica il tag EXIF di orientamento ai pixel, poi lo scarta
//! 3. **Trasparenza**: Compone il canale alpha su sfondo bianco opaco (output sempre RGB 8 bit)
//! 4. **Resize**: Solo se il lato maggiore supera `max_size`, filtro Lanczos3, mai upscaling
//! 5. **Encode**: JPEG (`JpegEncoder`) o WebP lossy (`webp::Encoder`) alla qualità richiesta
//! 6. **Scrittura atomica**: File temporaneo nella cartella di destinazione + rename
//!
//! ## Formati Supportati
//!
//! | Formato | Input | Output |
//! |---------|-------|--------|
//! | JPEG    | ✅    | ✅     |
//! | PNG     | ✅    | ❌     |
//! | BMP     | ✅    | ❌     |
//! | TIFF    | ✅    | ❌     |
//! | WebP    | ✅    | ✅     |
//!
//! ## Error Handling e Resilienza
//!
//! - **Nessun panic propagato al chiamante**: ogni errore diventa un `Outcome::Failed`
//! - **Decode**: File corrotti o illeggibili → `FailureKind::Decode`
//! - **Encode**: Pixel rifiutati dall'encoder (es. WebP oltre 16383px) → `FailureKind::Encode`
//! - **Write**: Permessi, disco pieno, path non scrivibile → `FailureKind::Write`
//! - **Mai file parziali**: il temporaneo viene rimosso se la scrittura fallisce
//!
//! ## Concorrenza
//!
//! Tutte le operazioni sono sincrone e bloccanti: il processore viene eseguito
//! dentro `tokio::task::spawn_blocking` dallo scheduler. Ogni invocazione tocca
//! solo i propri byte di input e il proprio file di output.
//!
//! ## Esempi d'Uso
//!
//! ```rust,ignore
//! use picks::image_processor::ImageProcessor;
//!
//! let processor = ImageProcessor::new(OutputFormat::Webp, 70, 1600);
//! match processor.transform(Path::new("vacation/a.png"), Path::new("out/vacation/a.webp")) {
//!     Outcome::Success { original_bytes, output_bytes } => { /* ... */ }
//!     other => eprintln!("{:?}", other),
//! }
//! ```

use crate::config::OutputFormat;
use crate::error::OptimizeError;
use crate::outcome::Outcome;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgb, RgbImage, Rgba};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;

/// # Image Processor
///
/// Stateless per-file transformer. Holds only the immutable settings of the
/// run, so one instance can be cloned into every worker.
///
/// ## Features
/// - Format sniffing from content, so misnamed files still decode
/// - EXIF orientation applied to the pixels
/// - Alpha flattened over white
/// - Aspect-preserving downscale with Lanczos3
/// - Atomic output writes
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    format: OutputFormat,
    quality: u8,
    max_size: u32,
}

impl ImageProcessor {
    /// Creates a new ImageProcessor.
    ///
    /// # Arguments
    /// * `format` - Output format (JPEG or WebP)
    /// * `quality` - Encoder quality, 1-100
    /// * `max_size` - Longest side limit in pixels
    pub fn new(format: OutputFormat, quality: u8, max_size: u32) -> Self {
        Self {
            format,
            quality,
            max_size,
        }
    }

    /// Converts one source image into the destination file.
    ///
    /// # Arguments
    /// * `source` - Path to the input image
    /// * `destination` - Final output path (parent folders are created)
    ///
    /// # Returns
    /// * `Outcome::Success` with the source file size and the encoded size
    /// * `Outcome::Failed` with the failure kind, never a panic or an `Err`
    pub fn transform(&self, source: &Path, destination: &Path) -> Outcome {
        match self.try_transform(source, destination) {
            Ok((original_bytes, output_bytes)) => {
                debug!(
                    "Converted {} -> {} ({} -> {} bytes)",
                    source.display(),
                    destination.display(),
                    original_bytes,
                    output_bytes
                );
                Outcome::Success {
                    original_bytes,
                    output_bytes,
                }
            }
            Err(e) => Outcome::failed(e.failure_kind(), e.to_string()),
        }
    }

    fn try_transform(&self, source: &Path, destination: &Path) -> Result<(u64, u64), OptimizeError> {
        let bytes = fs::read(source).map_err(|e| OptimizeError::Decode {
            path: source.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?;
        let original_bytes = bytes.len() as u64;

        let image = Self::decode_oriented(&bytes).map_err(|e| OptimizeError::Decode {
            path: source.to_path_buf(),
            source: e,
        })?;

        let rgb = Self::flatten_on_white(image);
        let rgb = self.fit_within_limit(rgb);
        let encoded = self.encode(&rgb, destination)?;

        write_atomically(destination, &encoded)?;

        Ok((original_bytes, encoded.len() as u64))
    }

    /// Decodifica e applica l'orientamento EXIF ai pixel
    pub fn decode_oriented(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
        let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        reader.no_limits();

        let mut decoder = reader.into_decoder()?;
        // Un tag di orientamento malformato non rende l'immagine inutilizzabile
        let orientation = decoder.orientation().ok();

        let mut image = DynamicImage::from_decoder(decoder)?;
        if let Some(orientation) = orientation {
            image.apply_orientation(orientation);
        }
        Ok(image)
    }

    /// Compone l'eventuale alpha su bianco e converte in RGB 8 bit
    pub fn flatten_on_white(image: DynamicImage) -> RgbImage {
        if !image.color().has_alpha() {
            return image.into_rgb8();
        }

        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();

        RgbImage::from_fn(width, height, |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let alpha = a as u16;
            let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
            Rgb([blend(r), blend(g), blend(b)])
        })
    }

    /// Dimensioni di destinazione, `None` se l'immagine è già entro il limite
    pub fn target_dimensions(width: u32, height: u32, max_size: u32) -> Option<(u32, u32)> {
        let longest = width.max(height);
        if longest <= max_size {
            return None;
        }

        let scale = |side: u32| -> u32 {
            let scaled = (side as u64 * max_size as u64 + longest as u64 / 2) / longest as u64;
            scaled.max(1) as u32
        };

        if width >= height {
            Some((max_size, scale(height)))
        } else {
            Some((scale(width), max_size))
        }
    }

    fn fit_within_limit(&self, rgb: RgbImage) -> RgbImage {
        let (width, height) = rgb.dimensions();
        match Self::target_dimensions(width, height, self.max_size) {
            Some((new_width, new_height)) => {
                debug!("Resizing {}x{} -> {}x{}", width, height, new_width, new_height);
                image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3)
            }
            None => rgb,
        }
    }

    fn encode(&self, rgb: &RgbImage, destination: &Path) -> Result<Vec<u8>, OptimizeError> {
        let encode_error = |message: String| OptimizeError::Encode {
            path: destination.to_path_buf(),
            message,
        };

        match self.format {
            OutputFormat::Jpg => {
                let mut buffer = Vec::new();
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                encoder
                    .encode_image(rgb)
                    .map_err(|e| encode_error(e.to_string()))?;
                Ok(buffer)
            }
            OutputFormat::Webp => {
                let (width, height) = rgb.dimensions();
                let memory = webp::Encoder::from_rgb(rgb.as_raw(), width, height)
                    .encode_simple(false, self.quality as f32)
                    .map_err(|e| encode_error(format!("{:?}", e)))?;
                Ok(memory.to_vec())
            }
        }
    }
}

/// Scrive in un temporaneo accanto alla destinazione e lo rinomina al suo posto.
/// Se due worker scrivono lo stesso path vince l'ultimo rename.
pub fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<(), OptimizeError> {
    let write_error = |source: std::io::Error| OptimizeError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(write_error)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".picks-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(write_error)?;
    temp.write_all(bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_error)?;
    }

    temp.persist(destination).map_err(|e| write_error(e.error))?;
    Ok(())
}
