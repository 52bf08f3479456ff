//! # Image Codec Module
//!
//! Questo modulo gestisce la conversione raster di un singolo file, interamente
//! in-process tramite il crate `image`.
//!
//! ## Pipeline di Conversione
//!
//! 1. **Decodifica**: Lettura dei byte grezzi e riconoscimento del container
//! 2. **Color mode**: Per JPG/WebP alpha e palette vengono appiattiti a RGB
//!    (nessun compositing su sfondo: l'alpha viene semplicemente scartato)
//! 3. **Resize**: Secondo `ResizeMode` (aspect ratio o dimensioni forzate)
//! 4. **Metadata**: Il blocco EXIF originale viene passato invariato all'encoder
//! 5. **Encoding**: Qualità massima, `optimize` passato all'encoder
//! 6. **Scrittura atomica**: File temporaneo + rename nella directory di output
//!
//! ## Formati Supportati
//!
//! | Formato | Input | Output | Encoder                          |
//! |---------|-------|--------|----------------------------------|
//! | JPEG    | ✅    | ✅     | `JpegEncoder`, qualità 100       |
//! | PNG     | ✅    | ✅     | `PngEncoder`, Best se optimize   |
//! | WebP    | ✅    | ✅     | `WebPEncoder` lossless           |
//! | SVG     | ❌    | ❌     | Errore: passa dal `Vectorizer`   |

use crate::config::ConversionOptions;
use crate::converter::path_resolver::PathResolver;
use crate::error::{ConvertError, ConvertResult};
use crate::file_manager::FileManager;
use crate::format::TargetFormat;
use crate::resize::{ImageResizer, ResizeMode};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, ImageDecoder, ImageEncoder, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JPEG quality used for every conversion
const JPEG_QUALITY: u8 = 100;

/// A decoded raster with its optional embedded metadata
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: DynamicImage,
    pub exif: Option<Vec<u8>>,
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn color(&self) -> ColorType {
        self.pixels.color()
    }
}

/// Raster conversion of single files.
///
/// The codec holds the batch's `ConversionOptions`; every call decodes its own
/// `SourceImage` and drops it once the output is written.
#[derive(Debug, Clone)]
pub struct ImageCodec {
    options: ConversionOptions,
    resizer: ImageResizer,
}

impl ImageCodec {
    pub fn new(options: ConversionOptions) -> Self {
        let resizer = ImageResizer::new(ResizeMode::from_options(&options));
        Self { options, resizer }
    }

    /// Read and decode an image file
    pub fn load(path: &Path) -> ConvertResult<SourceImage> {
        let bytes = std::fs::read(path).map_err(|e| ConvertError::from_input_io(path, e))?;
        Self::decode(bytes)
    }

    /// Decode an in-memory image, keeping its EXIF block if any
    pub fn decode(bytes: Vec<u8>) -> ConvertResult<SourceImage> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        if reader.format().is_none() {
            return Err(ConvertError::UnreadableFormat(
                "unrecognized image container".to_string(),
            ));
        }

        let mut decoder = reader.into_decoder()?;
        let exif = match decoder.exif_metadata() {
            Ok(exif) => exif,
            Err(e) => {
                warn!("Ignoring unreadable EXIF block: {}", e);
                None
            }
        };
        let pixels = DynamicImage::from_decoder(decoder)?;

        Ok(SourceImage { pixels, exif })
    }

    /// Flatten alpha/palette/high bit depth for formats without alpha support
    pub fn normalize_color(image: DynamicImage, format: TargetFormat) -> DynamicImage {
        let color = image.color();
        if format.supports_alpha() {
            return match color {
                ColorType::Rgb32F | ColorType::Rgba32F => DynamicImage::ImageRgba8(image.to_rgba8()),
                _ => image,
            };
        }

        match color {
            ColorType::Rgb8 | ColorType::L8 => image,
            _ => {
                debug!("Flattening {:?} to RGB8 for {}", color, format);
                DynamicImage::ImageRgb8(image.to_rgb8())
            }
        }
    }

    /// Convert `input` into `output_dir`, named after the source stem or the
    /// configured base name
    pub fn convert(&self, input: &Path, output_dir: &Path, format: TargetFormat) -> ConvertResult<PathBuf> {
        let output_path = PathResolver::single(input, output_dir, format, &self.options)?;
        self.convert_to(input, &output_path, format)
    }

    /// Convert `input` and write the result at `output_path`
    pub fn convert_to(&self, input: &Path, output_path: &Path, format: TargetFormat) -> ConvertResult<PathBuf> {
        if format.is_vector() {
            return Err(ConvertError::UnsupportedFormat(format!(
                "{} has no raster encoder",
                format
            )));
        }

        let source = Self::load(input)?;
        debug!(
            "Decoded {} ({}x{}, {:?}, exif: {})",
            input.display(),
            source.width(),
            source.height(),
            source.color(),
            source.exif.is_some()
        );

        let pixels = Self::normalize_color(source.pixels, format);
        let pixels = self.resizer.apply(pixels)?;
        let prepared = SourceImage {
            pixels,
            exif: source.exif,
        };

        let bytes = self.encode(&prepared, format)?;
        FileManager::write_atomic(output_path, &bytes)
            .map_err(|e| ConvertError::Encode(format!("write {} failed: {}", output_path.display(), e)))?;

        debug!(
            "Wrote {} ({})",
            output_path.display(),
            FileManager::format_size(bytes.len() as u64)
        );
        Ok(output_path.to_path_buf())
    }

    /// Encode at maximum quality into an in-memory buffer
    pub fn encode(&self, image: &SourceImage, format: TargetFormat) -> ConvertResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let exif = image.exif.as_deref();

        let written = match format {
            TargetFormat::Jpg => {
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
                attach_exif(&mut encoder, exif);
                image.pixels.write_with_encoder(encoder)
            }
            TargetFormat::Png => {
                let compression = if self.options.optimize {
                    CompressionType::Best
                } else {
                    CompressionType::Default
                };
                let mut encoder =
                    PngEncoder::new_with_quality(&mut buffer, compression, PngFilterType::Adaptive);
                attach_exif(&mut encoder, exif);
                image.pixels.write_with_encoder(encoder)
            }
            TargetFormat::Webp => {
                let mut encoder = WebPEncoder::new_lossless(&mut buffer);
                attach_exif(&mut encoder, exif);
                image.pixels.write_with_encoder(encoder)
            }
            TargetFormat::Svg => {
                return Err(ConvertError::UnsupportedFormat(format!(
                    "{} has no raster encoder",
                    format
                )))
            }
        };
        written.map_err(ConvertError::encode)?;

        Ok(buffer)
    }
}

/// Hand the original EXIF blob to the encoder; losing it is not fatal
fn attach_exif<E: ImageEncoder>(encoder: &mut E, exif: Option<&[u8]>) {
    if let Some(blob) = exif {
        if let Err(e) = encoder.set_exif_metadata(blob.to_vec()) {
            warn!("EXIF metadata dropped: {}", e);
        }
    }
}
