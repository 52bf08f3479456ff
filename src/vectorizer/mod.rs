//! # Vectorizer Module
//!
//! Questo modulo produce un'approssimazione SVG di un'immagine raster tracciando
//! i contorni di ciascun canale colore.
//!
//! ## Pipeline:
//! 1. **Decodifica**: Stessa lettura da buffer usata dal codec raster
//! 2. **Resize**: Solo se entrambe le dimensioni sono forzate
//! 3. **Per canale (R, G, B)**: Binarizzazione a soglia, tracciamento dei bordi
//!    delle regioni scure con gerarchia completa, compressione delle catene
//! 4. **Filtro**: Scartati i contorni con area <= 100 px²
//! 5. **Documento**: Path semi-trasparenti per canale + overlay con gradiente radiale
//!
//! ## Sottomoduli:
//! - `contours`: Binarizzazione, border following, area
//! - `svg`: Modello del documento e serializzazione

pub mod contours;
pub mod svg;

pub use svg::{SvgDocument, SvgPath};

use crate::config::ConversionOptions;
use crate::error::{ConvertError, ConvertResult};
use crate::file_manager::FileManager;
use crate::image_codec::ImageCodec;
use crate::resize::{ImageResizer, ResizeMode};
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// Contours enclosing this area or less are dropped
pub const MIN_CONTOUR_AREA: f64 = 100.0;

/// Color channel a contour was traced on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Tracing and layering order
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Pure fill color of the channel
    pub fn color(self) -> [u8; 3] {
        match self {
            Channel::Red => [255, 0, 0],
            Channel::Green => [0, 255, 0],
            Channel::Blue => [0, 0, 255],
        }
    }
}

/// Raster to SVG conversion
#[derive(Debug, Clone)]
pub struct Vectorizer {
    threshold: u8,
    resizer: ImageResizer,
}

impl Vectorizer {
    pub fn new(threshold: u8, resize: ResizeMode) -> Self {
        Self {
            threshold,
            resizer: ImageResizer::new(resize),
        }
    }

    pub fn from_options(options: &ConversionOptions) -> Self {
        Self::new(options.threshold, ResizeMode::forced_only(options))
    }

    /// Vectorize `input` and write the SVG document at `output`
    pub fn vectorize(&self, input: &Path, output: &Path) -> ConvertResult<()> {
        let source = ImageCodec::load(input)?;
        let pixels = self.resizer.apply(source.pixels)?;
        let document = self.trace(&pixels.to_rgb8());

        debug!(
            "Vectorized {} into {} paths ({}x{})",
            input.display(),
            document.paths.len(),
            document.width,
            document.height
        );

        FileManager::write_atomic(output, document.to_markup().as_bytes())
            .map_err(|e| ConvertError::Encode(format!("write {} failed: {}", output.display(), e)))
    }

    /// Build the document for an already decoded image
    pub fn trace(&self, rgb: &RgbImage) -> SvgDocument {
        let mut document = SvgDocument::new(rgb.width(), rgb.height());

        for channel in Channel::ALL {
            let plane = contours::channel_plane(rgb, channel.index());
            let binary = contours::binarize(&plane, self.threshold);

            let mut dropped = 0usize;
            for points in contours::trace_regions(&binary) {
                if contours::polygon_area(&points) > MIN_CONTOUR_AREA {
                    document.push(SvgPath { channel, points });
                } else {
                    dropped += 1;
                }
            }
            debug!(
                "{:?}: {} contours kept, {} below area cutoff",
                channel,
                document.paths_for(channel).count(),
                dropped
            );
        }

        document
    }
}
