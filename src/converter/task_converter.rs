//! # Task Converter Module
//!
//! Worker per la conversione di singoli file.
//! Sceglie la pipeline in base al formato di destinazione: raster tramite
//! `ImageCodec`, SVG tramite `Vectorizer`.

use crate::converter::batch_worker::BatchJob;
use crate::converter::path_resolver::PathResolver;
use crate::error::ConvertResult;
use crate::format::TargetFormat;
use crate::image_codec::ImageCodec;
use crate::vectorizer::Vectorizer;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Converts the `index`-th file of a batch, returning the written path
pub trait FileConverter: Send {
    fn convert(&mut self, input: &Path, index: usize) -> ConvertResult<PathBuf>;
}

/// Converter used for real batches
#[derive(Debug, Clone)]
pub struct TaskConverter {
    format: TargetFormat,
    codec: ImageCodec,
    vectorizer: Vectorizer,
    resolver: PathResolver,
}

impl TaskConverter {
    /// Crea il converter per un job, calcolando in anticipo tutti i path di output
    pub fn new(job: &BatchJob) -> Self {
        Self {
            format: job.format,
            codec: ImageCodec::new(job.options.clone()),
            vectorizer: Vectorizer::from_options(&job.options),
            resolver: PathResolver::new(&job.files, &job.output_dir, job.format, &job.options),
        }
    }
}

impl FileConverter for TaskConverter {
    fn convert(&mut self, input: &Path, index: usize) -> ConvertResult<PathBuf> {
        let output = self.resolver.output_for(index)?;

        if self.format.is_vector() {
            debug!("Vectorizing {} -> {}", input.display(), output.display());
            self.vectorizer.vectorize(input, &output)?;
            Ok(output)
        } else {
            debug!("Converting {} -> {}", input.display(), output.display());
            self.codec.convert_to(input, &output, self.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn job(dir: &TempDir, files: Vec<PathBuf>, format: TargetFormat) -> BatchJob {
        BatchJob::new(files, dir.path().join("out"), format, ConversionOptions::default()).unwrap()
    }

    #[test]
    fn test_dispatches_on_target_format() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("out")).unwrap();
        let input = temp_dir.path().join("pic.png");
        RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])).save(&input).unwrap();

        let mut raster = TaskConverter::new(&job(&temp_dir, vec![input.clone()], TargetFormat::Jpg));
        let written = raster.convert(&input, 0).unwrap();
        assert_eq!(written, temp_dir.path().join("out/pic.jpg"));
        assert!(image::open(&written).is_ok());

        let mut vector = TaskConverter::new(&job(&temp_dir, vec![input.clone()], TargetFormat::Svg));
        let written = vector.convert(&input, 0).unwrap();
        assert_eq!(written, temp_dir.path().join("out/pic.svg"));
        assert!(std::fs::read_to_string(&written).unwrap().contains("<svg"));
    }
}
