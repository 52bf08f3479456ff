//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output di un batch, così che codec raster
//! e vectorizer producano sempre gli stessi nomi.
//!
//! ## Regole:
//! - Nome base impostato, un solo file: `<nome>.<ext>`
//! - Nome base impostato, più file: `<nome>_<n>.<ext>` (n parte da 1)
//! - Nessun nome base: stem del file sorgente; se due sorgenti hanno lo stesso
//!   stem, tutti i file coinvolti ricevono il suffisso `_<n>` (posizione nel batch)
//! - Un nome generato non riusa mai un nome già assegnato nel batch: `n` viene
//!   incrementato finché il nome è libero (confronto case-insensitive)

use crate::config::ConversionOptions;
use crate::error::{ConvertError, ConvertResult};
use crate::format::TargetFormat;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output paths of a batch, one per input, computed up front
#[derive(Debug, Clone)]
pub struct PathResolver {
    outputs: Vec<Option<PathBuf>>,
    sources: Vec<PathBuf>,
}

impl PathResolver {
    /// Compute the output path of every file of a batch
    pub fn new(
        files: &[PathBuf],
        output_dir: &Path,
        format: TargetFormat,
        options: &ConversionOptions,
    ) -> Self {
        let extension = format.extension();

        let stems: Vec<Option<String>> = match options.base_name() {
            Some(base) if files.len() == 1 => vec![Some(base.to_string())],
            Some(base) => (1..=files.len()).map(|n| Some(format!("{}_{}", base, n))).collect(),
            None => Self::source_stems(files),
        };

        let outputs = stems
            .into_iter()
            .map(|stem| stem.map(|stem| output_dir.join(format!("{}.{}", stem, extension))))
            .collect();

        Self {
            outputs,
            sources: files.to_vec(),
        }
    }

    /// Output path for a single file converted on its own
    pub fn single(
        input: &Path,
        output_dir: &Path,
        format: TargetFormat,
        options: &ConversionOptions,
    ) -> ConvertResult<PathBuf> {
        Self::new(&[input.to_path_buf()], output_dir, format, options).output_for(0)
    }

    /// Output path of the `index`-th input
    pub fn output_for(&self, index: usize) -> ConvertResult<PathBuf> {
        match self.outputs.get(index) {
            Some(Some(path)) => {
                debug!("Output for #{}: {}", index, path.display());
                Ok(path.clone())
            }
            Some(None) => Err(ConvertError::Validation(format!(
                "Invalid file name: {}",
                self.sources[index].display()
            ))),
            None => Err(ConvertError::Validation(format!(
                "No file #{} in a batch of {}",
                index,
                self.outputs.len()
            ))),
        }
    }

    /// Source stems, suffixed with the batch position when they collide
    fn source_stems(files: &[PathBuf]) -> Vec<Option<String>> {
        let stems: Vec<Option<String>> = files
            .iter()
            .map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();

        // Case-insensitive so that outputs never collide on such filesystems
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for stem in stems.iter().flatten() {
            *occurrences.entry(stem.to_lowercase()).or_default() += 1;
        }

        // Unique stems keep their name, so reserve them before numbering the rest
        let mut taken: HashSet<String> = occurrences
            .iter()
            .filter(|(_, count)| **count == 1)
            .map(|(stem, _)| stem.clone())
            .collect();

        stems
            .into_iter()
            .enumerate()
            .map(|(i, stem)| {
                stem.map(|stem| {
                    if occurrences[&stem.to_lowercase()] == 1 {
                        return stem;
                    }
                    let mut n = i + 1;
                    loop {
                        let candidate = format!("{}_{}", stem, n);
                        if taken.insert(candidate.to_lowercase()) {
                            break candidate;
                        }
                        n += 1;
                    }
                })
            })
            .collect()
    }
}
