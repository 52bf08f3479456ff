//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Espansione ricorsiva delle directory passate come input
//! - Determinazione dei formati immagine supportati in input
//! - Scrittura atomica dei file di output (file temporaneo + rename)
//! - Verifica che la directory di output sia scrivibile
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati in input:
//! - **Immagini**: PNG, JPG, JPEG, WebP
//!
//! ## Sicurezza operazioni:
//! - Il file temporaneo vive nella stessa directory della destinazione, quindi
//!   il rename finale non attraversa filesystem diversi
//! - Un errore durante la scrittura elimina il temporaneo: nessun file a metà
//!   è mai visibile con il nome di destinazione

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Expand inputs into an ordered list of files.
    ///
    /// Directories are walked recursively and contribute supported images in
    /// sorted order; explicit file paths are kept as given so that a missing or
    /// unreadable file is reported per-file by the batch.
    pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                files.extend(Self::find_image_files(input));
            } else {
                files.push(input.clone());
            }
        }

        files
    }

    /// Find all supported image files in a directory
    pub fn find_image_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::is_supported_image(path))
            .collect();

        files.sort();
        files
    }

    /// Check if a file has a supported input extension
    pub fn is_supported_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "png" | "jpg" | "jpeg" | "webp")
        } else {
            false
        }
    }

    /// Display name of a path (file name only)
    pub fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Write bytes so that readers never observe a partially written file
    pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Check that a directory exists and accepts new files
    pub fn ensure_writable_dir(dir: &Path) -> io::Result<()> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {}", dir.display()),
            ));
        }
        // Dropped immediately; the probe file is removed on close
        tempfile::tempfile_in(dir)?;
        Ok(())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
