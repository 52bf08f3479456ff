//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare gli errori per-file e di sessione
//! - Fornisce messaggi di errore descrittivi, mostrati nel report finale del batch
//! - Classifica gli `image::ImageError` di decodifica (formato illeggibile vs I/O)
//!
//! ## Categorie di errori:
//! - `NotFound`: Il path di input non esiste
//! - `UnreadableFormat`: Container non riconosciuto o corrotto
//! - `InvalidDimensions`: Larghezza/altezza non numeriche o negative
//! - `Encode`: L'encoder ha rifiutato l'immagine o la scrittura è fallita
//! - `UnsupportedFormat`: Formato di destinazione senza encoder raster (es. `svg`)
//! - `EmptySelection` / `OutputDirectory` / `BatchRunning`: precondizioni di sessione
//!
//! ## Esempio:
//! ```rust,ignore
//! if files.is_empty() {
//!     return Err(ConvertError::EmptySelection);
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for image conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unreadable image format: {0}")]
    UnreadableFormat(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Unsupported target format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No files selected")]
    EmptySelection,

    #[error("Output directory error: {0}")]
    OutputDirectory(String),

    #[error("A conversion batch is already running")]
    BatchRunning,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConvertError {
    /// Maps an I/O failure on an input path, keeping `NotFound` distinct
    pub fn from_input_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io(err)
        }
    }

    /// Wraps an encoder failure
    pub fn encode(err: impl std::fmt::Display) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<image::ImageError> for ConvertError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::Io(e),
            other => Self::UnreadableFormat(other.to_string()),
        }
    }
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_input_io_not_found_is_classified() {
        let err = ConvertError::from_input_io(
            Path::new("missing.png"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ConvertError::NotFound(ref p) if p == Path::new("missing.png")));

        let err = ConvertError::from_input_io(
            Path::new("locked.png"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ConvertError::Io(_)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ConvertError::EmptySelection.to_string(), "No files selected");
        assert_eq!(
            ConvertError::InvalidDimensions("abc".into()).to_string(),
            "Invalid dimensions: abc"
        );
    }
}
