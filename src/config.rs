//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConversionOptions`, lo snapshot immutabile delle opzioni di un batch
//! - Definisce la struct `Config` persistita su file JSON (formato, output, opzioni)
//! - Fornisce validazione dei parametri di input
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di conversione:
//! - `optimize`: Ottimizzazione a livello di encoder (default: true)
//! - `resize`: Abilita il ridimensionamento (default: false)
//! - `target_width` / `target_height`: 0 = deriva dall'aspect ratio
//! - `new_base_name`: Nome base dei file di output (vuoto = nome originale)
//! - `threshold`: Soglia di binarizzazione per l'output SVG (0-255, default: 128)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     format: TargetFormat::Jpg,
//!     options: ConversionOptions { resize: true, target_width: 800, ..Default::default() },
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ConvertError;
use crate::format::TargetFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options shared by every file of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Encoder-level optimization
    pub optimize: bool,
    /// Resize before encoding
    pub resize: bool,
    /// Target width in pixels (0 = derive from aspect ratio)
    pub target_width: u32,
    /// Target height in pixels (0 = derive from aspect ratio)
    pub target_height: u32,
    /// Overrides the output file stem when non-empty
    pub new_base_name: String,
    /// Binarization cutoff for SVG output
    pub threshold: u8,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            resize: false,
            target_width: 0,
            target_height: 0,
            new_base_name: String::new(),
            threshold: 128,
        }
    }
}

impl ConversionOptions {
    /// Trimmed output stem override, `None` when empty
    pub fn base_name(&self) -> Option<&str> {
        let name = self.new_base_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Exact size when both dimensions are forced
    pub fn forced_size(&self) -> Option<(u32, u32)> {
        if self.resize && self.target_width > 0 && self.target_height > 0 {
            Some((self.target_width, self.target_height))
        } else {
            None
        }
    }

    /// Validate options before a batch starts
    pub fn validate(&self) -> Result<(), ConvertError> {
        if let Some(name) = self.base_name() {
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConvertError::Validation(format!(
                    "New base name must be a plain file name: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Persisted application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default target format
    pub format: TargetFormat,
    /// Default output directory
    pub output_path: Option<PathBuf>,
    /// Default conversion options
    pub options: ConversionOptions,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;

        if let Some(ref output_path) = self.output_path {
            if output_path.exists() && !output_path.is_dir() {
                return Err(anyhow::anyhow!(
                    "Output path is not a directory: {}",
                    output_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-converter").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
