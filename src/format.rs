//! # Target Format Module
//!
//! Tag del formato di destinazione di un batch. I tre formati raster passano
//! per `ImageCodec`, `svg` per il `Vectorizer`.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format of a conversion batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Webp,
    #[value(alias = "jpeg")]
    Jpg,
    Png,
    Svg,
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self::Webp
    }
}

impl TargetFormat {
    /// File extension used for output names
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Webp => "webp",
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Svg => "svg",
        }
    }

    /// True for the contour-traced vector output
    pub fn is_vector(&self) -> bool {
        matches!(self, TargetFormat::Svg)
    }

    /// Only PNG keeps an alpha channel
    pub fn supports_alpha(&self) -> bool {
        matches!(self, TargetFormat::Png)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webp" => Ok(TargetFormat::Webp),
            "jpg" | "jpeg" => Ok(TargetFormat::Jpg),
            "png" => Ok(TargetFormat::Png),
            "svg" => Ok(TargetFormat::Svg),
            other => Err(ConvertError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("WebP".parse::<TargetFormat>().unwrap(), TargetFormat::Webp);
        assert_eq!("jpeg".parse::<TargetFormat>().unwrap(), TargetFormat::Jpg);
        assert_eq!(" png ".parse::<TargetFormat>().unwrap(), TargetFormat::Png);
        assert!(matches!(
            "gif".parse::<TargetFormat>(),
            Err(ConvertError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_properties() {
        assert!(TargetFormat::Svg.is_vector());
        assert!(!TargetFormat::Jpg.is_vector());
        assert!(TargetFormat::Png.supports_alpha());
        assert!(!TargetFormat::Webp.supports_alpha());
        assert_eq!(TargetFormat::Jpg.to_string(), "jpg");
    }
}
