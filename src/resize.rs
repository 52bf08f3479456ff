//! # Image Resize Module
//!
//! Questo modulo gestisce il ridimensionamento delle immagini prima dell'encoding.
//!
//! ## Caratteristiche
//! - **Parsing dimensioni**: Accetta input testuali come `"200"`, `"200 px"`, `""`
//! - **Aspect ratio**: Se una sola dimensione è > 0, l'altra viene derivata
//!   dalle proporzioni originali (arrotondata per difetto)
//! - **Stretch**: Se entrambe sono > 0, il resize è forzato e può deformare
//! - **Filtro Lanczos3**: Downscaling anti-aliased di alta qualità
//!
//! ## Modalità
//! | Larghezza | Altezza | Risultato                          |
//! |-----------|---------|------------------------------------|
//! | 0         | 0       | Nessun resize                      |
//! | W > 0     | 0       | W x (W * H_orig / W_orig)          |
//! | 0         | H > 0   | (H * W_orig / H_orig) x H          |
//! | W > 0     | H > 0   | W x H (forzato)                    |

use crate::config::ConversionOptions;
use crate::error::ConvertError;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// Resampling filter used for every resize
const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Parse a user-typed dimension such as `"200"`, `"200 px"` or `""` (= 0)
pub fn parse_dimension(text: &str) -> Result<u32, ConvertError> {
    let trimmed = text.trim();
    let number = trimmed
        .strip_suffix("px")
        .or_else(|| trimmed.strip_suffix("PX"))
        .unwrap_or(trimmed)
        .trim();

    if number.is_empty() {
        return Ok(0);
    }

    if !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConvertError::InvalidDimensions(format!(
            "'{}' is not a non-negative integer",
            text.trim()
        )));
    }

    number
        .parse::<u32>()
        .map_err(|e| ConvertError::InvalidDimensions(format!("'{}': {}", text.trim(), e)))
}

/// How a resize request maps onto the source dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// No resize
    Keep,
    /// One dimension given, the other follows the source aspect ratio
    Proportional { width: u32, height: u32 },
    /// Both dimensions forced, aspect ratio not preserved
    Stretch { width: u32, height: u32 },
}

impl Default for ResizeMode {
    fn default() -> Self {
        Self::Keep
    }
}

impl ResizeMode {
    /// Full resize semantics used by raster conversion
    pub fn from_options(options: &ConversionOptions) -> Self {
        if !options.resize {
            return Self::Keep;
        }
        match (options.target_width, options.target_height) {
            (0, 0) => Self::Keep,
            (width, height) if width > 0 && height > 0 => Self::Stretch { width, height },
            (width, height) => Self::Proportional { width, height },
        }
    }

    /// Forced-size only, as used by the vectorizer
    pub fn forced_only(options: &ConversionOptions) -> Self {
        match options.forced_size() {
            Some((width, height)) => Self::Stretch { width, height },
            None => Self::Keep,
        }
    }

    /// Compute the final size for a source of `original` dimensions
    pub fn target_size(&self, original: (u32, u32)) -> Result<Option<(u32, u32)>, ConvertError> {
        let (orig_w, orig_h) = original;
        match *self {
            ResizeMode::Keep => Ok(None),
            ResizeMode::Stretch { width, height } => Ok(Some((width, height))),
            ResizeMode::Proportional { width, height } => {
                if orig_w == 0 || orig_h == 0 {
                    return Err(ConvertError::InvalidDimensions(format!(
                        "source image has empty size {}x{}",
                        orig_w, orig_h
                    )));
                }
                if width > 0 {
                    Ok(Some((width, Self::scale(width, orig_h, orig_w)?)))
                } else {
                    Ok(Some((Self::scale(height, orig_w, orig_h)?, height)))
                }
            }
        }
    }

    /// `known * other / known_original`, rounded down, never below 1
    fn scale(known: u32, other_original: u32, known_original: u32) -> Result<u32, ConvertError> {
        let value = known as u64 * other_original as u64 / known_original as u64;
        u32::try_from(value.max(1)).map_err(|_| {
            ConvertError::InvalidDimensions(format!("derived dimension {} is too large", value))
        })
    }
}

/// Applies a `ResizeMode` to decoded images
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer {
    mode: ResizeMode,
}

impl ImageResizer {
    pub fn new(mode: ResizeMode) -> Self {
        Self { mode }
    }

    /// Resize the image, or return it untouched when no resize applies
    pub fn apply(&self, image: DynamicImage) -> Result<DynamicImage, ConvertError> {
        let original = (image.width(), image.height());
        match self.mode.target_size(original)? {
            Some((width, height)) if (width, height) != original => {
                debug!(
                    "Resizing {}x{} -> {}x{} ({:?})",
                    original.0, original.1, width, height, self.mode
                );
                Ok(image.resize_exact(width, height, RESAMPLE_FILTER))
            }
            _ => Ok(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(width: u32, height: u32) -> ConversionOptions {
        ConversionOptions {
            resize: true,
            target_width: width,
            target_height: height,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("200").unwrap(), 200);
        assert_eq!(parse_dimension(" 200 px ").unwrap(), 200);
        assert_eq!(parse_dimension("64px").unwrap(), 64);
        assert_eq!(parse_dimension("0 px").unwrap(), 0);
        assert_eq!(parse_dimension("").unwrap(), 0);
        assert_eq!(parse_dimension("   ").unwrap(), 0);
    }

    #[test]
    fn test_parse_dimension_rejects_invalid() {
        for input in ["-5", "abc", "1.5", "12 34", "+3", "99999999999"] {
            assert!(
                matches!(parse_dimension(input), Err(ConvertError::InvalidDimensions(_))),
                "expected rejection for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_mode_from_options() {
        assert_eq!(ResizeMode::from_options(&options(0, 0)), ResizeMode::Keep);
        assert_eq!(
            ResizeMode::from_options(&options(200, 0)),
            ResizeMode::Proportional { width: 200, height: 0 }
        );
        assert_eq!(
            ResizeMode::from_options(&options(200, 50)),
            ResizeMode::Stretch { width: 200, height: 50 }
        );

        let mut disabled = options(200, 50);
        disabled.resize = false;
        assert_eq!(ResizeMode::from_options(&disabled), ResizeMode::Keep);
    }

    #[test]
    fn test_forced_only_ignores_proportional_requests() {
        assert_eq!(ResizeMode::forced_only(&options(200, 0)), ResizeMode::Keep);
        assert_eq!(
            ResizeMode::forced_only(&options(30, 40)),
            ResizeMode::Stretch { width: 30, height: 40 }
        );
    }

    #[test]
    fn test_proportional_target_size() {
        let by_width = ResizeMode::Proportional { width: 200, height: 0 };
        assert_eq!(by_width.target_size((100, 50)).unwrap(), Some((200, 100)));

        let by_height = ResizeMode::Proportional { width: 0, height: 30 };
        assert_eq!(by_height.target_size((100, 50)).unwrap(), Some((60, 30)));

        // Rounded down, clamped to at least one pixel
        let tiny = ResizeMode::Proportional { width: 1, height: 0 };
        assert_eq!(tiny.target_size((1000, 10)).unwrap(), Some((1, 1)));
    }

    #[test]
    fn test_proportional_preserves_aspect_ratio() {
        let sources = [(100, 50), (640, 480), (333, 777), (1920, 1080), (7, 3)];
        let requests = [1, 17, 200, 1023];

        for &(w, h) in &sources {
            for &req in &requests {
                let (tw, th) = ResizeMode::Proportional { width: req, height: 0 }
                    .target_size((w, h))
                    .unwrap()
                    .unwrap();
                assert_eq!(tw, req);
                let exact = req as f64 * h as f64 / w as f64;
                assert!((th as f64 - exact).abs() <= 1.0, "{}x{} -> {}x{}", w, h, tw, th);

                let (tw, th) = ResizeMode::Proportional { width: 0, height: req }
                    .target_size((w, h))
                    .unwrap()
                    .unwrap();
                assert_eq!(th, req);
                let exact = req as f64 * w as f64 / h as f64;
                assert!((tw as f64 - exact).abs() <= 1.0, "{}x{} -> {}x{}", w, h, tw, th);
            }
        }
    }

    #[test]
    fn test_resizer_apply() {
        let image = DynamicImage::new_rgba8(100, 50);

        let resized = ImageResizer::new(ResizeMode::from_options(&options(200, 0)))
            .apply(image.clone())
            .unwrap();
        assert_eq!((resized.width(), resized.height()), (200, 100));

        let stretched = ImageResizer::new(ResizeMode::from_options(&options(10, 90)))
            .apply(image.clone())
            .unwrap();
        assert_eq!((stretched.width(), stretched.height()), (10, 90));

        let kept = ImageResizer::default().apply(image).unwrap();
        assert_eq!((kept.width(), kept.height()), (100, 50));
    }
}
