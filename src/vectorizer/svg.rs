//! SVG document model and serialization.

use super::Channel;
use imageproc::point::Point;
use std::fmt;

/// Opacity of contour paths
pub const PATH_OPACITY: f32 = 0.6;
/// Opacity of the radial gradient overlay
pub const GRADIENT_OPACITY: f32 = 0.3;

const GRADIENT_ID: &str = "overlay-gradient";

/// A closed, filled polyline from one channel
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    pub channel: Channel,
    pub points: Vec<Point<i32>>,
}

impl SvgPath {
    /// `M` first point, `L` each following point, `Z`
    pub fn path_data(&self) -> String {
        let mut data = String::new();
        for (i, point) in self.points.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                data.push(' ');
            }
            data.push_str(&format!("{}{},{}", command, point.x, point.y));
        }
        data.push_str(" Z");
        data
    }
}

/// Vector approximation of a raster, sized to its pixel dimensions.
///
/// Paths are drawn in insertion order and the gradient rectangle always
/// comes last, on top of every path.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub width: u32,
    pub height: u32,
    pub paths: Vec<SvgPath>,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            paths: Vec::new(),
        }
    }

    pub fn push(&mut self, path: SvgPath) {
        self.paths.push(path);
    }

    /// Paths contributed by one channel
    pub fn paths_for(&self, channel: Channel) -> impl Iterator<Item = &SvgPath> {
        self.paths.iter().filter(move |path| path.channel == channel)
    }

    pub fn to_markup(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = (self.width, self.height);

        writeln!(f, r#"<?xml version="1.0" encoding="utf-8" ?>"#)?;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        )?;
        writeln!(f, "<defs>")?;
        writeln!(f, r#"<radialGradient id="{GRADIENT_ID}" cx="50%" cy="50%" r="50%">"#)?;
        writeln!(f, r#"<stop offset="0%" stop-color="{}" />"#, rgb(Channel::Red.color()))?;
        writeln!(f, r#"<stop offset="100%" stop-color="{}" />"#, rgb(Channel::Blue.color()))?;
        writeln!(f, "</radialGradient>")?;
        writeln!(f, "</defs>")?;

        for path in &self.paths {
            writeln!(
                f,
                r#"<path d="{}" fill="{}" fill-opacity="{}" />"#,
                path.path_data(),
                rgb(path.channel.color()),
                PATH_OPACITY
            )?;
        }

        writeln!(
            f,
            r#"<rect x="0" y="0" width="{w}" height="{h}" fill="url(#{GRADIENT_ID})" fill-opacity="{GRADIENT_OPACITY}" />"#
        )?;
        writeln!(f, "</svg>")
    }
}

fn rgb(color: [u8; 3]) -> String {
    format!("rgb({},{},{})", color[0], color[1], color[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_data() {
        let path = SvgPath {
            channel: Channel::Green,
            points: vec![Point::new(1, 2), Point::new(5, 2), Point::new(5, 9)],
        };
        assert_eq!(path.path_data(), "M1,2 L5,2 L5,9 Z");
    }

    #[test]
    fn test_markup_layering_and_size() {
        let mut document = SvgDocument::new(64, 32);
        document.push(SvgPath {
            channel: Channel::Red,
            points: vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)],
        });
        let markup = document.to_markup();

        assert!(markup.contains(r#"width="64" height="32" viewBox="0 0 64 32""#));
        assert!(markup.contains(r#"fill="rgb(255,0,0)" fill-opacity="0.6""#));
        assert!(markup.contains(r#"<stop offset="0%" stop-color="rgb(255,0,0)" />"#));
        assert!(markup.contains(r#"<stop offset="100%" stop-color="rgb(0,0,255)" />"#));
        assert!(markup.contains(r#"cx="50%" cy="50%" r="50%""#));

        let path_at = markup.find("<path").unwrap();
        let rect_at = markup.find("<rect").unwrap();
        assert!(path_at < rect_at);
        assert!(markup.contains(r##"fill="url(#overlay-gradient)" fill-opacity="0.3""##));
        assert!(markup.trim_end().ends_with("</svg>"));
    }
}
