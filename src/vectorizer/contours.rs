//! Per-channel binarization and contour extraction.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::find_contours;
use imageproc::point::Point;

/// Extract one color channel as a grayscale plane
pub fn channel_plane(rgb: &RgbImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| Luma([rgb.get_pixel(x, y)[channel]]))
}

/// Two-level threshold: values above `threshold` become 255, the rest 0
pub fn binarize(plane: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        if plane.get_pixel(x, y)[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Boundaries of the 0-level regions of a binarized plane.
///
/// Borders are followed with the full hierarchy (outer borders and holes at
/// every depth), then compressed so only direction changes remain.
pub fn trace_regions(binary: &GrayImage) -> Vec<Vec<Point<i32>>> {
    let mut dark = binary.clone();
    image::imageops::invert(&mut dark);

    find_contours::<i32>(&dark)
        .into_iter()
        .map(|contour| compress_chain(&contour.points))
        .filter(|points| !points.is_empty())
        .collect()
}

/// Drop vertices lying inside straight horizontal, vertical or diagonal runs
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |a: &Point<i32>, b: &Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = &points[(i + n - 1) % n];
            let current = &points[i];
            let next = &points[(i + 1) % n];
            step(prev, current) != step(current, next)
        })
        .map(|i| points[i])
        .collect()
}

/// Enclosed area of a closed polygon (shoelace formula)
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    twice_area.abs() as f64 / 2.0
}
