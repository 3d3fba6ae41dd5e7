//! Pixel-level drawing on RGBA buffers: polygons, ellipses, stamps and
//! convolution filters.

use image::{imageops, Rgba, RgbaImage};

/// Write one pixel, ignoring coordinates outside the image.
pub fn put_pixel(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < img.width() as u64 && (y as u64) < img.height() as u64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, both endpoints included.
pub fn draw_line(img: &mut RgbaImage, from: (i32, i32), to: (i32, i32), color: Rgba<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(img, x0 as i64, y0 as i64, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Filled and/or outlined polygon. The boundary belongs to the shape: with no
/// outline color the edges are drawn in the fill color.
pub fn draw_polygon(
    img: &mut RgbaImage,
    points: &[(i32, i32)],
    fill: Option<Rgba<u8>>,
    outline: Option<Rgba<u8>>,
) {
    if points.len() < 2 {
        return;
    }
    if let Some(fill) = fill {
        fill_polygon_interior(img, points, fill);
    }
    if let Some(edge) = outline.or(fill) {
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            draw_line(img, points[i], next, edge);
        }
    }
}

/// Scanline fill sampled at integer pixel rows.
fn fill_polygon_interior(img: &mut RgbaImage, points: &[(i32, i32)], color: Rgba<u8>) {
    let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);

    let mut crossings: Vec<f64> = Vec::new();
    for y in min_y..=max_y {
        crossings.clear();
        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            if y0 == y1 {
                continue;
            }
            let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
            if y < lo || y >= hi {
                continue;
            }
            let t = (y - y0) as f64 / (y1 - y0) as f64;
            crossings.push(x0 as f64 + t * (x1 - x0) as f64);
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round() as i64;
            let stop = pair[1].round() as i64;
            for x in start..=stop {
                put_pixel(img, x, y as i64, color);
            }
        }
    }
}

/// Ellipse inscribed in the inclusive bounding box `(x0, y0, x1, y1)`.
/// The outline is the one-pixel band just inside the ellipse boundary.
pub fn draw_ellipse(
    img: &mut RgbaImage,
    bbox: (i32, i32, i32, i32),
    fill: Option<Rgba<u8>>,
    outline: Option<Rgba<u8>>,
) {
    let (x0, y0, x1, y1) = bbox;
    let cx = (x0 + x1) as f64 / 2.0;
    let cy = (y0 + y1) as f64 / 2.0;
    let rx = ((x1 - x0) as f64 / 2.0).max(0.5);
    let ry = ((y1 - y0) as f64 / 2.0).max(0.5);

    let inside = |x: i32, y: i32, rx: f64, ry: f64| {
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (x as f64 - cx) / rx;
        let ny = (y as f64 - cy) / ry;
        nx * nx + ny * ny <= 1.0 + 1e-9
    };

    for y in y0..=y1 {
        for x in x0..=x1 {
            if !inside(x, y, rx, ry) {
                continue;
            }
            let on_edge = !inside(x, y, rx - 1.0, ry - 1.0);
            match (on_edge, outline, fill) {
                (true, Some(edge), _) => put_pixel(img, x as i64, y as i64, edge),
                (_, _, Some(fill)) => put_pixel(img, x as i64, y as i64, fill),
                _ => {}
            }
        }
    }
}

/// Alpha-composite `stamp` onto `canvas` with its top-left corner at `(x, y)`.
/// Parts falling outside the canvas are clipped.
pub fn paste(canvas: &mut RgbaImage, stamp: &RgbaImage, x: i64, y: i64) {
    imageops::overlay(canvas, stamp, x, y);
}

/// Named convolution filters with the classic smoothing/sharpening kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Filter {
    Blur,
    Contour,
    Detail,
    EdgeEnhance,
    Sharpen,
    Smooth,
    SmoothMore,
}

struct Kernel {
    size: usize,
    weights: &'static [i32],
    scale: i32,
    offset: i32,
}

impl Filter {
    fn kernel(self) -> Kernel {
        match self {
            Filter::Blur => Kernel {
                size: 5,
                weights: &[
                    1, 1, 1, 1, 1, //
                    1, 0, 0, 0, 1, //
                    1, 0, 0, 0, 1, //
                    1, 0, 0, 0, 1, //
                    1, 1, 1, 1, 1,
                ],
                scale: 16,
                offset: 0,
            },
            Filter::Contour => Kernel {
                size: 3,
                weights: &[-1, -1, -1, -1, 8, -1, -1, -1, -1],
                scale: 1,
                offset: 255,
            },
            Filter::Detail => Kernel {
                size: 3,
                weights: &[0, -1, 0, -1, 10, -1, 0, -1, 0],
                scale: 6,
                offset: 0,
            },
            Filter::EdgeEnhance => Kernel {
                size: 3,
                weights: &[-1, -1, -1, -1, 10, -1, -1, -1, -1],
                scale: 2,
                offset: 0,
            },
            Filter::Sharpen => Kernel {
                size: 3,
                weights: &[-2, -2, -2, -2, 32, -2, -2, -2, -2],
                scale: 16,
                offset: 0,
            },
            Filter::Smooth => Kernel {
                size: 3,
                weights: &[1, 1, 1, 1, 5, 1, 1, 1, 1],
                scale: 13,
                offset: 0,
            },
            Filter::SmoothMore => Kernel {
                size: 5,
                weights: &[
                    1, 1, 1, 1, 1, //
                    1, 5, 5, 5, 1, //
                    1, 5, 44, 5, 1, //
                    1, 5, 5, 5, 1, //
                    1, 1, 1, 1, 1,
                ],
                scale: 100,
                offset: 0,
            },
        }
    }

    /// Convolve the RGB channels; alpha is carried over unchanged. Samples
    /// beyond the border repeat the nearest edge pixel.
    pub fn apply(self, img: &RgbaImage) -> RgbaImage {
        let kernel = self.kernel();
        let (width, height) = img.dimensions();
        let half = (kernel.size / 2) as i64;
        let mut out = RgbaImage::new(width, height);

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let mut acc = [0i32; 3];
                for ky in 0..kernel.size as i64 {
                    let sy = (y + ky - half).clamp(0, height as i64 - 1) as u32;
                    for kx in 0..kernel.size as i64 {
                        let sx = (x + kx - half).clamp(0, width as i64 - 1) as u32;
                        let w = kernel.weights[(ky * kernel.size as i64 + kx) as usize];
                        let p = img.get_pixel(sx, sy);
                        for c in 0..3 {
                            acc[c] += w * p[c] as i32;
                        }
                    }
                }
                let alpha = img.get_pixel(x as u32, y as u32)[3];
                let channel = |v: i32| (v / kernel.scale + kernel.offset).clamp(0, 255) as u8;
                out.put_pixel(
                    x as u32,
                    y as u32,
                    Rgba([channel(acc[0]), channel(acc[1]), channel(acc[2]), alpha]),
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn polygon_fill_covers_interior_and_edges() {
        let mut img = RgbaImage::new(5, 5);
        let square = [(0, 0), (4, 0), (4, 4), (0, 4)];
        draw_polygon(&mut img, &square, Some(RED), Some(BLUE));
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(0, 0), BLUE);
        assert_eq!(*img.get_pixel(4, 4), BLUE);
        assert_eq!(*img.get_pixel(4, 2), BLUE);
    }

    #[test]
    fn ellipse_outline_leaves_centre_clear() {
        let mut img = RgbaImage::new(11, 11);
        draw_ellipse(&mut img, (0, 0, 10, 10), None, Some(RED));
        assert_eq!(*img.get_pixel(5, 5), CLEAR);
        assert_eq!(*img.get_pixel(5, 0), RED);
        assert_eq!(*img.get_pixel(10, 5), RED);
        assert_eq!(*img.get_pixel(0, 0), CLEAR);
    }

    #[test]
    fn ellipse_fill_is_symmetric() {
        let mut img = RgbaImage::new(7, 7);
        draw_ellipse(&mut img, (0, 0, 6, 6), Some(RED), None);
        for y in 0..7 {
            for x in 0..7 {
                assert_eq!(img.get_pixel(x, y), img.get_pixel(6 - x, y));
                assert_eq!(img.get_pixel(x, y), img.get_pixel(x, 6 - y));
            }
        }
    }

    #[test]
    fn paste_is_clipped_and_respects_transparency() {
        let mut canvas = RgbaImage::from_pixel(4, 4, BLUE);
        let mut stamp = RgbaImage::new(3, 3);
        stamp.put_pixel(1, 1, RED);
        paste(&mut canvas, &stamp, -1, -1);
        assert_eq!(*canvas.get_pixel(0, 0), RED);
        assert_eq!(*canvas.get_pixel(1, 1), BLUE);
        paste(&mut canvas, &stamp, 2, 2);
        assert_eq!(*canvas.get_pixel(3, 3), RED);
    }

    #[test]
    fn put_pixel_ignores_out_of_bounds() {
        let mut img = RgbaImage::new(2, 2);
        put_pixel(&mut img, -1, 0, RED);
        put_pixel(&mut img, 2, 1, RED);
        put_pixel(&mut img, 1, 1, RED);
        assert_eq!(img.pixels().filter(|p| **p == RED).count(), 1);
    }

    #[test]
    fn smoothing_spreads_a_bright_pixel() {
        let mut img = RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 2, Rgba([130, 130, 130, 255]));
        let out = Filter::Smooth.apply(&img);
        assert_eq!(out.get_pixel(2, 2)[0], 50);
        assert_eq!(out.get_pixel(1, 1)[0], 10);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(2, 2)[3], 255);
    }

    #[test]
    fn three_by_three_kernels_keep_edges_and_alpha() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([80, 90, 100, 128]));
        for filter in [Filter::Smooth, Filter::Sharpen, Filter::Detail, Filter::EdgeEnhance] {
            let out = filter.apply(&img);
            assert_eq!(*out.get_pixel(0, 0), Rgba([80, 90, 100, 128]), "{filter:?}");
            assert_eq!(*out.get_pixel(3, 2), Rgba([80, 90, 100, 128]), "{filter:?}");
        }
        let contour = Filter::Contour.apply(&img);
        assert!(contour.pixels().all(|p| p.0 == [255, 255, 255, 128]));
    }

    #[test]
    fn flat_image_is_unchanged_by_normalised_kernels() {
        let img = RgbaImage::from_pixel(6, 6, Rgba([80, 90, 100, 255]));
        for filter in [Filter::Smooth, Filter::SmoothMore, Filter::Blur, Filter::Sharpen, Filter::Detail] {
            assert_eq!(filter.apply(&img), img, "{filter:?}");
        }
    }
}
