#![forbid(unsafe_code)]

//! Whole-raster transforms: rotation, grayscale, colour statistics.

use tessel_core::{Error, Result};

use crate::color::Rgba;
use crate::raster::Raster;

/// Rotate by `degrees`, counter-clockwise for positive angles.
///
/// The output grows to the bounding box of the rotated raster; uncovered
/// pixels are transparent. Quarter turns are exact. Surface alpha is kept.
/// A non-finite angle returns an unrotated copy.
pub fn rotate(src: &Raster, degrees: f64) -> Raster {
    if !degrees.is_finite() {
        return src.clone();
    }
    let turn = degrees.rem_euclid(360.0);
    let (w, h) = (src.width(), src.height());
    let mut out = if turn == 0.0 {
        src.clone()
    } else if turn == 90.0 {
        remap(src, h, w, |x, y| (w as i32 - 1 - y, x))
    } else if turn == 180.0 {
        remap(src, w, h, |x, y| (w as i32 - 1 - x, h as i32 - 1 - y))
    } else if turn == 270.0 {
        remap(src, h, w, |x, y| (y, h as i32 - 1 - x))
    } else {
        rotate_free(src, turn.to_radians())
    };
    out.set_alpha(src.alpha());
    out
}

fn remap(src: &Raster, width: u32, height: u32, map: impl Fn(i32, i32) -> (i32, i32)) -> Raster {
    let mut out = Raster::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let (sx, sy) = map(x, y);
            if let Some(c) = src.get(sx, sy) {
                // In bounds by construction.
                let _ = out.set((x, y), c);
            }
        }
    }
    out
}

fn rotate_free(src: &Raster, radians: f64) -> Raster {
    let (sin, cos) = radians.sin_cos();
    let (w, h) = (src.width() as f64, src.height() as f64);
    let out_w = (w * cos.abs() + h * sin.abs()).ceil() as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).ceil() as u32;
    let (ocx, ocy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);
    let (scx, scy) = (w / 2.0, h / 2.0);
    remap(src, out_w, out_h, |x, y| {
        let dx = x as f64 + 0.5 - ocx;
        let dy = y as f64 + 0.5 - ocy;
        // Inverse rotation in screen space (y grows downward).
        let sx = dx * cos - dy * sin + scx;
        let sy = dx * sin + dy * cos + scy;
        (sx.floor() as i32, sy.floor() as i32)
    })
}

/// Grayscale copy using Rec. 709 luma; alpha is preserved per pixel.
pub fn grayscale(src: &Raster) -> Raster {
    let mut out = src.clone();
    grayscale_in_place(&mut out);
    out
}

/// Convert to grayscale in place.
pub fn grayscale_in_place(raster: &mut Raster) {
    for p in raster.pixels_mut() {
        let y = p.luma();
        *p = Rgba::rgba(y, y, y, p.a());
    }
}

/// Mean colour of every pixel; alpha is taken from the top-left pixel.
///
/// # Errors
///
/// `OutOfRange` for an empty raster.
pub fn average_color(src: &Raster) -> Result<Rgba> {
    let first = src
        .get(0, 0)
        .ok_or_else(|| Error::out_of_range("average colour of an empty raster"))?;
    let n = src.pixels().len() as u64;
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for p in src.pixels() {
        r += p.r() as u64;
        g += p.g() as u64;
        b += p.b() as u64;
    }
    Ok(Rgba::rgba((r / n) as u8, (g / n) as u8, (b / n) as u8, first.a()))
}

/// Euclidean distance between two colours over all four channels.
#[inline]
pub fn color_distance(a: Rgba, b: Rgba) -> f64 {
    a.distance(b)
}
