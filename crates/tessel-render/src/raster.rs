#![forbid(unsafe_code)]

//! Raster buffers.
//!
//! A [`Raster`] is a row-major grid of [`Rgba`] pixels plus an optional
//! surface-level alpha applied when the raster is composited onto another.
//!
//! # Invariants
//!
//! 1. `pixels.len() == width * height`.
//! 2. Zero-sized rasters are valid and hold no pixels.
//! 3. The surface alpha never alters stored pixels; it only scales the
//!    source alpha during [`Raster::blit`].
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Pixel access outside the raster | `Error::OutOfRange` |
//! | Pixel data length mismatch | `Error::InvalidArgument` |
//! | Blit partly outside either raster | Clipped silently |

use std::cell::RefCell;
use std::rc::Rc;

use tessel_core::{Error, Point, Rect, Result, Size};

use crate::color::Rgba;

/// Aliasing view of a raster for destinations that must see later writes.
pub type SharedRaster = Rc<RefCell<Raster>>;

/// A 2D pixel grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    alpha: Option<u8>,
}

impl Raster {
    /// Transparent raster of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Raster of the given size filled with one colour.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
            alpha: None,
        }
    }

    /// Raster from row-major pixels.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::invalid(format!(
                "{width}x{height} raster needs {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            alpha: None,
        })
    }

    /// Raster from packed RGBA8 bytes, as produced by the `image` crate.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `bytes.len() != width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return Err(Error::invalid(format!(
                "{width}x{height} raster needs {} bytes, got {}",
                width as usize * height as usize * 4,
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba::from_array([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// Pixels as packed RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Wrap into a shared, aliasing handle.
    pub fn into_shared(self) -> SharedRaster {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounds at the origin.
    #[inline]
    pub const fn rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Surface alpha, `None` when disabled.
    #[inline]
    pub const fn alpha(&self) -> Option<u8> {
        self.alpha
    }

    /// Set or disable the surface alpha.
    #[inline]
    pub fn set_alpha(&mut self, alpha: Option<u8>) {
        self.alpha = alpha;
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Pixel at `point`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the point lies outside the raster.
    pub fn at(&self, point: impl Into<Point>) -> Result<Rgba> {
        let p = point.into();
        self.get(p.x, p.y).ok_or_else(|| {
            Error::out_of_range(format!(
                "pixel ({}, {}) outside {}x{} raster",
                p.x, p.y, self.width, self.height
            ))
        })
    }

    /// Overwrite the pixel at `point`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the point lies outside the raster.
    pub fn set(&mut self, point: impl Into<Point>, color: Rgba) -> Result<()> {
        let p = point.into();
        match self.index(p.x, p.y) {
            Some(i) => {
                self.pixels[i] = color;
                Ok(())
            }
            None => Err(Error::out_of_range(format!(
                "pixel ({}, {}) outside {}x{} raster",
                p.x, p.y, self.width, self.height
            ))),
        }
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Overwrite the pixels inside `rect`, clipped to the raster.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some(clip) = rect.intersection(&self.rect()) else {
            return;
        };
        let w = self.width as usize;
        for y in clip.top()..clip.bottom() {
            let row = y as usize * w;
            self.pixels[row + clip.left() as usize..row + clip.right() as usize].fill(color);
        }
    }

    /// Force alpha to 255 inside `rect`, clipped to the raster.
    pub fn make_opaque(&mut self, rect: Rect) {
        let Some(clip) = rect.intersection(&self.rect()) else {
            return;
        };
        let w = self.width as usize;
        for y in clip.top()..clip.bottom() {
            let row = y as usize * w;
            for p in &mut self.pixels[row + clip.left() as usize..row + clip.right() as usize] {
                *p = p.with_alpha(255);
            }
        }
    }

    /// Composite `src` onto this raster with its top-left at `dest`.
    ///
    /// `area` selects a sub-rectangle of `src` (in `src` coordinates). Each
    /// source pixel has its alpha scaled by the source surface alpha, then is
    /// composited SourceOver the destination. Returns the destination region
    /// actually touched, which is empty when nothing overlaps.
    pub fn blit(&mut self, src: &Raster, dest: impl Into<Point>, area: Option<Rect>) -> Rect {
        self.transfer(src, dest.into(), area, |s, d, alpha| match alpha {
            Some(a) => s.scale_alpha(a).over(d),
            None => s.over(d),
        })
    }

    /// Like [`Raster::blit`] but copies pixels verbatim, ignoring alpha.
    pub fn copy_from(&mut self, src: &Raster, dest: impl Into<Point>, area: Option<Rect>) -> Rect {
        self.transfer(src, dest.into(), area, |s, _, _| s)
    }

    fn transfer(
        &mut self,
        src: &Raster,
        dest: Point,
        area: Option<Rect>,
        mut op: impl FnMut(Rgba, Rgba, Option<u8>) -> Rgba,
    ) -> Rect {
        let empty = Rect::new(dest.x, dest.y, 0, 0);
        let area = match area {
            Some(a) => match a.intersection(&src.rect()) {
                Some(clipped) => clipped,
                None => return empty,
            },
            None => src.rect(),
        };
        // Offset that maps source coordinates onto destination coordinates.
        let (ox, oy) = (dest.x as i64 - area.x as i64, dest.y as i64 - area.y as i64);
        let placed = Rect::new(dest.x, dest.y, area.width, area.height);
        let Some(target) = placed.intersection(&self.rect()) else {
            return empty;
        };
        for y in target.top()..target.bottom() {
            for x in target.left()..target.right() {
                let sx = (x as i64 - ox) as i32;
                let sy = (y as i64 - oy) as i32;
                if let (Some(si), Some(di)) = (src.index(sx, sy), self.index(x, y)) {
                    self.pixels[di] = op(src.pixels[si], self.pixels[di], src.alpha);
                }
            }
        }
        target
    }

    /// New raster holding the pixels under `rect`.
    ///
    /// Parts of `rect` outside this raster are transparent in the result.
    pub fn portion(&self, rect: Rect) -> Raster {
        let mut out = Raster::new(rect.width, rect.height);
        if let Some(clip) = rect.intersection(&self.rect()) {
            out.copy_from(self, Point::new(clip.x - rect.x, clip.y - rect.y), Some(clip));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> Raster {
        let pixels = (0..w * h)
            .map(|i| if i % 2 == 0 { Rgba::RED } else { Rgba::BLUE })
            .collect();
        Raster::from_pixels(w, h, pixels).unwrap()
    }

    #[test]
    fn at_rejects_out_of_bounds() {
        let r = Raster::filled(3, 2, Rgba::GREEN);
        assert_eq!(r.at((2, 1)).unwrap(), Rgba::GREEN);
        assert!(r.at((3, 0)).unwrap_err().is_out_of_range());
        assert!(r.at((0, -1)).unwrap_err().is_out_of_range());
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(Raster::from_pixels(2, 2, vec![Rgba::RED; 3]).unwrap_err().is_invalid_argument());
        assert!(Raster::from_rgba8(1, 1, &[0, 0, 0]).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn rgba8_round_trip() {
        let r = checker(3, 3);
        assert_eq!(Raster::from_rgba8(3, 3, &r.to_rgba8()).unwrap(), r);
    }

    #[test]
    fn blit_clips_and_reports_region() {
        let mut dst = Raster::filled(4, 4, Rgba::BLACK);
        let src = Raster::filled(3, 3, Rgba::WHITE);
        let touched = dst.blit(&src, (2, 2), None);
        assert_eq!(touched, Rect::new(2, 2, 2, 2));
        assert_eq!(dst.at((3, 3)).unwrap(), Rgba::WHITE);
        assert_eq!(dst.at((1, 1)).unwrap(), Rgba::BLACK);
    }

    #[test]
    fn blit_honours_area_and_surface_alpha() {
        let mut dst = Raster::filled(2, 1, Rgba::BLUE);
        let mut src = checker(2, 1);
        src.set_alpha(Some(0));
        dst.blit(&src, (0, 0), None);
        assert_eq!(dst.pixels(), &[Rgba::BLUE, Rgba::BLUE]);

        src.set_alpha(None);
        dst.blit(&src, (1, 0), Some(Rect::new(0, 0, 1, 1)));
        assert_eq!(dst.pixels(), &[Rgba::BLUE, Rgba::RED]);
    }

    #[test]
    fn portion_copies_and_pads() {
        let r = checker(4, 1);
        let p = r.portion(Rect::new(1, 0, 2, 1));
        assert_eq!(p.pixels(), &[Rgba::BLUE, Rgba::RED]);
        let padded = r.portion(Rect::new(-1, 0, 2, 1));
        assert_eq!(padded.pixels(), &[Rgba::TRANSPARENT, Rgba::RED]);
    }

    #[test]
    fn fill_rect_clips() {
        let mut r = Raster::new(3, 3);
        r.fill_rect(Rect::new(2, 2, 5, 5), Rgba::RED);
        assert_eq!(r.at((2, 2)).unwrap(), Rgba::RED);
        assert_eq!(r.at((1, 2)).unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn shared_view_aliases() {
        let shared = Raster::new(1, 1).into_shared();
        let alias = Rc::clone(&shared);
        shared.borrow_mut().fill(Rgba::RED);
        assert_eq!(alias.borrow().at((0, 0)).unwrap(), Rgba::RED);
    }
}
