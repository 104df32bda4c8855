#![forbid(unsafe_code)]

//! Shapes: a raster plus the rectangle it occupies.
//!
//! # Invariants
//!
//! 1. `rect.size() == raster.size()` after every public call.
//! 2. Moving never touches the raster.
//! 3. [`Shape::rotate`] always starts from the committed original, so
//!    repeated rotations do not accumulate growth or blur.
//! 4. `clone()` is deep: the copy shares no pixels with the source. Only
//!    [`Shape::surface_ref`] aliases the live raster.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Resize to a zero dimension | `Error::InvalidArgument`, shape unchanged |
//! | Pixel lookup outside the raster | `Error::OutOfRange` |

use std::cell::Ref;

use tessel_core::{Anchor, Bounded, Error, Point, Rect, Result, Size};
use tessel_render::scale::{self, ScaleConfig};
use tessel_render::{Drawable, Raster, Rgba, SharedRaster, transform};

use crate::entity::Entity;

/// A positioned raster.
#[derive(Debug)]
pub struct Shape {
    rect: Rect,
    raster: SharedRaster,
    original: Raster,
    scale: ScaleConfig,
}

impl Default for Shape {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Shape {
    fn clone(&self) -> Self {
        Self {
            rect: self.rect,
            raster: self.surface().into_shared(),
            original: self.original.clone(),
            scale: self.scale,
        }
    }
}

impl Shape {
    /// Zero-sized shape at the origin.
    pub fn new() -> Self {
        Self::from_raster(Raster::new(0, 0))
    }

    /// Shape owning `raster`, placed at the origin.
    pub fn from_raster(raster: Raster) -> Self {
        Self {
            rect: raster.rect(),
            original: raster.clone(),
            raster: raster.into_shared(),
            scale: ScaleConfig::default(),
        }
    }

    /// Opaque black shape covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let mut shape = Self::from_raster(Raster::filled(rect.width, rect.height, Rgba::BLACK));
        shape.rect = rect;
        shape
    }

    /// Use `config` for every later resize.
    #[must_use]
    pub fn with_scale_config(mut self, config: ScaleConfig) -> Self {
        self.scale = config;
        self
    }

    pub fn scale_config(&self) -> &ScaleConfig {
        &self.scale
    }

    // --- Geometry -----------------------------------------------------

    /// Copy of the rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.rect.size()
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) -> Rect {
        self.rect.move_by(dx, dy)
    }

    pub fn move_at(&mut self, point: impl Into<Point>, anchor: Anchor) -> Rect {
        self.rect.move_at(point, anchor)
    }

    /// Move fully inside `bound`; centred on any axis where it is too large.
    pub fn clamp(&mut self, bound: &Rect) -> Rect {
        self.rect.clamp(bound)
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.rect.contains(other)
    }

    pub fn collide(&self, other: &Rect) -> bool {
        self.rect.collide(other)
    }

    pub fn collide_point(&self, point: impl Into<Point>) -> bool {
        self.rect.collide_point(point)
    }

    // --- Raster -------------------------------------------------------

    /// Surface alpha, `None` when disabled.
    pub fn alpha(&self) -> Option<u8> {
        self.raster.borrow().alpha()
    }

    pub fn set_alpha(&mut self, alpha: Option<u8>) {
        self.raster.borrow_mut().set_alpha(alpha);
    }

    /// Colour of the pixel at `point`, in raster coordinates.
    pub fn at(&self, point: impl Into<Point>) -> Result<Rgba> {
        self.raster.borrow().at(point)
    }

    /// Borrow the live raster.
    pub fn raster(&self) -> Ref<'_, Raster> {
        self.raster.borrow()
    }

    /// Independent copy of the raster, including its alpha.
    pub fn surface(&self) -> Raster {
        self.raster.borrow().clone()
    }

    /// Aliasing handle to the live raster. Writes through it show up in this
    /// shape; resizing through it breaks the size invariant.
    pub fn surface_ref(&self) -> SharedRaster {
        SharedRaster::clone(&self.raster)
    }

    /// Replace the raster, resizing the rectangle to match, and commit it as
    /// the new original.
    pub fn set_surface(&mut self, raster: Raster) {
        self.rect.width = raster.width();
        self.rect.height = raster.height();
        self.original = raster.clone();
        *self.raster.borrow_mut() = raster;
    }

    /// Commit the current raster as the original used by rotation and
    /// reload-on-resize. Call after drawing onto the shape.
    pub fn commit_original(&mut self) {
        self.original = self.surface();
    }

    /// The committed original raster.
    pub fn original(&self) -> &Raster {
        &self.original
    }

    /// Rescale to `width x height`, keeping the top-left corner.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        let scaled = scale::scale(&self.raster.borrow(), width, height, &self.scale);
        self.install(scaled);
        Ok(())
    }

    /// Rescale from `source` instead of the current pixels, keeping the
    /// surface alpha.
    pub(crate) fn resize_from(&mut self, source: &Raster, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        let mut scaled = scale::scale(source, width, height, &self.scale);
        scaled.set_alpha(self.alpha());
        self.install(scaled);
        Ok(())
    }

    /// Rescale from the committed original, keeping the surface alpha.
    pub(crate) fn resize_from_original(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        let mut scaled = scale::scale(&self.original, width, height, &self.scale);
        scaled.set_alpha(self.alpha());
        self.install(scaled);
        Ok(())
    }

    fn install(&mut self, raster: Raster) {
        self.rect.width = raster.width();
        self.rect.height = raster.height();
        *self.raster.borrow_mut() = raster;
    }

    /// Move and resize to the largest same-aspect rectangle inside `target`.
    pub fn fit(&mut self, target: &Rect) -> Result<Rect> {
        let fitted = self.rect.fitted(target);
        self.resize(fitted.width, fitted.height)?;
        self.rect = fitted;
        Ok(self.rect)
    }

    /// Rotate the original raster by `degrees` (counter-clockwise), keeping
    /// `anchor` where it was. Unsaved drawing on the shape is discarded.
    /// A non-finite angle leaves the shape untouched.
    pub fn rotate(&mut self, degrees: f64, anchor: Anchor) -> Rect {
        if !degrees.is_finite() {
            return self.rect;
        }
        let fixed = self.rect.anchor(anchor);
        let alpha = self.alpha();
        let mut rotated = transform::rotate(&self.original, degrees);
        rotated.set_alpha(alpha);
        self.install(rotated);
        self.rect.move_at(fixed, anchor)
    }
}

pub(crate) fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::invalid(format!(
            "shape size must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

impl Bounded for Shape {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Drawable for Shape {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        f(&self.raster.borrow())
    }
}

impl Entity for Shape {
    fn place(&mut self, topleft: Point) -> Result<()> {
        self.rect.move_at(topleft, Anchor::TopLeft);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        Shape::resize(self, width, height)
    }
}
