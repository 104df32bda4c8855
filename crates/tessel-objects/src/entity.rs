#![forbid(unsafe_code)]

//! The spatial entity seam used by cells and grids.

use tessel_core::{Anchor, Point, Rect, Result};
use tessel_render::{Board, Drawable};

/// A drawable object occupying a rectangle that can be placed and resized.
///
/// Implementations keep their raster and rectangle sizes equal.
pub trait Entity: Drawable {
    /// Move so the top-left corner lands on `topleft`.
    fn place(&mut self, topleft: Point) -> Result<()>;

    /// Resize to `width x height`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when either dimension is zero.
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Move so `anchor` lands on `point`. Returns the new bounds.
    fn place_at(&mut self, point: Point, anchor: Anchor) -> Result<Rect> {
        let target = self.bounds().moved_at(point, anchor);
        self.place(target.topleft())?;
        Ok(self.bounds())
    }

    /// Resize to the largest same-aspect rectangle inside `target` and move
    /// there. Returns the new bounds.
    fn fit_into(&mut self, target: &Rect) -> Result<Rect> {
        let fitted = self.bounds().fitted(target);
        self.resize(fitted.width, fitted.height)?;
        self.place(fitted.topleft())?;
        Ok(self.bounds())
    }

    /// Draw onto `board` at the current bounds, including anything the
    /// entity carries. Returns the touched region.
    fn paint(&self, board: &mut Board) -> Result<Rect>
    where
        Self: Sized,
    {
        board.draw(self, None, None)
    }
}
