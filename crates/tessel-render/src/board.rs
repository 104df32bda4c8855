#![forbid(unsafe_code)]

//! Drawing boards.
//!
//! A [`Board`] is a destination canvas. Objects are composited onto it with
//! [`Board::draw`]; after each mutation the board optionally forwards the
//! touched region to an attached [`Presenter`].
//!
//! # Invariants
//!
//! 1. Without [`BoardFlags::SRC_ALPHA`] every board pixel is opaque.
//! 2. Changing flags or size keeps the existing content (rescaled on resize).
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Presenter fails | Error returned as-is after the board is mutated |
//! | Draw outside the board | Clipped, empty rect returned |

use tessel_core::{Bounded, Point, Rect, Result, Size};

use crate::collab::Presenter;
use crate::color::Rgba;
use crate::raster::Raster;
use crate::scale::{self, ScaleConfig};

bitflags::bitflags! {
    /// Board surface flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BoardFlags: u8 {
        /// Keep per-pixel alpha instead of forcing opaque pixels.
        const SRC_ALPHA = 0b0000_0001;
    }
}

/// Anything that can be drawn onto a board.
pub trait Drawable: Bounded {
    /// Call `f` with the pixels to draw.
    fn with_raster(&self, f: &mut dyn FnMut(&Raster));
}

impl Bounded for Raster {
    fn bounds(&self) -> Rect {
        self.rect()
    }
}

impl Drawable for Raster {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        f(self)
    }
}

/// Where to draw: a top-left point or a full rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    At(Point),
    Rect(Rect),
}

impl From<Point> for Dest {
    fn from(p: Point) -> Self {
        Dest::At(p)
    }
}

impl From<(i32, i32)> for Dest {
    fn from(p: (i32, i32)) -> Self {
        Dest::At(p.into())
    }
}

impl From<Rect> for Dest {
    fn from(r: Rect) -> Self {
        Dest::Rect(r)
    }
}

/// A drawing destination.
pub struct Board {
    raster: Raster,
    flags: BoardFlags,
    auto_update: bool,
    scale: ScaleConfig,
    presenter: Option<Box<dyn Presenter>>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.raster.size())
            .field("flags", &self.flags)
            .field("auto_update", &self.auto_update)
            .field("presenter", &self.presenter.is_some())
            .finish()
    }
}

impl Board {
    /// Board of the given size: transparent with `SRC_ALPHA`, black otherwise.
    pub fn new(width: u32, height: u32, flags: BoardFlags) -> Self {
        let background = if flags.contains(BoardFlags::SRC_ALPHA) {
            Rgba::TRANSPARENT
        } else {
            Rgba::BLACK
        };
        Self {
            raster: Raster::filled(width, height, background),
            flags,
            auto_update: true,
            scale: ScaleConfig::default(),
            presenter: None,
        }
    }

    /// Attach a presenter, called after every mutation when auto-update is on.
    #[must_use]
    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Turn automatic presentation on or off.
    #[must_use]
    pub fn with_auto_update(mut self, on: bool) -> Self {
        self.auto_update = on;
        self
    }

    pub fn set_presenter(&mut self, presenter: Option<Box<dyn Presenter>>) {
        self.presenter = presenter;
    }

    pub fn presenter_mut(&mut self) -> Option<&mut (dyn Presenter + 'static)> {
        self.presenter.as_deref_mut()
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.raster.size()
    }

    #[inline]
    pub fn flags(&self) -> BoardFlags {
        self.flags
    }

    /// The board pixels.
    #[inline]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Mutable board pixels. No presentation is triggered.
    #[inline]
    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    /// Copy of the board pixels.
    pub fn surface(&self) -> Raster {
        self.raster.clone()
    }

    /// Draw `obj` at `dest` (its own bounds when `None`).
    ///
    /// `area` selects part of the object's raster. Returns the touched region.
    pub fn draw(&mut self, obj: &dyn Drawable, dest: Option<Dest>, area: Option<Rect>) -> Result<Rect> {
        let bounds = obj.bounds();
        let at = match dest {
            None => bounds.topleft(),
            Some(Dest::At(p)) => p,
            Some(Dest::Rect(r)) => r.topleft(),
        };
        let mut touched = Rect::new(at.x, at.y, 0, 0);
        let opaque = !self.flags.contains(BoardFlags::SRC_ALPHA);
        let raster = &mut self.raster;
        obj.with_raster(&mut |src: &Raster| {
            touched = raster.blit(src, at, area);
            if opaque {
                raster.make_opaque(touched);
            }
        });
        self.present(Some(touched))?;
        Ok(touched)
    }

    /// Draw a raster with its top-left at `at`.
    pub fn blit(&mut self, src: &Raster, at: impl Into<Point>, area: Option<Rect>) -> Result<Rect> {
        self.draw(src, Some(Dest::At(at.into())), area)
    }

    /// Fill the whole board.
    pub fn fill(&mut self, color: Rgba) -> Result<()> {
        let color = if self.flags.contains(BoardFlags::SRC_ALPHA) {
            color
        } else {
            color.with_alpha(255)
        };
        self.raster.fill(color);
        self.present(None)
    }

    /// Replace the flags, keeping the content.
    pub fn set_flags(&mut self, flags: BoardFlags) -> Result<()> {
        self.flags = flags;
        if !flags.contains(BoardFlags::SRC_ALPHA) {
            let all = self.raster.rect();
            self.raster.make_opaque(all);
        }
        self.present(None)
    }

    /// Resize the board, rescaling its content.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let mut resized = scale::scale(&self.raster, width, height, &self.scale);
        if !self.flags.contains(BoardFlags::SRC_ALPHA) {
            let all = resized.rect();
            resized.make_opaque(all);
        }
        self.raster = resized;
        self.present(None)
    }

    /// Forward `area` (the whole board when `None`) to the presenter.
    pub fn update(&mut self, area: Option<Rect>) -> Result<()> {
        match self.presenter.as_mut() {
            Some(p) => p.present(&self.raster, area),
            None => Ok(()),
        }
    }

    fn present(&mut self, area: Option<Rect>) -> Result<()> {
        if self.auto_update {
            self.update(area)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::HeadlessPresenter;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Presenter sharing its log with the test.
    struct Shared(Rc<RefCell<HeadlessPresenter>>);

    impl Presenter for Shared {
        fn present(&mut self, raster: &Raster, area: Option<Rect>) -> Result<()> {
            self.0.borrow_mut().present(raster, area)
        }
    }

    #[test]
    fn opaque_board_forces_alpha() {
        let mut board = Board::new(4, 4, BoardFlags::empty());
        assert_eq!(board.raster().at((0, 0)).unwrap(), Rgba::BLACK);
        board.blit(&Raster::filled(2, 2, Rgba::rgba(255, 0, 0, 128)), (1, 1), None).unwrap();
        assert_eq!(board.raster().at((1, 1)).unwrap().a(), 255);
        board.fill(Rgba::rgba(1, 2, 3, 0)).unwrap();
        assert_eq!(board.raster().at((3, 3)).unwrap(), Rgba::rgba(1, 2, 3, 255));
    }

    #[test]
    fn src_alpha_board_keeps_alpha() {
        let mut board = Board::new(2, 2, BoardFlags::SRC_ALPHA);
        assert_eq!(board.raster().at((0, 0)).unwrap(), Rgba::TRANSPARENT);
        board.fill(Rgba::rgba(1, 2, 3, 7)).unwrap();
        assert_eq!(board.raster().at((0, 0)).unwrap().a(), 7);
        board.set_flags(BoardFlags::empty()).unwrap();
        assert_eq!(board.raster().at((0, 0)).unwrap().a(), 255);
    }

    #[test]
    fn draw_presents_touched_region() {
        let log = Rc::new(RefCell::new(HeadlessPresenter::new()));
        let mut board = Board::new(10, 10, BoardFlags::SRC_ALPHA)
            .with_presenter(Box::new(Shared(Rc::clone(&log))));
        let touched = board
            .draw(&Raster::filled(4, 4, Rgba::RED), Some(Dest::At(Point::new(8, 8))), None)
            .unwrap();
        assert_eq!(touched, Rect::new(8, 8, 2, 2));
        board.fill(Rgba::WHITE).unwrap();
        assert_eq!(log.borrow().updates(), &[Some(Rect::new(8, 8, 2, 2)), None]);
    }

    #[test]
    fn auto_update_off_skips_presenter() {
        let log = Rc::new(RefCell::new(HeadlessPresenter::new()));
        let mut board = Board::new(3, 3, BoardFlags::empty())
            .with_presenter(Box::new(Shared(Rc::clone(&log))))
            .with_auto_update(false);
        board.fill(Rgba::RED).unwrap();
        assert!(log.borrow().updates().is_empty());
        board.update(None).unwrap();
        assert_eq!(log.borrow().updates().len(), 1);
    }

    #[test]
    fn resize_rescales_content() {
        let mut board = Board::new(2, 2, BoardFlags::empty());
        board.fill(Rgba::GREEN).unwrap();
        board.resize(6, 4).unwrap();
        assert_eq!(board.size(), Size::new(6, 4));
        assert_eq!(board.raster().at((5, 3)).unwrap(), Rgba::GREEN);
    }
}
