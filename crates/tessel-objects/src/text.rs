#![forbid(unsafe_code)]

//! Text objects rendered through a [`TextRenderer`].
//!
//! Resizing a [`TextImage`] re-renders the text at a font size scaled by
//! the larger of the two requested ratios, then rescales the result to the
//! exact requested size, so glyphs stay sharp instead of being stretched
//! from a small bitmap.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use tessel_core::{Anchor, AttrValue, Bounded, Point, Rect, RectAttr, Result};
use tessel_render::{Drawable, FontSpec, Raster, Rgba, TextRenderer};

use crate::entity::Entity;
use crate::game_object::GameObject;
use crate::shape::check_size;

/// A game object displaying a line of text.
pub struct TextImage {
    object: GameObject,
    text: String,
    font: FontSpec,
    fg: Rgba,
    bg: Option<Rgba>,
    renderer: Rc<dyn TextRenderer>,
}

impl fmt::Debug for TextImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextImage")
            .field("text", &self.text)
            .field("font", &self.font)
            .field("fg", &self.fg)
            .field("bg", &self.bg)
            .field("rect", &self.object.rect())
            .finish_non_exhaustive()
    }
}

impl TextImage {
    /// Render `text` in `fg` over `bg` (transparent when `None`).
    ///
    /// # Errors
    ///
    /// Whatever the renderer returns.
    pub fn new(
        text: impl Into<String>,
        font: FontSpec,
        fg: Rgba,
        bg: Option<Rgba>,
        renderer: Rc<dyn TextRenderer>,
    ) -> Result<Self> {
        let text = text.into();
        let raster = renderer.render(&text, &font, fg, bg)?;
        Ok(Self {
            object: GameObject::from_raster(raster),
            text,
            font,
            fg,
            bg,
            renderer,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn fg(&self) -> Rgba {
        self.fg
    }

    pub fn bg(&self) -> Option<Rgba> {
        self.bg
    }

    /// Size `s` would take in the current font.
    pub fn size_of(&self, s: &str) -> Result<tessel_core::Size> {
        self.renderer.measure(s, &self.font)
    }

    /// Replace the text and re-render at the current font size. The
    /// top-left corner stays put.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.text = text.into();
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<()> {
        let raster = self.renderer.render(&self.text, &self.font, self.fg, self.bg)?;
        self.object.set_surface(raster);
        Ok(())
    }

    /// Re-render for a `width x height` box keeping `anchor` fixed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero dimension, or whatever the renderer
    /// reports. The text is unchanged on error.
    pub fn resize(&mut self, width: u32, height: u32, anchor: Anchor) -> Result<Rect> {
        check_size(width, height)?;
        let fixed = self.object.rect().anchor(anchor);
        let measured = self.renderer.measure(&self.text, &self.font)?;
        let size = self.font.size as u64;
        let by_h = (measured.height > 0).then(|| size * height as u64 / measured.height as u64);
        let by_w = (measured.width > 0).then(|| size * width as u64 / measured.width as u64);
        if let Some(scaled) = by_h.max(by_w) {
            let mut font = self.font.clone();
            font.size = scaled.clamp(1, u32::MAX as u64) as u32;
            let raster = self.renderer.render(&self.text, &font, self.fg, self.bg)?;
            self.font = font;
            self.object.set_surface(raster);
        }
        self.object.resize(width, height)?;
        Ok(self.object.move_at(fixed, anchor))
    }

    pub fn into_inner(self) -> GameObject {
        self.object
    }
}

impl Deref for TextImage {
    type Target = GameObject;

    fn deref(&self) -> &GameObject {
        &self.object
    }
}

impl DerefMut for TextImage {
    fn deref_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }
}

impl Bounded for TextImage {
    fn bounds(&self) -> Rect {
        self.object.rect()
    }
}

impl Drawable for TextImage {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        self.object.with_raster(f)
    }
}

impl Entity for TextImage {
    fn place(&mut self, topleft: Point) -> Result<()> {
        self.object.move_at(topleft, Anchor::TopLeft);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        TextImage::resize(self, width, height, Anchor::TopLeft).map(|_| ())
    }
}

/// A text object that remembers a start position.
#[derive(Debug)]
pub struct MovingText {
    inner: TextImage,
    start_attr: RectAttr,
    start_position: AttrValue,
}

impl MovingText {
    /// Wrap `inner`, taking its current centre as the start position.
    pub fn new(inner: TextImage) -> Self {
        let start_attr = RectAttr::Anchor(Anchor::Center);
        let start_position = inner.rect().get(start_attr);
        Self {
            inner,
            start_attr,
            start_position,
        }
    }

    pub fn start(&self) -> (RectAttr, AttrValue) {
        (self.start_attr, self.start_position)
    }

    /// Move back to the start position.
    pub fn goto_start(&mut self) -> Result<Rect> {
        let mut r = self.inner.rect();
        r.set(self.start_attr, self.start_position)?;
        Ok(self.inner.move_at(r.topleft(), Anchor::TopLeft))
    }

    /// Take the current value of `attr` as the new start position.
    pub fn update_start_position(&mut self, attr: RectAttr) {
        self.start_attr = attr;
        self.start_position = self.inner.rect().get(attr);
    }

    pub fn into_inner(self) -> TextImage {
        self.inner
    }
}

impl Deref for MovingText {
    type Target = TextImage;

    fn deref(&self) -> &TextImage {
        &self.inner
    }
}

impl DerefMut for MovingText {
    fn deref_mut(&mut self) -> &mut TextImage {
        &mut self.inner
    }
}

impl Bounded for MovingText {
    fn bounds(&self) -> Rect {
        self.inner.bounds()
    }
}

impl Drawable for MovingText {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        self.inner.with_raster(f)
    }
}

impl Entity for MovingText {
    fn place(&mut self, topleft: Point) -> Result<()> {
        Entity::place(&mut self.inner, topleft)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        Entity::resize(&mut self.inner, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::Size;
    use tessel_render::BlockTextRenderer;

    fn text(s: &str, size: u32) -> TextImage {
        TextImage::new(s, FontSpec::new("mono", size), Rgba::WHITE, None, Rc::new(BlockTextRenderer)).unwrap()
    }

    #[test]
    fn renders_at_measured_size() {
        let t = text("abc", 10);
        assert_eq!(t.size(), Size::new(18, 10));
        assert_eq!(t.size_of("ab").unwrap(), Size::new(12, 10));
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let err = TextImage::new("x", FontSpec::new("mono", 0), Rgba::WHITE, None, Rc::new(BlockTextRenderer))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn resize_rescales_font_and_hits_exact_size() {
        let mut t = text("ab", 10);
        t.move_at((100, 100), Anchor::Center);
        let r = t.resize(40, 20, Anchor::Center).unwrap();
        // 10 * 20 / 10 = 20 by height, 10 * 40 / 12 = 33 by width.
        assert_eq!(t.font().size, 33);
        assert_eq!(r.size(), Size::new(40, 20));
        assert_eq!(r.center(), Point::new(100, 100));
        assert_eq!(t.raster().size(), Size::new(40, 20));
    }

    #[test]
    fn zero_size_resize_keeps_font_and_rect() {
        let mut t = text("ab", 10);
        for (w, h) in [(0, 40), (40, 0)] {
            assert!(t.resize(w, h, Anchor::TopLeft).unwrap_err().is_invalid_argument());
            assert_eq!(t.font().size, 10);
            assert_eq!(t.rect(), Rect::new(0, 0, 12, 10));
            assert_eq!(t.raster().size(), Size::new(12, 10));
        }
    }

    #[test]
    fn set_text_keeps_topleft() {
        let mut t = text("a", 5);
        t.move_at((7, 9), Anchor::TopLeft);
        t.set_text("abcd").unwrap();
        assert_eq!(t.rect(), Rect::new(7, 9, 12, 5));
        assert_eq!(t.text(), "abcd");
    }

    #[test]
    fn moving_text_returns_to_start() {
        let mut m = MovingText::new(text("go", 10));
        let start = m.rect();
        m.move_by(30, -4);
        assert_eq!(m.goto_start().unwrap(), start);
        m.move_at((50, 50), Anchor::TopLeft);
        m.update_start_position(RectAttr::Anchor(Anchor::BottomRight));
        m.move_by(-3, 3);
        let back = m.goto_start().unwrap();
        assert_eq!(back.anchor(Anchor::BottomRight), Point::new(62, 60));
    }
}
