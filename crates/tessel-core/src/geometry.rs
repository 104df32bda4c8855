#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! [`Rect`] is an axis-aligned box in screen coordinates (origin at the
//! top-left, y grows downward). Its named reference points are modelled by
//! [`Anchor`]; every readable/writable attribute (edges, centres, size and
//! the anchors) by [`RectAttr`], whose values are [`AttrValue`]s.
//!
//! # Invariants
//!
//! 1. `width` and `height` are unsigned, so never negative.
//! 2. `right() == x + width` and `bottom() == y + height` (both exclusive).
//! 3. For every anchor `a` and point `p`: `r.moved_at(p, a).anchor(a) == p`.
//! 4. Moving never changes the size.
//!
//! # Conventions
//!
//! - Centres use floor division: `center_x = x + width / 2`.
//! - Pure operations return a new `Rect`; their in-place twins mutate `self`
//!   and return the updated value for chaining (`moved` / `move_by`,
//!   `clamped` / `clamp`, `fitted` / `fit`, `moved_at` / `move_at`).
//! - Arithmetic saturates at the `i32` limits instead of wrapping.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `width * height`.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// One of the two rectangle dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    Width,
    Height,
}

/// A named reference point on a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    MidTop,
    MidBottom,
    MidLeft,
    MidRight,
    #[default]
    Center,
}

impl Anchor {
    /// Every anchor, in declaration order.
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::MidTop,
        Anchor::MidBottom,
        Anchor::MidLeft,
        Anchor::MidRight,
        Anchor::Center,
    ];

    /// Horizontal placement: 0 = left edge, 1 = centre, 2 = right edge.
    const fn column(self) -> u8 {
        match self {
            Anchor::TopLeft | Anchor::BottomLeft | Anchor::MidLeft => 0,
            Anchor::MidTop | Anchor::MidBottom | Anchor::Center => 1,
            Anchor::TopRight | Anchor::BottomRight | Anchor::MidRight => 2,
        }
    }

    /// Vertical placement: 0 = top edge, 1 = centre, 2 = bottom edge.
    const fn row(self) -> u8 {
        match self {
            Anchor::TopLeft | Anchor::TopRight | Anchor::MidTop => 0,
            Anchor::MidLeft | Anchor::MidRight | Anchor::Center => 1,
            Anchor::BottomLeft | Anchor::BottomRight | Anchor::MidBottom => 2,
        }
    }

    /// Attribute name, as accepted by [`RectAttr::from_str`].
    pub const fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "topleft",
            Anchor::TopRight => "topright",
            Anchor::BottomLeft => "bottomleft",
            Anchor::BottomRight => "bottomright",
            Anchor::MidTop => "midtop",
            Anchor::MidBottom => "midbottom",
            Anchor::MidLeft => "midleft",
            Anchor::MidRight => "midright",
            Anchor::Center => "center",
        }
    }
}

/// The value of a rectangle attribute.
///
/// Values of the same kind order numerically, pairs lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrValue {
    /// A single coordinate or length.
    Scalar(i32),
    /// A point or a size.
    Pair(i32, i32),
}

impl AttrValue {
    /// The scalar payload, or `InvalidArgument` for a pair.
    pub fn scalar(self) -> Result<i32> {
        match self {
            AttrValue::Scalar(v) => Ok(v),
            AttrValue::Pair(a, b) => Err(Error::invalid(format!(
                "expected a single value, got pair ({a}, {b})"
            ))),
        }
    }

    /// The pair payload, or `InvalidArgument` for a scalar.
    pub fn pair(self) -> Result<(i32, i32)> {
        match self {
            AttrValue::Pair(a, b) => Ok((a, b)),
            AttrValue::Scalar(v) => Err(Error::invalid(format!("expected a pair, got {v}"))),
        }
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Scalar(v)
    }
}

impl From<(i32, i32)> for AttrValue {
    fn from((a, b): (i32, i32)) -> Self {
        AttrValue::Pair(a, b)
    }
}

impl From<Point> for AttrValue {
    fn from(p: Point) -> Self {
        AttrValue::Pair(p.x, p.y)
    }
}

/// Every named, readable and writable rectangle attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RectAttr {
    X,
    Y,
    Left,
    Top,
    Right,
    Bottom,
    CenterX,
    CenterY,
    Width,
    Height,
    Size,
    /// A reference point; its value is a pair.
    Anchor(Anchor),
}

impl RectAttr {
    /// Attribute name, as accepted by [`RectAttr::from_str`].
    pub const fn name(self) -> &'static str {
        match self {
            RectAttr::X => "x",
            RectAttr::Y => "y",
            RectAttr::Left => "left",
            RectAttr::Top => "top",
            RectAttr::Right => "right",
            RectAttr::Bottom => "bottom",
            RectAttr::CenterX => "centerx",
            RectAttr::CenterY => "centery",
            RectAttr::Width => "width",
            RectAttr::Height => "height",
            RectAttr::Size => "size",
            RectAttr::Anchor(a) => a.name(),
        }
    }

    /// True if the attribute holds a pair rather than a scalar.
    pub const fn is_pair(self) -> bool {
        matches!(self, RectAttr::Size | RectAttr::Anchor(_))
    }
}

impl From<Anchor> for RectAttr {
    fn from(a: Anchor) -> Self {
        RectAttr::Anchor(a)
    }
}

impl FromStr for RectAttr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let attr = match s {
            "x" => RectAttr::X,
            "y" => RectAttr::Y,
            "left" => RectAttr::Left,
            "top" => RectAttr::Top,
            "right" => RectAttr::Right,
            "bottom" => RectAttr::Bottom,
            "centerx" => RectAttr::CenterX,
            "centery" => RectAttr::CenterY,
            "w" | "width" => RectAttr::Width,
            "h" | "height" => RectAttr::Height,
            "size" => RectAttr::Size,
            other => {
                return Anchor::ALL
                    .into_iter()
                    .find(|a| a.name() == other)
                    .map(RectAttr::Anchor)
                    .ok_or_else(|| Error::invalid(format!("unknown rect attribute {other:?}")));
            }
        };
        Ok(attr)
    }
}

impl fmt::Display for RectAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn len_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[inline]
fn clamp_i64(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn non_negative(v: i32, what: &str) -> Result<u32> {
    u32::try_from(v).map_err(|_| Error::invalid(format!("{what} must be >= 0, got {v}")))
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Rectangle with its top-left corner at `origin`.
    #[inline]
    pub fn at(origin: impl Into<Point>, size: impl Into<Size>) -> Self {
        let (p, s) = (origin.into(), size.into());
        Self::new(p.x, p.y, s.width, s.height)
    }

    // --- Edges and derived points -------------------------------------

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(len_i32(self.width))
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(len_i32(self.height))
    }

    #[inline]
    pub fn center_x(&self) -> i32 {
        self.x.saturating_add(len_i32(self.width / 2))
    }

    #[inline]
    pub fn center_y(&self) -> i32 {
        self.y.saturating_add(len_i32(self.height / 2))
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub const fn topleft(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coordinates of a named reference point.
    pub fn anchor(&self, anchor: Anchor) -> Point {
        let x = match anchor.column() {
            0 => self.x,
            1 => self.center_x(),
            _ => self.right(),
        };
        let y = match anchor.row() {
            0 => self.y,
            1 => self.center_y(),
            _ => self.bottom(),
        };
        Point::new(x, y)
    }

    // --- Attribute table ----------------------------------------------

    /// Read a named attribute.
    pub fn get(&self, attr: RectAttr) -> AttrValue {
        match attr {
            RectAttr::X | RectAttr::Left => AttrValue::Scalar(self.x),
            RectAttr::Y | RectAttr::Top => AttrValue::Scalar(self.y),
            RectAttr::Right => AttrValue::Scalar(self.right()),
            RectAttr::Bottom => AttrValue::Scalar(self.bottom()),
            RectAttr::CenterX => AttrValue::Scalar(self.center_x()),
            RectAttr::CenterY => AttrValue::Scalar(self.center_y()),
            RectAttr::Width => AttrValue::Scalar(len_i32(self.width)),
            RectAttr::Height => AttrValue::Scalar(len_i32(self.height)),
            RectAttr::Size => AttrValue::Pair(len_i32(self.width), len_i32(self.height)),
            RectAttr::Anchor(a) => self.anchor(a).into(),
        }
    }

    /// Write a named attribute.
    ///
    /// Position attributes move the rectangle; `Width`, `Height` and `Size`
    /// resize it keeping the top-left corner.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the value kind does not match the attribute
    /// (a pair for a scalar attribute or vice versa), or if a size is negative.
    /// The rectangle is left untouched on error.
    pub fn set(&mut self, attr: RectAttr, value: AttrValue) -> Result<()> {
        match attr {
            RectAttr::X | RectAttr::Left => self.x = value.scalar()?,
            RectAttr::Y | RectAttr::Top => self.y = value.scalar()?,
            RectAttr::Right => {
                self.x = clamp_i64(value.scalar()? as i64 - self.width as i64);
            }
            RectAttr::Bottom => {
                self.y = clamp_i64(value.scalar()? as i64 - self.height as i64);
            }
            RectAttr::CenterX => {
                self.x = clamp_i64(value.scalar()? as i64 - (self.width / 2) as i64);
            }
            RectAttr::CenterY => {
                self.y = clamp_i64(value.scalar()? as i64 - (self.height / 2) as i64);
            }
            RectAttr::Width => self.width = non_negative(value.scalar()?, "width")?,
            RectAttr::Height => self.height = non_negative(value.scalar()?, "height")?,
            RectAttr::Size => {
                let (w, h) = value.pair()?;
                let (w, h) = (non_negative(w, "width")?, non_negative(h, "height")?);
                self.width = w;
                self.height = h;
            }
            RectAttr::Anchor(a) => {
                let (x, y) = value.pair()?;
                self.move_at(Point::new(x, y), a);
            }
        }
        Ok(())
    }

    // --- Movement -----------------------------------------------------

    /// Copy moved by an offset.
    #[must_use]
    pub fn moved(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    /// Move by an offset in place.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> Rect {
        *self = self.moved(dx, dy);
        *self
    }

    /// Copy positioned so that `anchor` lands on `point`.
    #[must_use]
    pub fn moved_at(&self, point: impl Into<Point>, anchor: Anchor) -> Rect {
        let p = point.into();
        let (w, h) = (self.width as i64, self.height as i64);
        let x = match anchor.column() {
            0 => p.x as i64,
            1 => p.x as i64 - w / 2,
            _ => p.x as i64 - w,
        };
        let y = match anchor.row() {
            0 => p.y as i64,
            1 => p.y as i64 - h / 2,
            _ => p.y as i64 - h,
        };
        Rect {
            x: clamp_i64(x),
            y: clamp_i64(y),
            ..*self
        }
    }

    /// Position in place so that `anchor` lands on `point`.
    pub fn move_at(&mut self, point: impl Into<Point>, anchor: Anchor) -> Rect {
        *self = self.moved_at(point, anchor);
        *self
    }

    /// Copy translated the minimum distance needed to lie inside `bound`.
    ///
    /// On an axis where this rectangle is not smaller than `bound`, it is
    /// centred on that axis instead; the size never changes.
    #[must_use]
    pub fn clamped(&self, bound: &Rect) -> Rect {
        fn axis(pos: i32, len: u32, bpos: i32, blen: u32) -> i32 {
            let (pos, len, bpos, blen) = (pos as i64, len as i64, bpos as i64, blen as i64);
            let out = if len >= blen {
                bpos + blen / 2 - len / 2
            } else if pos < bpos {
                bpos
            } else if pos + len > bpos + blen {
                bpos + blen - len
            } else {
                pos
            };
            clamp_i64(out)
        }
        Rect {
            x: axis(self.x, self.width, bound.x, bound.width),
            y: axis(self.y, self.height, bound.y, bound.height),
            ..*self
        }
    }

    /// Clamp into `bound` in place. See [`Rect::clamped`].
    pub fn clamp(&mut self, bound: &Rect) -> Rect {
        *self = self.clamped(bound);
        *self
    }

    // --- Predicates ---------------------------------------------------

    /// True if `other` lies completely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True if the interiors overlap. Touching edges do not collide and an
    /// empty rectangle collides with nothing.
    pub fn collide(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if the point is inside. Points on the right or bottom edge are not.
    pub fn collide_point(&self, point: impl Into<Point>) -> bool {
        let p = point.into();
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Indices of every rectangle in `others` colliding with this one.
    pub fn collide_list_all(&self, others: &[Rect]) -> Vec<usize> {
        others
            .iter()
            .enumerate()
            .filter(|(_, r)| self.collide(r))
            .map(|(i, _)| i)
            .collect()
    }

    // --- Combination and scaling --------------------------------------

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right as i64 - x as i64) as u32, (bottom as i64 - y as i64) as u32)
    }

    /// Overlapping part, or `None` when the interiors do not overlap.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (x < right && y < bottom).then(|| {
            Rect::new(x, y, (right as i64 - x as i64) as u32, (bottom as i64 - y as i64) as u32)
        })
    }

    /// Copy grown (or shrunk, for negative deltas) around its centre.
    #[must_use]
    pub fn inflated(&self, dw: i32, dh: i32) -> Rect {
        let w = (self.width as i64 + dw as i64).max(0);
        let h = (self.height as i64 + dh as i64).max(0);
        let grown = Rect::new(self.x, self.y, w as u32, h as u32);
        grown.moved_at(self.center(), Anchor::Center)
    }

    /// Largest rectangle with this aspect ratio that fits inside `target`,
    /// centred in it.
    ///
    /// Exact integer arithmetic: the limiting axis takes the target's length
    /// and the other axis is floored. A zero-area rectangle, or a zero-area
    /// target, yields a zero-size rectangle at the target's centre.
    #[must_use]
    pub fn fitted(&self, target: &Rect) -> Rect {
        if self.is_empty() || target.is_empty() {
            return Rect::new(target.center_x(), target.center_y(), 0, 0);
        }
        let (sw, sh) = (self.width as u64, self.height as u64);
        let (tw, th) = (target.width as u64, target.height as u64);
        let (w, h) = if sw * th >= sh * tw {
            (tw, sh * tw / sw)
        } else {
            (sw * th / sh, th)
        };
        let x = target.x as i64 + ((tw - w) / 2) as i64;
        let y = target.y as i64 + ((th - h) / 2) as i64;
        Rect::new(clamp_i64(x), clamp_i64(y), w as u32, h as u32)
    }

    /// Replace this rectangle with [`Rect::fitted`].
    pub fn fit(&mut self, target: &Rect) -> Rect {
        *self = self.fitted(target);
        *self
    }

    /// Copy resized to `percent`% of the current size, keeping `anchor` fixed.
    #[must_use]
    pub fn scaled_by_percent(&self, percent: u32, anchor: Anchor) -> Rect {
        let w = self.width as u64 * percent as u64 / 100;
        let h = self.height as u64 * percent as u64 / 100;
        let fixed = self.anchor(anchor);
        Rect::new(self.x, self.y, w.min(u32::MAX as u64) as u32, h.min(u32::MAX as u64) as u32)
            .moved_at(fixed, anchor)
    }

    /// Size obtained by setting `dim` to `length` and scaling the other
    /// dimension proportionally (floored). A zero source dimension yields zero.
    pub fn scaled_to_length(&self, length: u32, dim: Dim) -> Size {
        let scale = |other: u32, base: u32| {
            if base == 0 {
                0
            } else {
                (other as u64 * length as u64 / base as u64).min(u32::MAX as u64) as u32
            }
        };
        match dim {
            Dim::Width => Size::new(length, scale(self.height, self.width)),
            Dim::Height => Size::new(scale(self.width, self.height), length),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<rect({}, {}, {}, {})>", self.x, self.y, self.width, self.height)
    }
}

/// Anything that occupies a rectangle.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}

impl Bounded for Rect {
    #[inline]
    fn bounds(&self) -> Rect {
        *self
    }
}
