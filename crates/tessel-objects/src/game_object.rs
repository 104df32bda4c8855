#![forbid(unsafe_code)]

//! Game objects: shapes with velocity, identity, and deferred actions.
//!
//! A [`GameObject`] dereferences to its [`Shape`], so geometry and raster
//! operations are available directly. On top of that it adds:
//!
//! - bounce and random movement inside a bound,
//! - a [`CompareKey`] used for equality instead of structural comparison,
//! - named [`ActionGroups`],
//! - draw/erase bookkeeping against a [`Board`],
//! - a surround rectangle that follows the object.
//!
//! # Equality
//!
//! `GameObject == GameObject` compares keys. An object also compares equal to
//! a bare key value (`obj == 7`, `obj == "ace"`), which lets containers look
//! objects up by key.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde_json::{Map, Value};
use tessel_core::{Anchor, AttrValue, Bounded, Error, Point, Rect, RectAttr, Result};
use tessel_render::{Board, Dest, Drawable, Raster};

use crate::actions::ActionGroups;
use crate::entity::Entity;
use crate::shape::Shape;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique object identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The value an object is compared by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompareKey {
    /// The object's own identity (the default).
    Identity(ObjectId),
    Int(i64),
    Text(String),
}

impl From<i64> for CompareKey {
    fn from(v: i64) -> Self {
        CompareKey::Int(v)
    }
}

impl From<&str> for CompareKey {
    fn from(v: &str) -> Self {
        CompareKey::Text(v.to_owned())
    }
}

impl From<String> for CompareKey {
    fn from(v: String) -> Self {
        CompareKey::Text(v)
    }
}

/// A `(min, max)` offset range for random movement, sorted on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    min: i32,
    max: i32,
}

impl AxisRange {
    /// Range between `a` and `b` in either order.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub const fn min(self) -> i32 {
        self.min
    }

    pub const fn max(self) -> i32 {
        self.max
    }

    fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> i32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl From<(i32, i32)> for AxisRange {
    fn from((a, b): (i32, i32)) -> Self {
        Self::new(a, b)
    }
}

impl TryFrom<&[i64]> for AxisRange {
    type Error = Error;

    fn try_from(values: &[i64]) -> Result<Self> {
        let [a, b] = values else {
            return Err(Error::invalid(format!(
                "range needs exactly two values, got {}",
                values.len()
            )));
        };
        let conv = |v: i64| {
            i32::try_from(v).map_err(|_| Error::invalid(format!("range bound {v} out of i32")))
        };
        Ok(Self::new(conv(*a)?, conv(*b)?))
    }
}

impl TryFrom<&Value> for AxisRange {
    type Error = Error;

    /// Accept a JSON array of two integers.
    fn try_from(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::invalid(format!("range must be an array, got {value}")))?;
        let ints = items
            .iter()
            .map(|v| v.as_i64().ok_or_else(|| Error::invalid(format!("range bound {v} is not an integer"))))
            .collect::<Result<Vec<_>>>()?;
        Self::try_from(ints.as_slice())
    }
}

/// Move `rect` by `velocity` and clamp it into `bound`. Returns the velocity
/// for the next step: each component whose move reached a bound edge is
/// negated.
pub(crate) fn bounce(rect: &mut Rect, bound: &Rect, velocity: (i32, i32)) -> (i32, i32) {
    let (dx, dy) = velocity;
    let (left, right) = (rect.left() as i64 + dx as i64, rect.right() as i64 + dx as i64);
    let (top, bottom) = (rect.top() as i64 + dy as i64, rect.bottom() as i64 + dy as i64);
    let mut next = velocity;
    if left <= bound.left() as i64 || right >= bound.right() as i64 {
        next.0 = dx.saturating_neg();
    }
    if bottom >= bound.bottom() as i64 || top <= bound.top() as i64 {
        next.1 = dy.saturating_neg();
    }
    rect.move_by(dx, dy);
    rect.clamp(bound);
    next
}

/// How the surround rectangle is derived from the object's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surround {
    /// Same as the object's rectangle.
    #[default]
    Same,
    /// Grown by `n` pixels in both dimensions, same centre.
    Delta(i32),
    /// Scaled to this percentage, same centre.
    Percent(u32),
    /// A fixed-size rectangle kept centred on the object.
    Fixed(Rect),
}

/// A shape with velocity, identity, comparison key and actions.
#[derive(Debug)]
pub struct GameObject {
    shape: Shape,
    id: ObjectId,
    key: CompareKey,
    velocity: (i32, i32),
    actions: ActionGroups,
    saved: Option<Raster>,
    surround: Surround,
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new(Shape::new())
    }
}

impl GameObject {
    /// Object wrapping `shape`, compared by identity, at rest.
    pub fn new(shape: Shape) -> Self {
        let id = ObjectId::next();
        Self {
            shape,
            id,
            key: CompareKey::Identity(id),
            velocity: (0, 0),
            actions: ActionGroups::new(),
            saved: None,
            surround: Surround::Same,
        }
    }

    pub fn from_raster(raster: Raster) -> Self {
        Self::new(Shape::from_raster(raster))
    }

    /// Use `key` for comparisons.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<CompareKey>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, dx: i32, dy: i32) -> Self {
        self.velocity = (dx, dy);
        self
    }

    /// A copy with its own identity. The comparison key, velocity and
    /// surround carry over; actions and saved draw state do not.
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::new(self.shape.clone());
        copy.key = match &self.key {
            CompareKey::Identity(_) => CompareKey::Identity(copy.id),
            other => other.clone(),
        };
        copy.velocity = self.velocity;
        copy.surround = self.surround;
        copy
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn compare_key(&self) -> &CompareKey {
        &self.key
    }

    pub fn set_compare_key(&mut self, key: impl Into<CompareKey>) {
        self.key = key.into();
    }

    pub fn velocity(&self) -> (i32, i32) {
        self.velocity
    }

    pub fn set_velocity(&mut self, dx: i32, dy: i32) {
        self.velocity = (dx, dy);
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    pub fn actions(&self) -> &ActionGroups {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionGroups {
        &mut self.actions
    }

    // --- Movement -----------------------------------------------------

    /// Move by `velocity` (own velocity when `None`) and clamp into `bound`,
    /// reflecting each velocity component whose move reaches a bound edge.
    ///
    /// The reflected velocity only affects the next call: this move always
    /// uses the velocity as it was on entry.
    pub fn move_bouncing(&mut self, bound: &Rect, velocity: Option<(i32, i32)>) -> Rect {
        let mut rect = self.shape.rect();
        self.velocity = bounce(&mut rect, bound, velocity.unwrap_or(self.velocity));
        self.shape.move_at(rect.topleft(), Anchor::TopLeft)
    }

    /// Move by a random offset per axis, then clamp into `bound` if given.
    ///
    /// Each range defaults to `(0, velocity component)`; ranges are sorted.
    pub fn move_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        bound: Option<&Rect>,
        x: Option<AxisRange>,
        y: Option<AxisRange>,
    ) -> Rect {
        let x = x.unwrap_or_else(|| AxisRange::new(0, self.velocity.0));
        let y = y.unwrap_or_else(|| AxisRange::new(0, self.velocity.1));
        let (dx, dy) = (x.sample(rng), y.sample(rng));
        self.shape.move_by(dx, dy);
        if let Some(b) = bound {
            self.shape.clamp(b);
        }
        self.shape.rect()
    }

    /// True if `point` is inside the rectangle (right/bottom edges excluded).
    pub fn is_clicked(&self, point: impl Into<Point>) -> bool {
        self.shape.collide_point(point)
    }

    /// Write several rectangle attributes in order.
    ///
    /// Size attributes rescale the raster. Stops at the first invalid value;
    /// earlier writes stay applied.
    pub fn set_rect_attrs<I>(&mut self, attrs: I) -> Result<Rect>
    where
        I: IntoIterator<Item = (RectAttr, AttrValue)>,
    {
        for (attr, value) in attrs {
            let mut r = self.shape.rect();
            r.set(attr, value)?;
            if r.size() != self.shape.size() {
                self.shape.resize(r.width, r.height)?;
            }
            self.shape.move_at(r.topleft(), Anchor::TopLeft);
        }
        Ok(self.shape.rect())
    }

    // --- Actions ------------------------------------------------------

    /// Append an action to `group` (the default group when `None`).
    pub fn set_action(
        &mut self,
        callback: impl FnMut(&[Value], &Map<String, Value>) -> Result<()> + 'static,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
        group: Option<&str>,
    ) {
        self.actions.set(callback, args, kwargs, group);
    }

    /// Run the actions of `group`, stopping at the first failure.
    pub fn raise_actions(&mut self, group: Option<&str>) -> Result<()> {
        self.actions.raise(group)
    }

    /// Remove and return `group`, `None` if absent.
    pub fn del_action_group(&mut self, group: &str) -> Option<Vec<crate::actions::Action>> {
        self.actions.remove(group)
    }

    // --- Drawing ------------------------------------------------------

    /// Save the board pixels under the object, draw `background` (if any)
    /// there, then draw the object. Returns the touched region.
    pub fn draw_on(&mut self, board: &mut Board, background: Option<&Raster>) -> Result<Rect> {
        let rect = self.shape.rect();
        self.saved = Some(board.raster().portion(rect));
        if let Some(bg) = background {
            board.draw(bg, Some(Dest::At(rect.topleft())), Some(rect))?;
        }
        board.draw(&self.shape, None, None)
    }

    /// Paint over the object's area with `with`, or with the pixels saved by
    /// the last [`GameObject::draw_on`].
    ///
    /// # Errors
    ///
    /// `Precondition` when no raster is given and nothing was saved.
    pub fn erase(&mut self, board: &mut Board, with: Option<&Raster>, clip: Option<Rect>) -> Result<Rect> {
        let source = with
            .or(self.saved.as_ref())
            .ok_or_else(|| Error::precondition("nothing to erase with: draw_on was never called"))?;
        let at = self.shape.rect().topleft();
        board.draw(source, Some(Dest::At(at)), clip)
    }

    /// Pixels saved by the last `draw_on`.
    pub fn saved(&self) -> Option<&Raster> {
        self.saved.as_ref()
    }

    // --- Surround -----------------------------------------------------

    pub fn set_surround(&mut self, surround: Surround) {
        self.surround = surround;
    }

    /// The surround rectangle, centred on the object.
    pub fn surround_rect(&self) -> Rect {
        let r = self.shape.rect();
        match self.surround {
            Surround::Same => r,
            Surround::Delta(d) => r.inflated(d, d),
            Surround::Percent(p) => r.scaled_by_percent(p, Anchor::Center),
            Surround::Fixed(fixed) => fixed.moved_at(r.center(), Anchor::Center),
        }
    }
}

impl Deref for GameObject {
    type Target = Shape;

    fn deref(&self) -> &Shape {
        &self.shape
    }
}

impl DerefMut for GameObject {
    fn deref_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }
}

impl PartialEq for GameObject {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl PartialEq<CompareKey> for GameObject {
    fn eq(&self, other: &CompareKey) -> bool {
        self.key == *other
    }
}

impl PartialEq<i64> for GameObject {
    fn eq(&self, other: &i64) -> bool {
        matches!(self.key, CompareKey::Int(v) if v == *other)
    }
}

impl PartialEq<str> for GameObject {
    fn eq(&self, other: &str) -> bool {
        matches!(&self.key, CompareKey::Text(v) if v == other)
    }
}

impl PartialEq<&str> for GameObject {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<ObjectId> for GameObject {
    fn eq(&self, other: &ObjectId) -> bool {
        self.key == CompareKey::Identity(*other)
    }
}

impl Bounded for GameObject {
    fn bounds(&self) -> Rect {
        self.shape.rect()
    }
}

impl Drawable for GameObject {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        self.shape.with_raster(f)
    }
}

impl Entity for GameObject {
    fn place(&mut self, topleft: Point) -> Result<()> {
        self.shape.move_at(topleft, Anchor::TopLeft);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.shape.resize(width, height)
    }
}
