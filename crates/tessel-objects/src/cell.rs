#![forbid(unsafe_code)]

//! Cells: a game object carrying one bound item.
//!
//! The item's rectangle is derived from the cell's rectangle through an
//! ordered set of [`BindingRule`]s, one per item attribute. Rules are
//! evaluated in insertion order against a copy of the item's rectangle;
//! when the result differs in size the item is resized, then it is placed.
//!
//! # Invariants
//!
//! 1. After every public call that moves or resizes the cell, or changes
//!    the rules, the item's bounds equal the rules applied to the current
//!    cell rectangle.
//! 2. The cell's own object is only reachable mutably through
//!    [`Cell::modify`], which re-derives the item afterwards.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Rule value of the wrong kind for its attribute | `Error::InvalidArgument`, item untouched |
//! | Rule produces a zero item size | `Error::InvalidArgument` from the item's resize |

use std::fmt;
use std::ops::Deref;

use rand::Rng;
use serde_json::Value;
use tessel_core::{Anchor, AttrValue, Bounded, Error, Point, Rect, RectAttr, Result};
use tessel_render::{Board, Drawable, Raster};

use crate::entity::Entity;
use crate::game_object::{AxisRange, GameObject, bounce};

// ---------------------------------------------------------------------------
// Binding rules
// ---------------------------------------------------------------------------

/// How one item attribute is derived from the cell.
pub enum BindingRule {
    /// The cell's value of the same attribute.
    Default,
    /// The cell's value of another attribute.
    CrossRef(RectAttr),
    /// A fixed value.
    Absolute(AttrValue),
    /// A value computed on every update.
    Computed(Box<dyn Fn() -> AttrValue>),
}

impl BindingRule {
    pub fn computed(f: impl Fn() -> AttrValue + 'static) -> Self {
        BindingRule::Computed(Box::new(f))
    }

    /// Value written to the item's `target` attribute for a cell at `cell`.
    pub fn evaluate(&self, target: RectAttr, cell: &Rect) -> AttrValue {
        match self {
            BindingRule::Default => cell.get(target),
            BindingRule::CrossRef(attr) => cell.get(*attr),
            BindingRule::Absolute(value) => *value,
            BindingRule::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for BindingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingRule::Default => f.write_str("Default"),
            BindingRule::CrossRef(a) => f.debug_tuple("CrossRef").field(a).finish(),
            BindingRule::Absolute(v) => f.debug_tuple("Absolute").field(v).finish(),
            BindingRule::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<AttrValue> for BindingRule {
    fn from(v: AttrValue) -> Self {
        BindingRule::Absolute(v)
    }
}

impl From<RectAttr> for BindingRule {
    fn from(a: RectAttr) -> Self {
        BindingRule::CrossRef(a)
    }
}

impl TryFrom<&Value> for BindingRule {
    type Error = Error;

    /// `null` follows the same attribute, a string names a cell attribute,
    /// an integer or a two-integer array is written as is.
    fn try_from(value: &Value) -> Result<Self> {
        let int = |v: &Value| {
            v.as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| Error::invalid(format!("binding value {v} is not an i32")))
        };
        match value {
            Value::Null => Ok(BindingRule::Default),
            Value::String(name) => Ok(BindingRule::CrossRef(name.parse()?)),
            Value::Number(_) => Ok(BindingRule::Absolute(AttrValue::Scalar(int(value)?))),
            Value::Array(items) => match items.as_slice() {
                [a, b] => Ok(BindingRule::Absolute(AttrValue::Pair(int(a)?, int(b)?))),
                _ => Err(Error::invalid(format!(
                    "binding pair needs two values, got {}",
                    items.len()
                ))),
            },
            other => Err(Error::invalid(format!("unsupported binding value {other}"))),
        }
    }
}

/// Ordered attribute to rule map.
///
/// Setting an attribute that is already bound replaces its rule in place,
/// keeping its position in the evaluation order.
#[derive(Debug, Default)]
pub struct Bindings {
    rules: Vec<(RectAttr, BindingRule)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Item centred on the cell centre.
    pub fn centered() -> Self {
        Self::new().with(RectAttr::Anchor(Anchor::Center), BindingRule::Default)
    }

    #[must_use]
    pub fn with(mut self, attr: RectAttr, rule: impl Into<BindingRule>) -> Self {
        self.set(attr, rule);
        self
    }

    pub fn set(&mut self, attr: RectAttr, rule: impl Into<BindingRule>) -> &mut Self {
        let rule = rule.into();
        match self.rules.iter_mut().find(|(a, _)| *a == attr) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((attr, rule)),
        }
        self
    }

    pub fn get(&self, attr: RectAttr) -> Option<&BindingRule> {
        self.rules.iter().find(|(a, _)| *a == attr).map(|(_, r)| r)
    }

    pub fn remove(&mut self, attr: RectAttr) -> Option<BindingRule> {
        let i = self.rules.iter().position(|(a, _)| *a == attr)?;
        Some(self.rules.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RectAttr, &BindingRule)> {
        self.rules.iter().map(|(a, r)| (*a, r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule, in order, to a copy of `item` for a cell at `cell`.
    pub fn apply(&self, item: Rect, cell: &Rect) -> Result<Rect> {
        let mut out = item;
        for (attr, rule) in &self.rules {
            out.set(*attr, rule.evaluate(*attr, cell))?;
        }
        Ok(out)
    }
}

impl FromIterator<(RectAttr, BindingRule)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (RectAttr, BindingRule)>>(iter: T) -> Self {
        let mut out = Bindings::new();
        for (attr, rule) in iter {
            out.set(attr, rule);
        }
        out
    }
}

impl TryFrom<&Value> for Bindings {
    type Error = Error;

    /// Parse `[["center", null], ["size", [4, 3]], ...]`.
    fn try_from(value: &Value) -> Result<Self> {
        let entries = value
            .as_array()
            .ok_or_else(|| Error::invalid("bindings must be an array of [attr, value] pairs"))?;
        entries
            .iter()
            .map(|entry| -> Result<(RectAttr, BindingRule)> {
                match entry.as_array().map(Vec::as_slice) {
                    Some([Value::String(name), rule]) => Ok((name.parse()?, BindingRule::try_from(rule)?)),
                    _ => Err(Error::invalid(format!("malformed binding entry {entry}"))),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A game object with one optional bound item.
#[derive(Debug)]
pub struct Cell<I = GameObject> {
    object: GameObject,
    item: Option<I>,
    bindings: Bindings,
}

impl<I: Entity> Default for Cell<I> {
    fn default() -> Self {
        Self::new(GameObject::default())
    }
}

impl<I: Entity> Cell<I> {
    /// Cell around `object`, without an item.
    pub fn new(object: GameObject) -> Self {
        Self {
            object,
            item: None,
            bindings: Bindings::centered(),
        }
    }

    pub fn from_raster(raster: Raster) -> Self {
        Self::new(GameObject::from_raster(raster))
    }

    /// Bind `item`, replacing any previous one. The rules default to
    /// centring the item on the cell.
    pub fn add_item(&mut self, item: I, rules: Option<Bindings>) -> Result<()> {
        self.item = Some(item);
        self.bindings = rules.unwrap_or_else(Bindings::centered);
        self.update_item()
    }

    /// Unbind and return the item. The rules stay for the next item.
    pub fn take_item(&mut self) -> Option<I> {
        self.item.take()
    }

    pub fn item(&self) -> Option<&I> {
        self.item.as_ref()
    }

    pub fn has_item(&self) -> bool {
        self.item.is_some()
    }

    /// Mutate the item, then re-derive its placement.
    pub fn modify_item<R>(&mut self, f: impl FnOnce(&mut I) -> R) -> Result<Option<R>> {
        let out = self.item.as_mut().map(f);
        self.update_item()?;
        Ok(out)
    }

    /// Mutate the cell's own object, then re-derive the item.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut GameObject) -> R) -> Result<R> {
        let out = f(&mut self.object);
        self.update_item()?;
        Ok(out)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Replace the rules, applying them right away when `update` is set.
    pub fn set_item_attrs(&mut self, rules: Bindings, update: bool) -> Result<()> {
        self.bindings = rules;
        if update {
            self.update_item()?;
        }
        Ok(())
    }

    /// Re-evaluate every rule and move (and if needed resize) the item.
    pub fn update_item(&mut self) -> Result<()> {
        let Some(item) = self.item.as_mut() else {
            return Ok(());
        };
        let current = item.bounds();
        let target = self.bindings.apply(current, &self.object.rect())?;
        if target.size() != current.size() {
            item.resize(target.width, target.height)?;
        }
        item.place(target.topleft())
    }

    /// Cell rectangle united with the item's bounds.
    pub fn urect(&self) -> Rect {
        let own = self.object.rect();
        match &self.item {
            Some(item) => own.union(&item.bounds()),
            None => own,
        }
    }

    pub fn uarea(&self) -> u64 {
        self.urect().area()
    }

    pub fn actions_mut(&mut self) -> &mut crate::actions::ActionGroups {
        self.object.actions_mut()
    }

    pub fn set_velocity(&mut self, dx: i32, dy: i32) {
        self.object.set_velocity(dx, dy);
    }

    // --- Movement -----------------------------------------------------

    pub fn move_by(&mut self, dx: i32, dy: i32) -> Result<Rect> {
        self.object.move_by(dx, dy);
        self.update_item()?;
        Ok(self.object.rect())
    }

    pub fn move_at(&mut self, point: impl Into<Point>, anchor: Anchor) -> Result<Rect> {
        self.object.move_at(point, anchor);
        self.update_item()?;
        Ok(self.object.rect())
    }

    pub fn clamp(&mut self, bound: &Rect) -> Result<Rect> {
        self.object.clamp(bound);
        self.update_item()?;
        Ok(self.object.rect())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.object.resize(width, height)?;
        self.update_item()
    }

    pub fn fit(&mut self, target: &Rect) -> Result<Rect> {
        self.object.fit(target)?;
        self.update_item()?;
        Ok(self.object.rect())
    }

    pub fn rotate(&mut self, degrees: f64, anchor: Anchor) -> Result<Rect> {
        self.object.rotate(degrees, anchor);
        self.update_item()?;
        Ok(self.object.rect())
    }

    pub fn set_rect_attrs<A>(&mut self, attrs: A) -> Result<Rect>
    where
        A: IntoIterator<Item = (RectAttr, AttrValue)>,
    {
        self.object.set_rect_attrs(attrs)?;
        self.update_item()?;
        Ok(self.object.rect())
    }

    /// Bounce inside `bound`.
    ///
    /// With `union` set and an item bound, the bounding box of cell and item
    /// is bounced instead; the cell then takes the same displacement and the
    /// item is re-derived, so the item never leaves `bound` either.
    pub fn move_bouncing(&mut self, bound: &Rect, velocity: Option<(i32, i32)>, union: bool) -> Result<Rect> {
        if union && self.item.is_some() {
            let velocity = velocity.unwrap_or(self.object.velocity());
            let mut u = self.urect();
            let start = u.topleft();
            let next = bounce(&mut u, bound, velocity);
            let (dx, dy) = (u.x - start.x, u.y - start.y);
            self.object.move_by(dx, dy);
            self.object.set_velocity(next.0, next.1);
        } else {
            self.object.move_bouncing(bound, velocity);
        }
        self.update_item()?;
        Ok(self.object.rect())
    }

    pub fn move_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        bound: Option<&Rect>,
        x: Option<AxisRange>,
        y: Option<AxisRange>,
    ) -> Result<Rect> {
        self.object.move_random(rng, bound, x, y);
        self.update_item()?;
        Ok(self.object.rect())
    }

    // --- Drawing ------------------------------------------------------

    /// Draw the cell (saving what it covers) and, if `draw_item`, the item
    /// on top. Returns the touched region.
    pub fn draw_on(&mut self, board: &mut Board, draw_item: bool) -> Result<Rect> {
        let mut touched = self.object.draw_on(board, None)?;
        if draw_item && let Some(item) = &self.item {
            touched = touched.union(&item.paint(board)?);
        }
        Ok(touched)
    }

    /// Restore what the last `draw_on` covered. See [`GameObject::erase`].
    pub fn erase(&mut self, board: &mut Board, with: Option<&Raster>, clip: Option<Rect>) -> Result<Rect> {
        self.object.erase(board, with, clip)
    }
}

impl<I> Deref for Cell<I> {
    type Target = GameObject;

    fn deref(&self) -> &GameObject {
        &self.object
    }
}

impl<I> PartialEq for Cell<I> {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl<I> Bounded for Cell<I> {
    fn bounds(&self) -> Rect {
        self.object.rect()
    }
}

impl<I> Drawable for Cell<I> {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        self.object.with_raster(f)
    }
}

impl<I: Entity> Entity for Cell<I> {
    fn place(&mut self, topleft: Point) -> Result<()> {
        self.move_at(topleft, Anchor::TopLeft).map(|_| ())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        Cell::resize(self, width, height)
    }

    fn paint(&self, board: &mut Board) -> Result<Rect> {
        let mut touched = board.draw(self, None, None)?;
        if let Some(item) = &self.item {
            touched = touched.union(&item.paint(board)?);
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessel_core::Size;
    use tessel_render::{BoardFlags, Rgba};

    fn cell(w: u32, h: u32) -> Cell {
        Cell::from_raster(Raster::filled(w, h, Rgba::BLUE))
    }

    fn item(w: u32, h: u32) -> GameObject {
        GameObject::from_raster(Raster::filled(w, h, Rgba::RED))
    }

    #[test]
    fn default_rule_centres_item() {
        let mut c = cell(20, 10);
        c.add_item(item(4, 2), None).unwrap();
        assert_eq!(c.item().unwrap().rect(), Rect::new(8, 4, 4, 2));
        c.move_by(5, 5).unwrap();
        assert_eq!(c.item().unwrap().rect().center(), c.rect().center());
    }

    #[test]
    fn rules_apply_in_order() {
        let mut c = cell(20, 10);
        let rules = Bindings::new()
            .with(RectAttr::Size, AttrValue::Pair(6, 6))
            .with(RectAttr::Anchor(Anchor::TopLeft), RectAttr::Anchor(Anchor::BottomRight))
            .with(RectAttr::Left, BindingRule::computed(|| AttrValue::Scalar(3)));
        c.add_item(item(1, 1), Some(rules)).unwrap();
        let it = c.item().unwrap();
        assert_eq!(it.rect(), Rect::new(3, 10, 6, 6));
        assert_eq!(it.raster().size(), Size::new(6, 6));
    }

    #[test]
    fn setting_a_bound_attribute_keeps_its_slot() {
        let mut rules = Bindings::centered().with(RectAttr::Width, AttrValue::Scalar(2));
        rules.set(RectAttr::Anchor(Anchor::Center), RectAttr::Anchor(Anchor::TopLeft));
        let order: Vec<_> = rules.iter().map(|(a, _)| a).collect();
        assert_eq!(order, vec![RectAttr::Anchor(Anchor::Center), RectAttr::Width]);
        assert!(matches!(rules.get(RectAttr::Anchor(Anchor::Center)), Some(BindingRule::CrossRef(_))));
        assert!(rules.remove(RectAttr::Height).is_none());
    }

    #[test]
    fn resize_rederives_size_following_rules() {
        let mut c = cell(10, 10);
        let rules = Bindings::new()
            .with(RectAttr::Size, BindingRule::Default)
            .with(RectAttr::Anchor(Anchor::Center), BindingRule::Default);
        c.add_item(item(2, 2), Some(rules)).unwrap();
        c.resize(30, 16).unwrap();
        assert_eq!(c.item().unwrap().rect(), c.rect());
    }

    #[test]
    fn wrong_kind_is_invalid_argument() {
        let mut c = cell(10, 10);
        let rules = Bindings::new().with(RectAttr::Width, AttrValue::Pair(1, 2));
        let err = c.add_item(item(2, 2), Some(rules)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn union_bounce_keeps_item_inside() {
        let bound = Rect::new(0, 0, 100, 100);
        let mut c = cell(10, 10);
        let rules = Bindings::new().with(RectAttr::Anchor(Anchor::MidLeft), RectAttr::Anchor(Anchor::MidRight));
        c.add_item(item(10, 4), Some(rules)).unwrap();
        c.move_at((75, 40), Anchor::TopLeft).unwrap();
        c.set_velocity(4, 0);
        c.move_bouncing(&bound, None, true).unwrap();
        // Union spans 75..95; moving 4 reaches 99 < 100, no flip yet.
        assert_eq!(c.rect().x, 79);
        c.move_bouncing(&bound, None, true).unwrap();
        assert!(bound.contains(&c.urect()));
        assert_eq!(c.rect().x, 80);
        assert_eq!(c.velocity(), (-4, 0));
        assert_eq!(c.item().unwrap().rect().left(), c.rect().right());
    }

    #[test]
    fn plain_bounce_ignores_item_extent() {
        let bound = Rect::new(0, 0, 100, 100);
        let mut c = cell(10, 10);
        let rules = Bindings::new().with(RectAttr::Anchor(Anchor::MidLeft), RectAttr::Anchor(Anchor::MidRight));
        c.add_item(item(10, 4), Some(rules)).unwrap();
        c.move_at((85, 40), Anchor::TopLeft).unwrap();
        c.set_velocity(2, 0);
        c.move_bouncing(&bound, None, false).unwrap();
        assert_eq!(c.rect().x, 87);
        assert!(!bound.contains(&c.urect()));
    }

    #[test]
    fn urect_and_take_item() {
        let mut c = cell(4, 4);
        let rules = Bindings::new().with(RectAttr::Anchor(Anchor::TopLeft), RectAttr::Anchor(Anchor::BottomRight));
        c.add_item(item(2, 2), Some(rules)).unwrap();
        assert_eq!(c.urect(), Rect::new(0, 0, 6, 6));
        assert_eq!(c.uarea(), 36);
        assert!(c.take_item().is_some());
        assert_eq!(c.urect(), c.rect());
        assert!(c.move_by(1, 1).is_ok());
    }

    #[test]
    fn modify_rederives_item() {
        let mut c = cell(10, 10);
        c.add_item(item(2, 2), None).unwrap();
        c.modify(|obj| {
            obj.move_by(10, 0);
        })
        .unwrap();
        assert_eq!(c.item().unwrap().rect().center(), Point::new(15, 5));
        c.modify_item(|it| it.move_by(50, 50)).unwrap();
        assert_eq!(c.item().unwrap().rect().center(), Point::new(15, 5));
    }

    #[test]
    fn bindings_from_json() {
        let rules = Bindings::try_from(&json!([["center", null], ["size", [3, 2]], ["x", "right"]])).unwrap();
        assert_eq!(rules.len(), 3);
        let out = rules.apply(Rect::new(0, 0, 1, 1), &Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(out, Rect::new(10, 5, 3, 2));
        assert!(Bindings::try_from(&json!({"center": null})).unwrap_err().is_invalid_argument());
        assert!(Bindings::try_from(&json!([["nowhere", null]])).is_err());
        assert!(Bindings::try_from(&json!([["size", [1]]])).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn draw_on_paints_item_over_cell() {
        let mut board = Board::new(20, 20, BoardFlags::empty());
        let mut c = cell(10, 10);
        c.add_item(item(2, 2), None).unwrap();
        let touched = c.draw_on(&mut board, true).unwrap();
        assert_eq!(touched, Rect::new(0, 0, 10, 10));
        assert_eq!(board.raster().at((5, 5)).unwrap(), Rgba::RED);
        assert_eq!(board.raster().at((1, 1)).unwrap(), Rgba::BLUE);
        c.erase(&mut board, None, None).unwrap();
        assert_eq!(board.raster().at((5, 5)).unwrap(), Rgba::BLACK);
    }
}
