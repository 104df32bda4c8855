#![forbid(unsafe_code)]

//! Collision, distribution and relative-position utilities.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Index outside the list | `Error::OutOfRange` |
//! | A rect wider than the padded bound | `distribute_rects` stops before it |
//! | A rect taller than the space left | `distribute_rects` stops before it |

use std::cmp::Ordering;

use tessel_core::{Anchor, Bounded, Error, Point, Rect, RectAttr, Result, Size};
use tessel_objects::GameObject;

/// Indices of every rect in `rects` colliding with `rects[index]`, the
/// target itself excluded. Indices refer to `rects`.
pub fn rects_collide_at(rects: &[Rect], index: usize) -> Result<Vec<usize>> {
    let target = rects
        .get(index)
        .ok_or_else(|| Error::out_of_range(format!("index {index} of {} rects", rects.len())))?;
    Ok(rects
        .iter()
        .enumerate()
        .filter(|&(i, r)| i != index && target.collide(r))
        .map(|(i, _)| i)
        .collect())
}

/// [`rects_collide_at`] over anything with bounds.
pub fn entities_collide_at<T: Bounded>(objects: &[T], index: usize) -> Result<Vec<usize>> {
    let rects: Vec<Rect> = objects.iter().map(Bounded::bounds).collect();
    rects_collide_at(&rects, index)
}

/// Pack `rects` left to right inside `bound`, `pad` pixels apart and from
/// the edges, wrapping to a new row at the right edge.
///
/// Returns how many rects were placed. Placement stops at the first rect
/// that is wider than the padded bound or would cross its bottom; that rect
/// and the ones after it keep their positions.
pub fn distribute_rects(rects: &mut [Rect], bound: &Rect, pad: u32) -> usize {
    let pad = i64::from(pad);
    let left = i64::from(bound.left()) + pad;
    let right = i64::from(bound.right()) - pad;
    let bottom = i64::from(bound.bottom()) - pad;
    let mut x = left;
    let mut y = i64::from(bound.top()) + pad;
    let mut row_bottom = y;

    for (placed, rect) in rects.iter_mut().enumerate() {
        let (w, h) = (i64::from(rect.width), i64::from(rect.height));
        if left + w > right {
            tessel_core::debug!(placed, rect = %rect, "rect wider than bound, stopping");
            return placed;
        }
        if x + w > right {
            x = left;
            y = row_bottom + pad;
            row_bottom = y;
        }
        if y + h > bottom {
            tessel_core::debug!(placed, rect = %rect, "no vertical space left, stopping");
            return placed;
        }
        // Both fit inside `bound`, whose corners are i32.
        rect.move_at(Point::new(x as i32, y as i32), Anchor::TopLeft);
        x += w + pad;
        row_bottom = row_bottom.max(y + h);
    }
    rects.len()
}

/// Where `pos` lands when `rel` moves to `new`, keeping the offset.
#[must_use]
pub fn move_relative_to(pos: Point, rel: Point, new: Point) -> Point {
    let keep = |p: i32, r: i32, n: i32| n.saturating_add(p.saturating_sub(r));
    Point::new(keep(pos.x, rel.x, new.x), keep(pos.y, rel.y, new.y))
}

/// Scale `position`, expressed against `relative`, into `other`.
///
/// Zero dimensions of `relative` count as 1. Division floors.
///
/// ```
/// use tessel_core::{Point, Size};
/// use tessel_layout::placement::position_relative_to;
///
/// let p = position_relative_to(Point::new(22, 22), Size::new(2, 2), Size::new(4, 4));
/// assert_eq!(p, Point::new(44, 44));
/// ```
#[must_use]
pub fn position_relative_to(position: Point, relative: Size, other: Size) -> Point {
    let scale = |p: i32, r: u32, o: u32| {
        let v = (i64::from(p) * i64::from(o)).div_euclid(i64::from(r.max(1)));
        v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    };
    Point::new(
        scale(position.x, relative.width, other.width),
        scale(position.y, relative.height, other.height),
    )
}

/// `rect`, expressed against `relative`, scaled and moved into `other`.
#[must_use]
pub fn rect_relative_to(rect: &Rect, relative: &Rect, other: &Rect) -> Rect {
    let tl = position_relative_to(rect.topleft(), relative.size(), other.size());
    let br = position_relative_to(rect.anchor(Anchor::BottomRight), relative.size(), other.size());
    let span = |a: i32, b: i32| u32::try_from(i64::from(b) - i64::from(a)).unwrap_or(0);
    Rect::new(tl.x, tl.y, span(tl.x, br.x), span(tl.y, br.y))
}

/// Order by area.
#[must_use]
pub fn compare_area(r1: &Rect, r2: &Rect) -> Ordering {
    r1.area().cmp(&r2.area())
}

/// Compare `attrs` of both rects and sum the results (+1 greater, -1 less).
///
/// A net difference of at most `delta` counts as equal.
#[must_use]
pub fn compare_attrs(r1: &Rect, r2: &Rect, attrs: &[RectAttr], delta: u32) -> Ordering {
    let net: i64 = attrs
        .iter()
        .map(|&a| match r1.get(a).cmp(&r2.get(a)) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        })
        .sum();
    if net.unsigned_abs() <= u64::from(delta) {
        Ordering::Equal
    } else {
        net.cmp(&0)
    }
}

/// Smallest grid shape `(cols, rows)` with `rows <= cols` holding `n`
/// items, searching widths below `n`; falls back to `(n, 1)`.
#[must_use]
pub fn find_div(n: usize) -> (usize, usize) {
    if n < 1 {
        return (0, 0);
    }
    (1..n)
        .find_map(|x| (1..=x).find(|&y| x * y >= n).map(|y| (x, y)))
        .unwrap_or((n, 1))
}

/// Bounce the first member of every colliding pair inside `bound`.
pub fn check_collisions(objects: &mut [GameObject], bound: &Rect) {
    for i in 0..objects.len() {
        for j in i + 1..objects.len() {
            let other = objects[j].rect();
            if objects[i].rect().collide(&other) {
                objects[i].move_bouncing(bound, None);
            }
        }
    }
}
