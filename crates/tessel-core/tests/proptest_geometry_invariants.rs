//! Property-based invariant tests for `Rect`.
//!
//! 1. Fit result lies inside the target.
//! 2. Fit preserves the aspect ratio within one pixel of rounding.
//! 3. Clamp keeps a smaller rect inside its bound and never resizes.
//! 4. Moving to an anchor round-trips through the anchor getter.
//! 5. Union contains both inputs.
//! 6. Collision is symmetric and agrees with intersection.
//! 7. Attribute writes followed by reads return the written value.

use proptest::prelude::*;
use tessel_core::geometry::{Anchor, AttrValue, Rect, RectAttr};

// ── Helpers ─────────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-500i32..=500, -500i32..=500, 0u32..=400, 0u32..=400)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn nonempty_rect_strategy() -> impl Strategy<Value = Rect> {
    (-500i32..=500, -500i32..=500, 1u32..=400, 1u32..=400)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn anchor_strategy() -> impl Strategy<Value = Anchor> {
    (0usize..Anchor::ALL.len()).prop_map(|i| Anchor::ALL[i])
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Fit
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fit_is_contained(src in nonempty_rect_strategy(), target in nonempty_rect_strategy()) {
        let fitted = src.fitted(&target);
        prop_assert!(target.contains(&fitted), "{:?} not inside {:?}", fitted, target);
        prop_assert!(fitted.width == target.width || fitted.height == target.height);
    }

    #[test]
    fn fit_preserves_aspect(src in nonempty_rect_strategy(), target in nonempty_rect_strategy()) {
        let fitted = src.fitted(&target);
        // Cross-multiplied ratio difference stays within one unit of the larger side.
        let lhs = fitted.width as i64 * src.height as i64;
        let rhs = fitted.height as i64 * src.width as i64;
        let tolerance = src.width.max(src.height) as i64;
        prop_assert!((lhs - rhs).abs() <= tolerance, "{:?} -> {:?}", src, fitted);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Clamp
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamp_keeps_smaller_rect_inside(r in rect_strategy(), bound in nonempty_rect_strategy()) {
        let clamped = r.clamped(&bound);
        prop_assert_eq!(clamped.size(), r.size());
        if r.width < bound.width && r.height < bound.height {
            prop_assert!(bound.contains(&clamped), "{:?} not inside {:?}", clamped, bound);
        }
    }

    #[test]
    fn clamp_is_idempotent(r in rect_strategy(), bound in nonempty_rect_strategy()) {
        let once = r.clamped(&bound);
        prop_assert_eq!(once.clamped(&bound), once);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Anchors
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn move_at_round_trips(r in rect_strategy(), anchor in anchor_strategy(),
                           px in -1000i32..=1000, py in -1000i32..=1000) {
        let moved = r.moved_at((px, py), anchor);
        prop_assert_eq!(moved.anchor(anchor), (px, py).into());
        prop_assert_eq!(moved.size(), r.size());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-6. Union and collision
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn union_contains_both(a in rect_strategy(), b in rect_strategy()) {
        let u = a.union(&b);
        prop_assert!(u.contains(&a));
        prop_assert!(u.contains(&b));
    }

    #[test]
    fn collide_symmetric_and_matches_intersection(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.collide(&b), b.collide(&a));
        let overlaps = !a.is_empty() && !b.is_empty() && a.intersection(&b).is_some();
        prop_assert_eq!(a.collide(&b), overlaps);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Attribute table
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scalar_position_attrs_round_trip(r in rect_strategy(), v in -1000i32..=1000) {
        for attr in [RectAttr::X, RectAttr::Y, RectAttr::Right, RectAttr::Bottom,
                     RectAttr::CenterX, RectAttr::CenterY] {
            let mut copy = r;
            copy.set(attr, AttrValue::Scalar(v)).unwrap();
            prop_assert_eq!(copy.get(attr), AttrValue::Scalar(v), "{}", attr);
            prop_assert_eq!(copy.size(), r.size());
        }
    }
}
