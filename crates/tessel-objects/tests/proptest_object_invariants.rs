//! Property-based invariant tests for objects and cells.
//!
//! 1. A bounced object stays inside its bound on every step.
//! 2. Resizing to a positive size always lands exactly on that size.
//! 3. A bound item always equals its rules applied to the current cell.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tessel_core::{Anchor, AttrValue, Rect, RectAttr, Size};
use tessel_objects::{AxisRange, Bindings, Cell, GameObject, Shape};
use tessel_render::{Raster, Rgba};

#[derive(Debug, Clone)]
enum Op {
    MoveBy(i32, i32),
    MoveAt(i32, i32, usize),
    Resize(u32, u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-50i32..50, -50i32..50).prop_map(|(dx, dy)| Op::MoveBy(dx, dy)),
        (-100i32..100, -100i32..100, 0usize..9).prop_map(|(x, y, a)| Op::MoveAt(x, y, a)),
        (1u32..40, 1u32..40).prop_map(|(w, h)| Op::Resize(w, h)),
    ]
}

fn expected_item(item_size: Size, cell: Rect, rules: &Bindings) -> Rect {
    rules.apply(Rect::at((0, 0), item_size), &cell).unwrap()
}

proptest! {
    #[test]
    fn bounce_stays_in_bound(
        w in 1u32..30, h in 1u32..30,
        dx in -12i32..12, dy in -12i32..12,
        x in 0i32..70, y in 0i32..70,
    ) {
        let bound = Rect::new(0, 0, 100, 100);
        let mut obj = GameObject::from_raster(Raster::filled(w, h, Rgba::RED)).with_velocity(dx, dy);
        obj.move_at((x, y), Anchor::TopLeft);
        obj.clamp(&bound);
        let speed = (dx.abs(), dy.abs());
        for _ in 0..1000 {
            let r = obj.move_bouncing(&bound, None);
            prop_assert!(bound.contains(&r));
            let v = obj.velocity();
            prop_assert_eq!((v.0.abs(), v.1.abs()), speed);
        }
    }

    #[test]
    fn random_walk_stays_in_bound(seed in any::<u64>(), lo in -20i32..0, hi in 0i32..20) {
        let bound = Rect::new(10, 10, 60, 40);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut obj = GameObject::from_raster(Raster::filled(5, 5, Rgba::RED));
        for _ in 0..200 {
            let r = obj.move_random(&mut rng, Some(&bound), Some(AxisRange::new(hi, lo)), Some(AxisRange::new(lo, hi)));
            prop_assert!(bound.contains(&r));
        }
    }

    #[test]
    fn resize_hits_exact_size(w in 1u32..64, h in 1u32..64) {
        let mut s = Shape::from_raster(Raster::filled(7, 3, Rgba::BLUE));
        s.resize(w, h).unwrap();
        prop_assert_eq!(s.size(), Size::new(w, h));
        prop_assert_eq!(s.raster().size(), Size::new(w, h));
    }

    #[test]
    fn item_tracks_cell(ops in proptest::collection::vec(op_strategy(), 1..30), size_rule in any::<bool>()) {
        // Size rules come first so the result does not depend on the item's
        // previous rectangle.
        let make_rules = || {
            let rules = if size_rule {
                Bindings::new().with(RectAttr::Height, RectAttr::Height)
            } else {
                Bindings::new().with(RectAttr::Size, AttrValue::Pair(4, 3))
            };
            rules.with(RectAttr::Anchor(Anchor::MidLeft), RectAttr::Anchor(Anchor::Center))
        };
        let mut cell: Cell = Cell::from_raster(Raster::filled(10, 10, Rgba::BLUE));
        cell.add_item(GameObject::from_raster(Raster::filled(4, 3, Rgba::RED)), Some(make_rules())).unwrap();
        let rules = make_rules();
        for op in ops {
            match op {
                Op::MoveBy(dx, dy) => { cell.move_by(dx, dy).unwrap(); }
                Op::MoveAt(x, y, a) => { cell.move_at((x, y), Anchor::ALL[a]).unwrap(); }
                Op::Resize(w, h) => cell.resize(w, h).unwrap(),
            }
            let item = cell.item().unwrap().rect();
            prop_assert_eq!(item, expected_item(Size::new(4, 1), cell.rect(), &rules));
        }
    }
}
