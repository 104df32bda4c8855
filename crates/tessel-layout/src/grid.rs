#![forbid(unsafe_code)]

//! Grids: tables of entities tiled over a rectangle.
//!
//! A [`Grid`] owns a [`Table`] of entities and the rectangle they tile.
//! The rectangle is split into `rows x cols` slots of
//! `(width / cols, height / rows)` pixels (truncating division), laid out
//! row-major from the grid's top-left corner. Any remainder is left as
//! slack on the right and bottom edges, so slots never leave the grid.
//!
//! # Invariants
//!
//! 1. After `arrange`, `rebuild`, `resize`, `move_by`, `move_at` or
//!    `shuffle`, every entity is centred in its slot.
//! 2. `arrange` is idempotent: it only moves, and always to the same place.
//! 3. `len() == rows * cols`, empty slots included.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Position outside the grid | `Error::OutOfRange` (panic through `Index`) |
//! | Fit/Stretch leaving a zero-size entity | `Error::InvalidArgument`, grid unchanged |

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;
use tessel_core::{Anchor, Bounded, Error, Point, Rect, Result, Size};
use tessel_objects::Entity;
use tessel_render::{Board, BoardFlags, Dest, Raster};

use crate::table::{Pos, Table};

/// How `rebuild` sizes each entity to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizePolicy {
    /// Largest same-aspect size inside the slot.
    #[default]
    Fit,
    /// Exactly the slot size.
    Stretch,
    /// Leave the size alone.
    Keep,
}

/// Grid settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridConfig {
    pub resize_policy: ResizePolicy,
}

/// A table of entities tiled over a rectangle.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    table: Table<T>,
    rect: Rect,
    config: GridConfig,
}

impl<T: Entity> Grid<T> {
    /// Empty `rows x cols` grid of `size` at the origin.
    pub fn new(rows: usize, cols: usize, size: Size) -> Self {
        Self {
            table: Table::new(rows, cols),
            rect: Rect::at((0, 0), size),
            config: GridConfig::default(),
        }
    }

    /// Grid over `table`, tiling `rect`. Nothing moves until `arrange`.
    pub fn from_table(table: Table<T>, rect: Rect) -> Self {
        Self {
            table,
            rect,
            config: GridConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Full `rows x cols` grid with `cell_size` slots, one entity per
    /// position from `factory`, sized by the configured policy.
    pub fn build(
        rows: usize,
        cols: usize,
        cell_size: Size,
        config: GridConfig,
        mut factory: impl FnMut(Pos) -> Result<T>,
    ) -> Result<Self> {
        let span = |n: usize, len: u32| {
            u32::try_from(n)
                .ok()
                .and_then(|n| n.checked_mul(len))
                .ok_or_else(|| Error::invalid(format!("grid of {n} slots of {len}px overflows")))
        };
        let size = Size::new(span(cols, cell_size.width)?, span(rows, cell_size.height)?);
        let mut grid = Self::new(rows, cols, size).with_config(config);
        for pos in grid.table.positions() {
            grid.table.set(pos, Some(factory(pos)?))?;
        }
        grid.rebuild(None)?;
        Ok(grid)
    }

    // --- Accessors ----------------------------------------------------

    /// `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        self.table.dims()
    }

    /// Number of positions, empty or not.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn size(&self) -> Size {
        self.rect.size()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn table(&self) -> &Table<T> {
        &self.table
    }

    /// Mutable table access. Call [`Grid::arrange`] afterwards to restore
    /// the tiling.
    pub fn table_mut(&mut self) -> &mut Table<T> {
        &mut self.table
    }

    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    pub fn get(&self, pos: Pos) -> Result<Option<&T>> {
        self.table.get(pos)
    }

    pub fn get_mut(&mut self, pos: Pos) -> Result<Option<&mut T>> {
        self.table.get_mut(pos)
    }

    /// Store `value` at `pos` and centre it in its slot.
    pub fn set(&mut self, pos: Pos, value: Option<T>) -> Result<Option<T>> {
        let slot = self.slot(pos)?;
        let old = self.table.set(pos, value)?;
        if let Some(entity) = self.table.get_mut(pos)? {
            entity.place_at(slot.center(), Anchor::Center)?;
        }
        Ok(old)
    }

    pub fn take(&mut self, pos: Pos) -> Result<Option<T>> {
        self.table.take(pos)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.table.values()
    }

    /// Positions whose entity equals `value`.
    pub fn positions<V: ?Sized>(&self, value: &V) -> Vec<Pos>
    where
        T: PartialEq<V>,
    {
        self.table.positions_of(value)
    }

    pub fn contains<V: ?Sized>(&self, value: &V) -> bool
    where
        T: PartialEq<V>,
    {
        self.table.contains(value)
    }

    // --- Tiling -------------------------------------------------------

    /// Slot size: `(width / cols, height / rows)`, zero for a dimension
    /// with no slots.
    pub fn slot_size(&self) -> Size {
        let (rows, cols) = self.table.dims();
        let per = |len: u32, n: usize| match u32::try_from(n) {
            Ok(0) => 0,
            Ok(n) => len / n,
            Err(_) => 0,
        };
        Size::new(per(self.rect.width, cols), per(self.rect.height, rows))
    }

    /// Rectangle of the slot at `pos`.
    pub fn slot(&self, pos: Pos) -> Result<Rect> {
        self.table.get(pos)?;
        let s = self.slot_size();
        let x = self.rect.x as i64 + pos.1 as i64 * s.width as i64;
        let y = self.rect.y as i64 + pos.0 as i64 * s.height as i64;
        Ok(Rect::new(saturate(x), saturate(y), s.width, s.height))
    }

    /// Centre every entity in its slot.
    pub fn arrange(&mut self) -> Result<()> {
        tessel_core::trace!(rect = %self.rect, dims = ?self.table.dims(), "arranging grid");
        let slots = self.slots();
        for ((_, slot), rect) in self.table.items_mut().zip(slots) {
            if let Some(entity) = slot {
                entity.place_at(rect.center(), Anchor::Center)?;
            }
        }
        Ok(())
    }

    /// Size every entity to its slot with `policy` (the configured one when
    /// `None`), then arrange.
    ///
    /// # Errors
    ///
    /// `InvalidArgument`, before anything changes, when `Fit` or `Stretch`
    /// would leave an entity with a zero dimension.
    pub fn rebuild(&mut self, policy: Option<ResizePolicy>) -> Result<()> {
        let policy = policy.unwrap_or(self.config.resize_policy);
        let s = self.slot_size();
        let target = Rect::at((0, 0), s);
        for entity in self.table.values() {
            let size = match policy {
                ResizePolicy::Fit => entity.bounds().fitted(&target).size(),
                ResizePolicy::Stretch => s,
                ResizePolicy::Keep => break,
            };
            if size.is_empty() {
                return Err(Error::invalid(format!(
                    "{policy:?} into {}x{} slots leaves a {}x{} entity",
                    s.width, s.height, size.width, size.height
                )));
            }
        }
        for entity in self.table.values_mut() {
            match policy {
                ResizePolicy::Fit => {
                    entity.fit_into(&target)?;
                }
                ResizePolicy::Stretch => entity.resize(s.width, s.height)?,
                ResizePolicy::Keep => {}
            }
        }
        self.arrange()
    }

    /// Resize the grid to `width x height` and rebuild its entities.
    ///
    /// On error the grid keeps its previous rectangle and tiling.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        tessel_core::trace!(width, height, "resizing grid");
        let previous = self.rect;
        self.rect.width = width;
        self.rect.height = height;
        if let Err(err) = self.rebuild(None) {
            self.rect = previous;
            self.arrange()?;
            return Err(err);
        }
        Ok(())
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) -> Result<Rect> {
        self.rect.move_by(dx, dy);
        self.arrange()?;
        Ok(self.rect)
    }

    pub fn move_at(&mut self, point: impl Into<Point>, anchor: Anchor) -> Result<Rect> {
        self.rect.move_at(point, anchor);
        self.arrange()?;
        Ok(self.rect)
    }

    /// Fill empty positions in order with `objects` (every position when
    /// `overwrite` is set) and arrange. Returns the objects that did not
    /// fit, in their original order.
    pub fn add<I>(&mut self, objects: I, overwrite: bool) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut objects = objects.into_iter();
        for (_, slot) in self.table.items_mut() {
            if slot.is_none() || overwrite {
                match objects.next() {
                    Some(obj) => *slot = Some(obj),
                    None => break,
                }
            }
        }
        let leftover = objects.collect();
        self.arrange()?;
        Ok(leftover)
    }

    /// Uniformly permute every position, then arrange.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.table.shuffle(rng);
        self.arrange()
    }

    // --- Drawing ------------------------------------------------------

    /// Paint every entity on `board`. Returns the touched regions,
    /// row-major, skipping empty positions.
    pub fn draw_on(&self, board: &mut Board) -> Result<Vec<Rect>> {
        self.table.values().map(|e| e.paint(board)).collect()
    }

    /// Composite every entity's raster into a transparent raster the size
    /// of the grid.
    pub fn render(&self) -> Result<Raster> {
        let mut board = Board::new(self.rect.width, self.rect.height, BoardFlags::SRC_ALPHA);
        for entity in self.table.values() {
            let at = entity.bounds().topleft();
            let local = Point::new(at.x.saturating_sub(self.rect.x), at.y.saturating_sub(self.rect.y));
            board.draw(entity, Some(Dest::At(local)), None)?;
        }
        Ok(board.surface())
    }

    fn slots(&self) -> Vec<Rect> {
        let s = self.slot_size();
        self.table
            .positions()
            .map(|(r, c)| {
                let x = self.rect.x as i64 + c as i64 * s.width as i64;
                let y = self.rect.y as i64 + r as i64 * s.height as i64;
                Rect::new(saturate(x), saturate(y), s.width, s.height)
            })
            .collect()
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl<T> Bounded for Grid<T> {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl<T> Index<Pos> for Grid<T> {
    type Output = Option<T>;

    fn index(&self, pos: Pos) -> &Option<T> {
        &self.table[pos]
    }
}

impl<T> IndexMut<Pos> for Grid<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut Option<T> {
        &mut self.table[pos]
    }
}

impl<T: PartialEq> PartialEq for Grid<T> {
    /// Grids compare by content, not position.
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl<T> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.table.dims();
        write!(f, "Grid ({rows}, {cols}) at {}", self.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tessel_objects::GameObject;
    use tessel_render::Rgba;

    fn block(w: u32, h: u32) -> GameObject {
        GameObject::from_raster(Raster::filled(w, h, Rgba::RED))
    }

    fn built(policy: ResizePolicy) -> Grid<GameObject> {
        let config = GridConfig { resize_policy: policy };
        Grid::build(3, 5, Size::new(12, 10), config, |(r, c)| Ok(block(4, 4).with_key((r * 5 + c) as i64))).unwrap()
    }

    #[test]
    fn build_sizes_grid_from_cells() {
        let g = built(ResizePolicy::Stretch);
        assert_eq!(g.size(), Size::new(60, 30));
        assert_eq!(g.len(), 15);
        assert_eq!(g.dims(), (3, 5));
        let e = g[(2, 4)].as_ref().unwrap();
        assert_eq!(e.rect(), Rect::new(48, 20, 12, 10));
    }

    #[test]
    fn fit_policy_centres_squares() {
        let g = built(ResizePolicy::Fit);
        let e = g.get((0, 1)).unwrap().unwrap();
        assert_eq!(e.rect(), Rect::new(13, 0, 10, 10));
    }

    #[test]
    fn arrange_is_idempotent() {
        let mut g = built(ResizePolicy::Fit);
        let before: Vec<Rect> = g.values().map(|e| e.rect()).collect();
        g.arrange().unwrap();
        g.arrange().unwrap();
        let after: Vec<Rect> = g.values().map(|e| e.rect()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn resize_truncates_and_leaves_slack() {
        let mut g = built(ResizePolicy::Stretch);
        g.resize(62, 31).unwrap();
        assert_eq!(g.slot_size(), Size::new(12, 10));
        for e in g.values() {
            assert!(g.rect().contains(&e.rect()));
        }
        g.resize(100, 60).unwrap();
        assert_eq!(g.get((1, 1)).unwrap().unwrap().rect(), Rect::new(20, 20, 20, 20));
    }

    #[test]
    fn failed_resize_leaves_grid_untouched() {
        for (policy, w, h) in [(ResizePolicy::Fit, 4, 30), (ResizePolicy::Stretch, 60, 2)] {
            let mut g = built(policy);
            let rect = g.rect();
            let before: Vec<Rect> = g.values().map(|e| e.rect()).collect();
            assert!(g.resize(w, h).unwrap_err().is_invalid_argument());
            assert_eq!(g.rect(), rect);
            let after: Vec<Rect> = g.values().map(|e| e.rect()).collect();
            assert_eq!(after, before);
        }
    }

    #[test]
    fn keep_policy_tolerates_empty_slots() {
        let mut g = built(ResizePolicy::Keep);
        g.resize(4, 2).unwrap();
        assert_eq!(g.slot_size(), Size::new(0, 0));
    }

    #[test]
    fn move_retiles() {
        let mut g = built(ResizePolicy::Stretch);
        g.move_at((100, 100), Anchor::TopLeft).unwrap();
        assert_eq!(g.get((0, 0)).unwrap().unwrap().rect().topleft(), Point::new(100, 100));
        g.move_by(-10, 5).unwrap();
        assert_eq!(g.get((1, 2)).unwrap().unwrap().rect().topleft(), Point::new(114, 115));
    }

    #[test]
    fn add_fills_free_then_returns_leftovers() {
        let mut g: Grid<GameObject> = Grid::new(2, 2, Size::new(20, 20));
        g.set((0, 1), Some(block(2, 2).with_key(99i64))).unwrap();
        let left = g.add((0..5).map(|i| block(2, 2).with_key(i as i64)), false).unwrap();
        assert_eq!(left.len(), 2);
        assert!(left[0] == 3i64 && left[1] == 4i64);
        assert_eq!(g.positions(&99i64), vec![(0, 1)]);
        assert!(g.contains(&2i64));
        let left = g.add((10..12).map(|i| block(2, 2).with_key(i as i64)), true).unwrap();
        assert!(left.is_empty());
        assert_eq!(g.positions(&11i64), vec![(0, 1)]);
    }

    #[test]
    fn shuffle_keeps_every_entity_and_the_tiling() {
        let mut g = built(ResizePolicy::Stretch);
        g.shuffle(&mut StdRng::seed_from_u64(3)).unwrap();
        let mut keys: Vec<i64> = (0..15).filter(|k| g.contains(k)).collect();
        keys.sort_unstable();
        assert_eq!(keys.len(), 15);
        for pos in g.table().positions() {
            let slot = g.slot(pos).unwrap();
            assert_eq!(g.get(pos).unwrap().unwrap().rect(), slot);
        }
    }

    #[test]
    fn out_of_range_positions() {
        let g = built(ResizePolicy::Keep);
        assert!(g.slot((3, 0)).unwrap_err().is_out_of_range());
        assert!(g.get((0, 5)).unwrap_err().is_out_of_range());
    }

    #[test]
    fn render_composites_in_local_coordinates() {
        let mut g = built(ResizePolicy::Stretch);
        g.move_at((500, 500), Anchor::TopLeft).unwrap();
        let r = g.render().unwrap();
        assert_eq!(r.size(), Size::new(60, 30));
        assert_eq!(r.at((59, 29)).unwrap(), Rgba::RED);
        let mut board = Board::new(600, 600, BoardFlags::empty());
        let touched = g.draw_on(&mut board).unwrap();
        assert_eq!(touched.len(), 15);
        assert_eq!(board.raster().at((530, 515)).unwrap(), Rgba::RED);
    }

    #[test]
    fn display_names_dims() {
        let g: Grid<GameObject> = Grid::new(2, 3, Size::new(6, 4));
        assert_eq!(g.to_string(), "Grid (2, 3) at <rect(0, 0, 6, 4)>");
    }
}
