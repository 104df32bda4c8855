#![forbid(unsafe_code)]

//! Memory-game grids: every cell starts hidden under a shared cover.

use std::ops::{Deref, DerefMut};

use tessel_core::{Bounded, Error, Point, Rect, Result, Size};
use tessel_objects::{Entity, Shape};
use tessel_render::{Board, Dest, Drawable, Raster};

use crate::grid::{Grid, GridConfig};
use crate::table::Pos;

/// An entity with a covered flag. Covered by default.
#[derive(Debug, Clone)]
pub struct CoverCell<T> {
    entity: T,
    covered: bool,
}

impl<T> CoverCell<T> {
    pub fn new(entity: T) -> Self {
        Self { entity, covered: true }
    }

    #[inline]
    pub fn covered(&self) -> bool {
        self.covered
    }

    pub fn set_covered(&mut self, covered: bool) {
        self.covered = covered;
    }

    /// Flip the flag. Returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.covered = !self.covered;
        self.covered
    }

    pub fn into_inner(self) -> T {
        self.entity
    }
}

impl<T> Deref for CoverCell<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}

impl<T> DerefMut for CoverCell<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.entity
    }
}

impl<T, V: ?Sized> PartialEq<V> for CoverCell<T>
where
    T: PartialEq<V>,
{
    fn eq(&self, other: &V) -> bool {
        self.entity == *other
    }
}

impl<T: Bounded> Bounded for CoverCell<T> {
    fn bounds(&self) -> Rect {
        self.entity.bounds()
    }
}

impl<T: Drawable> Drawable for CoverCell<T> {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        self.entity.with_raster(f)
    }
}

impl<T: Entity> Entity for CoverCell<T> {
    fn place(&mut self, topleft: Point) -> Result<()> {
        self.entity.place(topleft)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.entity.resize(width, height)
    }
}

/// A full grid of [`CoverCell`]s sharing one cover raster.
#[derive(Debug, Clone)]
pub struct MemoryGrid<T> {
    grid: Grid<CoverCell<T>>,
    cover: Option<Shape>,
}

impl<T: Entity> MemoryGrid<T> {
    /// Build a full `rows x cols` grid of covered cells from `factory`.
    pub fn new(
        rows: usize,
        cols: usize,
        cell_size: Size,
        config: GridConfig,
        mut factory: impl FnMut(Pos) -> Result<T>,
    ) -> Result<Self> {
        let grid = Grid::build(rows, cols, cell_size, config, |pos| factory(pos).map(CoverCell::new))?;
        Ok(Self { grid, cover: None })
    }

    /// Set the cover, resized to the first cell's size when there is one.
    pub fn set_cover(&mut self, raster: Raster) -> Result<()> {
        let mut cover = Shape::from_raster(raster);
        if let Some(first) = self.grid.get((0, 0))? {
            let size = first.bounds().size();
            cover.resize(size.width, size.height)?;
        }
        self.cover = Some(cover);
        Ok(())
    }

    pub fn cover(&self) -> Option<&Shape> {
        self.cover.as_ref()
    }

    /// Flip the covered flag at `pos`. Returns the new value.
    pub fn toggle(&mut self, pos: Pos) -> Result<bool> {
        self.grid
            .get_mut(pos)?
            .map(CoverCell::toggle)
            .ok_or_else(|| Error::precondition(format!("no cell at {pos:?}")))
    }

    /// Whether every cell has been uncovered.
    pub fn all_uncovered(&self) -> bool {
        self.grid.values().all(|c| !c.covered())
    }

    /// Blit the cover over the cells at `cells` (every cell when `None`).
    /// Returns the touched regions.
    ///
    /// # Errors
    ///
    /// `Precondition` when no cover is set, `OutOfRange` for a bad position.
    pub fn draw_on_covered(&self, board: &mut Board, cells: Option<&[Pos]>) -> Result<Vec<Rect>> {
        let cover = self
            .cover
            .as_ref()
            .ok_or_else(|| Error::precondition("memory grid has no cover"))?;
        let targets: Vec<Rect> = match cells {
            Some(cells) => cells
                .iter()
                .map(|&pos| Ok(self.grid.get(pos)?.map(Bounded::bounds)))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect(),
            None => self.grid.values().map(Bounded::bounds).collect(),
        };
        targets
            .into_iter()
            .map(|r| board.draw(cover, Some(Dest::At(r.topleft())), None))
            .collect()
    }

    /// Draw covered cells as the cover and uncovered ones as themselves.
    /// Without a cover every cell is drawn as itself.
    pub fn draw_on(&self, board: &mut Board) -> Result<Vec<Rect>> {
        self.grid
            .values()
            .map(|cell| match &self.cover {
                Some(cover) if cell.covered() => {
                    board.draw(cover, Some(Dest::At(cell.bounds().topleft())), None)
                }
                _ => cell.paint(board),
            })
            .collect()
    }

    pub fn into_grid(self) -> Grid<CoverCell<T>> {
        self.grid
    }
}

impl<T> Deref for MemoryGrid<T> {
    type Target = Grid<CoverCell<T>>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

impl<T> DerefMut for MemoryGrid<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.grid
    }
}
