#![forbid(unsafe_code)]

//! Rows x columns keyed storage.
//!
//! A [`Table`] maps every `(row, col)` position to an `Option<T>`, `None`
//! being the empty marker. Iteration is always row-major.
//!
//! # Invariants
//!
//! 1. Every position in `[0, rows) x [0, cols)` holds a slot.
//! 2. `is_full()` holds iff no slot is empty.
//! 3. The transforms (`rotated`, `reflected_h`, `reflected_v`,
//!    `transposed`) return new tables and never touch the source.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `get`/`set`/`take`/`diagonal` outside the table | `Error::OutOfRange` |
//! | `table[pos]` outside the table | panic, like slice indexing |

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;
use rand::seq::SliceRandom;
use tessel_core::{Error, Result};

/// A `(row, col)` position.
pub type Pos = (usize, usize);

/// Fixed-size row-major table of optional values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table<T> {
    rows: usize,
    cols: usize,
    cells: Vec<Option<T>>,
}

impl<T> Table<T> {
    /// All-empty table.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        cells.resize_with(rows * cols, || None);
        Self { rows, cols, cells }
    }

    /// Fill row-major from `seq` until it runs out or yields an empty
    /// value; every later position stays empty. Extra values are dropped.
    pub fn from_seq<I>(rows: usize, cols: usize, seq: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let mut table = Self::new(rows, cols);
        for (slot, value) in table.cells.iter_mut().zip(seq.into_iter().map_while(|v| v)) {
            *slot = Some(value);
        }
        table
    }

    /// Fill row-major from `values`.
    pub fn from_values<I>(rows: usize, cols: usize, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_seq(rows, cols, values.into_iter().map(Some))
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of positions, empty or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn offset(&self, (row, col): Pos) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    fn checked(&self, pos: Pos) -> Result<usize> {
        self.offset(pos).ok_or_else(|| {
            Error::out_of_range(format!("position {pos:?} outside {}x{} table", self.rows, self.cols))
        })
    }

    /// Slot at `pos`.
    pub fn get(&self, pos: Pos) -> Result<Option<&T>> {
        let i = self.checked(pos)?;
        Ok(self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, pos: Pos) -> Result<Option<&mut T>> {
        let i = self.checked(pos)?;
        Ok(self.cells[i].as_mut())
    }

    /// Store `value` at `pos`, returning what was there.
    pub fn set(&mut self, pos: Pos, value: Option<T>) -> Result<Option<T>> {
        let i = self.checked(pos)?;
        Ok(std::mem::replace(&mut self.cells[i], value))
    }

    /// Empty `pos`, returning what was there.
    pub fn take(&mut self, pos: Pos) -> Result<Option<T>> {
        self.set(pos, None)
    }

    /// Every position, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<T> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
    }

    /// Every slot, row-major.
    pub fn iter(&self) -> impl Iterator<Item = &Option<T>> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Option<T>> {
        self.cells.iter_mut()
    }

    /// `(position, slot)` pairs, row-major.
    pub fn items(&self) -> impl Iterator<Item = (Pos, &Option<T>)> {
        self.positions().zip(self.cells.iter())
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = (Pos, &mut Option<T>)> {
        self.positions().zip(self.cells.iter_mut())
    }

    /// Non-empty values, row-major.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.cells.iter().flatten()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Empty positions, row-major.
    pub fn free(&self) -> Vec<Pos> {
        self.items().filter(|(_, v)| v.is_none()).map(|(p, _)| p).collect()
    }

    /// Positions whose value equals `value`.
    pub fn positions_of<V: ?Sized>(&self, value: &V) -> Vec<Pos>
    where
        T: PartialEq<V>,
    {
        self.items()
            .filter(|(_, v)| v.as_ref().is_some_and(|v| v == value))
            .map(|(p, _)| p)
            .collect()
    }

    /// True if some value equals `value`.
    pub fn contains<V: ?Sized>(&self, value: &V) -> bool
    where
        T: PartialEq<V>,
    {
        self.values().any(|v| v == value)
    }

    /// Rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<T>]> {
        // chunks(0) panics; a zero-column table has no rows to show.
        self.cells.chunks(self.cols.max(1))
    }

    /// Columns, top to bottom.
    pub fn columns(&self) -> Vec<Vec<&Option<T>>> {
        (0..self.cols)
            .map(|c| (0..self.rows).map(|r| &self.cells[r * self.cols + c]).collect())
            .collect()
    }

    /// Slots from `(row, col)` stepping down-right, or down-left when
    /// `topright` is set, until either axis leaves the table.
    pub fn diagonal(&self, row: usize, col: usize, topright: bool) -> Result<Vec<&Option<T>>> {
        self.checked((row, col))?;
        let steps = if topright {
            (self.rows - row).min(col + 1)
        } else {
            (self.rows - row).min(self.cols - col)
        };
        Ok((0..steps)
            .map(|k| {
                let c = if topright { col - k } else { col + k };
                &self.cells[(row + k) * self.cols + c]
            })
            .collect())
    }

    /// Diagonal from the top-left corner. Empty for an empty table.
    pub fn major_diagonal(&self) -> Vec<&Option<T>> {
        self.diagonal(0, 0, false).unwrap_or_default()
    }

    /// Diagonal from the top-right corner. Empty for an empty table.
    pub fn minor_diagonal(&self) -> Vec<&Option<T>> {
        match self.cols.checked_sub(1) {
            Some(last) => self.diagonal(0, last, true).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Uniformly permute all slots, empty ones included.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cells.shuffle(rng);
    }

    fn remap(&self, rows: usize, cols: usize, source: impl Fn(usize, usize) -> usize) -> Self
    where
        T: Clone,
    {
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| self.cells[source(r, c)].clone())
            .collect();
        Self { rows, cols, cells }
    }

    /// Copy turned a quarter clockwise: `cols x rows`, the first row being
    /// the first column read bottom to top.
    pub fn rotated(&self) -> Self
    where
        T: Clone,
    {
        let (rows, cols) = (self.rows, self.cols);
        self.remap(cols, rows, |r, c| (rows - 1 - c) * cols + r)
    }

    /// Copy with every row reversed.
    pub fn reflected_h(&self) -> Self
    where
        T: Clone,
    {
        let cols = self.cols;
        self.remap(self.rows, cols, |r, c| r * cols + (cols - 1 - c))
    }

    /// Copy with the row order reversed.
    pub fn reflected_v(&self) -> Self
    where
        T: Clone,
    {
        let (rows, cols) = (self.rows, self.cols);
        self.remap(rows, cols, |r, c| (rows - 1 - r) * cols + c)
    }

    /// Copy with rows and columns swapped.
    pub fn transposed(&self) -> Self
    where
        T: Clone,
    {
        let cols = self.cols;
        self.remap(cols, self.rows, |r, c| c * cols + r)
    }
}

impl<T> Index<Pos> for Table<T> {
    type Output = Option<T>;

    fn index(&self, pos: Pos) -> &Option<T> {
        match self.offset(pos) {
            Some(i) => &self.cells[i],
            None => panic!("position {pos:?} outside {}x{} table", self.rows, self.cols),
        }
    }
}

impl<T> IndexMut<Pos> for Table<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut Option<T> {
        match self.offset(pos) {
            Some(i) => &mut self.cells[i],
            None => panic!("position {pos:?} outside {}x{} table", self.rows, self.cols),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Table<T> {
    /// One line per row, values separated by spaces, `-` for empty slots.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, slot) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(" ")?;
                }
                match slot {
                    Some(v) => write!(f, "{v}")?,
                    None => f.write_str("-")?,
                }
            }
        }
        Ok(())
    }
}
