#![forbid(unsafe_code)]

//! Layout layer: tables of optional values, grids of entities tiled over a
//! rectangle, memory-game grids, and placement utilities.

pub mod grid;
pub mod memory;
pub mod placement;
pub mod table;

pub use grid::{Grid, GridConfig, ResizePolicy};
pub use memory::{CoverCell, MemoryGrid};
pub use placement::{
    check_collisions, compare_area, compare_attrs, distribute_rects, entities_collide_at, find_div,
    move_relative_to, position_relative_to, rect_relative_to, rects_collide_at,
};
pub use table::{Pos, Table};
