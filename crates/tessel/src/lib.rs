#![forbid(unsafe_code)]

//! Tessel public facade crate.
//!
//! Re-exports the geometry, raster, object and layout layers and offers a
//! prelude with the types most games touch.

// --- Core re-exports -------------------------------------------------------

pub use tessel_core::{Anchor, AttrValue, Bounded, Dim, Error, Point, Rect, RectAttr, Result, Size};

// --- Render re-exports -----------------------------------------------------

pub use tessel_render::{
    BlockTextRenderer, Board, BoardFlags, Dest, Drawable, FontSpec, HeadlessPresenter,
    ImageCrateDecoder, ImageDecoder, ImageSource, Presenter, Raster, Rgba, ScaleConfig,
    ScaleFilter, SharedRaster, TextRenderer,
};

// --- Object re-exports -----------------------------------------------------

pub use tessel_objects::{
    Action, ActionGroups, AxisRange, BindingRule, Bindings, Cell, CompareKey, Entity,
    GameObject, GenericObject, ImageFactory, MovingText, ObjectConfig, ObjectId, Shape, Surround,
    TextImage,
};

// --- Layout re-exports -----------------------------------------------------

pub use tessel_layout::{CoverCell, Grid, GridConfig, MemoryGrid, Pos, ResizePolicy, Table};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Anchor, Board, BoardFlags, Bounded, Cell, Drawable, Entity, Error, GameObject, Grid,
        Point, Raster, Rect, RectAttr, Result, Rgba, Size, Table,
    };

    pub use crate::{core, layout, objects, render};
}

pub use tessel_core as core;
pub use tessel_layout as layout;
pub use tessel_objects as objects;
pub use tessel_render as render;
