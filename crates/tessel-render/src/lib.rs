#![forbid(unsafe_code)]

//! Raster layer: pixel buffers, scaling, compositing boards, and the
//! collaborator seams (decode, text, present).

pub mod board;
pub mod collab;
pub mod color;
pub mod raster;
pub mod scale;
pub mod transform;

pub use board::{Board, BoardFlags, Dest, Drawable};
pub use collab::{
    BlockTextRenderer, FontSpec, HeadlessPresenter, ImageCrateDecoder, ImageDecoder, ImageSource,
    Presenter, TextRenderer,
};
pub use color::Rgba;
pub use raster::{Raster, SharedRaster};
pub use scale::{ScaleConfig, ScaleFilter};
