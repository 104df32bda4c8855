#![forbid(unsafe_code)]

//! External collaborators: image decoding, text rendering, presentation.
//!
//! The object layer only sees the three traits. Stock implementations:
//!
//! - [`ImageCrateDecoder`] decodes PNG/GIF/JPEG through the `image` crate.
//! - [`BlockTextRenderer`] draws one solid box per visible character, which
//!   is deterministic and needs no font files.
//! - [`HeadlessPresenter`] records what it was asked to present.
//!
//! Collaborator failures surface as [`Error::Resource`] carrying the
//! underlying error unchanged.

use std::path::PathBuf;

use tessel_core::{Error, Rect, Result, Size};

use crate::color::Rgba;
use crate::raster::Raster;
use crate::scale::{self, ScaleConfig};

// ---------------------------------------------------------------------------
// Image decoding
// ---------------------------------------------------------------------------

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded bytes held in memory.
    Bytes(Vec<u8>),
    /// A file on disk.
    Path(PathBuf),
    /// Already decoded pixels.
    Raster(Raster),
}

impl From<Raster> for ImageSource {
    fn from(r: Raster) -> Self {
        ImageSource::Raster(r)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(p: &std::path::Path) -> Self {
        ImageSource::Path(p.to_path_buf())
    }
}

/// Decode an image resource into a raster.
pub trait ImageDecoder {
    /// Decode `source`, rescaled to `target` when given.
    fn decode(&self, source: &ImageSource, target: Option<Size>) -> Result<Raster>;
}

/// [`ImageDecoder`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder {
    pub scale: ScaleConfig,
}

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_raster(image: image::DynamicImage) -> Result<Raster> {
        let rgba = image.to_rgba8();
        Raster::from_rgba8(rgba.width(), rgba.height(), rgba.as_raw())
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, source: &ImageSource, target: Option<Size>) -> Result<Raster> {
        let raster = match source {
            ImageSource::Bytes(bytes) => {
                Self::to_raster(image::load_from_memory(bytes).map_err(Error::resource)?)?
            }
            ImageSource::Path(path) => {
                Self::to_raster(image::open(path).map_err(Error::resource)?)?
            }
            ImageSource::Raster(r) => r.clone(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            width = raster.width(),
            height = raster.height(),
            "decoded image"
        );
        Ok(match target {
            Some(size) => scale::scale(&raster, size.width, size.height, &self.scale),
            None => raster,
        })
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Font selection: a family or file name plus a pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub name: String,
    pub size: u32,
}

impl FontSpec {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Rasterize text.
pub trait TextRenderer {
    /// Pixel size `text` would occupy in `font`.
    fn measure(&self, text: &str, font: &FontSpec) -> Result<Size>;

    /// Render `text` in `fg` over `bg` (transparent when `None`).
    fn render(&self, text: &str, font: &FontSpec, fg: Rgba, bg: Option<Rgba>) -> Result<Raster>;
}

/// Headless renderer drawing each non-space character as a solid box.
///
/// A glyph cell is `max(1, size * 3 / 5)` wide and `size` tall; the box
/// leaves a one-pixel margin when the cell is large enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTextRenderer;

impl BlockTextRenderer {
    fn cell(font: &FontSpec) -> Result<Size> {
        if font.size == 0 {
            return Err(Error::invalid(format!("font {:?} has size 0", font.name)));
        }
        Ok(Size::new((font.size * 3 / 5).max(1), font.size))
    }
}

impl TextRenderer for BlockTextRenderer {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<Size> {
        let cell = Self::cell(font)?;
        let n = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        Ok(Size::new(cell.width.saturating_mul(n), cell.height))
    }

    fn render(&self, text: &str, font: &FontSpec, fg: Rgba, bg: Option<Rgba>) -> Result<Raster> {
        let cell = Self::cell(font)?;
        let size = self.measure(text, font)?;
        let mut out = Raster::filled(size.width, size.height, bg.unwrap_or(Rgba::TRANSPARENT));
        let margin = u32::from(cell.width > 2 && cell.height > 2);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = (i as u64 * cell.width as u64).min(i32::MAX as u64) as i32;
            let glyph = Rect::new(
                x.saturating_add(margin as i32),
                margin as i32,
                cell.width - 2 * margin,
                cell.height - 2 * margin,
            );
            out.fill_rect(glyph, fg);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Push a raster to some output.
pub trait Presenter {
    /// Present `raster`; `area` limits the update to a region.
    fn present(&mut self, raster: &Raster, area: Option<Rect>) -> Result<()>;
}

/// Presenter that records calls instead of drawing anywhere.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPresenter {
    updates: Vec<Option<Rect>>,
    last_size: Option<Size>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Areas passed to every `present` call so far.
    pub fn updates(&self) -> &[Option<Rect>] {
        &self.updates
    }

    /// Size of the last presented raster.
    pub fn last_size(&self) -> Option<Size> {
        self.last_size
    }
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, raster: &Raster, area: Option<Rect>) -> Result<()> {
        self.updates.push(area);
        self.last_size = Some(raster.size());
        Ok(())
    }
}
