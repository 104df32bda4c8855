#![forbid(unsafe_code)]

//! Image objects that can reload their pixels before growing.
//!
//! Upscaling an already downscaled raster compounds quality loss. A
//! [`GenericObject`] with `reload_on_resize` set therefore rebuilds its
//! pixels before any resize that grows either dimension: from its
//! [`ImageSource`] through the decoder when it has one, otherwise from the
//! committed original raster.
//!
//! Every resize keeps an anchor point fixed (the centre unless told
//! otherwise).

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use tessel_core::{Anchor, Bounded, Dim, Point, Rect, Result, Size};
use tessel_render::{Drawable, ImageDecoder, ImageSource, Raster, ScaleConfig};

use crate::entity::Entity;
use crate::game_object::GameObject;
use crate::shape::Shape;

/// Default for [`ObjectConfig::reload_on_resize`].
pub const RELOAD_ON_RESIZE: bool = true;

/// Velocity given to new generic objects.
pub const DEFAULT_VELOCITY: (i32, i32) = (5, 7);

/// Per-object settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectConfig {
    pub reload_on_resize: bool,
    pub velocity: (i32, i32),
    pub scale: ScaleConfig,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            reload_on_resize: RELOAD_ON_RESIZE,
            velocity: DEFAULT_VELOCITY,
            scale: ScaleConfig::default(),
        }
    }
}

/// `size` scaled to `percent`%.
pub fn scaled_percent(size: Size, percent: u32) -> Size {
    let f = |v: u32| (v as u64 * percent as u64 / 100).min(u32::MAX as u64) as u32;
    Size::new(f(size.width), f(size.height))
}

/// `size` scaled so its `dim` becomes `percent`% of `reference`'s `dim`.
pub fn scaled_percent_from(size: Size, reference: Size, percent: u32, dim: Dim) -> Size {
    let target = scaled_percent(reference, percent);
    let length = match dim {
        Dim::Width => target.width,
        Dim::Height => target.height,
    };
    Rect::at((0, 0), size).scaled_to_length(length, dim)
}

/// A game object built from an image, optionally reloading on growth.
pub struct GenericObject {
    object: GameObject,
    source: Option<ImageSource>,
    decoder: Option<Rc<dyn ImageDecoder>>,
    config: ObjectConfig,
}

impl fmt::Debug for GenericObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericObject")
            .field("object", &self.object)
            .field("has_source", &self.source.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GenericObject {
    /// Object around `raster`, which also becomes the committed original.
    pub fn new(raster: Raster, config: ObjectConfig) -> Self {
        let shape = Shape::from_raster(raster).with_scale_config(config.scale);
        let (dx, dy) = config.velocity;
        Self {
            object: GameObject::new(shape).with_velocity(dx, dy),
            source: None,
            decoder: None,
            config,
        }
    }

    /// Decode `source` and keep both for later reloads.
    ///
    /// # Errors
    ///
    /// Whatever the decoder returns, unchanged.
    pub fn load(source: ImageSource, decoder: Rc<dyn ImageDecoder>, config: ObjectConfig) -> Result<Self> {
        let raster = decoder.decode(&source, None)?;
        let mut obj = Self::new(raster, config);
        obj.source = Some(source);
        obj.decoder = Some(decoder);
        Ok(obj)
    }

    pub fn config(&self) -> &ObjectConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn reload_on_resize(&self) -> bool {
        self.config.reload_on_resize
    }

    /// Switch reloading. Turning it on re-reads the source at the current
    /// size, dropping drawing done on the object since it was loaded.
    pub fn set_reload_on_resize(&mut self, on: bool) -> Result<()> {
        if on && self.source.is_some() {
            let size = self.object.size();
            self.reload(size)?;
        }
        self.config.reload_on_resize = on;
        Ok(())
    }

    fn reload(&mut self, size: Size) -> Result<()> {
        match (&self.source, &self.decoder) {
            (Some(source), Some(decoder)) => {
                let fresh = decoder.decode(source, Some(size))?;
                self.object.shape_mut().resize_from(&fresh, size.width, size.height)
            }
            _ => self.object.shape_mut().resize_from_original(size.width, size.height),
        }
    }

    /// Resize keeping `anchor` fixed. Growing with reloading on rebuilds the
    /// pixels from the source or original first.
    pub fn resize(&mut self, width: u32, height: u32, anchor: Anchor) -> Result<Rect> {
        let current = self.object.rect();
        let fixed = current.anchor(anchor);
        let grows = width > current.width || height > current.height;
        if self.config.reload_on_resize && grows {
            #[cfg(feature = "tracing")]
            tracing::trace!(width, height, "reloading before upscale");
            self.reload(Size::new(width, height))?;
        } else {
            self.object.resize(width, height)?;
        }
        Ok(self.object.move_at(fixed, anchor))
    }

    /// Move and resize to the largest same-aspect rectangle inside `target`.
    pub fn fit(&mut self, target: &Rect) -> Result<Rect> {
        let fitted = self.object.rect().fitted(target);
        self.resize(fitted.width, fitted.height, Anchor::TopLeft)?;
        Ok(self.object.move_at(fitted.topleft(), Anchor::TopLeft))
    }

    /// Scale to `percent`% of the current size.
    pub fn scale_percent(&mut self, percent: u32, anchor: Anchor) -> Result<Rect> {
        let s = scaled_percent(self.object.size(), percent);
        self.resize(s.width, s.height, anchor)
    }

    /// Resize to `percent`% of `reference`'s size, ignoring the own aspect.
    pub fn resize_percent_from(&mut self, reference: &Rect, percent: u32, anchor: Anchor) -> Result<Rect> {
        let s = scaled_percent(reference.size(), percent);
        self.resize(s.width, s.height, anchor)
    }

    /// Scale, keeping the aspect, so `dim` becomes `percent`% of
    /// `reference`'s `dim`.
    pub fn scale_percent_from(&mut self, reference: &Rect, percent: u32, dim: Dim, anchor: Anchor) -> Result<Rect> {
        let s = scaled_percent_from(self.object.size(), reference.size(), percent, dim);
        self.resize(s.width, s.height, anchor)
    }

    /// Scale, keeping the aspect, so `dim` becomes `length`.
    pub fn scale_from_dim(&mut self, length: u32, dim: Dim, anchor: Anchor) -> Result<Rect> {
        let s = self.object.rect().scaled_to_length(length, dim);
        self.resize(s.width, s.height, anchor)
    }

    pub fn into_inner(self) -> GameObject {
        self.object
    }
}

impl Deref for GenericObject {
    type Target = GameObject;

    fn deref(&self) -> &GameObject {
        &self.object
    }
}

impl DerefMut for GenericObject {
    fn deref_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }
}

impl PartialEq for GenericObject {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl Bounded for GenericObject {
    fn bounds(&self) -> Rect {
        self.object.rect()
    }
}

impl Drawable for GenericObject {
    fn with_raster(&self, f: &mut dyn FnMut(&Raster)) {
        self.object.with_raster(f)
    }
}

impl Entity for GenericObject {
    fn place(&mut self, topleft: Point) -> Result<()> {
        self.object.move_at(topleft, Anchor::TopLeft);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        GenericObject::resize(self, width, height, Anchor::TopLeft).map(|_| ())
    }

    fn fit_into(&mut self, target: &Rect) -> Result<Rect> {
        self.fit(target)
    }
}
