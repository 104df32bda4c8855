#![forbid(unsafe_code)]

//! Raster scaling.
//!
//! [`scale`] tries a smooth resampler first (the `image` crate's
//! `imageops::resize`) and falls back to nearest-neighbour when the smooth
//! path refuses the input. The fallback is deterministic: the same input
//! always takes the same path.
//!
//! The smooth path refuses:
//! - an empty source or an empty target,
//! - a per-axis scale factor above [`ScaleConfig::max_factor`].

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tessel_core::{Error, Result};

use crate::color::Rgba;
use crate::raster::Raster;

/// Default cap on the per-axis growth factor of the smooth scaler.
pub const DEFAULT_MAX_FACTOR: u32 = 4096;

/// Resampling filter of the smooth scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ScaleFilter> for FilterType {
    fn from(f: ScaleFilter) -> Self {
        match f {
            ScaleFilter::Nearest => FilterType::Nearest,
            ScaleFilter::Triangle => FilterType::Triangle,
            ScaleFilter::CatmullRom => FilterType::CatmullRom,
            ScaleFilter::Gaussian => FilterType::Gaussian,
            ScaleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Smooth scaler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleConfig {
    pub filter: ScaleFilter,
    /// Largest accepted `target / source` ratio on either axis.
    pub max_factor: u32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            filter: ScaleFilter::default(),
            max_factor: DEFAULT_MAX_FACTOR,
        }
    }
}

/// Resample with the configured smooth filter.
///
/// # Errors
///
/// `InvalidArgument` when the source or target is empty or the growth factor
/// exceeds `config.max_factor`.
pub fn smooth(src: &Raster, width: u32, height: u32, config: &ScaleConfig) -> Result<Raster> {
    if src.is_empty() || width == 0 || height == 0 {
        return Err(Error::invalid(format!(
            "smooth scale needs non-empty rasters ({}x{} -> {width}x{height})",
            src.width(),
            src.height()
        )));
    }
    let limit = config.max_factor as u64;
    if width as u64 > src.width() as u64 * limit || height as u64 > src.height() as u64 * limit {
        return Err(Error::invalid(format!(
            "scale factor above {} ({}x{} -> {width}x{height})",
            config.max_factor,
            src.width(),
            src.height()
        )));
    }
    let image = RgbaImage::from_raw(src.width(), src.height(), src.to_rgba8())
        .ok_or_else(|| Error::invalid("raster size does not match its pixel data"))?;
    let resized = imageops::resize(&image, width, height, config.filter.into());
    let mut out = Raster::from_rgba8(width, height, resized.as_raw())?;
    out.set_alpha(src.alpha());
    Ok(out)
}

/// Nearest-neighbour resample. An empty source yields a transparent raster.
pub fn nearest(src: &Raster, width: u32, height: u32) -> Raster {
    if src.is_empty() {
        let mut out = Raster::new(width, height);
        out.set_alpha(src.alpha());
        return out;
    }
    let (sw, sh) = (src.width() as u64, src.height() as u64);
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as u64 {
        let sy = (y * sh / height as u64) as i32;
        for x in 0..width as u64 {
            let sx = (x * sw / width as u64) as i32;
            pixels.push(src.get(sx, sy).unwrap_or(Rgba::TRANSPARENT));
        }
    }
    let mut out = Raster::from_pixels(width, height, pixels).unwrap_or_default();
    out.set_alpha(src.alpha());
    out
}

/// Resample to `width x height`, smooth first, nearest-neighbour on failure.
pub fn scale(src: &Raster, width: u32, height: u32, config: &ScaleConfig) -> Raster {
    if src.width() == width && src.height() == height {
        return src.clone();
    }
    match smooth(src, width, height, config) {
        Ok(out) => out,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                error = %_err,
                from_w = src.width(),
                from_h = src.height(),
                width,
                height,
                "smooth scale refused, using nearest neighbour"
            );
            nearest(src, width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_hits_requested_size() {
        let src = Raster::filled(5, 3, Rgba::RED);
        let out = scale(&src, 12, 7, &ScaleConfig::default());
        assert_eq!((out.width(), out.height()), (12, 7));
        assert_eq!(out.at((11, 6)).unwrap(), Rgba::RED);
    }

    #[test]
    fn empty_source_falls_back() {
        let src = Raster::new(0, 0);
        assert!(smooth(&src, 4, 4, &ScaleConfig::default()).is_err());
        let out = scale(&src, 4, 4, &ScaleConfig::default());
        assert_eq!(out.size(), tessel_core::Size::new(4, 4));
        assert!(out.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn factor_cap_forces_nearest() {
        let src = Raster::filled(1, 1, Rgba::GREEN);
        let config = ScaleConfig {
            max_factor: 2,
            ..ScaleConfig::default()
        };
        assert!(smooth(&src, 3, 1, &config).unwrap_err().is_invalid_argument());
        let out = scale(&src, 3, 1, &config);
        assert_eq!(out.pixels(), &[Rgba::GREEN; 3]);
    }

    #[test]
    fn nearest_picks_source_blocks() {
        let src = Raster::from_pixels(2, 1, vec![Rgba::RED, Rgba::BLUE]).unwrap();
        let out = nearest(&src, 4, 1);
        assert_eq!(out.pixels(), &[Rgba::RED, Rgba::RED, Rgba::BLUE, Rgba::BLUE]);
    }

    #[test]
    fn surface_alpha_survives_scaling() {
        let mut src = Raster::filled(2, 2, Rgba::WHITE);
        src.set_alpha(Some(40));
        assert_eq!(scale(&src, 4, 4, &ScaleConfig::default()).alpha(), Some(40));
    }
}
