#![forbid(unsafe_code)]

//! Packed RGBA colour.
//!
//! Straight (non-premultiplied) alpha, laid out as `0xRRGGBBAA`.
//! Compositing is Porter-Duff SourceOver, computed exactly in integers and
//! rounded once at the end.

use std::fmt;

/// A 4-byte RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Opaque colour.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Build from `[r, g, b, a]`.
    #[inline]
    pub const fn from_array(c: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(c))
    }

    /// Same colour with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// Scale alpha by `factor / 255`, rounding to nearest.
    #[inline]
    #[must_use]
    pub const fn scale_alpha(self, factor: u8) -> Self {
        let a = (self.a() as u32 * factor as u32 + 127) / 255;
        self.with_alpha(a as u8)
    }

    /// Rec. 709 luma, truncated.
    #[inline]
    pub const fn luma(self) -> u8 {
        let y = 2126 * self.r() as u32 + 7152 * self.g() as u32 + 722 * self.b() as u32;
        (y / 10_000) as u8
    }

    /// Euclidean distance over all four channels.
    pub fn distance(self, other: Self) -> f64 {
        self.to_array()
            .iter()
            .zip(other.to_array())
            .map(|(&a, b)| {
                let d = a as f64 - b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    /// SourceOver: `self` composited over `dst`.
    pub fn over(self, dst: Self) -> Self {
        let sa = self.a() as u64;
        match sa {
            255 => return self,
            0 => return dst,
            _ => {}
        }
        let da = dst.a() as u64;
        let keep = 255 - sa;
        // Output alpha scaled by 255 so every channel stays exact.
        let out_a255 = 255 * sa + da * keep;
        if out_a255 == 0 {
            return Self::TRANSPARENT;
        }
        let round = |num: u64, den: u64| ((num + den / 2) / den).min(255) as u8;
        let mix = |s: u8, d: u8| round(s as u64 * sa * 255 + d as u64 * da * keep, out_a255);
        Self::rgba(
            mix(self.r(), dst.r()),
            mix(self.g(), dst.g()),
            mix(self.b(), dst.b()),
            round(out_a255, 255),
        )
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Self::from_array(c)
    }
}

impl From<(u8, u8, u8)> for Rgba {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip() {
        let c = Rgba::rgba(10, 20, 30, 40);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (10, 20, 30, 40));
        assert_eq!(Rgba::from_array(c.to_array()), c);
        assert_eq!(c.to_string(), "#0a141e28");
    }

    #[test]
    fn over_extremes() {
        let dst = Rgba::rgba(9, 8, 7, 200);
        assert_eq!(Rgba::rgba(1, 2, 3, 255).over(dst), Rgba::rgba(1, 2, 3, 255));
        assert_eq!(Rgba::TRANSPARENT.over(dst), dst);
    }

    #[test]
    fn over_half_red_on_blue() {
        let src = Rgba::rgba(255, 0, 0, 128);
        assert_eq!(src.over(Rgba::BLUE), Rgba::rgba(128, 0, 127, 255));
    }

    #[test]
    fn luma_and_distance() {
        assert_eq!(Rgba::WHITE.luma(), 255);
        assert_eq!(Rgba::BLACK.luma(), 0);
        assert_eq!(Rgba::rgba(0, 0, 0, 0).distance(Rgba::rgba(3, 4, 0, 0)), 5.0);
    }

    #[test]
    fn scale_alpha_rounds() {
        assert_eq!(Rgba::rgba(1, 2, 3, 255).scale_alpha(128).a(), 128);
        assert_eq!(Rgba::rgba(1, 2, 3, 100).scale_alpha(0).a(), 0);
    }
}
