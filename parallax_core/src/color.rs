// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed ARGB colors and color keys.

use core::fmt;

/// A non-premultiplied color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Packs four channels.
    #[inline]
    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Packs an opaque color.
    #[inline]
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    /// Alpha channel.
    #[inline]
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "extracts one byte")]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    #[inline]
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "extracts one byte")]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    #[inline]
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "extracts one byte")]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    #[inline]
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "extracts one byte")]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Returns the color with its alpha replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self(self.0 & 0x00FF_FFFF | (a as u32) << 24)
    }

    /// Returns `true` if alpha is 255.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a() == 0xFF
    }

    /// Multiplies alpha by `opacity` (clamped to `0.0..=1.0`).
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is clamped to 0..=255 before the cast"
    )]
    pub fn scale_alpha(self, opacity: f32) -> Self {
        let scaled = f32::from(self.a()) * opacity.clamp(0.0, 1.0) + 0.5;
        self.with_alpha(scaled.clamp(0.0, 255.0) as u8)
    }

    /// Composites `self` over `dst` (source-over, straight alpha).
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        let sa = u32::from(self.a());
        if sa == 0xFF {
            return self;
        }
        if sa == 0 {
            return dst;
        }
        let da = u32::from(dst.a()) * (0xFF - sa) / 0xFF;
        let out_a = sa + da;
        let mix = |s: u8, d: u8| channel((u32::from(s) * sa + u32::from(d) * da) / out_a);
        Self::from_argb(
            channel(out_a),
            mix(self.r(), dst.r()),
            mix(self.g(), dst.g()),
            mix(self.b(), dst.b()),
        )
    }
}

fn channel(v: u32) -> u8 {
    u8::try_from(v).unwrap_or(u8::MAX)
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08X})", self.0)
    }
}

/// Marks a range of source colors as transparent when blitting a bitmap.
///
/// A source pixel whose red, green and blue channels all fall inside
/// `low..=high` is replaced by the key's `alpha`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorKey {
    /// Lower bound per channel (alpha ignored).
    pub low: Color,
    /// Upper bound per channel (alpha ignored).
    pub high: Color,
    /// Alpha given to keyed pixels.
    pub alpha: u8,
}

impl ColorKey {
    /// A key that drops exactly one color.
    #[must_use]
    pub const fn exact(color: Color) -> Self {
        Self {
            low: color,
            high: color,
            alpha: 0,
        }
    }

    /// Returns `true` if `c` is keyed out.
    #[must_use]
    pub fn matches(&self, c: Color) -> bool {
        (self.low.r()..=self.high.r()).contains(&c.r())
            && (self.low.g()..=self.high.g()).contains(&c.g())
            && (self.low.b()..=self.high.b()).contains(&c.b())
    }

    /// Applies the key to one source pixel.
    #[must_use]
    pub fn apply(&self, c: Color) -> Color {
        if self.matches(c) {
            c.with_alpha(self.alpha)
        } else {
            c
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip() {
        let c = Color::from_argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c, Color(0x1234_5678));
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn over_opaque_source_wins() {
        let red = Color::from_rgb(255, 0, 0);
        assert_eq!(red.over(Color::WHITE), red);
    }

    #[test]
    fn over_transparent_source_keeps_dst() {
        assert_eq!(Color::TRANSPARENT.over(Color::WHITE), Color::WHITE);
    }

    #[test]
    fn over_half_alpha_on_black() {
        let half_white = Color::WHITE.with_alpha(128);
        let out = half_white.over(Color::BLACK);
        assert_eq!(out.a(), 255);
        assert!((i32::from(out.r()) - 128).abs() <= 1, "{out:?}");
    }

    #[test]
    fn over_onto_transparent_keeps_source_color() {
        let c = Color::from_argb(100, 10, 20, 30);
        assert_eq!(c.over(Color::TRANSPARENT), c);
    }

    #[test]
    fn scale_alpha_clamps() {
        assert_eq!(Color::WHITE.scale_alpha(0.5).a(), 128);
        assert_eq!(Color::WHITE.scale_alpha(2.0).a(), 255);
        assert_eq!(Color::WHITE.scale_alpha(-1.0).a(), 0);
    }

    #[test]
    fn color_key_range() {
        let key = ColorKey {
            low: Color::from_rgb(0, 200, 0),
            high: Color::from_rgb(40, 255, 40),
            alpha: 0,
        };
        assert!(key.matches(Color::from_rgb(10, 250, 10)));
        assert!(!key.matches(Color::from_rgb(10, 100, 10)));
        assert_eq!(key.apply(Color::from_rgb(0, 255, 0)).a(), 0);
        assert_eq!(ColorKey::exact(Color::BLACK).apply(Color::WHITE), Color::WHITE);
    }
}
