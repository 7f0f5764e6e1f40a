// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU-side pixel storage.

use alloc::vec;
use alloc::vec::Vec;

use parallax_core::color::Color;
use parallax_core::geometry::IRect;

/// A row-major buffer of [`Color`] pixels.
///
/// Used for software surfaces, per-view render targets and the inputs of
/// the stereo compositor.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// A buffer filled with `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            data: vec![color; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The rectangle covered by the buffer.
    #[must_use]
    pub fn bounds(&self) -> IRect {
        IRect::from_size(
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    /// Reallocates to `width` × `height`, clearing to transparent.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize, Color::TRANSPARENT);
    }

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Overwrites the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = color;
        }
    }

    /// Composites `color` over the pixel at `(x, y)`.
    #[inline]
    pub fn blend(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = color.over(self.data[i]);
        }
    }

    /// Overwrites every pixel in `rect` (clipped to the buffer).
    pub fn fill_rect(&mut self, rect: IRect, color: Color) {
        let r = rect.intersect(self.bounds());
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                self.set(x.unsigned_abs(), y.unsigned_abs(), color);
            }
        }
    }

    /// Overwrites every pixel.
    pub fn fill(&mut self, color: Color) {
        self.data.fill(color);
    }

    /// Nearest-neighbor sample at output position `(x, y)` of an
    /// `out_width` × `out_height` image stretched over this buffer.
    #[must_use]
    pub fn sample_scaled(&self, x: u32, y: u32, out_width: u32, out_height: u32) -> Color {
        if out_width == 0 || out_height == 0 {
            return Color::TRANSPARENT;
        }
        let sx = scale_coord(x, self.width, out_width);
        let sy = scale_coord(y, self.height, out_height);
        self.get(sx, sy).unwrap_or(Color::TRANSPARENT)
    }

    /// Pixels in row-major order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Color] {
        &self.data
    }

    /// Number of pixels equal to `color`.
    #[must_use]
    pub fn count(&self, color: Color) -> usize {
        self.data.iter().filter(|c| **c == color).count()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "result is below `src`, which is a u32"
)]
fn scale_coord(v: u32, src: u32, dst: u32) -> u32 {
    if src == dst {
        v
    } else {
        (u64::from(v) * u64::from(src) / u64::from(dst)) as u32
    }
}

impl core::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(5, 0, Color::WHITE);
        assert_eq!(buf.get(5, 0), None);
        assert_eq!(buf.count(Color::TRANSPARENT), 4);
    }

    #[test]
    fn fill_rect_clips() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.fill_rect(IRect::new(-2, 2, 4, 10), Color::WHITE);
        assert_eq!(buf.count(Color::WHITE), 4);
        assert_eq!(buf.get(1, 3), Some(Color::WHITE));
        assert_eq!(buf.get(2, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blend_composites_over() {
        let mut buf = PixelBuffer::filled(1, 1, Color::BLACK);
        buf.blend(0, 0, Color::WHITE.with_alpha(0));
        assert_eq!(buf.get(0, 0), Some(Color::BLACK));
        buf.blend(0, 0, Color::WHITE);
        assert_eq!(buf.get(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn sample_scaled_stretches() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(1, 0, Color::WHITE);
        assert_eq!(buf.sample_scaled(3, 0, 4, 1), Color::WHITE);
        assert_eq!(buf.sample_scaled(1, 0, 4, 1), Color::TRANSPARENT);
    }
}
