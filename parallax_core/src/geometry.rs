// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel rectangles.
//!
//! Redraw bookkeeping works on whole pixels, so dirty regions, clippers and
//! last-drawn bounds are all [`IRect`]s. Scene geometry stays in
//! [`kurbo::Rect`] until it is snapped outward with [`IRect::from_rect`].

use core::fmt;

/// An axis-aligned integer rectangle with a top-left origin.
///
/// `y` grows downward. A rectangle with a non-positive width or height is
/// empty; all empty rectangles behave the same under intersection, union and
/// containment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl IRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin covering `width` × `height` pixels.
    #[inline]
    #[must_use]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Creates a rectangle from two corners (`x0 <= x1`, `y0 <= y1`).
    #[inline]
    #[must_use]
    pub const fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Largest edge coordinate produced by [`from_rect`](Self::from_rect).
    ///
    /// Edges stay within `±LIMIT`, so widths and right edges of snapped
    /// rectangles always fit in an `i32`.
    pub const LIMIT: i32 = i32::MAX / 2;

    /// Snaps a floating-point rectangle outward to whole pixels.
    ///
    /// Edges are clamped to [`LIMIT`](Self::LIMIT). Non-finite input yields
    /// [`IRect::ZERO`].
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "edges are rounded outward first; float-to-int casts saturate"
    )]
    pub fn from_rect(rect: kurbo::Rect) -> Self {
        if !rect.is_finite() {
            return Self::ZERO;
        }
        let limit = f64::from(Self::LIMIT);
        let r = rect.abs().expand();
        let edge = |v: f64| v.clamp(-limit, limit) as i32;
        Self::from_edges(edge(r.x0), edge(r.y0), edge(r.x1), edge(r.y1))
    }

    /// Converts to a floating-point rectangle.
    #[inline]
    #[must_use]
    pub fn to_rect(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width.unsigned_abs() as u64 * self.height.unsigned_abs() as u64
        }
    }

    /// Returns the overlapping part of two rectangles, or [`IRect::ZERO`].
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            Self::ZERO
        } else {
            Self::from_edges(x0, y0, x1, y1)
        }
    }

    /// Returns `true` if the rectangles share at least one pixel.
    #[inline]
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Returns the smallest rectangle covering both inputs.
    ///
    /// Empty inputs are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained by every rectangle.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns `true` if the pixel at `(px, py)` lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains_point(self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    /// Returns the rectangle moved by `(dx, dy)`, saturating at the `i32`
    /// range.
    #[inline]
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }
}

impl fmt::Debug for IRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IRect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_area() {
        assert!(IRect::ZERO.is_empty());
        assert_eq!(IRect::new(5, 5, 0, 10).area(), 0);
        assert_eq!(IRect::new(5, 5, -3, 10).area(), 0);
        assert_eq!(IRect::new(0, 0, 4, 3).area(), 12);
    }

    #[test]
    fn intersect_overlapping() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(b), IRect::new(5, 5, 5, 5));
        assert!(a.intersects(b));
    }

    #[test]
    fn intersect_disjoint_is_zero() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(10, 0, 10, 10);
        assert_eq!(a.intersect(b), IRect::ZERO);
        assert!(!a.intersects(b), "touching edges do not share pixels");
    }

    #[test]
    fn union_ignores_empty() {
        let a = IRect::new(2, 3, 4, 5);
        assert_eq!(a.union(IRect::ZERO), a);
        assert_eq!(IRect::ZERO.union(a), a);
        let b = IRect::new(10, 10, 1, 1);
        assert_eq!(a.union(b), IRect::from_edges(2, 3, 11, 11));
    }

    #[test]
    fn containment() {
        let outer = IRect::new(0, 0, 100, 100);
        assert!(outer.contains(IRect::new(10, 10, 5, 5)));
        assert!(outer.contains(outer));
        assert!(!outer.contains(IRect::new(90, 90, 20, 5)));
        assert!(outer.contains(IRect::ZERO));
        assert!(outer.contains_point(0, 0));
        assert!(!outer.contains_point(100, 0));
    }

    #[test]
    fn from_rect_snaps_outward() {
        let r = IRect::from_rect(kurbo::Rect::new(0.5, 1.2, 9.1, 9.9));
        assert_eq!(r, IRect::from_edges(0, 1, 10, 10));
    }

    #[test]
    fn from_rect_rejects_non_finite() {
        let r = IRect::from_rect(kurbo::Rect::new(0.0, 0.0, f64::NAN, 4.0));
        assert_eq!(r, IRect::ZERO);
    }

    #[test]
    fn from_rect_clamps_huge_finite_geometry() {
        let r = IRect::from_rect(kurbo::Rect::new(-3.0e9, -1.0, 3.0e9, 1.0));
        assert_eq!(r.x, -IRect::LIMIT);
        assert_eq!(r.right(), IRect::LIMIT);
        assert_eq!(r.height, 2);
        assert!(!r.is_empty(), "a wide backdrop must not vanish");
        assert!(r.contains(IRect::new(0, 0, 800, 1)));
        assert_eq!(r.intersect(IRect::new(-10, -10, 20, 20)), IRect::new(-10, -1, 20, 2));
    }

    #[test]
    fn edge_arithmetic_saturates() {
        let wide = IRect::new(i32::MAX - 4, 0, 10, 10);
        assert_eq!(wide.right(), i32::MAX);
        assert_eq!(IRect::from_edges(i32::MIN, 0, i32::MAX, 1).width, i32::MAX);
        assert_eq!(IRect::new(-5, 0, 1, 1).translate(i32::MIN, 0).x, i32::MIN);
    }

    #[test]
    fn to_rect_matches_edges() {
        let r = IRect::new(-4, 2, 8, 6).to_rect();
        assert_eq!(r, kurbo::Rect::new(-4.0, 2.0, 4.0, 8.0));
    }
}
