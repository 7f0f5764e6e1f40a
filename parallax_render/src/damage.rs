// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What part of the surface a frame repainted.

use alloc::vec::Vec;

use parallax_core::geometry::IRect;
use parallax_core::rect_array::DirtyRegionSet;

/// The area of the surface a frame repainted, in device pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DamageRegion {
    /// The whole surface.
    #[default]
    Full,
    /// Only these rectangles.
    Rects(Vec<IRect>),
    /// Nothing; the previous frame is still valid.
    None,
}

impl DamageRegion {
    /// Builds the region from a frame's dirty set, mapping each rectangle
    /// with `to_device`.
    #[must_use]
    pub fn from_dirty(dirty: &DirtyRegionSet, to_device: impl Fn(IRect) -> IRect) -> Self {
        if dirty.is_full() {
            Self::Full
        } else if dirty.is_empty() {
            Self::None
        } else {
            Self::Rects(dirty.rects().iter().map(|r| to_device(*r)).collect())
        }
    }

    /// Returns `true` if nothing was repainted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Repainted area in pixels, given the surface area for [`Full`](Self::Full).
    #[must_use]
    pub fn area(&self, surface_area: u64) -> u64 {
        match self {
            Self::Full => surface_area,
            Self::Rects(rects) => rects.iter().map(|r| r.area()).sum(),
            Self::None => 0,
        }
    }

    /// Merges another region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use parallax_core::rect_array::MergePolicy;

    #[test]
    fn from_dirty_variants() {
        let surface = IRect::from_size(100, 100);
        let mut dirty = DirtyRegionSet::new(MergePolicy::DEFAULT);
        dirty.reset(surface, surface);
        assert_eq!(DamageRegion::from_dirty(&dirty, |r| r), DamageRegion::None);

        dirty.add(IRect::new(1, 2, 3, 4));
        assert_eq!(
            DamageRegion::from_dirty(&dirty, |r| r.translate(10, 0)),
            DamageRegion::Rects(vec![IRect::new(11, 2, 3, 4)])
        );

        dirty.invalidate_all();
        assert_eq!(DamageRegion::from_dirty(&dirty, |r| r), DamageRegion::Full);
    }

    #[test]
    fn merge_and_area() {
        let mut d = DamageRegion::None;
        d.merge(&DamageRegion::Rects(vec![IRect::new(0, 0, 2, 2)]));
        d.merge(&DamageRegion::Rects(vec![IRect::new(5, 5, 3, 1)]));
        assert_eq!(d.area(10_000), 7);
        d.merge(&DamageRegion::Full);
        assert_eq!(d.area(10_000), 10_000);
        assert!(!d.is_empty());
    }
}
