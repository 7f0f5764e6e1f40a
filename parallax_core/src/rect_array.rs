// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-rectangle accumulation.
//!
//! [`RectArray`] collects the pixel rectangles that must be repainted this
//! frame. Adding a rectangle merges it with an existing entry when the merged
//! bounds would not repaint much more than the two inputs cover on their own;
//! how much "much more" is comes from [`MergePolicy`].
//!
//! [`DirtyRegionSet`] wraps a `RectArray` with the surface rectangle and the
//! top-level clipper, so every stored rectangle stays inside both.

use alloc::vec::Vec;

use crate::geometry::IRect;

/// Controls when two dirty rectangles are merged into one.
///
/// Two rectangles merge when the area of their union is at most
/// `(1 + max_overdraw)` times the area they actually cover. Once the array
/// holds `max_rects` entries, further additions are forced into whichever
/// existing entry grows the least.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergePolicy {
    /// Tolerated extra repaint, as a fraction of the covered area.
    pub max_overdraw: f64,
    /// Upper bound on stored rectangles. Zero means unbounded.
    pub max_rects: usize,
}

impl MergePolicy {
    /// Merge only when the union repaints nothing extra.
    pub const TIGHT: Self = Self {
        max_overdraw: 0.0,
        max_rects: 64,
    };

    /// Accept up to a quarter of extra repaint per merge.
    pub const DEFAULT: Self = Self {
        max_overdraw: 0.25,
        max_rects: 32,
    };

    /// Few, large rectangles. Suits backends with high per-rect setup cost.
    pub const COARSE: Self = Self {
        max_overdraw: 1.0,
        max_rects: 8,
    };

    /// Returns `true` if `a` and `b` should be stored as their union.
    #[must_use]
    pub fn should_merge(&self, a: IRect, b: IRect) -> bool {
        let covered = a.area() + b.area() - a.intersect(b).area();
        let merged = a.union(b).area();
        merged as f64 <= covered as f64 * (1.0 + self.max_overdraw)
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An unordered set of non-empty pixel rectangles.
///
/// No stored rectangle contains another. Zero-area additions are ignored.
#[derive(Clone, Debug, Default)]
pub struct RectArray {
    rects: Vec<IRect>,
    policy: MergePolicy,
}

impl RectArray {
    /// Creates an empty array with the [default](MergePolicy::DEFAULT) policy.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_policy(MergePolicy::DEFAULT)
    }

    /// Creates an empty array with the given merge policy.
    #[must_use]
    pub const fn with_policy(policy: MergePolicy) -> Self {
        Self {
            rects: Vec::new(),
            policy,
        }
    }

    /// Returns the merge policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Replaces the merge policy. Stored rectangles are left as they are.
    pub fn set_policy(&mut self, policy: MergePolicy) {
        self.policy = policy;
    }

    /// Removes every rectangle, keeping the allocation.
    pub fn reset(&mut self) {
        self.rects.clear();
    }

    /// Adds a rectangle, merging with existing entries per the policy.
    ///
    /// A merge can enable further merges, so the merged result is re-added
    /// until it settles.
    pub fn add_rect(&mut self, rect: IRect) {
        if rect.is_empty() {
            return;
        }
        let mut pending = rect;
        loop {
            if self.rects.iter().any(|r| r.contains(pending)) {
                return;
            }
            self.rects.retain(|r| !pending.contains(*r));

            if let Some(idx) = self.best_merge(pending) {
                pending = self.rects.swap_remove(idx).union(pending);
                continue;
            }
            if self.policy.max_rects != 0 && self.rects.len() >= self.policy.max_rects {
                let idx = self.least_growth(pending);
                pending = self.rects.swap_remove(idx).union(pending);
                continue;
            }
            self.rects.push(pending);
            return;
        }
    }

    /// Clips every rectangle to `bounds`, dropping those that fall outside.
    pub fn clip_to(&mut self, bounds: IRect) {
        for r in &mut self.rects {
            *r = r.intersect(bounds);
        }
        self.rects.retain(|r| !r.is_empty());
    }

    /// Returns the bounding rectangle of all entries, or `None` when empty.
    #[must_use]
    pub fn union_all(&self) -> Option<IRect> {
        self.rects.iter().copied().reduce(IRect::union)
    }

    /// Returns the stored rectangles.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[IRect] {
        &self.rects
    }

    /// Number of stored rectangles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` if no rectangles are stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Sum of the stored areas. Overlaps are counted once per rectangle.
    #[must_use]
    pub fn total_area(&self) -> u64 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    // Cheapest policy-approved merge partner for `rect`.
    fn best_merge(&self, rect: IRect) -> Option<usize> {
        self.rects
            .iter()
            .enumerate()
            .filter(|(_, r)| self.policy.should_merge(**r, rect))
            .min_by_key(|(_, r)| growth(**r, rect))
            .map(|(i, _)| i)
    }

    // Entry whose union with `rect` adds the fewest pixels. Only called when
    // the array is non-empty.
    fn least_growth(&self, rect: IRect) -> usize {
        self.rects
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| growth(**r, rect))
            .map_or(0, |(i, _)| i)
    }
}

fn growth(existing: IRect, added: IRect) -> u64 {
    existing.union(added).area() - existing.area()
}

/// The dirty region of one surface for one frame.
///
/// Rectangles are clipped to the top-level clipper on insertion; the clipper
/// itself is kept inside the surface rectangle.
#[derive(Clone, Debug, Default)]
pub struct DirtyRegionSet {
    rects: RectArray,
    surface_rect: IRect,
    top_clip: IRect,
    full: bool,
}

impl DirtyRegionSet {
    /// Creates an empty set with the given merge policy.
    #[must_use]
    pub const fn new(policy: MergePolicy) -> Self {
        Self {
            rects: RectArray::with_policy(policy),
            surface_rect: IRect::ZERO,
            top_clip: IRect::ZERO,
            full: false,
        }
    }

    /// Clears the set for a new frame.
    pub fn reset(&mut self, surface_rect: IRect, top_clip: IRect) {
        self.rects.reset();
        self.surface_rect = surface_rect;
        self.top_clip = top_clip.intersect(surface_rect);
        self.full = false;
    }

    /// Replaces the merge policy.
    pub fn set_policy(&mut self, policy: MergePolicy) {
        self.rects.set_policy(policy);
    }

    /// Marks `rect` (clipped to the top clipper) for repaint.
    pub fn add(&mut self, rect: IRect) {
        if self.full {
            return;
        }
        self.rects.add_rect(rect.intersect(self.top_clip));
    }

    /// Marks the whole clipped surface for repaint.
    pub fn invalidate_all(&mut self) {
        self.rects.reset();
        self.rects.add_rect(self.top_clip);
        self.full = true;
    }

    /// Returns `true` after [`invalidate_all`](Self::invalidate_all).
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.full
    }

    /// The surface rectangle this frame was reset with.
    #[inline]
    #[must_use]
    pub const fn surface_rect(&self) -> IRect {
        self.surface_rect
    }

    /// The effective top-level clipper.
    #[inline]
    #[must_use]
    pub const fn top_clip(&self) -> IRect {
        self.top_clip
    }

    /// The accumulated rectangles.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[IRect] {
        self.rects.rects()
    }

    /// Returns `true` if nothing needs repainting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding rectangle of the dirty region.
    #[must_use]
    pub fn bounds(&self) -> Option<IRect> {
        self.rects.union_all()
    }

    /// Sum of the stored dirty areas.
    #[must_use]
    pub fn total_area(&self) -> u64 {
        self.rects.total_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_is_ignored() {
        let mut arr = RectArray::new();
        arr.add_rect(IRect::new(3, 3, 0, 10));
        arr.add_rect(IRect::new(3, 3, 10, -1));
        assert!(arr.is_empty());
    }

    #[test]
    fn adjacent_rects_merge_without_overdraw() {
        let mut arr = RectArray::with_policy(MergePolicy::TIGHT);
        arr.add_rect(IRect::new(0, 0, 10, 10));
        arr.add_rect(IRect::new(10, 0, 10, 10));
        assert_eq!(arr.rects(), &[IRect::new(0, 0, 20, 10)]);
    }

    #[test]
    fn distant_rects_stay_separate() {
        let mut arr = RectArray::new();
        arr.add_rect(IRect::new(0, 0, 10, 10));
        arr.add_rect(IRect::new(200, 200, 10, 10));
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.total_area(), 200);
    }

    #[test]
    fn contained_rect_is_absorbed() {
        let mut arr = RectArray::with_policy(MergePolicy::TIGHT);
        arr.add_rect(IRect::new(0, 0, 100, 100));
        arr.add_rect(IRect::new(10, 10, 5, 5));
        assert_eq!(arr.rects(), &[IRect::new(0, 0, 100, 100)]);
    }

    #[test]
    fn covering_rect_replaces_entries() {
        let mut arr = RectArray::with_policy(MergePolicy::TIGHT);
        arr.add_rect(IRect::new(10, 10, 5, 5));
        arr.add_rect(IRect::new(50, 50, 5, 5));
        arr.add_rect(IRect::new(0, 0, 100, 100));
        assert_eq!(arr.rects(), &[IRect::new(0, 0, 100, 100)]);
    }

    #[test]
    fn merge_cascades() {
        let mut arr = RectArray::with_policy(MergePolicy::TIGHT);
        arr.add_rect(IRect::new(0, 0, 10, 10));
        arr.add_rect(IRect::new(20, 0, 10, 10));
        assert_eq!(arr.len(), 2);
        // Bridges the gap; the merge with one side enables the other.
        arr.add_rect(IRect::new(10, 0, 10, 10));
        assert_eq!(arr.rects(), &[IRect::new(0, 0, 30, 10)]);
    }

    #[test]
    fn overflow_forces_merge() {
        let policy = MergePolicy {
            max_overdraw: 0.0,
            max_rects: 2,
        };
        let mut arr = RectArray::with_policy(policy);
        arr.add_rect(IRect::new(0, 0, 1, 1));
        arr.add_rect(IRect::new(100, 0, 1, 1));
        arr.add_rect(IRect::new(0, 100, 1, 1));
        assert_eq!(arr.len(), 2);
        let bounds = arr.union_all().expect("non-empty");
        assert_eq!(bounds, IRect::new(0, 0, 101, 101));
    }

    #[test]
    fn clip_drops_outside() {
        let mut arr = RectArray::new();
        arr.add_rect(IRect::new(-10, -10, 20, 20));
        arr.add_rect(IRect::new(500, 500, 10, 10));
        arr.clip_to(IRect::from_size(100, 100));
        assert_eq!(arr.rects(), &[IRect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn union_all_of_empty_is_none() {
        assert_eq!(RectArray::new().union_all(), None);
    }

    #[test]
    fn region_set_clips_to_top_clip() {
        let mut set = DirtyRegionSet::new(MergePolicy::DEFAULT);
        set.reset(IRect::from_size(800, 600), IRect::new(100, 100, 200, 200));
        set.add(IRect::new(0, 0, 150, 150));
        set.add(IRect::new(700, 500, 50, 50));
        assert_eq!(set.rects(), &[IRect::new(100, 100, 50, 50)]);
        for r in set.rects() {
            assert!(set.surface_rect().contains(*r), "{r:?} escapes surface");
        }
    }

    #[test]
    fn region_set_top_clip_stays_in_surface() {
        let mut set = DirtyRegionSet::new(MergePolicy::DEFAULT);
        set.reset(IRect::from_size(100, 100), IRect::new(50, 50, 500, 500));
        assert_eq!(set.top_clip(), IRect::new(50, 50, 50, 50));
    }

    #[test]
    fn invalidate_all_covers_clip() {
        let mut set = DirtyRegionSet::new(MergePolicy::DEFAULT);
        let surface = IRect::from_size(800, 600);
        set.reset(surface, surface);
        set.add(IRect::new(5, 5, 5, 5));
        set.invalidate_all();
        set.add(IRect::new(5, 5, 5, 5));
        assert!(set.is_full());
        assert_eq!(set.rects(), &[surface]);
        assert_eq!(set.total_area(), 480_000);
    }
}
