// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What was on screen last frame.
//!
//! [`FrameHistory`] keeps one [`PrevFrameEntry`] per context drawn last
//! frame. Before the next frame is painted it diffs the new display list
//! against those entries and feeds the resulting damage into a
//! [`DirtyRegionSet`]:
//!
//! - a node that vanished contributes its last-known bounds,
//! - a node that appeared contributes its new bounds,
//! - a node that moved, or whose context is flagged `changed`, contributes
//!   both its old and its new bounds.
//!
//! After drawing, [`commit`](FrameHistory::commit) swaps the new entries in.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::display_list::DisplayList;
use crate::geometry::IRect;
use crate::node::NodeId;
use crate::rect_array::DirtyRegionSet;

/// A node and the pixels it covered when last drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrevFrameEntry {
    /// The node.
    pub node: NodeId,
    /// Its visible bounds last frame.
    pub bounds: IRect,
}

/// Counts from one [`FrameHistory::collect_damage`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryDamage {
    /// Previous entries whose node is gone.
    pub vanished: u32,
    /// Nodes drawn this frame but not last frame.
    pub appeared: u32,
    /// Nodes in both frames that moved or changed.
    pub changed: u32,
}

impl HistoryDamage {
    /// Returns `true` if nothing differs from last frame.
    #[inline]
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.vanished == 0 && self.appeared == 0 && self.changed == 0
    }
}

/// Double-buffered record of last frame's drawn contexts.
#[derive(Debug, Default)]
pub struct FrameHistory {
    prev: Vec<PrevFrameEntry>,
    spare: Vec<PrevFrameEntry>,
    prev_bounds: HashMap<NodeId, IRect>,
    cur_bounds: HashMap<NodeId, IRect>,
}

impl FrameHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last frame's entries.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PrevFrameEntry] {
        &self.prev
    }

    /// Number of contexts drawn last frame.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.prev.len()
    }

    /// Returns `true` if nothing was drawn last frame.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prev.is_empty()
    }

    /// Forgets last frame, so the next frame is treated as the first.
    pub fn reset(&mut self) {
        self.prev.clear();
    }

    /// Adds damage for every difference between last frame and `list`.
    pub fn collect_damage(&mut self, list: &DisplayList, dirty: &mut DirtyRegionSet) -> HistoryDamage {
        let mut damage = HistoryDamage::default();

        self.prev_bounds.clear();
        for e in &self.prev {
            merge_bounds(&mut self.prev_bounds, e.node, e.bounds);
        }
        self.cur_bounds.clear();
        for ctx in list {
            merge_bounds(&mut self.cur_bounds, ctx.node, ctx.snapshot.visible_bounds());
        }

        for e in &self.prev {
            if !self.cur_bounds.contains_key(&e.node) {
                dirty.add(e.bounds);
                damage.vanished += 1;
            }
        }

        for ctx in list {
            let bounds = ctx.snapshot.visible_bounds();
            match self.prev_bounds.get(&ctx.node) {
                None => {
                    dirty.add(bounds);
                    damage.appeared += 1;
                }
                Some(old) => {
                    let moved = self.cur_bounds.get(&ctx.node) != Some(old);
                    if moved || ctx.snapshot.flags.changed {
                        dirty.add(*old);
                        dirty.add(bounds);
                        damage.changed += 1;
                    }
                }
            }
        }
        damage
    }

    /// Replaces last frame's entries with the contexts of `list`.
    pub fn commit(&mut self, list: &DisplayList) {
        self.spare.clear();
        self.spare.extend(list.iter().map(|ctx| PrevFrameEntry {
            node: ctx.node,
            bounds: ctx.snapshot.visible_bounds(),
        }));
        core::mem::swap(&mut self.prev, &mut self.spare);
    }
}

fn merge_bounds(map: &mut HashMap<NodeId, IRect>, node: NodeId, bounds: IRect) {
    map.entry(node)
        .and_modify(|b| *b = b.union(bounds))
        .or_insert(bounds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::display_list::{DrawContent, DrawSnapshot};
    use crate::node::ShapeId;
    use crate::rect_array::MergePolicy;
    use kurbo::{Affine, Rect};

    const SURFACE: IRect = IRect::from_size(800, 600);

    fn snap(x: f64, y: f64) -> DrawSnapshot {
        DrawSnapshot::new(
            DrawContent::Shape {
                shape: ShapeId(1),
                fill: Color::BLACK,
            },
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Affine::translate((x, y)),
        )
    }

    fn frame(nodes: &[(u32, f64, f64)]) -> DisplayList {
        let mut list = DisplayList::new();
        list.begin();
        for &(id, x, y) in nodes {
            list.append(NodeId(id), snap(x, y));
        }
        list.terminate();
        list
    }

    fn dirty() -> DirtyRegionSet {
        let mut d = DirtyRegionSet::new(MergePolicy::TIGHT);
        d.reset(SURFACE, SURFACE);
        d
    }

    #[test]
    fn first_frame_marks_everything_appeared() {
        let mut history = FrameHistory::new();
        let list = frame(&[(1, 0.0, 0.0), (2, 100.0, 100.0)]);
        let mut d = dirty();
        let damage = history.collect_damage(&list, &mut d);
        assert_eq!(damage.appeared, 2);
        assert_eq!(d.rects().len(), 2);
    }

    #[test]
    fn vanished_node_dirties_last_bounds() {
        let mut history = FrameHistory::new();
        history.commit(&frame(&[(1, 0.0, 0.0), (2, 100.0, 100.0)]));

        let mut d = dirty();
        let damage = history.collect_damage(&frame(&[(1, 0.0, 0.0)]), &mut d);
        assert_eq!(damage.vanished, 1);
        assert_eq!(damage.appeared, 0);
        assert_eq!(d.rects(), &[IRect::new(100, 100, 10, 10)]);
    }

    #[test]
    fn unchanged_frame_is_clean() {
        let mut history = FrameHistory::new();
        let list = frame(&[(1, 5.0, 5.0)]);
        history.commit(&list);
        let mut d = dirty();
        assert!(history.collect_damage(&list, &mut d).is_clean());
        assert!(d.is_empty());
    }

    #[test]
    fn moved_node_dirties_old_and_new() {
        let mut history = FrameHistory::new();
        history.commit(&frame(&[(1, 0.0, 0.0)]));
        let mut d = dirty();
        let damage = history.collect_damage(&frame(&[(1, 200.0, 0.0)]), &mut d);
        assert_eq!(damage.changed, 1);
        let mut rects = d.rects().to_vec();
        rects.sort_by_key(|r| r.x);
        assert_eq!(rects, [IRect::new(0, 0, 10, 10), IRect::new(200, 0, 10, 10)]);
    }

    #[test]
    fn changed_flag_dirties_in_place() {
        let mut history = FrameHistory::new();
        history.commit(&frame(&[(1, 0.0, 0.0)]));
        let mut list = DisplayList::new();
        list.begin();
        list.append(NodeId(1), snap(0.0, 0.0).changed());
        list.terminate();
        let mut d = dirty();
        let damage = history.collect_damage(&list, &mut d);
        assert_eq!(damage.changed, 1);
        assert_eq!(d.rects(), &[IRect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn commit_swaps_entries() {
        let mut history = FrameHistory::new();
        history.commit(&frame(&[(1, 0.0, 0.0), (2, 0.0, 0.0)]));
        assert_eq!(history.len(), 2);
        history.commit(&frame(&[(3, 1.0, 1.0)]));
        assert_eq!(
            history.entries(),
            &[PrevFrameEntry {
                node: NodeId(3),
                bounds: IRect::new(1, 1, 10, 10),
            }]
        );
        history.reset();
        assert!(history.is_empty());
    }
}
