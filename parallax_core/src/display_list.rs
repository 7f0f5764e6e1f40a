// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame display list.
//!
//! The scene traverser appends one [`DrawContext`] per drawable node in paint
//! order. The list is a pooled arena: [`begin`](DisplayList::begin) rewinds
//! the cursor without freeing slots, so a steady-state frame allocates
//! nothing. The list length is explicit; there is no sentinel entry.
//!
//! # Pass ordering
//!
//! 2D surfaces paint contexts in list order. 3D surfaces paint opaque
//! contexts front to back (see [`DisplayList::opaque_front_to_back`]) and
//! then transparent contexts back to front
//! ([`DisplayList::alpha_back_to_front`]), so blending is correct whatever
//! order the opaque pass used.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use crate::color::{Color, ColorKey};
use crate::geometry::IRect;
use crate::node::{NodeId, ShapeId, TextureId};

/// Per-context state flags for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContextFlags {
    /// The node's appearance changed since it was last drawn.
    pub changed: bool,
    /// The node needs blending and is drawn in the alpha pass.
    pub transparent: bool,
    /// The context was painted this frame.
    pub drawn: bool,
}

/// What a context paints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawContent {
    /// A flat textured rectangle covering the local bounds. Eligible for the
    /// bitmap fast path.
    Bitmap {
        /// Source texture.
        texture: TextureId,
        /// Optional color key applied while blitting.
        color_key: Option<ColorKey>,
    },
    /// A filled vector outline.
    Shape {
        /// Outline registered with the backend.
        shape: ShapeId,
        /// Fill color.
        fill: Color,
    },
}

impl DrawContent {
    /// Returns `true` for [`DrawContent::Bitmap`].
    #[inline]
    #[must_use]
    pub const fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap { .. })
    }
}

/// The transform, clip and style a node resolved to for this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawSnapshot {
    /// Local-to-scene transform.
    pub transform: Affine,
    /// Content bounds in local coordinates.
    pub local_bounds: Rect,
    /// Scene-space pixel bounds (the transformed local bounds, snapped out).
    pub bounds: IRect,
    /// Clip in scene pixels, if any.
    pub clip: Option<IRect>,
    /// Group opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Scene-space z of the content plane. Larger is nearer the viewer.
    pub z: f64,
    /// What to paint.
    pub content: DrawContent,
    /// Frame flags.
    pub flags: ContextFlags,
}

impl DrawSnapshot {
    /// Creates a snapshot with full opacity, no clip and `z = 0`.
    ///
    /// `transparent` is set when the content itself is translucent.
    #[must_use]
    pub fn new(content: DrawContent, local_bounds: Rect, transform: Affine) -> Self {
        let translucent_fill = matches!(content, DrawContent::Shape { fill, .. } if !fill.is_opaque());
        Self {
            transform,
            local_bounds,
            bounds: IRect::from_rect(transform.transform_rect_bbox(local_bounds)),
            clip: None,
            opacity: 1.0,
            z: 0.0,
            content,
            flags: ContextFlags {
                transparent: translucent_fill,
                ..ContextFlags::default()
            },
        }
    }

    /// Sets the clip.
    #[must_use]
    pub fn with_clip(mut self, clip: IRect) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Sets the opacity; anything below 1.0 marks the context transparent.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        if opacity < 1.0 {
            self.flags.transparent = true;
        }
        self
    }

    /// Sets the content plane depth.
    #[must_use]
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Forces the transparent flag (e.g. for textures with alpha).
    #[must_use]
    pub fn transparent(mut self) -> Self {
        self.flags.transparent = true;
        self
    }

    /// Marks the node as changed since last frame.
    #[must_use]
    pub fn changed(mut self) -> Self {
        self.flags.changed = true;
        self
    }

    /// Bounds after clipping.
    #[must_use]
    pub fn visible_bounds(&self) -> IRect {
        match self.clip {
            Some(c) => self.bounds.intersect(c),
            None => self.bounds,
        }
    }
}

/// One display-list entry: a node plus its snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawContext {
    /// The drawable node.
    pub node: NodeId,
    /// Its state for this frame.
    pub snapshot: DrawSnapshot,
}

/// A pooled, explicitly sized list of [`DrawContext`]s.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    slots: Vec<DrawContext>,
    len: usize,
    alpha: Vec<u32>,
    terminated: bool,
}

impl DisplayList {
    /// Creates an empty list with no pooled slots.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            alpha: Vec::new(),
            terminated: false,
        }
    }

    /// Rewinds the cursor for a new frame, keeping pooled slots.
    pub fn begin(&mut self) {
        self.len = 0;
        self.alpha.clear();
        self.terminated = false;
    }

    /// Appends a context and returns its frame-local slot.
    ///
    /// Transparent contexts are also recorded in the alpha list.
    ///
    /// # Panics
    ///
    /// Panics if the list was already [terminated](Self::terminate) this
    /// frame.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "display lists never approach u32::MAX entries"
    )]
    pub fn append(&mut self, node: NodeId, snapshot: DrawSnapshot) -> u32 {
        assert!(!self.terminated, "append after terminate");
        let ctx = DrawContext { node, snapshot };
        if self.len < self.slots.len() {
            self.slots[self.len] = ctx;
        } else {
            self.slots.push(ctx);
        }
        let slot = self.len as u32;
        if snapshot.flags.transparent {
            self.alpha.push(slot);
        }
        self.len += 1;
        slot
    }

    /// Closes the list for this frame.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Returns `true` once [`terminate`](Self::terminate) has been called.
    #[inline]
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Number of contexts appended this frame.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing was appended this frame.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of pooled slots, including ones unused this frame.
    #[inline]
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.slots.len()
    }

    /// Returns the context in `slot`, if it was filled this frame.
    #[must_use]
    pub fn get(&self, slot: u32) -> Option<&DrawContext> {
        self.as_slice().get(slot as usize)
    }

    /// Contexts appended this frame, in paint order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[DrawContext] {
        &self.slots[..self.len]
    }

    /// Mutable access to this frame's contexts.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [DrawContext] {
        &mut self.slots[..self.len]
    }

    /// Iterates this frame's contexts in paint order.
    pub fn iter(&self) -> core::slice::Iter<'_, DrawContext> {
        self.as_slice().iter()
    }

    /// Slots of transparent contexts, in append order.
    #[inline]
    #[must_use]
    pub fn alpha_slots(&self) -> &[u32] {
        &self.alpha
    }

    /// Fills `out` with opaque slots ordered nearest first.
    ///
    /// Ties keep append order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "display lists never approach u32::MAX entries"
    )]
    pub fn opaque_front_to_back(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            self.iter()
                .enumerate()
                .filter(|(_, c)| !c.snapshot.flags.transparent)
                .map(|(i, _)| i as u32),
        );
        let slots = self.as_slice();
        out.sort_by(|a, b| {
            let za = slots[*a as usize].snapshot.z;
            let zb = slots[*b as usize].snapshot.z;
            zb.total_cmp(&za)
        });
    }

    /// Fills `out` with transparent slots ordered farthest first.
    ///
    /// Ties keep append order.
    pub fn alpha_back_to_front(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend_from_slice(&self.alpha);
        let slots = self.as_slice();
        out.sort_by(|a, b| {
            let za = slots[*a as usize].snapshot.z;
            let zb = slots[*b as usize].snapshot.z;
            za.total_cmp(&zb)
        });
    }
}

impl<'a> IntoIterator for &'a DisplayList {
    type Item = &'a DrawContext;
    type IntoIter = core::slice::Iter<'a, DrawContext>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(fill: Color) -> DrawContent {
        DrawContent::Shape {
            shape: ShapeId(0),
            fill,
        }
    }

    fn rect_snapshot(x: f64, y: f64, w: f64, h: f64) -> DrawSnapshot {
        DrawSnapshot::new(
            shape(Color::WHITE),
            Rect::new(0.0, 0.0, w, h),
            Affine::translate((x, y)),
        )
    }

    #[test]
    fn empty_list_yields_nothing() {
        let mut list = DisplayList::new();
        list.begin();
        list.terminate();
        assert_eq!(list.iter().count(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn single_append_yields_one() {
        let mut list = DisplayList::new();
        list.begin();
        let slot = list.append(NodeId(7), rect_snapshot(0.0, 0.0, 10.0, 10.0));
        list.terminate();
        assert_eq!(slot, 0);
        assert_eq!(list.iter().count(), 1);
        assert_eq!(list.get(0).map(|c| c.node), Some(NodeId(7)));
        assert!(list.get(1).is_none());
    }

    #[test]
    fn begin_reuses_pool() {
        let mut list = DisplayList::new();
        list.begin();
        for i in 0..4 {
            list.append(NodeId(i), rect_snapshot(0.0, 0.0, 1.0, 1.0));
        }
        list.terminate();
        list.begin();
        list.append(NodeId(9), rect_snapshot(0.0, 0.0, 1.0, 1.0));
        list.terminate();
        assert_eq!(list.len(), 1);
        assert_eq!(list.pooled(), 4);
        assert_eq!(list.iter().map(|c| c.node).collect::<Vec<_>>(), [NodeId(9)]);
    }

    #[test]
    #[should_panic(expected = "append after terminate")]
    fn append_after_terminate_panics() {
        let mut list = DisplayList::new();
        list.begin();
        list.terminate();
        list.append(NodeId(0), rect_snapshot(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn snapshot_bounds_follow_transform() {
        let snap = rect_snapshot(10.5, 20.0, 30.0, 40.0);
        assert_eq!(snap.bounds, IRect::from_edges(10, 20, 41, 60));
        let clipped = snap.with_clip(IRect::new(0, 0, 20, 30));
        assert_eq!(clipped.visible_bounds(), IRect::from_edges(10, 20, 20, 30));
    }

    #[test]
    fn translucent_content_goes_to_alpha_list() {
        let mut list = DisplayList::new();
        list.begin();
        list.append(NodeId(0), rect_snapshot(0.0, 0.0, 1.0, 1.0));
        list.append(
            NodeId(1),
            DrawSnapshot::new(
                shape(Color::WHITE.with_alpha(10)),
                Rect::new(0.0, 0.0, 1.0, 1.0),
                Affine::IDENTITY,
            ),
        );
        list.append(
            NodeId(2),
            rect_snapshot(0.0, 0.0, 1.0, 1.0).with_opacity(0.5),
        );
        list.terminate();
        assert_eq!(list.alpha_slots(), &[1, 2]);
    }

    #[test]
    fn pass_ordering_by_depth() {
        let mut list = DisplayList::new();
        list.begin();
        list.append(NodeId(0), rect_snapshot(0.0, 0.0, 1.0, 1.0).with_z(-5.0));
        list.append(NodeId(1), rect_snapshot(0.0, 0.0, 1.0, 1.0).with_z(3.0));
        list.append(
            NodeId(2),
            rect_snapshot(0.0, 0.0, 1.0, 1.0).with_z(1.0).transparent(),
        );
        list.append(
            NodeId(3),
            rect_snapshot(0.0, 0.0, 1.0, 1.0).with_z(-1.0).transparent(),
        );
        list.terminate();

        let mut order = Vec::new();
        list.opaque_front_to_back(&mut order);
        assert_eq!(order, [1, 0]);
        list.alpha_back_to_front(&mut order);
        assert_eq!(order, [3, 2]);
    }
}
