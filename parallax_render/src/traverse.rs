// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between scene traversal and the visual manager.

use kurbo::Affine;
use parallax_core::display_list::{DisplayList, DrawContext};
use parallax_core::geometry::IRect;
use parallax_core::node::NodeId;
use parallax_core::stacks::ModifierStacks;

/// Per-frame state handed from the frame driver through the traverser.
///
/// The modifier stacks are snapshots the traverser fills while walking the
/// scene; the visual manager only reads them.
#[derive(Clone, Debug, Default)]
pub struct TraverseState {
    /// Background, viewport, navigation and fog bindings.
    pub stacks: ModifierStacks,
    /// Root transform the traverser starts from.
    pub transform: Affine,
    /// Extra top-level clip in scene pixels, narrowing the viewport.
    pub clip: Option<IRect>,
}

impl TraverseState {
    /// Empty stacks, identity transform, no clip.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stacks: ModifierStacks::new(),
            transform: Affine::IDENTITY,
            clip: None,
        }
    }
}

/// Walks a scene and appends drawable nodes to a display list.
pub trait SceneTraverser {
    /// Appends every drawable under `root` to `list`, in paint order.
    ///
    /// The list has already been [`begin`](DisplayList::begin)-ed and is
    /// terminated by the caller afterwards.
    fn traverse(&mut self, root: NodeId, state: &mut TraverseState, list: &mut DisplayList);
}

/// A precomputed list of contexts is a traverser that ignores the root.
impl SceneTraverser for [DrawContext] {
    fn traverse(&mut self, root: NodeId, state: &mut TraverseState, list: &mut DisplayList) {
        _ = (root, state);
        for ctx in self.iter() {
            list.append(ctx.node, ctx.snapshot);
        }
    }
}
