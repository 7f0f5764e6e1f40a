// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque handles into the scene graph and resource stores.
//!
//! Nodes, textures and shapes are owned by the host's scene graph and by the
//! raster backend. The visual manager only passes these handles through; it
//! never interprets the values.

use core::fmt;

/// Identifies a scene-graph node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A bitmap registered with the raster backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}

/// A vector outline registered with the raster backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeId({})", self.0)
    }
}
