// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-contributed modifier stacks.
//!
//! Background, viewport, navigation and fog nodes bind themselves while the
//! scene is traversed. The traverser hands the bound entries over each frame
//! as a [`ModifierStacks`] snapshot; the last entry of each stack is the
//! active one and an empty stack means default behavior.

use alloc::vec::Vec;

use crate::color::Color;
use crate::geometry::IRect;
use crate::node::NodeId;

/// An active background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Background {
    /// Binding node.
    pub node: NodeId,
    /// Clear color.
    pub color: Color,
}

/// An active viewport, narrowing the drawable area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Binding node.
    pub node: NodeId,
    /// Area in scene pixels.
    pub rect: IRect,
}

/// How the user moves through a 3D scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// No user navigation.
    None,
    /// Ground-constrained walking.
    Walk,
    /// Orbit around the scene.
    #[default]
    Examine,
    /// Unconstrained flight.
    Fly,
}

/// An active navigation binding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationInfo {
    /// Binding node.
    pub node: NodeId,
    /// Navigation mode.
    pub kind: NavigationKind,
    /// Movement speed in world units per second.
    pub speed: f64,
    /// Collision radius of the viewer. Half of it becomes the near plane.
    pub avatar_size: f64,
    /// Far plane distance; zero or negative means unlimited.
    pub visibility_limit: f64,
    /// Whether a headlight is attached to the viewer.
    pub headlight: bool,
}

impl NavigationInfo {
    /// Default navigation for `node`.
    #[must_use]
    pub const fn new(node: NodeId) -> Self {
        Self {
            node,
            kind: NavigationKind::Examine,
            speed: 1.0,
            avatar_size: 0.25,
            visibility_limit: 0.0,
            headlight: true,
        }
    }
}

/// Fog falloff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FogKind {
    /// Linear ramp to `visibility_range`.
    #[default]
    Linear,
    /// Exponential decay.
    Exponential,
}

/// An active fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    /// Binding node.
    pub node: NodeId,
    /// Fog color.
    pub color: Color,
    /// Falloff.
    pub kind: FogKind,
    /// Distance at which objects are fully fogged; zero disables fog.
    pub visibility_range: f64,
}

/// Per-frame snapshot of the four modifier stacks.
#[derive(Clone, Debug, Default)]
pub struct ModifierStacks {
    /// Bound backgrounds, oldest first.
    pub backgrounds: Vec<Background>,
    /// Bound viewports, oldest first.
    pub viewports: Vec<Viewport>,
    /// Bound navigation infos, oldest first.
    pub navigation: Vec<NavigationInfo>,
    /// Bound fogs, oldest first.
    pub fogs: Vec<Fog>,
}

impl ModifierStacks {
    /// Empty stacks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            backgrounds: Vec::new(),
            viewports: Vec::new(),
            navigation: Vec::new(),
            fogs: Vec::new(),
        }
    }

    /// Active background.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.backgrounds.last()
    }

    /// Active viewport.
    #[must_use]
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewports.last()
    }

    /// Active navigation info.
    #[must_use]
    pub fn navigation(&self) -> Option<&NavigationInfo> {
        self.navigation.last()
    }

    /// Active fog. Fogs with a non-positive range are ignored.
    #[must_use]
    pub fn fog(&self) -> Option<&Fog> {
        self.fogs.last().filter(|f| f.visibility_range > 0.0)
    }

    /// Effective top-level clipper: the active viewport narrowed to
    /// `surface_rect`, or `surface_rect` itself when no viewport is bound.
    #[must_use]
    pub fn apply_viewport(&self, surface_rect: IRect) -> IRect {
        match self.viewport() {
            Some(vp) => vp.rect.intersect(surface_rect),
            None => surface_rect,
        }
    }

    /// Empties every stack.
    pub fn clear(&mut self) {
        self.backgrounds.clear();
        self.viewports.clear();
        self.navigation.clear();
        self.fogs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_entry_wins() {
        let mut stacks = ModifierStacks::new();
        assert!(stacks.background().is_none());
        stacks.backgrounds.push(Background {
            node: NodeId(1),
            color: Color::BLACK,
        });
        stacks.backgrounds.push(Background {
            node: NodeId(2),
            color: Color::WHITE,
        });
        assert_eq!(stacks.background().map(|b| b.node), Some(NodeId(2)));
    }

    #[test]
    fn viewport_narrows_clip() {
        let surface = IRect::from_size(800, 600);
        let mut stacks = ModifierStacks::new();
        assert_eq!(stacks.apply_viewport(surface), surface);
        stacks.viewports.push(Viewport {
            node: NodeId(3),
            rect: IRect::new(700, 500, 400, 400),
        });
        assert_eq!(stacks.apply_viewport(surface), IRect::new(700, 500, 100, 100));
        stacks.clear();
        assert_eq!(stacks.apply_viewport(surface), surface);
    }

    #[test]
    fn zero_range_fog_is_inactive() {
        let mut stacks = ModifierStacks::new();
        stacks.fogs.push(Fog {
            node: NodeId(4),
            color: Color::WHITE,
            kind: FogKind::Linear,
            visibility_range: 0.0,
        });
        assert!(stacks.fog().is_none());
    }
}
