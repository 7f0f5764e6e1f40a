// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual surface configuration.
//!
//! [`VisualConfig`] is a plain `Copy` struct chosen once per surface; the
//! preset constructors cover the common cases and fields can be adjusted
//! with struct update syntax.

use crate::camera::CameraLayout;
use crate::color::Color;
use crate::node::NodeId;
use crate::rect_array::MergePolicy;
use crate::stereo::StereoConfig;

/// Rendering capability of a surface, fixed at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SurfaceTier {
    /// Software 2D with dirty-rect accounting.
    #[default]
    Surface2D,
    /// 2D drawn through an accelerated backend.
    Surface2DAccelerated,
    /// 3D scene with camera, depth-ordered passes and stereo.
    Surface3DScene,
    /// 3D scene on an alternate (layered) path.
    Surface3DAlternate,
}

impl SurfaceTier {
    /// Returns `true` for the 3D tiers.
    #[inline]
    #[must_use]
    pub const fn is_3d(self) -> bool {
        matches!(self, Self::Surface3DScene | Self::Surface3DAlternate)
    }

    /// Returns `true` for tiers that repaint the whole surface every frame.
    ///
    /// Accelerated and 3D surfaces do not keep their previous contents, so
    /// dirty-rect accounting does not apply to them.
    #[inline]
    #[must_use]
    pub const fn always_full_redraw(self) -> bool {
        !matches!(self, Self::Surface2D)
    }
}

/// Where a surface's pixels end up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SurfaceTarget {
    /// The compositor's main output.
    #[default]
    Root,
    /// An offscreen buffer used as a texture by the given scene node.
    Offscreen(NodeId),
}

impl SurfaceTarget {
    /// Returns `true` for offscreen targets.
    #[inline]
    #[must_use]
    pub const fn is_offscreen(self) -> bool {
        matches!(self, Self::Offscreen(_))
    }
}

/// Everything a visual surface is configured with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Capability tier.
    pub tier: SurfaceTier,
    /// Root or offscreen.
    pub target: SurfaceTarget,
    /// Skip dirty-rect accounting and repaint the whole surface.
    pub direct_flush: bool,
    /// Clear color of root surfaces without an active background.
    pub clear_color: Color,
    /// Scene origin at the surface center with +Y up.
    pub center_coords: bool,
    /// Dirty-rect merge heuristic.
    pub merge_policy: MergePolicy,
    /// Multi-view output (3D tiers only).
    pub stereo: StereoConfig,
    /// Per-view camera derivation (3D tiers only).
    pub camera_layout: CameraLayout,
    /// Lights a backend may enable per view (3D tiers only).
    pub max_lights: u32,
    /// Clip planes a backend may enable per view (3D tiers only).
    pub max_clips: u32,
}

impl VisualConfig {
    /// A 2D root surface.
    #[must_use]
    pub const fn root(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tier: SurfaceTier::Surface2D,
            target: SurfaceTarget::Root,
            direct_flush: false,
            clear_color: Color::BLACK,
            center_coords: false,
            merge_policy: MergePolicy::DEFAULT,
            stereo: StereoConfig::MONO,
            camera_layout: CameraLayout::Straight,
            max_lights: 8,
            max_clips: 6,
        }
    }

    /// A 2D offscreen surface rendered for `node`'s texture.
    #[must_use]
    pub const fn offscreen(width: u32, height: u32, node: NodeId) -> Self {
        Self {
            target: SurfaceTarget::Offscreen(node),
            clear_color: Color::TRANSPARENT,
            ..Self::root(width, height)
        }
    }

    /// A 3D root surface with centered coordinates.
    #[must_use]
    pub const fn scene_3d(width: u32, height: u32) -> Self {
        Self {
            tier: SurfaceTier::Surface3DScene,
            center_coords: true,
            ..Self::root(width, height)
        }
    }

    /// Returns `true` if every frame repaints the whole surface.
    #[must_use]
    pub const fn full_redraw(&self) -> bool {
        self.direct_flush || self.tier.always_full_redraw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let root = VisualConfig::root(800, 600);
        assert!(!root.full_redraw());
        assert!(!root.target.is_offscreen());

        let off = VisualConfig::offscreen(64, 64, NodeId(3));
        assert_eq!(off.target, SurfaceTarget::Offscreen(NodeId(3)));
        assert_eq!(off.clear_color, Color::TRANSPARENT);

        let scene = VisualConfig::scene_3d(800, 600);
        assert!(scene.tier.is_3d());
        assert!(scene.full_redraw());
        assert!(scene.center_coords);
    }

    #[test]
    fn direct_flush_forces_full_redraw() {
        let cfg = VisualConfig {
            direct_flush: true,
            ..VisualConfig::root(800, 600)
        };
        assert!(cfg.full_redraw());
    }

    #[test]
    fn accelerated_2d_is_not_3d() {
        assert!(!SurfaceTier::Surface2DAccelerated.is_3d());
        assert!(SurfaceTier::Surface2DAccelerated.always_full_redraw());
        assert!(SurfaceTier::Surface3DAlternate.is_3d());
    }
}
