// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-to-device mapping.

use kurbo::{Affine, Point};
use parallax_core::camera::ViewTransform;
use parallax_core::geometry::IRect;

/// How scene coordinates map to surface pixels.
///
/// In the default mode scene and device coordinates coincide. With centered
/// coordinates the scene origin sits at the surface center and +Y points up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMapping {
    width: u32,
    height: u32,
    centered: bool,
}

impl SceneMapping {
    /// A mapping for a `width` × `height` surface.
    #[must_use]
    pub const fn new(width: u32, height: u32, centered: bool) -> Self {
        Self {
            width,
            height,
            centered,
        }
    }

    /// The full fillable area in scene coordinates.
    #[must_use]
    pub fn surface_rect(&self) -> IRect {
        let w = i32::try_from(self.width).unwrap_or(i32::MAX);
        let h = i32::try_from(self.height).unwrap_or(i32::MAX);
        if self.centered {
            IRect::new(-(w / 2), -(h / 2), w, h)
        } else {
            IRect::from_size(w, h)
        }
    }

    /// Scene-to-device transform.
    #[must_use]
    pub fn to_device(&self) -> Affine {
        if self.centered {
            Affine::new([
                1.0,
                0.0,
                0.0,
                -1.0,
                f64::from(self.width / 2),
                f64::from(self.height / 2),
            ])
        } else {
            Affine::IDENTITY
        }
    }

    /// Maps a scene-space pixel rectangle to device pixels.
    #[must_use]
    pub fn rect_to_device(&self, rect: IRect) -> IRect {
        if rect.is_empty() {
            return IRect::ZERO;
        }
        IRect::from_rect(self.to_device().transform_rect_bbox(rect.to_rect()))
    }

    /// Maps a device point back to scene coordinates.
    #[must_use]
    pub fn point_to_scene(&self, p: Point) -> Point {
        self.to_device().inverse() * p
    }
}

/// How a backend places a context on its current target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// 2D: content transform followed by this scene-to-device affine.
    Flat(Affine),
    /// 3D: content lies in the plane `z = snapshot.z` of world space and is
    /// seen through a per-view camera, filling `viewport` of the target.
    Perspective {
        /// Camera for the current view.
        view: ViewTransform,
        /// Target area in pixels.
        viewport: IRect,
    },
}
