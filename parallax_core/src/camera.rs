// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The camera of a 3D-capable surface and its per-view variants.
//!
//! A surface owns exactly one [`Camera`]. Multi-view rendering derives one
//! [`ViewTransform`] per view from it with [`Camera::view_transform`]; the
//! intrinsic parameters (field of view, clip planes) never change between
//! views, only the eye placement and frustum shift do.
//!
//! Views are spread symmetrically around the base camera: with `n` views,
//! view `i` sits `i - (n - 1) / 2` eye separations to the right of it.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::error::ConfigError;
use crate::geometry::IRect;
use crate::stacks::NavigationInfo;
use crate::transform::{Transform3d, Vec3};

/// How per-view cameras are derived from the base camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CameraLayout {
    /// Every view uses the base camera. No parallax.
    #[default]
    Straight,
    /// Parallel eyes with a horizontally shifted frustum; all views share
    /// one convergence plane through the target.
    OffAxis,
    /// Eyes translated along a line, each turned toward the target.
    LinearTrack,
    /// Eyes rotated about the target on a circle around the up axis.
    CircularTrack,
}

impl CameraLayout {
    /// Parses a raw layout code (`0` straight, `1` off-axis, `2` linear,
    /// `3` circular).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCameraLayout`] for any other code.
    pub const fn from_raw(raw: u32) -> Result<Self, ConfigError> {
        match raw {
            0 => Ok(Self::Straight),
            1 => Ok(Self::OffAxis),
            2 => Ok(Self::LinearTrack),
            3 => Ok(Self::CircularTrack),
            other => Err(ConfigError::UnknownCameraLayout(other)),
        }
    }

    /// The raw code of this layout.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Straight => 0,
            Self::OffAxis => 1,
            Self::LinearTrack => 2,
            Self::CircularTrack => 3,
        }
    }
}

/// A pinhole camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Per-view derivation policy.
    pub layout: CameraLayout,
    /// Eye position of the base (center) view.
    pub position: Vec3,
    /// Look-at point; also the convergence point for multi-view layouts.
    pub target: Vec3,
    /// Up direction.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Near clip distance.
    pub z_near: f64,
    /// Far clip distance.
    pub z_far: f64,
    /// Distance between adjacent views, in world units.
    pub eye_separation: f64,
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
}

impl Camera {
    /// Default vertical field of view (45°).
    pub const DEFAULT_FOV: f64 = core::f64::consts::FRAC_PI_4;

    /// A camera for a `width` × `height` surface.
    ///
    /// The eye sits on +Z looking at the origin, at the distance where the
    /// `z = 0` plane maps one world unit to one pixel. Eye separation is a
    /// thirtieth of that distance.
    #[must_use]
    pub fn for_surface(width: u32, height: u32) -> Self {
        let w = f64::from(width.max(1));
        let h = f64::from(height.max(1));
        let half = Self::DEFAULT_FOV * 0.5;
        let dist = h * 0.5 * half.cos() / half.sin();
        Self {
            layout: CameraLayout::Straight,
            position: Vec3::new(0.0, 0.0, dist),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: Self::DEFAULT_FOV,
            z_near: dist / 16.0,
            z_far: dist * 16.0,
            eye_separation: dist / 30.0,
            width: w,
            height: h,
        }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Distance from the eye to the convergence point.
    #[must_use]
    pub fn focal_distance(&self) -> f64 {
        (self.target - self.position).length()
    }

    /// Returns the camera with its clip planes adjusted by a navigation
    /// binding: the near plane becomes half the avatar size and the far
    /// plane the visibility limit, when those are positive.
    #[must_use]
    pub fn with_navigation(mut self, nav: &NavigationInfo) -> Self {
        if nav.avatar_size > 0.0 {
            self.z_near = nav.avatar_size * 0.5;
        }
        if nav.visibility_limit > 0.0 {
            self.z_far = nav.visibility_limit;
        }
        if self.z_far <= self.z_near {
            self.z_far = self.z_near * 2.0;
        }
        self
    }

    /// Resizes the viewport, keeping the eye and target in place.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = f64::from(width.max(1));
        self.height = f64::from(height.max(1));
    }

    /// Signed offset of `view` from the center, in eye separations.
    #[must_use]
    pub fn view_offset(view: u32, nb_views: u32) -> f64 {
        if nb_views <= 1 {
            return 0.0;
        }
        f64::from(view) - f64::from(nb_views - 1) * 0.5
    }

    /// The transforms for `view` of `nb_views`.
    ///
    /// With a single view every layout degenerates to the base camera.
    #[must_use]
    pub fn view_transform(&self, view: u32, nb_views: u32) -> ViewTransform {
        let aspect = self.aspect();
        let (hx, hy) = Transform3d::near_half_extents(self.fov_y, aspect, self.z_near);
        let symmetric = Transform3d::frustum(-hx, hx, -hy, hy, self.z_near, self.z_far);

        let forward = self.target - self.position;
        let right = forward.cross(self.up).normalize();
        let shift = Self::view_offset(view, nb_views) * self.eye_separation;
        let focal = forward.length();

        let (eye, target, projection) = match self.layout {
            _ if shift == 0.0 => (self.position, self.target, symmetric),
            CameraLayout::Straight => (self.position, self.target, symmetric),
            CameraLayout::OffAxis => {
                let offset = right * shift;
                let skew = if focal > 0.0 { -shift * self.z_near / focal } else { 0.0 };
                let projection = Transform3d::frustum(-hx + skew, hx + skew, -hy, hy, self.z_near, self.z_far);
                (self.position + offset, self.target + offset, projection)
            }
            CameraLayout::LinearTrack => (self.position + right * shift, self.target, symmetric),
            CameraLayout::CircularTrack => {
                let angle = if focal > 0.0 { shift / focal } else { 0.0 };
                let axis = self.up.normalize();
                let arm = (self.position - self.target).rotate_about(axis, angle);
                (self.target + arm, self.target, symmetric)
            }
        };

        ViewTransform {
            eye,
            view: Transform3d::look_at(eye, target, self.up),
            projection,
        }
    }
}

/// The view and projection matrices of one rendered view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Eye position in world space.
    pub eye: Vec3,
    /// World-to-eye transform.
    pub view: Transform3d,
    /// Eye-to-clip transform.
    pub projection: Transform3d,
}

impl ViewTransform {
    /// World-to-clip transform.
    #[must_use]
    pub fn view_projection(&self) -> Transform3d {
        self.projection * self.view
    }

    /// Projects a world-space point to pixel coordinates within `viewport`
    /// (y down). Returns `None` for points behind the eye.
    #[must_use]
    pub fn project(&self, p: Vec3, viewport: IRect) -> Option<Point> {
        let [x, y, _, w] = self.view_projection().transform_point(p);
        if w <= f64::EPSILON {
            return None;
        }
        let (nx, ny) = (x / w, y / w);
        Some(Point::new(
            f64::from(viewport.x) + (nx + 1.0) * 0.5 * f64::from(viewport.width),
            f64::from(viewport.y) + (1.0 - ny) * 0.5 * f64::from(viewport.height),
        ))
    }
}
