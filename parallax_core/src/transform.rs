// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transforms and 3-vectors for the camera.
//!
//! Only what view and projection setup needs: look-at view matrices,
//! symmetric and asymmetric perspective frusta, and homogeneous point
//! transformation. Conventions follow OpenGL: right-handed eye space looking
//! down −Z, clip-space depth in `-1..=1`.

use core::ops::{Add, Mul, Neg, Sub};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A 3-component vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit X.
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit Y.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit Z.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Creates a vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product.
    #[inline]
    #[must_use]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. The zero vector is returned as is.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 { self } else { self * (1.0 / len) }
    }

    /// Rotates about a unit `axis` through the origin (right-hand rule).
    #[must_use]
    pub fn rotate_about(self, axis: Self, radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        // Rodrigues' rotation formula.
        self * c + axis.cross(self) * s + axis * (axis.dot(self) * (1.0 - c))
    }

    /// Returns `true` if every component is finite.
    #[inline]
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one column `[x, y, z, w]`, the layout GPU APIs expect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// A pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_cols(
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        )
    }

    /// A non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_cols(
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// A view matrix placing the eye at `eye`, looking at `target`.
    ///
    /// `up` need not be unit length or exactly orthogonal to the view
    /// direction.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        Self::from_cols(
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        )
    }

    /// An asymmetric perspective frustum (`glFrustum`).
    #[must_use]
    pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let w = right - left;
        let h = top - bottom;
        let d = far - near;
        Self::from_cols(
            [2.0 * near / w, 0.0, 0.0, 0.0],
            [0.0, 2.0 * near / h, 0.0, 0.0],
            [(right + left) / w, (top + bottom) / h, -(far + near) / d, -1.0],
            [0.0, 0.0, -2.0 * far * near / d, 0.0],
        )
    }

    /// Half extents `(x, y)` of the near plane for a symmetric frustum.
    #[must_use]
    pub fn near_half_extents(fov_y: f64, aspect: f64, near: f64) -> (f64, f64) {
        let half = fov_y * 0.5;
        #[cfg(feature = "std")]
        let (s, c) = half.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (half.sin(), half.cos());
        let top = near * s / c;
        (top * aspect, top)
    }

    /// A symmetric perspective projection with vertical field of view
    /// `fov_y` (radians).
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let (hx, hy) = Self::near_half_extents(fov_y, aspect, near);
        Self::frustum(-hx, hx, -hy, hy, near, far)
    }

    /// Transforms a point, returning homogeneous `[x, y, z, w]`.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p.x + c[1][i] * p.y + c[2][i] * p.z + c[3][i];
        }
        out
    }

    /// Is every element [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn scale_then_translate() {
        let combined = Transform3d::from_translation(3.0, 4.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 2.0);
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
        let p = combined.transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, [5.0, 6.0, 2.0, 1.0]);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::Z), Vec3::X);
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        assert!(close(Vec3::new(3.0, 4.0, 0.0).normalize().length(), 1.0));
    }

    #[test]
    fn rotate_quarter_turn_about_y() {
        let r = Vec3::Z.rotate_about(Vec3::Y, core::f64::consts::FRAC_PI_2);
        assert!(close(r.x, 1.0) && close(r.y, 0.0) && close(r.z, 0.0), "{r:?}");
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let view = Transform3d::look_at(eye, Vec3::ZERO, Vec3::Y);
        let p = view.transform_point(eye);
        assert!(close(p[0], 0.0) && close(p[1], 0.0) && close(p[2], 0.0));
        let t = view.transform_point(Vec3::ZERO);
        assert!(close(t[2], -10.0), "target lies down -Z: {t:?}");
    }

    #[test]
    fn perspective_maps_near_and_far() {
        let proj = Transform3d::perspective(core::f64::consts::FRAC_PI_2, 1.0, 1.0, 100.0);
        let near = proj.transform_point(Vec3::new(0.0, 0.0, -1.0));
        let far = proj.transform_point(Vec3::new(0.0, 0.0, -100.0));
        assert!(close(near[2] / near[3], -1.0));
        assert!(close(far[2] / far[3], 1.0));
        // 90° fov: the near plane spans -1..1.
        let edge = proj.transform_point(Vec3::new(1.0, 1.0, -1.0));
        assert!(close(edge[0] / edge[3], 1.0) && close(edge[1] / edge[3], 1.0));
    }

    #[test]
    fn frustum_shift_moves_center() {
        let proj = Transform3d::frustum(-1.0, 3.0, -1.0, 1.0, 1.0, 10.0);
        let p = proj.transform_point(Vec3::new(1.0, 0.0, -1.0));
        assert!(close(p[0] / p[3], 0.0), "center of shifted frustum maps to 0");
    }

    #[test]
    fn non_finite_detected() {
        let mut t = Transform3d::IDENTITY;
        assert!(t.is_finite());
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
        assert!(!Vec3::new(f64::INFINITY, 0.0, 0.0).is_finite());
    }
}
