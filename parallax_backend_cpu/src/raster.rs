// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pixel scan conversion.
//!
//! Every pixel center inside the clipped device bounds is mapped back to the
//! content's local coordinates, tested against the local bounds and outline,
//! shaded and blended into the target.

use kurbo::{Affine, BezPath, Point, Rect, Shape as _};
use parallax_core::camera::ViewTransform;
use parallax_core::color::{Color, ColorKey};
use parallax_core::geometry::IRect;
use parallax_core::stacks::{Fog, FogKind};
use parallax_core::transform::Vec3;
use parallax_render::PixelBuffer;

/// Row-major 3×3 matrix acting on homogeneous 2D points.
pub(crate) type Mat3 = [[f64; 3]; 3];

/// Where a fill takes its color from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Paint<'a> {
    Solid(Color),
    Texture {
        pixels: &'a PixelBuffer,
        key: Option<ColorKey>,
    },
}

/// Device-to-local mapping of one fill.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Inverse {
    Affine(Affine),
    Homography(Mat3),
}

impl Inverse {
    fn local(&self, device: Point) -> Option<Point> {
        match self {
            Self::Affine(a) => Some(*a * device),
            Self::Homography(m) => apply(m, device),
        }
    }
}

/// Distance fog seen from `eye`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FogSample {
    pub(crate) fog: Fog,
    pub(crate) eye: Vec3,
    pub(crate) transform: Affine,
    pub(crate) z: f64,
}

impl FogSample {
    fn shade(&self, local: Point, color: Color) -> Color {
        let s = self.transform * local;
        let dist = (Vec3::new(s.x, s.y, self.z) - self.eye).length();
        let range = self.fog.visibility_range;
        let factor = match self.fog.kind {
            FogKind::Linear => (dist / range).clamp(0.0, 1.0),
            FogKind::Exponential => 1.0 - (-dist / range).exp(),
        };
        mix(color, self.fog.color, factor)
    }
}

/// One content fill.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fill<'a> {
    pub(crate) local_bounds: Rect,
    pub(crate) outline: Option<&'a BezPath>,
    pub(crate) paint: Paint<'a>,
    pub(crate) opacity: f32,
}

impl Fill<'_> {
    fn sample(&self, local: Point) -> Option<Color> {
        let b = self.local_bounds;
        if local.x < b.x0 || local.x >= b.x1 || local.y < b.y0 || local.y >= b.y1 {
            return None;
        }
        if let Some(outline) = self.outline {
            if !outline.contains(local) {
                return None;
            }
        }
        let color = match self.paint {
            Paint::Solid(c) => c,
            Paint::Texture { pixels, key } => {
                let tx = texel(local.x - b.x0, b.width(), pixels.width());
                let ty = texel(local.y - b.y0, b.height(), pixels.height());
                let c = pixels.get(tx, ty)?;
                key.map_or(c, |k| k.apply(c))
            }
        };
        Some(color)
    }
}

/// Plane depths of the current view target, one per pixel. Larger is
/// nearer; a cleared plane holds negative infinity.
#[derive(Debug)]
pub(crate) struct DepthTest<'a> {
    pub(crate) plane: &'a mut [f64],
    pub(crate) stride: u32,
    pub(crate) z: f64,
    /// Opaque fills record their depth, transparent ones only test it.
    pub(crate) write: bool,
}

impl DepthTest<'_> {
    fn pass(&mut self, x: u32, y: u32) -> bool {
        let i = y as usize * self.stride as usize + x as usize;
        let Some(d) = self.plane.get_mut(i) else {
            return true;
        };
        if self.z < *d {
            return false;
        }
        if self.write {
            *d = self.z;
        }
        true
    }
}

/// Fills `area` of `target` (device pixels). Returns the number of pixels
/// written.
pub(crate) fn fill(
    target: &mut PixelBuffer,
    area: IRect,
    inverse: &Inverse,
    fill: &Fill<'_>,
    fog: Option<&FogSample>,
    mut depth: Option<&mut DepthTest<'_>>,
) -> u64 {
    let area = area.intersect(target.bounds());
    let mut written = 0;
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let Some(local) = inverse.local(center) else {
                continue;
            };
            let Some(mut color) = fill.sample(local) else {
                continue;
            };
            let (px, py) = (x.unsigned_abs(), y.unsigned_abs());
            if let Some(d) = depth.as_deref_mut() {
                if !d.pass(px, py) {
                    continue;
                }
            }
            if let Some(f) = fog {
                color = f.shade(local, color);
            }
            target.blend(px, py, color.scale_alpha(fill.opacity));
            written += 1;
        }
    }
    written
}

/// Axis-aligned texture blit. `to_device` must have no rotation or skew.
pub(crate) fn blit(
    target: &mut PixelBuffer,
    area: IRect,
    to_device: Affine,
    local_bounds: Rect,
    pixels: &PixelBuffer,
    key: Option<ColorKey>,
    opacity: f32,
) -> u64 {
    let [sx, _, _, sy, tx, ty] = to_device.as_coeffs();
    let area = area.intersect(target.bounds());
    if area.is_empty() || sx == 0.0 || sy == 0.0 {
        return 0;
    }
    let column = |x: i32| {
        let local = (f64::from(x) + 0.5 - tx) / sx;
        (local >= local_bounds.x0 && local < local_bounds.x1)
            .then(|| texel(local - local_bounds.x0, local_bounds.width(), pixels.width()))
    };
    let columns: Vec<_> = (area.x..area.right()).map(column).collect();

    let mut written = 0;
    for y in area.y..area.bottom() {
        let local = (f64::from(y) + 0.5 - ty) / sy;
        if local < local_bounds.y0 || local >= local_bounds.y1 {
            continue;
        }
        let row = texel(local - local_bounds.y0, local_bounds.height(), pixels.height());
        for (x, col) in (area.x..area.right()).zip(&columns) {
            let Some(col) = col else {
                continue;
            };
            let Some(mut c) = pixels.get(*col, row) else {
                continue;
            };
            if let Some(k) = key {
                c = k.apply(c);
            }
            target.blend(x.unsigned_abs(), y.unsigned_abs(), c.scale_alpha(opacity));
            written += 1;
        }
    }
    written
}

/// Maps `offset` within a span of `extent` local units onto `size` texels.
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to 0..size before the cast"
)]
fn texel(offset: f64, extent: f64, size: u32) -> u32 {
    if size == 0 || extent <= 0.0 {
        return 0;
    }
    let t = (offset / extent * f64::from(size)).floor();
    t.clamp(0.0, f64::from(size - 1)) as u32
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to 0..=255 before the cast"
)]
fn mix(a: Color, b: Color, t: f64) -> Color {
    let lerp = |x: u8, y: u8| {
        let v = f64::from(x) + (f64::from(y) - f64::from(x)) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    Color::from_argb(a.a(), lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

// ---------------------------------------------------------------------------
// Perspective mapping
// ---------------------------------------------------------------------------

/// Local-to-device homography of a content plane at depth `z`, placed by
/// `transform` and seen through `view` into `viewport`.
pub(crate) fn homography(view: &ViewTransform, viewport: IRect, transform: Affine, z: f64) -> Mat3 {
    let vp = view.view_projection();
    let [c0, c1, c2, c3] = [vp.col(0), vp.col(1), vp.col(2), vp.col(3)];
    let [a, b, c, d, e, f] = transform.as_coeffs();
    // Clip-space component `i` as a function of (u, v, 1).
    let row = |i: usize| {
        [
            a * c0[i] + b * c1[i],
            c * c0[i] + d * c1[i],
            e * c0[i] + f * c1[i] + z * c2[i] + c3[i],
        ]
    };
    let (hx, hy, hw) = (row(0), row(1), row(3));
    let half_w = f64::from(viewport.width) * 0.5;
    let half_h = f64::from(viewport.height) * 0.5;
    let ox = f64::from(viewport.x) + half_w;
    let oy = f64::from(viewport.y) + half_h;
    [
        [0, 1, 2].map(|k| half_w * hx[k] + ox * hw[k]),
        [0, 1, 2].map(|k| -half_h * hy[k] + oy * hw[k]),
        hw,
    ]
}

/// Device bounds of `local_bounds` under `m`, or `None` if part of it lies
/// behind the eye.
pub(crate) fn projected_bounds(m: &Mat3, local_bounds: Rect) -> Option<IRect> {
    let b = local_bounds;
    let corners = [(b.x0, b.y0), (b.x1, b.y0), (b.x1, b.y1), (b.x0, b.y1)];
    let mut out: Option<Rect> = None;
    for (u, v) in corners {
        let w = m[2][0] * u + m[2][1] * v + m[2][2];
        if w <= f64::EPSILON {
            return None;
        }
        let p = Point::new(
            (m[0][0] * u + m[0][1] * v + m[0][2]) / w,
            (m[1][0] * u + m[1][1] * v + m[1][2]) / w,
        );
        out = Some(match out {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    }
    out.map(IRect::from_rect)
}

/// Inverse of `m`, or `None` if it is singular.
pub(crate) fn invert(m: &Mat3) -> Option<Mat3> {
    let [[a, b, c], [d, e, f], [g, h, i]] = *m;
    let co00 = e * i - f * h;
    let co01 = f * g - d * i;
    let co02 = d * h - e * g;
    let det = a * co00 + b * co01 + c * co02;
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    let inv = 1.0 / det;
    Some([
        [co00 * inv, (c * h - b * i) * inv, (b * f - c * e) * inv],
        [co01 * inv, (a * i - c * g) * inv, (c * d - a * f) * inv],
        [co02 * inv, (b * g - a * h) * inv, (a * e - b * d) * inv],
    ])
}

fn apply(m: &Mat3, p: Point) -> Option<Point> {
    let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
    if w.abs() <= f64::EPSILON {
        return None;
    }
    Some(Point::new(
        (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
        (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_core::camera::Camera;

    fn solid(color: Color) -> Fill<'static> {
        Fill {
            local_bounds: Rect::new(0.0, 0.0, 4.0, 4.0),
            outline: None,
            paint: Paint::Solid(color),
            opacity: 1.0,
        }
    }

    #[test]
    fn affine_fill_covers_translated_square() {
        let mut target = PixelBuffer::new(8, 8);
        let to_device = Affine::translate((2.0, 3.0));
        let written = fill(
            &mut target,
            IRect::new(2, 3, 4, 4),
            &Inverse::Affine(to_device.inverse()),
            &solid(Color::WHITE),
            None,
            None,
        );
        assert_eq!(written, 16);
        assert_eq!(target.get(2, 3), Some(Color::WHITE));
        assert_eq!(target.get(5, 6), Some(Color::WHITE));
        assert_eq!(target.get(6, 6), Some(Color::TRANSPARENT));
    }

    #[test]
    fn outline_limits_coverage() {
        let mut target = PixelBuffer::new(4, 4);
        let area = target.bounds();
        let triangle = {
            let mut p = BezPath::new();
            p.move_to((0.0, 0.0));
            p.line_to((4.0, 0.0));
            p.line_to((0.0, 4.0));
            p.close_path();
            p
        };
        let f = Fill {
            outline: Some(&triangle),
            ..solid(Color::WHITE)
        };
        fill(
            &mut target,
            area,
            &Inverse::Affine(Affine::IDENTITY),
            &f,
            None,
            None,
        );
        assert_eq!(target.get(0, 0), Some(Color::WHITE));
        assert_eq!(target.get(3, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn depth_test_keeps_nearer_plane() {
        let mut target = PixelBuffer::new(2, 1);
        let mut plane = [f64::NEG_INFINITY; 2];
        let area = target.bounds();
        let inverse = Inverse::Affine(Affine::scale(0.5));
        let near = Fill {
            local_bounds: Rect::new(0.0, 0.0, 0.5, 1.0),
            ..solid(Color::WHITE)
        };
        let mut depth = DepthTest {
            plane: &mut plane,
            stride: 2,
            z: 5.0,
            write: true,
        };
        fill(&mut target, area, &inverse, &near, None, Some(&mut depth));

        let red = Color::from_rgb(255, 0, 0);
        depth.z = 1.0;
        let written = fill(&mut target, area, &inverse, &solid(red), None, Some(&mut depth));
        assert_eq!(written, 1, "only the uncovered pixel is behind nothing");
        assert_eq!(target.get(0, 0), Some(Color::WHITE));
        assert_eq!(target.get(1, 0), Some(red));
        assert_eq!(plane, [5.0, 1.0]);
    }

    #[test]
    fn blit_applies_color_key() {
        let mut texture = PixelBuffer::filled(2, 1, Color::WHITE);
        texture.set(1, 0, Color::from_rgb(0, 255, 0));
        let mut target = PixelBuffer::filled(4, 2, Color::BLACK);
        let written = blit(
            &mut target,
            IRect::from_size(4, 2),
            Affine::scale(2.0),
            Rect::new(0.0, 0.0, 2.0, 1.0),
            &texture,
            Some(ColorKey::exact(Color::from_rgb(0, 255, 0))),
            1.0,
        );
        assert_eq!(written, 8);
        assert_eq!(target.get(1, 1), Some(Color::WHITE));
        assert_eq!(target.get(3, 0), Some(Color::BLACK), "keyed texel is transparent");
    }

    #[test]
    fn homography_round_trips() {
        let camera = Camera::for_surface(64, 64);
        let view = camera.view_transform(0, 1);
        let viewport = IRect::from_size(64, 64);
        let m = homography(&view, viewport, Affine::translate((-8.0, -8.0)), 0.0);
        let inv = invert(&m).expect("plane facing the camera is invertible");
        let local = apply(&inv, Point::new(32.0, 32.0)).expect("center is in front");
        assert!((local.x - 8.0).abs() < 1e-6, "x was {}", local.x);
        assert!((local.y - 8.0).abs() < 1e-6, "y was {}", local.y);

        let bounds = projected_bounds(&m, Rect::new(0.0, 0.0, 16.0, 16.0))
            .expect("square is in front of the eye");
        assert!(bounds.contains(IRect::new(24, 24, 16, 16)), "{bounds:?}");
        assert!(IRect::new(23, 23, 18, 18).contains(bounds), "{bounds:?}");
    }

    #[test]
    fn linear_fog_reaches_fog_color() {
        let sample = FogSample {
            fog: Fog {
                node: parallax_core::node::NodeId(1),
                color: Color::WHITE,
                kind: FogKind::Linear,
                visibility_range: 10.0,
            },
            eye: Vec3::new(0.0, 0.0, 20.0),
            transform: Affine::IDENTITY,
            z: 0.0,
        };
        assert_eq!(sample.shade(Point::ORIGIN, Color::BLACK), Color::WHITE);
    }
}
