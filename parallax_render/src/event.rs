// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input event routing.
//!
//! Positional events are picked against the last drawn display list, top-most
//! context first: last appended in 2D, nearest `z` in 3D. Everything else goes to the candidate nodes in order until
//! one handles it.

use alloc::vec::Vec;

use kurbo::{Point, Rect};
use parallax_core::display_list::{DisplayList, DrawContext};
use parallax_core::node::NodeId;
use parallax_core::transform::Vec3;

use crate::projection::Projection;

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventKind {
    /// A button or touch went down.
    PointerDown,
    /// A button or touch went up.
    PointerUp,
    /// The pointer moved.
    PointerMove,
    /// Scroll wheel.
    Wheel {
        /// Scroll amount, positive away from the user.
        delta: f64,
    },
    /// Keyboard key.
    Key {
        /// Platform key code.
        code: u32,
    },
}

/// An input event for a visual surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEvent {
    /// Kind of event.
    pub kind: EventKind,
    /// Pointer position in device pixels, for positional events.
    pub position: Option<Point>,
}

impl SceneEvent {
    /// A positional event at `(x, y)` device pixels.
    #[must_use]
    pub const fn at(kind: EventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Some(Point::new(x, y)),
        }
    }

    /// A key event.
    #[must_use]
    pub const fn key(code: u32) -> Self {
        Self {
            kind: EventKind::Key { code },
            position: None,
        }
    }
}

/// Receives events routed to scene nodes.
pub trait EventHandler {
    /// Offers `event` to `node`. `local` is the pointer in the node's local
    /// coordinates (the origin for non-positional events). Returns `true`
    /// if the event was consumed.
    fn handle(&mut self, node: NodeId, event: &SceneEvent, local: Point) -> bool;
}

/// Routes `event` through `list`, restricted to `children` (every node when
/// empty). Returns `true` once a handler consumes it.
pub fn dispatch(
    list: &DisplayList,
    projection: &Projection,
    children: &[NodeId],
    event: &SceneEvent,
    handler: &mut dyn EventHandler,
) -> bool {
    let eligible = |node: NodeId| children.is_empty() || children.contains(&node);

    let Some(position) = event.position else {
        if children.is_empty() {
            return list
                .iter()
                .any(|ctx| handler.handle(ctx.node, event, Point::ORIGIN));
        }
        return children
            .iter()
            .any(|node| handler.handle(*node, event, Point::ORIGIN));
    };

    let slots = list.as_slice();
    let mut order: Vec<&DrawContext> = slots.iter().rev().collect();
    if matches!(projection, Projection::Perspective { .. }) {
        // Stable: equal depths keep the later context on top.
        order.sort_by(|a, b| b.snapshot.z.total_cmp(&a.snapshot.z));
    }

    for ctx in order {
        if !eligible(ctx.node) {
            continue;
        }
        if let Some(local) = hit_test(ctx, projection, position) {
            if handler.handle(ctx.node, event, local) {
                return true;
            }
        }
    }
    false
}

/// Returns the local coordinates of `device` inside `ctx`, or `None` if the
/// point misses it.
#[must_use]
pub fn hit_test(ctx: &DrawContext, projection: &Projection, device: Point) -> Option<Point> {
    let snap = &ctx.snapshot;
    match projection {
        Projection::Flat(to_device) => {
            if to_device.determinant() == 0.0 || snap.transform.determinant() == 0.0 {
                return None;
            }
            let scene = to_device.inverse() * device;
            if !contains_inclusive(snap.visible_bounds().to_rect(), scene) {
                return None;
            }
            let local = snap.transform.inverse() * scene;
            contains_inclusive(snap.local_bounds, local).then_some(local)
        }
        Projection::Perspective { view, viewport } => {
            let b = snap.local_bounds;
            let corners = [
                Point::new(b.x0, b.y0),
                Point::new(b.x1, b.y0),
                Point::new(b.x1, b.y1),
                Point::new(b.x0, b.y1),
            ]
            .map(|p| {
                let s = snap.transform * p;
                view.project(Vec3::new(s.x, s.y, snap.z), *viewport)
            });
            let [Some(p0), Some(p1), Some(p2), Some(p3)] = corners else {
                return None;
            };
            let (s, t) = unit_square_coords([p0, p1, p2, p3], device)?;
            if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
                return None;
            }
            Some(Point::new(b.x0 + s * b.width(), b.y0 + t * b.height()))
        }
    }
}

fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Inverts the projective map taking the unit square onto `quad`
/// (corners in `(0,0) (1,0) (1,1) (0,1)` order) at `p`.
fn unit_square_coords(quad: [Point; 4], p: Point) -> Option<(f64, f64)> {
    let [q0, q1, q2, q3] = quad;
    let (dx1, dy1) = (q1.x - q2.x, q1.y - q2.y);
    let (dx2, dy2) = (q3.x - q2.x, q3.y - q2.y);
    let (dx3, dy3) = (q0.x - q1.x + q2.x - q3.x, q0.y - q1.y + q2.y - q3.y);

    let (g, h) = if dx3.abs() < 1e-12 && dy3.abs() < 1e-12 {
        (0.0, 0.0)
    } else {
        let den = dx1 * dy2 - dx2 * dy1;
        if den.abs() < 1e-12 {
            return None;
        }
        ((dx3 * dy2 - dx2 * dy3) / den, (dx1 * dy3 - dx3 * dy1) / den)
    };
    let a = q1.x - q0.x + g * q1.x;
    let b = q3.x - q0.x + h * q3.x;
    let c = q0.x;
    let d = q1.y - q0.y + g * q1.y;
    let e = q3.y - q0.y + h * q3.y;
    let f = q0.y;

    // Adjugate of [[a b c] [d e f] [g h 1]].
    let m = [
        [e - f * h, c * h - b, b * f - c * e],
        [f * g - d, a - c * g, c * d - a * f],
        [d * h - e * g, b * g - a * h, a * e - b * d],
    ];
    let s = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
    let t = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
    let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
    if w.abs() < 1e-12 {
        return None;
    }
    Some((s / w, t / w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Affine;
    use parallax_core::camera::Camera;
    use parallax_core::color::Color;
    use parallax_core::display_list::{DrawContent, DrawSnapshot};
    use parallax_core::geometry::IRect;
    use parallax_core::node::ShapeId;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(NodeId, Point)>,
        accept: Option<NodeId>,
    }

    impl EventHandler for Recorder {
        fn handle(&mut self, node: NodeId, _event: &SceneEvent, local: Point) -> bool {
            self.seen.push((node, local));
            self.accept == Some(node)
        }
    }

    fn square(node: u32, x: f64, y: f64) -> (NodeId, DrawSnapshot) {
        (
            NodeId(node),
            DrawSnapshot::new(
                DrawContent::Shape {
                    shape: ShapeId(0),
                    fill: Color::WHITE,
                },
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Affine::translate((x, y)),
            ),
        )
    }

    fn list_of(entries: &[(NodeId, DrawSnapshot)]) -> DisplayList {
        let mut list = DisplayList::new();
        list.begin();
        for (node, snap) in entries {
            list.append(*node, *snap);
        }
        list.terminate();
        list
    }

    #[test]
    fn topmost_context_is_offered_first() {
        let list = list_of(&[square(1, 0.0, 0.0), square(2, 5.0, 5.0)]);
        let mut rec = Recorder::default();
        let ev = SceneEvent::at(EventKind::PointerDown, 7.0, 7.0);
        assert!(!dispatch(&list, &Projection::Flat(Affine::IDENTITY), &[], &ev, &mut rec));
        assert_eq!(
            rec.seen,
            [
                (NodeId(2), Point::new(2.0, 2.0)),
                (NodeId(1), Point::new(7.0, 7.0))
            ]
        );
    }

    #[test]
    fn handled_event_stops_routing() {
        let list = list_of(&[square(1, 0.0, 0.0), square(2, 5.0, 5.0)]);
        let mut rec = Recorder {
            accept: Some(NodeId(2)),
            ..Recorder::default()
        };
        let ev = SceneEvent::at(EventKind::PointerUp, 7.0, 7.0);
        assert!(dispatch(&list, &Projection::Flat(Affine::IDENTITY), &[], &ev, &mut rec));
        assert_eq!(rec.seen.len(), 1, "node 1 is never asked");
    }

    #[test]
    fn children_filter_picking() {
        let list = list_of(&[square(1, 0.0, 0.0), square(2, 5.0, 5.0)]);
        let mut rec = Recorder::default();
        let ev = SceneEvent::at(EventKind::PointerMove, 7.0, 7.0);
        dispatch(&list, &Projection::Flat(Affine::IDENTITY), &[NodeId(1)], &ev, &mut rec);
        assert_eq!(rec.seen, [(NodeId(1), Point::new(7.0, 7.0))]);
    }

    #[test]
    fn keys_go_to_children_in_order() {
        let list = list_of(&[square(1, 0.0, 0.0)]);
        let mut rec = Recorder {
            accept: Some(NodeId(9)),
            ..Recorder::default()
        };
        let handled = dispatch(
            &list,
            &Projection::Flat(Affine::IDENTITY),
            &[NodeId(8), NodeId(9), NodeId(10)],
            &SceneEvent::key(13),
            &mut rec,
        );
        assert!(handled);
        let nodes: Vec<_> = rec.seen.iter().map(|(n, _)| *n).collect();
        assert_eq!(nodes, [NodeId(8), NodeId(9)]);
    }

    #[test]
    fn perspective_hit_at_plane_center() {
        let camera = Camera::for_surface(100, 100);
        let view = camera.view_transform(0, 1);
        let viewport = IRect::from_size(100, 100);
        let (node, snap) = square(4, -5.0, -5.0);
        let ctx = DrawContext {
            node,
            snapshot: snap,
        };
        let projection = Projection::Perspective { view, viewport };
        let local = hit_test(&ctx, &projection, Point::new(50.0, 50.0));
        let local = local.expect("center of the surface hits the square");
        assert!((local.x - 5.0).abs() < 1e-6, "x was {}", local.x);
        assert!((local.y - 5.0).abs() < 1e-6, "y was {}", local.y);
        assert!(hit_test(&ctx, &projection, Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn perspective_picks_nearest_plane_first() {
        let camera = Camera::for_surface(100, 100);
        let projection = Projection::Perspective {
            view: camera.view_transform(0, 1),
            viewport: IRect::from_size(100, 100),
        };
        let (near, near_snap) = square(1, -5.0, -5.0);
        let (back, back_snap) = square(2, -5.0, -5.0);
        let (mid, mid_snap) = square(3, -5.0, -5.0);
        // Appended nearest first, so list order disagrees with depth.
        let list = list_of(&[
            (near, near_snap.with_z(camera.focal_distance() * 0.5)),
            (back, back_snap.with_z(0.0)),
            (mid, mid_snap.with_z(camera.focal_distance() * 0.25)),
        ]);

        let mut rec = Recorder::default();
        let ev = SceneEvent::at(EventKind::PointerDown, 50.0, 50.0);
        assert!(!dispatch(&list, &projection, &[], &ev, &mut rec));
        let nodes: Vec<_> = rec.seen.iter().map(|(n, _)| *n).collect();
        assert_eq!(nodes, [near, mid, back]);

        let mut rec = Recorder {
            accept: Some(near),
            ..Recorder::default()
        };
        assert!(dispatch(&list, &projection, &[], &ev, &mut rec));
        assert_eq!(rec.seen.len(), 1, "the occluded planes are never asked");
    }
}
