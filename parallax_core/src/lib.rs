// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core data model for a visual surface manager.
//!
//! `parallax_core` holds the backend-independent state a scene renderer keeps
//! per drawable surface: what is stale, what to paint, what was painted last
//! frame, and (for 3D surfaces) how the camera is replicated across stereo
//! views. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! One frame flows through the types like this:
//!
//! ```text
//!   scene traverser
//!       │ append()
//!       ▼
//!   DisplayList ──► FrameHistory::collect_damage() ──► DirtyRegionSet
//!       │                                                  │
//!       │      ModifierStacks ── apply_viewport() ─────────┘ (top clip)
//!       ▼
//!   Camera::view_transform(view) ── per view ──► raster backend
//!       │
//!       ▼
//!   FrameHistory::commit()
//! ```
//!
//! **[`rect_array`]**: dirty-rectangle accumulation with a tunable
//! [`MergePolicy`](rect_array::MergePolicy).
//!
//! **[`display_list`]**: pooled, explicitly sized per-frame list of draw
//! contexts, with opaque and alpha pass ordering.
//!
//! **[`history`]**: last frame's drawn bounds, diffed against the new list.
//!
//! **[`camera`]** and **[`transform`]**: the surface camera and its
//! per-view derivations (straight, off-axis, linear and circular tracks).
//!
//! **[`stacks`]**: background, viewport, navigation and fog snapshots.
//!
//! **[`stereo`]**: multi-view output configuration and validation.
//!
//! **[`config`]**: surface tier, target and presets.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) events for the frame cycle,
//! with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies.
//! - `trace-rich` (disabled by default, implies `trace`): Adds damage-rect
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod camera;
pub mod color;
pub mod config;
pub mod display_list;
pub mod error;
pub mod geometry;
pub mod history;
pub mod node;
pub mod rect_array;
pub mod stacks;
pub mod stereo;
pub mod time;
pub mod trace;
pub mod transform;
