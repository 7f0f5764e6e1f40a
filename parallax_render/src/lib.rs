// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame orchestration for parallax visual surfaces.
//!
//! This crate sits between a scene traverser and a device-specific raster
//! backend. It defines:
//!
//! - [`VisualManager`]: owns one surface and drives its
//!   acquire → draw → release cycle, with dirty-rect repaint on 2D tiers and
//!   multi-view rendering on 3D tiers
//! - [`RasterBackend`]: the contract a backend implements
//! - [`StereoCompositor`]: recombination of per-view renders
//! - [`SceneTraverser`] and [`TraverseState`]: the traversal seam
//! - [`EventHandler`] and [`SceneEvent`]: picking and event routing
//! - [`DamageRegion`] and [`FrameReport`]: what a frame did
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Dispatches frame events to the installed
//!   [`TraceSink`](parallax_core::trace::TraceSink).
//! - `trace-rich` (disabled by default, implies `trace`): Adds damage-rect
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod backend;
mod damage;
mod error;
pub mod event;
mod pixels;
mod projection;
pub mod stereo;
mod traverse;
mod visual;

pub use backend::{RasterBackend, ViewSetup, ViewTarget};
pub use damage::DamageRegion;
pub use error::{RasterError, VisualError};
pub use event::{EventHandler, EventKind, SceneEvent};
pub use pixels::PixelBuffer;
pub use projection::{Projection, SceneMapping};
pub use stereo::StereoCompositor;
pub use traverse::{SceneTraverser, TraverseState};
pub use visual::{FrameReport, FrameState, VisualManager};
