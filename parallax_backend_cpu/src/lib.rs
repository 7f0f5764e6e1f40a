// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software raster backend for parallax.
//!
//! [`CpuBackend`] implements [`RasterBackend`] over plain pixel buffers:
//!
//! - Surface and per-view targets as [`PixelBuffer`]s
//! - Vector outlines ([`kurbo::BezPath`]) filled per pixel, flat or in
//!   perspective
//! - Axis-aligned texture blits with color keying for the bitmap fast path
//! - Distance fog
//! - A built-in sub-pixel interleaving program for custom stereo output
//! - A monotonic nanosecond clock
//!
//! It doubles as the reference backend in tests: [`CpuStats`] counts what
//! was done and [`FailureInjection`] makes individual operations fail.
//!
//! [`RasterBackend`]: parallax_render::RasterBackend
//! [`PixelBuffer`]: parallax_render::PixelBuffer

mod backend;
mod raster;
mod time;

pub use backend::{CpuBackend, CpuStats, FailureInjection};
pub use time::{Clock, timebase};
