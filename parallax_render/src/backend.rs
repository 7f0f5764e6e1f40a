// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The raster backend contract.
//!
//! A [`VisualManager`](crate::VisualManager) never touches pixels itself.
//! Everything device-specific goes through a [`RasterBackend`] injected at
//! construction:
//!
//! - **Surface lifetime**: [`attach`](RasterBackend::attach) binds a surface
//!   and brush of a given size, [`detach`](RasterBackend::detach) releases
//!   them.
//! - **Frame access**: [`acquire`](RasterBackend::acquire) and
//!   [`release`](RasterBackend::release) bracket every frame that modifies
//!   the surface. Acquisition may block on the device and may fail.
//! - **Drawing**: [`clear`](RasterBackend::clear),
//!   [`draw_bitmap`](RasterBackend::draw_bitmap) (the flat-texture fast
//!   path) and [`draw_context`](RasterBackend::draw_context) (general
//!   geometry).
//! - **Multi-view** (3D tiers): per-view targets opened with
//!   [`begin_view`](RasterBackend::begin_view), recombined on the CPU through
//!   [`composite_views`](RasterBackend::composite_views) or by a compiled
//!   program through [`draw_interleaved`](RasterBackend::draw_interleaved).
//!
//! # Frame pseudocode
//!
//! ```rust,ignore
//! backend.acquire()?;
//! for rect in dirty_rects {
//!     backend.clear(Some(rect), clear_color)?;
//! }
//! for ctx in display_list {
//!     if !backend.draw_bitmap(ctx, &projection, clip)? {
//!         backend.draw_context(ctx, &projection, clip)?;
//!     }
//! }
//! backend.release();
//! ```

use parallax_core::camera::ViewTransform;
use parallax_core::color::Color;
use parallax_core::display_list::DrawContext;
use parallax_core::geometry::IRect;
use parallax_core::stacks::Fog;
use parallax_core::stereo::{InterleaveMesh, StereoProgram};
use parallax_core::time::{HostTime, Timebase};

use crate::error::RasterError;
use crate::pixels::PixelBuffer;
use crate::projection::Projection;

/// Where a view is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewTarget {
    /// Straight into the surface (single-view output).
    Surface,
    /// Into the intermediate target for view `n`.
    Offscreen(u32),
}

/// Per-view render setup for 3D tiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSetup {
    /// Index of this view.
    pub index: u32,
    /// Total views this frame.
    pub count: u32,
    /// Render target.
    pub target: ViewTarget,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Camera for this view.
    pub transform: ViewTransform,
    /// Active fog, if any.
    pub fog: Option<Fog>,
    /// Lights the backend may enable.
    pub max_lights: u32,
    /// Clip planes the backend may enable.
    pub max_clips: u32,
}

impl ViewSetup {
    /// The whole target area.
    #[must_use]
    pub fn viewport(&self) -> IRect {
        IRect::from_size(
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}

/// A device-specific raster surface plus brush.
pub trait RasterBackend {
    /// Current monotonic time.
    fn now(&self) -> HostTime;

    /// Tick-to-nanosecond factor for [`now`](Self::now).
    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }

    /// Binds a `width` × `height` surface and brush, replacing any previous
    /// ones.
    ///
    /// # Errors
    ///
    /// Fails if the device cannot provide a surface.
    fn attach(&mut self, width: u32, height: u32) -> Result<(), RasterError>;

    /// Releases the surface and brush. Idempotent.
    fn detach(&mut self);

    /// Returns `true` while a surface is attached.
    fn is_attached(&self) -> bool;

    /// Obtains exclusive access to the surface for one frame.
    ///
    /// # Errors
    ///
    /// Fails if the device is unavailable. The surface keeps its contents.
    fn acquire(&mut self) -> Result<(), RasterError>;

    /// Ends the access obtained by [`acquire`](Self::acquire).
    fn release(&mut self);

    /// Fills `rect` (device pixels, whole target when `None`) of the current
    /// target with `color`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Fails without surface access.
    fn clear(&mut self, rect: Option<IRect>, color: Color) -> Result<(), RasterError>;

    /// Blits a flat textured rectangle if the backend has a fast path for
    /// this context. Returns `Ok(false)` to fall back to
    /// [`draw_context`](Self::draw_context).
    ///
    /// # Errors
    ///
    /// Fails if the texture cannot be drawn.
    fn draw_bitmap(
        &mut self,
        ctx: &DrawContext,
        projection: &Projection,
        clip: IRect,
    ) -> Result<bool, RasterError> {
        _ = (ctx, projection, clip);
        Ok(false)
    }

    /// Rasterizes one context, limited to `clip` (device pixels).
    ///
    /// # Errors
    ///
    /// [`RasterError::Geometry`] and friends when this context cannot be
    /// drawn; the caller skips it and carries on.
    fn draw_context(
        &mut self,
        ctx: &DrawContext,
        projection: &Projection,
        clip: IRect,
    ) -> Result<(), RasterError>;

    /// Redirects drawing to the target described by `setup`.
    ///
    /// # Errors
    ///
    /// Fails if the target cannot be allocated.
    fn begin_view(&mut self, setup: &ViewSetup) -> Result<(), RasterError>;

    /// Finishes view `index` and redirects drawing back to the surface.
    fn end_view(&mut self, index: u32);

    /// Hands the per-view targets and the surface to `compose`.
    ///
    /// # Errors
    ///
    /// Fails without surface access.
    fn composite_views(
        &mut self,
        compose: &mut dyn FnMut(&[PixelBuffer], &mut PixelBuffer),
    ) -> Result<(), RasterError>;

    /// Compiles and links the program used for custom interleaving of
    /// `views` views.
    ///
    /// # Errors
    ///
    /// [`RasterError::ProgramCompile`] if compilation or linking fails.
    fn compile_program(&mut self, views: u32) -> Result<StereoProgram, RasterError>;

    /// Draws `mesh` over the surface with `program`, sampling every view
    /// target.
    ///
    /// # Errors
    ///
    /// [`RasterError::UnknownProgram`] for stale handles.
    fn draw_interleaved(
        &mut self,
        program: &StereoProgram,
        mesh: &InterleaveMesh,
        views: u32,
        reverse: bool,
    ) -> Result<(), RasterError>;

    /// Frees a program from [`compile_program`](Self::compile_program).
    fn delete_program(&mut self, program: StereoProgram);
}
