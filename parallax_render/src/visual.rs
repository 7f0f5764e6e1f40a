// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visual manager: one raster surface and its frame cycle.
//!
//! Each frame runs to completion before the next starts:
//!
//! ```text
//! Idle ──acquire──▶ SurfaceAcquired ──draw──▶ Drawn ──release──▶ SurfaceReleased ──▶ Idle
//! ```
//!
//! The prepare step (traversal, history diff, dirty region, stereo checks)
//! runs before acquisition, so a frame that aborts for configuration reasons
//! never touches the surface. A frame with nothing dirty skips acquisition
//! altogether.

use alloc::boxed::Box;
use alloc::vec::Vec;

use parallax_core::camera::{Camera, CameraLayout};
use parallax_core::color::Color;
use parallax_core::config::VisualConfig;
use parallax_core::display_list::DisplayList;
use parallax_core::error::ConfigError;
use parallax_core::geometry::IRect;
use parallax_core::history::FrameHistory;
use parallax_core::node::NodeId;
use parallax_core::rect_array::DirtyRegionSet;
use parallax_core::stereo::StereoConfig;
use parallax_core::time::HostTime;
#[cfg(feature = "trace-rich")]
use parallax_core::trace::DamageRect;
use parallax_core::trace::{
    AbortReason, FrameAbortedEvent, FrameBeginEvent, FrameSummaryBuilder, GeometryFailureEvent,
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink, Tracer,
};

use crate::backend::{RasterBackend, ViewSetup, ViewTarget};
use crate::damage::DamageRegion;
use crate::error::{RasterError, VisualError};
use crate::event::{self, EventHandler, SceneEvent};
use crate::projection::{Projection, SceneMapping};
use crate::stereo::StereoCompositor;
use crate::traverse::{SceneTraverser, TraverseState};

/// Where the frame cycle currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameState {
    /// Between frames.
    #[default]
    Idle,
    /// Surface access held, nothing drawn yet.
    SurfaceAcquired,
    /// The display list has been painted.
    Drawn,
    /// Surface access given back.
    SurfaceReleased,
}

/// What a completed frame did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter of the visual.
    pub frame_index: u64,
    /// Whether the surface was acquired and modified.
    pub surface_touched: bool,
    /// Contexts in the display list.
    pub contexts: u32,
    /// Contexts painted (summed over views).
    pub contexts_drawn: u32,
    /// Repainted area in device pixels.
    pub damage: DamageRegion,
    /// Nodes drawn last frame and absent now.
    pub vanished: u32,
    /// Contexts drawn in the previous frame.
    pub nodes_prev_frame: u32,
    /// Contexts in this frame.
    pub nodes_current_frame: u32,
    /// Nodes whose content failed to rasterize, in failure order.
    pub failed: Vec<NodeId>,
    /// Views rendered.
    pub views: u32,
}

/// Owns a raster surface and drives its frames.
pub struct VisualManager<B: RasterBackend> {
    backend: B,
    config: VisualConfig,
    camera: Camera,
    compositor: StereoCompositor,
    list: DisplayList,
    history: FrameHistory,
    dirty: DirtyRegionSet,
    frame_state: FrameState,
    frame_index: u64,
    needs_full: bool,
    last_background: Option<Color>,
    pending_error: Option<ConfigError>,
    trace: Option<Box<dyn TraceSink>>,
    opaque_order: Vec<u32>,
    alpha_order: Vec<u32>,
    regions: Vec<IRect>,
}

impl<B: RasterBackend> core::fmt::Debug for VisualManager<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisualManager")
            .field("config", &self.config)
            .field("frame_state", &self.frame_state)
            .field("frame_index", &self.frame_index)
            .field("contexts", &self.list.len())
            .finish_non_exhaustive()
    }
}

impl<B: RasterBackend> VisualManager<B> {
    /// Creates a visual over `backend`. The surface is attached lazily by
    /// the first frame.
    #[must_use]
    pub fn new(backend: B, config: VisualConfig) -> Self {
        let mut camera = Camera::for_surface(config.width, config.height);
        camera.layout = config.camera_layout;
        Self {
            backend,
            config,
            camera,
            compositor: StereoCompositor::new(config.stereo),
            list: DisplayList::new(),
            history: FrameHistory::new(),
            dirty: DirtyRegionSet::new(config.merge_policy),
            frame_state: FrameState::Idle,
            frame_index: 0,
            needs_full: true,
            last_background: None,
            pending_error: None,
            trace: None,
            opaque_order: Vec::new(),
            alpha_order: Vec::new(),
            regions: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &VisualConfig {
        &self.config
    }

    /// The raster backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the raster backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The base camera (3D tiers).
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the base camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The stereo compositor.
    #[must_use]
    pub const fn compositor(&self) -> &StereoCompositor {
        &self.compositor
    }

    /// The display list of the last frame.
    #[must_use]
    pub const fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Where the frame cycle is.
    #[must_use]
    pub const fn frame_state(&self) -> FrameState {
        self.frame_state
    }

    /// Frames started so far.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Installs (or removes) the trace sink.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace = sink;
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Replaces the stereo configuration, compiling a program if the new
    /// mode needs one and a surface is attached.
    pub fn set_stereo(&mut self, stereo: StereoConfig) {
        if let Some(program) = self.compositor.set_program(None) {
            self.backend.delete_program(program);
        }
        self.config.stereo = stereo;
        self.compositor.set_config(stereo);
        if self.backend.is_attached() {
            self.compile_program_if_needed();
        }
        self.needs_full = true;
    }

    /// Sets the per-view camera layout.
    pub fn set_camera_layout(&mut self, layout: CameraLayout) {
        self.config.camera_layout = layout;
        self.camera.layout = layout;
        self.needs_full = true;
    }

    /// Sets the camera layout from a raw configuration code.
    ///
    /// An unknown code selects [`CameraLayout::Straight`] and makes the next
    /// frame fail with [`VisualError::Configuration`]; frames after that
    /// render with the fallback.
    pub fn set_camera_layout_raw(&mut self, raw: u32) {
        match CameraLayout::from_raw(raw) {
            Ok(layout) => self.set_camera_layout(layout),
            Err(e) => {
                self.set_camera_layout(CameraLayout::Straight);
                self.pending_error = Some(e);
            }
        }
    }

    /// Resizes the surface and re-attaches it.
    ///
    /// # Errors
    ///
    /// [`VisualError::Attachment`] if the new surface cannot be attached.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), VisualError> {
        self.config.width = width;
        self.config.height = height;
        self.camera.set_viewport(width, height);
        self.reset_graphics()
    }

    /// Tears down and re-creates the surface and brush.
    ///
    /// The next frame is a full redraw, indistinguishable from the first
    /// frame of a fresh visual.
    ///
    /// # Errors
    ///
    /// [`VisualError::Attachment`] if the surface cannot be attached again.
    pub fn reset_graphics(&mut self) -> Result<(), VisualError> {
        if let Some(program) = self.compositor.set_program(None) {
            self.backend.delete_program(program);
        }
        self.backend.detach();
        self.history.reset();
        self.needs_full = true;
        self.last_background = None;
        self.frame_state = FrameState::Idle;
        self.attach()
    }

    fn attach(&mut self) -> Result<(), VisualError> {
        self.backend
            .attach(self.config.width, self.config.height)
            .map_err(VisualError::Attachment)?;
        self.compile_program_if_needed();
        Ok(())
    }

    fn compile_program_if_needed(&mut self) {
        let stereo = &self.config.stereo;
        if !self.config.tier.is_3d()
            || !stereo.mode.requires_program()
            || self.compositor.program().is_some()
        {
            return;
        }
        // A failed compile leaves no program; frames report it as a
        // configuration error.
        if let Ok(program) = self.backend.compile_program(stereo.effective_views()) {
            self.compositor.set_program(Some(program));
        }
    }

    fn mapping(&self) -> SceneMapping {
        SceneMapping::new(self.config.width, self.config.height, self.config.center_coords)
    }

    fn surface_size(&self) -> IRect {
        IRect::from_size(
            i32::try_from(self.config.width).unwrap_or(i32::MAX),
            i32::try_from(self.config.height).unwrap_or(i32::MAX),
        )
    }

    /// The camera as configured by the current stacks.
    fn frame_camera(&self, state: &TraverseState) -> Camera {
        let mut camera = self.camera;
        camera.layout = self.config.camera_layout;
        if let Some(nav) = state.stacks.navigation() {
            camera = camera.with_navigation(nav);
        }
        if let Some(sep) = self.config.stereo.eye_separation {
            camera.eye_separation = sep;
        }
        camera
    }

    // -----------------------------------------------------------------------
    // Frame driver entry points
    // -----------------------------------------------------------------------

    /// Size of the drawable area: the active viewport if one is bound,
    /// otherwise the surface.
    #[must_use]
    pub fn surface_size_info(&self, state: &TraverseState) -> (u32, u32) {
        let area = match state.stacks.viewport() {
            Some(_) => state.stacks.apply_viewport(self.mapping().surface_rect()),
            None => self.surface_size(),
        };
        (area.width.unsigned_abs(), area.height.unsigned_abs())
    }

    /// Clears the per-context frame flags of the current display list.
    pub fn clean_contexts(&mut self) {
        for ctx in self.list.as_mut_slice() {
            ctx.snapshot.flags.changed = false;
            ctx.snapshot.flags.drawn = false;
        }
    }

    /// Routes an input event to the nodes of the last frame.
    ///
    /// See [`event::dispatch`].
    pub fn execute_event(
        &self,
        state: &TraverseState,
        event: &SceneEvent,
        children: &[NodeId],
        handler: &mut dyn EventHandler,
    ) -> bool {
        let projection = if self.config.tier.is_3d() {
            let camera = self.frame_camera(state);
            Projection::Perspective {
                view: camera.view_transform(0, 1),
                viewport: self.surface_size(),
            }
        } else {
            Projection::Flat(self.mapping().to_device())
        };
        event::dispatch(&self.list, &projection, children, event, handler)
    }

    /// Draws one frame. Returns `false` if the frame was aborted.
    ///
    /// Use [`try_draw_frame`](Self::try_draw_frame) for the reason.
    pub fn draw_frame<T>(
        &mut self,
        root: NodeId,
        state: &mut TraverseState,
        traverser: &mut T,
        is_root_visual: bool,
    ) -> bool
    where
        T: SceneTraverser + ?Sized,
    {
        self.try_draw_frame(root, state, traverser, is_root_visual)
            .is_ok()
    }

    /// Draws one frame.
    ///
    /// `is_root_visual` enables the background stack; other visuals clear to
    /// transparent or the configured color.
    ///
    /// # Errors
    ///
    /// - [`VisualError::Attachment`] if no surface could be attached.
    /// - [`VisualError::Configuration`] for an unusable camera or stereo
    ///   setup; the surface is not touched.
    /// - [`VisualError::Acquisition`] if surface access is refused; the
    ///   previous frame stays on screen.
    /// - [`VisualError::Raster`] if the backend failed mid-frame; the frame
    ///   was still released and the next one is a full redraw.
    pub fn try_draw_frame<T>(
        &mut self,
        root: NodeId,
        state: &mut TraverseState,
        traverser: &mut T,
        is_root_visual: bool,
    ) -> Result<FrameReport, VisualError>
    where
        T: SceneTraverser + ?Sized,
    {
        let mut sink = self.trace.take();
        let mut tracer = match sink.as_deref_mut() {
            Some(s) => Tracer::new(s),
            None => Tracer::none(),
        };
        let result = self.run_frame(root, state, traverser, is_root_visual, &mut tracer);
        drop(tracer);
        self.trace = sink;
        result
    }

    fn run_frame<T>(
        &mut self,
        root: NodeId,
        state: &mut TraverseState,
        traverser: &mut T,
        is_root_visual: bool,
        tracer: &mut Tracer<'_>,
    ) -> Result<FrameReport, VisualError>
    where
        T: SceneTraverser + ?Sized,
    {
        self.frame_index += 1;
        let is_3d = self.config.tier.is_3d();
        let views = if is_3d { self.compositor.views() } else { 1 };
        let now = self.backend.now();
        tracer.frame_begin(&FrameBeginEvent {
            frame_index: self.frame_index,
            now,
            width: self.config.width,
            height: self.config.height,
            views,
            direct_flush: self.config.direct_flush,
        });
        let mut ft = FrameTrace {
            tracer,
            summary: FrameSummaryBuilder::new(self.frame_index),
            frame_index: self.frame_index,
        };

        // -- Prepare ----------------------------------------------------------
        ft.begin(PhaseKind::Prepare, now);
        self.list.begin();
        traverser.traverse(root, state, &mut self.list);
        self.list.terminate();

        if !self.backend.is_attached() {
            self.history.reset();
            self.needs_full = true;
            if let Err(e) = self.attach() {
                ft.abort(AbortReason::Acquisition, self.backend.now());
                return Err(e);
            }
        }
        let config_check = match self.pending_error.take() {
            Some(e) => Err(e),
            None if is_3d => self.compositor.validate(self.config.width, self.config.height),
            None => Ok(()),
        };
        if let Err(e) = config_check {
            ft.abort(AbortReason::Configuration, self.backend.now());
            return Err(e.into());
        }

        let mapping = self.mapping();
        let surface_rect = mapping.surface_rect();
        let mut top_clip = state.stacks.apply_viewport(surface_rect);
        if let Some(clip) = state.clip {
            top_clip = top_clip.intersect(clip);
        }
        self.dirty.set_policy(self.config.merge_policy);
        self.dirty.reset(surface_rect, top_clip);

        let background = if is_root_visual {
            state.stacks.background().map(|b| b.color)
        } else {
            None
        };
        if self.config.full_redraw() || self.needs_full || background != self.last_background {
            self.dirty.invalidate_all();
        }
        let history = self.history.collect_damage(&self.list, &mut self.dirty);
        ft.end(PhaseKind::Prepare, self.backend.now());

        let mut report = FrameReport {
            frame_index: self.frame_index,
            contexts: count(self.list.len()),
            vanished: history.vanished,
            nodes_prev_frame: count(self.history.len()),
            nodes_current_frame: count(self.list.len()),
            views,
            ..FrameReport::default()
        };

        if self.dirty.is_empty() {
            report.damage = DamageRegion::None;
            self.finish_frame(background, &mut ft, &report);
            return Ok(report);
        }

        // -- Acquire ----------------------------------------------------------
        ft.begin(PhaseKind::Acquire, self.backend.now());
        if let Err(e) = self.backend.acquire() {
            ft.abort(AbortReason::Acquisition, self.backend.now());
            return Err(VisualError::Acquisition(e));
        }
        self.frame_state = FrameState::SurfaceAcquired;
        ft.end(PhaseKind::Acquire, self.backend.now());

        // -- Draw -------------------------------------------------------------
        let clear_color = match background {
            Some(c) => c,
            None if self.config.target.is_offscreen() => Color::TRANSPARENT,
            None => self.config.clear_color,
        };
        ft.begin(PhaseKind::Draw, self.backend.now());
        let drawn = if is_3d {
            self.draw_views(&mapping, state, clear_color, &mut ft, &mut report)
        } else {
            self.draw_flat(&mapping, clear_color, &mut ft, &mut report)
        };
        self.frame_state = FrameState::Drawn;

        // -- Release ----------------------------------------------------------
        ft.begin(PhaseKind::Release, self.backend.now());
        self.backend.release();
        self.frame_state = FrameState::SurfaceReleased;
        ft.end(PhaseKind::Release, self.backend.now());

        if let Err(e) = drawn {
            self.needs_full = true;
            self.frame_state = FrameState::Idle;
            return Err(VisualError::Raster(e));
        }

        report.surface_touched = true;
        report.damage = DamageRegion::from_dirty(&self.dirty, |r| mapping.rect_to_device(r));
        {
            let c = ft.summary.counters();
            c.dirty_rects = count(self.dirty.rects().len());
            c.dirty_area = report.damage.area(self.surface_size().area());
            c.alpha_contexts = count(self.list.alpha_slots().len());
        }
        #[cfg(feature = "trace-rich")]
        if let DamageRegion::Rects(rects) = &report.damage {
            let rects: Vec<DamageRect> = rects.iter().map(|r| DamageRect::from(*r)).collect();
            ft.tracer.damage_rects(self.frame_index, &rects);
        }
        self.needs_full = false;
        self.finish_frame(background, &mut ft, &report);
        Ok(report)
    }

    fn finish_frame(&mut self, background: Option<Color>, ft: &mut FrameTrace<'_, '_>, report: &FrameReport) {
        self.history.commit(&self.list);
        self.last_background = background;
        self.clean_contexts();
        self.frame_state = FrameState::Idle;

        let c = ft.summary.counters();
        c.contexts = report.contexts;
        c.contexts_drawn = report.contexts_drawn;
        c.vanished = report.vanished;
        c.failures = count(report.failed.len());
        c.views = report.views;
        c.surface_touched = report.surface_touched;
        let summary = core::mem::replace(&mut ft.summary, FrameSummaryBuilder::new(report.frame_index)).finish();
        ft.tracer.frame_summary(&summary);
    }

    /// 2D path: clear each dirty rectangle, then paint the list in order.
    fn draw_flat(
        &mut self,
        mapping: &SceneMapping,
        clear_color: Color,
        ft: &mut FrameTrace<'_, '_>,
        report: &mut FrameReport,
    ) -> Result<(), RasterError> {
        let projection = Projection::Flat(mapping.to_device());
        let top_clip = self.dirty.top_clip();
        self.regions.clear();
        self.regions.extend_from_slice(self.dirty.rects());

        for r in &self.regions {
            self.backend.clear(Some(mapping.rect_to_device(*r)), clear_color)?;
        }

        for ctx in self.list.as_mut_slice() {
            let visible = ctx.snapshot.visible_bounds().intersect(top_clip);
            if visible.is_empty() {
                continue;
            }
            let mut drawn = false;
            for r in &self.regions {
                let area = visible.intersect(*r);
                if area.is_empty() {
                    continue;
                }
                let clip = mapping.rect_to_device(area);
                let result = if ctx.snapshot.content.is_bitmap() {
                    match self.backend.draw_bitmap(ctx, &projection, clip) {
                        Ok(true) => Ok(()),
                        Ok(false) => self.backend.draw_context(ctx, &projection, clip),
                        Err(e) => Err(e),
                    }
                } else {
                    self.backend.draw_context(ctx, &projection, clip)
                };
                match result {
                    Ok(()) => drawn = true,
                    Err(e) if skips_context(e) => {
                        ft.geometry_failure(ctx.node, visible);
                        report.failed.push(ctx.node);
                        drawn = false;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            ctx.snapshot.flags.drawn = drawn;
            if drawn {
                report.contexts_drawn += 1;
            }
        }
        ft.end(PhaseKind::Draw, self.backend.now());
        Ok(())
    }

    /// 3D path: render the list once per view, opaque contexts nearest
    /// first then transparent ones farthest first, and composite.
    fn draw_views(
        &mut self,
        mapping: &SceneMapping,
        state: &TraverseState,
        clear_color: Color,
        ft: &mut FrameTrace<'_, '_>,
        report: &mut FrameReport,
    ) -> Result<(), RasterError> {
        let camera = self.frame_camera(state);
        let views = self.compositor.views();
        let multiview = self.compositor.uses_view_targets();
        let (width, height) = if multiview {
            self.config.stereo.view_size(self.config.width, self.config.height)
        } else {
            (self.config.width, self.config.height)
        };
        let fog = state.stacks.fog().copied();
        let top_clip = scale_to_view(
            mapping.rect_to_device(self.dirty.top_clip()),
            (self.config.width, self.config.height),
            (width, height),
        );

        self.list.opaque_front_to_back(&mut self.opaque_order);
        self.list.alpha_back_to_front(&mut self.alpha_order);

        for v in 0..views {
            self.compositor.set_current_view(v);
            let setup = ViewSetup {
                index: v,
                count: views,
                target: if multiview {
                    ViewTarget::Offscreen(v)
                } else {
                    ViewTarget::Surface
                },
                width,
                height,
                transform: camera.view_transform(v, views),
                fog,
                max_lights: self.config.max_lights,
                max_clips: self.config.max_clips,
            };
            self.backend.begin_view(&setup)?;
            let viewport = setup.viewport();
            let clip = top_clip.intersect(viewport);
            // View targets are recomposited whole, so they clear whole.
            self.backend.clear((!multiview).then_some(clip), clear_color)?;
            if clip.is_empty() {
                self.backend.end_view(v);
                continue;
            }
            let projection = Projection::Perspective {
                view: setup.transform,
                viewport,
            };

            let contexts = self.list.as_mut_slice();
            for slot in self.opaque_order.iter().chain(&self.alpha_order) {
                let Some(ctx) = contexts.get_mut(*slot as usize) else {
                    continue;
                };
                if report.failed.contains(&ctx.node) {
                    continue;
                }
                match self.backend.draw_context(ctx, &projection, clip) {
                    Ok(()) => {
                        ctx.snapshot.flags.drawn = true;
                        report.contexts_drawn += 1;
                    }
                    Err(e) if skips_context(e) => {
                        ft.geometry_failure(ctx.node, ctx.snapshot.visible_bounds());
                        report.failed.push(ctx.node);
                    }
                    Err(e) => {
                        self.backend.end_view(v);
                        return Err(e);
                    }
                }
            }
            self.backend.end_view(v);
        }
        ft.end(PhaseKind::Draw, self.backend.now());

        if multiview {
            ft.begin(PhaseKind::Composite, self.backend.now());
            let compositor = &self.compositor;
            match compositor.program() {
                Some(program) if self.config.stereo.mode.requires_program() => {
                    self.backend.draw_interleaved(
                        program,
                        compositor.mesh(),
                        views,
                        self.config.stereo.reverse_views,
                    )?;
                }
                _ => {
                    self.backend.composite_views(&mut |targets, out| {
                        compositor.compose(targets, out);
                    })?;
                }
            }
            ft.end(PhaseKind::Composite, self.backend.now());
        }
        Ok(())
    }
}

impl<B: RasterBackend> Drop for VisualManager<B> {
    fn drop(&mut self) {
        if let Some(program) = self.compositor.set_program(None) {
            self.backend.delete_program(program);
        }
        self.backend.detach();
    }
}

/// Scales a device rectangle of a `surface` sized target onto a `view`
/// sized one, snapping outward.
fn scale_to_view(rect: IRect, surface: (u32, u32), view: (u32, u32)) -> IRect {
    if surface == view || surface.0 == 0 || surface.1 == 0 || rect.is_empty() {
        return rect;
    }
    let axis = |lo: i32, hi: i32, from: u32, to: u32| {
        let (from, to) = (i64::from(from), i64::from(to));
        let lo = (i64::from(lo) * to).div_euclid(from);
        let hi = -(-i64::from(hi) * to).div_euclid(from);
        (clamp_i32(lo), clamp_i32(hi))
    };
    let (x0, x1) = axis(rect.x, rect.right(), surface.0, view.0);
    let (y0, y1) = axis(rect.y, rect.bottom(), surface.1, view.1);
    IRect::from_edges(x0, y0, x1, y1)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "clamped to the i32 range first"
)]
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Errors that skip one context instead of failing the frame.
fn skips_context(e: RasterError) -> bool {
    matches!(
        e,
        RasterError::Geometry { .. } | RasterError::UnknownShape | RasterError::UnknownTexture
    )
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "display lists never approach u32::MAX entries"
)]
fn count(n: usize) -> u32 {
    n as u32
}

/// Phase bookkeeping for one frame: the tracer plus the summary builder.
struct FrameTrace<'t, 'a> {
    tracer: &'t mut Tracer<'a>,
    summary: FrameSummaryBuilder,
    frame_index: u64,
}

impl FrameTrace<'_, '_> {
    fn begin(&mut self, phase: PhaseKind, timestamp: HostTime) {
        self.summary.phase_begin(phase, timestamp);
        self.tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn end(&mut self, phase: PhaseKind, timestamp: HostTime) {
        self.summary.phase_end(phase, timestamp);
        self.tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn abort(&mut self, reason: AbortReason, timestamp: HostTime) {
        self.tracer.frame_aborted(&FrameAbortedEvent {
            frame_index: self.frame_index,
            reason,
            timestamp,
        });
    }

    fn geometry_failure(&mut self, node: NodeId, bounds: IRect) {
        self.tracer.geometry_failure(&GeometryFailureEvent {
            frame_index: self.frame_index,
            node,
            bounds,
        });
    }
}
