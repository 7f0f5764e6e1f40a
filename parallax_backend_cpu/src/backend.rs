// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`CpuBackend`]: a [`RasterBackend`] drawing into [`PixelBuffer`]s.

use std::collections::{HashMap, HashSet};

use kurbo::{Affine, BezPath, Rect, Shape as _};
use parallax_core::color::Color;
use parallax_core::display_list::{DrawContent, DrawContext};
use parallax_core::geometry::IRect;
use parallax_core::node::{ShapeId, TextureId};
use parallax_core::stacks::Fog;
use parallax_core::stereo::{InterleaveMesh, ProgramHandle, StereoProgram};
use parallax_core::time::{HostTime, Timebase};
use parallax_core::transform::Vec3;
use parallax_render::{PixelBuffer, Projection, RasterBackend, RasterError, ViewSetup, ViewTarget};

use crate::raster::{self, DepthTest, Fill, FogSample, Inverse, Paint};
use crate::time::{self, Clock};

/// Counters of what the backend was asked to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuStats {
    /// Successful [`attach`](RasterBackend::attach) calls.
    pub attaches: u32,
    /// [`detach`](RasterBackend::detach) calls that released a surface.
    pub detaches: u32,
    /// Successful [`acquire`](RasterBackend::acquire) calls.
    pub acquires: u32,
    /// [`release`](RasterBackend::release) calls.
    pub releases: u32,
    /// [`clear`](RasterBackend::clear) calls.
    pub clears: u32,
    /// Pixels cleared.
    pub cleared_area: u64,
    /// Contexts drawn through the bitmap fast path.
    pub bitmaps: u32,
    /// Contexts drawn through general rasterization.
    pub contexts: u32,
    /// Pixels written by either path.
    pub painted: u64,
    /// View recombinations, CPU or program.
    pub composites: u32,
}

/// Which backend operations should fail, for exercising error paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailureInjection {
    /// [`attach`](RasterBackend::attach) returns
    /// [`RasterError::DeviceUnavailable`].
    pub attach: bool,
    /// [`acquire`](RasterBackend::acquire) returns
    /// [`RasterError::DeviceUnavailable`].
    pub acquire: bool,
    /// [`compile_program`](RasterBackend::compile_program) returns
    /// [`RasterError::ProgramCompile`].
    pub compile: bool,
}

/// Software surface, brush and view targets.
///
/// Shapes and textures are registered up front and referenced from display
/// list contexts by id.
pub struct CpuBackend {
    clock: Clock,
    surface: Option<PixelBuffer>,
    views: Vec<PixelBuffer>,
    target: ViewTarget,
    acquired: bool,
    view_eye: Vec3,
    view_fog: Option<Fog>,
    depth: Vec<f64>,
    shapes: HashMap<ShapeId, BezPath>,
    textures: HashMap<TextureId, PixelBuffer>,
    programs: HashSet<ProgramHandle>,
    next_handle: u32,
    fail: FailureInjection,
    stats: CpuStats,
}

impl core::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("surface", &self.surface)
            .field("views", &self.views.len())
            .field("target", &self.target)
            .field("acquired", &self.acquired)
            .field("shapes", &self.shapes.len())
            .field("textures", &self.textures.len())
            .field("programs", &self.programs.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    /// A backend with no surface and nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            surface: None,
            views: Vec::new(),
            target: ViewTarget::Surface,
            acquired: false,
            view_eye: Vec3::ZERO,
            view_fog: None,
            depth: Vec::new(),
            shapes: HashMap::new(),
            textures: HashMap::new(),
            programs: HashSet::new(),
            next_handle: 1,
            fail: FailureInjection::default(),
            stats: CpuStats::default(),
        }
    }

    /// Registers an outline under `id`, replacing any previous one.
    pub fn add_shape(&mut self, id: ShapeId, path: BezPath) {
        self.shapes.insert(id, path);
    }

    /// Registers a rectangle outline under `id`.
    pub fn add_rect_shape(&mut self, id: ShapeId, rect: Rect) {
        self.add_shape(id, rect.to_path(0.1));
    }

    /// Registers a texture under `id`, replacing any previous one.
    pub fn add_texture(&mut self, id: TextureId, pixels: PixelBuffer) {
        self.textures.insert(id, pixels);
    }

    /// The attached surface.
    #[must_use]
    pub fn surface(&self) -> Option<&PixelBuffer> {
        self.surface.as_ref()
    }

    /// Per-view targets from the last multi-view frame.
    #[must_use]
    pub fn view_targets(&self) -> &[PixelBuffer] {
        &self.views
    }

    /// Operation counters.
    #[must_use]
    pub const fn stats(&self) -> &CpuStats {
        &self.stats
    }

    /// Zeroes the operation counters.
    pub fn reset_stats(&mut self) {
        self.stats = CpuStats::default();
    }

    /// Makes the selected operations fail until changed again.
    pub fn inject_failures(&mut self, fail: FailureInjection) {
        self.fail = fail;
    }

    /// Number of live programs.
    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    fn check_acquired(&self) -> Result<(), RasterError> {
        if self.surface.is_none() {
            Err(RasterError::NotAttached)
        } else if !self.acquired {
            Err(RasterError::NotAcquired)
        } else {
            Ok(())
        }
    }

    fn handle(&mut self) -> ProgramHandle {
        let h = ProgramHandle(self.next_handle);
        self.next_handle += 1;
        h
    }
}

fn current_target<'a>(
    surface: &'a mut Option<PixelBuffer>,
    views: &'a mut [PixelBuffer],
    target: ViewTarget,
) -> Result<&'a mut PixelBuffer, RasterError> {
    match target {
        ViewTarget::Surface => surface.as_mut().ok_or(RasterError::NotAttached),
        ViewTarget::Offscreen(i) => views.get_mut(i as usize).ok_or(RasterError::NotAcquired),
    }
}

fn is_finite(a: Affine) -> bool {
    a.as_coeffs().iter().all(|c| c.is_finite())
}

impl RasterBackend for CpuBackend {
    fn now(&self) -> HostTime {
        self.clock.now()
    }

    fn timebase(&self) -> Timebase {
        time::timebase()
    }

    fn attach(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        if self.fail.attach {
            return Err(RasterError::DeviceUnavailable);
        }
        self.surface = Some(PixelBuffer::new(width, height));
        self.target = ViewTarget::Surface;
        self.acquired = false;
        self.stats.attaches += 1;
        Ok(())
    }

    fn detach(&mut self) {
        if self.surface.take().is_some() {
            self.stats.detaches += 1;
        }
        self.views.clear();
        self.depth.clear();
        self.acquired = false;
        self.target = ViewTarget::Surface;
    }

    fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    fn acquire(&mut self) -> Result<(), RasterError> {
        if self.surface.is_none() {
            return Err(RasterError::NotAttached);
        }
        if self.fail.acquire {
            return Err(RasterError::DeviceUnavailable);
        }
        self.acquired = true;
        self.stats.acquires += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.acquired = false;
        self.target = ViewTarget::Surface;
        self.stats.releases += 1;
    }

    fn clear(&mut self, rect: Option<IRect>, color: Color) -> Result<(), RasterError> {
        self.check_acquired()?;
        let target = current_target(&mut self.surface, &mut self.views, self.target)?;
        let area = rect.map_or(target.bounds(), |r| r.intersect(target.bounds()));
        target.fill_rect(area, color);
        self.stats.clears += 1;
        self.stats.cleared_area += area.area();
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        ctx: &DrawContext,
        projection: &Projection,
        clip: IRect,
    ) -> Result<bool, RasterError> {
        self.check_acquired()?;
        let (Projection::Flat(to_device), DrawContent::Bitmap { texture, color_key }) =
            (projection, ctx.snapshot.content)
        else {
            return Ok(false);
        };
        let full = *to_device * ctx.snapshot.transform;
        let [_, b, c, _, _, _] = full.as_coeffs();
        if b != 0.0 || c != 0.0 || !is_finite(full) {
            return Ok(false);
        }
        let pixels = self
            .textures
            .get(&texture)
            .ok_or(RasterError::UnknownTexture)?;
        let target = current_target(&mut self.surface, &mut self.views, self.target)?;
        let area = IRect::from_rect(full.transform_rect_bbox(ctx.snapshot.local_bounds)).intersect(clip);
        self.stats.painted += raster::blit(
            target,
            area,
            full,
            ctx.snapshot.local_bounds,
            pixels,
            color_key,
            ctx.snapshot.opacity,
        );
        self.stats.bitmaps += 1;
        Ok(true)
    }

    fn draw_context(
        &mut self,
        ctx: &DrawContext,
        projection: &Projection,
        clip: IRect,
    ) -> Result<(), RasterError> {
        self.check_acquired()?;
        let snap = &ctx.snapshot;
        let geometry = RasterError::Geometry { node: ctx.node };
        let (outline, paint) = match snap.content {
            DrawContent::Shape { shape, fill } => (
                Some(self.shapes.get(&shape).ok_or(RasterError::UnknownShape)?),
                Paint::Solid(fill),
            ),
            DrawContent::Bitmap { texture, color_key } => (
                None,
                Paint::Texture {
                    pixels: self
                        .textures
                        .get(&texture)
                        .ok_or(RasterError::UnknownTexture)?,
                    key: color_key,
                },
            ),
        };
        if !is_finite(snap.transform) || !snap.local_bounds.is_finite() {
            return Err(geometry);
        }
        let fill = Fill {
            local_bounds: snap.local_bounds,
            outline,
            paint,
            opacity: snap.opacity,
        };

        let (area, inverse, fog) = match projection {
            Projection::Flat(to_device) => {
                let full = *to_device * snap.transform;
                if !is_finite(full) || full.determinant() == 0.0 {
                    return Err(geometry);
                }
                let area = IRect::from_rect(full.transform_rect_bbox(snap.local_bounds)).intersect(clip);
                (area, Inverse::Affine(full.inverse()), None)
            }
            Projection::Perspective { view, viewport } => {
                let m = raster::homography(view, *viewport, snap.transform, snap.z);
                if m.iter().flatten().any(|v| !v.is_finite()) {
                    return Err(geometry);
                }
                let Some(bounds) = raster::projected_bounds(&m, snap.local_bounds) else {
                    // Crosses or lies behind the eye plane; culled.
                    return Ok(());
                };
                let Some(inv) = raster::invert(&m) else {
                    // Seen edge-on.
                    return Ok(());
                };
                let fog = self.view_fog.map(|fog| FogSample {
                    fog,
                    eye: self.view_eye,
                    transform: snap.transform,
                    z: snap.z,
                });
                (bounds.intersect(clip), Inverse::Homography(inv), fog)
            }
        };

        let target = current_target(&mut self.surface, &mut self.views, self.target)?;
        let stride = target.width();
        let mut depth = (!self.depth.is_empty()).then(|| DepthTest {
            plane: &mut self.depth,
            stride,
            z: snap.z,
            write: !snap.flags.transparent,
        });
        self.stats.painted +=
            raster::fill(target, area, &inverse, &fill, fog.as_ref(), depth.as_mut());
        self.stats.contexts += 1;
        Ok(())
    }

    fn begin_view(&mut self, setup: &ViewSetup) -> Result<(), RasterError> {
        self.check_acquired()?;
        if let ViewTarget::Offscreen(i) = setup.target {
            let i = i as usize;
            if self.views.len() <= i {
                self.views.resize_with(i + 1, || PixelBuffer::new(0, 0));
            }
            let view = &mut self.views[i];
            if view.width() != setup.width || view.height() != setup.height {
                view.resize(setup.width, setup.height);
            }
        }
        self.target = setup.target;
        let target = current_target(&mut self.surface, &mut self.views, self.target)?;
        let pixels = target.width() as usize * target.height() as usize;
        self.depth.clear();
        self.depth.resize(pixels, f64::NEG_INFINITY);
        self.view_eye = setup.transform.eye;
        self.view_fog = setup.fog;
        Ok(())
    }

    fn end_view(&mut self, index: u32) {
        _ = index;
        self.target = ViewTarget::Surface;
        self.view_fog = None;
        self.depth.clear();
    }

    fn composite_views(
        &mut self,
        compose: &mut dyn FnMut(&[PixelBuffer], &mut PixelBuffer),
    ) -> Result<(), RasterError> {
        self.check_acquired()?;
        let surface = self.surface.as_mut().ok_or(RasterError::NotAttached)?;
        compose(&self.views, surface);
        self.stats.composites += 1;
        Ok(())
    }

    fn compile_program(&mut self, views: u32) -> Result<StereoProgram, RasterError> {
        if self.fail.compile || views == 0 {
            return Err(RasterError::ProgramCompile);
        }
        let program = StereoProgram {
            program: self.handle(),
            vertex: self.handle(),
            fragment: self.handle(),
        };
        self.programs.insert(program.program);
        Ok(program)
    }

    fn draw_interleaved(
        &mut self,
        program: &StereoProgram,
        mesh: &InterleaveMesh,
        views: u32,
        reverse: bool,
    ) -> Result<(), RasterError> {
        self.check_acquired()?;
        if !self.programs.contains(&program.program) {
            return Err(RasterError::UnknownProgram);
        }
        _ = mesh;
        let surface = self.surface.as_mut().ok_or(RasterError::NotAttached)?;
        interleave_subpixels(&self.views, surface, views, reverse);
        self.stats.composites += 1;
        Ok(())
    }

    fn delete_program(&mut self, program: StereoProgram) {
        self.programs.remove(&program.program);
    }
}

/// The built-in custom program: sub-pixel `c` of column `x` shows view
/// `(3x + c) % n`, as on a slanted lenticular panel.
fn interleave_subpixels(views: &[PixelBuffer], out: &mut PixelBuffer, n: u32, reverse: bool) {
    if n == 0 {
        return;
    }
    let (w, h) = (out.width(), out.height());
    let source = |slot: u32| {
        let v = slot % n;
        let v = if reverse { n - 1 - v } else { v };
        views.get(v as usize)
    };
    for y in 0..h {
        for x in 0..w {
            let mut rgb = [0_u8; 3];
            for (c, channel) in rgb.iter_mut().enumerate() {
                let slot = x.wrapping_mul(3).wrapping_add(u32::try_from(c).unwrap_or(0));
                if let Some(view) = source(slot) {
                    let px = view.sample_scaled(x, y, w, h);
                    *channel = [px.r(), px.g(), px.b()][c];
                }
            }
            out.set(x, y, Color::from_rgb(rgb[0], rgb[1], rgb[2]));
        }
    }
}
