// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stereo compositing.
//!
//! Per-view renders are recombined into the surface by one of the
//! [`InterleaveMode`]s. Everything except [`InterleaveMode::Custom`] is done
//! here on the CPU; custom interleaving is delegated to a compiled program
//! held by the backend.
//!
//! `reverse_views` only affects which view feeds which output slot. Views
//! are always rendered in index order.

use parallax_core::color::Color;
use parallax_core::error::ConfigError;
use parallax_core::stereo::{InterleaveMesh, InterleaveMode, StereoConfig, StereoProgram};

use crate::pixels::PixelBuffer;

/// Multi-view state of a 3D surface.
#[derive(Clone, Debug)]
pub struct StereoCompositor {
    config: StereoConfig,
    current_view: u32,
    program: Option<StereoProgram>,
    mesh: InterleaveMesh,
}

impl StereoCompositor {
    /// A compositor for `config` with no compiled program.
    #[must_use]
    pub const fn new(config: StereoConfig) -> Self {
        Self {
            config,
            current_view: 0,
            program: None,
            mesh: InterleaveMesh::FULL_SURFACE,
        }
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StereoConfig {
        &self.config
    }

    /// Replaces the configuration. The compiled program, if any, is kept;
    /// the caller decides whether it still applies.
    pub fn set_config(&mut self, config: StereoConfig) {
        self.config = config;
        self.current_view = 0;
    }

    /// Views rendered per frame.
    #[inline]
    #[must_use]
    pub const fn views(&self) -> u32 {
        self.config.effective_views()
    }

    /// The view being rendered.
    #[inline]
    #[must_use]
    pub const fn current_view(&self) -> u32 {
        self.current_view
    }

    /// Sets the view being rendered.
    pub fn set_current_view(&mut self, view: u32) {
        self.current_view = view;
    }

    /// The compiled interleaving program.
    #[inline]
    #[must_use]
    pub const fn program(&self) -> Option<&StereoProgram> {
        self.program.as_ref()
    }

    /// Stores (or clears) the compiled program, returning the previous one.
    pub fn set_program(&mut self, program: Option<StereoProgram>) -> Option<StereoProgram> {
        core::mem::replace(&mut self.program, program)
    }

    /// The quad the program is drawn with.
    #[inline]
    #[must_use]
    pub const fn mesh(&self) -> &InterleaveMesh {
        &self.mesh
    }

    /// Returns `true` if views render to intermediate targets rather than
    /// straight into the surface.
    #[must_use]
    pub const fn uses_view_targets(&self) -> bool {
        !matches!(self.config.mode, InterleaveMode::None)
    }

    /// Checks the configuration against a `width` × `height` surface.
    ///
    /// # Errors
    ///
    /// See [`StereoConfig::validate`].
    pub const fn validate(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        self.config.validate(width, height, self.program.is_some())
    }

    /// Recombines `views` into `out` on the CPU.
    ///
    /// Returns `false` for [`InterleaveMode::Custom`], which needs the
    /// program path instead.
    pub fn compose(&self, views: &[PixelBuffer], out: &mut PixelBuffer) -> bool {
        let cfg = &self.config;
        match cfg.mode {
            InterleaveMode::None => {
                if let Some(v) = views.first() {
                    stretch(v, out);
                }
            }
            InterleaveMode::Columns => interleave_columns(cfg, views, out),
            InterleaveMode::Rows => interleave_rows(cfg, views, out),
            InterleaveMode::Anaglyph => anaglyph(cfg, views, out),
            InterleaveMode::SideBySide => side_by_side(cfg, views, out),
            InterleaveMode::TopBottom => top_bottom(cfg, views, out),
            InterleaveMode::Custom => return false,
        }
        true
    }
}

fn view<'a>(cfg: &StereoConfig, views: &'a [PixelBuffer], slot: u32) -> Option<&'a PixelBuffer> {
    views.get(cfg.source_view(slot) as usize)
}

fn stretch(src: &PixelBuffer, out: &mut PixelBuffer) {
    let (w, h) = (out.width(), out.height());
    for y in 0..h {
        for x in 0..w {
            out.set(x, y, src.sample_scaled(x, y, w, h));
        }
    }
}

/// Output column `x` comes from view `x % n`.
pub fn interleave_columns(cfg: &StereoConfig, views: &[PixelBuffer], out: &mut PixelBuffer) {
    let (w, h) = (out.width(), out.height());
    for x in 0..w {
        let Some(src) = view(cfg, views, x) else {
            continue;
        };
        for y in 0..h {
            out.set(x, y, src.sample_scaled(x, y, w, h));
        }
    }
}

/// Output row `y` comes from view `y % n`.
pub fn interleave_rows(cfg: &StereoConfig, views: &[PixelBuffer], out: &mut PixelBuffer) {
    let (w, h) = (out.width(), out.height());
    for y in 0..h {
        let Some(src) = view(cfg, views, y) else {
            continue;
        };
        for x in 0..w {
            out.set(x, y, src.sample_scaled(x, y, w, h));
        }
    }
}

/// Red from the left view, green and blue from the right view.
pub fn anaglyph(cfg: &StereoConfig, views: &[PixelBuffer], out: &mut PixelBuffer) {
    let (Some(left), Some(right)) = (view(cfg, views, 0), view(cfg, views, 1)) else {
        return;
    };
    let (w, h) = (out.width(), out.height());
    for y in 0..h {
        for x in 0..w {
            let l = left.sample_scaled(x, y, w, h);
            let r = right.sample_scaled(x, y, w, h);
            out.set(x, y, Color::from_argb(l.a().max(r.a()), l.r(), r.g(), r.b()));
        }
    }
}

/// Views tiled left to right, each stretched over `width / n` columns.
pub fn side_by_side(cfg: &StereoConfig, views: &[PixelBuffer], out: &mut PixelBuffer) {
    let n = cfg.effective_views().max(1);
    let (w, h) = (out.width(), out.height());
    let tile = w / n;
    if tile == 0 {
        return;
    }
    for slot in 0..n {
        let Some(src) = view(cfg, views, slot) else {
            continue;
        };
        for y in 0..h {
            for tx in 0..tile {
                out.set(slot * tile + tx, y, src.sample_scaled(tx, y, tile, h));
            }
        }
    }
}

/// Views tiled top to bottom, each stretched over `height / n` rows.
pub fn top_bottom(cfg: &StereoConfig, views: &[PixelBuffer], out: &mut PixelBuffer) {
    let n = cfg.effective_views().max(1);
    let (w, h) = (out.width(), out.height());
    let tile = h / n;
    if tile == 0 {
        return;
    }
    for slot in 0..n {
        let Some(src) = view(cfg, views, slot) else {
            continue;
        };
        for ty in 0..tile {
            for x in 0..w {
                out.set(x, slot * tile + ty, src.sample_scaled(x, ty, w, tile));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const RED: Color = Color::from_rgb(255, 0, 0);
    const CYAN: Color = Color::from_rgb(0, 255, 255);
    const BLUE: Color = Color::from_rgb(0, 0, 255);

    fn solid_views(colors: &[Color], w: u32, h: u32) -> Vec<PixelBuffer> {
        colors.iter().map(|c| PixelBuffer::filled(w, h, *c)).collect()
    }

    #[test]
    fn columns_alternate_views() {
        let views = solid_views(&[RED, BLUE], 4, 2);
        let mut out = PixelBuffer::new(4, 2);
        interleave_columns(&StereoConfig::columns(2), &views, &mut out);
        for y in 0..2 {
            assert_eq!(out.get(0, y), Some(RED));
            assert_eq!(out.get(1, y), Some(BLUE));
            assert_eq!(out.get(2, y), Some(RED));
            assert_eq!(out.get(3, y), Some(BLUE));
        }
    }

    #[test]
    fn reversed_columns_swap() {
        let views = solid_views(&[RED, BLUE], 4, 1);
        let mut out = PixelBuffer::new(4, 1);
        interleave_columns(&StereoConfig::columns(2).reversed(), &views, &mut out);
        assert_eq!(out.get(0, 0), Some(BLUE));
        assert_eq!(out.get(1, 0), Some(RED));
    }

    #[test]
    fn rows_alternate_views() {
        let views = solid_views(&[RED, BLUE, CYAN], 1, 6);
        let mut out = PixelBuffer::new(1, 6);
        interleave_rows(&StereoConfig::rows(3), &views, &mut out);
        let column: Vec<_> = (0..6).filter_map(|y| out.get(0, y)).collect();
        assert_eq!(column, [RED, BLUE, CYAN, RED, BLUE, CYAN]);
    }

    #[test]
    fn anaglyph_filters_channels() {
        let views = solid_views(&[Color::WHITE, Color::from_rgb(10, 20, 30)], 2, 2);
        let mut out = PixelBuffer::new(2, 2);
        anaglyph(&StereoConfig::anaglyph(), &views, &mut out);
        assert_eq!(out.get(1, 1), Some(Color::from_rgb(255, 20, 30)));

        anaglyph(&StereoConfig::anaglyph().reversed(), &views, &mut out);
        assert_eq!(out.get(1, 1), Some(Color::from_rgb(10, 255, 255)));
    }

    #[test]
    fn side_by_side_tiles() {
        let views = solid_views(&[RED, BLUE], 2, 2);
        let mut out = PixelBuffer::new(4, 2);
        let cfg = StereoConfig::new(2, InterleaveMode::SideBySide);
        side_by_side(&cfg, &views, &mut out);
        assert_eq!(out.get(1, 1), Some(RED));
        assert_eq!(out.get(2, 0), Some(BLUE));
    }

    #[test]
    fn top_bottom_tiles() {
        let views = solid_views(&[RED, BLUE], 2, 1);
        let mut out = PixelBuffer::new(2, 2);
        let cfg = StereoConfig::new(2, InterleaveMode::TopBottom);
        top_bottom(&cfg, &views, &mut out);
        assert_eq!(out.get(0, 0), Some(RED));
        assert_eq!(out.get(1, 1), Some(BLUE));
    }

    #[test]
    fn custom_mode_is_not_composed_on_cpu() {
        let comp = StereoCompositor::new(StereoConfig::custom(2));
        let views = solid_views(&[RED, BLUE], 1, 1);
        let mut out = PixelBuffer::new(1, 1);
        assert!(!comp.compose(&views, &mut out));
        assert_eq!(out.get(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(
            comp.validate(2, 2),
            Err(ConfigError::MissingProgram),
            "no program compiled yet"
        );
    }
}
