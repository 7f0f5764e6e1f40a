// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-view output configuration.
//!
//! [`StereoConfig`] says how many views a 3D surface renders and how they are
//! recombined into the final surface ([`InterleaveMode`]). The recombination
//! itself lives in the render crate; this module owns the data model and the
//! validation rules that decide whether a configuration can be rendered at
//! all.

use crate::error::ConfigError;

/// How per-view renders are recombined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterleaveMode {
    /// Single view.
    #[default]
    None,
    /// Views stacked vertically, each squeezed to `height / n`.
    TopBottom,
    /// Views placed side by side, each squeezed to `width / n`.
    SideBySide,
    /// Pixel column `x` comes from view `x % n`.
    Columns,
    /// Pixel row `y` comes from view `y % n`.
    Rows,
    /// Two views combined by per-channel color filtering.
    Anaglyph,
    /// Recombined by a compiled program sampling every view.
    Custom,
}

impl InterleaveMode {
    /// Parses a raw mode code (`0` none, `1` top/bottom, `2` side by side,
    /// `3` columns, `4` rows, `5` anaglyph, `6` custom).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownInterleaveMode`] for any other code.
    pub const fn from_raw(raw: u32) -> Result<Self, ConfigError> {
        match raw {
            0 => Ok(Self::None),
            1 => Ok(Self::TopBottom),
            2 => Ok(Self::SideBySide),
            3 => Ok(Self::Columns),
            4 => Ok(Self::Rows),
            5 => Ok(Self::Anaglyph),
            6 => Ok(Self::Custom),
            other => Err(ConfigError::UnknownInterleaveMode(other)),
        }
    }

    /// The raw code of this mode.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::None => 0,
            Self::TopBottom => 1,
            Self::SideBySide => 2,
            Self::Columns => 3,
            Self::Rows => 4,
            Self::Anaglyph => 5,
            Self::Custom => 6,
        }
    }

    /// Returns `true` if recombination runs through a compiled program.
    #[inline]
    #[must_use]
    pub const fn requires_program(self) -> bool {
        matches!(self, Self::Custom)
    }
}

/// A compiled program, or one of its stages, held by the raster backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// The program used for [`InterleaveMode::Custom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StereoProgram {
    /// Linked program.
    pub program: ProgramHandle,
    /// Vertex stage.
    pub vertex: ProgramHandle,
    /// Fragment stage.
    pub fragment: ProgramHandle,
}

/// The full-surface quad the interleaving program is drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterleaveMesh {
    /// Clip-space positions.
    pub positions: [[f32; 2]; 4],
    /// Texture coordinates into each view.
    pub tex_coords: [[f32; 2]; 4],
    /// Two triangles.
    pub indices: [u16; 6],
}

impl InterleaveMesh {
    /// A quad covering the whole surface.
    pub const FULL_SURFACE: Self = Self {
        positions: [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
        tex_coords: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        indices: [0, 1, 2, 0, 2, 3],
    };
}

/// Multi-view output settings of a 3D surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoConfig {
    /// Number of views rendered per frame.
    pub nb_views: u32,
    /// Recombination mode.
    pub mode: InterleaveMode,
    /// Swap first/last view assignment when recombining.
    pub reverse_views: bool,
    /// Per-view target width; zero derives it from the surface and mode.
    pub view_width: u32,
    /// Per-view target height; zero derives it from the surface and mode.
    pub view_height: u32,
    /// Distance between adjacent views in world units; `None` keeps the
    /// camera's own value.
    pub eye_separation: Option<f64>,
}

impl StereoConfig {
    /// Single-view output.
    pub const MONO: Self = Self {
        nb_views: 1,
        mode: InterleaveMode::None,
        reverse_views: false,
        view_width: 0,
        view_height: 0,
        eye_separation: None,
    };

    /// `nb_views` views in `mode`, with derived view sizes.
    #[must_use]
    pub const fn new(nb_views: u32, mode: InterleaveMode) -> Self {
        Self {
            nb_views,
            mode,
            ..Self::MONO
        }
    }

    /// Red/cyan anaglyph from two views.
    #[must_use]
    pub const fn anaglyph() -> Self {
        Self::new(2, InterleaveMode::Anaglyph)
    }

    /// Column interleaving of `nb_views` views.
    #[must_use]
    pub const fn columns(nb_views: u32) -> Self {
        Self::new(nb_views, InterleaveMode::Columns)
    }

    /// Row interleaving of `nb_views` views.
    #[must_use]
    pub const fn rows(nb_views: u32) -> Self {
        Self::new(nb_views, InterleaveMode::Rows)
    }

    /// Program-driven interleaving of `nb_views` views.
    #[must_use]
    pub const fn custom(nb_views: u32) -> Self {
        Self::new(nb_views, InterleaveMode::Custom)
    }

    /// Sets [`reverse_views`](Self::reverse_views).
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reverse_views = true;
        self
    }

    /// Number of views actually rendered. [`InterleaveMode::None`] renders
    /// one view whatever `nb_views` says.
    #[must_use]
    pub const fn effective_views(&self) -> u32 {
        match self.mode {
            InterleaveMode::None => 1,
            _ => self.nb_views,
        }
    }

    /// Returns `true` if more than one view is rendered.
    #[must_use]
    pub const fn is_multiview(&self) -> bool {
        self.effective_views() > 1
    }

    /// Per-view target size for a `width` × `height` surface.
    #[must_use]
    pub const fn view_size(&self, width: u32, height: u32) -> (u32, u32) {
        let n = if self.nb_views == 0 { 1 } else { self.nb_views };
        let (w, h) = match self.mode {
            InterleaveMode::SideBySide => (width / n, height),
            InterleaveMode::TopBottom => (width, height / n),
            _ => (width, height),
        };
        (
            if self.view_width == 0 { w } else { self.view_width },
            if self.view_height == 0 { h } else { self.view_height },
        )
    }

    /// Maps a composite slot to the view rendered for it.
    #[must_use]
    pub const fn source_view(&self, slot: u32) -> u32 {
        let n = self.effective_views();
        if n == 0 {
            return 0;
        }
        let k = slot % n;
        if self.reverse_views { n - 1 - k } else { k }
    }

    /// Checks that this configuration can be rendered on a
    /// `width` × `height` surface.
    ///
    /// `has_program` reports whether a compiled interleaving program is
    /// available.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub const fn validate(&self, width: u32, height: u32, has_program: bool) -> Result<(), ConfigError> {
        if matches!(self.mode, InterleaveMode::None) {
            return Ok(());
        }
        let n = self.nb_views;
        if n == 0 {
            return Err(ConfigError::NoViews);
        }
        match self.mode {
            InterleaveMode::Anaglyph if n != 2 => return Err(ConfigError::AnaglyphViewCount(n)),
            InterleaveMode::Columns | InterleaveMode::SideBySide if width % n != 0 => {
                return Err(ConfigError::UnevenInterleave {
                    views: n,
                    extent: width,
                });
            }
            InterleaveMode::Rows | InterleaveMode::TopBottom if height % n != 0 => {
                return Err(ConfigError::UnevenInterleave {
                    views: n,
                    extent: height,
                });
            }
            InterleaveMode::Custom if !has_program => return Err(ConfigError::MissingProgram),
            _ => {}
        }
        let (vw, vh) = self.view_size(width, height);
        if vw == 0 || vh == 0 {
            return Err(ConfigError::ViewTargetTooSmall);
        }
        Ok(())
    }
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self::MONO
    }
}
