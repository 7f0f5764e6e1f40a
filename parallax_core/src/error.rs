// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.

use thiserror::Error;

/// A surface or stereo configuration that cannot be rendered.
///
/// Configuration errors abort the frame that detects them. The surface is
/// left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Raw camera layout code outside `0..=3`.
    #[error("unknown camera layout {0}")]
    UnknownCameraLayout(u32),
    /// Raw interleave mode code outside `0..=6`.
    #[error("unknown interleave mode {0}")]
    UnknownInterleaveMode(u32),
    /// Stereo requested with zero views.
    #[error("stereo output needs at least one view")]
    NoViews,
    /// Anaglyph output combines exactly two views.
    #[error("anaglyph needs exactly 2 views, got {0}")]
    AnaglyphViewCount(u32),
    /// The view count does not divide the interleaved dimension.
    #[error("{views} views do not evenly divide {extent} pixels")]
    UnevenInterleave {
        /// Configured view count.
        views: u32,
        /// Width or height being interleaved.
        extent: u32,
    },
    /// Custom interleaving without a compiled program.
    #[error("custom interleaving requires a compiled program")]
    MissingProgram,
    /// Per-view render targets would be empty.
    #[error("per-view render target has zero size")]
    ViewTargetTooSmall,
}
