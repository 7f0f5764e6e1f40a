// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for raster backends and the visual manager.

use parallax_core::error::ConfigError;
use parallax_core::node::NodeId;
use thiserror::Error;

/// A failure reported by a [`RasterBackend`](crate::RasterBackend).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RasterError {
    /// The device or driver cannot provide a surface right now.
    #[error("raster device unavailable")]
    DeviceUnavailable,
    /// The surface was lost and must be re-attached.
    #[error("raster surface lost")]
    SurfaceLost,
    /// No surface is attached.
    #[error("no surface attached")]
    NotAttached,
    /// A draw call was made without surface access.
    #[error("surface access not acquired")]
    NotAcquired,
    /// A context's geometry could not be rasterized.
    #[error("cannot rasterize {node:?}")]
    Geometry {
        /// The failing node.
        node: NodeId,
    },
    /// A shape handle the backend does not know.
    #[error("unknown shape")]
    UnknownShape,
    /// A texture handle the backend does not know.
    #[error("unknown texture")]
    UnknownTexture,
    /// The interleaving program failed to compile or link.
    #[error("stereo program failed to compile")]
    ProgramCompile,
    /// A program handle the backend does not know.
    #[error("unknown program")]
    UnknownProgram,
}

/// Why a frame failed.
///
/// Geometry failures never appear here: they skip a single context and are
/// reported in the [`FrameReport`](crate::FrameReport) instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VisualError {
    /// Surface access could not be acquired; the previous frame stays on
    /// screen.
    #[error("surface acquisition failed: {0}")]
    Acquisition(#[source] RasterError),
    /// The configuration cannot be rendered; the surface is left untouched.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// The surface could not be attached to the device.
    #[error("surface attachment failed: {0}")]
    Attachment(#[source] RasterError),
    /// The backend failed after drawing had begun. The frame was still
    /// completed and released.
    #[error("raster failure during frame: {0}")]
    Raster(#[source] RasterError),
}

impl VisualError {
    /// Returns `true` for [`VisualError::Configuration`].
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
