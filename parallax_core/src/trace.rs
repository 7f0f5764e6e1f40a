// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the visual frame cycle.
//!
//! [`TraceSink`] has one method per event, each defaulting to a no-op, so a
//! sink only implements what it cares about.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Without the `trace`
//! feature every `Tracer` method compiles to nothing; with it, each call is a
//! single `Option` branch before dispatch.
//!
//! [`FrameSummaryBuilder`] collects phase timestamps and counters during a
//! frame and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`): adds per-frame [`DamageRect`] events.

use crate::geometry::IRect;
use crate::node::NodeId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the frame cycle is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// History diff, dirty-region and stereo setup.
    Prepare,
    /// Acquiring surface access from the backend.
    Acquire,
    /// Clearing and painting the display list (all views).
    Draw,
    /// Recombining per-view renders.
    Composite,
    /// Releasing surface access.
    Release,
}

impl PhaseKind {
    /// Every phase, in frame order.
    pub const ALL: [Self; 5] = [
        Self::Prepare,
        Self::Acquire,
        Self::Draw,
        Self::Composite,
        Self::Release,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Acquire => "acquire",
            Self::Draw => "draw",
            Self::Composite => "composite",
            Self::Release => "release",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Prepare => 0,
            Self::Acquire => 1,
            Self::Draw => 2,
            Self::Composite => 3,
            Self::Release => 4,
        }
    }
}

/// Why a frame was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// Surface access could not be acquired.
    Acquisition,
    /// The surface or stereo configuration cannot be rendered.
    Configuration,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame starts.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter of the visual.
    pub frame_index: u64,
    /// Host time at frame start.
    pub now: HostTime,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Views to render.
    pub views: u32,
    /// Whether dirty-rect accounting is bypassed.
    pub direct_flush: bool,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted when a frame is abandoned before drawing.
#[derive(Clone, Copy, Debug)]
pub struct FrameAbortedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Why.
    pub reason: AbortReason,
    /// Host time of the abort.
    pub timestamp: HostTime,
}

/// Emitted when one context fails to rasterize.
#[derive(Clone, Copy, Debug)]
pub struct GeometryFailureEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The node that failed.
    pub node: NodeId,
    /// Its bounds, which were skipped.
    pub bounds: IRect,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Contexts in the display list.
    pub contexts: u32,
    /// Contexts actually painted (summed over views).
    pub contexts_drawn: u32,
    /// Contexts deferred to the alpha pass.
    pub alpha_contexts: u32,
    /// Dirty rectangles repainted.
    pub dirty_rects: u32,
    /// Dirty area in pixels.
    pub dirty_area: u64,
    /// Nodes that vanished since last frame.
    pub vanished: u32,
    /// Contexts that failed to rasterize.
    pub failures: u32,
    /// Views rendered.
    pub views: u32,
    /// Whether the surface was acquired and modified.
    pub surface_touched: bool,
    /// Prepare phase duration in ticks (0 if not measured).
    pub prepare_ticks: u64,
    /// Acquire phase duration in ticks.
    pub acquire_ticks: u64,
    /// Draw phase duration in ticks.
    pub draw_ticks: u64,
    /// Composite phase duration in ticks.
    pub composite_ticks: u64,
    /// Release phase duration in ticks.
    pub release_ticks: u64,
}

/// An axis-aligned damage rectangle.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

#[cfg(feature = "trace-rich")]
impl From<IRect> for DamageRect {
    fn from(r: IRect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width.unsigned_abs(),
            height: r.height.unsigned_abs(),
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the visual frame cycle.
///
/// All methods default to no-ops.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a frame is abandoned.
    fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
        _ = e;
    }

    /// Called when a context fails to rasterize.
    fn on_geometry_failure(&mut self, e: &GeometryFailureEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with the frame's damage rectangles (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        _ = (frame_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// A tracer dispatching to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// A tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameAbortedEvent`].
    #[inline]
    pub fn frame_aborted(&mut self, e: &FrameAbortedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_aborted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GeometryFailureEvent`].
    #[inline]
    pub fn geometry_failure(&mut self, e: &GeometryFailureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_geometry_failure(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits damage rectangles (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        if let Some(s) = &mut self.sink {
            s.on_damage_rects(frame_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps and counters during a frame.
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
    phase_starts: [Option<HostTime>; 5],
    phase_ends: [Option<HostTime>; 5],
}

impl FrameSummaryBuilder {
    /// Starts a summary for `frame_index`.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            summary: FrameSummary {
                frame_index,
                ..FrameSummary::default()
            },
            phase_starts: [None; 5],
            phase_ends: [None; 5],
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase.index()] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase.index()] = Some(t);
    }

    /// Mutable access to the counters.
    pub fn counters(&mut self) -> &mut FrameSummary {
        &mut self.summary
    }

    /// Produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            prepare_ticks: self.phase_ticks(PhaseKind::Prepare),
            acquire_ticks: self.phase_ticks(PhaseKind::Acquire),
            draw_ticks: self.phase_ticks(PhaseKind::Draw),
            composite_ticks: self.phase_ticks(PhaseKind::Composite),
            release_ticks: self.phase_ticks(PhaseKind::Release),
            ..self.summary
        }
    }

    fn phase_ticks(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_are_distinct() {
        let names = PhaseKind::ALL.map(PhaseKind::name);
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            now: HostTime(0),
            width: 1,
            height: 1,
            views: 1,
            direct_flush: false,
        });
        sink.on_frame_summary(&FrameSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_aborted(&FrameAbortedEvent {
            frame_index: 3,
            reason: AbortReason::Acquisition,
            timestamp: HostTime(9),
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(42);
        builder.phase_begin(PhaseKind::Prepare, HostTime(1_000));
        builder.phase_end(PhaseKind::Prepare, HostTime(1_100));
        builder.phase_begin(PhaseKind::Draw, HostTime(1_200));
        builder.phase_end(PhaseKind::Draw, HostTime(2_700));
        builder.counters().dirty_rects = 3;
        builder.counters().surface_touched = true;

        let summary = builder.finish();
        assert_eq!(summary.frame_index, 42);
        assert_eq!(summary.prepare_ticks, 100);
        assert_eq!(summary.draw_ticks, 1_500);
        assert_eq!(summary.acquire_ticks, 0, "unmeasured phases are zero");
        assert_eq!(summary.dirty_rects, 3);
        assert!(summary.surface_touched);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct FailureSink {
            nodes: Vec<NodeId>,
        }
        impl TraceSink for FailureSink {
            fn on_geometry_failure(&mut self, e: &GeometryFailureEvent) {
                self.nodes.push(e.node);
            }
        }

        let mut sink = FailureSink { nodes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.geometry_failure(&GeometryFailureEvent {
            frame_index: 1,
            node: NodeId(5),
            bounds: IRect::new(0, 0, 4, 4),
        });
        drop(tracer);
        assert_eq!(sink.nodes, [NodeId(5)]);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn damage_rect_from_irect() {
        let d = DamageRect::from(IRect::new(-2, 3, 10, 20));
        assert_eq!(
            d,
            DamageRect {
                x: -2,
                y: 3,
                width: 10,
                height: 20
            }
        );
    }
}
