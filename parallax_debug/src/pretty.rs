// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use parallax_core::time::{HostTime, Timebase};
use parallax_core::trace::{
    AbortReason, DamageRect, FrameAbortedEvent, FrameBeginEvent, FrameSummary,
    GeometryFailureEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let flush = if e.direct_flush { " direct" } else { "" };
        let _ = writeln!(
            self.writer,
            "[frame] #{} {}x{} views={}{flush} at {:.1}µs",
            e.frame_index,
            e.width,
            e.height,
            e.views,
            self.host_us(e.now),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
        let reason = match e.reason {
            AbortReason::Acquisition => "acquisition",
            AbortReason::Configuration => "configuration",
        };
        let _ = writeln!(
            self.writer,
            "[abort] frame={} reason={reason} at {:.1}µs",
            e.frame_index,
            self.host_us(e.timestamp),
        );
    }

    fn on_geometry_failure(&mut self, e: &GeometryFailureEvent) {
        let b = e.bounds;
        let _ = writeln!(
            self.writer,
            "[skip] frame={} node={} bounds=({}, {}, {}x{})",
            e.frame_index, e.node.0, b.x, b.y, b.width, b.height,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let touched = if s.surface_touched { "drawn" } else { "idle" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} {touched} contexts={}/{} alpha={} dirty={}px in {} \
             vanished={} failed={} views={} prepare={:.1}µs acquire={:.1}µs \
             draw={:.1}µs composite={:.1}µs release={:.1}µs",
            s.frame_index,
            s.contexts_drawn,
            s.contexts,
            s.alpha_contexts,
            s.dirty_area,
            s.dirty_rects,
            s.vanished,
            s.failures,
            s.views,
            self.ticks_to_us(s.prepare_ticks),
            self.ticks_to_us(s.acquire_ticks),
            self.ticks_to_us(s.draw_ticks),
            self.ticks_to_us(s.composite_ticks),
            self.ticks_to_us(s.release_ticks),
        );
    }

    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        let _ = writeln!(
            self.writer,
            "[damage] frame={frame_index} rects={}",
            rects.len(),
        );
    }
}
