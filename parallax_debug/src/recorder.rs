// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Damage rectangles ([`on_damage_rects`](TraceSink::on_damage_rects)) store
//! only the count and total area.

use parallax_core::geometry::IRect;
use parallax_core::node::NodeId;
use parallax_core::time::HostTime;
use parallax_core::trace::{
    AbortReason, DamageRect, FrameAbortedEvent, FrameBeginEvent, FrameSummary,
    GeometryFailureEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_FRAME_ABORTED: u8 = 4;
const TAG_GEOMETRY_FAILURE: u8 = 5;
const TAG_FRAME_SUMMARY: u8 = 6;
const TAG_DAMAGE_RECTS: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Prepare => 0,
            PhaseKind::Acquire => 1,
            PhaseKind::Draw => 2,
            PhaseKind::Composite => 3,
            PhaseKind::Release => 4,
        });
    }

    fn write_rect(&mut self, r: IRect) {
        self.write_i32(r.x);
        self.write_i32(r.y);
        self.write_i32(r.width);
        self.write_i32(r.height);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.ticks());
        self.write_u32(e.width);
        self.write_u32(e.height);
        self.write_u32(e.views);
        self.write_u8(u8::from(e.direct_flush));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
        self.write_u8(TAG_FRAME_ABORTED);
        self.write_u64(e.frame_index);
        self.write_u8(match e.reason {
            AbortReason::Acquisition => 0,
            AbortReason::Configuration => 1,
        });
        self.write_u64(e.timestamp.ticks());
    }

    fn on_geometry_failure(&mut self, e: &GeometryFailureEvent) {
        self.write_u8(TAG_GEOMETRY_FAILURE);
        self.write_u64(e.frame_index);
        self.write_u32(e.node.0);
        self.write_rect(e.bounds);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.contexts);
        self.write_u32(s.contexts_drawn);
        self.write_u32(s.alpha_contexts);
        self.write_u32(s.dirty_rects);
        self.write_u64(s.dirty_area);
        self.write_u32(s.vanished);
        self.write_u32(s.failures);
        self.write_u32(s.views);
        self.write_u8(u8::from(s.surface_touched));
        self.write_u64(s.prepare_ticks);
        self.write_u64(s.acquire_ticks);
        self.write_u64(s.draw_ticks);
        self.write_u64(s.composite_ticks);
        self.write_u64(s.release_ticks);
    }

    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        self.write_u8(TAG_DAMAGE_RECTS);
        self.write_u64(frame_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "damage rect count capped at u32::MAX for recording"
        )]
        self.write_u32(rects.len().min(u32::MAX as usize) as u32);
        let area = rects
            .iter()
            .map(|r| u64::from(r.width) * u64::from(r.height))
            .sum();
        self.write_u64(area);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`FrameAbortedEvent`].
    FrameAborted(FrameAbortedEvent),
    /// A [`GeometryFailureEvent`].
    GeometryFailure(GeometryFailureEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Damage rectangles of a frame.
    DamageRects {
        /// Frame counter.
        frame_index: u64,
        /// Number of rectangles.
        count: u32,
        /// Summed area in pixels.
        area: u64,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_rect(&mut self) -> Option<IRect> {
        Some(IRect::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            width: self.read_u32()?,
            height: self.read_u32()?,
            views: self.read_u32()?,
            direct_flush: self.read_bool()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_frame_aborted(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let reason = match self.read_u8()? {
            0 => AbortReason::Acquisition,
            _ => AbortReason::Configuration,
        };
        Some(RecordedEvent::FrameAborted(FrameAbortedEvent {
            frame_index,
            reason,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_geometry_failure(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::GeometryFailure(GeometryFailureEvent {
            frame_index: self.read_u64()?,
            node: NodeId(self.read_u32()?),
            bounds: self.read_rect()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            contexts: self.read_u32()?,
            contexts_drawn: self.read_u32()?,
            alpha_contexts: self.read_u32()?,
            dirty_rects: self.read_u32()?,
            dirty_area: self.read_u64()?,
            vanished: self.read_u32()?,
            failures: self.read_u32()?,
            views: self.read_u32()?,
            surface_touched: self.read_bool()?,
            prepare_ticks: self.read_u64()?,
            acquire_ticks: self.read_u64()?,
            draw_ticks: self.read_u64()?,
            composite_ticks: self.read_u64()?,
            release_ticks: self.read_u64()?,
        }))
    }

    fn decode_damage_rects(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DamageRects {
            frame_index: self.read_u64()?,
            count: self.read_u32()?,
            area: self.read_u64()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_FRAME_ABORTED => self.decode_frame_aborted(),
            TAG_GEOMETRY_FAILURE => self.decode_geometry_failure(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_DAMAGE_RECTS => self.decode_damage_rects(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 7,
            contexts: 12,
            contexts_drawn: 9,
            alpha_contexts: 2,
            dirty_rects: 3,
            dirty_area: 4_800,
            vanished: 1,
            failures: 1,
            views: 2,
            surface_touched: true,
            prepare_ticks: 100,
            acquire_ticks: 20,
            draw_ticks: 1_500,
            composite_ticks: 300,
            release_ticks: 10,
        }
    }

    #[test]
    fn frame_summary_survives_recording() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::FrameSummary(s) => assert_eq!(*s, sample_summary()),
            other => panic!("expected FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn frame_cycle_sequence() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 3,
            now: HostTime(1_000),
            width: 640,
            height: 480,
            views: 1,
            direct_flush: true,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 3,
            phase: PhaseKind::Composite,
            timestamp: HostTime(2_000),
        });
        rec.on_geometry_failure(&GeometryFailureEvent {
            frame_index: 3,
            node: NodeId(44),
            bounds: IRect::new(-5, 10, 20, 30),
        });
        rec.on_frame_aborted(&FrameAbortedEvent {
            frame_index: 3,
            reason: AbortReason::Acquisition,
            timestamp: HostTime(2_500),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        match &events[0] {
            RecordedEvent::FrameBegin(e) => {
                assert_eq!((e.width, e.height), (640, 480));
                assert!(e.direct_flush);
            }
            other => panic!("expected FrameBegin, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::PhaseBegin(e) => assert_eq!(e.phase, PhaseKind::Composite),
            other => panic!("expected PhaseBegin, got {other:?}"),
        }
        match &events[2] {
            RecordedEvent::GeometryFailure(e) => {
                assert_eq!(e.node, NodeId(44));
                assert_eq!(e.bounds, IRect::new(-5, 10, 20, 30));
            }
            other => panic!("expected GeometryFailure, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::FrameAborted(e) => {
                assert_eq!(e.reason, AbortReason::Acquisition);
                assert_eq!(e.timestamp, HostTime(2_500));
            }
            other => panic!("expected FrameAborted, got {other:?}"),
        }
    }

    #[test]
    fn damage_rects_store_count_and_area() {
        let mut rec = RecorderSink::new();
        let rects = [
            DamageRect::from(IRect::new(0, 0, 10, 10)),
            DamageRect::from(IRect::new(50, 50, 4, 5)),
        ];
        rec.on_damage_rects(42, &rects);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [
                RecordedEvent::DamageRects {
                    frame_index,
                    count,
                    area,
                },
            ] => {
                assert_eq!(*frame_index, 42);
                assert_eq!(*count, 2);
                assert_eq!(*area, 120);
            }
            other => panic!("expected one DamageRects, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&sample_summary());
        rec.on_frame_summary(&sample_summary());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
