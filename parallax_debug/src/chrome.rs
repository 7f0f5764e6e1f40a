// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Phases become duration slices on thread 0; frame begins, aborts, skipped
//! nodes and summaries become instant events carrying their fields as
//! `args`.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use parallax_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Events without a timestamp of their own (skipped nodes, summaries,
/// damage) are placed at the most recent timestamp seen.
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                last_ts = ticks_to_us(e.now.ticks(), timebase);
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "width": e.width,
                        "height": e.height,
                        "views": e.views,
                        "direct_flush": e.direct_flush,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::FrameAborted(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "i",
                    "name": "FrameAborted",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::GeometryFailure(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "GeometryFailure",
                    "cat": "Draw",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "node": e.node.0,
                        "bounds": [e.bounds.x, e.bounds.y, e.bounds.width, e.bounds.height],
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "contexts": s.contexts,
                        "contexts_drawn": s.contexts_drawn,
                        "alpha_contexts": s.alpha_contexts,
                        "dirty_rects": s.dirty_rects,
                        "dirty_area": s.dirty_area,
                        "vanished": s.vanished,
                        "failures": s.failures,
                        "views": s.views,
                        "surface_touched": s.surface_touched,
                        "prepare_us": ticks_to_us(s.prepare_ticks, timebase),
                        "acquire_us": ticks_to_us(s.acquire_ticks, timebase),
                        "draw_us": ticks_to_us(s.draw_ticks, timebase),
                        "composite_us": ticks_to_us(s.composite_ticks, timebase),
                        "release_us": ticks_to_us(s.release_ticks, timebase),
                    }
                }));
            }
            RecordedEvent::DamageRects {
                frame_index,
                count,
                area,
            } => {
                events.push(json!({
                    "ph": "C",
                    "name": "Damage",
                    "cat": "Rich",
                    "ts": last_ts,
                    "pid": 0,
                    "args": {
                        "rects": count,
                        "area": area,
                    },
                    "id": frame_index,
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
