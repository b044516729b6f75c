// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] turns events recorded by a
//! [`RecorderSink`](super::recorder::RecorderSink) into
//! [Chrome Trace Event Format][format] JSON.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phases become duration events; everything else is an instant event
/// stamped with the most recent clock reading.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());
    let mut last_ts = 0.0;

    for recorded in events {
        match recorded {
            RecordedEvent::FrameTick(e) => {
                last_ts = e.now_ms * 1000.0;
                out.push(json!({
                    "ph": "i",
                    "name": "FrameTick",
                    "cat": "Director",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "delta": e.delta,
                        "paused": e.paused,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_ts = e.timestamp_ms * 1000.0;
                out.push(json!({
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
                last_ts = e.timestamp_ms * 1000.0;
                out.push(json!({
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
            RecordedEvent::Visit(e) => {
                out.push(json!({
                    "ph": "i",
                    "name": "Visit",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "kind": format!("{:?}", e.kind),
                        "commands": e.commands,
                    }
                }));
            }
            RecordedEvent::Render(e) => {
                out.push(json!({
                    "ph": "i",
                    "name": "Render",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "full_redraw": e.stats.full_redraw,
                        "dirty_rects": e.stats.dirty_rects,
                        "drawn": e.stats.drawn,
                        "total": e.stats.total,
                    }
                }));
            }
            RecordedEvent::SceneSwap(e) => {
                out.push(json!({
                    "ph": "i",
                    "name": "SceneSwap",
                    "cat": "Director",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "from": e.from,
                        "to": e.to,
                        "cleanup": e.cleanup,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use sprocket_core::backend::RenderStats;
    use sprocket_core::trace::{
        FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, RenderEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_tick(&FrameTickEvent {
            frame_index: 0,
            now_ms: 1.0,
            delta: 0.0,
            paused: false,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Render,
            timestamp_ms: 1.5,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Render,
            timestamp_ms: 2.0,
        });
        rec.on_render(&RenderEvent {
            frame_index: 0,
            stats: RenderStats {
                full_redraw: true,
                dirty_rects: 0,
                drawn: 5,
                total: 5,
            },
        });

        let mut buf = Vec::new();
        export(rec.events(), &mut buf).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0]["ts"], 1000.0);
        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "render");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[3]["ts"], 2000.0);
        assert_eq!(parsed[3]["args"]["drawn"], 5);
    }

    #[test]
    fn empty_recording_is_an_empty_array() {
        let mut buf = Vec::new();
        export(&[], &mut buf).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&buf).unwrap();
        assert!(parsed.is_empty());
    }
}
