// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use sprocket_core::trace::{
    FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, RenderEvent, SceneSwapEvent, TraceSink,
    VisitEvent, VisitKind,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    skip_idle: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("skip_idle", &self.skip_idle)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            skip_idle: false,
        }
    }

    /// Omits visit and render lines of frames where nothing changed.
    #[must_use]
    pub fn skip_idle(mut self, skip: bool) -> Self {
        self.skip_idle = skip;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.1}ms dt={:.4}s{}",
            e.frame_index,
            e.now_ms,
            e.delta,
            if e.paused { " paused" } else { "" },
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.3}ms",
            e.frame_index,
            e.phase.name(),
            e.timestamp_ms,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.3}ms",
            e.frame_index,
            e.phase.name(),
            e.timestamp_ms,
        );
    }

    fn on_visit(&mut self, e: &VisitEvent) {
        if self.skip_idle && e.kind == VisitKind::Idle {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[visit] frame={} {:?} commands={}",
            e.frame_index, e.kind, e.commands,
        );
    }

    fn on_render(&mut self, e: &RenderEvent) {
        if self.skip_idle && e.stats.is_idle() {
            return;
        }
        let s = &e.stats;
        let _ = writeln!(
            self.writer,
            "[render] frame={} {} drawn={}/{} rects={}",
            e.frame_index,
            if s.full_redraw { "full" } else { "partial" },
            s.drawn,
            s.total,
            s.dirty_rects,
        );
    }

    fn on_scene_swap(&mut self, e: &SceneSwapEvent) {
        let _ = match e.from {
            Some(from) => writeln!(
                self.writer,
                "[scene] frame={} {} -> {} cleanup={}",
                e.frame_index, from, e.to, e.cleanup,
            ),
            None => writeln!(self.writer, "[scene] frame={} -> {}", e.frame_index, e.to),
        };
    }
}

#[cfg(test)]
mod tests {
    use sprocket_core::backend::RenderStats;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_tick(&FrameTickEvent {
            frame_index: 1,
            now_ms: 16.0,
            delta: 0.016,
            paused: true,
        });
        let output = output(sink);
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("paused"), "got: {output}");
    }

    #[test]
    fn idle_frames_can_be_skipped() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).skip_idle(true);
        sink.on_visit(&VisitEvent {
            frame_index: 2,
            kind: VisitKind::Idle,
            commands: 4,
        });
        sink.on_render(&RenderEvent {
            frame_index: 2,
            stats: RenderStats::default(),
        });
        sink.on_render(&RenderEvent {
            frame_index: 3,
            stats: RenderStats {
                full_redraw: false,
                dirty_rects: 2,
                drawn: 1,
                total: 4,
            },
        });
        let output = output(sink);
        assert_eq!(output, "[render] frame=3 partial drawn=1/4 rects=2\n");
    }

    #[test]
    fn first_scene_has_no_source() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_scene_swap(&SceneSwapEvent {
            frame_index: 0,
            from: None,
            to: 3,
            cleanup: false,
        });
        assert_eq!(output(sink), "[scene] frame=0 -> 3\n");
    }
}
