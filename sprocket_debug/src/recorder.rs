// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.

use sprocket_core::trace::{
    FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, RenderEvent, SceneSwapEvent, TraceSink,
    VisitEvent,
};

/// One recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_frame_tick`].
    FrameTick(FrameTickEvent),
    /// See [`TraceSink::on_phase_begin`].
    PhaseBegin(PhaseBeginEvent),
    /// See [`TraceSink::on_phase_end`].
    PhaseEnd(PhaseEndEvent),
    /// See [`TraceSink::on_visit`].
    Visit(VisitEvent),
    /// See [`TraceSink::on_render`].
    Render(RenderEvent),
    /// See [`TraceSink::on_scene_swap`].
    SceneSwap(SceneSwapEvent),
}

impl RecordedEvent {
    /// Returns the frame the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::FrameTick(e) => e.frame_index,
            Self::PhaseBegin(e) => e.frame_index,
            Self::PhaseEnd(e) => e.frame_index,
            Self::Visit(e) => e.frame_index,
            Self::Render(e) => e.frame_index,
            Self::SceneSwap(e) => e.frame_index,
        }
    }
}

/// A [`TraceSink`] that keeps every event, optionally only the most recent
/// ones.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
    capacity: Option<usize>,
}

impl RecorderSink {
    /// Creates an unbounded recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that keeps only the last `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Returns the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Removes and returns the recorded events.
    pub fn take(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.events)
    }

    fn push(&mut self, event: RecordedEvent) {
        if let Some(cap) = self.capacity {
            if cap == 0 {
                return;
            }
            if self.events.len() == cap {
                self.events.remove(0);
            }
        }
        self.events.push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.push(RecordedEvent::FrameTick(*e));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.push(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.push(RecordedEvent::PhaseEnd(*e));
    }

    fn on_visit(&mut self, e: &VisitEvent) {
        self.push(RecordedEvent::Visit(*e));
    }

    fn on_render(&mut self, e: &RenderEvent) {
        self.push(RecordedEvent::Render(*e));
    }

    fn on_scene_swap(&mut self, e: &SceneSwapEvent) {
        self.push(RecordedEvent::SceneSwap(*e));
    }
}
