// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`Director`](crate::director::Director) calls at each stage of a
//! frame. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Timestamps are milliseconds on whatever clock the caller passes to
//! [`Director::main_loop_traced`](crate::director::Director::main_loop_traced).

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the frame loop is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Actions, scheduled updates and timers.
    Update,
    /// Command collection (full visit) or pool flush.
    Visit,
    /// Backend rendering.
    Render,
}

impl PhaseKind {
    /// Returns a short lowercase name for display.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Visit => "visit",
            Self::Render => "render",
        }
    }
}

/// How the visit phase brought the command list up to date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisitKind {
    /// The child order changed: commands were re-collected.
    Rebuild,
    /// Only pooled commands were flushed.
    Flush,
    /// Nothing was pending.
    Idle,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of every frame that is not skipped.
#[derive(Clone, Copy, Debug)]
pub struct FrameTickEvent {
    /// Number of frames rendered before this one.
    pub frame_index: u64,
    /// Time passed to the main loop.
    pub now_ms: f64,
    /// Delta applied to actions and the scheduler, in seconds.
    pub delta: f64,
    /// Whether updates are suspended this frame.
    pub paused: bool,
}

/// Marks the beginning of a frame-loop phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Clock reading at the start of the phase.
    pub timestamp_ms: f64,
}

/// Marks the end of a frame-loop phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Clock reading at the end of the phase.
    pub timestamp_ms: f64,
}

/// Emitted after the visit phase.
#[derive(Clone, Copy, Debug)]
pub struct VisitEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// What the phase did.
    pub kind: VisitKind,
    /// Commands in the frame's list afterwards, overlay included.
    pub commands: usize,
}

/// Emitted after the renderer finished a frame.
#[derive(Clone, Copy, Debug)]
pub struct RenderEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Statistics reported by the renderer.
    pub stats: crate::backend::RenderStats,
}

/// Emitted when the running scene changes.
#[derive(Clone, Copy, Debug)]
pub struct SceneSwapEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the outgoing scene, if any.
    pub from: Option<u32>,
    /// Slot index of the incoming scene.
    pub to: u32,
    /// Whether the outgoing scene was cleaned up.
    pub cleanup: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame-loop phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame-loop phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after the visit phase.
    fn on_visit(&mut self, e: &VisitEvent) {
        _ = e;
    }

    /// Called after rendering.
    fn on_render(&mut self, e: &RenderEvent) {
        _ = e;
    }

    /// Called when the running scene changes.
    fn on_scene_swap(&mut self, e: &SceneSwapEvent) {
        _ = e;
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
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
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
    /// Creates a tracer that dispatches to the given sink.
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

    /// Creates a tracer that discards all events.
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

    /// Does this tracer deliver events anywhere?
    ///
    /// Lets callers skip building events (or reading a clock) for nothing.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`FrameTickEvent`].
    #[inline]
    pub fn frame_tick(&mut self, e: &FrameTickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_tick(e);
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

    /// Emits a [`VisitEvent`].
    #[inline]
    pub fn visit(&mut self, e: &VisitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_visit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderEvent`].
    #[inline]
    pub fn render(&mut self, e: &RenderEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SceneSwapEvent`].
    #[inline]
    pub fn scene_swap(&mut self, e: &SceneSwapEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scene_swap(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
