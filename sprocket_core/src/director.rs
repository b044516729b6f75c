// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame driver.
//!
//! A [`Director`] owns the [`SceneGraph`], a [`Renderer`], the running scene
//! and a stack of suspended scenes. The host calls
//! [`main_loop`](Director::main_loop) once per display frame with a
//! millisecond timestamp; each call runs, in order:
//!
//! 1. a pending purge (after [`end`](Director::end)), or nothing at all if
//!    animation is stopped;
//! 2. the frame delta;
//! 3. unless paused: actions, scheduled updates and timers, then the
//!    [`EVENT_AFTER_UPDATE`] event;
//! 4. the swap to a pending next scene;
//! 5. a full command rebuild if the child order changed, else a flush of
//!    the dirty pool;
//! 6. the renderer's clear, the overlay visit, [`EVENT_AFTER_VISIT`], the
//!    render, and [`EVENT_AFTER_DRAW`].
//!
//! Scene changes requested during a frame take effect at step 4 of the next
//! one.

use alloc::vec::Vec;

use crate::backend::{RenderStats, Renderer};
use crate::event::CustomEvent;
use crate::node::{LifecycleEvent, NodeId, SceneGraph};
use crate::trace::{
    FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, RenderEvent, SceneSwapEvent,
    Tracer, VisitEvent, VisitKind,
};

/// Dispatched after actions and the scheduler ran.
pub const EVENT_AFTER_UPDATE: &str = "director_after_update";
/// Dispatched after the scene and the overlay were visited.
pub const EVENT_AFTER_VISIT: &str = "director_after_visit";
/// Dispatched after the renderer finished the frame.
pub const EVENT_AFTER_DRAW: &str = "director_after_draw";

/// Configuration for the [`Director`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectorConfig {
    /// Replace deltas above [`max_delta`](Self::max_delta) with
    /// [`fallback_delta`](Self::fallback_delta). Stepping through a debugger
    /// otherwise produces one huge frame.
    pub clamp_large_delta: bool,
    /// Largest delta accepted as-is when clamping, in seconds.
    pub max_delta: f64,
    /// Delta substituted for an oversized one, in seconds.
    pub fallback_delta: f64,
}

impl DirectorConfig {
    /// Deltas are used as measured.
    #[must_use]
    pub const fn release() -> Self {
        Self {
            clamp_large_delta: false,
            max_delta: 0.2,
            fallback_delta: 1.0 / 60.0,
        }
    }

    /// Deltas above 200 ms are replaced by one 60 Hz frame.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            clamp_large_delta: true,
            ..Self::release()
        }
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self::release()
    }
}

/// Drives frames for one scene graph and one renderer.
#[derive(Debug)]
pub struct Director<R> {
    graph: SceneGraph,
    renderer: R,
    config: DirectorConfig,

    // -- Scenes --
    running_scene: Option<NodeId>,
    next_scene: Option<NodeId>,
    scene_stack: Vec<NodeId>,
    notification_node: Option<NodeId>,
    send_cleanup_to_scene: bool,

    // -- Loop state --
    purge_requested: bool,
    paused: bool,
    invalid: bool,
    next_delta_zero: bool,
    last_update_ms: Option<f64>,
    delta: f64,
    total_frames: u64,
    last_stats: RenderStats,
}

impl<R: Renderer> Director<R> {
    /// Creates a director around an empty graph.
    #[must_use]
    pub fn new(renderer: R, config: DirectorConfig) -> Self {
        Self::with_graph(SceneGraph::new(), renderer, config)
    }

    /// Creates a director around an existing graph.
    #[must_use]
    pub fn with_graph(graph: SceneGraph, renderer: R, config: DirectorConfig) -> Self {
        Self {
            graph,
            renderer,
            config,
            running_scene: None,
            next_scene: None,
            scene_stack: Vec::new(),
            notification_node: None,
            send_cleanup_to_scene: false,
            purge_requested: false,
            paused: false,
            invalid: true,
            next_delta_zero: false,
            last_update_ms: None,
            delta: 0.0,
            total_frames: 0,
            last_stats: RenderStats::default(),
        }
    }

    // -- Accessors --

    /// Returns the scene graph.
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Returns the scene graph for mutation.
    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Returns the renderer.
    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the renderer for mutation.
    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Returns the scene currently on screen.
    #[inline]
    #[must_use]
    pub const fn running_scene(&self) -> Option<NodeId> {
        self.running_scene
    }

    /// Returns the number of scenes on the stack, the running one included.
    #[inline]
    #[must_use]
    pub fn scene_stack_depth(&self) -> usize {
        self.scene_stack.len()
    }

    /// Returns the number of frames rendered so far.
    #[inline]
    #[must_use]
    pub const fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Returns the delta of the last frame, in seconds.
    #[inline]
    #[must_use]
    pub const fn delta_time(&self) -> f64 {
        self.delta
    }

    /// Returns what the renderer reported for the last frame.
    #[inline]
    #[must_use]
    pub const fn last_render_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Are updates suspended?
    #[inline]
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Is the main loop producing frames?
    #[inline]
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        !self.invalid
    }

    /// Returns the overlay node drawn above every scene.
    #[inline]
    #[must_use]
    pub const fn notification_node(&self) -> Option<NodeId> {
        self.notification_node
    }

    /// Sets (or clears) the overlay node drawn above every scene.
    ///
    /// The overlay is entered immediately and survives scene changes.
    pub fn set_notification_node(&mut self, node: Option<NodeId>) {
        if let Some(old) = self.notification_node.take()
            && self.graph.is_alive(old)
            && self.graph.is_running(old)
        {
            self.graph
                .perform_recursive(old, LifecycleEvent::ExitTransitionDidStart);
            self.graph.perform_recursive(old, LifecycleEvent::Exit);
        }
        if let Some(new) = node {
            self.graph.perform_recursive(new, LifecycleEvent::Enter);
            self.graph
                .perform_recursive(new, LifecycleEvent::EnterTransitionDidFinish);
        }
        self.notification_node = node;
        self.graph.queue_mut().set_children_order_dirty();
    }

    // -- Scene stack --

    /// Starts the first scene, or replaces the running one.
    pub fn run_with_scene(&mut self, scene: NodeId) {
        if self.running_scene.is_none() && self.next_scene.is_none() {
            self.push_scene(scene);
            self.start_animation();
        } else {
            self.replace_scene(scene);
        }
    }

    /// Suspends the running scene and makes `scene` the running one.
    ///
    /// The suspended scene exits but keeps its actions and timers.
    pub fn push_scene(&mut self, scene: NodeId) {
        self.send_cleanup_to_scene = false;
        self.scene_stack.push(scene);
        self.next_scene = Some(scene);
    }

    /// Discards the running scene and resumes the one below it.
    ///
    /// Popping the last scene ends the director.
    pub fn pop_scene(&mut self) {
        self.scene_stack.pop();
        match self.scene_stack.last() {
            Some(&top) => {
                self.send_cleanup_to_scene = true;
                self.next_scene = Some(top);
            }
            None => self.end(),
        }
    }

    /// Pops every scene but the bottom one.
    pub fn pop_to_root_scene(&mut self) {
        self.pop_to_scene_stack_level(1);
    }

    /// Pops scenes until `level` remain. Level 0 ends the director; a level
    /// at or above the current depth does nothing.
    ///
    /// Every popped scene exits (if running) and is cleaned up.
    pub fn pop_to_scene_stack_level(&mut self, level: usize) {
        if level == 0 {
            self.end();
            return;
        }
        if level >= self.scene_stack.len() {
            return;
        }
        while self.scene_stack.len() > level {
            let Some(scene) = self.scene_stack.pop() else {
                break;
            };
            if self.running_scene == Some(scene) {
                // Already torn down here; the swap must not repeat it.
                self.running_scene = None;
            }
            if !self.graph.is_alive(scene) {
                continue;
            }
            if self.graph.is_running(scene) {
                self.graph
                    .perform_recursive(scene, LifecycleEvent::ExitTransitionDidStart);
                self.graph.perform_recursive(scene, LifecycleEvent::Exit);
            }
            self.graph.perform_recursive(scene, LifecycleEvent::Cleanup);
        }
        self.next_scene = self.scene_stack.last().copied();
        self.send_cleanup_to_scene = true;
    }

    /// Replaces the running scene; the old one is cleaned up.
    pub fn replace_scene(&mut self, scene: NodeId) {
        self.send_cleanup_to_scene = true;
        match self.scene_stack.last_mut() {
            Some(top) => *top = scene,
            None => self.scene_stack.push(scene),
        }
        self.next_scene = Some(scene);
    }

    /// Requests shutdown. The purge runs at the start of the next frame.
    pub fn end(&mut self) {
        self.purge_requested = true;
    }

    /// Suspends actions, updates and timers. Rendering continues.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes after [`pause`](Self::pause). The next delta is zero.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.next_delta_zero = true;
    }

    /// Stops producing frames.
    pub fn stop_animation(&mut self) {
        self.invalid = true;
    }

    /// Starts (or restarts) producing frames. The next delta is zero.
    pub fn start_animation(&mut self) {
        self.invalid = false;
        self.next_delta_zero = true;
    }

    /// Forces the next frame delta to zero, e.g. after the host was hidden.
    pub fn set_next_delta_time_zero(&mut self) {
        self.next_delta_zero = true;
    }

    // -- Frame --

    /// Runs one frame at time `now_ms`.
    pub fn main_loop(&mut self, now_ms: f64) {
        self.main_loop_traced(now_ms, &mut Tracer::none(), &mut || now_ms);
    }

    /// Runs one frame, reporting to `tracer`.
    ///
    /// `clock` timestamps phase boundaries; it is only read while the tracer
    /// is active.
    pub fn main_loop_traced(
        &mut self,
        now_ms: f64,
        tracer: &mut Tracer<'_>,
        clock: &mut dyn FnMut() -> f64,
    ) {
        if self.purge_requested {
            self.purge_requested = false;
            self.purge();
            return;
        }
        if self.invalid {
            return;
        }

        self.calculate_delta(now_ms);
        let frame_index = self.total_frames;
        tracer.frame_tick(&FrameTickEvent {
            frame_index,
            now_ms,
            delta: self.delta,
            paused: self.paused,
        });

        // Update.
        if !self.paused {
            phase_begin(tracer, clock, frame_index, PhaseKind::Update);
            self.graph.update_actions(self.delta);
            self.graph.update_scheduler(self.delta);
            self.dispatch(EVENT_AFTER_UPDATE);
            phase_end(tracer, clock, frame_index, PhaseKind::Update);
        }

        if self.next_scene.is_some() {
            self.set_next_scene(tracer);
        }

        // Visit.
        phase_begin(tracer, clock, frame_index, PhaseKind::Visit);
        let kind = if self.graph.queue().children_order_dirty() {
            let queue = self.graph.queue_mut();
            queue.clear_render_commands();
            if let Some(scene) = self.running_scene.filter(|&s| self.graph.is_alive(s)) {
                self.graph.visit(scene);
            }
            let queue = self.graph.queue_mut();
            queue.seal_scene();
            queue.clear_children_order_dirty();
            self.graph.reset_dirty_pool();
            VisitKind::Rebuild
        } else if self.graph.queue().transform_dirty() {
            self.graph.flush_transforms();
            VisitKind::Flush
        } else {
            VisitKind::Idle
        };

        self.renderer.clear();
        self.graph.queue_mut().begin_overlay();
        if let Some(overlay) = self.notification_node.filter(|&n| self.graph.is_alive(n)) {
            self.graph.visit(overlay);
        }
        phase_end(tracer, clock, frame_index, PhaseKind::Visit);
        tracer.visit(&VisitEvent {
            frame_index,
            kind,
            commands: self.graph.queue().commands().len(),
        });
        self.dispatch(EVENT_AFTER_VISIT);

        // Render.
        phase_begin(tracer, clock, frame_index, PhaseKind::Render);
        self.last_stats = self.renderer.rendering(&mut self.graph);
        phase_end(tracer, clock, frame_index, PhaseKind::Render);
        tracer.render(&RenderEvent {
            frame_index,
            stats: self.last_stats,
        });

        self.total_frames += 1;
        self.dispatch(EVENT_AFTER_DRAW);
    }

    fn calculate_delta(&mut self, now_ms: f64) {
        let delta = match self.last_update_ms {
            Some(last) if !self.next_delta_zero => ((now_ms - last) / 1000.0).max(0.0),
            _ => 0.0,
        };
        self.next_delta_zero = false;
        self.delta = if self.config.clamp_large_delta && delta > self.config.max_delta {
            log::debug!(
                "clamping frame delta {delta:.3}s to {:.4}s",
                self.config.fallback_delta
            );
            self.config.fallback_delta
        } else {
            delta
        };
        self.last_update_ms = Some(now_ms);
    }

    fn set_next_scene(&mut self, tracer: &mut Tracer<'_>) {
        let Some(next) = self.next_scene.take() else {
            return;
        };
        let previous = self.running_scene.filter(|&s| self.graph.is_alive(s));
        let cleanup = self.send_cleanup_to_scene;
        if let Some(old) = previous
            && old != next
        {
            if self.graph.is_running(old) {
                self.graph
                    .perform_recursive(old, LifecycleEvent::ExitTransitionDidStart);
                self.graph.perform_recursive(old, LifecycleEvent::Exit);
            }
            if cleanup && self.graph.is_alive(old) {
                self.graph.perform_recursive(old, LifecycleEvent::Cleanup);
            }
        }
        log::debug!("running scene {previous:?} -> {next:?} (cleanup: {cleanup})");
        tracer.scene_swap(&SceneSwapEvent {
            frame_index: self.total_frames,
            from: previous.map(NodeId::index),
            to: next.index(),
            cleanup,
        });
        self.running_scene = Some(next);
        if self.graph.is_alive(next) && !self.graph.is_running(next) {
            self.graph.perform_recursive(next, LifecycleEvent::Enter);
            if self.graph.is_alive(next) {
                self.graph
                    .perform_recursive(next, LifecycleEvent::EnterTransitionDidFinish);
            }
        }
        self.graph.queue_mut().set_children_order_dirty();
    }

    /// Tears everything down after [`end`](Self::end).
    fn purge(&mut self) {
        self.graph.scheduler_mut().unschedule_all();
        self.graph.events_mut().set_enabled(false);
        if let Some(scene) = self.running_scene.take()
            && self.graph.is_alive(scene)
        {
            if self.graph.is_running(scene) {
                self.graph
                    .perform_recursive(scene, LifecycleEvent::ExitTransitionDidStart);
                self.graph.perform_recursive(scene, LifecycleEvent::Exit);
            }
            self.graph.perform_recursive(scene, LifecycleEvent::Cleanup);
        }
        self.next_scene = None;
        self.scene_stack.clear();
        self.graph.queue_mut().clear_render_commands();
        self.stop_animation();
        log::debug!("director purged after {} frames", self.total_frames);
    }

    fn dispatch(&mut self, name: &str) {
        self.graph.events_mut().dispatch_event(&CustomEvent {
            name,
            user_data: self.total_frames,
        });
    }
}

fn phase_begin(
    tracer: &mut Tracer<'_>,
    clock: &mut dyn FnMut() -> f64,
    frame_index: u64,
    phase: PhaseKind,
) {
    if tracer.is_active() {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase,
            timestamp_ms: clock(),
        });
    }
}

fn phase_end(
    tracer: &mut Tracer<'_>,
    clock: &mut dyn FnMut() -> f64,
    frame_index: u64,
    phase: PhaseKind,
) {
    if tracer.is_active() {
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase,
            timestamp_ms: clock(),
        });
    }
}
