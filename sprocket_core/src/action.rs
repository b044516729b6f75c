// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-based actions driven once per frame.
//!
//! An [`Action`] mutates its target node through the public
//! [`SceneGraph`] API. The [`ActionManager`] only stores and pauses them;
//! [`SceneGraph::update_actions`] steps them. While stepping, the entry list
//! is moved out of the manager, so actions may add, stop or pause actions
//! (their own included) and even destroy nodes without invalidating the walk.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::node::{NodeId, SceneGraph};

/// Durations shorter than this are treated as instantaneous.
const MIN_DURATION: f64 = f32::EPSILON as f64;

/// Something that changes a node over time.
pub trait Action {
    /// Called once, right before the first [`step`](Self::step).
    fn start(&mut self, graph: &SceneGraph, target: NodeId) {
        _ = (graph, target);
    }

    /// Advances the action by `dt` seconds.
    fn step(&mut self, graph: &mut SceneGraph, target: NodeId, dt: f64);

    /// Has the action finished?
    fn is_done(&self) -> bool;
}

/// Elapsed-time bookkeeping shared by interval actions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    duration: f64,
    elapsed: f64,
    first_tick: bool,
}

impl Interval {
    /// Creates an interval lasting `duration` seconds.
    #[must_use]
    pub const fn new(duration: f64) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            first_tick: true,
        }
    }

    /// Advances by `dt` and returns the progress in `0.0..=1.0`.
    ///
    /// The first tick after starting always reports `0.0`.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.first_tick {
            self.first_tick = false;
            self.elapsed = 0.0;
        } else {
            self.elapsed += dt;
        }
        let t = self.elapsed / self.duration.max(MIN_DURATION);
        t.clamp(0.0, 1.0)
    }

    /// Has the full duration elapsed?
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Moves a node to an absolute position.
#[derive(Clone, Copy, Debug)]
pub struct MoveTo {
    interval: Interval,
    from: Point,
    to: Point,
}

impl MoveTo {
    /// Moves to `to` over `duration` seconds.
    #[must_use]
    pub const fn new(duration: f64, to: Point) -> Self {
        Self {
            interval: Interval::new(duration),
            from: Point::ZERO,
            to,
        }
    }
}

impl Action for MoveTo {
    fn start(&mut self, graph: &SceneGraph, target: NodeId) {
        self.from = graph.position(target);
    }

    fn step(&mut self, graph: &mut SceneGraph, target: NodeId, dt: f64) {
        let t = self.interval.advance(dt);
        graph.set_position(target, self.from.lerp(self.to, t));
    }

    fn is_done(&self) -> bool {
        self.interval.is_done()
    }
}

/// Fades a node to an absolute opacity.
#[derive(Clone, Copy, Debug)]
pub struct FadeTo {
    interval: Interval,
    from: u8,
    to: u8,
}

impl FadeTo {
    /// Fades to `to` over `duration` seconds.
    #[must_use]
    pub const fn new(duration: f64, to: u8) -> Self {
        Self {
            interval: Interval::new(duration),
            from: 255,
            to,
        }
    }
}

impl Action for FadeTo {
    fn start(&mut self, graph: &SceneGraph, target: NodeId) {
        self.from = graph.opacity(target);
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "the interpolated value lies between two u8 values"
    )]
    fn step(&mut self, graph: &mut SceneGraph, target: NodeId, dt: f64) {
        let t = self.interval.advance(dt);
        let from = f64::from(self.from);
        let value = from + (f64::from(self.to) - from) * t;
        graph.set_opacity(target, value as u8);
    }

    fn is_done(&self) -> bool {
        self.interval.is_done()
    }
}

pub(crate) struct ActionEntry {
    target: NodeId,
    action: Box<dyn Action>,
    started: bool,
}

/// Storage and pause state for running actions.
#[derive(Default)]
pub struct ActionManager {
    entries: Vec<ActionEntry>,
    paused: BTreeSet<NodeId>,
    /// Targets stopped while the entry list was out for stepping.
    purged: Vec<NodeId>,
    stepping: bool,
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionManager")
            .field("entries", &self.entries.len())
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl ActionManager {
    /// Creates an empty manager.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            paused: BTreeSet::new(),
            purged: Vec::new(),
            stepping: false,
        }
    }

    /// Starts running `action` on `target`.
    pub fn add_action(&mut self, target: NodeId, action: Box<dyn Action>, paused: bool) {
        if paused {
            self.paused.insert(target);
        }
        self.entries.push(ActionEntry {
            target,
            action,
            started: false,
        });
    }

    /// Stops every action of `target`.
    pub fn remove_all_actions_from_target(&mut self, target: NodeId) {
        self.entries.retain(|e| e.target != target);
        self.paused.remove(&target);
        if self.stepping {
            self.purged.push(target);
        }
    }

    /// Suspends every action of `target`.
    ///
    /// Targets without actions are not tracked.
    pub fn pause_target(&mut self, target: NodeId) {
        if self.stepping || self.entries.iter().any(|e| e.target == target) {
            self.paused.insert(target);
        }
    }

    /// Resumes every action of `target`.
    pub fn resume_target(&mut self, target: NodeId) {
        self.paused.remove(&target);
    }

    /// Are the actions of `target` suspended?
    #[must_use]
    pub fn is_target_paused(&self, target: NodeId) -> bool {
        self.paused.contains(&target)
    }

    /// Returns how many actions `target` has outside of a step pass.
    #[must_use]
    pub fn running_actions(&self, target: NodeId) -> usize {
        self.entries.iter().filter(|e| e.target == target).count()
    }
}

impl SceneGraph {
    /// Steps every unpaused action by `dt` seconds and drops finished ones.
    pub fn update_actions(&mut self, dt: f64) {
        let mut entries = core::mem::take(&mut self.actions.entries);
        self.actions.purged.clear();
        self.actions.stepping = true;
        for entry in &mut entries {
            let target = entry.target;
            if !self.is_alive(target)
                || self.actions.purged.contains(&target)
                || self.actions.paused.contains(&target)
            {
                continue;
            }
            if !entry.started {
                entry.action.start(self, target);
                entry.started = true;
            }
            entry.action.step(self, target, dt);
        }
        self.actions.stepping = false;
        let purged = core::mem::take(&mut self.actions.purged);
        let before = entries.len();
        entries.retain(|e| {
            !e.action.is_done() && self.is_alive(e.target) && !purged.contains(&e.target)
        });
        let dropped = entries.len() != before;
        entries.append(&mut self.actions.entries);
        if dropped {
            self.actions
                .paused
                .retain(|t| entries.iter().any(|e| e.target == *t));
        }
        self.actions.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;

    #[test]
    fn interval_reports_zero_on_first_tick() {
        let mut i = Interval::new(1.0);
        assert_eq!(i.advance(0.5), 0.0);
        assert_eq!(i.advance(0.5), 0.5);
        assert!(!i.is_done());
        assert_eq!(i.advance(0.75), 1.0);
        assert!(i.is_done());
    }

    #[test]
    fn zero_duration_completes_at_once() {
        let mut i = Interval::new(0.0);
        assert_eq!(i.advance(0.0), 0.0);
        assert!(i.is_done());
    }

    #[test]
    fn move_to_reaches_target_and_finishes() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.set_position(n, Point::new(10.0, 0.0));
        g.run_action(n, Box::new(MoveTo::new(1.0, Point::new(20.0, 10.0))));
        g.resume(n);

        g.update_actions(0.0);
        assert_eq!(g.position(n), Point::new(10.0, 0.0));
        g.update_actions(0.5);
        assert_eq!(g.position(n), Point::new(15.0, 5.0));
        g.update_actions(0.5);
        assert_eq!(g.position(n), Point::new(20.0, 10.0));
        assert_eq!(g.actions().running_actions(n), 0);
    }

    #[test]
    fn fade_to_interpolates_opacity() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.run_action(n, Box::new(FadeTo::new(2.0, 55)));
        g.resume(n);
        g.update_actions(0.0);
        g.update_actions(1.0);
        assert_eq!(g.opacity(n), 155);
    }

    #[test]
    fn actions_of_idle_nodes_start_paused() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.run_action(n, Box::new(MoveTo::new(1.0, Point::new(5.0, 5.0))));
        g.update_actions(0.0);
        g.update_actions(1.0);
        assert_eq!(g.position(n), Point::ZERO);
        assert!(g.actions().is_target_paused(n));
    }

    #[test]
    fn pause_state_follows_running_actions() {
        let mut g = SceneGraph::new();
        let idle = g.create_node();
        g.pause(idle);
        assert!(!g.actions().is_target_paused(idle));

        let n = g.create_node();
        g.run_action(n, Box::new(MoveTo::new(1.0, Point::new(5.0, 5.0))));
        assert!(g.actions().is_target_paused(n));
        g.stop_all_actions(n);
        assert!(!g.actions().is_target_paused(n));
        g.update_actions(0.1);
        assert!(g.actions().purged.is_empty());

        g.run_action(n, Box::new(FadeTo::new(0.5, 0)));
        g.destroy_node(n).unwrap();
        assert!(g.actions().purged.is_empty());
        assert!(g.actions().paused.is_empty());
    }

    struct StopSelf;

    impl Action for StopSelf {
        fn step(&mut self, graph: &mut SceneGraph, target: NodeId, _dt: f64) {
            graph.stop_all_actions(target);
        }

        fn is_done(&self) -> bool {
            false
        }
    }

    #[test]
    fn action_can_stop_its_own_target() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.run_action(n, Box::new(StopSelf));
        g.run_action(n, Box::new(MoveTo::new(1.0, Point::new(5.0, 5.0))));
        g.resume(n);
        g.update_actions(0.1);
        assert_eq!(g.actions().running_actions(n), 0);
        assert_eq!(g.position(n), Point::ZERO, "later action was skipped");
    }
}
