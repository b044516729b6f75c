// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node update and timer scheduling.
//!
//! The [`Scheduler`] only does bookkeeping: [`Scheduler::update`] advances
//! its entries and reports which callbacks are due as [`ScheduledCall`]s.
//! [`SceneGraph::update_scheduler`](crate::node::SceneGraph::update_scheduler)
//! then delivers them to node behaviors, re-checking each entry first so that
//! a callback which unschedules or destroys another node takes effect
//! within the same frame.
//!
//! Update entries run in ascending priority order; entries with equal
//! priority run in scheduling order.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::node::NodeId;

/// Repeat count of a timer that never expires.
pub const REPEAT_FOREVER: u32 = u32::MAX;

/// Identifies one timer among those of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerKey(pub u32);

/// A callback that became due during [`Scheduler::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScheduledCall {
    /// The per-frame update of `target`.
    Update {
        /// Node whose behavior receives the call.
        target: NodeId,
        /// Scaled frame delta, in seconds.
        dt: f64,
    },
    /// A timer of `target` fired.
    Timer {
        /// Node whose behavior receives the call.
        target: NodeId,
        /// Which timer fired.
        key: TimerKey,
        /// Time accumulated by the timer when it fired, in seconds.
        dt: f64,
    },
}

#[derive(Clone, Copy, Debug)]
struct UpdateEntry {
    target: NodeId,
    priority: i32,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    target: NodeId,
    key: TimerKey,
    interval: f64,
    repeat: u32,
    delay: f64,
    use_delay: bool,
    /// `None` until the first tick after scheduling.
    elapsed: Option<f64>,
    times_executed: u32,
    done: bool,
}

impl Timer {
    /// Advances the timer, returning the elapsed time if it fired.
    fn advance(&mut self, dt: f64) -> Option<f64> {
        let Some(elapsed) = self.elapsed.as_mut() else {
            self.elapsed = Some(0.0);
            self.times_executed = 0;
            return None;
        };
        *elapsed += dt;
        let run_forever = self.repeat == REPEAT_FOREVER;
        let mut fired = None;
        if run_forever && !self.use_delay {
            if *elapsed >= self.interval {
                fired = Some(*elapsed);
                *elapsed = 0.0;
            }
            return fired;
        }
        if self.use_delay {
            if *elapsed >= self.delay {
                fired = Some(*elapsed);
                *elapsed -= self.delay;
                self.times_executed += 1;
                self.use_delay = false;
            }
        } else if *elapsed >= self.interval {
            fired = Some(*elapsed);
            *elapsed = 0.0;
            self.times_executed += 1;
        }
        if !run_forever && self.times_executed > self.repeat {
            self.done = true;
        }
        fired
    }
}

/// Bookkeeping for per-node updates and timers.
#[derive(Debug)]
pub struct Scheduler {
    updates: Vec<UpdateEntry>,
    timers: Vec<Timer>,
    paused: BTreeSet<NodeId>,
    time_scale: f64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates an empty scheduler with a time scale of 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            updates: Vec::new(),
            timers: Vec::new(),
            paused: BTreeSet::new(),
            time_scale: 1.0,
        }
    }

    /// Returns the factor applied to every delta.
    #[inline]
    #[must_use]
    pub const fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Sets the factor applied to every delta.
    #[inline]
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    // -- Updates --

    /// Schedules the per-frame update of `target`.
    ///
    /// Rescheduling with a different priority moves the entry; rescheduling
    /// with the same priority only refreshes the pause state.
    pub fn schedule_update(&mut self, target: NodeId, priority: i32, paused: bool) {
        self.set_paused(target, paused);
        if let Some(pos) = self.updates.iter().position(|e| e.target == target) {
            if self.updates[pos].priority == priority {
                return;
            }
            self.updates.remove(pos);
        }
        let at = self
            .updates
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.updates.len());
        self.updates.insert(at, UpdateEntry { target, priority });
    }

    /// Removes the per-frame update of `target`, if scheduled.
    pub fn unschedule_update(&mut self, target: NodeId) {
        self.updates.retain(|e| e.target != target);
        self.forget_if_idle(target);
    }

    /// Is the per-frame update of `target` scheduled?
    #[must_use]
    pub fn is_update_scheduled(&self, target: NodeId) -> bool {
        self.updates.iter().any(|e| e.target == target)
    }

    // -- Timers --

    /// Schedules a timer that fires every `interval` seconds after an initial
    /// `delay`, `repeat + 1` times in total (or forever with
    /// [`REPEAT_FOREVER`]).
    ///
    /// Scheduling an existing `(target, key)` pair only updates its interval.
    pub fn schedule(
        &mut self,
        target: NodeId,
        key: TimerKey,
        interval: f64,
        repeat: u32,
        delay: f64,
        paused: bool,
    ) {
        self.set_paused(target, paused);
        if let Some(timer) = self
            .timers
            .iter_mut()
            .find(|t| t.target == target && t.key == key && !t.done)
        {
            log::debug!(
                "timer {key:?} of {target:?} already scheduled; interval {} -> {interval}",
                timer.interval
            );
            timer.interval = interval;
            return;
        }
        self.timers.push(Timer {
            target,
            key,
            interval,
            repeat,
            delay,
            use_delay: delay > 0.0,
            elapsed: None,
            times_executed: 0,
            done: false,
        });
    }

    /// Removes one timer of `target`.
    pub fn unschedule(&mut self, target: NodeId, key: TimerKey) {
        self.timers.retain(|t| !(t.target == target && t.key == key));
        self.forget_if_idle(target);
    }

    /// Is the `(target, key)` timer live?
    #[must_use]
    pub fn is_scheduled(&self, target: NodeId, key: TimerKey) -> bool {
        self.timers
            .iter()
            .any(|t| t.target == target && t.key == key && !t.done)
    }

    /// Removes the update and every timer of `target`.
    pub fn unschedule_all_for_target(&mut self, target: NodeId) {
        self.unschedule_update(target);
        self.timers.retain(|t| t.target != target);
        self.paused.remove(&target);
    }

    /// Removes everything.
    pub fn unschedule_all(&mut self) {
        self.updates.clear();
        self.timers.clear();
        self.paused.clear();
    }

    // -- Pausing --

    /// Suspends every entry of `target`.
    ///
    /// Targets without entries are not tracked; entries scheduled later carry
    /// their own pause state.
    pub fn pause_target(&mut self, target: NodeId) {
        if self.has_entries(target) {
            self.paused.insert(target);
        }
    }

    /// Resumes every entry of `target`.
    pub fn resume_target(&mut self, target: NodeId) {
        self.paused.remove(&target);
    }

    /// Are the entries of `target` suspended?
    #[must_use]
    pub fn is_target_paused(&self, target: NodeId) -> bool {
        self.paused.contains(&target)
    }

    fn has_entries(&self, target: NodeId) -> bool {
        self.updates.iter().any(|e| e.target == target)
            || self.timers.iter().any(|t| t.target == target)
    }

    fn forget_if_idle(&mut self, target: NodeId) {
        if !self.has_entries(target) {
            self.paused.remove(&target);
        }
    }

    fn set_paused(&mut self, target: NodeId, paused: bool) {
        if paused {
            self.paused.insert(target);
        } else {
            self.paused.remove(&target);
        }
    }

    // -- Ticking --

    /// Advances every unpaused entry by `dt` seconds (times the time scale)
    /// and appends the due callbacks to `out`, updates first.
    pub fn update(&mut self, dt: f64, out: &mut Vec<ScheduledCall>) {
        let dt = dt * self.time_scale;
        for entry in &self.updates {
            if !self.paused.contains(&entry.target) {
                out.push(ScheduledCall::Update {
                    target: entry.target,
                    dt,
                });
            }
        }
        for timer in &mut self.timers {
            if timer.done || self.paused.contains(&timer.target) {
                continue;
            }
            if let Some(elapsed) = timer.advance(dt) {
                out.push(ScheduledCall::Timer {
                    target: timer.target,
                    key: timer.key,
                    dt: elapsed,
                });
            }
        }
        self.timers.retain(|t| !t.done);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn id(i: u32) -> NodeId {
        NodeId::from_raw(i, 0)
    }

    fn targets(calls: &[ScheduledCall]) -> Vec<u32> {
        calls
            .iter()
            .map(|c| match c {
                ScheduledCall::Update { target, .. } | ScheduledCall::Timer { target, .. } => {
                    target.index()
                }
            })
            .collect()
    }

    #[test]
    fn updates_run_in_priority_then_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule_update(id(1), 0, false);
        s.schedule_update(id(2), -5, false);
        s.schedule_update(id(3), 0, false);
        s.schedule_update(id(4), 10, false);
        let mut out = Vec::new();
        s.update(0.016, &mut out);
        assert_eq!(targets(&out), vec![2, 1, 3, 4]);
    }

    #[test]
    fn paused_targets_are_skipped() {
        let mut s = Scheduler::new();
        s.schedule_update(id(1), 0, true);
        s.schedule_update(id(2), 0, false);
        let mut out = Vec::new();
        s.update(0.016, &mut out);
        assert_eq!(targets(&out), vec![2]);

        s.resume_target(id(1));
        s.pause_target(id(2));
        out.clear();
        s.update(0.016, &mut out);
        assert_eq!(targets(&out), vec![1]);
        assert!(s.is_target_paused(id(2)));
    }

    #[test]
    fn pause_state_is_kept_only_for_scheduled_targets() {
        let mut s = Scheduler::new();
        s.pause_target(id(1));
        assert!(!s.is_target_paused(id(1)));
        assert!(s.paused.is_empty());

        s.schedule_update(id(2), 0, false);
        s.schedule(id(2), TimerKey(0), 1.0, REPEAT_FOREVER, 0.0, false);
        s.pause_target(id(2));
        s.unschedule_update(id(2));
        assert!(s.is_target_paused(id(2)), "the timer is still there");
        s.unschedule(id(2), TimerKey(0));
        assert!(s.paused.is_empty());
    }

    #[test]
    fn time_scale_applies_to_updates() {
        let mut s = Scheduler::new();
        s.set_time_scale(0.5);
        s.schedule_update(id(1), 0, false);
        let mut out = Vec::new();
        s.update(0.2, &mut out);
        assert_eq!(out, vec![ScheduledCall::Update { target: id(1), dt: 0.1 }]);
    }

    #[test]
    fn timer_fires_repeat_plus_one_times() {
        let mut s = Scheduler::new();
        s.schedule(id(1), TimerKey(7), 1.0, 2, 0.0, false);
        let mut out = Vec::new();
        // First tick only arms the timer.
        s.update(1.0, &mut out);
        assert!(out.is_empty());
        for _ in 0..10 {
            s.update(1.0, &mut out);
        }
        assert_eq!(out.len(), 3);
        assert!(!s.is_scheduled(id(1), TimerKey(7)));
    }

    #[test]
    fn delayed_timer_waits_for_delay() {
        let mut s = Scheduler::new();
        s.schedule(id(1), TimerKey(0), 0.5, 0, 2.0, false);
        let mut out = Vec::new();
        s.update(0.0, &mut out);
        s.update(1.0, &mut out);
        assert!(out.is_empty());
        s.update(1.0, &mut out);
        assert_eq!(out.len(), 1);
        assert!(!s.is_scheduled(id(1), TimerKey(0)), "repeat 0 fires once");
    }

    #[test]
    fn rescheduling_updates_interval_only() {
        let mut s = Scheduler::new();
        s.schedule(id(1), TimerKey(0), 1.0, REPEAT_FOREVER, 0.0, false);
        s.schedule(id(1), TimerKey(0), 0.25, REPEAT_FOREVER, 0.0, false);
        let mut out = Vec::new();
        s.update(0.0, &mut out);
        s.update(0.25, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn unschedule_all_for_target_clears_everything() {
        let mut s = Scheduler::new();
        s.schedule_update(id(1), 0, false);
        s.schedule(id(1), TimerKey(0), 1.0, REPEAT_FOREVER, 0.0, false);
        s.schedule_update(id(2), 0, false);
        s.unschedule_all_for_target(id(1));
        assert!(!s.is_update_scheduled(id(1)));
        assert!(!s.is_scheduled(id(1), TimerKey(0)));
        assert!(s.is_update_scheduled(id(2)));
    }
}
