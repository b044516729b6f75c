// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle dispatch, user behaviors and the scheduling passthroughs.
//!
//! Lifecycle events are delivered to a whole subtree at once by
//! [`SceneGraph::perform_recursive`]. The subtree is collected up front into
//! a stack borrowed from the [`FrameContext`](crate::frame::FrameContext),
//! then walked in reverse collection order, so callbacks may add, remove or
//! destroy nodes without disturbing the walk. Handles that went stale in
//! the meantime are skipped.
//!
//! A behavior is taken out of its slot for the duration of each callback and
//! put back afterwards, unless the callback destroyed its own node or
//! installed a replacement.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::action::Action;
use crate::scheduler::{ScheduledCall, TimerKey};

use super::{NodeId, SceneGraph};

/// A lifecycle transition delivered to every node of a subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The subtree became part of the running scene.
    Enter,
    /// The subtree left the running scene.
    Exit,
    /// The transition that brought the subtree in has finished.
    EnterTransitionDidFinish,
    /// The transition that takes the subtree out is starting.
    ExitTransitionDidStart,
    /// The subtree's actions, timers and listeners are being released.
    Cleanup,
}

/// User hooks attached to a node.
///
/// Every hook defaults to a no-op. Hooks run after the graph has applied the
/// built-in effect of the event, and receive the graph mutably with this
/// behavior temporarily detached from `id`.
pub trait NodeBehavior {
    /// The node entered the running scene.
    fn on_enter(&mut self, graph: &mut SceneGraph, id: NodeId) {
        _ = (graph, id);
    }

    /// The node left the running scene.
    fn on_exit(&mut self, graph: &mut SceneGraph, id: NodeId) {
        _ = (graph, id);
    }

    /// The enter transition finished.
    fn on_enter_transition_did_finish(&mut self, graph: &mut SceneGraph, id: NodeId) {
        _ = (graph, id);
    }

    /// The exit transition is starting.
    fn on_exit_transition_did_start(&mut self, graph: &mut SceneGraph, id: NodeId) {
        _ = (graph, id);
    }

    /// The node's actions and timers were released.
    fn cleanup(&mut self, graph: &mut SceneGraph, id: NodeId) {
        _ = (graph, id);
    }

    /// Per-frame update, when scheduled with
    /// [`schedule_update`](SceneGraph::schedule_update).
    fn update(&mut self, graph: &mut SceneGraph, id: NodeId, dt: f64) {
        _ = (graph, id, dt);
    }

    /// A timer scheduled with [`schedule`](SceneGraph::schedule) fired.
    fn on_timer(&mut self, graph: &mut SceneGraph, id: NodeId, key: TimerKey, dt: f64) {
        _ = (graph, id, key, dt);
    }
}

impl SceneGraph {
    // -- Lifecycle --

    /// Delivers `event` to `id` and every descendant, protected children
    /// included.
    ///
    /// Nodes are collected breadth first and visited in reverse, so the
    /// deepest nodes are notified first and `id` last.
    pub fn perform_recursive(&mut self, id: NodeId, event: LifecycleEvent) {
        self.validate(id);
        let mut stack = self.frame.acquire_stack();
        stack.push(id);
        let mut cursor = 0;
        while cursor < stack.len() {
            let cur = stack[cursor].idx as usize;
            for &child in self.children[cur].iter().chain(&self.protected[cur]) {
                stack.push(self.id_at(child));
            }
            cursor += 1;
        }
        for &node in stack.iter().rev() {
            if self.is_alive(node) {
                self.apply_lifecycle(node, event);
            }
        }
        self.frame.release_stack(stack);
    }

    fn apply_lifecycle(&mut self, id: NodeId, event: LifecycleEvent) {
        let i = id.idx as usize;
        match event {
            LifecycleEvent::Enter => {
                self.state[i].running = true;
                self.state[i].transition_finished = false;
                self.scheduler.resume_target(id);
                self.actions.resume_target(id);
                self.events.resume_target(id);
            }
            LifecycleEvent::Exit => {
                self.state[i].running = false;
                self.scheduler.pause_target(id);
                self.actions.pause_target(id);
                self.events.pause_target(id);
            }
            LifecycleEvent::EnterTransitionDidFinish => {
                self.state[i].transition_finished = true;
            }
            LifecycleEvent::ExitTransitionDidStart => {}
            LifecycleEvent::Cleanup => {
                self.actions.remove_all_actions_from_target(id);
                self.scheduler.unschedule_all_for_target(id);
                self.events.remove_listeners(id);
            }
        }
        self.with_behavior(id, |behavior, graph| match event {
            LifecycleEvent::Enter => behavior.on_enter(graph, id),
            LifecycleEvent::Exit => behavior.on_exit(graph, id),
            LifecycleEvent::EnterTransitionDidFinish => {
                behavior.on_enter_transition_did_finish(graph, id);
            }
            LifecycleEvent::ExitTransitionDidStart => {
                behavior.on_exit_transition_did_start(graph, id);
            }
            LifecycleEvent::Cleanup => behavior.cleanup(graph, id),
        });
    }

    /// Runs `f` with the behavior of `id` detached from the graph.
    fn with_behavior(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn NodeBehavior, &mut Self),
    ) {
        let i = id.idx as usize;
        let Some(mut behavior) = self.behaviors[i].take() else {
            return;
        };
        f(behavior.as_mut(), self);
        if self.is_alive(id) && self.behaviors[i].is_none() {
            self.behaviors[i] = Some(behavior);
        }
    }

    // -- Scheduler --

    /// Delivers the updates and timers due after `dt` seconds.
    ///
    /// Each call is re-checked right before delivery: an entry unscheduled,
    /// paused or destroyed by an earlier callback of the same frame is
    /// skipped.
    pub fn update_scheduler(&mut self, dt: f64) {
        let mut calls = Vec::new();
        self.scheduler.update(dt, &mut calls);
        for call in calls {
            match call {
                ScheduledCall::Update { target, dt } => {
                    if !self.is_alive(target)
                        || self.scheduler.is_target_paused(target)
                        || !self.scheduler.is_update_scheduled(target)
                    {
                        continue;
                    }
                    self.with_behavior(target, |b, g| b.update(g, target, dt));
                }
                ScheduledCall::Timer { target, key, dt } => {
                    if !self.is_alive(target) || self.scheduler.is_target_paused(target) {
                        continue;
                    }
                    self.with_behavior(target, |b, g| b.on_timer(g, target, key, dt));
                }
            }
        }
    }

    /// Schedules the per-frame [`update`](super::NodeBehavior::update) of a
    /// node. Lower priorities run first.
    ///
    /// The entry starts paused unless the node is running.
    pub fn schedule_update(&mut self, id: NodeId, priority: i32) {
        self.validate(id);
        let paused = !self.state[id.idx as usize].running;
        self.scheduler.schedule_update(id, priority, paused);
    }

    /// Stops the per-frame update of a node.
    pub fn unschedule_update(&mut self, id: NodeId) {
        self.validate(id);
        self.scheduler.unschedule_update(id);
    }

    /// Schedules a timer on a node; see [`Scheduler::schedule`].
    ///
    /// [`Scheduler::schedule`]: crate::scheduler::Scheduler::schedule
    pub fn schedule(&mut self, id: NodeId, key: TimerKey, interval: f64, repeat: u32, delay: f64) {
        self.validate(id);
        let paused = !self.state[id.idx as usize].running;
        self.scheduler
            .schedule(id, key, interval, repeat, delay, paused);
    }

    /// Removes one timer of a node.
    pub fn unschedule(&mut self, id: NodeId, key: TimerKey) {
        self.validate(id);
        self.scheduler.unschedule(id, key);
    }

    /// Removes the update and every timer of a node.
    pub fn unschedule_all_callbacks(&mut self, id: NodeId) {
        self.validate(id);
        self.scheduler.unschedule_all_for_target(id);
    }

    /// Suspends the updates, timers, actions and listeners of a node.
    pub fn pause(&mut self, id: NodeId) {
        self.validate(id);
        self.scheduler.pause_target(id);
        self.actions.pause_target(id);
        self.events.pause_target(id);
    }

    /// Resumes what [`pause`](Self::pause) suspended.
    pub fn resume(&mut self, id: NodeId) {
        self.validate(id);
        self.scheduler.resume_target(id);
        self.actions.resume_target(id);
        self.events.resume_target(id);
    }

    // -- Actions --

    /// Runs an action on a node.
    ///
    /// The action starts paused unless the node is running.
    pub fn run_action(&mut self, id: NodeId, action: Box<dyn Action>) {
        self.validate(id);
        let paused = !self.state[id.idx as usize].running;
        self.actions.add_action(id, action, paused);
    }

    /// Stops and drops every action of a node.
    pub fn stop_all_actions(&mut self, id: NodeId) {
        self.validate(id);
        self.actions.remove_all_actions_from_target(id);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::action::FadeTo;
    use crate::event::CustomEvent;
    use crate::scheduler::REPEAT_FOREVER;

    type Log = Rc<RefCell<Vec<(u32, LifecycleEvent)>>>;

    struct Recorder(Log);

    impl NodeBehavior for Recorder {
        fn on_enter(&mut self, graph: &mut SceneGraph, id: NodeId) {
            assert!(graph.is_running(id), "built-in effect runs first");
            self.0.borrow_mut().push((id.index(), LifecycleEvent::Enter));
        }

        fn on_exit(&mut self, _graph: &mut SceneGraph, id: NodeId) {
            self.0.borrow_mut().push((id.index(), LifecycleEvent::Exit));
        }

        fn cleanup(&mut self, _graph: &mut SceneGraph, id: NodeId) {
            self.0.borrow_mut().push((id.index(), LifecycleEvent::Cleanup));
        }
    }

    #[test]
    fn dispatch_runs_in_reverse_breadth_first_order() {
        let log = Log::default();
        let mut g = SceneGraph::new();
        let root = g.create_node_with(Recorder(log.clone()));
        let a = g.create_node_with(Recorder(log.clone()));
        let b = g.create_node_with(Recorder(log.clone()));
        let a1 = g.create_node_with(Recorder(log.clone()));
        g.add_child(root, a, None, None).unwrap();
        g.add_child(root, b, None, None).unwrap();
        g.add_child(a, a1, None, None).unwrap();

        g.perform_recursive(root, LifecycleEvent::Enter);
        let order: Vec<u32> = log.borrow().iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![a1.index(), b.index(), a.index(), root.index()]);
        assert!(g.is_running(a1));
    }

    #[test]
    fn exit_pauses_and_enter_resumes() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.perform_recursive(n, LifecycleEvent::Enter);
        g.schedule_update(n, 0);
        g.run_action(n, Box::new(FadeTo::new(1.0, 0)));
        assert!(!g.scheduler().is_target_paused(n));

        g.perform_recursive(n, LifecycleEvent::Exit);
        assert!(!g.is_running(n));
        assert!(g.scheduler().is_target_paused(n));
        assert!(g.actions().is_target_paused(n));
    }

    #[test]
    fn cleanup_releases_everything() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.schedule_update(n, 0);
        g.schedule(n, TimerKey(1), 1.0, REPEAT_FOREVER, 0.0);
        g.events_mut().add_custom_listener("tick", Some(n), |_| {});
        g.perform_recursive(n, LifecycleEvent::Cleanup);
        assert!(!g.scheduler().is_update_scheduled(n));
        assert!(!g.scheduler().is_scheduled(n, TimerKey(1)));
        assert_eq!(g.events().listener_count(n), 0);
    }

    struct Suicide;

    impl NodeBehavior for Suicide {
        fn update(&mut self, graph: &mut SceneGraph, id: NodeId, _dt: f64) {
            if let Some(parent) = graph.parent(id) {
                graph.remove_child(parent, id, true).unwrap();
            }
            graph.destroy_node(id).unwrap();
        }
    }

    #[test]
    fn node_may_destroy_itself_from_update() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let n = g.create_node_with(Suicide);
        g.add_child(root, n, None, None).unwrap();
        g.perform_recursive(root, LifecycleEvent::Enter);
        g.schedule_update(n, 0);
        g.update_scheduler(0.016);
        assert!(!g.is_alive(n));
        assert!(g.children(root).is_empty());
        // The slot's next occupant does not inherit the old behavior.
        let m = g.create_node();
        assert!(g.take_behavior(m).is_none());
    }

    struct Counter(Rc<RefCell<u32>>);

    impl NodeBehavior for Counter {
        fn update(&mut self, _graph: &mut SceneGraph, _id: NodeId, _dt: f64) {
            *self.0.borrow_mut() += 1;
        }

        fn on_timer(&mut self, _graph: &mut SceneGraph, _id: NodeId, _key: TimerKey, _dt: f64) {
            *self.0.borrow_mut() += 100;
        }
    }

    #[test]
    fn idle_nodes_are_scheduled_paused() {
        let hits = Rc::new(RefCell::new(0));
        let mut g = SceneGraph::new();
        let n = g.create_node_with(Counter(hits.clone()));
        g.schedule_update(n, 0);
        g.update_scheduler(0.016);
        assert_eq!(*hits.borrow(), 0);
        g.resume(n);
        g.update_scheduler(0.016);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn timers_reach_the_behavior() {
        let hits = Rc::new(RefCell::new(0));
        let mut g = SceneGraph::new();
        let n = g.create_node_with(Counter(hits.clone()));
        g.perform_recursive(n, LifecycleEvent::Enter);
        g.schedule(n, TimerKey(3), 0.5, 0, 0.0);
        g.update_scheduler(0.0);
        g.update_scheduler(0.5);
        assert_eq!(*hits.borrow(), 100);
    }

    #[test]
    fn paused_listeners_are_not_called() {
        let hits = Rc::new(RefCell::new(0));
        let mut g = SceneGraph::new();
        let n = g.create_node();
        let h = hits.clone();
        g.events_mut()
            .add_custom_listener("ping", Some(n), move |_| *h.borrow_mut() += 1);
        g.pause(n);
        g.events_mut().dispatch_event(&CustomEvent { name: "ping", user_data: 0 });
        assert_eq!(*hits.borrow(), 0);
        g.resume(n);
        g.events_mut().dispatch_event(&CustomEvent { name: "ping", user_data: 0 });
        assert_eq!(*hits.borrow(), 1);
    }
}
