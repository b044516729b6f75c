// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named custom events.
//!
//! The [`EventDispatcher`] delivers [`CustomEvent`]s to listeners registered
//! by name. Listeners may be owned by a node, in which case they follow the
//! node's lifecycle: paused on exit, resumed on enter, removed on cleanup.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::node::NodeId;

/// An event delivered by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomEvent<'a> {
    /// Listeners registered under this name receive the event.
    pub name: &'a str,
    /// Arbitrary payload; the director sends the total frame count.
    pub user_data: u64,
}

/// Handle returned by [`EventDispatcher::add_custom_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u32);

type Callback = Box<dyn FnMut(&CustomEvent<'_>)>;

struct Listener {
    id: ListenerId,
    name: String,
    owner: Option<NodeId>,
    callback: Callback,
}

/// Registry of custom-event listeners.
pub struct EventDispatcher {
    listeners: Vec<Listener>,
    paused: BTreeSet<NodeId>,
    next_id: u32,
    enabled: bool,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("paused", &self.paused)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Creates an enabled dispatcher without listeners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
            paused: BTreeSet::new(),
            next_id: 0,
            enabled: true,
        }
    }

    /// Registers `callback` for events called `name`.
    ///
    /// With an `owner`, the listener is paused, resumed and removed along
    /// with that node.
    pub fn add_custom_listener(
        &mut self,
        name: impl Into<String>,
        owner: Option<NodeId>,
        callback: impl FnMut(&CustomEvent<'_>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            name: name.into(),
            owner,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes one listener. Unknown ids are ignored.
    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|l| l.id != id);
    }

    /// Removes every listener owned by `target`.
    pub fn remove_listeners(&mut self, target: NodeId) {
        self.listeners.retain(|l| l.owner != Some(target));
        self.paused.remove(&target);
    }

    /// Removes every listener registered for `name`.
    pub fn remove_custom_listeners(&mut self, name: &str) {
        self.listeners.retain(|l| l.name != name);
    }

    /// Suspends the listeners owned by `target`.
    pub fn pause_target(&mut self, target: NodeId) {
        self.paused.insert(target);
    }

    /// Resumes the listeners owned by `target`.
    pub fn resume_target(&mut self, target: NodeId) {
        self.paused.remove(&target);
    }

    /// Returns the number of listeners owned by `target`.
    #[must_use]
    pub fn listener_count(&self, target: NodeId) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.owner == Some(target))
            .count()
    }

    /// Enables or disables all delivery.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Is delivery enabled?
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Delivers `event` to every active listener registered for its name,
    /// in registration order. Returns how many listeners were called.
    pub fn dispatch_event(&mut self, event: &CustomEvent<'_>) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut delivered = 0;
        for listener in &mut self.listeners {
            if listener.name != event.name {
                continue;
            }
            if listener.owner.is_some_and(|o| self.paused.contains(&o)) {
                continue;
            }
            (listener.callback)(event);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&CustomEvent<'_>) + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move |_: &CustomEvent<'_>| h.set(h.get() + 1))
    }

    fn event(name: &str) -> CustomEvent<'_> {
        CustomEvent { name, user_data: 0 }
    }

    #[test]
    fn delivers_by_name_only() {
        let mut d = EventDispatcher::new();
        let (hits, cb) = counter();
        d.add_custom_listener("tick", None, cb);
        assert_eq!(d.dispatch_event(&event("tock")), 0);
        assert_eq!(d.dispatch_event(&event("tick")), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn owned_listeners_pause_and_go_away() {
        let mut d = EventDispatcher::new();
        let owner = NodeId::from_raw(3, 0);
        let (hits, cb) = counter();
        d.add_custom_listener("tick", Some(owner), cb);

        d.pause_target(owner);
        d.dispatch_event(&event("tick"));
        assert_eq!(hits.get(), 0);

        d.resume_target(owner);
        d.dispatch_event(&event("tick"));
        assert_eq!(hits.get(), 1);

        d.remove_listeners(owner);
        assert_eq!(d.listener_count(owner), 0);
        assert_eq!(d.dispatch_event(&event("tick")), 0);
    }

    #[test]
    fn disabled_dispatcher_is_silent() {
        let mut d = EventDispatcher::new();
        let (hits, cb) = counter();
        let id = d.add_custom_listener("tick", None, cb);
        d.set_enabled(false);
        d.dispatch_event(&event("tick"));
        d.set_enabled(true);
        d.remove_listener(id);
        d.dispatch_event(&event("tick"));
        assert_eq!(hits.get(), 0);
    }
}
