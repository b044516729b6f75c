// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree structure: attaching, detaching, destroying and ordering nodes.
//!
//! Structural operations validate their handles and return
//! [`SceneError`] on a precondition violation, leaving the graph unchanged.
//! Sorting is deferred: adding or reordering a child only sets the owner's
//! reorder flag and the queue's children-order flag, and the sort runs at
//! the owner's next visit.

use alloc::vec::Vec;

use crate::dirty::DirtyFlags;
use crate::error::SceneError;

use super::{ChildKey, INVALID, INVALID_TAG, Identity, LifecycleEvent, NodeId, SceneGraph};

/// Iterator over the children (or protected children) of a node.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    graph: &'a SceneGraph,
    slots: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    fn new(graph: &'a SceneGraph, slots: &'a [u32]) -> Self {
        Self {
            graph,
            slots: slots.iter(),
        }
    }

    /// Are there no (remaining) children?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.slots.next().map(|&s| self.graph.id_at(s))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.slots.next_back().map(|&s| self.graph.id_at(s))
    }
}

impl ExactSizeIterator for Children<'_> {}

impl SceneGraph {
    // -- Attaching --

    /// Appends `child` to the children of `parent`.
    ///
    /// `z` defaults to the child's current local z-order. A
    /// [`ChildKey::Tag`] sets the child's tag and clears its name; a
    /// [`ChildKey::Name`] sets its name; `None` leaves both alone.
    ///
    /// If `parent` is running, the child's subtree receives
    /// [`Enter`](LifecycleEvent::Enter), followed by
    /// [`EnterTransitionDidFinish`](LifecycleEvent::EnterTransitionDidFinish)
    /// once the parent's own transition has finished.
    ///
    /// # Errors
    ///
    /// - [`SceneError::StaleNode`] if either handle is stale.
    /// - [`SceneError::AlreadyParented`] if `child` has a parent.
    /// - [`SceneError::CyclicChild`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        z: Option<i32>,
        key: Option<ChildKey>,
    ) -> Result<(), SceneError> {
        self.check_attach(parent, child)?;
        let identity = &mut self.identity[child.idx as usize];
        match key {
            Some(ChildKey::Tag(tag)) => {
                identity.tag = tag;
                identity.name.clear();
            }
            Some(ChildKey::Name(name)) => identity.name = name,
            None => {}
        }
        let z = z.unwrap_or(identity.local_z);
        self.attach(parent, child, z, false);
        Ok(())
    }

    /// Appends `child` to the protected children of `parent`.
    ///
    /// Protected children are visited, transformed and dispatched to like
    /// regular children, but are invisible to the child-lookup API.
    ///
    /// # Errors
    ///
    /// Same as [`add_child`](Self::add_child).
    pub fn add_protected_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        z: i32,
    ) -> Result<(), SceneError> {
        self.check_attach(parent, child)?;
        self.attach(parent, child, z, true);
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check_alive(parent)?;
        self.check_alive(child)?;
        if let Some(p) = self.parent_slot(child.idx) {
            return Err(SceneError::AlreadyParented {
                child,
                parent: self.id_at(p),
            });
        }
        let mut cur = Some(parent.idx);
        while let Some(idx) = cur {
            if idx == child.idx {
                return Err(SceneError::CyclicChild { parent, child });
            }
            cur = self.parent_slot(idx);
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, z: i32, protected: bool) {
        let (p, c) = (parent.idx as usize, child.idx as usize);
        if protected {
            self.protected[p].push(child.idx);
            self.state[p].protected_reorder_dirty = true;
        } else {
            self.children[p].push(child.idx);
            self.state[p].reorder_dirty = true;
        }
        self.queue.set_children_order_dirty();

        self.identity[c].local_z = z;
        self.identity[c].arrival = self.frame.next_arrival();
        self.parent[c] = parent.idx;
        self.commands[c].level = self.commands[p].level + 1;

        let baked = self.commands[p].cached_parent;
        if baked.is_some() && !self.state[c].baked {
            self.set_cached_parent(child.idx, baked);
        }

        let mut flags = DirtyFlags::TRANSFORM;
        if self.visual[p].cascade_color {
            flags |= DirtyFlags::COLOR;
        }
        if self.visual[p].cascade_opacity {
            flags |= DirtyFlags::OPACITY;
        }
        self.set_dirty_flag(child.idx, flags);

        if self.state[p].running {
            self.perform_recursive(child, LifecycleEvent::Enter);
            if self.is_alive(parent)
                && self.is_alive(child)
                && self.state[p].transition_finished
            {
                self.perform_recursive(child, LifecycleEvent::EnterTransitionDidFinish);
            }
        }
    }

    // -- Detaching --

    /// Removes `child` from the children of `parent`.
    ///
    /// Does nothing if `child` is not among them. Otherwise a running child
    /// receives [`ExitTransitionDidStart`](LifecycleEvent::ExitTransitionDidStart)
    /// then [`Exit`](LifecycleEvent::Exit), then
    /// [`Cleanup`](LifecycleEvent::Cleanup) if `cleanup` is set, and is
    /// finally unlinked. The detached node stays alive; see
    /// [`destroy_node`](Self::destroy_node).
    ///
    /// # Errors
    ///
    /// [`SceneError::StaleNode`] if either handle is stale.
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        cleanup: bool,
    ) -> Result<(), SceneError> {
        self.check_alive(parent)?;
        self.check_alive(child)?;
        let p = parent.idx as usize;
        if self.children[p].is_empty() {
            return Ok(());
        }
        if self.children[p].contains(&child.idx) {
            self.detach_child(parent, child, cleanup, false);
        }
        self.queue.set_children_order_dirty();
        Ok(())
    }

    /// Removes `child` from the protected children of `parent`.
    ///
    /// # Errors
    ///
    /// [`SceneError::StaleNode`] if either handle is stale.
    pub fn remove_protected_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        cleanup: bool,
    ) -> Result<(), SceneError> {
        self.check_alive(parent)?;
        self.check_alive(child)?;
        if self.protected[parent.idx as usize].contains(&child.idx) {
            self.detach_child(parent, child, cleanup, true);
            self.queue.set_children_order_dirty();
        }
        Ok(())
    }

    /// Removes a node from whichever child list of its parent holds it.
    /// Does nothing for a root.
    ///
    /// # Errors
    ///
    /// [`SceneError::StaleNode`] if the handle is stale.
    pub fn remove_from_parent(&mut self, child: NodeId, cleanup: bool) -> Result<(), SceneError> {
        self.check_alive(child)?;
        let Some(p) = self.parent_slot(child.idx) else {
            return Ok(());
        };
        let parent = self.id_at(p);
        if self.protected[p as usize].contains(&child.idx) {
            self.remove_protected_child(parent, child, cleanup)
        } else {
            self.remove_child(parent, child, cleanup)
        }
    }

    /// Removes the first child of `parent` tagged `tag`.
    ///
    /// A miss is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// [`SceneError::StaleNode`] if the handle is stale.
    pub fn remove_child_by_tag(
        &mut self,
        parent: NodeId,
        tag: i32,
        cleanup: bool,
    ) -> Result<(), SceneError> {
        self.check_alive(parent)?;
        if tag == INVALID_TAG {
            log::warn!("remove_child_by_tag: invalid tag");
        }
        match self.child_by_tag(parent, tag) {
            Some(child) => self.remove_child(parent, child, cleanup),
            None => {
                log::warn!("remove_child_by_tag: no child of {parent:?} tagged {tag}");
                Ok(())
            }
        }
    }

    /// Removes every child of `parent`. Protected children stay.
    ///
    /// # Errors
    ///
    /// [`SceneError::StaleNode`] if the handle is stale.
    pub fn remove_all_children(&mut self, parent: NodeId, cleanup: bool) -> Result<(), SceneError> {
        self.check_alive(parent)?;
        let snapshot: Vec<NodeId> = self.children(parent).collect();
        for child in snapshot {
            if self.is_alive(child) && self.parent[child.idx as usize] == parent.idx {
                self.detach_child(parent, child, cleanup, false);
            }
        }
        self.queue.set_children_order_dirty();
        Ok(())
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId, cleanup: bool, protected: bool) {
        if self.state[child.idx as usize].running {
            self.perform_recursive(child, LifecycleEvent::ExitTransitionDidStart);
            if self.is_alive(child) {
                self.perform_recursive(child, LifecycleEvent::Exit);
            }
        }
        if cleanup && self.is_alive(child) {
            self.perform_recursive(child, LifecycleEvent::Cleanup);
        }
        // A callback may have moved the child already.
        if !self.is_alive(parent)
            || !self.is_alive(child)
            || self.parent[child.idx as usize] != parent.idx
        {
            return;
        }
        let c = child.idx;
        self.parent[c as usize] = INVALID;
        self.detach_from_parent(c);
        let list = if protected {
            &mut self.protected[parent.idx as usize]
        } else {
            &mut self.children[parent.idx as usize]
        };
        if let Some(pos) = list.iter().position(|&s| s == c) {
            list.remove(pos);
        }
    }

    /// Destroys a detached node and its whole subtree, freeing their slots.
    ///
    /// A running node first receives [`Exit`](LifecycleEvent::Exit). Every
    /// destroyed node loses its scheduled callbacks, actions and listeners,
    /// and every handle to it becomes stale.
    ///
    /// # Errors
    ///
    /// - [`SceneError::StaleNode`] if the handle is stale.
    /// - [`SceneError::AlreadyParented`] if the node still has a parent.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.check_alive(id)?;
        if let Some(p) = self.parent_slot(id.idx) {
            return Err(SceneError::AlreadyParented {
                child: id,
                parent: self.id_at(p),
            });
        }
        if self.state[id.idx as usize].running {
            self.perform_recursive(id, LifecycleEvent::Exit);
            if !self.is_alive(id) {
                return Ok(());
            }
        }
        let mut slots = Vec::new();
        self.collect_subtree(id.idx, &mut slots);
        for idx in slots {
            let node = self.id_at(idx);
            self.scheduler.unschedule_all_for_target(node);
            self.actions.remove_all_actions_from_target(node);
            self.events.remove_listeners(node);
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.protected[i].clear();
            self.behaviors[i] = None;
            self.commands[i].in_pool = false;
            // Bump generation so old handles immediately fail validation.
            self.generation[i] += 1;
            self.free_list.push(idx);
        }
        self.queue.set_children_order_dirty();
        Ok(())
    }

    // -- Ordering --

    /// Moves `child` to local z-order `z` among its siblings.
    ///
    /// The child also gets a fresh arrival order, so it sorts after every
    /// sibling that shares the new z.
    ///
    /// # Errors
    ///
    /// - [`SceneError::StaleNode`] if either handle is stale.
    /// - [`SceneError::NotAChild`] (logged) if `child` is not a child of
    ///   `parent`.
    pub fn reorder_child(&mut self, parent: NodeId, child: NodeId, z: i32) -> Result<(), SceneError> {
        self.check_alive(parent)?;
        self.check_alive(child)?;
        if !self.children[parent.idx as usize].contains(&child.idx) {
            log::warn!("reorder_child: {child:?} is not a child of {parent:?}");
            return Err(SceneError::NotAChild { parent, child });
        }
        self.state[parent.idx as usize].reorder_dirty = true;
        self.reorder(child, z);
        Ok(())
    }

    fn reorder(&mut self, child: NodeId, z: i32) {
        let c = child.idx as usize;
        self.queue.set_children_order_dirty();
        self.identity[c].arrival = self.frame.next_arrival();
        self.identity[c].local_z = z;
        self.set_dirty_flag(child.idx, DirtyFlags::ORDER);
    }

    /// Sets the local z-order of a node. Unchanged values are ignored.
    pub fn set_local_z_order(&mut self, id: NodeId, z: i32) {
        self.validate(id);
        let i = id.idx as usize;
        if self.identity[i].local_z == z {
            return;
        }
        match self.parent_slot(id.idx) {
            Some(p) => {
                let p = p as usize;
                if self.protected[p].contains(&id.idx) {
                    self.state[p].protected_reorder_dirty = true;
                } else {
                    self.state[p].reorder_dirty = true;
                }
                self.reorder(id, z);
            }
            None => self.identity[i].local_z = z,
        }
    }

    /// Sorts the child lists of a node by `(z, arrival)` if they changed.
    pub fn sort_all_children(&mut self, id: NodeId) {
        self.validate(id);
        self.sort_children(id.idx);
    }

    pub(crate) fn sort_children(&mut self, idx: u32) {
        let i = idx as usize;
        if self.state[i].reorder_dirty {
            insertion_sort(&mut self.children[i], &self.identity);
            self.state[i].reorder_dirty = false;
        }
        if self.state[i].protected_reorder_dirty {
            insertion_sort(&mut self.protected[i], &self.identity);
            self.state[i].protected_reorder_dirty = false;
        }
    }

    // -- Topology queries --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.parent_slot(id.idx).map(|p| self.id_at(p))
    }

    /// Returns the children of a node in their current order.
    ///
    /// The order is only sorted after a visit or
    /// [`sort_all_children`](Self::sort_all_children).
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the protected children of a node in their current order.
    #[must_use]
    pub fn protected_children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.protected[id.idx as usize])
    }

    /// Returns the first child of `parent` tagged `tag`.
    #[must_use]
    pub fn child_by_tag(&self, parent: NodeId, tag: i32) -> Option<NodeId> {
        self.validate(parent);
        let found = self.children[parent.idx as usize]
            .iter()
            .find(|&&c| self.identity[c as usize].tag == tag)
            .map(|&c| self.id_at(c));
        if found.is_none() {
            log::warn!("child_by_tag: no child of {parent:?} tagged {tag}");
        }
        found
    }

    /// Returns the first child of `parent` named `name`.
    #[must_use]
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.validate(parent);
        if name.is_empty() {
            log::warn!("child_by_name: empty name");
            return None;
        }
        let found = self.children[parent.idx as usize]
            .iter()
            .find(|&&c| self.identity[c as usize].name == name)
            .map(|&c| self.id_at(c));
        if found.is_none() {
            log::warn!("child_by_name: no child of {parent:?} named {name:?}");
        }
        found
    }

    /// Returns the first protected child of `parent` tagged `tag`.
    #[must_use]
    pub fn protected_child_by_tag(&self, parent: NodeId, tag: i32) -> Option<NodeId> {
        self.validate(parent);
        self.protected[parent.idx as usize]
            .iter()
            .find(|&&c| self.identity[c as usize].tag == tag)
            .map(|&c| self.id_at(c))
    }

    pub(crate) fn check_alive(&self, id: NodeId) -> Result<(), SceneError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(SceneError::StaleNode(id))
        }
    }
}

/// Stable in-place sort by `(local_z, arrival)`.
///
/// Child lists are short and usually nearly sorted.
fn insertion_sort(list: &mut [u32], identity: &[Identity]) {
    let key = |slot: u32| {
        let id = &identity[slot as usize];
        (id.local_z, id.arrival)
    };
    for j in 1..list.len() {
        let mut k = j;
        while k > 0 && key(list[k - 1]) > key(list[k]) {
            list.swap(k - 1, k);
            k -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::*;

    fn sorted(g: &mut SceneGraph, parent: NodeId) -> Vec<NodeId> {
        g.sort_all_children(parent);
        g.children(parent).collect()
    }

    #[test]
    fn sort_is_by_z_then_arrival() {
        let mut g = SceneGraph::new();
        let p = g.create_node();
        let zs = [3, -1, 0, 3, -1, 0, 7, 0];
        let kids: Vec<NodeId> = zs
            .iter()
            .map(|&z| {
                let n = g.create_node();
                g.add_child(p, n, Some(z), None).unwrap();
                n
            })
            .collect();
        // Reorder some children several times, ending at their original z.
        for _ in 0..3 {
            g.reorder_child(p, kids[0], 5).unwrap();
            g.reorder_child(p, kids[0], 3).unwrap();
        }
        let order = sorted(&mut g, p);
        for pair in order.windows(2) {
            let a = (g.local_z_order(pair[0]), g.arrival_order(pair[0]));
            let b = (g.local_z_order(pair[1]), g.arrival_order(pair[1]));
            assert!(a < b, "{a:?} must sort before {b:?}");
        }
        // kids[0] was reordered last, so it now follows kids[3].
        let pos0 = order.iter().position(|&n| n == kids[0]).unwrap();
        let pos3 = order.iter().position(|&n| n == kids[3]).unwrap();
        assert!(pos3 < pos0);
    }

    #[test]
    fn equal_z_keeps_insertion_order() {
        let mut g = SceneGraph::new();
        let p = g.create_node();
        let c1 = g.create_node();
        let c2 = g.create_node();
        g.add_child(p, c1, Some(0), None).unwrap();
        g.add_child(p, c2, Some(0), None).unwrap();
        assert_eq!(sorted(&mut g, p), vec![c1, c2]);

        g.set_local_z_order(c1, 0);
        assert_eq!(sorted(&mut g, p), vec![c1, c2], "unchanged z is a no-op");

        g.set_local_z_order(c1, 1);
        g.set_local_z_order(c1, 0);
        assert_eq!(sorted(&mut g, p), vec![c2, c1], "re-entering z=0 arrives later");
    }

    #[test]
    fn add_remove_add_round_trip() {
        let mut g = SceneGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        g.add_child(a, b, None, None).unwrap();
        g.remove_child(a, b, true).unwrap();
        assert_eq!(g.parent(b), None);
        assert!(g.children(a).is_empty());
        g.add_child(a, b, None, None).unwrap();
        assert_eq!(g.parent(b), Some(a));
    }

    #[test]
    fn attach_preconditions_are_checked() {
        let mut g = SceneGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.add_child(a, b, None, None).unwrap();
        g.add_child(b, c, None, None).unwrap();

        assert_eq!(
            g.add_child(c, b, None, None),
            Err(SceneError::AlreadyParented { child: b, parent: a })
        );
        assert_eq!(
            g.add_child(c, a, None, None),
            Err(SceneError::CyclicChild { parent: c, child: a })
        );
        assert_eq!(
            g.add_child(a, a, None, None),
            Err(SceneError::CyclicChild { parent: a, child: a })
        );

        let dead = g.create_node();
        g.destroy_node(dead).unwrap();
        assert_eq!(g.add_child(a, dead, None, None), Err(SceneError::StaleNode(dead)));
    }

    #[test]
    fn child_keys_set_tag_or_name() {
        let mut g = SceneGraph::new();
        let p = g.create_node();
        let t = g.create_node();
        let n = g.create_node();
        g.set_name(t, "old");
        g.add_child(p, t, None, Some(ChildKey::Tag(4))).unwrap();
        g.add_child(p, n, None, Some(ChildKey::Name(String::from("hud"))))
            .unwrap();
        assert_eq!(g.tag(t), 4);
        assert_eq!(g.name(t), "");
        assert_eq!(g.child_by_tag(p, 4), Some(t));
        assert_eq!(g.child_by_name(p, "hud"), Some(n));
        assert_eq!(g.child_by_name(p, "missing"), None);
    }

    #[test]
    fn adding_under_running_parent_enters_subtree() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        g.perform_recursive(root, LifecycleEvent::Enter);
        g.perform_recursive(root, LifecycleEvent::EnterTransitionDidFinish);

        let a = g.create_node();
        let a1 = g.create_node();
        g.add_child(a, a1, None, None).unwrap();
        assert!(!g.is_running(a1));
        g.add_child(root, a, None, None).unwrap();
        assert!(g.is_running(a) && g.is_running(a1));
        assert!(g.is_transition_finished(a1));

        g.remove_child(root, a, false).unwrap();
        assert!(!g.is_running(a) && !g.is_running(a1));
    }

    #[test]
    fn removing_absent_child_is_a_no_op() {
        let mut g = SceneGraph::new();
        let p = g.create_node();
        let q = g.create_node();
        let x = g.create_node();
        g.remove_child(p, x, true).unwrap();
        g.add_child(q, x, None, None).unwrap();
        let other = g.create_node();
        g.add_child(p, other, None, None).unwrap();
        g.remove_child(p, x, true).unwrap();
        assert_eq!(g.parent(x), Some(q));
    }

    #[test]
    fn remove_by_tag_and_all() {
        let mut g = SceneGraph::new();
        let p = g.create_node();
        let kids: Vec<NodeId> = (0..4)
            .map(|i| {
                let n = g.create_node();
                g.add_child(p, n, None, Some(ChildKey::Tag(i))).unwrap();
                n
            })
            .collect();
        let prot = g.create_node();
        g.add_protected_child(p, prot, 0).unwrap();

        g.remove_child_by_tag(p, 2, true).unwrap();
        assert_eq!(g.parent(kids[2]), None);
        assert_eq!(g.children(p).len(), 3);

        g.remove_all_children(p, true).unwrap();
        assert!(g.children(p).is_empty());
        assert!(kids.iter().all(|&k| g.parent(k).is_none()));
        assert_eq!(g.protected_children(p).collect::<Vec<_>>(), vec![prot]);

        g.remove_from_parent(prot, true).unwrap();
        assert!(g.protected_children(p).is_empty());
    }

    #[test]
    fn reorder_of_non_child_is_rejected() {
        let mut g = SceneGraph::new();
        let p = g.create_node();
        let x = g.create_node();
        assert_eq!(
            g.reorder_child(p, x, 1),
            Err(SceneError::NotAChild { parent: p, child: x })
        );
    }

    #[test]
    fn destroy_requires_detached_node_and_frees_subtree() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let a = g.create_node();
        let a1 = g.create_node();
        g.add_child(root, a, None, None).unwrap();
        g.add_child(a, a1, None, None).unwrap();
        assert!(matches!(
            g.destroy_node(a),
            Err(SceneError::AlreadyParented { .. })
        ));

        g.remove_child(root, a, true).unwrap();
        g.destroy_node(a).unwrap();
        assert!(!g.is_alive(a) && !g.is_alive(a1));
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.destroy_node(a), Err(SceneError::StaleNode(a)));
    }
}
