// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived-state maintenance: dirty flags, transforms and cascades.
//!
//! Two paths bring a command up to date:
//!
//! - **Flush** ([`SceneGraph::flush_transforms`]): the dirty pool is sorted by
//!   tree level and each command's status is updated permanently. A
//!   transform change recomputes the whole subtree; a color or opacity change
//!   cascades into descendants whose parents cascade that channel.
//! - **Sync** (during [`visit`](SceneGraph::visit)): each command first
//!   inherits its parent's flags, then recomputes what they name. Flags stay
//!   set until the end of the node's visit so that its children inherit them
//!   in turn.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::color::{Color, cascade_channel};
use crate::command::{RegionStatus, local_transform};
use crate::dirty::DirtyFlags;

use super::{NodeId, SceneGraph};

impl SceneGraph {
    // -- Dirty flags --

    /// Raises `flags` on the command of slot `idx`.
    ///
    /// A command that is not already queued joins the dirty pool. Under a
    /// baked ancestor, the ancestor's cache is invalidated as well.
    pub(crate) fn set_dirty_flag(&mut self, idx: u32, flags: DirtyFlags) {
        if flags.is_empty() {
            return;
        }
        let i = idx as usize;
        if !self.commands[i].in_pool {
            self.commands[i].in_pool = true;
            self.queue.push_dirty_node(self.id_at(idx));
        }
        self.commands[i].flags |= flags;
        if let Some(baked) = self.commands[i].cached_parent
            && baked != idx
        {
            let b = baked as usize;
            self.commands[b].flags |= DirtyFlags::CACHE;
            self.commands[b].notify_region_status(RegionStatus::Dirty);
        }
    }

    /// Raises `flags` on a node's command.
    pub fn mark_dirty(&mut self, id: NodeId, flags: DirtyFlags) {
        self.validate(id);
        self.set_dirty_flag(id.idx, flags);
    }

    /// Drops the dirty pool after a full visit has refreshed every visible
    /// command.
    pub(crate) fn reset_dirty_pool(&mut self) {
        let pool = self.queue.take_pool();
        for id in &pool {
            if self.is_alive(*id) {
                self.commands[id.idx as usize].in_pool = false;
            }
        }
        self.queue.restore_pool(pool);
    }

    // -- Flush --

    /// Updates every pooled command, ancestors first, and empties the pool.
    ///
    /// Stale handles left in the pool by destroyed nodes are skipped.
    pub fn flush_transforms(&mut self) {
        if !self.queue.transform_dirty() {
            return;
        }
        let mut pool = self.queue.take_pool();
        pool.retain(|id| self.is_alive(*id));
        // Stable: equal levels keep their marking order.
        pool.sort_by_key(|id| self.commands[id.idx as usize].level);
        for id in &pool {
            self.commands[id.idx as usize].in_pool = false;
        }
        for id in &pool {
            self.update_status(id.idx);
        }
        self.queue.restore_pool(pool);
    }

    /// Permanently consumes the flags of one command.
    pub(crate) fn update_status(&mut self, idx: u32) {
        let flags = self.commands[idx as usize].flags;
        if flags.contains(DirtyFlags::COLOR) {
            self.update_display_color(idx);
        }
        if flags.contains(DirtyFlags::OPACITY) {
            self.update_display_opacity(idx);
        }
        if flags.contains(DirtyFlags::TRANSFORM) {
            self.transform(idx, true);
        }
        self.commands[idx as usize].flags &= DirtyFlags::CACHE;
    }

    /// Recomputes displayed colors from `idx` down, as far as cascading
    /// reaches.
    fn update_display_color(&mut self, idx: u32) {
        let mut stack: Vec<(u32, Color)> = Vec::new();
        stack.push((idx, self.inherited_color(idx)));
        while let Some((cur, parent_color)) = stack.pop() {
            let i = cur as usize;
            let real = self.visual[i].color;
            let cmd = &mut self.commands[i];
            cmd.notify_region_status(RegionStatus::Dirty);
            cmd.flags.remove(DirtyFlags::COLOR);
            let pass_down = if cmd.cascade_color_disabled && !self.visual[i].cascade_color {
                cmd.cascade_color_disabled = false;
                cmd.displayed_color = real;
                Some(Color::WHITE)
            } else {
                cmd.displayed_color = real.cascade(parent_color);
                self.visual[i]
                    .cascade_color
                    .then_some(cmd.displayed_color)
            };
            if let Some(color) = pass_down {
                for &child in self.children[i].iter().chain(&self.protected[i]) {
                    stack.push((child, color));
                }
            }
        }
    }

    /// Recomputes displayed opacities from `idx` down, as far as cascading
    /// reaches.
    fn update_display_opacity(&mut self, idx: u32) {
        let mut stack: Vec<(u32, u8)> = Vec::new();
        stack.push((idx, self.inherited_opacity(idx)));
        while let Some((cur, parent_opacity)) = stack.pop() {
            let i = cur as usize;
            let real = self.visual[i].opacity;
            let cmd = &mut self.commands[i];
            cmd.notify_region_status(RegionStatus::Dirty);
            cmd.flags.remove(DirtyFlags::OPACITY);
            let pass_down = if cmd.cascade_opacity_disabled && !self.visual[i].cascade_opacity {
                cmd.cascade_opacity_disabled = false;
                cmd.displayed_opacity = real;
                Some(255)
            } else {
                cmd.displayed_opacity = cascade_channel(real, parent_opacity);
                self.visual[i]
                    .cascade_opacity
                    .then_some(cmd.displayed_opacity)
            };
            if let Some(opacity) = pass_down {
                for &child in self.children[i].iter().chain(&self.protected[i]) {
                    stack.push((child, opacity));
                }
            }
        }
    }

    /// Returns the displayed color of the parent if it cascades, else white.
    fn inherited_color(&self, idx: u32) -> Color {
        match self.parent_slot(idx) {
            Some(p) if self.visual[p as usize].cascade_color => {
                self.commands[p as usize].displayed_color
            }
            _ => Color::WHITE,
        }
    }

    /// Returns the displayed opacity of the parent if it cascades, else 255.
    fn inherited_opacity(&self, idx: u32) -> u8 {
        match self.parent_slot(idx) {
            Some(p) if self.visual[p as usize].cascade_opacity => {
                self.commands[p as usize].displayed_opacity
            }
            _ => 255,
        }
    }

    // -- Sync (visit path) --

    /// Merges the flags a child inherits from `parent` into slot `idx`.
    pub(crate) fn propagate_flags_down(&mut self, idx: u32, parent: Option<u32>) {
        if let Some(p) = parent {
            let pv = self.visual[p as usize];
            let inherited = DirtyFlags::inherited(
                self.commands[p as usize].flags,
                pv.cascade_color,
                pv.cascade_opacity,
            );
            self.commands[idx as usize].flags |= inherited;
        }
    }

    /// Brings slot `idx` up to date against `parent` without consuming the
    /// flags its children still need.
    pub(crate) fn sync_status(&mut self, idx: u32, parent: Option<u32>) {
        self.propagate_flags_down(idx, parent);
        let i = idx as usize;
        let flags = self.commands[i].flags;
        let color_dirty = flags.contains(DirtyFlags::COLOR);
        let opacity_dirty = flags.contains(DirtyFlags::OPACITY);
        if color_dirty {
            let parent_color = self.inherited_color(idx);
            self.commands[i].displayed_color = self.visual[i].color.cascade(parent_color);
        }
        if opacity_dirty {
            let parent_opacity = self.inherited_opacity(idx);
            self.commands[i].displayed_opacity =
                cascade_channel(self.visual[i].opacity, parent_opacity);
        }
        if color_dirty || opacity_dirty {
            self.commands[i].notify_region_status(RegionStatus::Dirty);
        }
        // Children of a node that stopped cascading fall back to their own
        // real values when the walk reaches them.
        let mut reset = DirtyFlags::empty();
        if color_dirty && core::mem::take(&mut self.commands[i].cascade_color_disabled) {
            reset |= DirtyFlags::COLOR;
        }
        if opacity_dirty && core::mem::take(&mut self.commands[i].cascade_opacity_disabled) {
            reset |= DirtyFlags::OPACITY;
        }
        if !reset.is_empty() {
            for k in 0..self.children[i].len() {
                let child = self.children[i][k];
                self.commands[child as usize].flags |= reset;
            }
            for k in 0..self.protected[i].len() {
                let child = self.protected[i][k];
                self.commands[child as usize].flags |= reset;
            }
        }
        if flags.contains(DirtyFlags::TRANSFORM) {
            self.transform(idx, false);
        }
        self.commands[i].flags.remove(DirtyFlags::ORDER);
    }

    // -- Transforms --

    /// Recomputes the local and world transforms of slot `idx` from its
    /// parent's cached world transform; with `recursive`, then the whole
    /// subtree, children and protected children alike.
    pub(crate) fn transform(&mut self, idx: u32, recursive: bool) {
        self.transform_one(idx);
        if !recursive {
            return;
        }
        let mut stack = core::mem::take(&mut self.frame.scratch);
        stack.clear();
        stack.extend_from_slice(&self.children[idx as usize]);
        stack.extend_from_slice(&self.protected[idx as usize]);
        while let Some(cur) = stack.pop() {
            self.transform_one(cur);
            stack.extend_from_slice(&self.children[cur as usize]);
            stack.extend_from_slice(&self.protected[cur as usize]);
        }
        self.frame.scratch = stack;
    }

    fn transform_one(&mut self, idx: u32) {
        let i = idx as usize;
        let parent = self.parent_slot(idx);
        if let (Some(fraction), Some(p)) = (self.spatial[i].normalized_position, parent) {
            let size = self.spatial[p as usize].content_size;
            self.spatial[i].position =
                Point::new(fraction.x * size.width, fraction.y * size.height);
        }
        let spatial = &self.spatial[i];
        let local = local_transform(spatial, spatial.position);
        let world = match parent {
            Some(p) => local.concat(self.commands[p as usize].world),
            None => local,
        };
        let content = Rect::from_origin_size(Point::ZERO, spatial.content_size);
        self.commands[i].store_transforms(local, world, content);
    }

    // -- Baking --

    /// Marks a node's subtree as cached under it.
    ///
    /// Changes anywhere below a baked node invalidate its cache
    /// ([`DirtyFlags::CACHE`]). A baked node is always queued for drawing;
    /// the renderer replays its cached subtree in its place.
    pub fn bake(&mut self, id: NodeId) {
        self.validate(id);
        let i = id.idx as usize;
        if self.state[i].baked {
            return;
        }
        self.state[i].baked = true;
        self.commands[i].needs_draw = true;
        self.commands[i].can_use_dirty_region = false;
        self.set_cached_parent(id.idx, Some(id.idx));
        self.set_dirty_flag(id.idx, DirtyFlags::CACHE);
        self.queue.set_children_order_dirty();
    }

    /// Reverts [`bake`](Self::bake).
    pub fn unbake(&mut self, id: NodeId) {
        self.validate(id);
        let i = id.idx as usize;
        if !self.state[i].baked {
            return;
        }
        self.state[i].baked = false;
        self.commands[i].needs_draw = self.visual[i].content.draws();
        self.commands[i].can_use_dirty_region = true;
        self.commands[i].flags.remove(DirtyFlags::CACHE);
        // Restore the nearest enclosing bake, if any.
        let outer = self
            .parent_slot(id.idx)
            .and_then(|p| self.commands[p as usize].cached_parent);
        self.set_cached_parent(id.idx, outer);
        self.queue.set_children_order_dirty();
    }

    /// Is the node baked?
    #[must_use]
    pub fn is_baked(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].baked
    }

    /// Points the subtree of `idx` at `baked`, stopping at nested bakes.
    pub(crate) fn set_cached_parent(&mut self, idx: u32, baked: Option<u32>) {
        let mut stack = core::mem::take(&mut self.frame.scratch);
        stack.clear();
        stack.push(idx);
        while let Some(cur) = stack.pop() {
            let i = cur as usize;
            if cur != idx && self.state[i].baked {
                continue;
            }
            self.commands[i].cached_parent = baked;
            stack.extend_from_slice(&self.children[i]);
            stack.extend_from_slice(&self.protected[i]);
        }
        self.frame.scratch = stack;
    }

    /// Clears cached-ancestor links in a subtree that is leaving its parent.
    pub(crate) fn detach_from_parent(&mut self, idx: u32) {
        let own = self.state[idx as usize].baked.then_some(idx);
        self.set_cached_parent(idx, own);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    fn graph_with_chain() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut g = SceneGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.add_child(a, b, None, None).unwrap();
        g.add_child(b, c, None, None).unwrap();
        g.flush_transforms();
        (g, a, b, c)
    }

    #[test]
    fn empty_pool_flush_is_a_no_op() {
        let mut g = SceneGraph::new();
        g.flush_transforms();
        assert!(!g.queue().transform_dirty());
    }

    #[test]
    fn flush_recomputes_descendant_world_transforms() {
        let (mut g, a, b, c) = graph_with_chain();
        g.set_position(b, Point::new(1.0, 0.0));
        g.set_position(c, Point::new(0.0, 1.0));
        g.flush_transforms();
        g.set_position(a, Point::new(10.0, 10.0));
        g.flush_transforms();
        let world = g.command(c).world_transform();
        assert_eq!((world.tx, world.ty), (11.0, 11.0));
        assert!(!g.queue().transform_dirty());
        assert!(g.command(a).flags().is_empty());
    }

    #[test]
    fn flush_orders_parents_first() {
        let (mut g, a, b, c) = graph_with_chain();
        // Levels come from the last visit or from attachment.
        g.set_position(c, Point::new(0.0, 1.0));
        g.set_position(a, Point::new(5.0, 0.0));
        assert!(g.command(a).level() < g.command(c).level());
        g.flush_transforms();
        let world = g.command(c).world_transform();
        assert_eq!((world.tx, world.ty), (5.0, 1.0));
        let _ = b;
    }

    #[test]
    fn opacity_cascades_through_flush() {
        let (mut g, a, b, c) = graph_with_chain();
        g.set_cascade_opacity_enabled(a, true);
        g.set_cascade_opacity_enabled(b, true);
        g.set_opacity(a, 128);
        g.flush_transforms();
        assert_eq!(g.displayed_opacity(a), 128);
        assert_eq!(g.displayed_opacity(b), 128);
        assert_eq!(g.displayed_opacity(c), 128);
    }

    #[test]
    fn cascade_stops_at_non_cascading_parent() {
        let (mut g, a, b, c) = graph_with_chain();
        g.set_cascade_color_enabled(a, true);
        g.set_color(a, Color::new(100, 100, 100));
        g.flush_transforms();
        assert_eq!(g.displayed_color(b), Color::new(100, 100, 100));
        assert_eq!(g.displayed_color(c), Color::WHITE);
    }

    #[test]
    fn disabling_cascade_restores_real_values() {
        let (mut g, a, b, _c) = graph_with_chain();
        g.set_cascade_opacity_enabled(a, true);
        g.set_opacity(a, 100);
        g.set_opacity(b, 200);
        g.flush_transforms();
        assert_eq!(g.displayed_opacity(b), cascade_channel(200, 100));

        g.set_cascade_opacity_enabled(a, false);
        g.flush_transforms();
        assert_eq!(g.displayed_opacity(a), 100);
        assert_eq!(g.displayed_opacity(b), 200);
    }

    #[test]
    fn disabling_cascade_restores_real_values_on_visit() {
        let (mut g, a, b, c) = graph_with_chain();
        g.set_cascade_opacity_enabled(a, true);
        g.set_cascade_color_enabled(a, true);
        g.set_opacity(a, 100);
        g.set_color(a, Color::new(90, 60, 30));
        g.visit(a);
        assert_eq!(g.displayed_opacity(b), 100);
        assert_eq!(g.displayed_color(b), Color::new(90, 60, 30));

        g.set_cascade_opacity_enabled(a, false);
        g.set_cascade_color_enabled(a, false);
        g.visit(a);
        assert_eq!(g.displayed_opacity(a), 100);
        assert_eq!(g.displayed_opacity(b), 255);
        assert_eq!(g.displayed_color(b), Color::WHITE);
        assert_eq!(g.displayed_opacity(c), 255);
        assert!(g.command(b).flags().is_empty());
    }

    #[test]
    fn repeated_recompute_does_not_drift() {
        let (mut g, a, b, _c) = graph_with_chain();
        g.set_cascade_color_enabled(a, true);
        g.set_color(a, Color::new(200, 150, 99));
        g.set_color(b, Color::new(37, 255, 128));
        g.flush_transforms();
        let first = g.displayed_color(b);
        g.mark_dirty(b, DirtyFlags::COLOR);
        g.flush_transforms();
        assert_eq!(g.displayed_color(b), first);
    }

    #[test]
    fn normalized_position_resolves_against_parent_size() {
        let (mut g, a, b, _c) = graph_with_chain();
        g.set_content_size(a, Size::new(200.0, 100.0));
        g.set_normalized_position(b, kurbo::Vec2::new(0.5, 0.25));
        g.flush_transforms();
        assert_eq!(g.position(b), Point::new(100.0, 25.0));
    }

    #[test]
    fn changes_under_bake_invalidate_cache() {
        let (mut g, a, b, c) = graph_with_chain();
        g.bake(a);
        g.command_mut(a).flags.remove(DirtyFlags::CACHE);
        g.set_position(c, Point::new(3.0, 3.0));
        assert!(g.command(a).flags().contains(DirtyFlags::CACHE));
        assert_eq!(g.command(b).cached_parent, Some(a.idx));

        g.unbake(a);
        assert_eq!(g.command(c).cached_parent, None);
    }

    #[test]
    fn removal_clears_cached_parent() {
        let (mut g, a, b, c) = graph_with_chain();
        g.bake(a);
        g.remove_child(a, b, true).unwrap();
        assert_eq!(g.command(b).cached_parent, None);
        assert_eq!(g.command(c).cached_parent, None);
    }
}
