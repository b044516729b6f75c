// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer state shared by every backend.
//!
//! [`RenderQueue`] holds what the visit walk produces and the renderer
//! consumes: the ordered command list, the pool of commands awaiting a status
//! flush, and the flags that decide between a full and a partial repaint.
//!
//! The command list persists across frames. It is only rebuilt when
//! [`children_order_dirty`](RenderQueue::children_order_dirty) is set; on
//! other frames the renderer replays the previous list against refreshed
//! transforms.
//!
//! # Cache mode
//!
//! While a cache instance is active (see
//! [`SceneGraph::visit_to_cache`](crate::node::SceneGraph::visit_to_cache)),
//! pushed commands go to that instance's side list instead. Instances nest.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::command::RenderCommand;
use crate::node::NodeId;

/// Key of a side list of cached commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKey {
    /// A caller-chosen render-to-texture instance.
    Instance(u32),
    /// The subtree of a baked node.
    Baked(NodeId),
}

/// Per-frame command collection and repaint flags.
#[derive(Debug)]
pub struct RenderQueue {
    commands: Vec<NodeId>,
    scene_len: usize,
    pool: Vec<NodeId>,
    children_order_dirty: bool,
    all_need_draw: bool,
    can_use_dirty_region: bool,
    cache_lists: BTreeMap<CacheKey, Vec<NodeId>>,
    cache_stack: Vec<CacheKey>,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueue {
    /// Creates an empty queue that will rebuild its list on the first frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            scene_len: 0,
            pool: Vec::new(),
            children_order_dirty: true,
            all_need_draw: true,
            can_use_dirty_region: true,
            cache_lists: BTreeMap::new(),
            cache_stack: Vec::new(),
        }
    }

    // -- Command list --

    /// Appends a command to the active list.
    ///
    /// Commands that draw nothing are skipped. A command that cannot report a
    /// region disables dirty-region repainting until the list is cleared.
    pub fn push_render_command(&mut self, id: NodeId, cmd: &RenderCommand) {
        if !cmd.needs_draw() {
            return;
        }
        if let Some(key) = self.cache_stack.last() {
            let list = self.cache_lists.entry(*key).or_default();
            if !list.contains(&id) {
                list.push(id);
            }
            return;
        }
        if !cmd.can_use_dirty_region() {
            self.can_use_dirty_region = false;
        }
        self.commands.push(id);
    }

    /// Drops every collected command and forces a full repaint.
    pub fn clear_render_commands(&mut self) {
        self.commands.clear();
        self.scene_len = 0;
        self.cache_stack.clear();
        self.all_need_draw = true;
        self.can_use_dirty_region = true;
    }

    /// Returns the commands collected for the current frame, in draw order.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[NodeId] {
        &self.commands
    }

    /// Marks the end of the scene's commands.
    ///
    /// Overlay commands pushed after this point are discarded by
    /// [`begin_overlay`](Self::begin_overlay) on the next frame, so a
    /// per-frame overlay visit does not accumulate.
    pub fn seal_scene(&mut self) {
        self.scene_len = self.commands.len();
    }

    /// Drops the overlay commands pushed during the previous frame.
    pub fn begin_overlay(&mut self) {
        self.commands.truncate(self.scene_len);
    }

    // -- Dirty pool --

    /// Queues a command for the next status flush.
    #[inline]
    pub fn push_dirty_node(&mut self, id: NodeId) {
        self.pool.push(id);
    }

    /// Are any commands waiting for a status flush?
    #[inline]
    #[must_use]
    pub fn transform_dirty(&self) -> bool {
        !self.pool.is_empty()
    }

    /// Returns the number of pooled commands.
    #[inline]
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub(crate) fn take_pool(&mut self) -> Vec<NodeId> {
        core::mem::take(&mut self.pool)
    }

    pub(crate) fn restore_pool(&mut self, mut pool: Vec<NodeId>) {
        pool.clear();
        // Anything pushed while the pool was out stays queued.
        pool.append(&mut self.pool);
        self.pool = pool;
    }

    // -- Flags --

    /// Must the command list be rebuilt by a full visit?
    #[inline]
    #[must_use]
    pub const fn children_order_dirty(&self) -> bool {
        self.children_order_dirty
    }

    /// Requests a rebuild of the command list on the next frame.
    #[inline]
    pub fn set_children_order_dirty(&mut self) {
        self.children_order_dirty = true;
    }

    pub(crate) fn clear_children_order_dirty(&mut self) {
        self.children_order_dirty = false;
    }

    /// Must the next frame repaint everything?
    #[inline]
    #[must_use]
    pub const fn all_need_draw(&self) -> bool {
        self.all_need_draw
    }

    /// Forces (or, after a render, releases) a full repaint.
    #[inline]
    pub fn set_all_need_draw(&mut self, all: bool) {
        self.all_need_draw = all;
    }

    /// Can every collected command report a screen region?
    #[inline]
    #[must_use]
    pub const fn can_use_dirty_region(&self) -> bool {
        self.can_use_dirty_region
    }

    // -- Cache mode --

    /// Redirects pushes into a fresh side list for `key`.
    pub fn begin_cache(&mut self, key: CacheKey) {
        self.cache_lists.entry(key).or_default().clear();
        self.cache_stack.push(key);
    }

    /// Stops redirecting into the innermost side list.
    ///
    /// The list stays available until taken or replaced.
    pub fn end_cache(&mut self) {
        self.cache_stack.pop();
    }

    /// Is any cache instance active?
    #[inline]
    #[must_use]
    pub fn is_caching(&self) -> bool {
        !self.cache_stack.is_empty()
    }

    /// Returns the side list for `key`, if one was recorded.
    #[must_use]
    pub fn cache_list(&self, key: CacheKey) -> Option<&[NodeId]> {
        self.cache_lists.get(&key).map(Vec::as_slice)
    }

    /// Removes and returns the side list for `key`.
    pub fn take_cache(&mut self, key: CacheKey) -> Vec<NodeId> {
        self.cache_lists.remove(&key).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing() -> RenderCommand {
        let mut cmd = RenderCommand::new();
        cmd.needs_draw = true;
        cmd
    }

    #[test]
    fn non_drawing_commands_are_skipped() {
        let mut q = RenderQueue::new();
        q.push_render_command(NodeId::from_raw(0, 0), &RenderCommand::new());
        assert!(q.commands().is_empty());
    }

    #[test]
    fn opt_out_command_disables_regions_until_clear() {
        let mut q = RenderQueue::new();
        let mut cmd = drawing();
        cmd.can_use_dirty_region = false;
        q.push_render_command(NodeId::from_raw(0, 0), &cmd);
        assert!(!q.can_use_dirty_region());
        q.set_all_need_draw(false);
        q.clear_render_commands();
        assert!(q.can_use_dirty_region());
        assert!(q.all_need_draw());
    }

    #[test]
    fn overlay_does_not_accumulate() {
        let mut q = RenderQueue::new();
        let cmd = drawing();
        q.push_render_command(NodeId::from_raw(0, 0), &cmd);
        q.seal_scene();
        for _ in 0..3 {
            q.begin_overlay();
            q.push_render_command(NodeId::from_raw(9, 0), &cmd);
        }
        assert_eq!(q.commands().len(), 2);
    }

    #[test]
    fn cache_mode_redirects_and_nests() {
        let mut q = RenderQueue::new();
        let cmd = drawing();
        let (a, b, c) = (
            NodeId::from_raw(1, 0),
            NodeId::from_raw(2, 0),
            NodeId::from_raw(3, 0),
        );
        q.begin_cache(CacheKey::Instance(1));
        q.push_render_command(a, &cmd);
        q.begin_cache(CacheKey::Instance(2));
        q.push_render_command(b, &cmd);
        q.end_cache();
        q.push_render_command(a, &cmd);
        q.end_cache();
        q.push_render_command(c, &cmd);

        assert_eq!(q.commands(), &[c]);
        assert_eq!(q.cache_list(CacheKey::Instance(1)), Some(&[a][..]));
        assert_eq!(q.take_cache(CacheKey::Instance(2)), alloc::vec![b]);
        assert!(q.cache_list(CacheKey::Instance(2)).is_none());
    }

    #[test]
    fn pool_pushes_during_flush_survive() {
        let mut q = RenderQueue::new();
        q.push_dirty_node(NodeId::from_raw(1, 0));
        let pool = q.take_pool();
        assert!(!q.transform_dirty());
        q.push_dirty_node(NodeId::from_raw(2, 0));
        q.restore_pool(pool);
        assert_eq!(q.pool_len(), 1);
    }
}
