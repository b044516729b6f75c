// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visit walk: sync derived state and collect commands in draw order.

use crate::dirty::DirtyFlags;
use crate::queue::CacheKey;

use super::{NodeId, SceneGraph};

impl SceneGraph {
    /// Visits the subtree rooted at `id`, appending its drawing commands to
    /// the render queue in painter's order.
    ///
    /// For each visible node: record its tree level, sync its derived state
    /// against its parent, sort its children if needed, then visit children
    /// with a negative z-order, protected children with a negative z-order,
    /// the node itself, the remaining children and the remaining protected
    /// children. An invisible node and its subtree are skipped, though the
    /// node keeps the flags it inherited so they are applied once it shows
    /// again.
    ///
    /// A root is visited at level 0; any other node one level below its
    /// parent's last recorded level.
    pub fn visit(&mut self, id: NodeId) {
        self.validate(id);
        let parent = self.parent_slot(id.idx);
        let level = parent.map_or(0, |p| self.commands[p as usize].level + 1);
        self.visit_slot(id.idx, parent, level);
    }

    /// Visits a subtree into the side list of cache `instance` instead of the
    /// frame's command list.
    pub fn visit_to_cache(&mut self, id: NodeId, instance: u32) {
        self.validate(id);
        self.queue.begin_cache(CacheKey::Instance(instance));
        self.visit(id);
        self.queue.end_cache();
    }

    fn visit_slot(&mut self, idx: u32, parent: Option<u32>, level: u32) {
        let i = idx as usize;
        if !self.visual[i].visible {
            self.propagate_flags_down(idx, parent);
            return;
        }
        self.commands[i].level = level;
        self.sync_status(idx, parent);
        self.sort_children(idx);

        let id = self.id_at(idx);
        if self.state[i].baked {
            // The whole subtree goes to the bake's own list, which the
            // renderer replays over the baked command's content.
            self.queue.begin_cache(CacheKey::Baked(id));
            self.visit_children(idx, level, |_| true);
            self.queue.end_cache();
            self.queue.push_render_command(id, &self.commands[i]);
        } else {
            self.visit_children(idx, level, |z| z < 0);
            self.queue.push_render_command(id, &self.commands[i]);
            self.visit_children(idx, level, |z| z >= 0);
        }
        self.commands[i].flags = DirtyFlags::empty();
    }

    /// Visits the children, then the protected children, of `idx` whose
    /// z-order satisfies `pass`.
    fn visit_children(&mut self, idx: u32, level: u32, pass: impl Fn(i32) -> bool) {
        let i = idx as usize;
        for protected in [false, true] {
            let mut k = 0;
            loop {
                let list = if protected {
                    &self.protected[i]
                } else {
                    &self.children[i]
                };
                let Some(&child) = list.get(k) else {
                    break;
                };
                k += 1;
                if pass(self.identity[child as usize].local_z) {
                    self.visit_slot(child, Some(idx), level + 1);
                }
            }
        }
    }
}
