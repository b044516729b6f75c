// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer contract for drawing backends.
//!
//! The core never draws. Each frame the
//! [`Director`](crate::director::Director) brings the
//! [`RenderQueue`](crate::queue::RenderQueue) up to date and then hands the
//! graph to a [`Renderer`], which walks
//! [`RenderQueue::commands`](crate::queue::RenderQueue::commands) and paints
//! each one from its cached [`RenderCommand`](crate::command::RenderCommand)
//! state.
//!
//! A renderer owns its region bookkeeping: it reads and resets
//! [`RegionStatus`](crate::command::RegionStatus) on the commands it
//! considers, and releases [`RenderQueue::all_need_draw`] once a full
//! repaint happened.
//!
//! [`RenderQueue::all_need_draw`]: crate::queue::RenderQueue::all_need_draw

use crate::node::SceneGraph;

/// Paints the collected commands of a scene graph.
pub trait Renderer {
    /// Called once per frame before the overlay is visited.
    fn clear(&mut self);

    /// Paints the frame and reports what it did.
    fn rendering(&mut self, graph: &mut SceneGraph) -> RenderStats;
}

/// What a renderer did for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// The whole viewport was repainted.
    pub full_redraw: bool,
    /// Dirty rectangles repainted (0 for a full redraw).
    pub dirty_rects: u32,
    /// Commands actually drawn.
    pub drawn: u32,
    /// Commands in the frame's list.
    pub total: u32,
}

impl RenderStats {
    /// Returns `true` if nothing was painted.
    #[inline]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !self.full_redraw && self.drawn == 0
    }
}
