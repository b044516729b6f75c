// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-graph traversal context.
//!
//! [`FrameContext`] holds the state that the scene graph needs across
//! traversals but that does not belong to any one node: the arrival-order
//! counter used to break z-order ties, and a pool of scratch stacks for
//! lifecycle dispatch.
//!
//! Lifecycle callbacks may add or remove nodes, which starts another dispatch
//! while the outer one is still iterating. Each dispatch therefore borrows the
//! stack at its own nesting depth, so nested dispatches never clobber the
//! stack an outer dispatch is walking, and stacks are reused across frames.

use alloc::vec::Vec;

use crate::node::NodeId;

/// Arrival counter and scratch stacks owned by a scene graph.
#[derive(Debug, Default)]
pub struct FrameContext {
    arrival: u64,
    stacks: Vec<Vec<NodeId>>,
    performing: usize,
    pub(crate) scratch: Vec<u32>,
}

impl FrameContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arrival: 0,
            stacks: Vec::new(),
            performing: 0,
            scratch: Vec::new(),
        }
    }

    /// Returns the next arrival order and advances the counter.
    #[inline]
    pub fn next_arrival(&mut self) -> u64 {
        let order = self.arrival;
        self.arrival += 1;
        order
    }

    /// Returns the current nesting depth of lifecycle dispatch.
    #[inline]
    #[must_use]
    pub const fn performing(&self) -> usize {
        self.performing
    }

    /// Borrows the scratch stack for the current nesting depth.
    ///
    /// The returned stack is empty. Hand it back with
    /// [`release_stack`](Self::release_stack).
    pub(crate) fn acquire_stack(&mut self) -> Vec<NodeId> {
        if self.stacks.len() <= self.performing {
            self.stacks.push(Vec::new());
        }
        let mut stack = core::mem::take(&mut self.stacks[self.performing]);
        stack.clear();
        self.performing += 1;
        stack
    }

    /// Returns a stack obtained from [`acquire_stack`](Self::acquire_stack).
    pub(crate) fn release_stack(&mut self, mut stack: Vec<NodeId>) {
        debug_assert!(self.performing > 0, "release without acquire");
        self.performing -= 1;
        stack.clear();
        self.stacks[self.performing] = stack;
    }
}
