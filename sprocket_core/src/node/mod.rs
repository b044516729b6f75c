// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A *node* is an element of the scene tree. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//!   Nodes also carry a numeric tag, a name, a local z-order and an arrival
//!   order used to break z-order ties.
//! - Topology: a parent link plus two ordered child lists, the public
//!   children and the *protected* children (internal sub-nodes that the
//!   child API does not manage).
//! - **Attributes** set by the caller: spatial ([`Spatial`]), visual (color,
//!   opacity, cascade flags, visibility, [`Content`]) and an optional
//!   [`NodeBehavior`] that receives lifecycle, update and timer callbacks.
//! - A [`RenderCommand`] caching the derived state: local and world
//!   transforms, displayed color and opacity, and screen-region bookkeeping.
//!
//! Nodes are stored column-wise in a [`SceneGraph`] with index-based handles.
//!
//! # Laziness
//!
//! Setters never recompute derived state. They raise [`DirtyFlags`] on the
//! node's command, and the first flag raised on a clean command queues it in
//! the render queue's dirty pool. Derived state is brought up to date either
//! by [`SceneGraph::flush_transforms`] (parents before children) or by a
//! [`visit`](SceneGraph::visit), which also rebuilds the draw list in z-order.
//!
//! Child reordering is just as lazy: structural changes set the owner's
//! reorder flag and the queue's children-order flag, and the sort happens
//! right before the next visit.
//!
//! [`DirtyFlags`]: crate::dirty::DirtyFlags

mod attrs;
mod enumerate;
mod id;
mod lifecycle;
mod props;
mod query;
mod status;
mod tree;
mod visit;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::action::ActionManager;
use crate::command::RenderCommand;
use crate::event::EventDispatcher;
use crate::frame::FrameContext;
use crate::queue::RenderQueue;
use crate::scheduler::Scheduler;

pub use attrs::{ChildKey, Content, Spatial};
pub use id::{INVALID, INVALID_TAG, NodeId, TextureId};
pub use lifecycle::{LifecycleEvent, NodeBehavior};
pub use tree::Children;

pub(crate) use attrs::{Identity, NodeState, Visual};

/// Column-wise storage for every node, plus the collaborators that node
/// operations drive.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access: property accessors
/// panic on a stale handle, structural operations return
/// [`SceneError::StaleNode`](crate::error::SceneError::StaleNode).
pub struct SceneGraph {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) protected: Vec<Vec<u32>>,

    // -- Attributes (set by callers) --
    pub(crate) identity: Vec<Identity>,
    pub(crate) spatial: Vec<Spatial>,
    pub(crate) visual: Vec<Visual>,
    pub(crate) state: Vec<NodeState>,
    pub(crate) behaviors: Vec<Option<Box<dyn NodeBehavior>>>,

    // -- Derived state (written by flush and visit) --
    pub(crate) commands: Vec<RenderCommand>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Collaborators --
    pub(crate) queue: RenderQueue,
    pub(crate) frame: FrameContext,
    pub(crate) scheduler: Scheduler,
    pub(crate) actions: ActionManager,
    pub(crate) events: EventDispatcher,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("queue", &self.queue)
            .field("scheduler", &self.scheduler)
            .field("actions", &self.actions)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            protected: Vec::new(),
            identity: Vec::new(),
            spatial: Vec::new(),
            visual: Vec::new(),
            state: Vec::new(),
            behaviors: Vec::new(),
            commands: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            queue: RenderQueue::new(),
            frame: FrameContext::new(),
            scheduler: Scheduler::new(),
            actions: ActionManager::new(),
            events: EventDispatcher::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts at the origin with a zero anchor and size, unit
    /// scale, white opaque color, visible, not running, with no content and
    /// no behavior.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.protected[i].clear();
            self.identity[i] = Identity::default();
            self.spatial[i] = Spatial::default();
            self.visual[i] = Visual::default();
            self.state[i] = NodeState::default();
            self.behaviors[i] = None;
            self.commands[i] = RenderCommand::new();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.protected.push(Vec::new());
            self.identity.push(Identity::default());
            self.spatial.push(Spatial::default());
            self.visual.push(Visual::default());
            self.state.push(NodeState::default());
            self.behaviors.push(None);
            self.commands.push(RenderCommand::new());
            self.generation.push(0);
            idx
        };
        self.identity[idx as usize].arrival = self.frame.next_arrival();
        self.id_at(idx)
    }

    /// Creates a node with a behavior attached.
    pub fn create_node_with(&mut self, behavior: impl NodeBehavior + 'static) -> NodeId {
        let id = self.create_node();
        self.behaviors[id.idx as usize] = Some(Box::new(behavior));
        id
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Collaborators --

    /// Returns the render queue.
    #[inline]
    #[must_use]
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    /// Returns the render queue for mutation (used by renderers).
    #[inline]
    pub fn queue_mut(&mut self) -> &mut RenderQueue {
        &mut self.queue
    }

    /// Returns the scheduler.
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns the scheduler for mutation.
    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Returns the action manager.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &ActionManager {
        &self.actions
    }

    /// Returns the event dispatcher.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Returns the event dispatcher for mutation.
    #[inline]
    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    /// Returns the traversal context.
    #[inline]
    #[must_use]
    pub fn frame_context(&self) -> &FrameContext {
        &self.frame
    }

    // -- Render command access --

    /// Returns the render command of a node.
    #[must_use]
    pub fn command(&self, id: NodeId) -> &RenderCommand {
        self.validate(id);
        &self.commands[id.idx as usize]
    }

    /// Returns the render command of a node for mutation (used by renderers
    /// to reset region state).
    pub fn command_mut(&mut self, id: NodeId) -> &mut RenderCommand {
        self.validate(id);
        &mut self.commands[id.idx as usize]
    }

    // -- Internal helpers --

    /// Returns the live handle of slot `idx`.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId::from_raw(idx, self.generation[idx as usize])
    }

    /// Returns the parent slot of `idx`, if any.
    #[inline]
    pub(crate) fn parent_slot(&self, idx: u32) -> Option<u32> {
        let p = self.parent[idx as usize];
        (p != INVALID).then_some(p)
    }

    /// Panics if the handle is stale.
    #[track_caller]
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Appends every slot of the subtree rooted at `idx` (children and
    /// protected children, breadth first) to `out`, starting with `idx`.
    pub(crate) fn collect_subtree(&self, idx: u32, out: &mut Vec<u32>) {
        let start = out.len();
        out.push(idx);
        let mut cursor = start;
        while cursor < out.len() {
            let cur = out[cursor] as usize;
            out.extend_from_slice(&self.children[cur]);
            out.extend_from_slice(&self.protected[cur]);
            cursor += 1;
        }
    }
}
