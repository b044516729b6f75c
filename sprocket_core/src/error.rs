// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by structural scene-graph operations.

use crate::node::NodeId;

/// A rejected structural operation on a [`SceneGraph`](crate::node::SceneGraph).
///
/// Every variant is a precondition violation by the caller: the graph is left
/// unchanged and nothing is retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The handle refers to a destroyed (or never allocated) node.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),
    /// The child already has a parent; remove it first.
    #[error("{child:?} already has parent {parent:?}")]
    AlreadyParented {
        /// The node that was being added.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Adding the child would make a node its own ancestor.
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    CyclicChild {
        /// The would-be parent.
        parent: NodeId,
        /// The would-be child.
        child: NodeId,
    },
    /// The node is not a child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The presumed parent.
        parent: NodeId,
        /// The node that was not found among its children.
        child: NodeId,
    },
    /// An empty or otherwise unusable name or path pattern.
    #[error("invalid name or pattern {0:?}")]
    InvalidName(alloc::string::String),
}

impl SceneError {
    /// Returns `true` for errors of the invalid-argument class.
    ///
    /// All current variants belong to it; the method exists so callers can
    /// match on the class instead of enumerating variants.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::StaleNode(_)
                | Self::AlreadyParented { .. }
                | Self::CyclicChild { .. }
                | Self::NotAChild { .. }
                | Self::InvalidName(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_nodes() {
        let a = NodeId::from_raw(1, 0);
        let b = NodeId::from_raw(2, 3);
        let err = SceneError::AlreadyParented { child: b, parent: a };
        let msg = err.to_string();
        assert!(msg.contains("NodeId(2@gen3)"), "{msg}");
        assert!(msg.contains("NodeId(1@gen0)"), "{msg}");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn invalid_name_keeps_pattern() {
        let err = SceneError::InvalidName("".into());
        assert_eq!(err.to_string(), "invalid name or pattern \"\"");
    }
}
