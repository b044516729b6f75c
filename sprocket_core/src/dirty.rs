// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-command dirty flags.
//!
//! Every [`RenderCommand`](crate::command::RenderCommand) carries a
//! [`DirtyFlags`] bitmask instead of an explicit state enum: transform, color,
//! opacity and order staleness are independent and routinely combine.
//!
//! # Propagation semantics
//!
//! Flags differ in whether they flow from a parent to its children during the
//! visit walk and the pool flush:
//!
//! - **Always inherited**: [`TRANSFORM`](DirtyFlags::TRANSFORM). A child's
//!   world transform is derived from its parent's, so a stale parent makes
//!   every descendant stale.
//!
//! - **Inherited through cascade**: [`COLOR`](DirtyFlags::COLOR) and
//!   [`OPACITY`](DirtyFlags::OPACITY) only reach a child when the *parent*
//!   has the corresponding cascade flag enabled.
//!
//! - **Local**: [`ORDER`](DirtyFlags::ORDER) is consumed by the flush
//!   without propagation. [`CACHE`](DirtyFlags::CACHE) and
//!   [`TEXTURE`](DirtyFlags::TEXTURE) belong to the canvas backend: `CACHE`
//!   is raised on a baked ancestor when anything beneath it changes.
//!
//! # Consumption
//!
//! The first flag raised on a clean command pushes it into the render queue's
//! dirty pool. [`SceneGraph::flush_transforms`](crate::node::SceneGraph::flush_transforms)
//! consumes the pool once per frame; a visit consumes the flags of every
//! command it reaches.

use bitflags::bitflags;

bitflags! {
    /// Independent staleness bits of a render command.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u16 {
        /// Local and world transforms are stale.
        const TRANSFORM = 1 << 0;
        /// Displayed color must be recomputed.
        const COLOR     = 1 << 1;
        /// Displayed opacity must be recomputed.
        const OPACITY   = 1 << 2;
        /// Sibling order changed upstream.
        const ORDER     = 1 << 3;
        /// A baked subtree must be re-rendered into its cache.
        const CACHE     = 1 << 4;
        /// Drawable content changed.
        const TEXTURE   = 1 << 5;
    }
}

impl DirtyFlags {
    /// Flags that color/opacity cascading may carry down the tree.
    pub const CASCADE: Self = Self::COLOR.union(Self::OPACITY);

    /// Returns the flags a child inherits from a parent with `parent` flags.
    ///
    /// `cascade_color` and `cascade_opacity` are the *parent's* cascade
    /// settings.
    #[inline]
    #[must_use]
    pub const fn inherited(parent: Self, cascade_color: bool, cascade_opacity: bool) -> Self {
        let mut out = Self::empty();
        if cascade_color && parent.contains(Self::COLOR) {
            out = out.union(Self::COLOR);
        }
        if cascade_opacity && parent.contains(Self::OPACITY) {
            out = out.union(Self::OPACITY);
        }
        if parent.contains(Self::TRANSFORM) {
            out = out.union(Self::TRANSFORM);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_always_inherited() {
        let got = DirtyFlags::inherited(DirtyFlags::TRANSFORM, false, false);
        assert_eq!(got, DirtyFlags::TRANSFORM);
    }

    #[test]
    fn color_needs_parent_cascade() {
        let parent = DirtyFlags::COLOR | DirtyFlags::OPACITY;
        assert_eq!(DirtyFlags::inherited(parent, false, false), DirtyFlags::empty());
        assert_eq!(DirtyFlags::inherited(parent, true, false), DirtyFlags::COLOR);
        assert_eq!(DirtyFlags::inherited(parent, false, true), DirtyFlags::OPACITY);
    }

    #[test]
    fn local_flags_stay_local() {
        let parent = DirtyFlags::ORDER | DirtyFlags::CACHE | DirtyFlags::TEXTURE;
        assert!(DirtyFlags::inherited(parent, true, true).is_empty());
    }
}
