// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node attribute groups stored column-wise in the scene graph.

use alloc::string::String;

use kurbo::{Point, Size, Vec2};

use crate::affine::AffineTransform;
use crate::color::Color;

use super::id::{INVALID_TAG, TextureId};

/// What a node draws for its own render command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Content {
    /// Nothing; the node is a pure grouping node and its command is never
    /// queued.
    #[default]
    Empty,
    /// Fills the content rectangle with the displayed color.
    Fill,
    /// Draws a texture stretched over the content rectangle.
    Texture(TextureId),
}

impl Content {
    /// Does this content produce any pixels?
    #[inline]
    #[must_use]
    pub const fn draws(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// The optional identifier passed to
/// [`add_child`](super::SceneGraph::add_child).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildKey {
    /// Sets the child's tag and resets its name to the empty string.
    Tag(i32),
    /// Sets the child's name; the tag is left alone.
    Name(String),
}

/// Identity and ordering data.
#[derive(Clone, Debug)]
pub(crate) struct Identity {
    pub(crate) tag: i32,
    pub(crate) name: String,
    pub(crate) local_z: i32,
    pub(crate) arrival: u64,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            tag: INVALID_TAG,
            name: String::new(),
            local_z: 0,
            arrival: 0,
        }
    }
}

/// Spatial attributes, in parent space and degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spatial {
    /// Position of the anchor point in the parent's space.
    pub position: Point,
    /// Position as a fraction of the parent's content size, if set.
    ///
    /// When present it overrides [`position`](Self::position) at the next
    /// transform recompute.
    pub normalized_position: Option<Vec2>,
    /// Normalized anchor point; `(0, 0)` is the bottom-left corner.
    pub anchor: Point,
    /// Untransformed size of the node's content.
    pub content_size: Size,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Clockwise rotation of the x axis, in degrees.
    pub rotation_x: f64,
    /// Clockwise rotation of the y axis, in degrees.
    pub rotation_y: f64,
    /// Horizontal skew, in degrees.
    pub skew_x: f64,
    /// Vertical skew, in degrees.
    pub skew_y: f64,
    /// Extra transform applied after the node's own.
    pub additional: Option<AffineTransform>,
    /// Treat the node origin rather than the anchor point as its position.
    pub ignore_anchor_for_position: bool,
}

impl Spatial {
    /// Returns the anchor point in content-space points.
    #[inline]
    #[must_use]
    pub fn anchor_in_points(&self) -> Point {
        Point::new(
            self.anchor.x * self.content_size.width,
            self.anchor.y * self.content_size.height,
        )
    }
}

impl Default for Spatial {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            normalized_position: None,
            anchor: Point::ZERO,
            content_size: Size::ZERO,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            additional: None,
            ignore_anchor_for_position: false,
        }
    }
}

/// Visual attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Visual {
    pub(crate) visible: bool,
    pub(crate) color: Color,
    pub(crate) opacity: u8,
    pub(crate) cascade_color: bool,
    pub(crate) cascade_opacity: bool,
    pub(crate) content: Content,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            visible: true,
            color: Color::WHITE,
            opacity: 255,
            cascade_color: false,
            cascade_opacity: false,
            content: Content::Empty,
        }
    }
}

/// Lifecycle and bookkeeping flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct NodeState {
    pub(crate) running: bool,
    pub(crate) transition_finished: bool,
    pub(crate) reorder_dirty: bool,
    pub(crate) protected_reorder_dirty: bool,
    pub(crate) baked: bool,
}
