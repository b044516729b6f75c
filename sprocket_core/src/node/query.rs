// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! On-demand transform and bounds queries.
//!
//! These compute from the spatial attributes directly, so they are correct
//! between frames regardless of pending dirty flags, and never touch the
//! cached state.

use kurbo::{Point, Rect, Vec2};

use crate::affine::{AffineTransform, rect_union};
use crate::command::local_transform;

use super::{NodeId, SceneGraph};

impl SceneGraph {
    /// Returns the transform from node space to parent space.
    #[must_use]
    pub fn node_to_parent_transform(&self, id: NodeId) -> AffineTransform {
        self.validate(id);
        self.local_of(id.idx)
    }

    /// Returns the transform from parent space to node space.
    ///
    /// A degenerate node transform yields the identity (and a warning).
    #[must_use]
    pub fn parent_to_node_transform(&self, id: NodeId) -> AffineTransform {
        self.node_to_parent_transform(id).invert()
    }

    /// Returns the transform from node space to world space.
    #[must_use]
    pub fn node_to_world_transform(&self, id: NodeId) -> AffineTransform {
        self.validate(id);
        let mut t = self.local_of(id.idx);
        let mut cur = self.parent_slot(id.idx);
        while let Some(p) = cur {
            t = t.concat(self.local_of(p));
            cur = self.parent_slot(p);
        }
        t
    }

    /// Returns the transform from world space to node space.
    #[must_use]
    pub fn world_to_node_transform(&self, id: NodeId) -> AffineTransform {
        self.node_to_world_transform(id).invert()
    }

    /// Maps a world-space point into node space.
    #[must_use]
    pub fn convert_to_node_space(&self, id: NodeId, world: Point) -> Point {
        self.world_to_node_transform(id).apply_to_point(world)
    }

    /// Maps a node-space point into world space.
    #[must_use]
    pub fn convert_to_world_space(&self, id: NodeId, local: Point) -> Point {
        self.node_to_world_transform(id).apply_to_point(local)
    }

    /// Maps a world-space point into node space, relative to the anchor.
    #[must_use]
    pub fn convert_to_node_space_ar(&self, id: NodeId, world: Point) -> Point {
        self.validate(id);
        let anchor = self.spatial[id.idx as usize].anchor_in_points();
        self.convert_to_node_space(id, world) - anchor.to_vec2()
    }

    /// Maps an anchor-relative node-space point into world space.
    #[must_use]
    pub fn convert_to_world_space_ar(&self, id: NodeId, local: Point) -> Point {
        self.validate(id);
        let anchor: Vec2 = self.spatial[id.idx as usize].anchor_in_points().to_vec2();
        self.convert_to_world_space(id, local + anchor)
    }

    /// Returns the content rectangle mapped into parent space.
    #[must_use]
    pub fn bounding_box(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.local_of(id.idx).apply_to_rect(self.content_rect(id.idx))
    }

    /// Returns the world-space bounds of a node and its visible children,
    /// recursively.
    #[must_use]
    pub fn bounding_box_to_world(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.bounds_under(id.idx, self.parent_world(id.idx))
    }

    fn bounds_under(&self, idx: u32, parent_world: AffineTransform) -> Rect {
        let world = self.local_of(idx).concat(parent_world);
        let mut bounds = world.apply_to_rect(self.content_rect(idx));
        for &child in &self.children[idx as usize] {
            if self.visual[child as usize].visible {
                bounds = rect_union(bounds, self.bounds_under(child, world));
            }
        }
        bounds
    }

    fn parent_world(&self, idx: u32) -> AffineTransform {
        match self.parent_slot(idx) {
            Some(p) => self.node_to_world_transform(self.id_at(p)),
            None => AffineTransform::IDENTITY,
        }
    }

    fn content_rect(&self, idx: u32) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.spatial[idx as usize].content_size)
    }

    /// Node-to-parent transform of a slot, resolving a normalized position
    /// against the parent's current size.
    fn local_of(&self, idx: u32) -> AffineTransform {
        let spatial = &self.spatial[idx as usize];
        let position = match (spatial.normalized_position, self.parent_slot(idx)) {
            (Some(fraction), Some(p)) => {
                let size = self.spatial[p as usize].content_size;
                Point::new(fraction.x * size.width, fraction.y * size.height)
            }
            _ => spatial.position,
        };
        local_transform(spatial, position)
    }
}
