// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute getters and setters.
//!
//! Getters are plain reads. Setters store the new value and raise the
//! matching dirty flag; nothing derived is recomputed here.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::{Point, Size, Vec2};

use crate::affine::AffineTransform;
use crate::color::Color;
use crate::command::RegionStatus;
use crate::dirty::DirtyFlags;

use super::{Content, NodeBehavior, NodeId, SceneGraph, Spatial};

impl SceneGraph {
    // -- Identity --

    /// Returns the tag of a node ([`INVALID_TAG`](super::INVALID_TAG) if
    /// unset).
    #[must_use]
    pub fn tag(&self, id: NodeId) -> i32 {
        self.validate(id);
        self.identity[id.idx as usize].tag
    }

    /// Sets the tag of a node.
    pub fn set_tag(&mut self, id: NodeId, tag: i32) {
        self.validate(id);
        self.identity[id.idx as usize].tag = tag;
    }

    /// Returns the name of a node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.validate(id);
        &self.identity[id.idx as usize].name
    }

    /// Sets the name of a node.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.validate(id);
        self.identity[id.idx as usize].name = name.into();
    }

    /// Returns the local z-order of a node.
    #[must_use]
    pub fn local_z_order(&self, id: NodeId) -> i32 {
        self.validate(id);
        self.identity[id.idx as usize].local_z
    }

    /// Returns the arrival order used to break z-order ties.
    #[must_use]
    pub fn arrival_order(&self, id: NodeId) -> u64 {
        self.validate(id);
        self.identity[id.idx as usize].arrival
    }

    // -- Spatial --

    /// Returns all spatial attributes of a node.
    #[must_use]
    pub fn spatial(&self, id: NodeId) -> &Spatial {
        self.validate(id);
        &self.spatial[id.idx as usize]
    }

    /// Returns the position of a node in its parent's space.
    ///
    /// With a normalized position set, this is the value resolved at the
    /// last transform recompute.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.validate(id);
        self.spatial[id.idx as usize].position
    }

    /// Sets the position of a node, dropping any normalized position.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.validate(id);
        let s = &mut self.spatial[id.idx as usize];
        s.position = position;
        s.normalized_position = None;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the normalized position of a node, if one is in use.
    #[must_use]
    pub fn normalized_position(&self, id: NodeId) -> Option<Vec2> {
        self.validate(id);
        self.spatial[id.idx as usize].normalized_position
    }

    /// Positions a node as a fraction of its parent's content size.
    pub fn set_normalized_position(&mut self, id: NodeId, fraction: Vec2) {
        self.validate(id);
        self.spatial[id.idx as usize].normalized_position = Some(fraction);
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the normalized anchor point of a node.
    #[must_use]
    pub fn anchor_point(&self, id: NodeId) -> Point {
        self.validate(id);
        self.spatial[id.idx as usize].anchor
    }

    /// Sets the normalized anchor point of a node.
    pub fn set_anchor_point(&mut self, id: NodeId, anchor: Point) {
        self.validate(id);
        let i = id.idx as usize;
        if self.spatial[i].anchor == anchor {
            return;
        }
        self.spatial[i].anchor = anchor;
        self.commands[i].anchor_in_points = self.spatial[i].anchor_in_points();
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the anchor point in content-space points.
    #[must_use]
    pub fn anchor_point_in_points(&self, id: NodeId) -> Point {
        self.validate(id);
        self.commands[id.idx as usize].anchor_in_points
    }

    /// Returns the untransformed content size of a node.
    #[must_use]
    pub fn content_size(&self, id: NodeId) -> Size {
        self.validate(id);
        self.spatial[id.idx as usize].content_size
    }

    /// Sets the untransformed content size of a node.
    pub fn set_content_size(&mut self, id: NodeId, size: Size) {
        self.validate(id);
        let i = id.idx as usize;
        if self.spatial[i].content_size == size {
            return;
        }
        self.spatial[i].content_size = size;
        self.commands[i].anchor_in_points = self.spatial[i].anchor_in_points();
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the `(x, y)` scale factors of a node.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> (f64, f64) {
        self.validate(id);
        let s = &self.spatial[id.idx as usize];
        (s.scale_x, s.scale_y)
    }

    /// Sets both scale factors of a node.
    pub fn set_scale(&mut self, id: NodeId, scale_x: f64, scale_y: f64) {
        self.validate(id);
        let s = &mut self.spatial[id.idx as usize];
        s.scale_x = scale_x;
        s.scale_y = scale_y;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the `(x, y)` rotations of a node, in degrees.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> (f64, f64) {
        self.validate(id);
        let s = &self.spatial[id.idx as usize];
        (s.rotation_x, s.rotation_y)
    }

    /// Rotates a node clockwise by `degrees` around its anchor point.
    pub fn set_rotation(&mut self, id: NodeId, degrees: f64) {
        self.set_rotation_xy(id, degrees, degrees);
    }

    /// Sets independent x and y rotations, in degrees.
    ///
    /// Differing angles produce a skew-like distortion.
    pub fn set_rotation_xy(&mut self, id: NodeId, rotation_x: f64, rotation_y: f64) {
        self.validate(id);
        let s = &mut self.spatial[id.idx as usize];
        s.rotation_x = rotation_x;
        s.rotation_y = rotation_y;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the `(x, y)` skew angles of a node, in degrees.
    #[must_use]
    pub fn skew(&self, id: NodeId) -> (f64, f64) {
        self.validate(id);
        let s = &self.spatial[id.idx as usize];
        (s.skew_x, s.skew_y)
    }

    /// Sets the skew angles of a node, in degrees.
    pub fn set_skew(&mut self, id: NodeId, skew_x: f64, skew_y: f64) {
        self.validate(id);
        let s = &mut self.spatial[id.idx as usize];
        s.skew_x = skew_x;
        s.skew_y = skew_y;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Returns the additional transform of a node.
    #[must_use]
    pub fn additional_transform(&self, id: NodeId) -> Option<AffineTransform> {
        self.validate(id);
        self.spatial[id.idx as usize].additional
    }

    /// Sets (or with `None`, removes) a transform applied after the node's
    /// own.
    pub fn set_additional_transform(&mut self, id: NodeId, transform: Option<AffineTransform>) {
        self.validate(id);
        self.spatial[id.idx as usize].additional = transform;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    /// Does the node treat its origin rather than its anchor as its
    /// position?
    #[must_use]
    pub fn ignore_anchor_for_position(&self, id: NodeId) -> bool {
        self.validate(id);
        self.spatial[id.idx as usize].ignore_anchor_for_position
    }

    /// Sets whether the node's origin rather than its anchor is positioned.
    pub fn set_ignore_anchor_for_position(&mut self, id: NodeId, ignore: bool) {
        self.validate(id);
        let s = &mut self.spatial[id.idx as usize];
        if s.ignore_anchor_for_position == ignore {
            return;
        }
        s.ignore_anchor_for_position = ignore;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
    }

    // -- Visual --

    /// Is the node visible?
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visual[id.idx as usize].visible
    }

    /// Shows or hides a node and its subtree.
    ///
    /// Changes the set of drawn commands, so the draw list is rebuilt.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        if self.visual[id.idx as usize].visible == visible {
            return;
        }
        self.visual[id.idx as usize].visible = visible;
        self.set_dirty_flag(id.idx, DirtyFlags::TRANSFORM);
        self.queue.set_children_order_dirty();
    }

    /// Returns the node's own color.
    #[must_use]
    pub fn color(&self, id: NodeId) -> Color {
        self.validate(id);
        self.visual[id.idx as usize].color
    }

    /// Sets the node's own color.
    pub fn set_color(&mut self, id: NodeId, color: Color) {
        self.validate(id);
        self.visual[id.idx as usize].color = color;
        self.set_dirty_flag(id.idx, DirtyFlags::COLOR);
    }

    /// Returns the node's own opacity.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> u8 {
        self.validate(id);
        self.visual[id.idx as usize].opacity
    }

    /// Sets the node's own opacity.
    pub fn set_opacity(&mut self, id: NodeId, opacity: u8) {
        self.validate(id);
        self.visual[id.idx as usize].opacity = opacity;
        self.set_dirty_flag(id.idx, DirtyFlags::OPACITY);
    }

    /// Returns the cascaded color as of the last flush or visit.
    #[must_use]
    pub fn displayed_color(&self, id: NodeId) -> Color {
        self.validate(id);
        self.commands[id.idx as usize].displayed_color
    }

    /// Returns the cascaded opacity as of the last flush or visit.
    #[must_use]
    pub fn displayed_opacity(&self, id: NodeId) -> u8 {
        self.validate(id);
        self.commands[id.idx as usize].displayed_opacity
    }

    /// Does the node's color modulate its descendants?
    #[must_use]
    pub fn is_cascade_color_enabled(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visual[id.idx as usize].cascade_color
    }

    /// Enables or disables color cascading into descendants.
    ///
    /// Disabling it resets descendants to their own colors at the next flush
    /// or visit.
    pub fn set_cascade_color_enabled(&mut self, id: NodeId, enabled: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.visual[i].cascade_color == enabled {
            return;
        }
        self.visual[i].cascade_color = enabled;
        self.commands[i].cascade_color_disabled = !enabled;
        self.set_dirty_flag(id.idx, DirtyFlags::COLOR);
    }

    /// Does the node's opacity modulate its descendants?
    #[must_use]
    pub fn is_cascade_opacity_enabled(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visual[id.idx as usize].cascade_opacity
    }

    /// Enables or disables opacity cascading into descendants.
    ///
    /// Disabling it resets descendants to their own opacities at the next
    /// flush or visit.
    pub fn set_cascade_opacity_enabled(&mut self, id: NodeId, enabled: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.visual[i].cascade_opacity == enabled {
            return;
        }
        self.visual[i].cascade_opacity = enabled;
        self.commands[i].cascade_opacity_disabled = !enabled;
        self.set_dirty_flag(id.idx, DirtyFlags::OPACITY);
    }

    /// Returns what the node draws.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Content {
        self.validate(id);
        self.visual[id.idx as usize].content
    }

    /// Sets what the node draws.
    ///
    /// Switching between drawing and not drawing changes the draw list, so
    /// it is rebuilt at the next frame.
    pub fn set_content(&mut self, id: NodeId, content: Content) {
        self.validate(id);
        let i = id.idx as usize;
        self.visual[i].content = content;
        let draws = content.draws() || self.state[i].baked;
        if self.commands[i].needs_draw != draws {
            self.commands[i].needs_draw = draws;
            self.queue.set_children_order_dirty();
        }
        self.commands[i].notify_region_status(RegionStatus::Dirty);
        self.set_dirty_flag(id.idx, DirtyFlags::TEXTURE);
    }

    // -- Lifecycle state --

    /// Is the node part of the running scene (between enter and exit)?
    #[must_use]
    pub fn is_running(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].running
    }

    /// Has the node's enter transition finished?
    #[must_use]
    pub fn is_transition_finished(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].transition_finished
    }

    /// Attaches a behavior, replacing any previous one.
    pub fn set_behavior(&mut self, id: NodeId, behavior: Box<dyn NodeBehavior>) {
        self.validate(id);
        self.behaviors[id.idx as usize] = Some(behavior);
    }

    /// Detaches and returns the node's behavior.
    ///
    /// Returns `None` while the behavior is receiving a callback.
    pub fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn NodeBehavior>> {
        self.validate(id);
        self.behaviors[id.idx as usize].take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_raise_matching_flags() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.set_position(n, Point::new(1.0, 2.0));
        assert!(g.command(n).flags().contains(DirtyFlags::TRANSFORM));
        g.set_color(n, Color::BLACK);
        g.set_opacity(n, 10);
        let flags = g.command(n).flags();
        assert!(flags.contains(DirtyFlags::COLOR | DirtyFlags::OPACITY));
        // All raised on one command: queued only once.
        assert_eq!(g.queue().pool_len(), 1);
    }

    #[test]
    fn anchor_in_points_tracks_size_and_anchor() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.set_content_size(n, Size::new(40.0, 20.0));
        g.set_anchor_point(n, Point::new(0.5, 0.25));
        assert_eq!(g.anchor_point_in_points(n), Point::new(20.0, 5.0));
    }

    #[test]
    fn set_position_drops_normalized() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.set_normalized_position(n, Vec2::new(0.5, 0.5));
        g.set_position(n, Point::new(3.0, 4.0));
        assert_eq!(g.normalized_position(n), None);
    }

    #[test]
    fn drawing_content_changes_draw_list() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.queue_mut().clear_children_order_dirty();
        g.set_content(n, Content::Fill);
        assert!(g.command(n).needs_draw());
        assert!(g.queue().children_order_dirty());
    }

    #[test]
    fn visibility_change_rebuilds_draw_list() {
        let mut g = SceneGraph::new();
        let n = g.create_node();
        g.queue_mut().clear_children_order_dirty();
        g.set_visible(n, true);
        assert!(!g.queue().children_order_dirty(), "unchanged visibility");
        g.set_visible(n, false);
        assert!(g.queue().children_order_dirty());
    }
}
