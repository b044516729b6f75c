// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node render command state.
//!
//! A [`RenderCommand`] is the cached, backend-facing half of a node: its local
//! and world transforms, displayed (cascaded) color and opacity, tree depth,
//! and the screen-region bookkeeping the canvas renderer uses to limit
//! repaints. It is owned 1:1 by its node and only mutated by the
//! [`SceneGraph`](crate::node::SceneGraph) during setters, the pool flush and
//! the visit walk.
//!
//! [`local_transform`] is the pure node-to-parent computation shared by the
//! cached path and the on-demand transform queries.

use kurbo::{Point, Rect};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::affine::{AffineTransform, rect_union};
use crate::color::Color;
use crate::dirty::DirtyFlags;
use crate::node::Spatial;

/// Stand-in for an infinite skew tangent (skew angle of exactly 90°).
pub const MAX_SKEW_TANGENT: f64 = 99_999_999.0;

/// How much of a command's screen footprint must be repainted.
///
/// Ordered: a status is only ever raised within a frame, then reset to
/// [`NotDirty`](Self::NotDirty) by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionStatus {
    /// Nothing changed since the last rendered frame.
    #[default]
    NotDirty,
    /// Paint changed in place: repaint the current region.
    Dirty,
    /// The command moved: repaint both the old and the current region.
    DirtyDouble,
}

/// Screen-space footprint of a command, in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Region {
    /// Bounds as of the latest transform.
    pub current: Rect,
    /// Bounds as of the last rendered frame (possibly widened by moves that
    /// happened without an intervening render).
    pub old: Rect,
    /// Repaint status.
    pub status: RegionStatus,
}

/// Cached transform and paint state of one node.
#[derive(Clone, Debug)]
pub struct RenderCommand {
    pub(crate) flags: DirtyFlags,
    pub(crate) local: AffineTransform,
    pub(crate) world: AffineTransform,
    pub(crate) displayed_color: Color,
    pub(crate) displayed_opacity: u8,
    pub(crate) cascade_color_disabled: bool,
    pub(crate) cascade_opacity_disabled: bool,
    pub(crate) anchor_in_points: Point,
    pub(crate) level: u32,
    pub(crate) region: Region,
    pub(crate) needs_draw: bool,
    pub(crate) can_use_dirty_region: bool,
    pub(crate) cached_parent: Option<u32>,
    pub(crate) in_pool: bool,
}

impl Default for RenderCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderCommand {
    /// Creates the command of a freshly constructed node.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flags: DirtyFlags::empty(),
            local: AffineTransform::IDENTITY,
            world: AffineTransform::IDENTITY,
            displayed_color: Color::WHITE,
            displayed_opacity: 255,
            cascade_color_disabled: false,
            cascade_opacity_disabled: false,
            anchor_in_points: Point::ZERO,
            level: 0,
            region: Region {
                current: Rect::ZERO,
                old: Rect::ZERO,
                status: RegionStatus::NotDirty,
            },
            needs_draw: false,
            can_use_dirty_region: true,
            cached_parent: None,
            in_pool: false,
        }
    }

    /// Returns the pending dirty flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> DirtyFlags {
        self.flags
    }

    /// Returns the cached node-to-parent transform.
    #[inline]
    #[must_use]
    pub const fn local_transform(&self) -> AffineTransform {
        self.local
    }

    /// Returns the cached node-to-world transform.
    ///
    /// Only valid when neither this command nor its parent's has
    /// [`DirtyFlags::TRANSFORM`] set.
    #[inline]
    #[must_use]
    pub const fn world_transform(&self) -> AffineTransform {
        self.world
    }

    /// Returns the cascaded color.
    #[inline]
    #[must_use]
    pub const fn displayed_color(&self) -> Color {
        self.displayed_color
    }

    /// Returns the cascaded opacity.
    #[inline]
    #[must_use]
    pub const fn displayed_opacity(&self) -> u8 {
        self.displayed_opacity
    }

    /// Returns the tree depth recorded by the last visit.
    #[inline]
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns the region bookkeeping.
    #[inline]
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Does this command produce any pixels?
    #[inline]
    #[must_use]
    pub const fn needs_draw(&self) -> bool {
        self.needs_draw
    }

    /// Can this command report a trustworthy screen region?
    #[inline]
    #[must_use]
    pub const fn can_use_dirty_region(&self) -> bool {
        self.can_use_dirty_region
    }

    /// Raises the region status to at least `status`.
    ///
    /// Commands that draw nothing never become dirty.
    #[inline]
    pub fn notify_region_status(&mut self, status: RegionStatus) {
        if self.needs_draw && self.region.status < status {
            self.region.status = status;
        }
    }

    /// Resets the region status once the renderer has accounted for it.
    #[inline]
    pub fn clear_region_status(&mut self) {
        self.region.status = RegionStatus::NotDirty;
    }

    /// Stores freshly computed transforms and updates the screen region.
    pub(crate) fn store_transforms(
        &mut self,
        local: AffineTransform,
        world: AffineTransform,
        content: Rect,
    ) {
        self.local = local;
        self.world = world;
        self.update_current_region(content);
        self.notify_region_status(RegionStatus::DirtyDouble);
    }

    fn update_current_region(&mut self, content: Rect) {
        let region = &mut self.region;
        core::mem::swap(&mut region.current, &mut region.old);
        // Moved more than once since the last render: keep the earliest
        // footprint so it is still invalidated.
        if region.status == RegionStatus::DirtyDouble && region.current.area() > 0.0 {
            region.old = rect_union(region.old, region.current);
        }
        region.current = self.world.apply_to_rect(content);
    }
}

/// Computes the node-to-parent transform of `spatial`.
///
/// `position` must already reflect any normalized position. The result
/// includes the anchor correction and, if present, the additional transform.
#[must_use]
pub fn local_transform(spatial: &Spatial, position: Point) -> AffineTransform {
    let (sx, sy) = (spatial.scale_x, spatial.scale_y);
    let app = spatial.anchor_in_points();
    let has_rotation = spatial.rotation_x != 0.0 || spatial.rotation_y != 0.0;
    let has_skew = spatial.skew_x != 0.0 || spatial.skew_y != 0.0;

    let mut t = if has_rotation || has_skew {
        let (mut a, mut b, mut c, mut d) = (1.0, 0.0, 0.0, 1.0);
        if has_rotation {
            let rx = spatial.rotation_x.to_radians();
            c = rx.sin();
            d = rx.cos();
            if spatial.rotation_y == spatial.rotation_x {
                a = d;
                b = -c;
            } else {
                let ry = spatial.rotation_y.to_radians();
                a = ry.cos();
                b = -ry.sin();
            }
        }
        a *= sx;
        b *= sx;
        c *= sy;
        d *= sy;
        let mut t = AffineTransform::new(a, b, c, d, position.x, position.y);
        if has_skew {
            let skx = clamp_tangent(spatial.skew_x.to_radians().tan());
            let sky = clamp_tangent(spatial.skew_y.to_radians().tan());
            t.a = a + c * sky;
            t.b = b + d * sky;
            t.c = c + a * skx;
            t.d = d + b * skx;
        }
        t
    } else {
        AffineTransform::new(sx, 0.0, 0.0, sy, position.x, position.y)
    };

    if app.x != 0.0 || app.y != 0.0 {
        t.tx -= t.a * app.x + t.c * app.y;
        t.ty -= t.b * app.x + t.d * app.y;
        if spatial.ignore_anchor_for_position {
            t.tx += app.x;
            t.ty += app.y;
        }
    }

    match spatial.additional {
        Some(extra) => t.concat(extra),
        None => t,
    }
}

fn clamp_tangent(tan: f64) -> f64 {
    if tan == f64::INFINITY {
        MAX_SKEW_TANGENT
    } else {
        tan
    }
}
