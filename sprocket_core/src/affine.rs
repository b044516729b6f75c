// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal 2-D affine transform.
//!
//! [`AffineTransform`] stores the six scalars `(a, b, c, d, tx, ty)` of the
//! matrix
//!
//! ```text
//! | a  c  tx |
//! | b  d  ty |
//! | 0  0  1  |
//! ```
//!
//! Composition reads left to right: [`concat(t, m)`](AffineTransform::concat)
//! yields "`t` followed by `m`", i.e. the matrix product `M · T`. Node-to-world
//! transforms are therefore built as `concat(local, parent_world)`.
//!
//! Points, sizes and rectangles are [`kurbo`] types.

use kurbo::{Affine, Point, Rect};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Determinants with a magnitude below this are treated as singular.
pub const EPSILON: f64 = 1e-12;

/// A 2-D affine transform in `(a, b, c, d, tx, ty)` form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform {
    /// Row 0, column 0.
    pub a: f64,
    /// Row 1, column 0.
    pub b: f64,
    /// Row 0, column 1.
    pub c: f64,
    /// Row 1, column 1.
    pub d: f64,
    /// X translation.
    pub tx: f64,
    /// Y translation.
    pub ty: f64,
}

impl AffineTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    /// Creates a transform from its six components.
    #[inline]
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Creates a counter-clockwise rotation (radians) in a y-up space.
    #[inline]
    #[must_use]
    pub fn rotate(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Returns `self` followed by `then`.
    #[inline]
    #[must_use]
    pub fn concat(self, then: Self) -> Self {
        let (t, m) = (self, then);
        Self {
            a: t.a * m.a + t.b * m.c,
            b: t.a * m.b + t.b * m.d,
            c: t.c * m.a + t.d * m.c,
            d: t.c * m.b + t.d * m.d,
            tx: t.tx * m.a + t.ty * m.c + m.tx,
            ty: t.tx * m.b + t.ty * m.d + m.ty,
        }
    }

    /// Returns the determinant of the linear part.
    #[inline]
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns the inverse, or `None` if the transform is singular.
    #[must_use]
    pub fn try_invert(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: inv * self.d,
            b: -inv * self.b,
            c: -inv * self.c,
            d: inv * self.a,
            tx: inv * (self.c * self.ty - self.d * self.tx),
            ty: inv * (self.b * self.tx - self.a * self.ty),
        })
    }

    /// Returns the inverse, falling back to [`IDENTITY`](Self::IDENTITY) with
    /// a warning when the transform is singular.
    #[must_use]
    pub fn invert(&self) -> Self {
        self.try_invert().unwrap_or_else(|| {
            log::warn!("inverting a degenerate transform {self:?}; using identity");
            Self::IDENTITY
        })
    }

    /// Maps a point through the transform.
    #[inline]
    #[must_use]
    pub fn apply_to_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Maps a rectangle and returns the axis-aligned box around the four
    /// transformed corners.
    #[must_use]
    pub fn apply_to_rect(&self, rect: Rect) -> Rect {
        let p0 = self.apply_to_point(Point::new(rect.x0, rect.y0));
        let p1 = self.apply_to_point(Point::new(rect.x1, rect.y0));
        let p2 = self.apply_to_point(Point::new(rect.x0, rect.y1));
        let p3 = self.apply_to_point(Point::new(rect.x1, rect.y1));
        let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
        let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
        let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
        let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// Is every component [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.tx.is_finite()
            && self.ty.is_finite()
    }

    /// Is this the identity transform?
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for AffineTransform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<AffineTransform> for Affine {
    fn from(t: AffineTransform) -> Self {
        Self::new([t.a, t.b, t.c, t.d, t.tx, t.ty])
    }
}

impl From<Affine> for AffineTransform {
    fn from(affine: Affine) -> Self {
        let [a, b, c, d, tx, ty] = affine.as_coeffs();
        Self { a, b, c, d, tx, ty }
    }
}

/// Returns the smallest rectangle containing both `a` and `b`.
///
/// Zero-area rectangles still contribute their corners.
#[inline]
#[must_use]
pub fn rect_union(a: Rect, b: Rect) -> Rect {
    let a = a.abs();
    let b = b.abs();
    Rect::new(
        a.x0.min(b.x0),
        a.y0.min(b.y0),
        a.x1.max(b.x1),
        a.y1.max(b.y1),
    )
}
