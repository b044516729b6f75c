// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Context2d`] that records instead of drawing.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};
use sprocket_core::color::Color;
use sprocket_core::node::TextureId;

use crate::context::Context2d;

/// One recorded call.
///
/// Drawing calls capture the transform that was current when they were made.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// [`Context2d::save`].
    Save,
    /// [`Context2d::restore`].
    Restore,
    /// [`Context2d::clip_rects`].
    Clip(Vec<Rect>),
    /// [`Context2d::clear_rect`].
    Clear {
        /// Cleared rectangle.
        rect: Rect,
        /// Transform in effect.
        transform: Affine,
    },
    /// [`Context2d::fill_rect`].
    Fill {
        /// Filled rectangle.
        rect: Rect,
        /// Transform in effect.
        transform: Affine,
        /// Fill color.
        color: Color,
        /// Fill alpha.
        alpha: f64,
    },
    /// [`Context2d::stroke_rect`].
    Stroke {
        /// Stroked rectangle.
        rect: Rect,
        /// Stroke color.
        color: Color,
    },
    /// [`Context2d::draw_texture`].
    Texture {
        /// Texture handle.
        texture: TextureId,
        /// Destination rectangle.
        dest: Rect,
        /// Transform in effect.
        transform: Affine,
        /// Draw alpha.
        alpha: f64,
    },
}

/// Records every call for later inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
    ops: Vec<DrawOp>,
    transform: Affine,
    saved: Vec<Affine>,
}

impl RecordingContext {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded calls in order.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Removes and returns the recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        core::mem::take(&mut self.ops)
    }

    /// Returns the recorded fills and texture draws, in order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. } | DrawOp::Texture { .. }))
    }

    /// Returns the rectangles passed to the last clip, if any.
    #[must_use]
    pub fn last_clip(&self) -> Option<&[Rect]> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Clip(rects) => Some(rects.as_slice()),
            _ => None,
        })
    }
}

impl Context2d for RecordingContext {
    fn save(&mut self) {
        self.saved.push(self.transform);
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
        self.ops.push(DrawOp::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn clip_rects(&mut self, rects: &[Rect]) {
        self.ops.push(DrawOp::Clip(rects.to_vec()));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Clear {
            rect,
            transform: self.transform,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64) {
        self.ops.push(DrawOp::Fill {
            rect,
            transform: self.transform,
            color,
            alpha,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, _line_width: f64) {
        self.ops.push(DrawOp::Stroke { rect, color });
    }

    fn draw_texture(&mut self, texture: TextureId, dest: Rect, alpha: f64) {
        self.ops.push(DrawOp::Texture {
            texture,
            dest,
            transform: self.transform,
            alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_pops_the_transform() {
        let mut ctx = RecordingContext::new();
        ctx.set_transform(Affine::translate((5.0, 0.0)));
        ctx.save();
        ctx.reset_transform();
        ctx.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE, 1.0);
        ctx.restore();
        ctx.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK, 0.5);

        let transforms: Vec<Affine> = ctx
            .draws()
            .map(|op| match op {
                DrawOp::Fill { transform, .. } => *transform,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(transforms, [Affine::IDENTITY, Affine::translate((5.0, 0.0))]);
    }

    #[test]
    fn last_clip_finds_the_latest() {
        let mut ctx = RecordingContext::new();
        assert!(ctx.last_clip().is_none());
        ctx.clip_rects(&[Rect::new(0.0, 0.0, 1.0, 1.0)]);
        ctx.clip_rects(&[Rect::new(2.0, 2.0, 3.0, 3.0)]);
        assert_eq!(ctx.last_clip(), Some(&[Rect::new(2.0, 2.0, 3.0, 3.0)][..]));
        assert_eq!(ctx.take_ops().len(), 2);
        assert!(ctx.ops().is_empty());
    }
}
