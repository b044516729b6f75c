// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface a [`CanvasRenderer`](crate::CanvasRenderer) paints on.

use kurbo::{Affine, Rect};
use sprocket_core::color::Color;
use sprocket_core::node::TextureId;

/// An immediate-mode 2D drawing context in canvas space (y-down pixels).
///
/// Modeled on the HTML canvas API: geometry passed to the drawing calls is
/// mapped through the current transform; clearing and clipping honor it too.
pub trait Context2d {
    /// Pushes the current transform and clip.
    fn save(&mut self);

    /// Pops the transform and clip pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// Replaces the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Restricts subsequent drawing to the union of `rects`.
    fn clip_rects(&mut self, rects: &[Rect]);

    /// Makes `rect` fully transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Fills `rect` with `color` at `alpha` (0.0 to 1.0).
    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64);

    /// Strokes the outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);

    /// Draws `texture` stretched over `dest`, top row at `dest.y0`.
    fn draw_texture(&mut self, texture: TextureId, dest: Rect, alpha: f64);

    /// Resets the transform to identity.
    fn reset_transform(&mut self) {
        self.set_transform(Affine::IDENTITY);
    }
}
