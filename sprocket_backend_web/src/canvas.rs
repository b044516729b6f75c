// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Context2d`] over an HTML canvas.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use kurbo::{Affine, Rect};
use sprocket_core::color::Color;
use sprocket_core::node::TextureId;
use sprocket_render::Context2d;
use wasm_bindgen::JsCast as _;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Failure to set up a [`WebCanvas`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    /// The element refused a `2d` context (e.g. it already has a WebGL one).
    #[error("canvas has no 2d context")]
    NoContext,
}

/// A [`Context2d`] drawing on a `<canvas>` element.
///
/// Textures are `<img>` elements registered with
/// [`register_texture`](Self::register_texture); drawing an unknown or
/// not-yet-decoded texture is skipped.
pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    textures: Vec<Option<HtmlImageElement>>,
    style: String,
}

impl core::fmt::Debug for WebCanvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebCanvas")
            .field("canvas", &"HtmlCanvasElement")
            .field("textures", &self.textures.len())
            .finish_non_exhaustive()
    }
}

impl WebCanvas {
    /// Wraps the `2d` context of `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, CanvasError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(CanvasError::NoContext)?;
        Ok(Self {
            canvas,
            ctx,
            textures: Vec::new(),
            style: String::new(),
        })
    }

    /// Returns the canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Makes `image` drawable under the returned id.
    pub fn register_texture(&mut self, image: HtmlImageElement) -> TextureId {
        if let Some(free) = self.textures.iter().position(Option::is_none) {
            self.textures[free] = Some(image);
            return TextureId(u32::try_from(free).unwrap_or(u32::MAX));
        }
        self.textures.push(Some(image));
        TextureId(u32::try_from(self.textures.len() - 1).unwrap_or(u32::MAX))
    }

    /// Forgets a texture; its id may be handed out again.
    pub fn unregister_texture(&mut self, texture: TextureId) -> Option<HtmlImageElement> {
        self.textures.get_mut(texture.0 as usize)?.take()
    }

    fn set_color(&mut self, color: Color) -> &str {
        self.style.clear();
        _ = write_css_color(&mut self.style, color);
        &self.style
    }
}

/// Writes `color` as a CSS `rgb()` value.
pub(crate) fn write_css_color(out: &mut impl core::fmt::Write, color: Color) -> core::fmt::Result {
    write!(out, "rgb({},{},{})", color.r, color.g, color.b)
}

impl Context2d for WebCanvas {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_transform(&mut self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        _ = self.ctx.set_transform(a, b, c, d, e, f);
    }

    fn clip_rects(&mut self, rects: &[Rect]) {
        self.ctx.begin_path();
        for r in rects {
            self.ctx.rect(r.x0, r.y0, r.width(), r.height());
        }
        self.ctx.clip();
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ctx
            .clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64) {
        let ctx = self.ctx.clone();
        ctx.set_fill_style_str(self.set_color(color));
        ctx.set_global_alpha(alpha);
        ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
        ctx.set_global_alpha(1.0);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        let ctx = self.ctx.clone();
        ctx.set_stroke_style_str(self.set_color(color));
        ctx.set_line_width(line_width);
        ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn draw_texture(&mut self, texture: TextureId, dest: Rect, alpha: f64) {
        let Some(Some(image)) = self.textures.get(texture.0 as usize) else {
            log::warn!("drawing unregistered {texture:?}");
            return;
        };
        if !image.complete() {
            return;
        }
        self.ctx.set_global_alpha(alpha);
        _ = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                dest.x0,
                dest.y0,
                dest.width(),
                dest.height(),
            );
        self.ctx.set_global_alpha(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_colors_are_decimal_rgb() {
        let mut s = String::new();
        write_css_color(&mut s, Color::new(255, 0, 16)).unwrap();
        assert_eq!(s, "rgb(255,0,16)");
    }
}
