// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas renderer.
//!
//! Each frame, [`CanvasRenderer::rendering`] picks one of two strategies:
//!
//! - **Full redraw** when the queue demands it (a rebuilt command list, or a
//!   command that cannot report its region), when dirty regions are
//!   disabled, or when more commands changed than the configured threshold.
//! - **Partial repaint** otherwise: the current footprint of every changed
//!   command (and, for a moved one, its previous footprint too) is merged
//!   into a [`DirtyRegion`]; the context is clipped to those rectangles and
//!   only commands overlapping them are replayed.
//!
//! Either way every considered command's region status is reset, and the
//! queue's full-redraw request is released.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size};
use sprocket_core::backend::{RenderStats, Renderer};
use sprocket_core::color::Color;
use sprocket_core::command::RegionStatus;
use sprocket_core::node::{Content, NodeId, SceneGraph};
use sprocket_core::queue::CacheKey;

use crate::context::Context2d;
use crate::region::DirtyRegion;

/// Dirty commands tolerated per frame before falling back to a full redraw.
pub const DEFAULT_DIRTY_THRESHOLD: usize = 10;

/// Configuration for a [`CanvasRenderer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasConfig {
    /// Visible world area, anchored at the world origin.
    pub view_size: Size,
    /// Canvas pixels per world unit.
    pub scale: f64,
    /// Background painted after clearing, unless pure white.
    pub clear_color: Color,
    /// Repaint only changed rectangles when possible.
    pub dirty_regions: bool,
    /// Largest number of changed commands handled by a partial repaint.
    pub dirty_threshold: usize,
    /// Outline every repainted rectangle.
    pub debug_regions: bool,
}

impl CanvasConfig {
    /// Full redraw every frame on a black background.
    #[must_use]
    pub const fn default_config(view_size: Size) -> Self {
        Self {
            view_size,
            scale: 1.0,
            clear_color: Color::BLACK,
            dirty_regions: false,
            dirty_threshold: DEFAULT_DIRTY_THRESHOLD,
            debug_regions: false,
        }
    }

    /// Partial repaints with the default threshold.
    #[must_use]
    pub const fn dirty_regions(view_size: Size) -> Self {
        Self {
            dirty_regions: true,
            ..Self::default_config(view_size)
        }
    }

    /// Returns the canvas size in pixels.
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        Size::new(
            self.view_size.width * self.scale,
            self.view_size.height * self.scale,
        )
    }

    /// Returns the world-to-canvas mapping: scale, then flip y.
    #[must_use]
    pub fn view_transform(&self) -> Affine {
        let s = self.scale;
        Affine::new([s, 0.0, 0.0, -s, 0.0, self.view_size.height * s])
    }
}

/// A [`Renderer`] that replays render commands on a [`Context2d`].
#[derive(Debug)]
pub struct CanvasRenderer<C> {
    ctx: C,
    config: CanvasConfig,
    view: Affine,
    region: DirtyRegion,
    scratch: Vec<NodeId>,
    canvas_rects: Vec<Rect>,
}

impl<C: Context2d> CanvasRenderer<C> {
    /// Creates a renderer painting on `ctx`.
    #[must_use]
    pub fn new(ctx: C, config: CanvasConfig) -> Self {
        let viewport = Rect::from_origin_size(Point::ZERO, config.view_size);
        Self {
            ctx,
            config,
            view: config.view_transform(),
            region: DirtyRegion::with_viewport(viewport),
            scratch: Vec::new(),
            canvas_rects: Vec::new(),
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Replaces the configuration. The next frame is fully redrawn.
    pub fn set_config(&mut self, graph: &mut SceneGraph, config: CanvasConfig) {
        self.config = config;
        self.view = config.view_transform();
        self.region
            .set_viewport(Some(Rect::from_origin_size(Point::ZERO, config.view_size)));
        graph.queue_mut().set_all_need_draw(true);
    }

    /// Returns the drawing context.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Returns the drawing context for mutation.
    #[inline]
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Consumes the renderer and returns its context.
    pub fn into_context(self) -> C {
        self.ctx
    }

    /// Returns the dirty rectangles of the frame being rendered.
    #[must_use]
    pub fn dirty_region(&self) -> &DirtyRegion {
        &self.region
    }

    /// Replays the cache list recorded by
    /// [`visit_to_cache`](SceneGraph::visit_to_cache) for `instance` onto
    /// `target`, and drops the list. Returns the number of commands drawn.
    pub fn render_to_cache<D: Context2d>(
        &self,
        target: &mut D,
        graph: &mut SceneGraph,
        instance: u32,
    ) -> u32 {
        let list = graph.queue_mut().take_cache(CacheKey::Instance(instance));
        let mut drawn = 0;
        for &id in &list {
            if graph.is_alive(id) && draw_command(target, self.view, graph, id) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Accumulates the regions of changed commands. Returns `false` once
    /// more commands changed than the threshold allows.
    fn collect_dirty_regions(&mut self, graph: &mut SceneGraph) -> bool {
        let mut dirty = 0;
        let mut overflow = false;
        for &id in &self.scratch {
            let cmd = graph.command_mut(id);
            let region = *cmd.region();
            if region.status == RegionStatus::NotDirty {
                continue;
            }
            cmd.clear_region_status();
            dirty += 1;
            if dirty > self.config.dirty_threshold {
                overflow = true;
            }
            if overflow {
                continue;
            }
            self.region.add(region.current);
            if region.status == RegionStatus::DirtyDouble {
                self.region.add(region.old);
            }
        }
        if overflow {
            log::trace!(
                "{dirty} dirty commands exceed the threshold of {}; redrawing everything",
                self.config.dirty_threshold
            );
        }
        !overflow
    }

    fn clear_background(&mut self, canvas: Rect) {
        self.ctx.clear_rect(canvas);
        if !self.config.clear_color.is_white() {
            self.ctx.fill_rect(canvas, self.config.clear_color, 1.0);
        }
    }
}

impl<C: Context2d> Renderer for CanvasRenderer<C> {
    fn clear(&mut self) {
        self.region.clear();
    }

    fn rendering(&mut self, graph: &mut SceneGraph) -> RenderStats {
        self.scratch.clear();
        self.scratch.extend_from_slice(graph.queue().commands());
        self.region.clear();

        let mut full_redraw = graph.queue().all_need_draw()
            || !self.config.dirty_regions
            || !graph.queue().can_use_dirty_region();
        if full_redraw {
            for &id in &self.scratch {
                graph.command_mut(id).clear_region_status();
            }
        } else {
            full_redraw = !self.collect_dirty_regions(graph);
        }

        let total = u32::try_from(self.scratch.len()).unwrap_or(u32::MAX);
        if !full_redraw && self.region.is_empty() {
            graph.queue_mut().set_all_need_draw(false);
            return RenderStats {
                total,
                ..RenderStats::default()
            };
        }

        let canvas = Rect::from_origin_size(Point::ZERO, self.config.canvas_size());
        self.canvas_rects.clear();
        if !full_redraw {
            let view = self.view;
            self.canvas_rects.extend(
                self.region
                    .rects()
                    .iter()
                    .map(|r| view.transform_rect_bbox(*r).expand()),
            );
        }

        self.ctx.save();
        self.ctx.reset_transform();
        if full_redraw {
            self.clear_background(canvas);
        } else {
            self.ctx.clip_rects(&self.canvas_rects);
            for i in 0..self.canvas_rects.len() {
                let rect = self.canvas_rects[i];
                self.clear_background(rect);
            }
        }

        let mut drawn = 0;
        for &id in &self.scratch {
            let current = graph.command(id).region().current;
            let visible =
                full_redraw || current.area() <= 0.0 || self.region.intersects(current);
            if visible && draw_command(&mut self.ctx, self.view, graph, id) {
                drawn += 1;
            }
        }
        self.ctx.restore();

        if self.config.debug_regions && !full_redraw {
            self.ctx.reset_transform();
            for rect in &self.canvas_rects {
                self.ctx.stroke_rect(*rect, Color::new(255, 0, 0), 1.0);
            }
        }

        let dirty_rects = if full_redraw {
            0
        } else {
            u32::try_from(self.region.len()).unwrap_or(u32::MAX)
        };
        self.region.clear();
        graph.queue_mut().set_all_need_draw(false);
        RenderStats {
            full_redraw,
            dirty_rects,
            drawn,
            total,
        }
    }
}

/// Draws one command; a baked command also replays its cached subtree above
/// its own content. Returns `false` if nothing was painted.
fn draw_command<C: Context2d>(ctx: &mut C, view: Affine, graph: &SceneGraph, id: NodeId) -> bool {
    let cmd = graph.command(id);
    let alpha = f64::from(cmd.displayed_opacity()) / 255.0;
    let size = graph.content_size(id);
    let world = view * Affine::from(cmd.world_transform());
    let mut painted = false;
    if alpha > 0.0 {
        match graph.content(id) {
            Content::Empty => {}
            Content::Fill => {
                ctx.set_transform(world);
                ctx.fill_rect(
                    Rect::from_origin_size(Point::ZERO, size),
                    cmd.displayed_color(),
                    alpha,
                );
                painted = true;
            }
            Content::Texture(texture) => {
                // Images are stored top row first; flip them back upright.
                let flip = Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, size.height]);
                ctx.set_transform(world * flip);
                ctx.draw_texture(texture, Rect::from_origin_size(Point::ZERO, size), alpha);
                painted = true;
            }
        }
    }
    if graph.is_baked(id)
        && let Some(list) = graph.queue().cache_list(CacheKey::Baked(id))
    {
        for &child in list {
            if graph.is_alive(child) {
                painted |= draw_command(ctx, view, graph, child);
            }
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use sprocket_core::node::TextureId;

    use super::*;
    use crate::recording::{DrawOp, RecordingContext};

    const EPS: f64 = 1e-9;

    fn sprite(g: &mut SceneGraph, root: NodeId, x: f64) -> NodeId {
        let n = g.create_node();
        g.set_content(n, Content::Fill);
        g.set_content_size(n, Size::new(10.0, 10.0));
        g.set_position(n, Point::new(x, 0.0));
        g.add_child(root, n, None, None).unwrap();
        n
    }

    /// Rebuilds the command list the way the director does.
    fn collect(g: &mut SceneGraph, root: NodeId) {
        g.queue_mut().clear_render_commands();
        g.visit(root);
        g.queue_mut().seal_scene();
    }

    fn renderer(config: CanvasConfig) -> CanvasRenderer<RecordingContext> {
        CanvasRenderer::new(RecordingContext::new(), config)
    }

    fn fills(r: &CanvasRenderer<RecordingContext>) -> usize {
        r.context().draws().count()
    }

    #[test]
    fn first_frame_is_a_full_redraw() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        sprite(&mut g, root, 0.0);
        collect(&mut g, root);

        let mut r = renderer(CanvasConfig::dirty_regions(Size::new(2000.0, 100.0)));
        let stats = r.rendering(&mut g);
        assert!(stats.full_redraw);
        assert_eq!((stats.drawn, stats.total), (1, 1));
        assert!(!g.queue().all_need_draw());
    }

    #[test]
    fn one_move_repaints_one_rect() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let a = sprite(&mut g, root, 0.0);
        sprite(&mut g, root, 100.0);
        collect(&mut g, root);
        let config = CanvasConfig {
            clear_color: Color::WHITE,
            ..CanvasConfig::dirty_regions(Size::new(2000.0, 100.0))
        };
        let mut r = renderer(config);
        r.rendering(&mut g);
        r.context_mut().take_ops();

        g.set_position(a, Point::new(5.0, 0.0));
        g.flush_transforms();
        let stats = r.rendering(&mut g);

        assert!(!stats.full_redraw);
        assert_eq!(stats.dirty_rects, 1);
        assert_eq!(stats.drawn, 1);
        assert_eq!(fills(&r), 1);
        // Old and new footprints, merged, in y-down canvas pixels.
        assert_eq!(
            r.context().last_clip(),
            Some(&[Rect::new(0.0, 90.0, 15.0, 100.0)][..])
        );
    }

    #[test]
    fn too_many_dirty_commands_fall_back_to_full_redraw() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let sprites: Vec<NodeId> = (0..11)
            .map(|i| sprite(&mut g, root, f64::from(i) * 100.0))
            .collect();
        collect(&mut g, root);
        let mut r = renderer(CanvasConfig::dirty_regions(Size::new(2000.0, 100.0)));
        r.rendering(&mut g);

        for &s in &sprites {
            g.set_opacity(s, 128);
        }
        g.flush_transforms();
        let stats = r.rendering(&mut g);
        assert!(stats.full_redraw);
        assert_eq!(stats.drawn, 11);
        for &s in &sprites {
            assert_eq!(g.command(s).region().status, RegionStatus::NotDirty);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let sprites: Vec<NodeId> = (0..10)
            .map(|i| sprite(&mut g, root, f64::from(i) * 100.0))
            .collect();
        collect(&mut g, root);
        let mut r = renderer(CanvasConfig::dirty_regions(Size::new(2000.0, 100.0)));
        r.rendering(&mut g);

        for &s in &sprites {
            g.set_opacity(s, 128);
        }
        g.flush_transforms();
        assert!(!r.rendering(&mut g).full_redraw);
    }

    #[test]
    fn idle_frame_draws_nothing() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        sprite(&mut g, root, 0.0);
        collect(&mut g, root);
        let mut r = renderer(CanvasConfig::dirty_regions(Size::new(100.0, 100.0)));
        r.rendering(&mut g);
        r.context_mut().take_ops();

        let stats = r.rendering(&mut g);
        assert!(stats.is_idle());
        assert!(r.context().ops().is_empty());
    }

    #[test]
    fn disabled_regions_always_redraw() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        sprite(&mut g, root, 0.0);
        collect(&mut g, root);
        let mut r = renderer(CanvasConfig::default_config(Size::new(100.0, 100.0)));
        r.rendering(&mut g);
        assert!(r.rendering(&mut g).full_redraw);
        assert_eq!(fills(&r), 4, "background and sprite, twice");
    }

    #[test]
    fn white_clear_color_skips_the_fill() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        collect(&mut g, root);
        let config = CanvasConfig {
            clear_color: Color::WHITE,
            ..CanvasConfig::default_config(Size::new(10.0, 10.0))
        };
        let mut r = renderer(config);
        r.rendering(&mut g);
        assert_eq!(fills(&r), 0);
        assert!(
            r.context()
                .ops()
                .iter()
                .any(|op| matches!(op, DrawOp::Clear { .. }))
        );
    }

    #[test]
    fn world_y_up_maps_to_canvas_y_down() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let s = sprite(&mut g, root, 0.0);
        g.set_color(s, Color::new(0, 255, 0));
        collect(&mut g, root);
        let config = CanvasConfig {
            scale: 2.0,
            clear_color: Color::WHITE,
            ..CanvasConfig::default_config(Size::new(100.0, 100.0))
        };
        let mut r = renderer(config);
        r.rendering(&mut g);

        let Some(DrawOp::Fill {
            transform, color, ..
        }) = r.context().draws().next()
        else {
            panic!("sprite was not filled");
        };
        assert_eq!(*color, Color::new(0, 255, 0));
        let origin = *transform * Point::ZERO;
        let corner = *transform * Point::new(10.0, 10.0);
        assert!((origin - Point::new(0.0, 200.0)).hypot() < EPS);
        assert!((corner - Point::new(20.0, 180.0)).hypot() < EPS);
    }

    #[test]
    fn textures_are_drawn_upright() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let s = sprite(&mut g, root, 0.0);
        g.set_content(s, Content::Texture(TextureId(7)));
        collect(&mut g, root);
        let config = CanvasConfig {
            clear_color: Color::WHITE,
            ..CanvasConfig::default_config(Size::new(100.0, 100.0))
        };
        let mut r = renderer(config);
        r.rendering(&mut g);

        let Some(DrawOp::Texture {
            texture, transform, ..
        }) = r.context().draws().next()
        else {
            panic!("texture was not drawn");
        };
        assert_eq!(*texture, TextureId(7));
        // The image's top-left corner lands on the sprite's top-left.
        let top_left = *transform * Point::ZERO;
        assert!((top_left - Point::new(0.0, 90.0)).hypot() < EPS);
    }

    #[test]
    fn baked_subtree_is_replayed_over_its_root() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let panel = sprite(&mut g, root, 0.0);
        let icon = g.create_node();
        g.set_content(icon, Content::Fill);
        g.set_content_size(icon, Size::new(2.0, 2.0));
        g.add_child(panel, icon, None, None).unwrap();
        g.bake(panel);
        collect(&mut g, root);
        assert_eq!(g.queue().commands(), &[panel]);

        let config = CanvasConfig {
            clear_color: Color::WHITE,
            ..CanvasConfig::dirty_regions(Size::new(100.0, 100.0))
        };
        let mut r = renderer(config);
        let stats = r.rendering(&mut g);
        assert!(stats.full_redraw);
        let sizes: Vec<Rect> = r
            .context()
            .draws()
            .map(|op| match op {
                DrawOp::Fill { rect, .. } => *rect,
                _ => Rect::ZERO,
            })
            .collect();
        assert_eq!(
            sizes,
            vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 2.0, 2.0)]
        );
    }

    #[test]
    fn cache_lists_render_once() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        sprite(&mut g, root, 0.0);
        sprite(&mut g, root, 20.0);
        g.visit_to_cache(root, 4);
        assert!(g.queue().commands().is_empty());

        let r = renderer(CanvasConfig::default_config(Size::new(100.0, 100.0)));
        let mut target = RecordingContext::new();
        assert_eq!(r.render_to_cache(&mut target, &mut g, 4), 2);
        assert_eq!(target.draws().count(), 2);
        assert_eq!(r.render_to_cache(&mut target, &mut g, 4), 0);
    }

    #[test]
    fn debug_mode_strokes_dirty_rects() {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let a = sprite(&mut g, root, 0.0);
        collect(&mut g, root);
        let config = CanvasConfig {
            debug_regions: true,
            ..CanvasConfig::dirty_regions(Size::new(100.0, 100.0))
        };
        let mut r = renderer(config);
        r.rendering(&mut g);

        g.set_position(a, Point::new(20.0, 20.0));
        g.flush_transforms();
        r.rendering(&mut g);
        let strokes = r
            .context()
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { .. }))
            .count();
        assert_eq!(strokes, 2, "old and new footprints");
    }
}
