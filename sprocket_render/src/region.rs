// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-rectangle accumulation.

use alloc::vec::Vec;

use kurbo::Rect;

/// Largest number of rectangles kept before the cheapest pair is merged.
pub const MAX_RECTS: usize = 3;

/// Extra area below which a merge counts as free.
const MERGE_EPSILON: f64 = 1e-6;

/// A small set of world-space rectangles that must be repainted.
///
/// Rectangles whose union covers no more than the two of them already do are
/// merged on insertion. Beyond [`MAX_RECTS`], the pair whose union adds the
/// least area is merged, so the set stays small at the cost of repainting
/// some clean pixels.
#[derive(Clone, Debug, Default)]
pub struct DirtyRegion {
    rects: Vec<Rect>,
    viewport: Option<Rect>,
}

impl DirtyRegion {
    /// Creates an empty region without a viewport.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rects: Vec::new(),
            viewport: None,
        }
    }

    /// Creates an empty region whose rectangles are clipped to `viewport`.
    #[must_use]
    pub const fn with_viewport(viewport: Rect) -> Self {
        Self {
            rects: Vec::new(),
            viewport: Some(viewport),
        }
    }

    /// Sets (or removes) the clipping viewport for later insertions.
    pub fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.viewport = viewport;
    }

    /// Adds `rect` to the region. Empty rectangles, and those entirely
    /// outside the viewport, are ignored.
    pub fn add(&mut self, rect: Rect) {
        let mut rect = rect.abs();
        if let Some(viewport) = self.viewport {
            rect = rect.intersect(viewport);
        }
        if rect.area() <= 0.0 {
            return;
        }
        while let Some(i) = self
            .rects
            .iter()
            .position(|r| merge_cost(*r, rect) <= MERGE_EPSILON)
        {
            rect = rect.union(self.rects.swap_remove(i));
        }
        self.rects.push(rect);
        while self.rects.len() > MAX_RECTS {
            self.merge_cheapest_pair();
        }
    }

    fn merge_cheapest_pair(&mut self) {
        let mut best = (0, 1, f64::INFINITY);
        for i in 0..self.rects.len() {
            for j in i + 1..self.rects.len() {
                let cost = merge_cost(self.rects[i], self.rects[j]);
                if cost < best.2 {
                    best = (i, j, cost);
                }
            }
        }
        let (i, j, _) = best;
        let b = self.rects.swap_remove(j);
        self.rects[i] = self.rects[i].union(b);
    }

    /// Returns the accumulated rectangles.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Returns the number of rectangles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` if nothing was added since the last clear.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns the smallest rectangle covering every dirty rectangle.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.rects.iter().copied().reduce(|a, b| a.union(b))
    }

    /// Does `rect` overlap any dirty rectangle?
    #[must_use]
    pub fn intersects(&self, rect: Rect) -> bool {
        let rect = rect.abs();
        self.rects.iter().any(|r| overlaps(*r, rect))
    }

    /// Forgets every rectangle; the viewport is kept.
    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

/// Area the union of `a` and `b` adds over what they already cover.
fn merge_cost(a: Rect, b: Rect) -> f64 {
    let overlap = a.intersect(b).area();
    a.union(b).area() - (a.area() + b.area() - overlap)
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_strips_merge_for_free() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        region.add(Rect::new(5.0, 0.0, 15.0, 10.0));
        assert_eq!(region.rects(), &[Rect::new(0.0, 0.0, 15.0, 10.0)]);
    }

    #[test]
    fn contained_rect_is_absorbed() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        region.add(Rect::new(2.0, 2.0, 3.0, 3.0));
        assert_eq!(region.len(), 1);
    }

    #[test]
    fn disjoint_rects_stay_apart_up_to_the_limit() {
        let mut region = DirtyRegion::new();
        for i in 0..3 {
            let x = f64::from(i) * 100.0;
            region.add(Rect::new(x, 0.0, x + 10.0, 10.0));
        }
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn fourth_rect_merges_the_cheapest_pair() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        region.add(Rect::new(500.0, 0.0, 510.0, 10.0));
        region.add(Rect::new(0.0, 500.0, 10.0, 510.0));
        region.add(Rect::new(12.0, 0.0, 22.0, 10.0));
        assert_eq!(region.len(), MAX_RECTS);
        assert!(region.rects().contains(&Rect::new(0.0, 0.0, 22.0, 10.0)));
    }

    #[test]
    fn viewport_clips_and_drops() {
        let mut region = DirtyRegion::with_viewport(Rect::new(0.0, 0.0, 100.0, 100.0));
        region.add(Rect::new(90.0, 90.0, 120.0, 120.0));
        region.add(Rect::new(200.0, 200.0, 210.0, 210.0));
        assert_eq!(region.rects(), &[Rect::new(90.0, 90.0, 100.0, 100.0)]);
    }

    #[test]
    fn empty_rects_are_ignored() {
        let mut region = DirtyRegion::new();
        region.add(Rect::ZERO);
        region.add(Rect::new(5.0, 5.0, 5.0, 9.0));
        assert!(region.is_empty());
        assert_eq!(region.bounds(), None);
    }

    #[test]
    fn intersection_excludes_touching_edges() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(region.intersects(Rect::new(9.0, 9.0, 20.0, 20.0)));
        assert!(!region.intersects(Rect::new(10.0, 0.0, 20.0, 10.0)));
        region.clear();
        assert!(!region.intersects(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }
}
