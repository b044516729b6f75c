// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas renderer for the sprocket scene graph.
//!
//! `sprocket_render` implements [`Renderer`](sprocket_core::backend::Renderer)
//! for immediate-mode 2D contexts. Each frame it decides between a full
//! repaint and a partial one limited to the screen rectangles that changed,
//! then replays the collected render commands against a [`Context2d`].
//!
//! - [`region`]: the [`DirtyRegion`] accumulator.
//! - [`context`]: the [`Context2d`] drawing abstraction.
//! - [`canvas`]: the [`CanvasRenderer`] and its [`CanvasConfig`].
//! - [`recording`]: a [`RecordingContext`] that records draw calls instead
//!   of rasterizing them.
//!
//! World space is y-up; canvas space is y-down and scaled by the view scale.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod canvas;
pub mod context;
pub mod recording;
pub mod region;

pub use canvas::{CanvasConfig, CanvasRenderer};
pub use context::Context2d;
pub use recording::{DrawOp, RecordingContext};
pub use region::DirtyRegion;
