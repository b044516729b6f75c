// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph, render commands and frame driver for 2D games.
//!
//! `sprocket_core` holds a retained tree of nodes, each with a position,
//! anchor, scale, rotation, skew, color and opacity, and keeps a cached
//! render command per node up to date lazily. It is `no_std` compatible
//! (with `alloc`) and stores nodes column-wise behind generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Host (display callback)
//!       │
//!       ▼
//!   Director::main_loop(now)
//!       │   actions, scheduler ──► NodeBehavior hooks
//!       │
//!       ├── children order dirty? ──► SceneGraph::visit() ──► RenderQueue
//!       │                                                     (draw list)
//!       └── otherwise ──────────────► SceneGraph::flush_transforms()
//!                                          (dirty pool)
//!       ▼
//!   Renderer::rendering(&mut SceneGraph) ──► pixels
//! ```
//!
//! **[`node`]**: The [`SceneGraph`](node::SceneGraph) with its tree
//! operations, lifecycle, transform queries, the visit walk and child
//! enumeration by name.
//!
//! **[`command`]**: Per-node [`RenderCommand`](command::RenderCommand)
//! caching transforms, displayed color and opacity, and screen regions.
//!
//! **[`dirty`]**: The [`DirtyFlags`](dirty::DirtyFlags) bitmask and its
//! propagation rules.
//!
//! **[`queue`]**: The [`RenderQueue`](queue::RenderQueue): draw list, dirty
//! pool, cache lists and repaint flags.
//!
//! **[`director`]**: The [`Director`](director::Director) frame driver and
//! scene stack.
//!
//! **[`backend`]**: The [`Renderer`](backend::Renderer) trait drawing
//! backends implement.
//!
//! **[`scheduler`]**, **[`action`]**, **[`event`]**: Per-node updates and
//! timers, timed actions, and named custom events.
//!
//! **[`affine`]**, **[`color`]**: Transform math and the color cascade.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod action;
pub mod affine;
pub mod backend;
pub mod color;
pub mod command;
pub mod director;
pub mod dirty;
pub mod error;
pub mod event;
pub mod frame;
pub mod node;
pub mod queue;
pub mod scheduler;
pub mod trace;
