// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for sprocket.
//!
//! - [`RafLoop`]: `requestAnimationFrame` tick source.
//! - [`WebCanvas`]: [`Context2d`](sprocket_render::Context2d) over a
//!   `<canvas>` element's 2D context, with an image registry for textures.
//! - [`run`]: wires a [`Director`] rendering to a [`WebCanvas`] to a
//!   [`RafLoop`].

#![no_std]

extern crate alloc;

mod canvas;
mod raf;

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

pub use canvas::{CanvasError, WebCanvas};
pub use raf::RafLoop;

use sprocket_core::director::Director;
use sprocket_render::CanvasRenderer;

/// A director drawing on an HTML canvas.
pub type WebDirector = Director<CanvasRenderer<WebCanvas>>;

/// Returns the current time from `performance.now()`, in milliseconds.
#[must_use]
pub fn now() -> f64 {
    raf::performance_now()
}

/// Starts driving `director` from `requestAnimationFrame`.
///
/// Each frame calls [`Director::main_loop`] with the frame timestamp. The
/// loop stops itself once the director stops animating (after
/// [`Director::end`]); keep the returned [`RafLoop`] alive for as long as
/// frames should be produced.
pub fn run(director: Rc<RefCell<WebDirector>>) -> Rc<RafLoop> {
    let handle: Rc<RefCell<Option<Weak<RafLoop>>>> = Rc::new(RefCell::new(None));
    let loop_handle = Rc::clone(&handle);
    let raf = Rc::new(RafLoop::new(move |timestamp_ms| {
        let animating = {
            let mut director = director.borrow_mut();
            director.main_loop(timestamp_ms);
            director.is_animating()
        };
        if !animating
            && let Some(raf) = loop_handle.borrow().as_ref().and_then(Weak::upgrade)
        {
            raf.stop();
        }
    }));
    *handle.borrow_mut() = Some(Rc::downgrade(&raf));
    raf.start();
    raf
}
