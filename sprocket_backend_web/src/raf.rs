// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser frame pump.
//!
//! A [`RafLoop`] hands every display refresh to a callback as a timestamp in
//! milliseconds. The timestamp is the one `requestAnimationFrame` passes in,
//! measured on the `performance.now()` clock, so it can be fed straight into
//! [`Director::main_loop`](sprocket_core::director::Director::main_loop).
//! Frames that arrive while the page is hidden are simply not delivered; the
//! director sees one long delta when they resume.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type FrameClosure = Closure<dyn FnMut(f64)>;

/// Calls a frame callback on every browser repaint while started.
///
/// A stopped loop keeps its JS closure, so toggling [`start`](Self::start)
/// and [`stop`](Self::stop) (as the director does when it stops animating)
/// allocates nothing. Dropping the loop releases the closure.
pub struct RafLoop {
    shared: Rc<Shared>,
}

struct Shared {
    on_frame: RefCell<Box<dyn FnMut(f64)>>,
    // The closure captures `Shared` and re-queues itself each frame.
    trampoline: RefCell<Option<FrameClosure>>,
    active: Cell<bool>,
    pending: Cell<Option<i32>>,
    delivered: Cell<u64>,
}

impl Shared {
    fn request_next(&self) {
        if let Some(closure) = self.trampoline.borrow().as_ref() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.pending.set(Some(id));
        }
    }

    fn fire(&self, timestamp_ms: f64) {
        self.pending.set(None);
        if !self.active.get() {
            return;
        }
        self.delivered.set(self.delivered.get() + 1);
        (self.on_frame.borrow_mut())(timestamp_ms);
        // The callback may have stopped the loop.
        if self.active.get() {
            self.request_next();
        }
    }
}

impl RafLoop {
    /// Wraps `on_frame`. Nothing runs until [`start`](Self::start).
    pub fn new(on_frame: impl FnMut(f64) + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                on_frame: RefCell::new(Box::new(on_frame)),
                trampoline: RefCell::new(None),
                active: Cell::new(false),
                pending: Cell::new(None),
                delivered: Cell::new(0),
            }),
        }
    }

    /// Queues the first frame. Does nothing while already started.
    pub fn start(&self) {
        if self.shared.active.replace(true) {
            return;
        }
        if self.shared.trampoline.borrow().is_none() {
            let shared = Rc::clone(&self.shared);
            let closure: FrameClosure =
                Closure::wrap(Box::new(move |timestamp_ms: f64| shared.fire(timestamp_ms)));
            *self.shared.trampoline.borrow_mut() = Some(closure);
        }
        if self.shared.pending.get().is_none() {
            self.shared.request_next();
        }
    }

    /// Cancels the queued frame, if any.
    pub fn stop(&self) {
        self.shared.active.set(false);
        if let Some(id) = self.shared.pending.take() {
            cancel_animation_frame(id);
        }
    }

    /// Is a frame queued or being delivered?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.active.get()
    }

    /// Returns how many frames reached the callback.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.shared.delivered.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // Breaks the closure -> shared -> closure cycle.
        drop(self.shared.trampoline.borrow_mut().take());
    }
}

impl fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RafLoop")
            .field("active", &self.shared.active.get())
            .field("pending", &self.shared.pending.get())
            .field("delivered", &self.shared.delivered.get())
            .finish_non_exhaustive()
    }
}
