//! Frame loop driving
//!
//! One callback per display refresh (requestAnimationFrame in the browser,
//! a plain loop natively). Teardown goes through a single [`CancelToken`].

use std::cell::Cell;
use std::rc::Rc;

/// Shared stop flag for a running loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Drives a per-frame callback until cancelled
#[derive(Debug, Default)]
pub struct FrameLoop {
    token: CancelToken,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stops this loop
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Call `frame` with the frame index until it returns false, the token
    /// is cancelled, or `limit` frames have run. Returns the frame count.
    pub fn run_blocking(&mut self, limit: Option<u64>, mut frame: impl FnMut(u64) -> bool) -> u64 {
        while !self.token.is_cancelled() && limit.is_none_or(|l| self.frames < l) {
            let keep_going = frame(self.frames);
            self.frames += 1;
            if !keep_going {
                break;
            }
        }
        self.frames
    }

    /// Schedule `frame` on every animation frame until the token is
    /// cancelled
    #[cfg(target_arch = "wasm32")]
    pub fn start_animation<F: FnMut(f64) + 'static>(self, frame: F) {
        schedule(self.token, Rc::new(std::cell::RefCell::new(frame)));
    }
}

#[cfg(target_arch = "wasm32")]
fn schedule<F: FnMut(f64) + 'static>(token: CancelToken, frame: Rc<std::cell::RefCell<F>>) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let Some(window) = web_sys::window() else {
        log::warn!("No window; frame loop not started");
        return;
    };
    let closure = Closure::once(move |time: f64| {
        if token.is_cancelled() {
            log::info!("Frame loop stopped");
            return;
        }
        (frame.borrow_mut())(time);
        schedule(token, frame);
    });
    if let Err(err) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {:?}", err);
    }
    closure.forget();
}
