// frames.rs - requestAnimationFrame as a FrameSource

use crate::clock::{FrameRequest, FrameSource};
use crate::error::{BackdropError, BackdropResult};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

pub type FrameCallback = Closure<dyn FnMut(f64)>;

pub struct RafFrames {
    window: Window,
    callback: Option<FrameCallback>,
}

impl RafFrames {
    pub fn new() -> BackdropResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BackdropError::Scheduling("no window".into()))?;
        Ok(Self { window, callback: None })
    }

    /// The callback outlives every request made through this source; it is
    /// dropped with the source, never from inside its own invocation.
    pub fn install(&mut self, callback: FrameCallback) {
        self.callback = Some(callback);
    }
}

impl FrameSource for RafFrames {
    fn request(&mut self) -> BackdropResult<FrameRequest> {
        let callback = self
            .callback
            .as_ref()
            .ok_or_else(|| BackdropError::Scheduling("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameRequest)
            .map_err(|e| BackdropError::Scheduling(super::describe(&e)))
    }

    fn cancel(&mut self, request: FrameRequest) {
        if let Err(e) = self.window.cancel_animation_frame(request.0) {
            log::warn!("cancelAnimationFrame failed: {}", super::describe(&e));
        }
    }
}
