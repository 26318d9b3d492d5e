// ============================================================================
// BACKDROP ENGINE - Ambient page backgrounds: star field and wave grid
// ============================================================================
//
// The simulation and renderers are platform-free and drive their output
// through small drawing traits. `web` binds them to the DOM (canvas 2-D,
// WebGL2, requestAnimationFrame, ResizeObserver); `render::raster` binds
// them to in-memory images for the native preview tool and tests.

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod render;
pub mod rng;
pub mod sim;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{Frame, FrameClock, FrameRequest, FrameSource, ManualFrames};
pub use config::{ResizePolicy, StarFieldConfig, WaveGridConfig};
pub use error::{BackdropError, BackdropResult};
pub use lifecycle::{AcquireBackend, Backdrop, HostSurface, Phase, Renderer};
pub use render::{StarField, WaveGrid};
pub use viewport::{Observation, ViewportState, ViewportTracker};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}
