// error.rs - Engine error type
//
// Degenerate viewports and repeated teardown are not errors; they are
// absorbed where they happen. Everything here is surfaced to the caller.

use crate::lifecycle::Phase;

#[derive(Debug, thiserror::Error)]
pub enum BackdropError {
    /// Drawing surface or graphics context could not be created.
    #[error("failed to acquire drawing surface: {0}")]
    ResourceAcquisition(String),

    #[error("invalid renderer configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse renderer options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("frame scheduling failed: {0}")]
    Scheduling(String),

    #[error("backdrop cannot be attached from the {0:?} phase")]
    InvalidTransition(Phase),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("failed to write preview frame: {0}")]
    Output(#[from] image::ImageError),
}

pub type BackdropResult<T> = Result<T, BackdropError>;

#[cfg(target_arch = "wasm32")]
impl From<BackdropError> for wasm_bindgen::JsValue {
    fn from(err: BackdropError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
