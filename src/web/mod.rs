// web/ - Browser bindings and the exported JS classes
//
// Each exported handle owns the only strong reference to its backdrop. The
// frame and resize closures hold weak references, so dropping or freeing
// the handle tears everything down.

mod canvas;
mod frames;
mod host;
mod webgl;

pub use canvas::CanvasSurface;
pub use frames::RafFrames;
pub use host::DomHost;
pub use webgl::GlPoints;

use crate::config::{StarFieldConfig, WaveGridConfig};
use crate::error::BackdropResult;
use crate::lifecycle::{AcquireBackend, Backdrop, Renderer};
use crate::render::{StarField, WaveGrid};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

type Mounted<R> = Rc<RefCell<Backdrop<R, RafFrames, DomHost>>>;

pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(e) => e.message().into(),
        None => format!("{value:?}"),
    }
}

/// `undefined`/`null` mean defaults; anything else goes through JSON.
fn options_json(options: &JsValue) -> Result<String, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok("{}".into());
    }
    Ok(js_sys::JSON::stringify(options)?.into())
}

fn mount<R>(container: HtmlElement, config: R::Config) -> BackdropResult<Mounted<R>>
where
    R: Renderer + 'static,
    R::Config: 'static,
    DomHost: AcquireBackend<R::Backend>,
{
    let backdrop: Mounted<R> = Rc::new(RefCell::new(Backdrop::new(
        config,
        RafFrames::new()?,
        DomHost::new(container)?,
    )));

    let weak = Rc::downgrade(&backdrop);
    let on_frame = Closure::wrap(Box::new(move |now: f64| {
        if let Some(b) = weak.upgrade() {
            if let Ok(mut b) = b.try_borrow_mut() {
                b.on_frame(now);
            }
        }
    }) as Box<dyn FnMut(f64)>);

    let weak = Rc::downgrade(&backdrop);
    let on_resize = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
        if let Some(b) = weak.upgrade() {
            if let Ok(mut b) = b.try_borrow_mut() {
                b.sync_size();
            }
        }
    }) as Box<dyn FnMut(js_sys::Array)>);

    {
        let mut b = backdrop.borrow_mut();
        b.frames_mut().install(on_frame);
        b.host_mut().install(on_resize);
        b.attach()?;
    }
    Ok(backdrop)
}

#[wasm_bindgen]
pub struct StarsCanvas {
    inner: Mounted<StarField<CanvasSurface>>,
}

#[wasm_bindgen]
impl StarsCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, options: JsValue) -> Result<StarsCanvas, JsValue> {
        let config = StarFieldConfig::from_json(&options_json(&options)?)?;
        Ok(Self { inner: mount(container, config)? })
    }

    pub fn teardown(&self) {
        self.inner.borrow_mut().teardown();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().is_running()
    }

    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.inner.borrow().clock().delivered() as f64
    }
}

#[wasm_bindgen]
pub struct DottedSurface {
    inner: Mounted<WaveGrid<GlPoints>>,
}

#[wasm_bindgen]
impl DottedSurface {
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, options: JsValue) -> Result<DottedSurface, JsValue> {
        let config = WaveGridConfig::from_json(&options_json(&options)?)?;
        Ok(Self { inner: mount(container, config)? })
    }

    pub fn teardown(&self) {
        self.inner.borrow_mut().teardown();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().is_running()
    }

    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.inner.borrow().clock().delivered() as f64
    }
}
