// host.rs - Container element as a HostSurface
//
// The engine owns the canvas: it is created on acquire, stretched over the
// container, and only ever removed by the backend that drew into it.

use super::canvas::CanvasSurface;
use super::describe;
use super::webgl::GlPoints;
use crate::error::{BackdropError, BackdropResult};
use crate::lifecycle::{AcquireBackend, HostSurface};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, ResizeObserver};

pub type ResizeCallback = Closure<dyn FnMut(js_sys::Array)>;

const CANVAS_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("inset", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("display", "block"),
    ("pointer-events", "none"),
];

pub struct DomHost {
    document: Document,
    container: HtmlElement,
    observer: Option<ResizeObserver>,
    callback: Option<ResizeCallback>,
}

impl DomHost {
    pub fn new(container: HtmlElement) -> BackdropResult<Self> {
        let document = container
            .owner_document()
            .ok_or_else(|| BackdropError::ResourceAcquisition("container has no document".into()))?;
        Ok(Self { document, container, observer: None, callback: None })
    }

    pub fn install(&mut self, callback: ResizeCallback) {
        self.callback = Some(callback);
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    fn mount_canvas(&self) -> BackdropResult<HtmlCanvasElement> {
        let acquire = |e: wasm_bindgen::JsValue| BackdropError::ResourceAcquisition(describe(&e));
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(acquire)?
            .dyn_into()
            .map_err(|_| {
                BackdropError::ResourceAcquisition("created element is not a canvas".into())
            })?;

        let style = canvas.style();
        for (prop, value) in CANVAS_STYLE {
            style.set_property(prop, value).map_err(acquire)?;
        }
        canvas.set_attribute("aria-hidden", "true").map_err(acquire)?;
        self.container.append_child(&canvas).map_err(acquire)?;
        Ok(canvas)
    }

    fn acquire_with<B>(
        &self,
        build: impl FnOnce(HtmlCanvasElement, HtmlElement) -> BackdropResult<B>,
    ) -> BackdropResult<B> {
        let canvas = self.mount_canvas()?;
        build(canvas.clone(), self.container.clone()).inspect_err(|_| canvas.remove())
    }
}

impl HostSurface for DomHost {
    fn content_size(&self) -> (u32, u32) {
        (
            self.container.client_width().max(0) as u32,
            self.container.client_height().max(0) as u32,
        )
    }

    fn observe(&mut self) -> BackdropResult<()> {
        if self.observer.is_some() {
            return Ok(());
        }
        let callback = self
            .callback
            .as_ref()
            .ok_or_else(|| {
                BackdropError::ResourceAcquisition("resize callback not installed".into())
            })?;
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| BackdropError::ResourceAcquisition(describe(&e)))?;
        observer.observe(&self.container);
        self.observer = Some(observer);
        Ok(())
    }

    fn unobserve(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl AcquireBackend<CanvasSurface> for DomHost {
    fn acquire(&mut self) -> BackdropResult<CanvasSurface> {
        self.acquire_with(CanvasSurface::new)
    }
}

impl AcquireBackend<GlPoints> for DomHost {
    fn acquire(&mut self) -> BackdropResult<GlPoints> {
        self.acquire_with(GlPoints::new)
    }
}
