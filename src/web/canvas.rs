// canvas.rs - Browser 2-D context as a Canvas2d

use super::describe;
use crate::color::{Color, Hsla};
use crate::error::{BackdropError, BackdropResult};
use crate::render::Canvas2d;
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Node};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    container: HtmlElement,
    detached: bool,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, container: HtmlElement) -> BackdropResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| BackdropError::ResourceAcquisition(describe(&e)))?
            .ok_or_else(|| BackdropError::ResourceAcquisition("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BackdropError::ResourceAcquisition("unexpected 2d context type".into()))?;
        Ok(Self { canvas, ctx, container, detached: false })
    }

    fn circle(&self, x: f32, y: f32, radius: f32) {
        self.ctx.begin_path();
        if self.ctx.arc(x as f64, y as f64, radius as f64, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }
}

impl Canvas2d for CanvasSurface {
    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn fill(&mut self, color: Color) {
        let (r, g, b) = color.to_rgb();
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.set_fill_style_str(&format!("rgb({r}, {g}, {b})"));
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        let (cx, cy) = (x as f64, y as f64);
        let r = radius as f64;
        let Ok(gradient) = self.ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, r) else {
            return;
        };
        let clear = Hsla { a: 0.0, ..color };
        if gradient.add_color_stop(0.0, &color.to_css()).is_err()
            || gradient.add_color_stop(1.0, &clear.to_css()).is_err()
        {
            return;
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.circle(x, y, radius);
    }

    fn disc(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.circle(x, y, radius);
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        let host: &Node = &self.container;
        if self.canvas.parent_node().is_some_and(|p| p.is_same_node(Some(host))) {
            if let Err(e) = host.remove_child(&self.canvas) {
                log::warn!("failed to remove canvas: {}", describe(&e));
            }
        }
    }
}
