// raster.rs - Software backends for headless rendering
//
// Straight-alpha RGBA images via the `image` crate. Good enough to preview
// both renderers and to snapshot them in tests; not tuned for speed.

use super::canvas::Canvas2d;
use super::points::{Camera, Fog, LayerDraw, LayerHandle, LayerStyle, PointBackend};
use crate::color::{Color, Hsla};
use crate::error::{BackdropError, BackdropResult};
use crate::lifecycle::{AcquireBackend, HostSurface};
use crate::viewport::ViewportState;
use glam::Vec3;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Source-over blend of `c` at alpha `a` onto a straight-alpha pixel.
#[inline]
fn blend(px: &mut Rgba<u8>, c: Color, a: f32) {
    let a = a.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let [dr, dg, db, da] = px.0;
    let da = da as f32 / 255.0;
    let out_a = a + da * (1.0 - a);
    let mix = |s: f32, d: u8| ((s * a + d as f32 * da * (1.0 - a)) / out_a).clamp(0.0, 255.0) as u8;
    *px = Rgba([mix(c.r, dr), mix(c.g, dg), mix(c.b, db), (out_a * 255.0).round() as u8]);
}

/// Visit pixels whose centers lie within `radius` of (x, y), with distance.
fn for_each_in_radius(
    image: &mut RgbaImage,
    x: f32,
    y: f32,
    radius: f32,
    mut f: impl FnMut(&mut Rgba<u8>, f32),
) {
    let (w, h) = image.dimensions();
    let x0 = (x - radius).floor().max(0.0) as u32;
    let y0 = (y - radius).floor().max(0.0) as u32;
    let x1 = (x + radius).ceil().min(w as f32 - 1.0);
    let y1 = (y + radius).ceil().min(h as f32 - 1.0);
    if x1 < 0.0 || y1 < 0.0 {
        return;
    }
    for py in y0..=y1 as u32 {
        for px in x0..=x1 as u32 {
            let dx = px as f32 + 0.5 - x;
            let dy = py as f32 + 0.5 - y;
            let d = (dx * dx + dy * dy).sqrt();
            if d <= radius {
                f(image.get_pixel_mut(px, py), d);
            }
        }
    }
}

fn save_png(image: &RgbaImage, path: &Path) -> BackdropResult<()> {
    image.save(path)?;
    Ok(())
}

// ============================================================================
// Star-field canvas
// ============================================================================

pub struct RasterCanvas {
    image: RgbaImage,
    attached: bool,
}

impl RasterCanvas {
    pub fn new() -> Self {
        Self { image: RgbaImage::new(1, 1), attached: true }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn save(&self, path: &Path) -> BackdropResult<()> {
        save_png(&self.image, path)
    }
}

impl Default for RasterCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas2d for RasterCanvas {
    fn set_size(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = TRANSPARENT);
    }

    fn fill(&mut self, color: Color) {
        let (r, g, b) = color.to_rgb();
        self.image.pixels_mut().for_each(|p| *p = Rgba([r, g, b, 255]));
    }

    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        if radius <= 0.0 {
            return;
        }
        let rgb = color.to_color();
        for_each_in_radius(&mut self.image, x, y, radius, |px, d| {
            blend(px, rgb, color.a * (1.0 - d / radius));
        });
    }

    fn disc(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        // sub-pixel cores still cover the pixel they sit in
        let reach = radius.max(0.71);
        let rgb = color.to_color();
        for_each_in_radius(&mut self.image, x, y, reach, |px, _| blend(px, rgb, color.a));
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

// ============================================================================
// Wave-grid point renderer
// ============================================================================

struct RasterLayer {
    positions: Vec<f32>,
    colors: Vec<f32>,
    style: LayerStyle,
}

pub struct RasterPoints {
    image: RgbaImage,
    layers: HashMap<LayerHandle, RasterLayer>,
    next: u32,
    attached: bool,
}

impl RasterPoints {
    pub fn new() -> Self {
        Self { image: RgbaImage::new(1, 1), layers: HashMap::new(), next: 0, attached: true }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn live_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn save(&self, path: &Path) -> BackdropResult<()> {
        save_png(&self.image, path)
    }

    fn plot_square(&mut self, x: f32, y: f32, size: f32, color: Color, alpha: f32) {
        let (w, h) = self.image.dimensions();
        let half = size * 0.5;
        let x0 = (x - half).floor().max(0.0) as u32;
        let y0 = (y - half).floor().max(0.0) as u32;
        let x1 = ((x + half).ceil() as u32).min(w);
        let y1 = ((y + half).ceil() as u32).min(h);
        for py in y0..y1 {
            for px in x0..x1 {
                blend(self.image.get_pixel_mut(px, py), color, alpha);
            }
        }
    }
}

impl Default for RasterPoints {
    fn default() -> Self {
        Self::new()
    }
}

impl PointBackend for RasterPoints {
    fn set_viewport(&mut self, viewport: &ViewportState) {
        if self.image.dimensions() != (viewport.width, viewport.height) {
            self.image = RgbaImage::new(viewport.width, viewport.height);
        }
    }

    fn create_layer(
        &mut self,
        positions: &[f32],
        colors: &[f32],
        style: &LayerStyle,
    ) -> BackdropResult<LayerHandle> {
        if positions.len() % 3 != 0 || positions.len() != colors.len() {
            return Err(BackdropError::ResourceAcquisition(format!(
                "mismatched layer buffers: {} positions, {} colors",
                positions.len(),
                colors.len()
            )));
        }
        let handle = LayerHandle(self.next);
        self.next += 1;
        self.layers.insert(
            handle,
            RasterLayer { positions: positions.to_vec(), colors: colors.to_vec(), style: *style },
        );
        Ok(handle)
    }

    fn upload_positions(&mut self, layer: LayerHandle, positions: &[f32]) {
        if let Some(l) = self.layers.get_mut(&layer) {
            l.positions.clear();
            l.positions.extend_from_slice(positions);
        }
    }

    fn render(&mut self, camera: &Camera, fog: Option<&Fog>, layers: &[LayerDraw]) {
        self.image.pixels_mut().for_each(|p| *p = TRANSPARENT);
        let (w, h) = self.image.dimensions();
        let (w, h) = (w as f32, h as f32);
        let view = camera.view();
        let proj = camera.projection();

        let mut splats = Vec::new();
        for draw in layers {
            let Some(layer) = self.layers.get(&draw.layer) else { continue };
            let model_view = view * draw.model;
            for (p, c) in layer.positions.chunks_exact(3).zip(layer.colors.chunks_exact(3)) {
                let eye = model_view.transform_point3(Vec3::new(p[0], p[1], p[2]));
                let depth = -eye.z;
                if depth <= camera.near {
                    continue;
                }
                let clip = proj * eye.extend(1.0);
                let ndc = clip.truncate() / clip.w;
                if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
                    continue;
                }
                let mut color = Color { r: c[0] * 255.0, g: c[1] * 255.0, b: c[2] * 255.0 };
                if let Some(fog) = fog {
                    color = color.mix(fog.color, fog.factor(depth));
                }
                let size = (layer.style.size * h * 0.5 / depth).max(1.0);
                splats.push((
                    (ndc.x * 0.5 + 0.5) * w,
                    (0.5 - ndc.y * 0.5) * h,
                    size,
                    color,
                    layer.style.opacity,
                ));
            }
        }
        for (x, y, size, color, alpha) in splats {
            self.plot_square(x, y, size, color, alpha);
        }
    }

    fn release_layer(&mut self, layer: LayerHandle) {
        self.layers.remove(&layer);
    }

    fn detach(&mut self) {
        self.layers.clear();
        self.attached = false;
    }
}

// ============================================================================
// Headless host
// ============================================================================

/// Fixed-size stand-in for a page element.
#[derive(Debug)]
pub struct HeadlessHost {
    width: u32,
    height: u32,
    observing: bool,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, observing: false }
    }

    /// Change the reported size; follow with `Backdrop::sync_size`.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }
}

impl HostSurface for HeadlessHost {
    fn content_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn observe(&mut self) -> BackdropResult<()> {
        self.observing = true;
        Ok(())
    }

    fn unobserve(&mut self) {
        self.observing = false;
    }
}

impl AcquireBackend<RasterCanvas> for HeadlessHost {
    fn acquire(&mut self) -> BackdropResult<RasterCanvas> {
        Ok(RasterCanvas::new())
    }
}

impl AcquireBackend<RasterPoints> for HeadlessHost {
    fn acquire(&mut self) -> BackdropResult<RasterPoints> {
        Ok(RasterPoints::new())
    }
}
