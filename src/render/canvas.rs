// canvas.rs - 2-D drawing seam for the star field
//
// Implemented by the browser 2-D context (web::CanvasSurface) and the
// software raster (render::raster::RasterCanvas).

use crate::color::{Color, Hsla};

pub trait Canvas2d {
    /// Resize the drawing buffer to the viewport, in pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Clear to fully transparent.
    fn clear(&mut self);

    /// Opaque fill of the whole surface.
    fn fill(&mut self, color: Color);

    /// Radial gradient from `color` at the center to transparent at `radius`.
    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Hsla);

    /// Solid circle.
    fn disc(&mut self, x: f32, y: f32, radius: f32, color: Hsla);

    /// Remove the surface from its host if it is still attached there.
    /// Repeat calls are no-ops.
    fn detach(&mut self);
}
