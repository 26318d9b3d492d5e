// points.rs - Point-cloud drawing seam for the wave grid
//
// A backend owns GPU-resident (or emulated) position/color buffers per
// layer. The renderer keeps the CPU copies and re-uploads positions every
// frame; colors are uploaded once.

use crate::color::Color;
use crate::error::BackdropResult;
use crate::viewport::ViewportState;
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u32);

/// Per-layer styling. The parallax layer is the same lattice drawn with a
/// different one of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    /// Point size in CSS pixels at unit view distance scale.
    pub size: f32,
    pub opacity: f32,
    /// Constant world-space offset of the whole layer.
    pub offset: Vec3,
    /// Added to the wave time for this layer's heights.
    pub phase: f32,
    /// Y rotation is `sin(t * sway_frequency + sway_phase) * sway_amplitude`.
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    pub sway_phase: f32,
}

impl LayerStyle {
    pub const BASE: LayerStyle = LayerStyle {
        size: 5.5,
        opacity: 0.72,
        offset: Vec3::ZERO,
        phase: 0.0,
        sway_amplitude: 0.04,
        sway_frequency: 0.04,
        sway_phase: 0.0,
    };

    pub const PARALLAX: LayerStyle = LayerStyle {
        size: 3.2,
        opacity: 0.34,
        offset: Vec3::new(0.0, 22.0, -110.0),
        phase: 1.3,
        sway_amplitude: 0.05,
        sway_frequency: 0.05,
        sway_phase: 1.3,
    };

    pub fn rotation_y(&self, t: f32) -> f32 {
        (t * self.sway_frequency + self.sway_phase).sin() * self.sway_amplitude
    }

    /// Rigid transform: rotate about Y, then offset.
    pub fn model(&self, t: f32) -> Mat4 {
        Mat4::from_translation(self.offset) * Mat4::from_rotation_y(self.rotation_y(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Camera {
    /// Raised and pulled back, looking down -Z across the grid.
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_deg: 56.0,
            aspect,
            near: 1.0,
            far: 10_000.0,
            position: Vec3::new(0.0, 320.0, 1220.0),
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Distance fog, smoothstepped between `near` and `far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub const DEFAULT: Fog = Fog { color: Color::from_u32(0x050d29), near: 2400.0, far: 9800.0 };

    /// 0 = no fog, 1 = fully fogged. Smoothstep between near and far.
    pub fn factor(&self, depth: f32) -> f32 {
        let t = ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDraw {
    pub layer: LayerHandle,
    pub model: Mat4,
}

pub trait PointBackend {
    fn set_viewport(&mut self, viewport: &ViewportState);

    fn create_layer(
        &mut self,
        positions: &[f32],
        colors: &[f32],
        style: &LayerStyle,
    ) -> BackdropResult<LayerHandle>;

    fn upload_positions(&mut self, layer: LayerHandle, positions: &[f32]);

    /// Clear and draw the given layers in order.
    fn render(&mut self, camera: &Camera, fog: Option<&Fog>, layers: &[LayerDraw]);

    /// Free the layer's buffers. Unknown handles are ignored.
    fn release_layer(&mut self, layer: LayerHandle);

    /// Free shared state and remove the surface from its host if it is
    /// still attached there. Repeat calls are no-ops.
    fn detach(&mut self);
}
