// wavegrid.rs - Oscillating dotted surface
//
// One lattice, one or two layers. Each layer owns its CPU position buffer
// and a backend handle; heights come from the closed-form wave at the
// layer's phase-shifted time, so layers never read each other's state.

use super::points::{Camera, Fog, LayerDraw, LayerHandle, LayerStyle, PointBackend};
use crate::clock::Frame;
use crate::config::WaveGridConfig;
use crate::error::BackdropResult;
use crate::lifecycle::Renderer;
use crate::sim::{Lattice, WAVE_STEP};
use crate::viewport::ViewportState;
use ndarray::Array3;

struct Layer {
    handle: LayerHandle,
    style: LayerStyle,
    positions: Array3<f32>,
}

pub struct WaveGrid<P: PointBackend> {
    config: WaveGridConfig,
    backend: P,
    lattice: Lattice,
    layers: Vec<Layer>,
    draws: Vec<LayerDraw>,
    camera: Camera,
    t: f32,
    displayed_t: Option<f32>,
    disposed: bool,
}

// Lattice buffers are built in standard layout.
#[inline]
fn flat(a: &Array3<f32>) -> &[f32] {
    a.as_slice().unwrap_or_default()
}

impl<P: PointBackend> WaveGrid<P> {
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_style(&self, index: usize) -> Option<&LayerStyle> {
        self.layers.get(index).map(|l| &l.style)
    }

    /// CPU copy of a layer's positions, shape (amount_x, amount_y, 3).
    pub fn layer_positions(&self, index: usize) -> Option<&Array3<f32>> {
        self.layers.get(index).map(|l| &l.positions)
    }

    /// Time the next frame will be drawn at.
    pub fn time(&self) -> f32 {
        self.t
    }

    /// Time the current buffers were computed for; `None` before the first
    /// drawn frame.
    pub fn displayed_time(&self) -> Option<f32> {
        self.displayed_t
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<P: PointBackend> Renderer for WaveGrid<P> {
    type Config = WaveGridConfig;
    type Backend = P;

    fn initialize(
        config: WaveGridConfig,
        mut backend: P,
        viewport: ViewportState,
    ) -> BackdropResult<Self> {
        if let Err(e) = config.validate() {
            backend.detach();
            return Err(e);
        }
        let lattice = Lattice::new(config.amount_x, config.amount_y, config.separation);
        backend.set_viewport(&viewport);

        let colors = lattice.colors(config.point_color);
        let styles: &[LayerStyle] = if config.parallax {
            &[LayerStyle::BASE, LayerStyle::PARALLAX]
        } else {
            &[LayerStyle::BASE]
        };

        let mut layers: Vec<Layer> = Vec::with_capacity(styles.len());
        for style in styles {
            let positions = lattice.rest_positions();
            match backend.create_layer(flat(&positions), flat(&colors), style) {
                Ok(handle) => layers.push(Layer { handle, style: *style, positions }),
                Err(e) => {
                    for layer in &layers {
                        backend.release_layer(layer.handle);
                    }
                    backend.detach();
                    return Err(e);
                }
            }
        }
        log::debug!(
            "wave grid: {}x{} lattice, {} layer(s)",
            lattice.amount_x(),
            lattice.amount_y(),
            layers.len()
        );

        Ok(Self {
            draws: Vec::with_capacity(layers.len()),
            camera: Camera::new(viewport.aspect),
            config,
            backend,
            lattice,
            layers,
            t: 0.0,
            displayed_t: None,
            disposed: false,
        })
    }

    fn tick(&mut self, _frame: Frame) {
        if self.config.paused || self.disposed {
            return;
        }
        let t = self.t;

        self.draws.clear();
        for layer in &mut self.layers {
            self.lattice.displace(&mut layer.positions, t + layer.style.phase);
            self.backend.upload_positions(layer.handle, flat(&layer.positions));
            self.draws.push(LayerDraw { layer: layer.handle, model: layer.style.model(t) });
        }

        let fog = self.config.fog.then_some(&Fog::DEFAULT);
        self.backend.render(&self.camera, fog, &self.draws);

        self.displayed_t = Some(t);
        self.t += WAVE_STEP * self.config.speed_multiplier;
    }

    fn on_resize(&mut self, viewport: ViewportState) {
        self.camera.aspect = viewport.aspect;
        self.backend.set_viewport(&viewport);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.draws.clear();
        for layer in self.layers.drain(..) {
            self.backend.release_layer(layer.handle);
        }
        self.backend.detach();
    }
}
