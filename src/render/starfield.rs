// starfield.rs - Perspective star field
//
// Per frame: advance depth, recycle escaped particles, then hard-clear and
// draw a glow + core per particle. Both colors derive from one hue.

use super::canvas::Canvas2d;
use crate::clock::Frame;
use crate::color::{Color, Hsla};
use crate::config::{ResizePolicy, StarFieldConfig};
use crate::error::BackdropResult;
use crate::lifecycle::Renderer;
use crate::sim::ParticleStore;
use crate::viewport::ViewportState;

const BACKGROUND: Color = Color::from_rgb(2, 6, 18);

// Twinkle
const PULSE_RATE: f64 = 0.0013;
const TWINKLE_BASE: f32 = 0.82;
const TWINKLE_AMP: f32 = 0.18;
const MIN_INTENSITY: f32 = 0.08;

// Size
const SIZE_SCALE: f32 = 3.2;
const MIN_SIZE: f32 = 0.45;
const GLOW_RADIUS_SCALE: f32 = 3.2;

// Color (saturation, lightness)
const CORE_SL: (f32, f32) = (92.0, 88.0);
const GLOW_SL: (f32, f32) = (100.0, 68.0);
const GLOW_ALPHA_SCALE: f32 = 0.48;
const GLOW_ALPHA_MAX: f32 = 0.85;

pub struct StarField<C: Canvas2d> {
    config: StarFieldConfig,
    canvas: C,
    store: ParticleStore,
    viewport: ViewportState,
    frames_drawn: u64,
    disposed: bool,
}

impl<C: Canvas2d> StarField<C> {
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn config(&self) -> &StarFieldConfig {
        &self.config
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn draw(&mut self, time_ms: f64) {
        let vp = self.viewport;
        let hue = self.config.hue;
        let pulse = time_ms * PULSE_RATE * self.config.twinkle_intensity as f64;

        self.canvas.clear();
        if !self.config.transparent {
            self.canvas.fill(BACKGROUND);
        }

        for (i, p) in self.store.particles().iter().enumerate() {
            // just sent back to the far plane; shows up from the next frame
            if self.store.was_recycled(i) {
                continue;
            }
            let proj = p.project(&vp);
            let wave = (pulse + p.twinkle_phase as f64).sin() as f32;
            let twinkle = TWINKLE_BASE + TWINKLE_AMP * wave;
            let intensity = (p.alpha * twinkle).max(MIN_INTENSITY);
            let size = (proj.scale * SIZE_SCALE).max(MIN_SIZE);

            let glow_alpha = (intensity * GLOW_ALPHA_SCALE).min(GLOW_ALPHA_MAX);
            let glow = Hsla::new(hue, GLOW_SL.0, GLOW_SL.1, glow_alpha);
            self.canvas.glow(proj.x, proj.y, size * GLOW_RADIUS_SCALE, glow);

            let core = Hsla::new(hue, CORE_SL.0, CORE_SL.1, intensity.min(1.0));
            self.canvas.disc(proj.x, proj.y, size, core);
        }
    }
}

impl<C: Canvas2d> Renderer for StarField<C> {
    type Config = StarFieldConfig;
    type Backend = C;

    fn initialize(
        config: StarFieldConfig,
        mut canvas: C,
        viewport: ViewportState,
    ) -> BackdropResult<Self> {
        if let Err(e) = config.validate() {
            canvas.detach();
            return Err(e);
        }
        canvas.set_size(viewport.width, viewport.height);

        let mut store = ParticleStore::new(config.max_stars, config.brightness, config.seed);
        store.initialize(&viewport);
        log::debug!("star field: {} particles, spread {:.0}", store.len(), store.spread());

        Ok(Self { config, canvas, store, viewport, frames_drawn: 0, disposed: false })
    }

    fn tick(&mut self, frame: Frame) {
        if self.config.paused || self.disposed {
            return;
        }
        self.store.advance(self.config.speed_multiplier);
        self.store.recycle_escaped(&self.viewport);
        self.draw(frame.time_ms);
        self.frames_drawn += 1;
    }

    fn on_resize(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
        self.canvas.set_size(viewport.width, viewport.height);
        match self.config.resize_policy {
            ResizePolicy::Reseed => self.store.initialize(&viewport),
            ResizePolicy::Rescale => self.store.rescale(&viewport),
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.canvas.detach();
    }
}
