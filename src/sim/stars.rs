// stars.rs - Star-field particle store
//
// Fixed-capacity array allocated once per renderer. Particles are recycled
// in place: crossing the near plane or drifting out of the projected
// viewport re-randomizes the record and sends it back to the far plane.

use crate::rng::Rng;
use crate::viewport::ViewportState;
use std::f32::consts::TAU;

pub const MAX_DEPTH: f32 = 1400.0;
pub const FOCAL_LENGTH: f32 = 320.0;
pub const BASE_Z_SPEED: f32 = 4.2;
pub const FRUSTUM_MARGIN: f32 = 20.0;

const MIN_SPAWN_Z: f32 = 40.0;
const NEAR_FRACTION: f32 = 0.35;
const SPREAD_FACTOR: f32 = 1.4;
const NEAR_SEED_STRIDE: usize = 8;
const ALPHA_MIN: f32 = 0.48;
// Depth floor for projection; also the near-plane recycle threshold.
const MIN_Z: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Depth in (0, MAX_DEPTH]
    pub z: f32,
    pub alpha: f32,
    pub twinkle_phase: f32,
}

/// Screen-space position and perspective scale of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Particle {
    #[inline]
    pub fn project(&self, viewport: &ViewportState) -> Projection {
        let scale = FOCAL_LENGTH / self.z.max(MIN_Z);
        Projection {
            x: self.x * scale + viewport.center_x,
            y: self.y * scale + viewport.center_y,
            scale,
        }
    }
}

impl Projection {
    #[inline]
    pub fn is_inside(&self, viewport: &ViewportState) -> bool {
        let (w, h) = (viewport.width as f32, viewport.height as f32);
        self.x >= -FRUSTUM_MARGIN
            && self.x <= w + FRUSTUM_MARGIN
            && self.y >= -FRUSTUM_MARGIN
            && self.y <= h + FRUSTUM_MARGIN
    }
}

/// Half-width of the square particles spawn in.
#[inline]
pub fn spread_for(viewport: &ViewportState) -> f32 {
    viewport.longest_side() * SPREAD_FACTOR
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetStats {
    /// Crossed the near plane.
    pub depth: u64,
    /// Left the viewport sideways.
    pub lateral: u64,
}

impl ResetStats {
    pub fn total(&self) -> u64 {
        self.depth + self.lateral
    }
}

pub struct ParticleStore {
    particles: Vec<Particle>,
    /// Set for particles recycled sideways by the last `recycle_escaped`.
    recycled: Vec<bool>,
    spread: f32,
    brightness: f32,
    rng: Rng,
    resets: ResetStats,
}

impl ParticleStore {
    pub fn new(count: usize, brightness: f32, seed: u32) -> Self {
        Self {
            particles: vec![Particle::default(); count],
            recycled: vec![false; count],
            spread: 0.0,
            brightness,
            rng: Rng::new(seed),
            resets: ResetStats::default(),
        }
    }

    /// Randomize every particle against `viewport`. Every 8th particle
    /// starts in the nearest third of the depth range so the field has
    /// depth from the first frame.
    pub fn initialize(&mut self, viewport: &ViewportState) {
        self.spread = spread_for(viewport);
        self.recycled.fill(false);
        for (i, p) in self.particles.iter_mut().enumerate() {
            let near = i % NEAR_SEED_STRIDE == 0;
            reset_particle(p, near, self.spread, self.brightness, &mut self.rng);
        }
    }

    pub fn reset_particle(&mut self, index: usize, near: bool) {
        if let Some(p) = self.particles.get_mut(index) {
            reset_particle(p, near, self.spread, self.brightness, &mut self.rng);
        }
    }

    /// Move every particle toward the camera by one frame's travel.
    pub fn advance(&mut self, speed: f32) {
        let dz = BASE_Z_SPEED * speed;
        for p in &mut self.particles {
            p.z -= dz;
            if p.z <= MIN_Z {
                reset_particle(p, true, self.spread, self.brightness, &mut self.rng);
                p.z = MAX_DEPTH;
                self.resets.depth += 1;
            }
        }
    }

    /// Recycle particles whose projection left the viewport plus margin.
    /// Returns how many were recycled; they are flagged until the next call.
    pub fn recycle_escaped(&mut self, viewport: &ViewportState) -> usize {
        let mut count = 0;
        for (p, flag) in self.particles.iter_mut().zip(&mut self.recycled) {
            *flag = !p.project(viewport).is_inside(viewport);
            if *flag {
                reset_particle(p, false, self.spread, self.brightness, &mut self.rng);
                p.z = MAX_DEPTH;
                count += 1;
            }
        }
        self.resets.lateral += count as u64;
        count
    }

    /// Whether particle `index` was recycled sideways by the last
    /// `recycle_escaped` call.
    pub fn was_recycled(&self, index: usize) -> bool {
        self.recycled.get(index).copied().unwrap_or(false)
    }

    /// Keep current particles, scaling lateral positions to the new spread.
    pub fn rescale(&mut self, viewport: &ViewportState) {
        let next = spread_for(viewport);
        if self.spread > 0.0 {
            let k = next / self.spread;
            for p in &mut self.particles {
                p.x *= k;
                p.y *= k;
            }
        }
        self.spread = next;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn spread(&self) -> f32 {
        self.spread
    }

    pub fn resets(&self) -> ResetStats {
        self.resets
    }
}

fn reset_particle(p: &mut Particle, near: bool, spread: f32, brightness: f32, rng: &mut Rng) {
    let far = if near { MAX_DEPTH * NEAR_FRACTION } else { MAX_DEPTH };
    p.x = rng.range(-spread, spread);
    p.y = rng.range(-spread, spread);
    p.z = rng.range(MIN_SPAWN_Z, far);
    p.alpha = rng.range(ALPHA_MIN, 1.0) * brightness;
    p.twinkle_phase = rng.range(0.0, TAU);
}
