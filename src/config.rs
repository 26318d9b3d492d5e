// config.rs - Construction-time renderer options
//
// Both configs are immutable snapshots. Changing any option means tearing
// the backdrop down and mounting a fresh one.
//
// Options arrive as camelCase JSON (the web layer stringifies the JS object);
// every field is optional.

use crate::color::Color;
use crate::error::{BackdropError, BackdropResult};
use serde::Deserialize;

/// Upper bounds on sizes that arrive from untrusted options.
pub const MAX_STARS: usize = 20_000;
pub const MAX_LATTICE_SIDE: usize = 1_024;
pub const MAX_LATTICE_POINTS: usize = 262_144;

/// What the star field does with its existing particles on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizePolicy {
    /// Re-randomize every particle against the new viewport.
    #[default]
    Reseed,
    /// Scale positions by the ratio of new to old spread.
    Rescale,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StarFieldConfig {
    /// Hue in degrees shared by glow and core.
    pub hue: f32,
    pub max_stars: usize,
    /// Multiplies each particle's base alpha.
    pub brightness: f32,
    pub speed_multiplier: f32,
    /// Scales twinkle oscillation frequency.
    pub twinkle_intensity: f32,
    /// Skip the opaque background fill.
    pub transparent: bool,
    pub paused: bool,
    pub resize_policy: ResizePolicy,
    pub seed: u32,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            hue: 217.0,
            max_stars: 900,
            brightness: 1.0,
            speed_multiplier: 1.0,
            twinkle_intensity: 18.0,
            transparent: false,
            paused: false,
            resize_policy: ResizePolicy::Reseed,
            seed: 0xDEADBEEF,
        }
    }
}

impl StarFieldConfig {
    pub fn from_json(json: &str) -> BackdropResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BackdropResult<()> {
        finite("hue", self.hue)?;
        if self.max_stars > MAX_STARS {
            return Err(BackdropError::InvalidConfig(format!(
                "maxStars must be <= {MAX_STARS}, got {}",
                self.max_stars
            )));
        }
        non_negative("brightness", self.brightness)?;
        non_negative("speedMultiplier", self.speed_multiplier)?;
        non_negative("twinkleIntensity", self.twinkle_intensity)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WaveGridConfig {
    pub point_color: Color,
    pub amount_x: usize,
    pub amount_y: usize,
    /// World-space distance between neighbouring lattice points.
    pub separation: f32,
    /// Scales the per-frame time step.
    pub speed_multiplier: f32,
    /// Add the dimmer, offset second layer.
    pub parallax: bool,
    pub fog: bool,
    pub paused: bool,
}

impl Default for WaveGridConfig {
    fn default() -> Self {
        Self {
            point_color: Color::from_u32(0xdbe7ff),
            amount_x: 40,
            amount_y: 56,
            separation: 132.0,
            speed_multiplier: 1.0,
            parallax: true,
            fog: true,
            paused: false,
        }
    }
}

impl WaveGridConfig {
    pub fn from_json(json: &str) -> BackdropResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BackdropResult<()> {
        if self.amount_x == 0 || self.amount_y == 0 {
            return Err(BackdropError::InvalidConfig(format!(
                "lattice must be non-empty, got {}x{}",
                self.amount_x, self.amount_y
            )));
        }
        let points = self.amount_x.checked_mul(self.amount_y);
        if self.amount_x > MAX_LATTICE_SIDE
            || self.amount_y > MAX_LATTICE_SIDE
            || points.is_none_or(|n| n > MAX_LATTICE_POINTS)
        {
            return Err(BackdropError::InvalidConfig(format!(
                "lattice {}x{} exceeds {MAX_LATTICE_SIDE} per side or {MAX_LATTICE_POINTS} points",
                self.amount_x, self.amount_y
            )));
        }
        non_negative("speedMultiplier", self.speed_multiplier)?;
        if !(self.separation.is_finite() && self.separation > 0.0) {
            return Err(BackdropError::InvalidConfig(format!(
                "separation must be positive, got {}",
                self.separation
            )));
        }
        Ok(())
    }
}

fn finite(name: &str, v: f32) -> BackdropResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(BackdropError::InvalidConfig(format!("{name} must be finite, got {v}")))
    }
}

fn non_negative(name: &str, v: f32) -> BackdropResult<()> {
    finite(name, v)?;
    if v < 0.0 {
        return Err(BackdropError::InvalidConfig(format!("{name} must be >= 0, got {v}")));
    }
    Ok(())
}
