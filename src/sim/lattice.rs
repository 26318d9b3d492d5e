// lattice.rs - Wave-grid index space
//
// Topology is fixed at construction. Heights are a pure function of
// (ix, iy, t), recomputed every frame; nothing accumulates between frames.
//
// Buffers are (amount_x, amount_y, 3) in standard layout, so the flat slice
// is ix-major and ready for upload as xyz triples.

use crate::color::Color;
use ndarray::{Array3, Axis};

/// Time advance per frame at speed 1.0.
pub const WAVE_STEP: f32 = 0.048;

const X_FREQ: f32 = 0.22;
const X_AMP: f32 = 34.0;
const Y_FREQ: f32 = 0.38;
const Y_AMP: f32 = 36.0;
const Y_RATE: f32 = 1.05;

/// Height of lattice point (ix, iy) at time `t`.
#[inline]
pub fn displacement(ix: usize, iy: usize, t: f32) -> f32 {
    ((ix as f32 + t) * X_FREQ).sin() * X_AMP + ((iy as f32 + t * Y_RATE) * Y_FREQ).sin() * Y_AMP
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    amount_x: usize,
    amount_y: usize,
    separation: f32,
}

impl Lattice {
    pub fn new(amount_x: usize, amount_y: usize, separation: f32) -> Self {
        Self { amount_x, amount_y, separation }
    }

    pub fn amount_x(&self) -> usize {
        self.amount_x
    }

    pub fn amount_y(&self) -> usize {
        self.amount_y
    }

    pub fn len(&self) -> usize {
        self.amount_x * self.amount_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World x/z of a lattice point; the grid is centered on the origin.
    #[inline]
    pub fn rest_xz(&self, ix: usize, iy: usize) -> (f32, f32) {
        let half_x = self.amount_x as f32 * self.separation / 2.0;
        let half_z = self.amount_y as f32 * self.separation / 2.0;
        (ix as f32 * self.separation - half_x, iy as f32 * self.separation - half_z)
    }

    /// Flat (y = 0) positions.
    pub fn rest_positions(&self) -> Array3<f32> {
        Array3::from_shape_fn((self.amount_x, self.amount_y, 3), |(ix, iy, c)| {
            let (x, z) = self.rest_xz(ix, iy);
            match c {
                0 => x,
                1 => 0.0,
                _ => z,
            }
        })
    }

    /// Uniform tint, one rgb triple per point.
    pub fn colors(&self, color: Color) -> Array3<f32> {
        let rgb = color.to_unit();
        Array3::from_shape_fn((self.amount_x, self.amount_y, 3), |(_, _, c)| rgb[c])
    }

    /// Overwrite every point's y for time `t`; x and z are untouched.
    pub fn displace(&self, positions: &mut Array3<f32>, t: f32) {
        for ((ix, iy), y) in positions.index_axis_mut(Axis(2), 1).indexed_iter_mut() {
            *y = displacement(ix, iy, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_positions_are_centered() {
        let l = Lattice::new(4, 2, 10.0);
        let p = l.rest_positions();
        assert_eq!(p.shape(), &[4, 2, 3]);
        assert_eq!(p[[0, 0, 0]], -20.0);
        assert_eq!(p[[0, 0, 2]], -10.0);
        assert_eq!(p[[3, 1, 0]], 10.0);
        assert_eq!(p[[3, 1, 2]], 0.0);
        assert!(p.index_axis(Axis(2), 1).iter().all(|&y| y == 0.0));
    }

    #[test]
    fn flat_slice_is_ix_major() {
        let l = Lattice::new(3, 5, 1.0);
        let p = l.rest_positions();
        let flat = p.as_slice().unwrap();
        // point index ix * amount_y + iy
        let i = 2 * 5 + 4;
        let (x, z) = l.rest_xz(2, 4);
        assert_eq!(&flat[i * 3..i * 3 + 3], &[x, 0.0, z]);
    }

    #[test]
    fn displace_only_writes_heights() {
        let l = Lattice::new(6, 7, 132.0);
        let rest = l.rest_positions();
        let mut p = rest.clone();
        l.displace(&mut p, 3.5);
        for ix in 0..6 {
            for iy in 0..7 {
                assert_eq!(p[[ix, iy, 0]], rest[[ix, iy, 0]]);
                assert_eq!(p[[ix, iy, 2]], rest[[ix, iy, 2]]);
                assert_eq!(p[[ix, iy, 1]], displacement(ix, iy, 3.5));
            }
        }
    }

    #[test]
    fn heights_do_not_accumulate() {
        let l = Lattice::new(5, 5, 1.0);
        let mut a = l.rest_positions();
        let mut b = l.rest_positions();
        l.displace(&mut a, 1.0);
        l.displace(&mut a, 9.0);
        l.displace(&mut a, 2.0);
        l.displace(&mut b, 2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn displacement_is_bounded() {
        for ix in 0..40 {
            for iy in 0..56 {
                assert!(displacement(ix, iy, ix as f32 * 0.7).abs() <= X_AMP + Y_AMP);
            }
        }
    }

    #[test]
    fn colors_are_uniform() {
        let l = Lattice::new(2, 3, 1.0);
        let c = l.colors(Color::from_rgb(255, 0, 51));
        assert_eq!(c.as_slice().unwrap().chunks(3).count(), 6);
        assert!(c.as_slice().unwrap().chunks(3).all(|rgb| rgb == [1.0, 0.0, 0.2]));
    }
}
