// sim/ - Backdrop simulations
//
// Pure state, no drawing. Each renderer owns exactly one of these and
// mutates it only from its frame callback.

pub mod lattice;
pub mod stars;

pub use lattice::{Lattice, WAVE_STEP, displacement};
pub use stars::{MAX_DEPTH, Particle, ParticleStore, Projection, ResetStats};
