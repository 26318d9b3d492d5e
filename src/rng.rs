// rng.rs - Seeded xorshift32
//
// Each renderer owns its own generator so instances never share state and
// tests can replay a run from the seed.

#[derive(Debug, Clone)]
pub struct Rng(u32);

impl Rng {
    pub fn new(seed: u32) -> Self {
        // xorshift never leaves the all-zero state
        Self(if seed == 0 { 0xDEADBEEF } else { seed })
    }

    /// Uniform in [0, 1)
    #[inline(always)]
    pub fn next_f32(&mut self) -> f32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        (self.0 >> 8) as f32 * (1.0 / 16777216.0)
    }

    /// Uniform in [min, max)
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}
