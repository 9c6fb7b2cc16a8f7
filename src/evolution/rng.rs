//! Seedable random number generator shared by every operator in a run.

use rand::prelude::*;

/// Random number generator wrapper for evolutionary operators.
///
/// One instance drives selection draws, crossover coin-flips and cut points,
/// and mutation draws for a whole run, so a fixed seed reproduces the run.
#[derive(Debug, Clone)]
pub struct EvolutionRng {
    rng: StdRng,
}

impl EvolutionRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Returns `true` with probability `p`.
    ///
    /// Draws a uniform `[0, 1)` sample and compares with `<`, so `p = 0.0`
    /// never fires and `p = 1.0` always does.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.r#gen::<f64>() < p
    }

    /// Draw a seed for an independent generator, such as the one that
    /// builds an initial population ahead of a seeded run.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

impl RngCore for EvolutionRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
