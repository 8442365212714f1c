use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::random::RandomSource;

/// Production random source.
pub struct ChaChaSource(ChaCha8Rng);

impl ChaChaSource {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for ChaChaSource {
    fn pick_index(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }
}
