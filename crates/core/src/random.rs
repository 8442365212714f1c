//! Randomness seam for the placement phases.
//!
//! Every random decision in a generation run goes through [`RandomSource`], so
//! a run can be made reproducible by swapping the source.

pub trait RandomSource {
    /// Returns an index in `0..n`. Callers never pass `n == 0`.
    fn pick_index(&mut self, n: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn pick_index(&mut self, n: usize) -> usize {
        (**self).pick_index(n)
    }
}

/// Always takes the first candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstPick;

impl RandomSource for FirstPick {
    fn pick_index(&mut self, _n: usize) -> usize {
        0
    }
}

/// Fisher-Yates shuffle driven by `rng`. Written out instead of
/// `SliceRandom::shuffle` so scripted sources can steer it through `pick_index`.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.pick_index(i + 1) % (i + 1);
        items.swap(i, j);
    }
}
