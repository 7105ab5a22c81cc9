//! Stateless, seed-keyed orderings of catalog listings

use rand::{RngExt, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Rotate `items` left by `seed % len`
pub fn rotate<T>(items: &mut [T], seed: u64) {
    if items.is_empty() {
        return;
    }
    // len fits in u64 on every supported target
    let shift = (seed % items.len() as u64) as usize;
    items.rotate_left(shift);
}

/// Shuffle `items` with an RNG seeded from `seed`; equal seeds give equal orderings
pub fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// A fresh seed for callers that did not supply one
#[must_use]
pub fn fresh_seed() -> u64 {
    rand::rng().random()
}
