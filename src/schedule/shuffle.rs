//! Seeded shuffling for the main block
//!
//! The default strategy reproduces a small linear congruential generator
//! bit-for-bit, so a captured seed replays the exact presentation order of
//! earlier deployments. `ChaCha` is available for new studies that do not
//! need that compatibility.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::session::SessionSeed;

const LCG_MULTIPLIER: u64 = 9301;
const LCG_INCREMENT: u64 = 49297;
const LCG_MODULUS: u64 = 233_280;

/// `seed' = (seed * 9301 + 49297) mod 233280`, yielding `seed' / 233280`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u32) -> Self {
        Self {
            state: u64::from(seed),
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Uniform index in `0..bound`
    pub fn next_index(&mut self, bound: usize) -> usize {
        (self.next_f64() * bound as f64).floor() as usize
    }
}

/// Fisher-Yates from the last index down to 1, driven by [`SeededRandom`]
///
/// Returns a new vector; `items` is left untouched.
pub fn shuffle_with_seed<T: Clone>(items: &[T], seed: SessionSeed) -> Vec<T> {
    let mut rng = SeededRandom::new(seed.value());
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.next_index(i + 1);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Which generator orders the main block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuffleStrategy {
    /// Reproduces the legacy generator exactly
    #[default]
    Lcg,
    ChaCha,
}

impl ShuffleStrategy {
    pub fn shuffle<T: Clone>(self, items: &[T], seed: SessionSeed) -> Vec<T> {
        match self {
            ShuffleStrategy::Lcg => shuffle_with_seed(items, seed),
            ShuffleStrategy::ChaCha => {
                let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed.value()));
                let mut shuffled = items.to_vec();
                shuffled.shuffle(&mut rng);
                shuffled
            }
        }
    }
}
