//! A thin, seedable random source shared by the cut-dedup hashing and the heuristics.

use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct Random {
    rng: SmallRng,
}

impl Random {
    pub fn with_seed(seed: u64) -> Self {
        Random {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }

    pub fn next_usize_below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    /// A fixed-length vector of pseudo-random coefficients in `[-1, 1]`, used as the
    /// projection vector for the duplicate-cut hash. Deterministic given `(seed, dimension)`
    /// so two separately constructed generators hash equivalent cuts identically.
    pub fn projection_vector(seed: u64, dimension: usize) -> Vec<f64> {
        let mut random = Random::with_seed(seed);
        (0..dimension).map(|_| random.next_f64()).collect()
    }
}

impl Default for Random {
    fn default() -> Self {
        Random::with_seed(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_vector_is_deterministic() {
        let a = Random::projection_vector(42, 5);
        let b = Random::projection_vector(42, 5);
        assert_eq!(a, b);
    }
}
