//! The primitive draws the evolutionary engine is built on.
//!
//! Every operation that needs randomness takes a `&mut R` where `R: Random`.
//! Any `rand::Rng` already is one, so a seeded generator such as
//! `rand_chacha::ChaCha8Rng` makes a whole run reproducible.

use rand::Rng;
use rand_distr::StandardNormal;

pub trait Random {
    /// Uniform real in `[0, range)`.
    fn uniform(&mut self, range: f64) -> f64;

    /// Uniform integer in `[0, range)`. `range` must be positive.
    fn uniform_int(&mut self, range: usize) -> usize;

    /// `true` with probability `p`.
    fn bool(&mut self, p: f64) -> bool;

    /// Zero-mean gaussian deviate with standard deviation `sd`.
    fn normal(&mut self, sd: f64) -> f64;
}

impl<R: Rng + ?Sized> Random for R {
    fn uniform(&mut self, range: f64) -> f64 {
        self.gen::<f64>() * range
    }

    fn uniform_int(&mut self, range: usize) -> usize {
        self.gen_range(0..range)
    }

    fn bool(&mut self, p: f64) -> bool {
        self.gen::<f64>() < p
    }

    fn normal(&mut self, sd: f64) -> f64 {
        let deviate: f64 = self.sample(StandardNormal);
        deviate * sd
    }
}
