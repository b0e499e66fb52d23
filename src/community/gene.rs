use std::fmt;

use crate::community::community_params::GenomeParams;
use crate::community::innovation_tracker::InnovationTracker;
use crate::random::Random;

/// One directed, weighted connection between two nodes of a genome.
///
/// Genes are values: every operation returns a new gene and leaves the
/// original untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gene {
    innovation: usize,
    from: usize,
    to: usize,
    weight: f64,
    enabled: bool,
}

impl Gene {
    /// An enabled gene with an explicit innovation number.
    pub fn new(innovation: usize, from: usize, to: usize, weight: f64) -> Gene {
        Gene {
            innovation,
            from,
            to,
            weight,
            enabled: true,
        }
    }

    /// An enabled gene numbered by the tracker.
    pub fn tracked(from: usize, to: usize, weight: f64, tracker: &mut InnovationTracker) -> Gene {
        Gene::new(tracker.innovation(from, to), from, to, weight)
    }

    pub fn innovation(&self) -> usize {
        self.innovation
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn endpoints(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    fn copy(&self, weight: f64, enabled: bool) -> Gene {
        Gene {
            weight,
            enabled,
            ..*self
        }
    }

    /// Either redraws the weight from a unit normal or shifts it by a small
    /// normal step.
    pub fn mutate<R: Random + ?Sized>(&self, rng: &mut R, params: &GenomeParams) -> Gene {
        let weight = if rng.bool(params.reset_weight_prob) {
            rng.normal(1.0)
        } else {
            self.weight + rng.normal(params.weight_mut_sd)
        };

        self.copy(weight, self.enabled)
    }

    /// Combines two genes sharing an innovation number. The weight comes from
    /// one parent or the other, never a blend.
    pub fn crossover<R: Random + ?Sized>(
        &self,
        other: &Gene,
        rng: &mut R,
        params: &GenomeParams,
    ) -> Gene {
        debug_assert_eq!(self.innovation, other.innovation);

        let weight = if rng.bool(0.5) { self.weight } else { other.weight };
        let enabled = (self.enabled && other.enabled) || rng.bool(params.enable_prob);

        self.copy(weight, enabled)
    }

    pub fn disable(&self) -> Gene {
        self.copy(self.weight, false)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}[{}->{}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.innovation,
            self.from,
            self.to,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
