use thiserror::Error;

use crate::community::community_params::{CommunityParams, GenomeParams};
use crate::community::genome::Genome;
use crate::community::innovation_tracker::InnovationTracker;
use crate::community::species::{Species, SpeciesError};
use crate::random::Random;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("cannot select from an empty set")]
    Empty,
    /// Fitness is never negative, so a negative or non-finite weight means
    /// something upstream scored a genome wrongly.
    #[error("item {index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
    /// The running sum never passed the drawn threshold.
    #[error("cumulative weight never exceeded {threshold} (sum {sum})")]
    Exhausted { sum: f64, threshold: f64 },
    #[error(transparent)]
    Species(#[from] SpeciesError),
}

/// Fitness-proportionate sampler over borrowed items.
///
/// Weights are read once on construction and must be finite and
/// non-negative. With a zero sum every item is equally likely.
pub struct Selector<'a, T> {
    items: Vec<&'a T>,
    weights: Vec<f64>,
    sum: f64,
}

impl<'a, T> Selector<'a, T> {
    pub fn new<I, F>(items: I, weight: F) -> Selector<'a, T>
    where
        I: IntoIterator<Item = &'a T>,
        F: Fn(&T) -> f64,
    {
        let items: Vec<&'a T> = items.into_iter().collect();
        let weights: Vec<f64> = items.iter().map(|item| weight(item)).collect();
        let sum = weights.iter().sum();

        Selector {
            items,
            weights,
            sum,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Returns the first item whose running weight is strictly greater than
    /// a uniform draw in `[0, sum)`, so zero-weight items are never picked
    /// unless every weight is zero.
    pub fn next<R: Random + ?Sized>(&self, rng: &mut R) -> Result<&'a T, SelectionError> {
        if self.items.is_empty() {
            return Err(SelectionError::Empty);
        }
        if let Some((index, &weight)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(SelectionError::InvalidWeight { index, weight });
        }
        if self.sum == 0.0 {
            return Ok(self.items[rng.uniform_int(self.items.len())]);
        }

        let r = rng.uniform(self.sum);
        let mut acc = 0.0;
        for (item, weight) in self.items.iter().zip(&self.weights) {
            acc += weight;
            if acc > r {
                return Ok(*item);
            }
        }

        Err(SelectionError::Exhausted {
            sum: self.sum,
            threshold: r,
        })
    }
}

/// Samples species by the mean fitness of their members.
pub fn species_selector<'a>(species: &'a [Species], population: &[Genome]) -> Selector<'a, Species> {
    Selector::new(species, |s: &Species| s.mean_fitness(population))
}

/// Samples the members of one species by individual fitness.
pub fn genome_selector<'a>(species: &Species, population: &'a [Genome]) -> Selector<'a, Genome> {
    let members = species.members().iter().filter_map(|&i| population.get(i));
    Selector::new(members, |genome: &Genome| genome.fitness())
}

/// Produces one child of `species`.
///
/// With probability `no_crossover` a single fitness-weighted member is
/// copied. Otherwise two members are drawn and crossed, with the fitter one
/// as the base; on equal fitness the second draw is the base. The result is
/// always mutated.
pub fn breed<R: Random + ?Sized>(
    species: &Species,
    population: &[Genome],
    tracker: &mut InnovationTracker,
    rng: &mut R,
    community_params: &CommunityParams,
    genome_params: &GenomeParams,
) -> Result<Genome, SelectionError> {
    let selector = genome_selector(species, population);

    let child = if rng.bool(community_params.no_crossover) {
        selector.next(rng)?.clone()
    } else {
        let a = selector.next(rng)?;
        let b = selector.next(rng)?;
        if a.fitness() > b.fitness() {
            a.crossover(b, rng, genome_params)
        } else {
            b.crossover(a, rng, genome_params)
        }
    };

    Ok(child.mutate(tracker, rng, genome_params))
}
