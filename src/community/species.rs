use thiserror::Error;

use crate::community::community_params::SpeciesParams;
use crate::community::genome::Genome;
use crate::community::recombination;
use crate::random::Random;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeciesError {
    #[error("species {0} has no members")]
    Empty(usize),
}

/// A cluster of genomes close to a representative.
///
/// Members are indices into the community's population, the species never
/// owns the genomes it groups. The representative is a copy and stays fixed
/// for the whole generation.
#[derive(Clone, Debug)]
pub struct Species {
    id: usize,
    representative: Genome,
    members: Vec<usize>,
}

impl Species {
    pub fn new(id: usize, representative: Genome) -> Species {
        Species {
            id,
            representative,
            members: Vec::new(),
        }
    }

    /// Same species with a new representative and no members yet.
    pub fn reset(&self, representative: Genome) -> Species {
        Species::new(self.id, representative)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn add_member(&mut self, index: usize) {
        self.members.push(index);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The member genomes, looked up in `population`.
    pub fn genomes<'a>(&'a self, population: &'a [Genome]) -> impl Iterator<Item = &'a Genome> + 'a {
        self.members.iter().filter_map(move |&i| population.get(i))
    }

    /// Compatibility distance between the representative and `genome`.
    ///
    /// The disjoint term is divided by the longer gene count minus
    /// `min_normal`, floored at 1, so small genomes are compared unnormalized.
    /// Genomes sharing no innovation are infinitely far apart.
    pub fn distance(&self, genome: &Genome, params: &SpeciesParams) -> f64 {
        let components = recombination::raw_incompatibility(&self.representative, genome);

        let length = self.representative.genes().len().max(genome.genes().len());
        let normalizer = length.saturating_sub(params.min_normal).max(1) as f64;

        params.disjoint_imp * components.disjoint as f64 / normalizer
            + params.weight_imp * components.mean_weight_diff
    }

    /// Member with the highest fitness; the earliest one wins a tie.
    pub fn best<'a>(&self, population: &'a [Genome]) -> Result<&'a Genome, SpeciesError> {
        self.members
            .iter()
            .filter_map(|&i| population.get(i))
            .reduce(|best, genome| {
                if genome.fitness() > best.fitness() {
                    genome
                } else {
                    best
                }
            })
            .ok_or(SpeciesError::Empty(self.id))
    }

    /// Mean member fitness, 0 for an empty species.
    pub fn mean_fitness(&self, population: &[Genome]) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }

        let sum: f64 = self.genomes(population).map(|genome| genome.fitness()).sum();
        sum / self.members.len() as f64
    }

    /// A uniformly random member.
    pub fn random_member<'a, R: Random + ?Sized>(
        &self,
        population: &'a [Genome],
        rng: &mut R,
    ) -> Result<&'a Genome, SpeciesError> {
        if self.members.is_empty() {
            return Err(SpeciesError::Empty(self.id));
        }

        let i = self.members[rng.uniform_int(self.members.len())];
        population.get(i).ok_or(SpeciesError::Empty(self.id))
    }
}
