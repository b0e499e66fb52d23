pub mod community_params;
pub mod gene;
pub mod genome;
pub mod innovation_tracker;
pub mod mutation;
pub mod recombination;
pub mod selection;
pub mod species;

use thiserror::Error;
use tracing::debug;

use crate::community::community_params::{CommunityParams, GenomeParams, SpeciesParams};
use crate::community::genome::{Genome, GenomeError};
use crate::community::innovation_tracker::InnovationTracker;
use crate::community::selection::{breed, species_selector, SelectionError};
use crate::community::species::{Species, SpeciesError};
use crate::random::Random;
use crate::NeatParams;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommunityError {
    #[error("a community needs at least one genome")]
    EmptyPopulation,
    #[error("genome {index} has {inputs} inputs and {outputs} outputs, expected {expected_inputs} and {expected_outputs}")]
    LayoutMismatch {
        index: usize,
        inputs: usize,
        outputs: usize,
        expected_inputs: usize,
        expected_outputs: usize,
    },
    #[error("no genome at index {index}, population has {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Genome(#[from] GenomeError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Species(#[from] SpeciesError),
}

/// The evolution engine: a fixed-size population grouped into species.
///
/// After construction and after every call to [`Community::next`] the host
/// is expected to score every genome, e.g. with
/// [`Community::evaluate_fitness`], before asking for the next generation.
#[derive(Clone, Debug)]
pub struct Community {
    population: Vec<Genome>,
    species: Vec<Species>,
    tracker: InnovationTracker,
    generation: usize,
    next_species_id: usize,
    params: CommunityParams,
    species_params: SpeciesParams,
    genome_params: GenomeParams,
}

impl Community {
    /// `size` minimal genomes with default parameters.
    pub fn new<R: Random + ?Sized>(
        inputs: usize,
        outputs: usize,
        size: usize,
        rng: &mut R,
    ) -> Result<Community, CommunityError> {
        let mut params = NeatParams::new(inputs, outputs);
        params.num_individuals = size;

        Self::from_params(&params, rng)
    }

    pub fn from_params<R: Random + ?Sized>(
        params: &NeatParams,
        rng: &mut R,
    ) -> Result<Community, CommunityError> {
        if params.num_individuals == 0 {
            return Err(CommunityError::EmptyPopulation);
        }

        let mut tracker = InnovationTracker::new();
        let mut population = Vec::with_capacity(params.num_individuals);
        for _ in 0..params.num_individuals {
            population.push(Genome::init(
                params.num_inputs,
                params.num_outputs,
                &mut tracker,
                rng,
            )?);
        }

        Ok(Self::assemble(population, tracker, params))
    }

    /// Seeds the community with existing genomes. Every genome must have the
    /// `num_inputs` and `num_outputs` of `params`. The population size is the
    /// number of genomes, `params.num_individuals` is not used.
    pub fn from_genomes(genomes: Vec<Genome>, params: &NeatParams) -> Result<Community, CommunityError> {
        if genomes.is_empty() {
            return Err(CommunityError::EmptyPopulation);
        }

        for (index, genome) in genomes.iter().enumerate() {
            if genome.inputs() != params.num_inputs || genome.outputs() != params.num_outputs {
                return Err(CommunityError::LayoutMismatch {
                    index,
                    inputs: genome.inputs(),
                    outputs: genome.outputs(),
                    expected_inputs: params.num_inputs,
                    expected_outputs: params.num_outputs,
                });
            }
        }

        // find the highest innovation number
        let next_innovation = genomes
            .iter()
            .flat_map(|genome| genome.genes())
            .map(|gene| gene.innovation() + 1)
            .max()
            .unwrap_or(0);

        Ok(Self::assemble(
            genomes,
            InnovationTracker::starting_at(next_innovation),
            params,
        ))
    }

    fn assemble(population: Vec<Genome>, tracker: InnovationTracker, params: &NeatParams) -> Community {
        let mut community = Community {
            population,
            species: Vec::new(),
            tracker,
            generation: 0,
            next_species_id: 0,
            params: params.community.clone(),
            species_params: params.species.clone(),
            genome_params: params.genome.clone(),
        };
        community.identify_species();

        community
    }

    /// Moves to the next generation: elitism, reproduction, re-speciation and
    /// a fresh innovation history.
    ///
    /// On error the community is left as it was, innovation history included.
    pub fn next<R: Random + ?Sized>(&mut self, rng: &mut R) -> Result<(), CommunityError> {
        let checkpoint = self.tracker.clone();
        let (next_population, representatives, elites) = match self.reproduce(rng) {
            Ok(next) => next,
            Err(e) => {
                self.tracker = checkpoint;
                return Err(e);
            }
        };

        self.population = next_population;
        self.species = self
            .species
            .iter()
            .zip(representatives)
            .map(|(old, representative)| old.reset(representative))
            .collect();
        self.identify_species();

        let innovations = self.tracker.len();
        self.tracker.clear();
        self.generation += 1;

        debug!(
            generation = self.generation,
            elites,
            species = self.species.len(),
            innovations,
            "advanced generation"
        );

        Ok(())
    }

    // builds the next population and picks the representatives for the
    // current species, touching nothing but the tracker
    fn reproduce<R: Random + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(Vec<Genome>, Vec<Genome>, usize), CommunityError> {
        let size = self.population.len();
        let mut next_population = Vec::with_capacity(size);

        // copy the champions of large enough species
        for species in &self.species {
            if species.len() > self.params.min_copy_best {
                next_population.push(species.best(&self.population)?.clone());
            }
        }
        let elites = next_population.len();

        let selector = species_selector(&self.species, &self.population);
        while next_population.len() < size {
            let species = selector.next(rng)?;
            next_population.push(breed(
                species,
                &self.population,
                &mut self.tracker,
                rng,
                &self.params,
                &self.genome_params,
            )?);
        }

        // representatives come from the generation being replaced
        let mut representatives = Vec::with_capacity(self.species.len());
        for old in &self.species {
            let representative = if self.params.resample_representative {
                old.random_member(&self.population, rng)?.clone()
            } else {
                old.representative().clone()
            };
            representatives.push(representative);
        }

        Ok((next_population, representatives, elites))
    }

    // assigns each genome to the first species close enough to it, creating
    // species as needed, then drops species nobody joined
    fn identify_species(&mut self) {
        for (i, genome) in self.population.iter().enumerate() {
            let compatible = self.species.iter_mut().find(|species| {
                species.distance(genome, &self.species_params) < self.params.species_thresh
            });

            match compatible {
                Some(species) => species.add_member(i),
                None => {
                    let mut new_species = Species::new(self.next_species_id, genome.clone());
                    new_species.add_member(i);
                    self.species.push(new_species);
                    self.next_species_id += 1;
                }
            }
        }

        self.species.retain(|species| !species.is_empty());
    }

    /// The fittest genome of the population; the earliest one wins a tie.
    pub fn best(&self) -> Result<&Genome, CommunityError> {
        self.population
            .iter()
            .reduce(|best, genome| {
                if genome.fitness() > best.fitness() {
                    genome
                } else {
                    best
                }
            })
            .ok_or(CommunityError::EmptyPopulation)
    }

    /// Scores every genome with `fitness`.
    pub fn evaluate_fitness<F>(&mut self, mut fitness: F)
    where
        F: FnMut(&Genome) -> f64,
    {
        for genome in &mut self.population {
            let score = fitness(genome);
            genome.set_fitness(score);
        }
    }

    pub fn set_fitness(&mut self, index: usize, fitness: f64) -> Result<(), CommunityError> {
        let len = self.population.len();
        let genome = self
            .population
            .get_mut(index)
            .ok_or(CommunityError::IndexOutOfRange { index, len })?;
        genome.set_fitness(fitness);

        Ok(())
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    /// Mutable access for scoring. Species refer to genomes by index, so
    /// genomes should not be reordered.
    pub fn population_mut(&mut self) -> &mut [Genome] {
        &mut self.population
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn tracker(&self) -> &InnovationTracker {
        &self.tracker
    }

    pub fn params(&self) -> &CommunityParams {
        &self.params
    }

    pub fn species_params(&self) -> &SpeciesParams {
        &self.species_params
    }

    pub fn genome_params(&self) -> &GenomeParams {
        &self.genome_params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::gene::Gene;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    #[fixture]
    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2024)
    }

    fn assert_partition(comm: &Community) {
        let mut seen = vec![0; comm.population().len()];
        for species in comm.species() {
            assert!(!species.is_empty());
            for &i in species.members() {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    // 1 input, bias 1, output 2; every genome shares innovation 0
    fn kin(fitness: &[f64]) -> Vec<Genome> {
        fitness
            .iter()
            .map(|&f| {
                let mut genome = Genome::from_genes(1, 1, 3, vec![Gene::new(0, 0, 2, 1.0)]).unwrap();
                genome.set_fitness(f);
                genome
            })
            .collect()
    }

    #[rstest]
    fn test_new(mut rng: ChaCha8Rng) {
        let comm = Community::new(2, 1, 30, &mut rng).unwrap();

        assert_eq!(comm.population().len(), 30);
        assert_eq!(comm.generation(), 0);
        assert!(!comm.species().is_empty());
        assert_partition(&comm);
        for genome in comm.population() {
            assert_eq!(genome.genes().len(), 1);
            assert_eq!(genome.nodes(), 4);
        }
    }

    #[rstest]
    fn test_new_errors(mut rng: ChaCha8Rng) {
        assert_eq!(
            Community::new(2, 1, 0, &mut rng).unwrap_err(),
            CommunityError::EmptyPopulation
        );
        assert_eq!(
            Community::new(2, 0, 5, &mut rng).unwrap_err(),
            CommunityError::Genome(GenomeError::NoOutputs)
        );
    }

    #[rstest]
    fn test_from_genomes(mut rng: ChaCha8Rng) {
        let mut genomes = kin(&[1.0, 2.0]);
        genomes.push(Genome::init(2, 1, &mut InnovationTracker::new(), &mut rng).unwrap());

        let err = Community::from_genomes(genomes, &NeatParams::new(1, 1)).unwrap_err();
        assert!(matches!(err, CommunityError::LayoutMismatch { index: 2, .. }));
        assert_eq!(
            Community::from_genomes(Vec::new(), &NeatParams::new(1, 1)).unwrap_err(),
            CommunityError::EmptyPopulation
        );

        let comm = Community::from_genomes(kin(&[1.0, 2.0, 3.0]), &NeatParams::new(1, 1)).unwrap();
        assert_eq!(comm.species().len(), 1);
        assert_eq!(comm.population().len(), 3);
        assert_eq!(comm.tracker().next_innovation(), 1);
    }

    #[rstest]
    #[case(2, 1)]
    #[case(1, 2)]
    fn test_from_genomes_checks_params_layout(#[case] inputs: usize, #[case] outputs: usize) {
        let err = Community::from_genomes(kin(&[1.0, 2.0]), &NeatParams::new(inputs, outputs)).unwrap_err();

        assert_eq!(
            err,
            CommunityError::LayoutMismatch {
                index: 0,
                inputs: 1,
                outputs: 1,
                expected_inputs: inputs,
                expected_outputs: outputs,
            }
        );
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    fn test_failed_next_changes_nothing(#[case] seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut params = NeatParams::new(1, 1);
        params.genome = GenomeParams::get_test_params();
        params.genome.connect_prob = 1.0;

        // a healthy species and one holding a negatively scored genome, both
        // with mean fitness 1 and no genes in common
        let mut genomes = kin(&[1.0; 15]);
        for fitness in [-1.0, 3.0] {
            let mut genome = Genome::from_genes(1, 1, 3, vec![Gene::new(5, 1, 2, 1.0)]).unwrap();
            genome.set_fitness(fitness);
            genomes.push(genome);
        }
        let mut comm = Community::from_genomes(genomes, &params).unwrap();
        assert_eq!(comm.species().len(), 2);

        let population = comm.population().to_vec();
        let next_innovation = comm.tracker().next_innovation();

        assert!(matches!(
            comm.next(&mut rng),
            Err(CommunityError::Selection(SelectionError::InvalidWeight { .. }))
        ));
        assert_eq!(comm.population(), population.as_slice());
        assert_eq!(comm.generation(), 0);
        assert!(comm.tracker().is_empty());
        assert_eq!(comm.tracker().next_innovation(), next_innovation);
    }

    #[rstest]
    fn test_next_keeps_size_and_clears_history(mut rng: ChaCha8Rng) {
        let mut comm = Community::new(2, 1, 25, &mut rng).unwrap();

        for generation in 1..=5 {
            comm.evaluate_fitness(|genome| genome.genes().len() as f64);
            comm.next(&mut rng).unwrap();

            assert_eq!(comm.generation(), generation);
            assert_eq!(comm.population().len(), 25);
            assert!(comm.tracker().is_empty());
            assert_partition(&comm);
        }
    }

    #[rstest]
    fn test_elitism(mut rng: ChaCha8Rng) {
        let mut params = NeatParams::new(1, 1);
        params.community.min_copy_best = 1;
        let mut comm = Community::from_genomes(kin(&[1.0, 5.0, 2.0, 0.5]), &params).unwrap();
        let champion = comm.best().unwrap().clone();
        assert_eq!(champion.fitness(), 5.0);

        comm.next(&mut rng).unwrap();

        assert_eq!(comm.population()[0], champion);
    }

    #[rstest]
    fn test_small_species_not_copied(mut rng: ChaCha8Rng) {
        let mut params = NeatParams::new(1, 1);
        params.community.min_copy_best = 4;
        params.genome = GenomeParams::get_test_params();
        let mut comm = Community::from_genomes(kin(&[1.0, 5.0, 2.0, 0.5]), &params).unwrap();

        comm.next(&mut rng).unwrap();

        // children are always fresh, fitness included
        assert!(comm.population().iter().all(|genome| genome.fitness() == 0.0));
    }

    #[rstest]
    fn test_keep_representative(mut rng: ChaCha8Rng) {
        let mut params = NeatParams::new(2, 2);
        params.num_individuals = 20;
        params.community.resample_representative = false;
        let mut comm = Community::from_params(&params, &mut rng).unwrap();
        let before: Vec<(usize, Genome)> = comm
            .species()
            .iter()
            .map(|s| (s.id(), s.representative().clone()))
            .collect();

        comm.evaluate_fitness(|_| 1.0);
        comm.next(&mut rng).unwrap();

        for species in comm.species() {
            if let Some((_, representative)) = before.iter().find(|(id, _)| *id == species.id()) {
                assert_eq!(species.representative(), representative);
            }
        }
    }

    #[rstest]
    fn test_best_and_set_fitness(mut rng: ChaCha8Rng) {
        let mut comm = Community::new(1, 1, 4, &mut rng).unwrap();

        comm.set_fitness(2, 3.0).unwrap();
        comm.set_fitness(3, 3.0).unwrap();
        assert!(std::ptr::eq(comm.best().unwrap(), &comm.population()[2]));
        assert_eq!(
            comm.set_fitness(4, 1.0),
            Err(CommunityError::IndexOutOfRange { index: 4, len: 4 })
        );

        comm.population_mut()[0].set_fitness(7.0);
        assert_eq!(comm.best().unwrap().fitness(), 7.0);
    }

    #[rstest]
    fn test_same_seed_same_run() {
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut comm = Community::new(2, 2, 15, &mut rng).unwrap();
            for _ in 0..4 {
                comm.evaluate_fitness(|genome| genome.genes().iter().map(|g| g.weight().abs()).sum::<f64>());
                comm.next(&mut rng).unwrap();
            }
            comm.population().to_vec()
        };

        assert_eq!(run(8), run(8));
    }
}
