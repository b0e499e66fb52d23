//! its NEAT, baby
//!
//! Neuroevolution of augmenting topologies with speciation. A [`Community`]
//! evolves a population of [`Genome`]s, grouping them into species by
//! compatibility distance, and any genome can be turned into a
//! [`NeuralNetwork`] to score it.
//!
//! All randomness is drawn from a caller supplied generator, see [`random`].

/// The primitive random draws everything else is built on
pub mod random;

/// This module contains all of the neural network stuff
pub mod neural_network;

// This module contains all of the evolutionary stuff
pub mod community;

pub use community::community_params::{CommunityParams, GenomeParams, SpeciesParams};
pub use community::genome::Genome;
pub use community::{Community, CommunityError};
pub use neural_network::{NetworkError, NetworkParams, NeuralNetwork};
pub use random::Random;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("unable to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid parameter yaml: {0}")]
    Yaml(#[from] serde_yml::Error),
}

#[derive(Debug, Error)]
pub enum NeatError {
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Everything needed to set up a run. Missing fields take their defaults,
/// so a parameter file only has to list what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeatParams {
    pub num_individuals: usize,
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub community: CommunityParams,
    pub species: SpeciesParams,
    pub genome: GenomeParams,
    pub network: NetworkParams,
}

impl NeatParams {
    pub fn new(num_inputs: usize, num_outputs: usize) -> NeatParams {
        NeatParams {
            num_individuals: 150,
            num_inputs,
            num_outputs,
            community: CommunityParams::new(),
            species: SpeciesParams::new(),
            genome: GenomeParams::new(),
            network: NetworkParams::new(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NeatParams, ParamsError> {
        let path = path.as_ref();

        // extract a string from the file
        let yaml_string = fs::read_to_string(path).map_err(|source| ParamsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&yaml_string)
    }

    pub fn from_yaml(fstring: &str) -> Result<NeatParams, ParamsError> {
        let params: NeatParams = serde_yml::from_str(fstring)?;

        Ok(params)
    }
}

impl Default for NeatParams {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Drives a community with a fitness function over networks.
pub struct Neat {
    community: Community,
    params: NeatParams,
}

impl Neat {
    pub fn new<R: Random + ?Sized>(params: NeatParams, rng: &mut R) -> Result<Neat, NeatError> {
        let community = Community::from_params(&params, rng)?;

        Ok(Neat { community, params })
    }

    pub fn from_parameters<P, R>(parameter_path: P, rng: &mut R) -> Result<Neat, NeatError>
    where
        P: AsRef<Path>,
        R: Random + ?Sized,
    {
        let neat_parameters = NeatParams::from_file(parameter_path)?;

        Self::new(neat_parameters, rng)
    }

    /// Runs `num_generations` generations. Every population, the last one
    /// included, is scored, so [`Neat::champion`] is meaningful afterwards.
    pub fn evolve<F, R>(&mut self, num_generations: usize, mut fitness: F, rng: &mut R) -> Result<(), NeatError>
    where
        F: FnMut(&NeuralNetwork) -> f64,
        R: Random + ?Sized,
    {
        for _ in 0..num_generations {
            self.score(&mut fitness)?;
            self.community.next(rng)?;
        }
        self.score(&mut fitness)?;

        if let Ok(best) = self.community.best() {
            info!(
                generation = self.community.generation(),
                fitness = best.fitness(),
                species = self.community.species().len(),
                "evolution finished"
            );
        }

        Ok(())
    }

    fn score<F>(&mut self, fitness: &mut F) -> Result<(), NeatError>
    where
        F: FnMut(&NeuralNetwork) -> f64,
    {
        for genome in self.community.population_mut() {
            let network = NeuralNetwork::from_genome(genome, &self.params.network)?;
            genome.set_fitness(fitness(&network));
        }

        Ok(())
    }

    pub fn champion(&self) -> Result<&Genome, NeatError> {
        Ok(self.community.best()?)
    }

    pub fn champion_network(&self) -> Result<NeuralNetwork, NeatError> {
        Ok(NeuralNetwork::from_genome(self.champion()?, &self.params.network)?)
    }

    pub fn community(&self) -> &Community {
        &self.community
    }

    pub fn params(&self) -> &NeatParams {
        &self.params
    }

    pub fn number_of_genomes(&self) -> usize {
        self.community.population().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural_network::activation::Activation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    #[rstest]
    fn test_parse_parameter_string() {
        let pstring = r#"
        num_individuals: 3
        num_inputs: 2
        num_outputs: 1

        community:
          species_thresh: 0.6
          min_copy_best: 2

        species:
          disjoint_imp: 2.0

        genome:
          insert_prob: 0.5
          connect_prob: 0.5
          weight_mut_sd: 1.0

        network:
          hidden_activation: Sigmoid
          output_activation: Softmax
        "#;

        let t = NeatParams::from_yaml(pstring).unwrap();

        assert_eq!(t.num_individuals, 3);
        assert_eq!(t.community.species_thresh, 0.6);
        assert_eq!(t.community.no_crossover, 0.25);
        assert_eq!(t.species.disjoint_imp, 2.0);
        assert_eq!(t.species.min_normal, 20);
        assert_eq!(t.genome.insert_prob, 0.5);
        assert_eq!(t.genome.mutate_weight_prob, 0.8);
        assert_eq!(t.network.hidden_activation, Activation::Sigmoid);
        assert_eq!(t.network.output_activation, Activation::Softmax);
    }

    #[rstest]
    fn test_empty_yaml_is_default() {
        let t = NeatParams::from_yaml("{}").unwrap();
        assert_eq!(t, NeatParams::default());
    }

    #[rstest]
    #[case("num_inputs: [1, 2]")]
    #[case("network:\n  hidden_activation: Swish")]
    fn test_bad_yaml(#[case] pstring: &str) {
        assert!(matches!(NeatParams::from_yaml(pstring), Err(ParamsError::Yaml(_))));
    }

    #[rstest]
    fn test_missing_file() {
        let err = NeatParams::from_file("no/such/params.yaml").unwrap_err();
        assert!(matches!(err, ParamsError::Io { .. }));
    }

    #[rstest]
    fn test_evolve_scores_last_generation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut params = NeatParams::new(2, 1);
        params.num_individuals = 20;
        let mut neat = Neat::new(params, &mut rng).unwrap();

        // reward a large output for a fixed input
        neat.evolve(3, |net| net.predict(&[1.0, 1.0]).map(|o| o[0].max(0.0)).unwrap_or(0.0), &mut rng)
            .unwrap();

        assert_eq!(neat.community().generation(), 3);
        assert_eq!(neat.number_of_genomes(), 20);

        let champion = neat.champion_network().unwrap();
        let expected = neat.champion().unwrap().fitness();
        let out = champion.predict(&[1.0, 1.0]).unwrap();
        assert_eq!(out[0].max(0.0), expected);
    }
}
