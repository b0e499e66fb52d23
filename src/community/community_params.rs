use serde::{Deserialize, Serialize};

/// Engine level knobs: elitism, crossover rate and speciation threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityParams {
    /// A species must have more members than this for its best genome
    /// to be copied unchanged into the next generation.
    pub min_copy_best: usize,
    /// Chance a child is made from a single parent, without crossover.
    pub no_crossover: f64,
    /// Genomes closer than this to a representative join its species.
    pub species_thresh: f64,
    /// Pick a random previous member as each species' new representative.
    /// When false the previous representative is kept.
    pub resample_representative: bool,
}

impl CommunityParams {
    pub fn new() -> CommunityParams {
        CommunityParams {
            min_copy_best: 5,
            no_crossover: 0.25,
            species_thresh: 4.0,
            resample_representative: true,
        }
    }

    pub fn get_test_params() -> CommunityParams {
        CommunityParams {
            min_copy_best: 1,
            no_crossover: 0.0,
            species_thresh: 1.5,
            resample_representative: true,
        }
    }
}

impl Default for CommunityParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Coefficients of the compatibility distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesParams {
    /// Gene count up to which the disjoint term is not normalized.
    pub min_normal: usize,
    pub disjoint_imp: f64,
    pub weight_imp: f64,
}

impl SpeciesParams {
    pub fn new() -> SpeciesParams {
        SpeciesParams {
            min_normal: 20,
            disjoint_imp: 1.,
            weight_imp: 3.,
        }
    }
}

impl Default for SpeciesParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutation and crossover probabilities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeParams {
    /// Chance each gene's weight is mutated.
    pub mutate_weight_prob: f64,
    /// Chance of adding a connection.
    pub connect_prob: f64,
    /// Chance of splitting a connection with a new node.
    pub insert_prob: f64,
    /// Chance a mutated weight is redrawn instead of shifted.
    pub reset_weight_prob: f64,
    /// Standard deviation of a weight shift.
    pub weight_mut_sd: f64,
    /// Chance a gene disabled in either parent is enabled in the child.
    pub enable_prob: f64,
}

impl GenomeParams {
    pub fn new() -> GenomeParams {
        GenomeParams {
            mutate_weight_prob: 0.8,
            connect_prob: 0.05,
            insert_prob: 0.03,
            reset_weight_prob: 0.1,
            weight_mut_sd: 0.05,
            enable_prob: 0.25,
        }
    }

    /// Every draw that could change structure is switched off.
    pub fn get_test_params() -> GenomeParams {
        GenomeParams {
            mutate_weight_prob: 0.0,
            connect_prob: 0.0,
            insert_prob: 0.0,
            reset_weight_prob: 0.0,
            weight_mut_sd: 0.05,
            enable_prob: 0.0,
        }
    }
}

impl Default for GenomeParams {
    fn default() -> Self {
        Self::new()
    }
}
