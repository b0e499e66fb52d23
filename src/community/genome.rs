use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::community::community_params::GenomeParams;
use crate::community::gene::Gene;
use crate::community::innovation_tracker::InnovationTracker;
use crate::community::{mutation, recombination};
use crate::random::Random;

/// Raised when a genome would break the node layout or connection rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    #[error("a genome needs at least one output node")]
    NoOutputs,
    #[error("genome declares {nodes} nodes but its layout needs at least {required}")]
    TooFewNodes { nodes: usize, required: usize },
    #[error("gene {from} -> {to} references a node outside 0..{nodes}")]
    NodeOutOfRange { from: usize, to: usize, nodes: usize },
    #[error("gene {from} -> {to} leads into an input or the bias node")]
    SourceTarget { from: usize, to: usize },
    #[error("connection {from} -> {to} appears more than once")]
    DuplicateConnection { from: usize, to: usize },
}

/// The genetic encoding of one network.
///
/// Node indices follow a fixed layout: `0..inputs` are the inputs, `inputs`
/// is the bias, the next `outputs` indices are the outputs and everything
/// after that is a hidden node, in the order the nodes were created.
/// Genes keep their insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Genome {
    genes: Vec<Gene>,
    inputs: usize,
    outputs: usize,
    nodes: usize,
    fitness: f64,
}

impl Genome {
    /// A minimal genome: inputs, bias and outputs, joined by a single random
    /// connection.
    pub fn init<R: Random + ?Sized>(
        inputs: usize,
        outputs: usize,
        tracker: &mut InnovationTracker,
        rng: &mut R,
    ) -> Result<Genome, GenomeError> {
        if outputs == 0 {
            return Err(GenomeError::NoOutputs);
        }

        let mut genome = Genome {
            genes: Vec::new(),
            inputs,
            outputs,
            nodes: inputs + outputs + 1,
            fitness: 0.0,
        };
        let gene = genome.random_connection(tracker, rng);
        genome.genes.push(gene);

        Ok(genome)
    }

    /// Builds a genome from explicit genes, checking the layout invariants.
    pub fn from_genes(
        inputs: usize,
        outputs: usize,
        nodes: usize,
        genes: Vec<Gene>,
    ) -> Result<Genome, GenomeError> {
        if outputs == 0 {
            return Err(GenomeError::NoOutputs);
        }
        let required = inputs + outputs + 1;
        if nodes < required {
            return Err(GenomeError::TooFewNodes { nodes, required });
        }

        let mut seen = HashSet::with_capacity(genes.len());
        for gene in &genes {
            let (from, to) = gene.endpoints();
            if from >= nodes || to >= nodes {
                return Err(GenomeError::NodeOutOfRange { from, to, nodes });
            }
            if to <= inputs {
                return Err(GenomeError::SourceTarget { from, to });
            }
            if !seen.insert((from, to)) {
                return Err(GenomeError::DuplicateConnection { from, to });
            }
        }

        Ok(Genome {
            genes,
            inputs,
            outputs,
            nodes,
            fitness: 0.0,
        })
    }

    pub(crate) fn with_genes(&self, genes: Vec<Gene>, nodes: usize) -> Genome {
        Genome {
            genes,
            inputs: self.inputs,
            outputs: self.outputs,
            nodes,
            fitness: 0.0,
        }
    }

    /// Draws `from -> to` pairs until one is legal: `to` must not be an input
    /// or the bias and the pair must be new to this genome.
    ///
    /// This does not terminate on a saturated genome, see [`Genome::is_saturated`].
    pub fn random_connection<R: Random + ?Sized>(
        &self,
        tracker: &mut InnovationTracker,
        rng: &mut R,
    ) -> Gene {
        loop {
            let from = rng.uniform_int(self.nodes);
            let to = rng.uniform_int(self.nodes);

            if to <= self.inputs || self.contains_connection(from, to) {
                continue;
            }

            return Gene::tracked(from, to, rng.normal(1.0), tracker);
        }
    }

    /// Returns a mutated copy, see [`mutation::mutate`].
    pub fn mutate<R: Random + ?Sized>(
        &self,
        tracker: &mut InnovationTracker,
        rng: &mut R,
        params: &GenomeParams,
    ) -> Genome {
        mutation::mutate(self, tracker, rng, params)
    }

    /// Returns the child of `self` and `other`, see [`recombination::crossover`].
    pub fn crossover<R: Random + ?Sized>(
        &self,
        other: &Genome,
        rng: &mut R,
        params: &GenomeParams,
    ) -> Genome {
        recombination::crossover(self, other, rng, params)
    }

    pub fn contains_connection(&self, from: usize, to: usize) -> bool {
        self.genes.iter().any(|gene| gene.endpoints() == (from, to))
    }

    pub fn gene_by_innovation(&self, innovation: usize) -> Option<&Gene> {
        self.genes.iter().find(|gene| gene.innovation() == innovation)
    }

    /// Number of distinct legal connections: any node may feed any node that
    /// is neither an input nor the bias.
    pub fn max_connections(&self) -> usize {
        self.nodes * (self.nodes - self.inputs - 1)
    }

    pub fn is_saturated(&self) -> bool {
        self.genes.len() >= self.max_connections()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Total node count, hidden nodes included.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn bias(&self) -> usize {
        self.inputs
    }

    pub fn output_range(&self) -> std::ops::Range<usize> {
        self.inputs + 1..self.inputs + 1 + self.outputs
    }

    pub fn hidden_range(&self) -> std::ops::Range<usize> {
        self.inputs + 1 + self.outputs..self.nodes
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Genome[{} in, {} out, {} nodes, fitness {:.3}]:",
            self.inputs, self.outputs, self.nodes, self.fitness
        )?;
        for gene in &self.genes {
            write!(f, " {}", gene)?;
        }
        Ok(())
    }
}
