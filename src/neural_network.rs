pub mod activation;
pub mod edge;
pub mod graph;
pub mod node;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::community::genome::Genome;
use crate::neural_network::activation::Activation;
use crate::neural_network::edge::Edge;
use crate::neural_network::graph::Graph;
use crate::neural_network::node::Node;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("{0} needs the whole layer and cannot be used on hidden nodes")]
    InvalidHiddenActivation(Activation),
    #[error("expected {expected} inputs, got {actual}")]
    InputSize { expected: usize, actual: usize },
}

/// Activations used when turning a genome into a network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub hidden_activation: Activation,
    /// Applied to the whole output vector, so softmax is allowed here.
    pub output_activation: Activation,
}

impl NetworkParams {
    pub fn new() -> NetworkParams {
        NetworkParams {
            hidden_activation: Activation::ReLU,
            output_activation: Activation::Identity,
        }
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::new()
    }
}

/// The phenotype of a genome.
///
/// The activation order is worked out once when the network is built, so
/// `predict` only needs a scratch buffer and never mutates the network.
#[derive(Clone, Debug)]
pub struct NeuralNetwork {
    nodes: Vec<Node>,
    inputs: usize,
    output_idx: Vec<usize>,
    order: Vec<usize>,
    recurrent: bool,
    output_activation: Activation,
}

impl NeuralNetwork {
    /// One node per genome node. Inputs, bias and outputs pass their net
    /// input through unchanged, hidden nodes use the hidden activation.
    /// Only enabled genes become edges.
    pub fn from_genome(genome: &Genome, params: &NetworkParams) -> Result<NeuralNetwork, NetworkError> {
        if !params.hidden_activation.is_scalar() {
            return Err(NetworkError::InvalidHiddenActivation(params.hidden_activation));
        }

        let hidden = genome.hidden_range();
        let mut nodes: Vec<Node> = (0..genome.nodes())
            .map(|i| {
                if hidden.contains(&i) {
                    Node::new(params.hidden_activation)
                } else {
                    Node::new(Activation::Identity)
                }
            })
            .collect();

        let mut edge_list = Vec::new();
        for gene in genome.genes().iter().filter(|gene| gene.enabled()) {
            nodes[gene.to()].add_edge(Edge::new(gene.from(), gene.weight()));
            edge_list.push([gene.from(), gene.to()]);
        }

        let output_idx: Vec<usize> = genome.output_range().collect();
        let graph = Graph::from_edge_list(&edge_list, output_idx.clone());
        let (order, recurrent) = graph.activation_order();
        if recurrent {
            debug!(nodes = genome.nodes(), "cyclic genome, using recurrent ordering");
        }

        Ok(NeuralNetwork {
            nodes,
            inputs: genome.inputs(),
            output_idx,
            order,
            recurrent,
            output_activation: params.output_activation,
        })
    }

    /// Feeds `input` forward and returns the output layer.
    ///
    /// The bias node is always 1. A node read before it has been computed,
    /// which only happens on cycles, contributes 0.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.inputs {
            return Err(NetworkError::InputSize {
                expected: self.inputs,
                actual: input.len(),
            });
        }

        let mut values = vec![0.0; self.nodes.len()];
        values[..self.inputs].copy_from_slice(input);
        values[self.bias()] = 1.0;

        for &node_i in &self.order {
            // sources are loaded, not computed
            if node_i > self.bias() {
                values[node_i] = self.nodes[node_i].activate(&values);
            }
        }

        let outputs: Vec<f64> = self.output_idx.iter().map(|&i| values[i]).collect();
        Ok(self.output_activation.apply_all(&outputs))
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.output_idx.len()
    }

    pub fn bias(&self) -> usize {
        self.inputs
    }

    /// Order nodes are computed in. Nodes no output depends on are left out.
    pub fn activation_order(&self) -> &[usize] {
        &self.order
    }

    /// True when the genome had a cycle the outputs depend on.
    pub fn is_recurrent(&self) -> bool {
        self.recurrent
    }
}
