use crate::neural_network::activation::Activation;
use crate::neural_network::edge::Edge;

#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    pub in_edges: Vec<Edge>,    // incoming edges, in gene order
    pub activation: Activation, // net_input -> output
}

impl Node {
    // default constructor. edge logic handled in network
    pub fn new(activation: Activation) -> Node {
        Node {
            in_edges: Vec::new(),
            activation,
        }
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.in_edges.push(edge);
    }

    /// Weighted sum of the source values, before activation.
    pub fn net_input(&self, values: &[f64]) -> f64 {
        self.in_edges
            .iter()
            .map(|edge| values[edge.source_i] * edge.weight)
            .sum()
    }

    pub fn activate(&self, values: &[f64]) -> f64 {
        self.activation.apply(self.net_input(values))
    }
}

#[cfg(test)]
mod test_node {
    use super::*;

    #[test]
    fn test_activate() {
        let mut my_node = Node::new(Activation::ReLU);
        my_node.add_edge(Edge::new(0, 2.0));
        my_node.add_edge(Edge::new(2, -1.0));

        assert_eq!(my_node.net_input(&[1.0, 9.0, 0.5]), 1.5);
        assert_eq!(my_node.activate(&[1.0, 9.0, 3.0]), 0.0);
    }
}
