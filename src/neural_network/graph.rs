use std::collections::{HashMap, HashSet, VecDeque};

use topo_sort::{self, CycleError};

/// The Graph struct contains structural information about a network without the details needed to
/// fully compute activation.
///
/// We use a Graph primarily to determine the activation order of nodes in our neural network.
/// Predecessor lists keep the order edges were added in, which fixes the order nodes are visited
/// in when the graph has cycles.
#[derive(Clone, Debug)]
pub struct Graph {
    pub preds: HashMap<usize, Vec<usize>>,
    outputs: Vec<usize>,
}

impl Graph {
    /// Builds the graph from `[source, target]` pairs. Every output is a node of the graph even
    /// when nothing leads into it.
    ///
    /// # Example
    ///
    /// ```
    /// use neatrs_species::neural_network::graph::Graph;
    ///
    /// let edges = vec![[0, 2], [0, 1], [1, 2]];
    /// let my_graph = Graph::from_edge_list(&edges, vec![2]);
    /// assert_eq!(my_graph.preds[&2], vec![0, 1]);
    /// ```
    pub fn from_edge_list(edge_list: &[[usize; 2]], outputs: Vec<usize>) -> Graph {
        let mut preds = Self::dependency_map(edge_list);
        for output in &outputs {
            preds.entry(*output).or_default();
        }

        Graph {
            preds,
            outputs,
        }
    }

    /// Produces a lookup from each node to the nodes feeding it. Every node that appears in an
    /// edge is a key, sources included.
    pub fn dependency_map(edge_list: &[[usize; 2]]) -> HashMap<usize, Vec<usize>> {
        let mut dep_map: HashMap<usize, Vec<usize>> = HashMap::new();

        for &[source, target] in edge_list {
            dep_map.entry(target).or_default().push(source);

            // also make sure the other node exists as key
            dep_map.entry(source).or_default();
        }

        dep_map
    }

    /// Every node some output depends on, outputs included.
    pub fn required_nodes(&self) -> HashSet<usize> {
        let mut required: HashSet<usize> = self.outputs.iter().copied().collect();
        let mut queue: VecDeque<usize> = self.outputs.iter().copied().collect();

        // bfs backward from the outputs
        while let Some(curr) = queue.pop_front() {
            for pred in self.preds.get(&curr).into_iter().flatten() {
                if required.insert(*pred) {
                    queue.push_back(*pred);
                }
            }
        }

        required
    }

    /// Calculates an ordering of the required nodes according to the topological sort of the
    /// graph. If that part of the graph is not a DAG, self-loops included, this function returns
    /// CycleError.
    ///
    /// # Example
    ///
    /// ```
    /// use neatrs_species::neural_network::graph::Graph;
    ///
    /// let edges = vec![[0, 1], [1, 2], [0, 2]];
    /// let g = Graph::from_edge_list(&edges, vec![2]);
    /// assert_eq!(g.topological_sort().unwrap(), vec![0, 1, 2])
    /// ```
    pub fn topological_sort(&self) -> Result<Vec<usize>, CycleError> {
        let required = self.required_nodes();
        let mut ts = topo_sort::TopoSort::with_capacity(required.len());

        for (node, preds) in &self.preds {
            if required.contains(node) {
                // topo_sort drops a node's dependency on itself
                if preds.contains(node) {
                    return Err(topo_sort::CycleError);
                }
                ts.insert(node, preds);
            }
        }

        let mut nodes = Vec::with_capacity(required.len());

        for node in ts {
            match node {
                Ok((node, _)) => nodes.push(*node),
                Err(_) => return Err(topo_sort::CycleError),
            }
        }

        Ok(nodes)
    }

    /// Depth first post-order from the outputs, in output order, visiting predecessors in edge
    /// order. A node met again while it is still being visited is not revisited, so every node
    /// appears once and the ordering exists for any graph.
    ///
    /// # Example
    ///
    /// ```
    /// use neatrs_species::neural_network::graph::Graph;
    ///
    /// let edges = vec![[0, 1], [2, 1], [1, 2]];
    /// let g = Graph::from_edge_list(&edges, vec![2]);
    /// assert_eq!(g.recurrent_pseudosort(), vec![0, 1, 2])
    /// ```
    pub fn recurrent_pseudosort(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut visited: HashSet<usize> = HashSet::new();

        for &output in &self.outputs {
            if !visited.insert(output) {
                continue;
            }

            // (node, index of the next predecessor to visit)
            let mut stack = vec![(output, 0)];
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let preds = self.preds.get(&node).map(Vec::as_slice).unwrap_or(&[]);

                match preds.get(top.1) {
                    Some(&pred) => {
                        top.1 += 1;
                        if visited.insert(pred) {
                            stack.push((pred, 0));
                        }
                    }
                    None => {
                        order.push(node);
                        stack.pop();
                    }
                }
            }
        }

        order
    }

    /// Topological order when there is one, otherwise the recurrent pseudosort. The flag is true
    /// when the fallback was needed.
    pub fn activation_order(&self) -> (Vec<usize>, bool) {
        match self.topological_sort() {
            Ok(order) => (order, false),
            Err(CycleError) => (self.recurrent_pseudosort(), true),
        }
    }
}
