/// Weighted incoming connection of a network node.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Edge {
    pub source_i: usize,
    pub weight: f64,
}

impl Edge {
    pub fn new(source_i: usize, weight: f64) -> Edge {
        Edge { source_i, weight }
    }
}
