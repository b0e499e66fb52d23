use std::collections::HashMap;

use tracing::trace;

/// Hands out innovation numbers for connection genes.
///
/// Identical structural mutations, i.e. the same `(from, to)` pair, receive the
/// same innovation number for as long as the tracker remembers the pair. The
/// community clears it once per generation, so a pair reappearing later gets a
/// fresh number. The counter itself only ever grows, which keeps innovation
/// numbers unique within any genome.
#[derive(Clone, Debug, Default)]
pub struct InnovationTracker {
    innovations: HashMap<(usize, usize), usize>,
    next_innovation: usize,
}

impl InnovationTracker {
    pub fn new() -> InnovationTracker {
        InnovationTracker::default()
    }

    /// A tracker whose first new number is `next_innovation`, for populations
    /// that already carry numbered genes.
    pub fn starting_at(next_innovation: usize) -> InnovationTracker {
        InnovationTracker {
            innovations: HashMap::new(),
            next_innovation,
        }
    }

    /// Returns the innovation number of the `from -> to` connection,
    /// assigning the next free number if the pair is new.
    pub fn innovation(&mut self, from: usize, to: usize) -> usize {
        if let Some(innovation) = self.innovations.get(&(from, to)) {
            return *innovation;
        }

        let innovation = self.next_innovation;
        self.innovations.insert((from, to), innovation);
        self.next_innovation += 1;
        trace!(from, to, innovation, "new connection innovation");

        innovation
    }

    /// Looks up a pair without recording anything.
    pub fn get(&self, from: usize, to: usize) -> Option<usize> {
        self.innovations.get(&(from, to)).copied()
    }

    /// Forgets every recorded pair. Numbers already handed out are never reused.
    pub fn clear(&mut self) {
        self.innovations.clear();
    }

    /// Number of pairs recorded since the last clear.
    pub fn len(&self) -> usize {
        self.innovations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.innovations.is_empty()
    }

    pub fn next_innovation(&self) -> usize {
        self.next_innovation
    }
}
