use crate::community::community_params::GenomeParams;
use crate::community::gene::Gene;
use crate::community::genome::Genome;
use crate::community::innovation_tracker::InnovationTracker;
use crate::random::Random;

/// The main mutation function. Weight mutation, adding a connection and
/// inserting a node are rolled independently and in that order, so one call
/// may do all three. The parent is left untouched and a new genome with
/// fitness 0 is returned.
pub fn mutate<R: Random + ?Sized>(
    genome: &Genome,
    tracker: &mut InnovationTracker,
    rng: &mut R,
    params: &GenomeParams,
) -> Genome {
    let mut genes = mutate_weights(genome.genes(), rng, params);
    let mut nodes = genome.nodes();

    // a saturated genome would keep the rejection loop spinning forever
    if rng.bool(params.connect_prob) && !genome.is_saturated() {
        genes.push(genome.random_connection(tracker, rng));
    }

    if rng.bool(params.insert_prob) && !genes.is_empty() {
        let split_i = rng.uniform_int(genes.len());
        nodes = insert_node(&mut genes, split_i, nodes, tracker);
    }

    genome.with_genes(genes, nodes)
}

/// Each gene is replaced by its mutated copy with probability `mutate_weight_prob`.
fn mutate_weights<R: Random + ?Sized>(
    genes: &[Gene],
    rng: &mut R,
    params: &GenomeParams,
) -> Vec<Gene> {
    genes
        .iter()
        .map(|gene| {
            if rng.bool(params.mutate_weight_prob) {
                gene.mutate(rng, params)
            } else {
                *gene
            }
        })
        .collect()
}

/// Splits `genes[split_i]` with a new hidden node. The old gene is disabled and
/// two genes `from -> new` (weight 1) and `new -> to` (old weight) are appended.
/// Returns the new node count.
fn insert_node(
    genes: &mut Vec<Gene>,
    split_i: usize,
    nodes: usize,
    tracker: &mut InnovationTracker,
) -> usize {
    let old = genes[split_i];
    let new_node = nodes;

    genes[split_i] = old.disable();
    genes.push(Gene::tracked(old.from(), new_node, 1.0, tracker));
    genes.push(Gene::tracked(new_node, old.to(), old.weight(), tracker));

    nodes + 1
}
