use std::collections::HashMap;

use crate::community::community_params::GenomeParams;
use crate::community::gene::Gene;
use crate::community::genome::Genome;
use crate::random::Random;

/// Provides named fields for the incompatibility numbers so we don't get confused elsewhere.
/// Weighing and summing these values occurs in Species.
#[derive(Clone, Debug, PartialEq)]
pub struct IncompatibilityComponents {
    /// Genes present in exactly one of the two genomes.
    pub disjoint: usize,
    /// Genes of the first genome with a partner of the same innovation number.
    pub matching: usize,
    /// Mean absolute weight difference over matching genes, infinite when
    /// nothing matches.
    pub mean_weight_diff: f64,
}

fn index_by_innovation(genome: &Genome) -> HashMap<usize, &Gene> {
    genome
        .genes()
        .iter()
        .map(|gene| (gene.innovation(), gene))
        .collect()
}

/// Creates a child of `base` and `partner`. Genes are aligned by innovation
/// number: matching genes are crossed pairwise, every other gene of `base`
/// is inherited as is and genes only `partner` has are dropped. The child
/// keeps the node count of `base`.
pub fn crossover<R: Random + ?Sized>(
    base: &Genome,
    partner: &Genome,
    rng: &mut R,
    params: &GenomeParams,
) -> Genome {
    let partner_genes = index_by_innovation(partner);

    let genes = base
        .genes()
        .iter()
        .map(|gene| match partner_genes.get(&gene.innovation()) {
            Some(other) => gene.crossover(other, rng, params),
            None => *gene,
        })
        .collect();

    base.with_genes(genes, base.nodes())
}

/// Counts disjoint and matching genes between two genomes and averages the
/// weight difference of the matching ones.
pub fn raw_incompatibility(a: &Genome, b: &Genome) -> IncompatibilityComponents {
    let b_genes = index_by_innovation(b);

    let mut matching = 0;
    let mut weight_diff = 0.0;
    for gene in a.genes() {
        if let Some(other) = b_genes.get(&gene.innovation()) {
            matching += 1;
            weight_diff += (gene.weight() - other.weight()).abs();
        }
    }

    let total = a.genes().len() + b.genes().len();
    let mean_weight_diff = if matching == 0 {
        f64::INFINITY
    } else {
        weight_diff / matching as f64
    };

    IncompatibilityComponents {
        disjoint: total - 2 * matching,
        matching,
        mean_weight_diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::scripted::ScriptedRandom;
    use rstest::{fixture, rstest};

    // 1 input, bias 1, outputs 2..4, hidden 4..6
    fn genome(genes: &[(usize, usize, usize, f64)]) -> Genome {
        let genes = genes
            .iter()
            .map(|&(innovation, from, to, weight)| Gene::new(innovation, from, to, weight))
            .collect();
        Genome::from_genes(1, 2, 6, genes).unwrap()
    }

    #[fixture]
    fn left() -> Genome {
        genome(&[(0, 0, 2, 1.0), (1, 1, 2, 2.0), (2, 0, 3, 3.0)])
    }

    #[fixture]
    fn right() -> Genome {
        genome(&[(1, 1, 2, 1.5), (2, 0, 3, 3.0), (3, 1, 3, -1.0)])
    }

    #[rstest]
    fn test_incompatibility_counts(left: Genome, right: Genome) {
        let components = raw_incompatibility(&left, &right);

        assert_eq!(components.matching, 2);
        assert_eq!(components.disjoint, 2);
        assert!((components.mean_weight_diff - 0.25).abs() < 1e-12);
    }

    #[rstest]
    fn test_incompatibility_without_matches(left: Genome) {
        let other = genome(&[(7, 0, 4, 1.0)]);
        let components = raw_incompatibility(&left, &other);

        assert_eq!(components.matching, 0);
        assert_eq!(components.disjoint, 4);
        assert!(components.mean_weight_diff.is_infinite());
    }

    #[rstest]
    fn test_incompatibility_with_self(left: Genome) {
        let components = raw_incompatibility(&left, &left);

        assert_eq!(components.disjoint, 0);
        assert_eq!(components.mean_weight_diff, 0.0);
    }

    #[rstest]
    fn test_crossover_inherits_base_structure(left: Genome, right: Genome) {
        let params = GenomeParams::new();
        // matching genes 1 and 2 each take one weight roll, both enabled
        let mut rng = ScriptedRandom::new().bools(&[false, true]);

        let child = crossover(&left, &right, &mut rng, &params);

        let innovations: Vec<usize> = child.genes().iter().map(|g| g.innovation()).collect();
        assert_eq!(innovations, vec![0, 1, 2]);
        assert_eq!(child.genes()[0], left.genes()[0]);
        assert_eq!(child.genes()[1].weight(), 1.5);
        assert_eq!(child.genes()[2].weight(), 3.0);
        assert_eq!(child.nodes(), left.nodes());
        assert_eq!(child.fitness(), 0.0);
    }

    #[rstest]
    fn test_crossover_can_reenable(left: Genome) {
        let params = GenomeParams::new();
        let disabled = Genome::from_genes(
            1,
            2,
            6,
            vec![Gene::new(0, 0, 2, 1.0).disable()],
        )
        .unwrap();
        let mut rng = ScriptedRandom::new().bools(&[true, true]);

        let child = crossover(&disabled, &left, &mut rng, &params);

        assert_eq!(child.genes().len(), 1);
        assert!(child.genes()[0].enabled());
    }
}
