use serde::{Deserialize, Serialize};

/// Configuration data for genome mutation
/// and inter-genome operations.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Chance that a weight mutation pass runs during [`mutate`].
    ///
    /// [`mutate`]: crate::genomics::Genome::mutate
    pub weight_mutation_chance: f32,
    /// Chance, per gene, that a weight mutation replaces the
    /// weight with a fresh random value instead of nudging it.
    pub weight_reset_chance: f32,
    /// Standard deviation of the Gaussian weight nudge.
    pub weight_perturbation_scale: f32,
    /// Fresh weights are drawn uniformly from `[-weight_bound, weight_bound]`.
    pub weight_bound: f32,
    /// Chance a matching gene is disabled in a child
    /// if it was disabled in either parent.
    pub gene_disable_chance: f32,
    /// Chance of a node addition mutation during [`mutate`].
    ///
    /// [`mutate`]: crate::genomics::Genome::mutate
    pub node_addition_mutation_chance: f32,
    /// Chance of a gene addition mutation during [`mutate`].
    ///
    /// [`mutate`]: crate::genomics::Genome::mutate
    pub gene_addition_mutation_chance: f32,
    /// Maximum number of node pairs sampled by a gene addition
    /// mutation before it gives up. `None` samples until a
    /// viable pair is found, which always terminates on a genome
    /// that is not fully connected.
    pub max_gene_addition_mutation_attempts: Option<usize>,
    /// Weight of excess and disjoint genes in genetic distance.
    pub excess_disjoint_gene_factor: f32,
    /// Weight of the mean common-gene weight difference
    /// in genetic distance.
    pub common_weight_factor: f32,
    /// Gene count beyond which the excess/disjoint term
    /// of the genetic distance is normalized.
    pub large_genome_threshold: usize,
    /// Weight difference assumed when two non-empty genomes
    /// share no genes at all.
    pub no_common_genes_weight_difference: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" configuration.
    /// All chances and factors are 0.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to disable every random operator.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     weight_mutation_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            weight_mutation_chance: 0.0,
            weight_reset_chance: 0.0,
            weight_perturbation_scale: 0.0,
            weight_bound: 0.0,
            gene_disable_chance: 0.0,
            node_addition_mutation_chance: 0.0,
            gene_addition_mutation_chance: 0.0,
            max_gene_addition_mutation_attempts: None,
            excess_disjoint_gene_factor: 0.0,
            common_weight_factor: 0.0,
            large_genome_threshold: 0,
            no_common_genes_weight_difference: 0.0,
        }
    }
}

impl Default for GeneticConfig {
    /// The operator rates of the original NEAT experiments.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig::default();
    /// assert_eq!(config.weight_mutation_chance, 0.8);
    /// assert_eq!(config.node_addition_mutation_chance, 0.03);
    /// assert_eq!(config.gene_addition_mutation_chance, 0.05);
    /// ```
    fn default() -> GeneticConfig {
        GeneticConfig {
            weight_mutation_chance: 0.8,
            weight_reset_chance: 0.1,
            weight_perturbation_scale: 1.0 / 50.0,
            weight_bound: 1.0,
            gene_disable_chance: 0.75,
            node_addition_mutation_chance: 0.03,
            gene_addition_mutation_chance: 0.05,
            max_gene_addition_mutation_attempts: None,
            excess_disjoint_gene_factor: 1.0,
            common_weight_factor: 0.4,
            large_genome_threshold: 20,
            no_common_genes_weight_difference: 100.0,
        }
    }
}
