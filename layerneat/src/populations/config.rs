use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

const fn non_zero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("zero passed to non_zero"),
    }
}

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub distance_threshold: f32,
    /// Number of generations without a fitness increase
    /// before a species is considered _stale_.
    pub stagnation_threshold: NonZeroUsize,
    /// Number of top-ranked species which are never
    /// removed for being stale.
    pub protected_species: usize,
    /// Chance that offspring will be a mutated copy of
    /// a single parent instead of the result of crossover.
    pub asexual_reproduction_chance: f32,
    /// Species with more members than this (before culling)
    /// pass their best-ever member unchanged to the next
    /// generation.
    pub elitism_threshold: usize,
    /// Fraction of each species (of more than two members)
    /// removed before reproduction.
    pub cull_fraction: f32,
    /// Largest run of individuals updated sequentially
    /// by a single task during parallel updates.
    pub parallel_chunk_size: NonZeroUsize,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use layerneat::PopulationConfig;
    ///
    /// let config = PopulationConfig {
    ///     // Specify some values here...
    ///     distance_threshold: 3.0,
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: non_zero(1),
            distance_threshold: 0.0,
            stagnation_threshold: non_zero(1),
            protected_species: 0,
            asexual_reproduction_chance: 0.0,
            elitism_threshold: 0,
            cull_fraction: 0.0,
            parallel_chunk_size: non_zero(1),
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: non_zero(150),
            distance_threshold: 3.0,
            stagnation_threshold: non_zero(15),
            protected_species: 3,
            asexual_reproduction_chance: 0.25,
            elitism_threshold: 5,
            cull_fraction: 0.5,
            parallel_chunk_size: non_zero(16),
        }
    }
}
