use crate::genomics::GeneticConfig;
use crate::{Innovation, NodeId};

use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

use std::fmt;

/// Connection genes are directed, weighted edges
/// between two nodes of a genome.
///
/// The innovation number identifies the `(input, output)`
/// node pair across every genome of a run, which is what
/// allows genes of differently-shaped genomes to be aligned.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct ConnectionGene {
    innovation: Innovation,
    input: NodeId,
    output: NodeId,
    weight: f32,
    expressed: bool,
}

impl ConnectionGene {
    /// Returns a new _expressed_ gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::ConnectionGene;
    ///
    /// let gene = ConnectionGene::new(42, 3, 9, 0.5);
    ///
    /// assert_eq!(gene.innovation(), 42);
    /// assert_eq!(gene.input(), 3);
    /// assert_eq!(gene.output(), 9);
    /// assert_eq!(gene.weight(), 0.5);
    /// assert!(gene.expressed());
    /// ```
    pub fn new(innovation: Innovation, input: NodeId, output: NodeId, weight: f32) -> ConnectionGene {
        ConnectionGene {
            innovation,
            input,
            output,
            weight,
            expressed: true,
        }
    }

    /// Returns a random weight, uniformly distributed
    /// over `[-weight_bound, weight_bound]`.
    pub(super) fn random_weight<R: Rng + ?Sized>(rng: &mut R, config: &GeneticConfig) -> f32 {
        rng.gen_range(-config.weight_bound..=config.weight_bound)
    }

    /// Replaces the gene's weight with a fresh random value.
    pub fn randomize_weight<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &GeneticConfig) {
        self.weight = Self::random_weight(rng, config);
    }

    /// Nudges the gene's weight by a zero-mean Gaussian
    /// amount with standard deviation [`weight_perturbation_scale`].
    /// The weight is left unbounded.
    ///
    /// [`weight_perturbation_scale`]: crate::genomics::GeneticConfig::weight_perturbation_scale
    pub fn nudge_weight<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &GeneticConfig) {
        let perturbation: f32 = rng.sample(StandardNormal);
        self.weight += perturbation * config.weight_perturbation_scale;
    }

    /// Returns the gene's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    /// Returns the id of the gene's source node.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// Returns the id of the gene's target node.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// Returns the gene's input and output node ids.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.input, self.output)
    }

    /// Returns the gene's weight.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Sets the gene's weight.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::ConnectionGene;
    ///
    /// let mut gene = ConnectionGene::new(42, 3, 9, 0.5);
    /// gene.set_weight(-5.0);
    ///
    /// assert_eq!(gene.weight(), -5.0);
    /// ```
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// Returns whether the gene is expressed in the network.
    pub fn expressed(&self) -> bool {
        self.expressed
    }

    /// Disables the gene. Disabled genes are kept in the genome
    /// but are ignored during evaluation.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::ConnectionGene;
    ///
    /// let mut gene = ConnectionGene::new(42, 3, 9, 0.5);
    /// gene.disable();
    ///
    /// assert!(!gene.expressed());
    /// ```
    pub fn disable(&mut self) {
        self.expressed = false;
    }

    /// Sets the gene's expression status.
    pub fn set_expressed(&mut self, expressed: bool) {
        self.expressed = expressed;
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}[{}->{}, {:.3}]{}",
            if self.expressed { "" } else { "(" },
            self.innovation,
            self.input,
            self.output,
            self.weight,
            if self.expressed { "" } else { ")" },
        )
    }
}
