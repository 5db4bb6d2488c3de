//! Genomes are the focus of evolution in NEAT.
//! They are a collection of connection genes and nodes
//! describing a layered, feed-forward neural network.
//! Genomes can be progressively mutated, thus adding
//! complexity and functionality.

mod config;
mod errors;
mod export;
mod genes;
mod history;
mod nodes;

pub use config::GeneticConfig;
pub use errors::{GeneAdditionMutationError, GenomeError, NodeAdditionMutationError};
pub use genes::ConnectionGene;
pub use history::InnovationHistory;
pub use nodes::{sigmoid, NodeGene, NodeType};

use crate::{Innovation, NodeId};

use ahash::RandomState;
use rand::Rng;
use serde::Serialize;

use std::collections::HashMap;

/// A mutable collection of nodes and connection genes.
///
/// Nodes and genes keep their insertion order, which makes
/// enumeration, evaluation and export deterministic.
/// Cloning a genome copies every node and gene; nothing
/// is shared between a genome and its clone.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Genome {
    nodes: Vec<NodeGene>,
    #[serde(skip)]
    node_index: HashMap<NodeId, usize, RandomState>,
    #[serde(skip)]
    next_node_id: NodeId,
    connections: Vec<ConnectionGene>,
    #[serde(skip)]
    connection_index: HashMap<Innovation, usize, RandomState>,
    bias: NodeId,
    input_count: usize,
    output_count: usize,
    layer_count: usize,
}

impl Genome {
    /// Creates a new, unconnected genome.
    ///
    /// Input nodes get ids `0..inputs` and live in layer 0, output nodes
    /// get ids `inputs..inputs + outputs` and live in layer 1, and the
    /// bias node (an input node) gets the id `inputs + outputs`.
    ///
    /// # Errors
    /// Returns an error if either count is zero.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, NodeType};
    ///
    /// let genome = Genome::new(3, 2).unwrap();
    ///
    /// // 3 inputs + 1 bias node, 2 outputs.
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Input).count(), 3 + 1);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Output).count(), 2);
    /// assert_eq!(genome.bias_node(), 5);
    /// assert_eq!(genome.connections().count(), 0);
    /// assert_eq!(genome.layer_count(), 2);
    ///
    /// assert!(Genome::new(0, 2).is_err());
    /// ```
    pub fn new(inputs: usize, outputs: usize) -> Result<Genome, GenomeError> {
        if inputs < 1 || outputs < 1 {
            return Err(GenomeError::InvalidShape { inputs, outputs });
        }

        let mut genome = Genome {
            nodes: Vec::with_capacity(inputs + outputs + 1),
            node_index: HashMap::default(),
            next_node_id: 0,
            connections: vec![],
            connection_index: HashMap::default(),
            bias: inputs + outputs,
            input_count: inputs,
            output_count: outputs,
            layer_count: 2,
        };
        for id in 0..inputs {
            genome.push_node(NodeGene::new(id, NodeType::Input, 0));
        }
        for id in inputs..inputs + outputs {
            genome.push_node(NodeGene::new(id, NodeType::Output, 1));
        }
        genome.push_node(NodeGene::new(inputs + outputs, NodeType::Input, 0));

        Ok(genome)
    }

    /// Adds a node to the genome.
    /// Returns a reference to the new node.
    ///
    /// # Panics
    /// This function panics if a node with the
    /// same id already exists in the genome.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, NodeGene, NodeType};
    ///
    /// let mut genome = Genome::new(2, 1).unwrap();
    /// genome.add_node_gene(NodeGene::new(4, NodeType::Hidden, 1));
    ///
    /// assert_eq!(genome.nodes().count(), 2 + 1 + 1 + 1);
    /// // The output layer was already above the new node.
    /// assert_eq!(genome.layer_count(), 2);
    /// ```
    pub fn add_node_gene(&mut self, node: NodeGene) -> &mut NodeGene {
        if self.node_index.contains_key(&node.id()) {
            panic!("duplicate node insertion with id {} in\n{}", node.id(), self);
        }
        self.layer_count = self.layer_count.max(node.layer() + 1);
        self.push_node(node)
    }

    fn push_node(&mut self, node: NodeGene) -> &mut NodeGene {
        let position = self.nodes.len();
        self.node_index.insert(node.id(), position);
        self.next_node_id = self.next_node_id.max(node.id() + 1);
        self.nodes.push(node);
        &mut self.nodes[position]
    }

    /// Adds a connection gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Panics
    /// This function panics if a gene with the same innovation
    /// number already exists, if either endpoint is missing
    /// from the genome, or if the gene would not run from a
    /// lower layer to a strictly higher one.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ConnectionGene, Genome};
    ///
    /// let mut genome = Genome::new(2, 1).unwrap();
    /// genome.add_connection_gene(ConnectionGene::new(7, 0, 2, 0.5));
    ///
    /// assert_eq!(genome.connection(7).unwrap().weight(), 0.5);
    /// ```
    pub fn add_connection_gene(&mut self, gene: ConnectionGene) -> &mut ConnectionGene {
        if self.connection_index.contains_key(&gene.innovation()) {
            panic!("duplicate gene insertion with id {} in\n{}", gene.innovation(), self);
        }
        let (input, output) = match (self.node(gene.input()), self.node(gene.output())) {
            (Some(input), Some(output)) => (input, output),
            _ => panic!(
                "gene insertion between nonexistant endpoint(s) {} -> {}",
                gene.input(),
                gene.output()
            ),
        };
        if input.layer() >= output.layer() {
            panic!(
                "gene {} -> {} does not run to a higher layer ({} -> {})",
                gene.input(),
                gene.output(),
                input.layer(),
                output.layer()
            );
        }
        self.push_connection(gene)
    }

    fn push_connection(&mut self, gene: ConnectionGene) -> &mut ConnectionGene {
        let position = self.connections.len();
        self.connection_index.insert(gene.innovation(), position);
        self.connections.push(gene);
        &mut self.connections[position]
    }

    /// Mutates the genome.
    ///
    /// A genome without connections is first connected completely,
    /// so that no genome is ever left without a path from its inputs
    /// to its outputs. Then, independently and in this order, weights
    /// are mutated, a connection is added and a node is added, each
    /// with its configured chance.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, GeneticConfig, InnovationHistory};
    ///
    /// let mut rng = rand::thread_rng();
    /// let mut history = InnovationHistory::new();
    /// let mut genome = Genome::new(2, 1).unwrap();
    ///
    /// // Even with every mutation disabled, the first
    /// // mutation connects every input to every output.
    /// genome.mutate(&mut rng, &mut history, &GeneticConfig::zero());
    ///
    /// assert_eq!(genome.connections().count(), (2 + 1) * 1);
    /// assert!(genome.is_fully_connected());
    /// ```
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        history: &mut InnovationHistory,
        config: &GeneticConfig,
    ) {
        if self.connections.is_empty() {
            while !self.is_fully_connected() {
                let _ = self.add_connection_mutation(rng, history, config, None);
            }
        }

        if rng.gen::<f32>() < config.weight_mutation_chance {
            self.mutate_weights(rng, config);
        }
        if rng.gen::<f32>() < config.gene_addition_mutation_chance {
            let _ = self.mutate_add_connection(rng, history, config);
        }
        if rng.gen::<f32>() < config.node_addition_mutation_chance {
            let _ = self.mutate_add_node(rng, history);
        }
    }

    /// Induces a _weight mutation_ in the genome.
    ///
    /// Each gene's weight is either reset to a random value
    /// in `[-weight_bound, weight_bound]`, with probability
    /// [`weight_reset_chance`], or nudged by a small Gaussian amount.
    ///
    /// [`weight_reset_chance`]: GeneticConfig::weight_reset_chance
    pub fn mutate_weights<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &GeneticConfig) {
        for gene in &mut self.connections {
            if rng.gen::<f32>() < config.weight_reset_chance {
                gene.randomize_weight(rng, config);
            } else {
                gene.nudge_weight(rng, config);
            }
        }
    }

    /// Induces a _gene mutation_ in the genome, connecting two
    /// previously unconnected nodes in different layers.
    /// If successful, returns the newly added gene.
    ///
    /// Node pairs are sampled uniformly until a viable one is found,
    /// or until [`max_gene_addition_mutation_attempts`] is reached.
    ///
    /// # Errors
    /// Returns an error if the genome is already fully connected,
    /// or if the configured number of attempts is exhausted.
    ///
    /// [`max_gene_addition_mutation_attempts`]: GeneticConfig::max_gene_addition_mutation_attempts
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, GeneticConfig, InnovationHistory};
    ///
    /// let mut rng = rand::thread_rng();
    /// let mut history = InnovationHistory::new();
    /// let config = GeneticConfig::default();
    /// let mut genome = Genome::new(1, 1).unwrap();
    ///
    /// let gene = genome.mutate_add_connection(&mut rng, &mut history, &config).unwrap();
    /// assert_eq!(gene.output(), 1);
    ///
    /// genome.mutate_add_connection(&mut rng, &mut history, &config).unwrap();
    /// assert!(genome.is_fully_connected());
    /// assert!(genome.mutate_add_connection(&mut rng, &mut history, &config).is_err());
    /// ```
    pub fn mutate_add_connection<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        history: &mut InnovationHistory,
        config: &GeneticConfig,
    ) -> Result<&ConnectionGene, GeneAdditionMutationError> {
        self.add_connection_mutation(
            rng,
            history,
            config,
            config.max_gene_addition_mutation_attempts,
        )
    }

    fn add_connection_mutation<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        history: &mut InnovationHistory,
        config: &GeneticConfig,
        max_attempts: Option<usize>,
    ) -> Result<&ConnectionGene, GeneAdditionMutationError> {
        if self.is_fully_connected() {
            return Err(GeneAdditionMutationError::GenomeFullyConnected);
        }

        let (first, second) = self.sample_connectable_pair(rng, max_attempts)?;
        let (source, target) = if first.layer() > second.layer() {
            (second.id(), first.id())
        } else {
            (first.id(), second.id())
        };

        let weight = ConnectionGene::random_weight(rng, config);
        let innovation = history.number_for(source, target);
        Ok(self.push_connection(ConnectionGene::new(innovation, source, target, weight)))
    }

    fn sample_connectable_pair<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_attempts: Option<usize>,
    ) -> Result<(&NodeGene, &NodeGene), GeneAdditionMutationError> {
        let mut attempts = 0;
        loop {
            if let Some(max) = max_attempts {
                if attempts >= max {
                    return Err(GeneAdditionMutationError::AttemptsExhausted(max));
                }
            }
            attempts += 1;

            let first = &self.nodes[rng.gen_range(0..self.nodes.len())];
            let second = &self.nodes[rng.gen_range(0..self.nodes.len())];
            if first.layer() != second.layer() && !self.are_connected(first.id(), second.id()) {
                return Ok((first, second));
            }
        }
    }

    /// Whether a gene exists between the nodes, in either direction.
    fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.connections
            .iter()
            .any(|g| g.endpoints() == (a, b) || g.endpoints() == (b, a))
    }

    /// Induces a _node mutation_ in the genome: a random gene
    /// is disabled and split in two by a new hidden node.
    /// Genes starting at the bias node are only split when no
    /// other gene exists.
    ///
    /// If successful, returns the triplet (_in gene_, _new node_, _out gene_).
    /// The in gene has a weight of 1, and the out gene inherits the
    /// weight of the split gene. If the new node would share a layer
    /// with the split gene's target, a new layer is inserted for it.
    ///
    /// # Errors
    /// Returns an error if the genome has no genes.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ConnectionGene, Genome, InnovationHistory, NodeType};
    ///
    /// let mut rng = rand::thread_rng();
    /// let mut history = InnovationHistory::new();
    /// let mut genome = Genome::new(1, 1).unwrap();
    /// let innovation = history.number_for(0, 1);
    /// genome.add_connection_gene(ConnectionGene::new(innovation, 0, 1, 0.7));
    ///
    /// let (in_gene, node, out_gene) = genome.mutate_add_node(&mut rng, &mut history).unwrap();
    /// let (in_gene, node, out_gene) = (in_gene.clone(), node.clone(), out_gene.clone());
    ///
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    /// assert_eq!(node.layer(), 1);
    /// assert_eq!(in_gene.endpoints(), (0, node.id()));
    /// assert_eq!(in_gene.weight(), 1.0);
    /// assert_eq!(out_gene.endpoints(), (node.id(), 1));
    /// assert_eq!(out_gene.weight(), 0.7);
    ///
    /// // The split gene is disabled, and the output moved up a layer.
    /// assert!(!genome.connection(innovation).unwrap().expressed());
    /// assert_eq!(genome.node(1).unwrap().layer(), 2);
    /// assert_eq!(genome.layer_count(), 3);
    /// ```
    pub fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        history: &mut InnovationHistory,
    ) -> Result<(&ConnectionGene, &NodeGene, &ConnectionGene), NodeAdditionMutationError> {
        let split = self
            .choose_gene_to_split(rng)
            .ok_or(NodeAdditionMutationError::EmptyGenome)?;

        self.connections[split].disable();
        let (source, target) = self.connections[split].endpoints();
        let weight = self.connections[split].weight();

        let new_id = self.next_node_id;
        let new_layer = self.node_layer(source) + 1;
        if new_layer == self.node_layer(target) {
            for node in self.nodes.iter_mut().filter(|n| n.layer() >= new_layer) {
                node.increment_layer();
            }
            self.layer_count += 1;
        }
        self.push_node(NodeGene::new(new_id, NodeType::Hidden, new_layer));

        let in_innovation = history.number_for(source, new_id);
        let out_innovation = history.number_for(new_id, target);
        self.push_connection(ConnectionGene::new(in_innovation, source, new_id, 1.0));
        self.push_connection(ConnectionGene::new(out_innovation, new_id, target, weight));

        let gene_count = self.connections.len();
        Ok((
            &self.connections[gene_count - 2],
            &self.nodes[self.nodes.len() - 1],
            &self.connections[gene_count - 1],
        ))
    }

    /// Picks the position of a random gene, avoiding genes
    /// that start at the bias node whenever possible.
    fn choose_gene_to_split<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.connections.is_empty() {
            return None;
        }
        let candidates: Vec<usize> = (0..self.connections.len())
            .filter(|&i| self.connections[i].input() != self.bias)
            .collect();
        if candidates.is_empty() {
            Some(rng.gen_range(0..self.connections.len()))
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }

    fn node_layer(&self, id: NodeId) -> usize {
        self.nodes[self.node_index[&id]].layer()
    }

    /// Returns whether every pair of nodes in different
    /// layers is connected.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ConnectionGene, Genome};
    ///
    /// let mut genome = Genome::new(1, 1).unwrap();
    /// assert!(!genome.is_fully_connected());
    ///
    /// // Input 0 and bias 2 to output 1.
    /// genome.add_connection_gene(ConnectionGene::new(0, 0, 1, 1.0));
    /// assert!(!genome.is_fully_connected());
    /// genome.add_connection_gene(ConnectionGene::new(1, 2, 1, 1.0));
    /// assert!(genome.is_fully_connected());
    /// ```
    pub fn is_fully_connected(&self) -> bool {
        let mut nodes_in_layer = vec![0usize; self.layer_count];
        for node in &self.nodes {
            nodes_in_layer[node.layer()] += 1;
        }

        let mut nodes_in_front = self.nodes.len();
        let mut total_connections = 0;
        for count in nodes_in_layer {
            nodes_in_front -= count;
            total_connections += count * nodes_in_front;
        }

        self.connections.len() == total_connections
    }

    /// Evaluates the network on an input vector,
    /// returning the activation of each output node
    /// in creation order.
    ///
    /// Nodes are fired in ascending layer order: every
    /// expressed gene leaving a non-output node adds
    /// `sigmoid(source input) × weight` to its target's input.
    /// The bias node always receives 1.
    ///
    /// # Errors
    /// Returns an error if `inputs` does not have one
    /// value per input node.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{sigmoid, ConnectionGene, Genome};
    ///
    /// let mut genome = Genome::new(2, 1).unwrap();
    /// genome.add_connection_gene(ConnectionGene::new(0, 0, 2, 0.5));
    /// genome.add_connection_gene(ConnectionGene::new(1, 3, 2, -1.0));
    ///
    /// let output = genome.feed_forward(&[1.0, 0.0]).unwrap();
    /// let expected = sigmoid(sigmoid(1.0) * 0.5 - sigmoid(1.0));
    /// assert!((output[0] - expected).abs() < 1e-6);
    ///
    /// assert!(genome.feed_forward(&[1.0]).is_err());
    /// ```
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<Vec<f32>, GenomeError> {
        if inputs.len() != self.input_count {
            return Err(GenomeError::InputLengthMismatch {
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        for node in &mut self.nodes {
            node.reset();
        }
        for (node, input) in self.nodes.iter_mut().zip(inputs) {
            node.add_to_input(*input);
        }
        let bias = self.node_index[&self.bias];
        self.nodes[bias].add_to_input(1.0);

        // A node's input is complete once every gene from
        // the layers below it has fired.
        let mut firing_order: Vec<usize> = (0..self.connections.len()).collect();
        firing_order.sort_by_key(|&i| self.node_layer(self.connections[i].input()));

        for i in firing_order {
            let gene = &self.connections[i];
            if !gene.expressed() {
                continue;
            }
            let source = &self.nodes[self.node_index[&gene.input()]];
            if source.node_type() == NodeType::Output {
                continue;
            }
            let signal = source.output() * gene.weight();
            let target = self.node_index[&gene.output()];
            self.nodes[target].add_to_input(signal);
        }

        Ok(self.nodes[self.input_count..self.input_count + self.output_count]
            .iter()
            .map(NodeGene::output)
            .collect())
    }

    /// Combines two genomes and returns their _child_.
    ///
    /// The child inherits every node of the `fitter` parent. Genes
    /// of the `fitter` parent are all inherited; if a gene matches
    /// one in `other` and either copy is disabled, the child's copy
    /// is disabled with probability [`gene_disable_chance`].
    /// Genes only present in `other` are never inherited.
    ///
    /// [`gene_disable_chance`]: GeneticConfig::gene_disable_chance
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ConnectionGene, Genome, GeneticConfig};
    ///
    /// let mut fitter = Genome::new(2, 1).unwrap();
    /// fitter.add_connection_gene(ConnectionGene::new(0, 0, 2, 0.5));
    /// fitter.add_connection_gene(ConnectionGene::new(1, 1, 2, 0.25));
    ///
    /// let mut other = Genome::new(2, 1).unwrap();
    /// other.add_connection_gene(ConnectionGene::new(0, 0, 2, -0.5));
    /// other.add_connection_gene(ConnectionGene::new(2, 3, 2, 1.0));
    ///
    /// let child = Genome::crossover(&fitter, &other, &mut rand::thread_rng(), &GeneticConfig::default());
    ///
    /// assert_eq!(child.connections().map(|g| g.innovation()).collect::<Vec<_>>(), vec![0, 1]);
    /// assert_eq!(child.connection(0).unwrap().weight(), 0.5);
    /// ```
    pub fn crossover<R: Rng + ?Sized>(
        fitter: &Genome,
        other: &Genome,
        rng: &mut R,
        config: &GeneticConfig,
    ) -> Genome {
        let mut child = Genome {
            nodes: fitter.nodes.clone(),
            node_index: fitter.node_index.clone(),
            next_node_id: fitter.next_node_id,
            connections: Vec::with_capacity(fitter.connections.len()),
            connection_index: HashMap::default(),
            bias: fitter.bias,
            input_count: fitter.input_count,
            output_count: fitter.output_count,
            layer_count: fitter.layer_count,
        };

        for gene in &fitter.connections {
            let mut inherited = gene.clone();
            if let Some(matching) = other.connection(gene.innovation()) {
                if (!gene.expressed() || !matching.expressed())
                    && rng.gen::<f32>() < config.gene_disable_chance
                {
                    inherited.disable();
                }
            }
            child.push_connection(inherited);
        }

        child
    }

    /// Calculates the _compatibility distance_ of a `candidate`
    /// genome to a species `representative`.
    ///
    /// The distance is
    /// `excess_disjoint_gene_factor × (excess + disjoint) / N + common_weight_factor × W`,
    /// where `N` is the candidate's gene count minus
    /// [`large_genome_threshold`] (at least 1), and `W` the mean absolute
    /// weight difference of matching genes. If the genomes share no genes,
    /// `W` is 0 when either genome is empty, and
    /// [`no_common_genes_weight_difference`] otherwise.
    ///
    /// [`large_genome_threshold`]: GeneticConfig::large_genome_threshold
    /// [`no_common_genes_weight_difference`]: GeneticConfig::no_common_genes_weight_difference
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ConnectionGene, Genome, GeneticConfig};
    ///
    /// let config = GeneticConfig::default();
    /// let mut first = Genome::new(2, 1).unwrap();
    /// first.add_connection_gene(ConnectionGene::new(0, 0, 2, 1.0));
    /// first.add_connection_gene(ConnectionGene::new(1, 1, 2, 1.0));
    /// let mut second = Genome::new(2, 1).unwrap();
    /// second.add_connection_gene(ConnectionGene::new(0, 0, 2, 0.5));
    /// second.add_connection_gene(ConnectionGene::new(2, 3, 2, 1.0));
    ///
    /// // Two unmatched genes, and a weight difference of 0.5.
    /// let distance = Genome::genetic_distance(&first, &second, &config);
    /// assert!((distance - (1.0 * 2.0 + 0.4 * 0.5)).abs() < 1e-6);
    ///
    /// assert_eq!(Genome::genetic_distance(&first, &first.clone(), &config), 0.0);
    /// ```
    pub fn genetic_distance(
        representative: &Genome,
        candidate: &Genome,
        config: &GeneticConfig,
    ) -> f32 {
        let (matching, weight_difference_sum) = representative
            .connections
            .iter()
            .filter_map(|gene| {
                candidate
                    .connection(gene.innovation())
                    .map(|other| (gene.weight() - other.weight()).abs())
            })
            .fold((0usize, 0.0f32), |(count, sum), diff| (count + 1, sum + diff));

        let unmatched =
            representative.connections.len() + candidate.connections.len() - 2 * matching;
        let normalizer = candidate
            .connections
            .len()
            .saturating_sub(config.large_genome_threshold)
            .max(1);

        let mean_weight_difference =
            if representative.connections.is_empty() || candidate.connections.is_empty() {
                0.0
            } else if matching == 0 {
                config.no_common_genes_weight_difference
            } else {
                weight_difference_sum / matching as f32
            };

        config.excess_disjoint_gene_factor * unmatched as f32 / normalizer as f32
            + config.common_weight_factor * mean_weight_difference
    }

    /// Returns an iterator over the genome's nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeGene> {
        self.nodes.iter()
    }

    /// Returns an iterator over the genome's genes, in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionGene> {
        self.connections.iter()
    }

    /// Returns the node with the specified id, if present.
    pub fn node(&self, id: NodeId) -> Option<&NodeGene> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Returns the gene with the specified innovation number, if present.
    pub fn connection(&self, innovation: Innovation) -> Option<&ConnectionGene> {
        self.connection_index
            .get(&innovation)
            .map(|&i| &self.connections[i])
    }

    /// Returns a mutable reference to the gene with the
    /// specified innovation number, if present.
    pub fn connection_mut(&mut self, innovation: Innovation) -> Option<&mut ConnectionGene> {
        match self.connection_index.get(&innovation) {
            Some(&i) => Some(&mut self.connections[i]),
            None => None,
        }
    }

    /// Returns the id of the bias node.
    pub fn bias_node(&self) -> NodeId {
        self.bias
    }

    /// Returns the number of network inputs, excluding the bias.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of network outputs.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Returns the number of layers in the network.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn connected_genome(
        inputs: usize,
        outputs: usize,
        rng: &mut StdRng,
        history: &mut InnovationHistory,
    ) -> Genome {
        let mut genome = Genome::new(inputs, outputs).unwrap();
        genome.mutate(rng, history, &GeneticConfig::zero());
        genome
    }

    #[test]
    fn new_rejects_empty_shapes() {
        assert_eq!(
            Genome::new(0, 1),
            Err(GenomeError::InvalidShape {
                inputs: 0,
                outputs: 1
            })
        );
        assert!(Genome::new(1, 0).is_err());
    }

    #[test]
    fn new_node_layout() {
        let genome = Genome::new(3, 2).unwrap();
        let layout: Vec<_> = genome
            .nodes()
            .map(|n| (n.id(), n.node_type(), n.layer()))
            .collect();
        assert_eq!(
            layout,
            vec![
                (0, NodeType::Input, 0),
                (1, NodeType::Input, 0),
                (2, NodeType::Input, 0),
                (3, NodeType::Output, 1),
                (4, NodeType::Output, 1),
                (5, NodeType::Input, 0),
            ]
        );
    }

    #[test]
    fn bootstrap_overrides_zero_chances() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut history = InnovationHistory::new();
        let genome = connected_genome(2, 1, &mut rng, &mut history);

        assert_eq!(genome.connections().count(), 3);
        assert!(genome.connections().all(|g| g.output() == 2));
        assert!(genome.is_fully_connected());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn fully_connected_equivalence() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut history = InnovationHistory::new();
        for inputs in 1..6 {
            for outputs in 1..4 {
                let mut genome = Genome::new(inputs, outputs).unwrap();
                let config = GeneticConfig::default();
                for _ in 0..(inputs + 1) * outputs {
                    assert!(!genome.is_fully_connected());
                    genome
                        .mutate_add_connection(&mut rng, &mut history, &config)
                        .unwrap();
                }
                assert_eq!(genome.connections().count(), (inputs + 1) * outputs);
                assert!(genome.is_fully_connected());
                assert_eq!(
                    genome.mutate_add_connection(&mut rng, &mut history, &config).err(),
                    Some(GeneAdditionMutationError::GenomeFullyConnected)
                );
            }
        }
    }

    #[test]
    fn gene_addition_respects_attempt_cap() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut history = InnovationHistory::new();
        let mut genome = Genome::new(2, 2).unwrap();
        let config = GeneticConfig {
            max_gene_addition_mutation_attempts: Some(0),
            ..GeneticConfig::default()
        };
        assert_eq!(
            genome.mutate_add_connection(&mut rng, &mut history, &config).err(),
            Some(GeneAdditionMutationError::AttemptsExhausted(0))
        );
        assert_eq!(genome.connections().count(), 0);
    }

    #[test]
    fn added_genes_run_upwards() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut history = InnovationHistory::new();
        let mut genome = connected_genome(3, 2, &mut rng, &mut history);
        let config = GeneticConfig::default();
        for _ in 0..20 {
            let _ = genome.mutate_add_node(&mut rng, &mut history);
            let _ = genome.mutate_add_connection(&mut rng, &mut history, &config);
        }
        for gene in genome.connections() {
            let (input, output) = gene.endpoints();
            assert!(genome.node(input).unwrap().layer() < genome.node(output).unwrap().layer());
        }
        assert!(genome.nodes().all(|n| n.layer() < genome.layer_count()));
    }

    #[test]
    fn node_addition_avoids_bias_genes() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut history = InnovationHistory::new();
        let mut genome = Genome::new(1, 1).unwrap();
        genome.add_connection_gene(ConnectionGene::new(history.number_for(2, 1), 2, 1, 0.3));
        genome.add_connection_gene(ConnectionGene::new(history.number_for(0, 1), 0, 1, 0.6));

        for _ in 0..10 {
            let mut copy = genome.clone();
            copy.mutate_add_node(&mut rng, &mut history).unwrap();
            assert!(copy.connection(0).unwrap().expressed());
            assert!(!copy.connection(1).unwrap().expressed());
        }
    }

    #[test]
    fn node_addition_on_lone_bias_gene() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut history = InnovationHistory::new();
        let mut genome = Genome::new(1, 1).unwrap();
        genome.add_connection_gene(ConnectionGene::new(history.number_for(2, 1), 2, 1, 0.3));

        let (in_gene, _, _) = genome.mutate_add_node(&mut rng, &mut history).unwrap();
        assert_eq!(in_gene.input(), 2);
    }

    #[test]
    fn node_addition_on_empty_genome() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut history = InnovationHistory::new();
        let mut genome = Genome::new(1, 1).unwrap();
        assert_eq!(
            genome.mutate_add_node(&mut rng, &mut history).err(),
            Some(NodeAdditionMutationError::EmptyGenome)
        );
    }

    #[test]
    fn node_addition_reuses_existing_layer() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut history = InnovationHistory::new();
        let mut genome = Genome::new(1, 1).unwrap();
        genome.add_node_gene(NodeGene::new(3, NodeType::Hidden, 1));
        let output = genome.node_index[&1];
        genome.nodes[output].increment_layer();
        genome.layer_count = 3;
        genome.add_connection_gene(ConnectionGene::new(history.number_for(0, 1), 0, 1, 0.5));

        let (_, node, _) = genome.mutate_add_node(&mut rng, &mut history).unwrap();
        assert_eq!(node.layer(), 1);
        assert_eq!(genome.layer_count(), 3);
        assert_eq!(genome.node(1).unwrap().layer(), 2);
    }

    #[test]
    fn node_addition_after_sparse_ids() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut history = InnovationHistory::new();
        let mut genome = Genome::new(1, 1).unwrap();
        genome.add_node_gene(NodeGene::new(4, NodeType::Hidden, 0));
        genome.add_connection_gene(ConnectionGene::new(history.number_for(0, 1), 0, 1, 0.5));

        let (_, node, _) = genome.mutate_add_node(&mut rng, &mut history).unwrap();
        assert_eq!(node.id(), 5);

        let mut ids: Vec<_> = genome.nodes().map(|n| n.id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 4, 5]);
        assert_eq!(genome.node(4).unwrap().node_type(), NodeType::Hidden);
        assert_eq!(genome.node(4).unwrap().layer(), 0);

        let config = GeneticConfig::default();
        let mut child = Genome::crossover(&genome, &genome.clone(), &mut rng, &config);
        let (_, node, _) = child.mutate_add_node(&mut rng, &mut history).unwrap();
        assert_eq!(node.id(), 6);
    }

    #[test]
    fn weight_mutation_reset_only() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut history = InnovationHistory::new();
        let mut genome = connected_genome(3, 2, &mut rng, &mut history);
        let config = GeneticConfig {
            weight_reset_chance: 1.0,
            weight_bound: 0.25,
            ..GeneticConfig::zero()
        };
        genome.mutate_weights(&mut rng, &config);
        assert!(genome.connections().all(|g| g.weight().abs() <= 0.25));
    }

    #[test]
    fn clone_shares_nothing() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut history = InnovationHistory::new();
        let genome = connected_genome(2, 2, &mut rng, &mut history);
        let mut copy = genome.clone();
        assert_eq!(copy, genome);

        let first = copy.connections().next().unwrap().innovation();
        copy.connection_mut(first).unwrap().set_weight(42.0);
        copy.mutate_add_node(&mut rng, &mut history).unwrap();

        assert_ne!(genome.connection(first).unwrap().weight(), 42.0);
        assert_eq!(genome.nodes().count(), 2 + 2 + 1);
        assert_eq!(genome.connections().count(), 3 * 2);
    }

    #[test]
    fn feed_forward_through_hidden_layer() {
        let mut genome = Genome::new(2, 1).unwrap();
        genome.add_node_gene(NodeGene::new(4, NodeType::Hidden, 1));
        let output = genome.node_index[&2];
        genome.nodes[output].increment_layer();
        genome.layer_count = 3;
        genome.add_connection_gene(ConnectionGene::new(0, 0, 4, 2.0));
        genome.add_connection_gene(ConnectionGene::new(1, 1, 4, -1.0));
        genome.add_connection_gene(ConnectionGene::new(2, 4, 2, 1.5));
        genome.add_connection_gene(ConnectionGene::new(3, 3, 2, 0.5));
        let mut disabled = ConnectionGene::new(4, 0, 2, 100.0);
        disabled.disable();
        genome.add_connection_gene(disabled);

        let (a, b) = (0.3, 0.9);
        let hidden = sigmoid(a) * 2.0 + sigmoid(b) * -1.0;
        let expected = sigmoid(sigmoid(hidden) * 1.5 + sigmoid(1.0) * 0.5);
        let output = genome.feed_forward(&[a, b]).unwrap();
        assert_eq!(output.len(), 1);
        assert!((output[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn feed_forward_rejects_bad_lengths() {
        let mut genome = Genome::new(3, 1).unwrap();
        assert_eq!(
            genome.feed_forward(&[0.0; 4]),
            Err(GenomeError::InputLengthMismatch {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn unconnected_outputs_rest_at_half() {
        let mut genome = Genome::new(2, 3).unwrap();
        assert_eq!(genome.feed_forward(&[1.0, -1.0]).unwrap(), vec![0.5; 3]);
    }

    #[test]
    fn crossover_disable_chance() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut fitter = Genome::new(1, 1).unwrap();
        fitter.add_connection_gene(ConnectionGene::new(0, 0, 1, 0.5));
        let mut other = fitter.clone();
        other.connection_mut(0).unwrap().disable();

        let always = GeneticConfig {
            gene_disable_chance: 1.0,
            ..GeneticConfig::zero()
        };
        let child = Genome::crossover(&fitter, &other, &mut rng, &always);
        assert!(!child.connection(0).unwrap().expressed());

        let never = GeneticConfig::zero();
        let child = Genome::crossover(&fitter, &other, &mut rng, &never);
        assert!(child.connection(0).unwrap().expressed());

        // A gene disabled in the fitter parent stays disabled.
        let child = Genome::crossover(&other, &fitter, &mut rng, &never);
        assert!(!child.connection(0).unwrap().expressed());
    }

    #[test]
    fn crossover_keeps_fitter_structure() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut history = InnovationHistory::new();
        let config = GeneticConfig::default();
        let base = connected_genome(2, 1, &mut rng, &mut history);
        let mut fitter = base.clone();
        fitter.mutate_add_node(&mut rng, &mut history).unwrap();

        let child = Genome::crossover(&fitter, &base, &mut rng, &config);
        assert_eq!(child.layer_count(), fitter.layer_count());
        assert_eq!(child.bias_node(), fitter.bias_node());
        assert_eq!(
            child.nodes().map(|n| (n.id(), n.layer())).collect::<Vec<_>>(),
            fitter.nodes().map(|n| (n.id(), n.layer())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn distance_without_common_genes() {
        let config = GeneticConfig::default();
        let empty = Genome::new(1, 1).unwrap();
        let mut first = Genome::new(1, 1).unwrap();
        first.add_connection_gene(ConnectionGene::new(0, 0, 1, 1.0));
        let mut second = Genome::new(1, 1).unwrap();
        second.add_connection_gene(ConnectionGene::new(1, 2, 1, 1.0));

        assert_eq!(Genome::genetic_distance(&empty, &first, &config), 1.0);
        assert_eq!(Genome::genetic_distance(&first, &empty, &config), 1.0);
        assert_eq!(
            Genome::genetic_distance(&first, &second, &config),
            2.0 + 0.4 * 100.0
        );
    }

    #[test]
    fn distance_normalizes_large_candidates() {
        let config = GeneticConfig::default();
        let mut rng = StdRng::seed_from_u64(14);
        let mut history = InnovationHistory::new();
        // 6 inputs + bias to 4 outputs: 28 genes.
        let large = connected_genome(6, 4, &mut rng, &mut history);
        let empty = Genome::new(6, 4).unwrap();

        assert_eq!(
            Genome::genetic_distance(&empty, &large, &config),
            28.0 / (28 - 20) as f32
        );
        assert_eq!(Genome::genetic_distance(&large, &empty, &config), 28.0);
    }

    #[test]
    fn serializes_structure_without_scratch() {
        let mut genome = Genome::new(1, 1).unwrap();
        genome.add_connection_gene(ConnectionGene::new(0, 0, 1, 0.5));
        genome.feed_forward(&[1.0]).unwrap();

        let json = serde_json::to_value(&genome).unwrap();
        assert_eq!(json["bias"], 2);
        assert_eq!(json["layer_count"], 2);
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["nodes"][1]["node_type"], "Output");
        assert!(json["nodes"][1].get("input_sum").is_none());
        assert_eq!(json["connections"][0]["weight"], 0.5);
        assert!(json.get("node_index").is_none());
    }

    fn evolved_genome(seed: u64, steps: usize) -> (Genome, InnovationHistory) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut history = InnovationHistory::new();
        let config = GeneticConfig {
            node_addition_mutation_chance: 0.5,
            gene_addition_mutation_chance: 0.5,
            ..GeneticConfig::default()
        };
        let mut genome = Genome::new(3, 2).unwrap();
        for _ in 0..steps {
            genome.mutate(&mut rng, &mut history, &config);
        }
        (genome, history)
    }

    proptest! {
        #[test]
        fn feed_forward_is_pure(
            seed in any::<u64>(),
            steps in 1usize..15,
            inputs in prop::collection::vec(-5.0f32..5.0, 3),
        ) {
            let (mut genome, _) = evolved_genome(seed, steps);
            let mut copy = genome.clone();
            let first = genome.feed_forward(&inputs).unwrap();
            let second = genome.feed_forward(&inputs).unwrap();
            let third = copy.feed_forward(&inputs).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &third);
        }

        #[test]
        fn crossover_inherits_only_from_fitter(seed in any::<u64>(), steps in 1usize..10) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut history = InnovationHistory::new();
            let config = GeneticConfig {
                node_addition_mutation_chance: 0.5,
                gene_addition_mutation_chance: 0.5,
                ..GeneticConfig::default()
            };
            let mut fitter = Genome::new(2, 2).unwrap();
            let mut other = Genome::new(2, 2).unwrap();
            for _ in 0..steps {
                fitter.mutate(&mut rng, &mut history, &config);
                other.mutate(&mut rng, &mut history, &config);
            }

            let child = Genome::crossover(&fitter, &other, &mut rng, &config);
            prop_assert_eq!(child.connections().count(), fitter.connections().count());
            for gene in child.connections() {
                let source = fitter.connection(gene.innovation());
                prop_assert!(source.is_some());
                let source = source.unwrap();
                prop_assert_eq!(gene.endpoints(), source.endpoints());
                prop_assert_eq!(gene.weight(), source.weight());
                let both_expressed = source.expressed()
                    && other.connection(gene.innovation()).map_or(true, |g| g.expressed());
                if both_expressed {
                    prop_assert!(gene.expressed());
                }
            }
        }

        #[test]
        fn identical_clones_have_zero_distance(seed in any::<u64>(), steps in 0usize..10) {
            let (genome, _) = evolved_genome(seed, steps);
            prop_assert_eq!(
                Genome::genetic_distance(&genome, &genome.clone(), &GeneticConfig::default()),
                0.0
            );
        }
    }
}
