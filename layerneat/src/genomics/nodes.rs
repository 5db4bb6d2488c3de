use crate::NodeId;

use serde::Serialize;

use std::fmt;

/// A NodeType indicates the function of
/// the node in the evaluated network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    /// Input nodes, including the bias node.
    Input,
    /// Hidden nodes, created by node addition mutations.
    Hidden,
    /// Output nodes.
    Output,
}

/// Nodes are the structural elements of genomes
/// between which connections are created.
///
/// Every node lives in a _layer_. Connections only
/// ever run from a lower layer to a strictly higher one,
/// which keeps the network acyclic.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct NodeGene {
    id: NodeId,
    node_type: NodeType,
    layer: usize,
    #[serde(skip)]
    input_sum: f32,
}

impl NodeGene {
    /// Generate a new node with the passed parameters.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{NodeGene, NodeType};
    ///
    /// let node = NodeGene::new(5, NodeType::Hidden, 1);
    ///
    /// assert_eq!(node.id(), 5);
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    /// assert_eq!(node.layer(), 1);
    /// ```
    pub fn new(id: NodeId, node_type: NodeType, layer: usize) -> NodeGene {
        NodeGene {
            id,
            node_type,
            layer,
            input_sum: 0.0,
        }
    }

    /// Returns the node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's type.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns the layer the node occupies.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Moves the node one layer up.
    pub(super) fn increment_layer(&mut self) {
        self.layer += 1;
    }

    /// Returns the accumulated input of the
    /// last evaluation the node took part in.
    pub fn input_sum(&self) -> f32 {
        self.input_sum
    }

    pub(super) fn reset(&mut self) {
        self.input_sum = 0.0;
    }

    pub(super) fn add_to_input(&mut self, value: f32) {
        self.input_sum += value;
    }

    /// The node's activation, i.e. the steepened
    /// sigmoid of its accumulated input.
    pub(super) fn output(&self) -> f32 {
        sigmoid(self.input_sum)
    }
}

/// Steepened logistic function, `1 / (1 + e^(-4.9x))`.
///
/// # Examples
/// ```
/// use layerneat::genomics::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert!(sigmoid(1.0) > 0.99);
/// assert!(sigmoid(-1.0) < 0.01);
/// ```
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-4.9 * x).exp())
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "INPUT",
            Self::Hidden => "HIDDEN",
            Self::Output => "OUTPUT",
        };
        // Padding is honoured so the diagnostic dump can align columns.
        f.pad(name)
    }
}

impl fmt::Display for NodeGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, layer {}]", self.id, self.node_type, self.layer)
    }
}
