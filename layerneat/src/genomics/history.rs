use crate::{Innovation, NodeId};

use ahash::RandomState;
use serde::Serialize;

use std::collections::HashMap;

/// An `InnovationHistory` keeps track of the connection
/// innovations of a run, in order to make sure identical
/// mutations are assigned the same innovation numbers.
///
/// Connections are identified by their ordered
/// `(input node, output node)` pair; the reversed pair is
/// a different innovation. Numbers are handed out in order
/// of first request, starting at 0, and the history is never
/// pruned.
///
/// The history is only mutated during reproduction, so it
/// is passed explicitly to every operation that may create
/// a connection rather than being shared globally.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InnovationHistory {
    endpoints: Vec<(NodeId, NodeId)>,
    #[serde(skip)]
    innovations: HashMap<(NodeId, NodeId), Innovation, RandomState>,
}

impl InnovationHistory {
    /// Creates an empty history.
    pub fn new() -> InnovationHistory {
        InnovationHistory::default()
    }

    /// Returns the innovation number of the connection
    /// `input -> output`, registering it as a new innovation
    /// if it has never been seen before.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::InnovationHistory;
    ///
    /// let mut history = InnovationHistory::new();
    ///
    /// assert_eq!(history.number_for(0, 3), 0);
    /// assert_eq!(history.number_for(1, 3), 1);
    /// // Same pair, same number.
    /// assert_eq!(history.number_for(0, 3), 0);
    /// // Reversed pairs are different innovations.
    /// assert_eq!(history.number_for(3, 0), 2);
    /// ```
    pub fn number_for(&mut self, input: NodeId, output: NodeId) -> Innovation {
        let next = self.endpoints.len();
        let innovation = *self.innovations.entry((input, output)).or_insert(next);
        if innovation == next {
            self.endpoints.push((input, output));
        }
        innovation
    }

    /// Returns the innovation number previously assigned
    /// to `input -> output`, without registering anything.
    pub fn get(&self, input: NodeId, output: NodeId) -> Option<Innovation> {
        self.innovations.get(&(input, output)).copied()
    }

    /// Returns the endpoints recorded for an innovation number.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::InnovationHistory;
    ///
    /// let mut history = InnovationHistory::new();
    /// let innovation = history.number_for(4, 7);
    ///
    /// assert_eq!(history.endpoints(innovation), Some((4, 7)));
    /// assert_eq!(history.endpoints(innovation + 1), None);
    /// ```
    pub fn endpoints(&self, innovation: Innovation) -> Option<(NodeId, NodeId)> {
        self.endpoints.get(innovation).copied()
    }

    /// Returns the number of innovations registered.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns whether no innovation has been registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Returns an iterator over the complete record of
    /// innovations, in the format `(innovation, (input, output))`,
    /// in increasing innovation order.
    pub fn iter(&self) -> impl Iterator<Item = (Innovation, (NodeId, NodeId))> + '_ {
        self.endpoints.iter().copied().enumerate()
    }
}
