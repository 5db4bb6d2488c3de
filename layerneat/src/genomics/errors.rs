use thiserror::Error;

/// Misuse of a genome: invalid construction
/// arguments or evaluation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// A genome needs at least one input and one output.
    #[error("genomes need at least one input and one output (got {inputs} inputs, {outputs} outputs)")]
    InvalidShape { inputs: usize, outputs: usize },
    /// The input vector's length differs from the genome's input count.
    #[error("expected {expected} network inputs, got {actual}")]
    InputLengthMismatch { expected: usize, actual: usize },
}

/// An error type indicating a failure
/// to carry out a gene addition mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneAdditionMutationError {
    /// Every pair of nodes in different layers is already connected.
    #[error("gene mutation on fully-connected genome")]
    GenomeFullyConnected,
    /// No viable pair was sampled within the configured attempts.
    #[error("no viable node pair found for gene mutation in {0} attempts")]
    AttemptsExhausted(usize),
}

/// An error type indicating a failure
/// to carry out a node addition mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeAdditionMutationError {
    /// The genome has no connection to split.
    #[error("node mutation on genome without connections")]
    EmptyGenome,
}
