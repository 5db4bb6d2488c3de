use super::Mode;
use crate::genomics::GenomeError;

use thiserror::Error;

use std::io;

/// Errors raised while driving a population.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// The operation is not available in the current mode.
    #[error("`{operation}` is not available in {mode} mode")]
    InvalidState { operation: &'static str, mode: Mode },
    /// The replay individual is dead; a new background
    /// simulation must be run.
    #[error("replay called on dead individual")]
    ReplayFinished,
    /// No background simulation has produced a replay yet.
    #[error("no replay available before the first background simulation")]
    NoReplay,
    #[error(transparent)]
    Genome(#[from] GenomeError),
    #[error("failed to export solution genome: {0}")]
    Export(#[from] io::Error),
}
