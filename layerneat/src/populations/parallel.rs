use super::Individual;
use crate::genomics::GenomeError;
use crate::Behavior;

/// Steps every alive individual once.
///
/// The slice is halved recursively, each half on its own
/// task, until a run is at most `chunk_size` long; runs
/// are then stepped sequentially. The order in which runs
/// are processed is unspecified.
pub(super) fn step_alive<B: Behavior + Send>(
    individuals: &mut [Individual<B>],
    chunk_size: usize,
) -> Result<(), GenomeError> {
    if individuals.len() <= chunk_size {
        for individual in individuals.iter_mut().filter(|i| i.is_alive()) {
            individual.step()?;
        }
        return Ok(());
    }

    let mid = individuals.len() / 2;
    let (low, high) = individuals.split_at_mut(mid);
    let (low, high) = rayon::join(
        || step_alive(low, chunk_size),
        || step_alive(high, chunk_size),
    );
    low.and(high)
}
