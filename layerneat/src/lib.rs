//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Genomes describe layered, feed-forward neural networks which grow
//! through mutation. Populations group genomes into species and evolve
//! them generation by generation. The problem being solved is supplied
//! by the user through the [`Behavior`] trait, which feeds sensor data to
//! each network, acts on its outputs and scores the result.
//!
//! Randomness and the [`InnovationHistory`] of a run are always passed
//! explicitly, so runs can be seeded and reproduced.
//!
//! # Example usage: Evolution of an XOR network
//! ```no_run
//! use layerneat::{Behavior, InnovationHistory, Mode, Population, PopulationConfig};
//! use layerneat::genomics::GeneticConfig;
//!
//! #[derive(Default)]
//! struct Xor {
//!     error: Option<f32>,
//! }
//!
//! const CASES: [([f32; 2], f32); 4] = [
//!     ([0.0, 0.0], 0.0),
//!     ([0.0, 1.0], 1.0),
//!     ([1.0, 0.0], 1.0),
//!     ([1.0, 1.0], 0.0),
//! ];
//!
//! impl Behavior for Xor {
//!     fn update_sensors(&mut self) -> Vec<Vec<f32>> {
//!         CASES.iter().map(|(input, _)| input.to_vec()).collect()
//!     }
//!
//!     fn act(&mut self, controls: &[Vec<f32>]) {
//!         let error = CASES
//!             .iter()
//!             .zip(controls)
//!             .map(|((_, expected), output)| (output[0] - expected).abs())
//!             .sum();
//!         self.error = Some(error);
//!     }
//!
//!     fn is_alive(&self) -> bool {
//!         self.error.is_none()
//!     }
//!
//!     fn fitness(&self) -> f32 {
//!         (4.0 - self.error.unwrap_or(4.0)).powi(2)
//!     }
//!
//!     fn copy(&self) -> Self {
//!         Xor::default()
//!     }
//!
//!     fn solution_found(&self) -> bool {
//!         self.error.map_or(false, |e| e < 0.4)
//!     }
//! }
//!
//! fn main() -> Result<(), layerneat::PopulationError> {
//!     let mut rng = rand::thread_rng();
//!     let mut history = InnovationHistory::new();
//!     let mut population = Population::new(
//!         2,
//!         1,
//!         &Xor::default(),
//!         PopulationConfig::default(),
//!         GeneticConfig::default(),
//!         &mut rng,
//!         &mut history,
//!     )?;
//!     population.set_mode(Mode::FindSolution);
//!
//!     for _ in 0..300 {
//!         while !population.are_all_dead() {
//!             if let Some(solution) = population.update_alive_individuals()? {
//!                 println!("{}", solution.genome());
//!                 return Ok(());
//!             }
//!         }
//!         population.advance_generation(&mut rng, &mut history);
//!     }
//!     println!("{}", population.report());
//!     Ok(())
//! }
//! ```

mod behavior;
pub mod genomics;
pub mod populations;

pub use behavior::Behavior;
pub use genomics::{Genome, InnovationHistory};
pub use populations::{
    logging, Individual, Mode, Population, PopulationConfig, PopulationError, Species, SpeciesID,
};

/// Innovation numbers identify connection genes across genomes.
pub type Innovation = usize;
/// Node ids identify nodes within a genome.
pub type NodeId = usize;
