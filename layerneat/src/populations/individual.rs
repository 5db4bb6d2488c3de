use crate::genomics::{Genome, GenomeError};
use crate::Behavior;

/// A member of a population: a genome, the
/// behavior it controls, and its last fitness.
#[derive(Debug, Clone)]
pub struct Individual<B> {
    genome: Genome,
    behavior: B,
    fitness: f32,
    alive: bool,
}

impl<B: Behavior> Individual<B> {
    /// Creates a living individual with a fitness of 0.
    pub fn new(genome: Genome, behavior: B) -> Individual<B> {
        Individual {
            genome,
            behavior,
            fitness: 0.0,
            alive: true,
        }
    }

    /// Runs one step of the individual: reads its sensors,
    /// evaluates them, and acts on the resulting controls.
    ///
    /// # Errors
    /// Returns an error if a sensor row does not match
    /// the genome's input count.
    pub fn step(&mut self) -> Result<(), GenomeError> {
        let sensors = self.behavior.update_sensors();
        let controls = self.think(&sensors)?;
        self.behavior.act(&controls);
        self.alive = self.behavior.is_alive();
        Ok(())
    }

    /// Evaluates the genome on every sensor row,
    /// returning one row of controls per row of sensors.
    ///
    /// # Errors
    /// Returns an error if a sensor row does not match
    /// the genome's input count.
    pub fn think(&mut self, sensors: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, GenomeError> {
        sensors
            .iter()
            .map(|pattern| self.genome.feed_forward(pattern))
            .collect()
    }

    pub fn render(&mut self) {
        self.behavior.render();
    }

    /// Whether the behavior reports the problem solved.
    pub fn is_solution(&self) -> bool {
        self.behavior.solution_found()
    }

    /// Reads the behavior's score into the individual's fitness.
    pub fn calculate_fitness(&mut self) {
        self.fitness = self.behavior.fitness();
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Whether the individual was alive after its last step.
    /// New individuals are alive.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub(crate) fn genome_mut(&mut self) -> &mut Genome {
        &mut self.genome
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Returns a new, living individual with a clone of the
    /// genome, a [copy] of the behavior and the same fitness.
    ///
    /// [copy]: Behavior::copy
    pub fn copy(&self) -> Individual<B> {
        Individual {
            fitness: self.fitness,
            ..Individual::new(self.genome.clone(), self.behavior.copy())
        }
    }

    /// Like [`copy`](Individual::copy), but the behavior
    /// is [copied for replay](Behavior::copy_for_replay).
    pub fn copy_for_replay(&self) -> Individual<B> {
        Individual {
            fitness: self.fitness,
            ..Individual::new(self.genome.clone(), self.behavior.copy_for_replay())
        }
    }
}
