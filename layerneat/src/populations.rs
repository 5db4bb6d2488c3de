//! A Population is a collection of individuals.
//! These are grouped into species, which are
//! evolved generation by generation using the
//! individuals' behaviors as the source of
//! selective pressure.
mod config;
mod errors;
mod individual;
pub mod logging;
mod parallel;
mod species;

pub use config::PopulationConfig;
pub use errors::PopulationError;
pub use individual::Individual;
pub use species::{Species, SpeciesID};

use crate::genomics::{GeneticConfig, Genome, InnovationHistory};
use crate::Behavior;

use log::{debug, info, warn};
use rand::Rng;

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

/// The ways a population can be run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Individuals are stepped by the caller through
    /// [`update_alive_individuals`](Population::update_alive_individuals),
    /// and the generation is advanced once all are dead.
    Normal,
    /// As `Normal`, but stepping stops at the first
    /// individual that reports a solution.
    FindSolution,
    /// Each generation is simulated in the background by
    /// [`run_simulation`](Population::run_simulation), and only
    /// a replay of its best individual is stepped by the caller.
    ReplayBest,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::FindSolution => write!(f, "find-solution"),
            Self::ReplayBest => write!(f, "replay-best"),
        }
    }
}

/// A population of individuals.
///
/// Individuals are stepped until they are all dead, after
/// which [`advance_generation`] replaces them with the next
/// generation. The population never steps and advances at
/// the same time.
///
/// [`advance_generation`]: Population::advance_generation
#[derive(Debug)]
pub struct Population<B> {
    individuals: Vec<Individual<B>>,
    species: Vec<Species<B>>,
    generation: usize,
    best_ever: Option<Individual<B>>,
    previous_best: Option<Individual<B>>,
    replay: Option<Individual<B>>,
    mode: Mode,
    solution_path: Option<PathBuf>,
    config: PopulationConfig,
    genetic_config: GeneticConfig,
}

impl<B: Behavior> Population<B> {
    /// Creates a new population of minimal, fully connected
    /// genomes with `inputs` inputs and `outputs` outputs.
    /// Every individual gets a [copy](Behavior::copy) of `template`.
    ///
    /// # Errors
    /// Returns an error if either count is zero.
    pub fn new<R: Rng + ?Sized>(
        inputs: usize,
        outputs: usize,
        template: &B,
        config: PopulationConfig,
        genetic_config: GeneticConfig,
        rng: &mut R,
        history: &mut InnovationHistory,
    ) -> Result<Population<B>, PopulationError> {
        let individuals = (0..config.size.get())
            .map(|_| -> Result<Individual<B>, PopulationError> {
                let mut genome = Genome::new(inputs, outputs)?;
                genome.mutate(rng, history, &genetic_config);
                Ok(Individual::new(genome, template.copy()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Population {
            individuals,
            species: vec![],
            generation: 0,
            best_ever: None,
            previous_best: None,
            replay: None,
            mode: Mode::Normal,
            solution_path: None,
            config,
            genetic_config,
        })
    }

    /// Replaces the current generation with the next one.
    ///
    /// Individuals are assigned to species and scored; species
    /// share their fitness, cull their worst members and lose
    /// stale or unproductive members of their ranks; the
    /// survivors then produce the next generation, which always
    /// has exactly [`size`](PopulationConfig::size) individuals.
    pub fn advance_generation<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        history: &mut InnovationHistory,
    ) {
        self.speciate();
        for species in &mut self.species {
            species.calculate_fitnesses();
            species.sort(&self.config);
        }
        self.rank_species();
        self.track_champions();

        for species in &mut self.species {
            species.normalize_fitness();
            species.calculate_adjusted_fitness_sum();
            species.cull(&self.config);
        }
        self.remove_stale_species();

        let total_adjusted_fitness = self.total_adjusted_fitness();
        if total_adjusted_fitness <= 0.0 || total_adjusted_fitness.is_nan() {
            warn!(
                "generation {}: total adjusted fitness is {}; offspring allotment is degenerate",
                self.generation, total_adjusted_fitness
            );
        }
        self.remove_unreproducible_species(total_adjusted_fitness);

        self.individuals = self.next_generation(total_adjusted_fitness, rng, history);
        self.generation += 1;

        info!(
            "generation {}: {} species, best ever {:?}, previous best {:?}",
            self.generation,
            self.species.len(),
            self.best_ever.as_ref().map(Individual::fitness),
            self.previous_best.as_ref().map(Individual::fitness),
        );
    }

    /// Assigns every individual to the first species whose
    /// representative accepts it, founding new species as needed.
    fn speciate(&mut self) {
        for species in &mut self.species {
            species.clear();
        }

        let config = &self.config;
        let genetic_config = &self.genetic_config;
        let mut born = 0;
        for individual in mem::take(&mut self.individuals) {
            match self
                .species
                .iter_mut()
                .find(|s| s.can_accept(individual.genome(), config, genetic_config))
            {
                Some(species) => species.add(individual),
                None => {
                    let id = SpeciesID(self.generation, born);
                    born += 1;
                    debug!("species {:?} founded", id);
                    self.species.push(Species::new(id, individual));
                }
            }
        }
    }

    /// Stable sort by current best fitness, descending.
    /// Species without members go last.
    fn rank_species(&mut self) {
        self.species.sort_by(|a, b| {
            match (a.current_best_score(), b.current_best_score()) {
                (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }

    fn track_champions(&mut self) {
        let champion = match self.species.first().and_then(Species::current_best) {
            Some(champion) => champion,
            None => return,
        };
        let improved = self
            .best_ever
            .as_ref()
            .map_or(true, |best| champion.fitness() > best.fitness());
        if improved {
            self.best_ever = Some(champion.copy());
        }
        self.previous_best = Some(champion.copy());
    }

    /// Removes stale species, except for the
    /// [`protected_species`](PopulationConfig::protected_species)
    /// best ranked.
    fn remove_stale_species(&mut self) {
        let config = &self.config;
        let mut rank = 0;
        self.species.retain(|species| {
            let keep = rank < config.protected_species || !species.is_stale(config);
            if !keep {
                debug!("stale species {:?} removed", species.id());
            }
            rank += 1;
            keep
        });
    }

    /// Removes every species but the best ranked whose share
    /// of the total adjusted fitness would earn it less than
    /// one offspring.
    fn remove_unreproducible_species(&mut self, total_adjusted_fitness: f32) {
        let size = self.config.size.get() as f32;
        let mut rank = 0;
        self.species.retain(|species| {
            let share = species.adjusted_fitness_sum() / total_adjusted_fitness * size;
            // A NaN share is not "fewer than one".
            let keep = rank == 0 || share >= 1.0 || share.is_nan();
            if !keep {
                debug!("unreproducible species {:?} removed", species.id());
            }
            rank += 1;
            keep
        });
    }

    fn total_adjusted_fitness(&self) -> f32 {
        self.species.iter().map(Species::adjusted_fitness_sum).sum()
    }

    fn next_generation<R: Rng + ?Sized>(
        &self,
        total_adjusted_fitness: f32,
        rng: &mut R,
        history: &mut InnovationHistory,
    ) -> Vec<Individual<B>> {
        let size = self.config.size.get();
        let mut next = Vec::with_capacity(size);

        for species in &self.species {
            if next.len() >= size {
                break;
            }
            if species.pre_cull_count() > self.config.elitism_threshold {
                if let Some(best) = species.best() {
                    debug!("elite of species {:?} carried over", species.id());
                    next.push(best.copy());
                }
            }

            // A NaN share saturates to 0 children.
            let allowed_children = (species.adjusted_fitness_sum() / total_adjusted_fitness
                * size as f32)
                .floor() as i64
                - 1;
            for _ in 0..allowed_children {
                if next.len() >= size {
                    break;
                }
                match species.reproduce(rng, history, &self.config, &self.genetic_config) {
                    Some(child) => next.push(child),
                    None => break,
                }
            }
        }

        if next.len() < size {
            if let Some(previous_best) = &self.previous_best {
                next.push(previous_best.copy());
            }
        }
        if let Some(top) = self.species.first() {
            while next.len() < size {
                match top.reproduce(rng, history, &self.config, &self.genetic_config) {
                    Some(child) => next.push(child),
                    None => break,
                }
            }
        }

        next
    }

    /// Returns the index of the generation being run,
    /// starting at 0.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns an iterator over the current generation.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual<B>> {
        self.individuals.iter()
    }

    /// Returns an iterator over the species, in rank order
    /// as of the last generation advance.
    pub fn species(&self) -> impl Iterator<Item = &Species<B>> {
        self.species.iter()
    }

    /// Returns the best individual of every generation so far.
    pub fn best_ever(&self) -> Option<&Individual<B>> {
        self.best_ever.as_ref()
    }

    /// Returns the best individual of the last generation.
    pub fn previous_best(&self) -> Option<&Individual<B>> {
        self.previous_best.as_ref()
    }

    /// Returns `true` if no individual of the current generation is alive.
    pub fn are_all_dead(&self) -> bool {
        self.individuals.iter().all(|i| !i.is_alive())
    }

    /// Returns the number of living individuals.
    pub fn alive_count(&self) -> usize {
        self.individuals.iter().filter(|i| i.is_alive()).count()
    }

    /// Returns the current operating mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches the operating mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Returns the population's configuration.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Returns the configuration used for mutation and crossover.
    pub fn genetic_config(&self) -> &GeneticConfig {
        &self.genetic_config
    }

    fn require_mode(&self, operation: &'static str, mode: Mode) -> Result<(), PopulationError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(PopulationError::InvalidState {
                operation,
                mode: self.mode,
            })
        }
    }

    /// Exports the genome of any solution found in
    /// [`FindSolution`](Mode::FindSolution) mode to `path`.
    ///
    /// # Errors
    /// Returns an error outside of `FindSolution` mode.
    pub fn save_solution_to<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PopulationError> {
        self.require_mode("save_solution_to", Mode::FindSolution)?;
        self.solution_path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Steps and renders the replay of the last generation's
    /// best individual.
    ///
    /// # Errors
    /// Returns an error outside of [`ReplayBest`](Mode::ReplayBest)
    /// mode, before the first [`run_simulation`](Population::run_simulation),
    /// or once the replay individual is dead.
    pub fn replay_previous_best(&mut self) -> Result<(), PopulationError> {
        self.require_mode("replay_previous_best", Mode::ReplayBest)?;
        let replay = self.replay.as_mut().ok_or(PopulationError::NoReplay)?;
        if !replay.is_alive() {
            return Err(PopulationError::ReplayFinished);
        }
        replay.step()?;
        replay.render();
        Ok(())
    }

    /// Whether the replay individual is still alive. Once it is
    /// dead, the next generation should be simulated.
    ///
    /// # Errors
    /// Returns an error outside of [`ReplayBest`](Mode::ReplayBest)
    /// mode, or before the first [`run_simulation`](Population::run_simulation).
    pub fn replay_individual_is_alive(&self) -> Result<bool, PopulationError> {
        self.require_mode("replay_individual_is_alive", Mode::ReplayBest)?;
        self.replay
            .as_ref()
            .map(Individual::is_alive)
            .ok_or(PopulationError::NoReplay)
    }

    /// The fitness the replay individual scored during
    /// the background simulation.
    ///
    /// # Errors
    /// Returns an error outside of [`ReplayBest`](Mode::ReplayBest)
    /// mode, or before the first [`run_simulation`](Population::run_simulation).
    pub fn expected_score(&self) -> Result<f32, PopulationError> {
        self.require_mode("expected_score", Mode::ReplayBest)?;
        self.replay
            .as_ref()
            .map(Individual::fitness)
            .ok_or(PopulationError::NoReplay)
    }

    /// Returns a summary of the population: generation,
    /// species count and best score, followed by the
    /// diagnostic dump of the last generation's best genome.
    pub fn report(&self) -> String {
        let mut report = format!(
            "Generation: {}  | Number of species: {}  | Best score : {}",
            self.generation,
            self.species.len(),
            self.best_ever
                .as_ref()
                .map_or_else(|| "-".to_string(), |b| b.fitness().to_string()),
        );
        if let Some(previous_best) = &self.previous_best {
            report.push('\n');
            report.push_str(&previous_best.genome().to_string());
        }
        report
    }
}

impl<B: Behavior + Send> Population<B> {
    /// Steps every alive individual once, in parallel.
    ///
    /// Afterwards, in index order, every individual stepped is
    /// rendered. In [`FindSolution`](Mode::FindSolution) mode, the
    /// first of them reporting a solution is returned instead (and
    /// its genome exported, if requested through
    /// [`save_solution_to`](Population::save_solution_to)); the
    /// individuals after it are not rendered.
    ///
    /// # Errors
    /// Returns an error in [`ReplayBest`](Mode::ReplayBest) mode,
    /// if a sensor row does not match the network inputs, or if
    /// exporting the solution fails.
    pub fn update_alive_individuals(&mut self) -> Result<Option<&Individual<B>>, PopulationError> {
        if self.mode == Mode::ReplayBest {
            return Err(PopulationError::InvalidState {
                operation: "update_alive_individuals",
                mode: self.mode,
            });
        }

        let stepped: Vec<usize> = (0..self.individuals.len())
            .filter(|&i| self.individuals[i].is_alive())
            .collect();
        parallel::step_alive(&mut self.individuals, self.config.parallel_chunk_size.get())?;

        for i in stepped {
            if self.mode == Mode::FindSolution && self.individuals[i].is_solution() {
                info!("solution found in generation {}", self.generation);
                if let Some(path) = &self.solution_path {
                    self.individuals[i].genome().save(path)?;
                }
                return Ok(Some(&self.individuals[i]));
            }
            self.individuals[i].render();
        }
        Ok(None)
    }

    /// Simulates the whole generation without rendering, advances
    /// the generation, and prepares a replay of its best individual.
    ///
    /// # Errors
    /// Returns an error outside of [`ReplayBest`](Mode::ReplayBest)
    /// mode, or if a sensor row does not match the network inputs.
    pub fn run_simulation<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        history: &mut InnovationHistory,
    ) -> Result<(), PopulationError> {
        self.require_mode("run_simulation", Mode::ReplayBest)?;
        let chunk_size = self.config.parallel_chunk_size.get();
        while !self.are_all_dead() {
            parallel::step_alive(&mut self.individuals, chunk_size)?;
        }

        self.advance_generation(rng, history);
        self.replay = self.previous_best.as_ref().map(Individual::copy_for_replay);
        Ok(())
    }
}
