use super::{Individual, PopulationConfig};
use crate::genomics::{GeneticConfig, Genome, InnovationHistory};
use crate::Behavior;

use rand::Rng;

use std::cmp::Ordering;

/// Species identifier. Specifies
/// the generation in which the species
/// was born, and the count of other species
/// generated in the _same generation_ before
/// the one identified (i.e, if it was the
/// third species born in generation 5, it
/// will be species [5, 2]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeciesID(pub usize, pub usize);

/// Species are collections of reproductively
/// compatible (within a certain [genetic distance])
/// individuals. Membership is determined by calculating
/// the genetic distance to a _representative_, which
/// is the genome of the species' best member of the
/// last generation (or of its founder, initially).
///
/// Species become _stale_ after [`stagnation_threshold`]
/// generations without improving on their best-ever member.
///
/// [genetic distance]: PopulationConfig::distance_threshold
/// [`stagnation_threshold`]: PopulationConfig::stagnation_threshold
#[derive(Debug, Clone)]
pub struct Species<B> {
    id: SpeciesID,
    members: Vec<Individual<B>>,
    representative: Genome,
    best: Option<Individual<B>>,
    staleness: usize,
    adjusted_fitness_sum: f32,
    pre_cull_count: usize,
}

impl<B: Behavior> Species<B> {
    /// Creates a new species with the specified ID and
    /// founder. The founder's genome becomes the species'
    /// representative.
    pub fn new(id: SpeciesID, founder: Individual<B>) -> Species<B> {
        Species {
            id,
            representative: founder.genome().clone(),
            members: vec![founder],
            best: None,
            staleness: 0,
            adjusted_fitness_sum: 0.0,
            pre_cull_count: 0,
        }
    }

    /// Returns the species' ID.
    pub fn id(&self) -> SpeciesID {
        self.id
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    /// Returns whether `candidate` is close enough to the
    /// species' representative to join the species.
    pub fn can_accept(
        &self,
        candidate: &Genome,
        config: &PopulationConfig,
        genetic_config: &GeneticConfig,
    ) -> bool {
        Genome::genetic_distance(&self.representative, candidate, genetic_config)
            <= config.distance_threshold
    }

    /// Adds an individual to the species.
    pub fn add(&mut self, member: Individual<B>) {
        self.members.push(member);
    }

    /// Returns an iterator over the species' members.
    /// After [sorting], the first member is the fittest.
    ///
    /// [sorting]: Species::sort
    pub fn members(&self) -> impl Iterator<Item = &Individual<B>> {
        self.members.iter()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the species has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the best individual the species ever had,
    /// if it has been sorted at least once.
    pub fn best(&self) -> Option<&Individual<B>> {
        self.best.as_ref()
    }

    /// Returns the best member of the current generation.
    /// Only meaningful after sorting.
    pub fn current_best(&self) -> Option<&Individual<B>> {
        self.members.first()
    }

    /// Returns the fitness of the current best member.
    pub fn current_best_score(&self) -> Option<f32> {
        self.current_best().map(Individual::fitness)
    }

    /// Returns the number of generations the species
    /// has gone without improving on its best member.
    pub fn staleness(&self) -> usize {
        self.staleness
    }

    /// Returns `true` once the species has gone too long without improving.
    pub fn is_stale(&self, config: &PopulationConfig) -> bool {
        self.staleness >= config.stagnation_threshold.get()
    }

    /// Returns the sum of the members' shared fitnesses,
    /// as of the last call to
    /// [`calculate_adjusted_fitness_sum`](Species::calculate_adjusted_fitness_sum).
    pub fn adjusted_fitness_sum(&self) -> f32 {
        self.adjusted_fitness_sum
    }

    /// Returns the number of members the species had
    /// before its last culling.
    pub fn pre_cull_count(&self) -> usize {
        self.pre_cull_count
    }

    pub(super) fn clear(&mut self) {
        self.members.clear();
    }

    /// Reads every member's fitness from its behavior.
    pub fn calculate_fitnesses(&mut self) {
        for member in &mut self.members {
            member.calculate_fitness();
        }
    }

    /// Sorts the members by descending fitness, keeping the
    /// order of equally fit members.
    ///
    /// The best member's genome becomes the representative.
    /// If the best member beats the species' best-ever individual,
    /// it replaces it and staleness is reset; otherwise staleness
    /// grows. An empty species is made stale for good.
    pub fn sort(&mut self, config: &PopulationConfig) {
        self.members.sort_by(|a, b| {
            b.fitness()
                .partial_cmp(&a.fitness())
                .unwrap_or(Ordering::Equal)
        });

        let champion = match self.members.first() {
            Some(champion) => champion,
            None => {
                self.staleness = config.stagnation_threshold.get() + 1;
                return;
            }
        };

        self.representative = champion.genome().clone();
        let improved = self
            .best
            .as_ref()
            .map_or(true, |best| champion.fitness() > best.fitness());
        if improved {
            self.best = Some(champion.copy());
            self.staleness = 0;
        } else {
            self.staleness += 1;
        }
    }

    /// Explicit fitness sharing: divides every member's
    /// fitness by the member count.
    pub fn normalize_fitness(&mut self) {
        let count = self.members.len() as f32;
        for member in &mut self.members {
            member.set_fitness(member.fitness() / count);
        }
    }

    /// Sums and stores the members' (shared) fitnesses.
    pub fn calculate_adjusted_fitness_sum(&mut self) -> f32 {
        self.adjusted_fitness_sum = self.members.iter().map(Individual::fitness).sum();
        self.adjusted_fitness_sum
    }

    /// Removes the worst [`cull_fraction`] of the members,
    /// if there are more than two. At least one member is kept.
    /// Should be called after [sorting](Species::sort).
    ///
    /// [`cull_fraction`]: PopulationConfig::cull_fraction
    pub fn cull(&mut self, config: &PopulationConfig) {
        self.pre_cull_count = self.members.len();
        if self.members.len() > 2 {
            let kept = (self.members.len() as f32 * (1.0 - config.cull_fraction)).floor() as usize;
            self.members.truncate(kept.max(1));
        }
    }

    /// Produces a mutated offspring of the species' members.
    ///
    /// With probability [`asexual_reproduction_chance`], the offspring
    /// is a copy of one member; otherwise it is the crossover of two
    /// members, the fitter one (on ties, the second picked) acting as
    /// the fitter parent. Members are picked in proportion to their
    /// fitness, with replacement.
    ///
    /// Returns `None` if the species has no members.
    ///
    /// [`asexual_reproduction_chance`]: PopulationConfig::asexual_reproduction_chance
    pub fn reproduce<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        history: &mut InnovationHistory,
        config: &PopulationConfig,
        genetic_config: &GeneticConfig,
    ) -> Option<Individual<B>> {
        let mut child = if rng.gen::<f32>() < config.asexual_reproduction_chance {
            self.pick_member(rng)?.copy()
        } else {
            let first = self.pick_member(rng)?;
            let second = self.pick_member(rng)?;
            let (fitter, other) = if first.fitness() > second.fitness() {
                (first, second)
            } else {
                (second, first)
            };
            Individual::new(
                Genome::crossover(fitter.genome(), other.genome(), rng, genetic_config),
                first.behavior().copy(),
            )
        };

        child.genome_mut().mutate(rng, history, genetic_config);
        Some(child)
    }

    /// Roulette selection over the members' fitness. Falls
    /// back to the first member when no member is picked,
    /// e.g. when every fitness is zero.
    fn pick_member<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Individual<B>> {
        let fitness_sum: f32 = self.members.iter().map(Individual::fitness).sum();
        let target = rng.gen::<f32>() * fitness_sum;

        let mut running_sum = 0.0;
        for member in &self.members {
            running_sum += member.fitness();
            if running_sum > target {
                return Some(member);
            }
        }
        self.members.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::testing::Probe;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn member(fitness: f32, rng: &mut StdRng, history: &mut InnovationHistory) -> Individual<Probe> {
        let mut genome = Genome::new(2, 1).unwrap();
        genome.mutate(rng, history, &GeneticConfig::default());
        let mut individual = Individual::new(genome, Probe::new(vec![vec![0.0, 0.0]], 1));
        individual.set_fitness(fitness);
        individual
    }

    fn species_with(fitnesses: &[f32], rng: &mut StdRng, history: &mut InnovationHistory) -> Species<Probe> {
        let mut members = fitnesses.iter().map(|&f| member(f, rng, history));
        let mut species = Species::new(SpeciesID(0, 0), members.next().unwrap());
        for m in members {
            species.add(m);
        }
        species
    }

    fn fitnesses(species: &Species<Probe>) -> Vec<f32> {
        species.members().map(Individual::fitness).collect()
    }

    #[test]
    fn accepts_clone_of_representative() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut history = InnovationHistory::new();
        let species = species_with(&[1.0], &mut rng, &mut history);
        let clone = species.representative().clone();
        assert!(species.can_accept(&clone, &PopulationConfig::default(), &GeneticConfig::default()));
    }

    #[test]
    fn rejects_distant_genomes() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut history = InnovationHistory::new();
        let species = species_with(&[1.0], &mut rng, &mut history);

        // Shares no innovation with the representative.
        let mut stranger = Genome::new(2, 1).unwrap();
        stranger.add_connection_gene(crate::genomics::ConnectionGene::new(1000, 0, 2, 0.0));
        assert!(!species.can_accept(&stranger, &PopulationConfig::default(), &GeneticConfig::default()));
    }

    #[test]
    fn sort_tracks_best_and_staleness() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut history = InnovationHistory::new();
        let config = PopulationConfig::default();
        let mut species = species_with(&[1.0, 5.0, 3.0, 5.0], &mut rng, &mut history);
        let second = species.members().nth(1).unwrap().genome().clone();

        species.sort(&config);
        assert_eq!(fitnesses(&species), vec![5.0, 5.0, 3.0, 1.0]);
        // Ties keep their order.
        assert_eq!(species.current_best().unwrap().genome(), &second);
        assert_eq!(species.representative(), &second);
        assert_eq!(species.best().unwrap().fitness(), 5.0);
        assert_eq!(species.staleness(), 0);

        species.sort(&config);
        assert_eq!(species.staleness(), 1);

        species.clear();
        species.add(member(6.0, &mut rng, &mut history));
        species.sort(&config);
        assert_eq!(species.staleness(), 0);
        assert_eq!(species.best().unwrap().fitness(), 6.0);
    }

    #[test]
    fn empty_species_goes_stale() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut history = InnovationHistory::new();
        let config = PopulationConfig::default();
        let mut species = species_with(&[1.0], &mut rng, &mut history);
        species.sort(&config);
        species.clear();
        species.sort(&config);
        assert!(species.is_stale(&config));
        assert_eq!(species.current_best_score(), None);
    }

    #[test]
    fn sharing_and_culling() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut history = InnovationHistory::new();
        let config = PopulationConfig::default();
        let mut species = species_with(&[8.0, 4.0, 2.0, 2.0, 0.0], &mut rng, &mut history);
        species.sort(&config);
        species.normalize_fitness();
        assert_eq!(fitnesses(&species), vec![1.6, 0.8, 0.4, 0.4, 0.0]);
        assert!((species.calculate_adjusted_fitness_sum() - 3.2).abs() < 1e-6);

        species.cull(&config);
        assert_eq!(species.pre_cull_count(), 5);
        assert_eq!(fitnesses(&species), vec![1.6, 0.8]);
        // The best-ever member keeps its unshared fitness.
        assert_eq!(species.best().unwrap().fitness(), 8.0);
    }

    #[test]
    fn small_species_are_not_culled() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut history = InnovationHistory::new();
        let config = PopulationConfig::default();
        let mut species = species_with(&[2.0, 1.0], &mut rng, &mut history);
        species.cull(&config);
        assert_eq!(species.len(), 2);
        assert_eq!(species.pre_cull_count(), 2);
    }

    #[test]
    fn roulette_falls_back_to_first_member() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut history = InnovationHistory::new();
        let species = species_with(&[0.0, 0.0, 0.0], &mut rng, &mut history);
        let first = species.members().next().unwrap().genome().clone();
        for _ in 0..20 {
            assert_eq!(species.pick_member(&mut rng).unwrap().genome(), &first);
        }
    }

    #[test]
    fn roulette_ignores_zero_fitness_members() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut history = InnovationHistory::new();
        let species = species_with(&[0.0, 1.0, 0.0], &mut rng, &mut history);
        let chosen = species.members().nth(1).unwrap().genome().clone();
        for _ in 0..20 {
            assert_eq!(species.pick_member(&mut rng).unwrap().genome(), &chosen);
        }
    }

    #[test]
    fn offspring_are_mutated_and_alive() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut history = InnovationHistory::new();
        let config = PopulationConfig::default();
        let genetic_config = GeneticConfig::default();
        let species = species_with(&[3.0, 2.0, 1.0], &mut rng, &mut history);
        for _ in 0..20 {
            let child = species
                .reproduce(&mut rng, &mut history, &config, &genetic_config)
                .unwrap();
            assert!(child.is_alive());
            assert!(child.genome().is_fully_connected() || child.genome().layer_count() > 2);
            assert_eq!(child.behavior().steps, 0);
        }
    }

    #[test]
    fn empty_species_cannot_reproduce() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut history = InnovationHistory::new();
        let mut species = species_with(&[1.0], &mut rng, &mut history);
        species.clear();
        assert!(species
            .reproduce(&mut rng, &mut history, &PopulationConfig::default(), &GeneticConfig::default())
            .is_none());
    }
}
