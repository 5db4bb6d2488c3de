use super::Population;

use crate::genomics::Genome;
use crate::Behavior;

use std::cmp::Ordering;
use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportingLevel {
    /// Clones the best-ever genome into every log.
    Champion,
    /// Clones no genomes.
    NoGenomes,
}

/// A snapshot of a population.
#[derive(Clone, Debug)]
pub struct Log {
    pub generation_number: usize,
    pub species_count: usize,
    pub best_ever_fitness: Option<f32>,
    pub previous_best_fitness: Option<f32>,
    /// Statistics over the current individuals' connection counts.
    pub connection_stats: Option<Stats>,
    /// Statistics over the current individuals' node counts.
    pub node_stats: Option<Stats>,
    /// Statistics over the current individuals' layer counts.
    pub layer_stats: Option<Stats>,
    pub champion: Option<Genome>,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration_number: {:?}\n\
            \tspecies_count: {:?}\n\
            \tbest_ever_fitness: {:?}\n\
            \tprevious_best_fitness: {:?}\n\
            \tconnections: {:?}\n\
            \tnodes: {:?}\n\
            \tlayers: {:?}\n\
            }}",
            self.generation_number,
            self.species_count,
            self.best_ever_fitness,
            self.previous_best_fitness,
            self.connection_stats,
            self.node_stats,
            self.layer_stats,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence,
    /// or `None` if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use layerneat::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied()).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// assert!(Stats::from(std::iter::empty()).is_none());
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Option<Stats> {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return None;
        }
        data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Some(Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        })
    }
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use layerneat::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    /// assert_eq!(logger.iter().count(), 0);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Stores a snapshot of a population.
    ///
    /// Usually called right after
    /// [`advance_generation`](Population::advance_generation),
    /// so that the snapshot covers the generation just evaluated
    /// and the structure of the one that replaced it.
    pub fn log<B: Behavior>(&mut self, population: &Population<B>) {
        let genomes = || population.individuals().map(|i| i.genome());
        self.logs.push(Log {
            generation_number: population.generation(),
            species_count: population.species().count(),
            best_ever_fitness: population.best_ever().map(|i| i.fitness()),
            previous_best_fitness: population.previous_best().map(|i| i.fitness()),
            connection_stats: Stats::from(genomes().map(|g| g.connections().count() as f32)),
            node_stats: Stats::from(genomes().map(|g| g.nodes().count() as f32)),
            layer_stats: Stats::from(genomes().map(|g| g.layer_count() as f32)),
            champion: match self.reporting_level {
                ReportingLevel::Champion => population.best_ever().map(|i| i.genome().clone()),
                ReportingLevel::NoGenomes => None,
            },
        })
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// Returns the latest snapshot, if any.
    pub fn last(&self) -> Option<&Log> {
        self.logs.last()
    }
}
