use layerneat::genomics::GeneticConfig;
use layerneat::logging::{EvolutionLogger, ReportingLevel, Stats};
use layerneat::{Behavior, InnovationHistory, Mode, Population, PopulationConfig, PopulationError};

use std::num::NonZeroUsize;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use ron::ser::PrettyConfig;

const ERROR_MARGIN: f32 = 0.3;
const MAX_GENERATIONS: usize = 300;

const CASES: [([f32; 2], f32); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

/// Scores a network on the four XOR cases in a single step.
#[derive(Default)]
struct XorTrial {
    outputs: Option<[f32; 4]>,
}

impl Behavior for XorTrial {
    fn update_sensors(&mut self) -> Vec<Vec<f32>> {
        CASES.iter().map(|(input, _)| input.to_vec()).collect()
    }

    fn act(&mut self, controls: &[Vec<f32>]) {
        let mut outputs = [0.0; 4];
        for (output, control) in outputs.iter_mut().zip(controls) {
            *output = control[0];
        }
        self.outputs = Some(outputs);
    }

    fn is_alive(&self) -> bool {
        self.outputs.is_none()
    }

    fn fitness(&self) -> f32 {
        let outputs = match self.outputs {
            Some(outputs) => outputs,
            None => return 0.0,
        };
        let error: f32 = CASES
            .iter()
            .zip(outputs)
            .map(|((_, expected), output)| {
                let error = (output - expected).abs();
                if error < ERROR_MARGIN {
                    0.0
                } else {
                    error
                }
            })
            .sum();
        (4.0 - error).powi(2)
    }

    fn copy(&self) -> XorTrial {
        XorTrial::default()
    }

    fn solution_found(&self) -> bool {
        match self.outputs {
            Some(outputs) => CASES
                .iter()
                .zip(outputs)
                .all(|((_, expected), output)| (output > 0.5) == (*expected > 0.5)),
            None => false,
        }
    }
}

fn main() {
    let genetic_config = GeneticConfig {
        max_gene_addition_mutation_attempts: Some(50),
        ..GeneticConfig::default()
    };
    let population_config = PopulationConfig {
        size: NonZeroUsize::new(500).unwrap(),
        ..PopulationConfig::default()
    };

    println!(
        "{}",
        ron::ser::to_string_pretty(&(&genetic_config, &population_config), PrettyConfig::default())
            .unwrap()
    );

    match find_solution(&genetic_config, &population_config, 42) {
        Ok(Some(generation)) => println!("Solution found in generation {}", generation),
        Ok(None) => println!("No solution in {} generations", MAX_GENERATIONS),
        Err(e) => eprintln!("{}", e),
    }

    stress_test(&genetic_config, &population_config);
}

/// Evolves a single population, printing its progress, and
/// returns the generation in which a solution was found.
fn find_solution(
    genetic_config: &GeneticConfig,
    population_config: &PopulationConfig,
    seed: u64,
) -> Result<Option<usize>, PopulationError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut history = InnovationHistory::new();
    let mut logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    let mut population = Population::new(
        2,
        1,
        &XorTrial::default(),
        population_config.clone(),
        genetic_config.clone(),
        &mut rng,
        &mut history,
    )?;
    population.set_mode(Mode::FindSolution);
    population.save_solution_to(std::env::temp_dir().join("xor_solution.txt"))?;

    for _ in 0..MAX_GENERATIONS {
        while !population.are_all_dead() {
            if let Some(solution) = population.update_alive_individuals()? {
                println!("{}", solution.genome());
                println!("{}", ron::to_string(solution.genome()).unwrap());
                return Ok(Some(population.generation()));
            }
        }
        population.advance_generation(&mut rng, &mut history);
        logger.log(&population);
        if let Some(log) = logger.last() {
            println!("{}", log);
        }
    }
    println!("{}", population.report());
    Ok(None)
}

/// Runs many independent populations in parallel and reports
/// how many generations they needed.
fn stress_test(genetic_config: &GeneticConfig, population_config: &PopulationConfig) {
    const ITERATIONS: u64 = 100;

    let generations: Vec<Option<usize>> = (0..ITERATIONS)
        .into_par_iter()
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut history = InnovationHistory::new();
            let mut population = Population::new(
                2,
                1,
                &XorTrial::default(),
                population_config.clone(),
                genetic_config.clone(),
                &mut rng,
                &mut history,
            )
            .ok()?;
            population.set_mode(Mode::FindSolution);
            for _ in 0..MAX_GENERATIONS {
                while !population.are_all_dead() {
                    if population.update_alive_individuals().ok()?.is_some() {
                        return Some(population.generation());
                    }
                }
                population.advance_generation(&mut rng, &mut history);
            }
            None
        })
        .collect();

    println!(
        "Successful run generation count {:?}, {}% failure rate over {} iterations",
        Stats::from(generations.iter().filter_map(|g| g.map(|g| g as f32))),
        generations.iter().filter(|g| g.is_none()).count() as f32 * 100.0 / ITERATIONS as f32,
        ITERATIONS
    );
}
