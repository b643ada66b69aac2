//! NSGA-II Core (spec §4.F). Mirrors the teacher's `solver/tabu_search`
//! re-export shape: each concern lives in its own file, `mod.rs` just wires
//! them together and exposes the per-generation transition the Driver
//! drives.

pub mod crowding;
pub mod dominance;
pub mod replacement;
pub mod selection;
pub mod sorting;
pub mod variation;

pub use crowding::*;
pub use dominance::*;
pub use replacement::*;
pub use selection::*;
pub use sorting::*;
pub use variation::*;

use rayon::prelude::*;

use crate::config::AlgorithmParams;
use crate::domain::types::{Constraints, Matrices, ProblemInstance, Solution, Weights};
use crate::evaluation;
use crate::feasibility;
use crate::seeding::sub_rng;

/// Computes objectives and weighted fitness for every solution in place.
/// Data-parallel over independent solutions (spec §5) — no shared mutable
/// state between them, so this runs on rayon's pool exactly like the
/// teacher's `neighborhood::find_neighbours` scores its swap candidates.
pub fn evaluate_population(population: &mut [Solution], instance: &ProblemInstance, matrices: &Matrices, weights: &Weights) {
    population.par_iter_mut().for_each(|solution| {
        solution.objectives = evaluation::evaluate(&solution.allocation, instance, matrices);
        solution.fitness = evaluation::weighted_fitness(&solution.objectives, weights);
    });
}

/// One full generation transition (spec §4.F): select parents by tournament,
/// cross over and mutate to produce lambda offspring, evaluate them, then
/// run elitist mu+lambda replacement against the parent population.
///
/// Each offspring pair draws from its own RNG sub-stream derived from
/// `base_seed`, `generation`, and the pair's index (spec §5): parallel
/// variation must not reorder pseudo-random draws, so no RNG state is
/// threaded between pairs.
pub fn generation_step(
    population: Vec<Solution>,
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    weights: &Weights,
    algorithm: &AlgorithmParams,
    base_seed: u64,
    generation: usize,
) -> Vec<Solution> {
    let population_size = population.len();
    let num_pairs = population_size.div_ceil(2);
    let generation_seed = base_seed ^ (generation as u64).wrapping_mul(0xD1B5_4A32_D192_ED03);

    let mut offspring = Vec::with_capacity(population_size);
    for pair_index in 0..num_pairs {
        let mut rng = sub_rng(generation_seed, pair_index);

        let i = tournament_select(&population, &mut rng);
        let j = tournament_select(&population, &mut rng);
        let (mut a1, mut a2) = crossover(
            &population[i].allocation,
            &population[j].allocation,
            algorithm.crossover_rate,
            &mut rng,
        );
        mutate(&mut a1, instance, matrices, constraints, algorithm.mutation_rate, &mut rng);
        mutate(&mut a2, instance, matrices, constraints, algorithm.mutation_rate, &mut rng);

        let (a1, soft1) = feasibility::repair(a1, instance, matrices, constraints);
        let (a2, soft2) = feasibility::repair(a2, instance, matrices, constraints);

        let mut s1 = Solution::new(a1);
        s1.soft_violations = soft1;
        let mut s2 = Solution::new(a2);
        s2.soft_violations = soft2;
        offspring.push(s1);
        if offspring.len() < population_size {
            offspring.push(s2);
        }
    }

    evaluate_population(&mut offspring, instance, matrices, weights);

    let mut combined = population;
    combined.extend(offspring);
    replace(combined, population_size)
}

/// The weighted-best member of the current population (spec §4.F): the
/// Driver tracks its own running best-so-far across generations separately,
/// since this by itself can't guarantee monotonicity once crowding-distance
/// truncation starts dropping members from an overflowing front.
pub fn best_solution(population: &[Solution]) -> Option<&Solution> {
    population.iter().max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}

/// The returned Pareto front (spec §4.F, §6): rank-0 members of the final
/// population.
pub fn pareto_front(population: &[Solution]) -> Vec<Solution> {
    population.iter().filter(|s| s.rank == 0).cloned().collect()
}
