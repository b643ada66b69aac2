//! Tournament selection (spec §4.F): tournament size 3, ranked by
//! `(rank asc, crowding desc, fitness desc)`.

use rand::Rng;

use crate::domain::types::Solution;

const TOURNAMENT_SIZE: usize = 3;

fn better(a: &Solution, b: &Solution) -> bool {
    if a.rank != b.rank {
        return a.rank < b.rank;
    }
    if a.crowding_distance != b.crowding_distance {
        return a.crowding_distance > b.crowding_distance;
    }
    a.fitness > b.fitness
}

/// Returns the index of the tournament winner.
pub fn tournament_select(population: &[Solution], rng: &mut impl Rng) -> usize {
    let mut best = rng.gen_range(0..population.len());
    for _ in 1..TOURNAMENT_SIZE {
        let challenger = rng.gen_range(0..population.len());
        if better(&population[challenger], &population[best]) {
            best = challenger;
        }
    }
    best
}
