//! Crossover and mutation (spec §4.F). Grounded on the teacher's
//! `solver/tabu_search/repair.rs` swap-and-reinsert shape, generalized from
//! swapping stops between two routes to swapping per-key lab assignments
//! between two allocations.

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::domain::types::{Allocation, Constraints, LabIdx, Matrices, ProblemInstance};

/// Uniform crossover per `(area, test_type)` key (spec §4.F): for each key,
/// child 1 inherits parent 1's lab split with probability 0.5, else
/// parent 2's; child 2 inherits the complement. Below `crossover_rate`,
/// children are clones of the parents.
pub fn crossover(
    parent1: &Allocation,
    parent2: &Allocation,
    crossover_rate: f64,
    rng: &mut impl Rng,
) -> (Allocation, Allocation) {
    if rng.gen::<f64>() >= crossover_rate {
        return (parent1.clone(), parent2.clone());
    }

    let mut keys: Vec<_> = parent1.entries.keys().chain(parent2.entries.keys()).copied().collect();
    keys.sort();
    keys.dedup();

    let mut child1 = Allocation::new();
    let mut child2 = Allocation::new();
    for key in keys {
        let from_parent1 = rng.gen_bool(0.5);
        let (c1_source, c2_source) = if from_parent1 { (parent1, parent2) } else { (parent2, parent1) };
        if let Some(labs) = c1_source.entries.get(&key) {
            for (&lab, &count) in labs {
                child1.add(key, lab, count);
            }
        }
        if let Some(labs) = c2_source.entries.get(&key) {
            for (&lab, &count) in labs {
                child2.add(key, lab, count);
            }
        }
    }

    (child1, child2)
}

/// With probability `mutation_rate`, pick one random assigned key, one
/// random lab currently holding tests there, and move a uniform-random
/// subcount (1..=count) to a randomly chosen alternative capable lab. A
/// no-op if no alternative exists (spec §4.F).
pub fn mutate(
    allocation: &mut Allocation,
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    mutation_rate: f64,
    rng: &mut impl Rng,
) {
    if rng.gen::<f64>() >= mutation_rate {
        return;
    }
    let Some(&key) = allocation.entries.keys().choose(rng) else { return };
    let (area, tt) = key;

    let Some((&from_lab, &count)) = allocation.entries[&key].iter().choose(rng) else { return };
    if count == 0 {
        return;
    }

    let alternatives: Vec<LabIdx> = instance
        .capable_labs(tt, constraints.quality_threshold)
        .into_iter()
        .filter(|&lab| lab != from_lab)
        .filter(|&lab| {
            let (d, t) = matrices.get(area, lab);
            constraints.max_distance_km.map_or(true, |max| d <= max)
                && constraints.max_travel_time_minutes.map_or(true, |max| t <= max)
        })
        .collect();
    let Some(&to_lab) = alternatives.iter().choose(rng) else { return };

    let subcount = if count == 1 { 1 } else { rng.gen_range(1..=count) };
    let from_labs = allocation.entries.get_mut(&key).unwrap();
    let remaining = from_labs.get_mut(&from_lab).unwrap();
    *remaining -= subcount;
    if *remaining == 0 {
        from_labs.remove(&from_lab);
    }
    allocation.add(key, to_lab, subcount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AreaIdx, TestTypeIdx};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn crossover_preserves_total_counts_per_key() {
        let mut p1 = Allocation::new();
        p1.add((AreaIdx(0), TestTypeIdx(0)), LabIdx(0), 10);
        let mut p2 = Allocation::new();
        p2.add((AreaIdx(0), TestTypeIdx(0)), LabIdx(1), 10);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (c1, c2) = crossover(&p1, &p2, 1.0, &mut rng);
        assert_eq!(c1.total_for((AreaIdx(0), TestTypeIdx(0))), 10);
        assert_eq!(c2.total_for((AreaIdx(0), TestTypeIdx(0))), 10);
    }

    #[test]
    fn low_crossover_rate_clones_parents() {
        let mut p1 = Allocation::new();
        p1.add((AreaIdx(0), TestTypeIdx(0)), LabIdx(0), 10);
        let p2 = Allocation::new();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (c1, c2) = crossover(&p1, &p2, 0.0, &mut rng);
        assert_eq!(c1.total_for((AreaIdx(0), TestTypeIdx(0))), 10);
        assert_eq!(c2.total_for((AreaIdx(0), TestTypeIdx(0))), 0);
    }
}
