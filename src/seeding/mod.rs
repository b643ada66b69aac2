//! Population Seeder (spec §4.D). Grounded on the teacher's
//! `fixtures/data_generator.rs` (randomized + deterministic input
//! construction) and `setup/init.rs`'s permutation-before-building shape,
//! generalized from "random customer order" to "random demand order per
//! seed" so repeated runs diversify the hybrid pool (spec §4.D).

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::types::{AreaIdx, Constraints, LabIdx, Matrices, ProblemInstance, Solution, TestTypeIdx};
use crate::error::{OptimizerError, OptimizerResult};
use crate::feasibility;

const HYBRID_DISTANCE_WEIGHT: f64 = 0.7;
const HYBRID_LOAD_WEIGHT: f64 = 0.3;
const HYBRID_LOAD_SCALE: f64 = 100.0;

/// Deterministic per-solution sub-stream (spec §5): derived from the run
/// seed and the solution's index so parallel seeding never reorders draws.
pub fn sub_rng(base_seed: u64, index: usize) -> ChaCha8Rng {
    let mixed = base_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    ChaCha8Rng::seed_from_u64(mixed)
}

fn eligible_labs(
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    area: AreaIdx,
    tt: TestTypeIdx,
) -> Vec<LabIdx> {
    instance
        .capable_labs(tt, constraints.quality_threshold)
        .into_iter()
        .filter(|&lab| {
            let (d, t) = matrices.get(area, lab);
            constraints.max_distance_km.map_or(true, |max| d <= max)
                && constraints.max_travel_time_minutes.map_or(true, |max| t <= max)
        })
        .collect()
}

/// Generates `population_size` seed solutions split into random / nearest /
/// hybrid thirds (spec §4.D), each repaired for capacity before return.
/// Fails with `InfeasibleProblem` if any demand has no eligible lab at all.
pub fn seed_population(
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    population_size: usize,
    base_seed: u64,
) -> OptimizerResult<Vec<Solution>> {
    let demand_keys = instance.demand_keys();

    for &(area, tt) in &demand_keys {
        if eligible_labs(instance, matrices, constraints, area, tt).is_empty() {
            let area_id = &instance.service_areas[area.0].id;
            let test_type = &instance.test_types[tt.0];
            return Err(OptimizerError::InfeasibleProblem(format!(
                "no capable, reachable lab for demand (area={area_id}, test_type={test_type})"
            )));
        }
    }

    let third = population_size / 3;
    let mut solutions = Vec::with_capacity(population_size);

    for index in 0..population_size {
        let mut rng = sub_rng(base_seed, index);
        let mut order = demand_keys.clone();
        order.shuffle(&mut rng);

        let strategy = if index < third {
            Strategy::Random
        } else if index < 2 * third {
            Strategy::Nearest
        } else {
            Strategy::Hybrid
        };

        let allocation = build_seed(instance, matrices, constraints, &order, strategy, &mut rng);
        let (repaired, soft_violations) = feasibility::repair(allocation, instance, matrices, constraints);

        let mut solution = Solution::new(repaired);
        solution.soft_violations = soft_violations;
        solutions.push(solution);
    }

    Ok(solutions)
}

#[derive(Clone, Copy)]
enum Strategy {
    Random,
    Nearest,
    Hybrid,
}

fn build_seed(
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    order: &[(AreaIdx, TestTypeIdx)],
    strategy: Strategy,
    rng: &mut ChaCha8Rng,
) -> crate::domain::types::Allocation {
    let mut allocation = crate::domain::types::Allocation::new();
    let mut current_load = vec![0u32; instance.num_labs()];

    for &(area, tt) in order {
        let demand = match instance.demands.get(&(area, tt)) {
            Some(d) => d,
            None => continue,
        };
        if demand.count == 0 {
            continue;
        }
        let candidates = eligible_labs(instance, matrices, constraints, area, tt);
        if candidates.is_empty() {
            continue;
        }

        let chosen = match strategy {
            Strategy::Random => candidates[rng.gen_range(0..candidates.len())],
            Strategy::Nearest => *candidates
                .iter()
                .min_by(|&&a, &&b| matrices.get(area, a).0.total_cmp(&matrices.get(area, b).0))
                .unwrap(),
            Strategy::Hybrid => *candidates
                .iter()
                .min_by(|&&a, &&b| hybrid_score(instance, matrices, &current_load, area, a).total_cmp(&hybrid_score(instance, matrices, &current_load, area, b)))
                .unwrap(),
        };

        allocation.add((area, tt), chosen, demand.count);
        current_load[chosen.0] += demand.count;
    }

    allocation
}

/// `0.7 x D[area,lab] + 0.3 x 100 x (current_load / max_tests_per_day)`
/// (spec §4.D). Mixes kilometres and percentage points, flagged as a known
/// unit mismatch carried over verbatim from the contract (spec §9).
fn hybrid_score(instance: &ProblemInstance, matrices: &Matrices, current_load: &[u32], area: AreaIdx, lab: LabIdx) -> f64 {
    let (d, _t) = matrices.get(area, lab);
    let cap = instance.laboratories[lab.0].max_tests_per_day;
    let load_ratio = if cap == 0 { 1.0 } else { current_load[lab.0] as f64 / cap as f64 };
    HYBRID_DISTANCE_WEIGHT * d + HYBRID_LOAD_WEIGHT * HYBRID_LOAD_SCALE * load_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Coordinates, Laboratory, ServiceArea, TestCapability, TestDemand};
    use std::collections::HashMap;

    fn two_lab_instance() -> ProblemInstance {
        let mut caps = HashMap::new();
        caps.insert(
            "T".to_string(),
            TestCapability {
                available: true,
                minutes_per_test: 10.0,
                staff_required: 1,
                equipment_utilization: 0.5,
                cost_per_test: 5.0,
                quality_score: 1.0,
            },
        );
        let labs = vec![
            Laboratory {
                id: "L1".into(),
                coordinates: Coordinates { latitude: 0.0, longitude: 0.0 },
                max_tests_per_day: 1000,
                max_tests_per_month: 30000,
                staff_count: 5,
                equipment_count: 2,
                utilization_factor: 0.8,
                open_minutes_per_day: Some(480.0),
                capabilities: caps.clone(),
            },
            Laboratory {
                id: "L2".into(),
                coordinates: Coordinates { latitude: 0.0, longitude: 2.0 },
                max_tests_per_day: 1000,
                max_tests_per_month: 30000,
                staff_count: 5,
                equipment_count: 2,
                utilization_factor: 0.8,
                open_minutes_per_day: Some(480.0),
                capabilities: caps,
            },
        ];
        let areas = vec![ServiceArea {
            id: "A".into(),
            coordinates: Coordinates { latitude: 0.0, longitude: 0.1 },
            population: 1000,
            priority_level: 1,
            accessibility_index: 0.5,
        }];
        let demands = vec![TestDemand {
            area_id: "A".into(),
            test_type: "T".into(),
            count: 50,
            priority_level: 1,
            urgency: "routine".into(),
            seasonal_factor: 1.0,
        }];
        crate::domain::validate::build_instance(labs, areas, demands)
    }

    #[test]
    fn nearest_strategy_prefers_closer_lab() {
        let instance = two_lab_instance();
        let matrices = Matrices { distance_km: vec![vec![11.0, 222.0]], time_min: vec![vec![13.0, 266.0]] };
        let constraints = Constraints::default();
        let solutions = seed_population(&instance, &matrices, &constraints, 30, 42).unwrap();

        let nearest_solutions = &solutions[10..20];
        let area_idx = instance.area_id_index["A"];
        let tt_idx = instance.test_type_index["T"];
        let lab0 = instance.lab_id_index["L1"];
        for solution in nearest_solutions {
            assert_eq!(solution.allocation.total_for((area_idx, tt_idx)), 50);
            let on_l1 = solution.allocation.entries[&(area_idx, tt_idx)].get(&lab0).copied().unwrap_or(0);
            assert_eq!(on_l1, 50);
        }
    }

    #[test]
    fn infeasible_demand_is_rejected_before_generation_loop() {
        let mut instance = two_lab_instance();
        for lab in &mut instance.laboratories {
            lab.capabilities.clear();
        }
        instance.capability_table = vec![vec![None; instance.test_types.len()]; instance.laboratories.len()];
        let matrices = Matrices { distance_km: vec![vec![11.0, 222.0]], time_min: vec![vec![13.0, 266.0]] };
        let constraints = Constraints::default();

        let result = seed_population(&instance, &matrices, &constraints, 30, 42);
        assert!(matches!(result, Err(OptimizerError::InfeasibleProblem(_))));
    }
}
