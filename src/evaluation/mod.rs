//! Objective Evaluator (spec §4.E). Grounded on the teacher's
//! `evaluation/fitness.rs` + `evaluation/penalty.rs` split (distance/cost
//! arithmetic kept apart from capacity-derived terms), generalized from a
//! single scalar tabu-search fitness to five independently normalized
//! objectives feeding NSGA-II dominance.

use crate::config::objective_constants::*;
use crate::domain::types::{
    Allocation, Matrices, ProblemInstance, Weights, NUM_OBJECTIVES, OBJ_ACC, OBJ_COST, OBJ_DIST,
    OBJ_TIME, OBJ_UTIL,
};

/// Computes the five raw objective scalars (spec §4.E) for `allocation`
/// against the run's matrices. Never fails: every input is already
/// feasibility-checked by the time this runs.
pub fn evaluate(allocation: &Allocation, instance: &ProblemInstance, matrices: &Matrices) -> [f64; NUM_OBJECTIVES] {
    let mut f_dist = 0.0;
    let mut f_time = 0.0;
    let mut f_cost = 0.0;
    let mut total_tests: u64 = 0;

    for (area, _tt, lab, count) in allocation.edges() {
        let (d, t) = matrices.get(area, lab);
        let count_f = count as f64;
        f_dist += d * count_f;
        f_time += t * count_f;
        f_cost += (BASE_COST_PER_TEST + COST_PER_KM * d) * count_f;
        total_tests += count as u64;
    }

    let mut assigned_per_lab = vec![0u32; instance.num_labs()];
    for (_, _, lab, count) in allocation.edges() {
        assigned_per_lab[lab.0] += count;
    }
    let utilization_scores: Vec<f64> = assigned_per_lab
        .iter()
        .zip(&instance.laboratories)
        .filter(|(_, lab)| lab.max_tests_per_day > 0)
        .map(|(&assigned, lab)| (assigned as f64 / lab.max_tests_per_day as f64).min(1.0))
        .collect();
    let f_util = if utilization_scores.is_empty() {
        0.0
    } else {
        utilization_scores.iter().sum::<f64>() / utilization_scores.len() as f64
    };

    let avg_distance = if total_tests == 0 { 0.0 } else { f_dist / total_tests as f64 };
    let f_acc = 1.0 / (1.0 + avg_distance / ACCESSIBILITY_SCALE_KM);

    let mut objectives = [0.0; NUM_OBJECTIVES];
    objectives[OBJ_DIST] = f_dist;
    objectives[OBJ_TIME] = f_time;
    objectives[OBJ_COST] = f_cost;
    objectives[OBJ_UTIL] = f_util;
    objectives[OBJ_ACC] = f_acc;
    objectives
}

/// Normalizes raw objectives into `[0, 1]` with minimize objectives flipped
/// to "higher is better", per spec §4.E's pinned denominators.
pub fn normalize(objectives: &[f64; NUM_OBJECTIVES]) -> [f64; NUM_OBJECTIVES] {
    [
        1.0 - (objectives[OBJ_DIST] / DIST_NORM_KM).min(1.0),
        1.0 - (objectives[OBJ_TIME] / TIME_NORM_MIN).min(1.0),
        1.0 - (objectives[OBJ_COST] / COST_NORM).min(1.0),
        objectives[OBJ_UTIL],
        objectives[OBJ_ACC],
    ]
}

/// Weighted-fitness scalar (spec §4.E, GLOSSARY "Weighted fitness"): used
/// only for selection tiebreaks and choosing the best-of-front solution,
/// never for dominance itself.
pub fn weighted_fitness(objectives: &[f64; NUM_OBJECTIVES], weights: &Weights) -> f64 {
    let n = normalize(objectives);
    weights.as_array().iter().zip(n.iter()).map(|(w, v)| w * v).sum()
}
