//! Input validation (spec §7, `InvalidInput`) and `ProblemInstance`
//! construction. Validation runs before any matrix call or generation,
//! matching scenario 6 in spec §8 ("weights validation ... before any
//! matrix call").

use std::collections::HashMap;

use crate::config::AlgorithmParams;
use crate::domain::types::*;
use crate::error::{OptimizerError, OptimizerResult};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

pub fn validate_weights(weights: &Weights) -> OptimizerResult<()> {
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(OptimizerError::InvalidInput(format!(
            "weights must sum to 1.0 (+/- {WEIGHT_SUM_TOLERANCE}); got {sum}"
        )));
    }
    if weights.as_array().iter().any(|&w| w < 0.0) {
        return Err(OptimizerError::InvalidInput(
            "weights must be non-negative".into(),
        ));
    }
    Ok(())
}

pub fn validate_run(
    laboratories: &[Laboratory],
    service_areas: &[ServiceArea],
    test_demands: &[TestDemand],
    weights: &Weights,
    algorithm: &AlgorithmParams,
) -> OptimizerResult<()> {
    validate_weights(weights)?;
    algorithm
        .validate()
        .map_err(OptimizerError::InvalidInput)?;

    if laboratories.is_empty() {
        return Err(OptimizerError::InvalidInput(
            "laboratories must not be empty".into(),
        ));
    }
    if service_areas.is_empty() {
        return Err(OptimizerError::InvalidInput(
            "service_areas must not be empty".into(),
        ));
    }

    let area_ids: std::collections::HashSet<&str> =
        service_areas.iter().map(|a| a.id.as_str()).collect();

    for demand in test_demands {
        if !area_ids.contains(demand.area_id.as_str()) {
            return Err(OptimizerError::InvalidInput(format!(
                "test demand references unknown area `{}`",
                demand.area_id
            )));
        }
        // A demand count is already unsigned (u32) so "negative" is
        // structurally impossible; we still guard against an empty
        // test-type reference, which is the other half of this check.
        if demand.test_type.trim().is_empty() {
            return Err(OptimizerError::InvalidInput(
                "test demand has empty test_type".into(),
            ));
        }
    }

    let known_test_types: std::collections::HashSet<&str> = laboratories
        .iter()
        .flat_map(|l| l.capabilities.keys().map(|k| k.as_str()))
        .collect();
    for demand in test_demands {
        if !known_test_types.contains(demand.test_type.as_str()) {
            return Err(OptimizerError::InvalidInput(format!(
                "test demand references unknown test-type `{}` (no laboratory declares it)",
                demand.test_type
            )));
        }
    }

    Ok(())
}

/// Build the run-scoped `ProblemInstance`: resolve string ids to dense
/// indices and materialize the dense `lab x test-type` capability table
/// (spec §9's "dynamic test-capability maps" redesign note).
pub fn build_instance(
    laboratories: Vec<Laboratory>,
    service_areas: Vec<ServiceArea>,
    test_demands: Vec<TestDemand>,
) -> ProblemInstance {
    let lab_id_index: HashMap<String, LabIdx> = laboratories
        .iter()
        .enumerate()
        .map(|(i, l)| (l.id.clone(), LabIdx(i)))
        .collect();
    let area_id_index: HashMap<String, AreaIdx> = service_areas
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id.clone(), AreaIdx(i)))
        .collect();

    let mut test_types: Vec<String> = laboratories
        .iter()
        .flat_map(|l| l.capabilities.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    // Ensure every demanded test-type has a slot even if no lab declared it
    // verbatim (validate_run rejects that case, but building stays total).
    for d in &test_demands {
        if !test_types.contains(&d.test_type) {
            test_types.push(d.test_type.clone());
        }
    }
    let test_type_index: HashMap<String, TestTypeIdx> = test_types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), TestTypeIdx(i)))
        .collect();

    let mut capability_table: Vec<Vec<Option<TestCapability>>> =
        vec![vec![None; test_types.len()]; laboratories.len()];
    for (li, lab) in laboratories.iter().enumerate() {
        for (tt_name, cap) in &lab.capabilities {
            if let Some(&TestTypeIdx(ti)) = test_type_index.get(tt_name) {
                capability_table[li][ti] = Some(cap.clone());
            }
        }
    }

    let mut demands = HashMap::new();
    for d in &test_demands {
        let area = area_id_index[&d.area_id];
        let tt = test_type_index[&d.test_type];
        demands.insert((area, tt), d.clone());
    }

    ProblemInstance {
        laboratories,
        service_areas,
        test_types,
        demands,
        capability_table,
        area_id_index,
        lab_id_index,
        test_type_index,
    }
}
