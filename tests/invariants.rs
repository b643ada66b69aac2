//! Structural invariants from spec §8 (1, 2, 3, 6), property-tested over
//! randomized small networks.

use std::collections::HashMap;

use proptest::prelude::*;

use labnet_optimizer::domain::types::{
    Allocation, Coordinates, Constraints, Laboratory, Matrices, ServiceArea, TestCapability,
    TestDemand,
};
use labnet_optimizer::feasibility;

fn lab(id: &str, day_cap: u32, quality: f64) -> Laboratory {
    let mut capabilities = HashMap::new();
    capabilities.insert(
        "T".to_string(),
        TestCapability {
            available: true,
            minutes_per_test: 8.0,
            staff_required: 1,
            equipment_utilization: 0.3,
            cost_per_test: 6.0,
            quality_score: quality,
        },
    );
    Laboratory {
        id: id.to_string(),
        coordinates: Coordinates { latitude: 0.0, longitude: 0.0 },
        max_tests_per_day: day_cap,
        max_tests_per_month: day_cap * 30,
        staff_count: 4,
        equipment_count: 2,
        utilization_factor: 0.75,
        open_minutes_per_day: Some(450.0),
        capabilities,
    }
}

fn area(id: &str, lon: f64) -> ServiceArea {
    ServiceArea {
        id: id.to_string(),
        coordinates: Coordinates { latitude: 0.0, longitude: lon },
        population: 1000,
        priority_level: 1,
        accessibility_index: 0.5,
    }
}

proptest! {
    /// Invariants 1, 2, 3: after repair, every demand is fully conserved,
    /// every count is non-negative (structurally true for u32), and every
    /// allocation edge respects capability (available + quality threshold).
    #[test]
    fn repair_preserves_demand_conservation_and_capability(
        demand_count in 1u32..200,
        cap_a in 5u32..100,
        cap_b in 5u32..100,
        quality_b in 0.0f64..1.0,
    ) {
        let labs = vec![lab("L1", cap_a, 1.0), lab("L2", cap_b, quality_b)];
        let areas = vec![area("A", 0.1)];
        let demand = TestDemand {
            area_id: "A".into(),
            test_type: "T".into(),
            count: demand_count,
            priority_level: 1,
            urgency: "routine".into(),
            seasonal_factor: 1.0,
        };
        let instance = labnet_optimizer::domain::validate::build_instance(labs, areas, vec![demand]);
        let matrices = Matrices { distance_km: vec![vec![10.0, 20.0]], time_min: vec![vec![12.0, 24.0]] };
        let constraints = Constraints { quality_threshold: 0.5, ..Default::default() };

        let area_idx = instance.area_id_index["A"];
        let tt_idx = instance.test_type_index["T"];
        let lab0 = instance.lab_id_index["L1"];

        let mut allocation = Allocation::new();
        allocation.add((area_idx, tt_idx), lab0, demand_count);

        let (repaired, _soft) = feasibility::repair(allocation, &instance, &matrices, &constraints);

        prop_assert_eq!(repaired.total_for((area_idx, tt_idx)), demand_count);

        for (_area, tt, lab_idx, count) in repaired.edges() {
            if count == 0 {
                continue;
            }
            let cap = instance.capability(lab_idx, tt);
            prop_assert!(cap.is_some());
            prop_assert!(cap.unwrap().available);
            prop_assert!(cap.unwrap().quality_score >= constraints.quality_threshold);
        }

        let violations = feasibility::check(&repaired, &instance, &matrices, &constraints);
        prop_assert!(!violations.iter().any(|v| matches!(
            v,
            feasibility::Violation::DemandConservation { .. } | feasibility::Violation::Capability { .. }
        )));
    }
}

/// Invariant 6 (Pareto front): no two members of a hand-built front
/// mutually dominate, checked directly against the dominance relation.
#[test]
fn pareto_front_members_do_not_mutually_dominate() {
    use labnet_optimizer::domain::types::Solution;
    use labnet_optimizer::solver::nsga2::{dominates, fast_non_dominated_sort};

    let mut population = vec![
        Solution::new(Allocation::new()),
        Solution::new(Allocation::new()),
        Solution::new(Allocation::new()),
    ];
    population[0].objectives = [100.0, 10.0, 50.0, 0.9, 0.5];
    population[1].objectives = [50.0, 10.0, 50.0, 0.1, 0.9];
    population[2].objectives = [200.0, 20.0, 80.0, 0.05, 0.1];

    let fronts = fast_non_dominated_sort(&mut population);
    let front0 = &fronts[0];
    for &i in front0 {
        for &j in front0 {
            if i != j {
                assert!(!dominates(&population[i].objectives, &population[j].objectives));
            }
        }
    }
}
