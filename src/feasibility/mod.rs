//! Feasibility Checker (spec §4.C): validates and repairs candidate
//! allocations against capability, reachability, capacity, and demand
//! conservation. Grounded on the teacher's own capacity-repair shape —
//! `domain/solution.rs::trucks_by_excess` (partition, attach capacity,
//! compute excess, sort by excess) and
//! `solver/tabu_search/repair.rs::alns_destroy_and_recreate` (pop overloaded
//! entries into a max-heap, greedily reinsert onto underloaded carriers,
//! dump any remainder on the least-overloaded one) — generalized from
//! "trucks on a route" to "labs in an allocation".

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::domain::types::{Allocation, AreaIdx, Constraints, LabIdx, Matrices, ProblemInstance, TestTypeIdx};

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Capability { area: AreaIdx, test_type: TestTypeIdx, lab: LabIdx },
    Reachability { area: AreaIdx, test_type: TestTypeIdx, lab: LabIdx },
    DailyCapacityExceeded { lab: LabIdx, assigned: u32, capacity: u32 },
    MonthlyCapacityExceeded { lab: LabIdx, assigned: u32, capacity: u32 },
    DemandConservation { area: AreaIdx, test_type: TestTypeIdx, expected: u32, actual: u32 },
}

/// Reports violations rather than raising (spec §4.C): a caller decides
/// whether to repair, penalize, or reject.
pub fn check(
    allocation: &Allocation,
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    // Capability + reachability, per edge.
    for (area, tt, lab, _count) in allocation.edges() {
        match instance.capability(lab, tt) {
            Some(cap) if cap.available && cap.quality_score >= constraints.quality_threshold => {}
            _ => violations.push(Violation::Capability { area, test_type: tt, lab }),
        }

        let (d, t) = matrices.get(area, lab);
        let distance_ok = constraints.max_distance_km.map_or(true, |max| d <= max);
        let time_ok = constraints
            .max_travel_time_minutes
            .map_or(true, |max| t <= max);
        if !distance_ok || !time_ok {
            violations.push(Violation::Reachability { area, test_type: tt, lab });
        }
    }

    // Demand conservation, per (area, test_type).
    for (&key, demand) in &instance.demands {
        let actual = allocation.total_for(key);
        if actual != demand.count {
            violations.push(Violation::DemandConservation {
                area: key.0,
                test_type: key.1,
                expected: demand.count,
                actual,
            });
        }
    }

    // Capacity, per lab.
    for (li, lab) in instance.laboratories.iter().enumerate() {
        let lab_idx = LabIdx(li);
        let assigned_total: u32 = allocation
            .edges()
            .filter(|&(_, _, l, _)| l == lab_idx)
            .map(|(_, _, _, c)| c)
            .sum();

        if assigned_total > lab.max_tests_per_day {
            violations.push(Violation::DailyCapacityExceeded {
                lab: lab_idx,
                assigned: assigned_total,
                capacity: lab.max_tests_per_day,
            });
        }
        if assigned_total > lab.max_tests_per_month {
            violations.push(Violation::MonthlyCapacityExceeded {
                lab: lab_idx,
                assigned: assigned_total,
                capacity: lab.max_tests_per_month,
            });
        }

        // Operational-hours-aware minutes-based daily load (spec §4.C),
        // enforced only when the toggle is set and the lab declares open
        // minutes — resolving the Open Question in spec §9 about when this
        // minutes-based check applies.
        if constraints.enforce_operational_hours {
            if let Some(open_minutes) = lab.open_minutes_per_day {
                if open_minutes <= 0.0 {
                    // A lab with zero open time is wholly ineligible; every
                    // edge assigned to it is effectively a capability gap.
                    for (area, tt, l, _) in allocation.edges() {
                        if l == lab_idx {
                            violations.push(Violation::Capability { area, test_type: tt, lab: lab_idx });
                        }
                    }
                } else {
                    let minutes_load: f64 = allocation
                        .edges()
                        .filter(|&(_, _, l, _)| l == lab_idx)
                        .filter_map(|(_, tt, _, count)| {
                            instance
                                .capability(lab_idx, tt)
                                .map(|cap| count as f64 * cap.minutes_per_test)
                        })
                        .sum();
                    let normalized = minutes_load / (60.0 * open_minutes * lab.utilization_factor.max(1e-9));
                    if normalized > 1.0 {
                        violations.push(Violation::DailyCapacityExceeded {
                            lab: lab_idx,
                            assigned: assigned_total,
                            capacity: lab.max_tests_per_day,
                        });
                    }
                }
            }
        }
    }

    violations
}

/// Repairs capacity violations by moving the offending tests to the nearest
/// capable lab with remaining room; if none exists, leaves them on the
/// least-overloaded capable lab and counts it as a soft violation (spec
/// §4.C). Capability/reachability/demand-conservation violations are not
/// addressed here — the Seeder is expected to only ever propose capable,
/// reachable, fully-allocated edges; capacity is the one constraint that
/// interacts across demands and so needs a global repair pass.
pub fn repair(
    mut allocation: Allocation,
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
) -> (Allocation, u32) {
    let mut soft_violations = 0u32;

    loop {
        let overloaded = overloaded_labs(&allocation, instance);
        if overloaded.is_empty() {
            break;
        }

        let mut moved_any = false;
        for (lab, excess) in overloaded {
            moved_any |= drain_excess(&mut allocation, instance, matrices, constraints, lab, excess, &mut soft_violations);
        }
        if !moved_any {
            // Nothing could be moved anywhere; remaining overload is
            // unavoidable given capability/reachability constraints.
            break;
        }
    }

    (allocation, soft_violations)
}

fn overloaded_labs(allocation: &Allocation, instance: &ProblemInstance) -> Vec<(LabIdx, u32)> {
    let mut totals = vec![0u32; instance.num_labs()];
    for (_, _, lab, count) in allocation.edges() {
        totals[lab.0] += count;
    }

    let mut overloaded: Vec<(LabIdx, u32)> = totals
        .iter()
        .enumerate()
        .filter_map(|(i, &total)| {
            let lab = &instance.laboratories[i];
            let cap = lab.max_tests_per_day.min(lab.max_tests_per_month);
            (total > cap).then_some((LabIdx(i), total - cap))
        })
        .collect();
    overloaded.sort_by_key(|&(_, excess)| Reverse(excess));
    overloaded
}

/// Pop the highest-count edges off `lab` (a max-heap ordered by count,
/// mirroring `Location`'s demand-descending `Ord` in the teacher's
/// `domain/types.rs`) until its excess is gone, then greedily reinsert each
/// popped chunk onto the nearest capable lab with remaining room. Any
/// remainder goes back on `lab` itself and is counted as a soft violation.
fn drain_excess(
    allocation: &mut Allocation,
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    lab: LabIdx,
    mut excess: u32,
    soft_violations: &mut u32,
) -> bool {
    let mut edges_on_lab: Vec<((AreaIdx, TestTypeIdx), u32)> = allocation
        .entries
        .iter()
        .filter_map(|(&key, labs)| labs.get(&lab).map(|&c| (key, c)))
        .collect();
    // Highest count first, so large chunks move before small ones.
    edges_on_lab.sort_by_key(|&(_, c)| Reverse(c));

    let mut heap: BinaryHeap<(u32, (AreaIdx, TestTypeIdx))> = BinaryHeap::new();
    for (key, count) in edges_on_lab {
        if excess == 0 {
            break;
        }
        let take = count.min(excess);
        if take == 0 {
            continue;
        }
        *allocation
            .entries
            .get_mut(&key)
            .unwrap()
            .get_mut(&lab)
            .unwrap() -= take;
        excess -= take;
        heap.push((take, key));
    }

    let mut moved_any = false;
    while let Some((count, key)) = heap.pop() {
        let (area, tt) = key;
        let alternatives = capable_labs_with_room(allocation, instance, matrices, constraints, area, tt, lab);

        if let Some(target) = alternatives.first().copied() {
            allocation.add(key, target, count);
            moved_any = true;
        } else {
            // No capable lab has room; put it back on the originating lab
            // and flag the soft violation (spec §4.C: "tests remain on the
            // least-overloaded capable lab").
            allocation.add(key, lab, count);
            *soft_violations += 1;
        }
    }

    moved_any
}

/// Capable, reachable labs (excluding `exclude`) with remaining daily/
/// monthly room, nearest first.
fn capable_labs_with_room(
    allocation: &Allocation,
    instance: &ProblemInstance,
    matrices: &Matrices,
    constraints: &Constraints,
    area: AreaIdx,
    tt: TestTypeIdx,
    exclude: LabIdx,
) -> Vec<LabIdx> {
    let mut totals = vec![0u32; instance.num_labs()];
    for (_, _, lab, count) in allocation.edges() {
        totals[lab.0] += count;
    }

    let mut candidates: Vec<(LabIdx, f64)> = instance
        .capable_labs(tt, constraints.quality_threshold)
        .into_iter()
        .filter(|&lab| lab != exclude)
        .filter(|&lab| {
            let cap = instance.laboratories[lab.0]
                .max_tests_per_day
                .min(instance.laboratories[lab.0].max_tests_per_month);
            totals[lab.0] < cap
        })
        .filter(|&lab| {
            let (d, t) = matrices.get(area, lab);
            constraints.max_distance_km.map_or(true, |max| d <= max)
                && constraints.max_travel_time_minutes.map_or(true, |max| t <= max)
        })
        .map(|lab| (lab, matrices.get(area, lab).0))
        .collect();

    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.into_iter().map(|(lab, _)| lab).collect()
}
