//! Run-scoped data model (spec §3). Identifiers are strings at the external
//! boundary and resolved to dense indices (`AreaIdx`/`LabIdx`/`TestTypeIdx`)
//! once per run — see `ProblemInstance`. This removes hash lookups from the
//! hot loops in `evaluation` and `solver::nsga2`, per the "dense table" and
//! "integer indices replace pointers" notes in spec §9.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestTypeIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct TestCapability {
    pub available: bool,
    pub minutes_per_test: f64,
    pub staff_required: u32,
    pub equipment_utilization: f64,
    pub cost_per_test: f64,
    pub quality_score: f64,
}

#[derive(Debug, Clone)]
pub struct Laboratory {
    pub id: String,
    pub coordinates: Coordinates,
    pub max_tests_per_day: u32,
    pub max_tests_per_month: u32,
    pub staff_count: u32,
    pub equipment_count: u32,
    pub utilization_factor: f64,
    /// Open minutes per day, used by the daily-capacity check (spec §4.C).
    /// `None` means operational-hours enforcement does not apply to this lab.
    pub open_minutes_per_day: Option<f64>,
    /// Keyed by test-type id string; absent entries mean "not capable".
    pub capabilities: HashMap<String, TestCapability>,
}

#[derive(Debug, Clone)]
pub struct ServiceArea {
    pub id: String,
    pub coordinates: Coordinates,
    pub population: u64,
    pub priority_level: u8,
    pub accessibility_index: f64,
}

#[derive(Debug, Clone)]
pub struct TestDemand {
    pub area_id: String,
    pub test_type: String,
    pub count: u32,
    pub priority_level: u8,
    pub urgency: String,
    pub seasonal_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub distance: f64,
    pub time: f64,
    pub cost: f64,
    pub utilization: f64,
    pub accessibility: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.distance + self.time + self.cost + self.utilization + self.accessibility
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.distance,
            self.time,
            self.cost,
            self.utilization,
            self.accessibility,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Constraints {
    pub max_distance_km: Option<f64>,
    pub max_travel_time_minutes: Option<f64>,
    pub min_utilization_rate: Option<f64>,
    pub max_utilization_rate: Option<f64>,
    pub enforce_operational_hours: bool,
    pub quality_threshold: f64,
}

/// Dense km/minutes matrices built once per run (spec §4.B). Shape is
/// `areas.len() x labs.len()`; never mutated after construction.
#[derive(Debug, Clone)]
pub struct Matrices {
    pub distance_km: Vec<Vec<f64>>,
    pub time_min: Vec<Vec<f64>>,
}

impl Matrices {
    pub fn get(&self, area: AreaIdx, lab: LabIdx) -> (f64, f64) {
        (self.distance_km[area.0][lab.0], self.time_min[area.0][lab.0])
    }
}

/// `(area, test-type) -> (lab -> count)`. A thin newtype over nested maps so
/// hot loops iterate edges without re-hashing string keys (spec §9).
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub entries: HashMap<(AreaIdx, TestTypeIdx), HashMap<LabIdx, u32>>,
}

impl Allocation {
    pub fn new() -> Self {
        Allocation::default()
    }

    pub fn total_for(&self, key: (AreaIdx, TestTypeIdx)) -> u32 {
        self.entries.get(&key).map_or(0, |m| m.values().sum())
    }

    pub fn add(&mut self, key: (AreaIdx, TestTypeIdx), lab: LabIdx, count: u32) {
        if count == 0 {
            return;
        }
        *self.entries.entry(key).or_default().entry(lab).or_insert(0) += count;
    }

    /// Iterate every allocation edge as `(area, test_type, lab, count)`.
    pub fn edges(&self) -> impl Iterator<Item = (AreaIdx, TestTypeIdx, LabIdx, u32)> + '_ {
        self.entries.iter().flat_map(|(&(area, tt), labs)| {
            labs.iter().map(move |(&lab, &count)| (area, tt, lab, count))
        })
    }

    pub fn total_tests(&self) -> u64 {
        self.entries
            .values()
            .flat_map(|m| m.values())
            .map(|&c| c as u64)
            .sum()
    }
}

/// Objective indices, fixed order per spec §4.E: distance, time, cost,
/// utilization, accessibility.
pub const OBJ_DIST: usize = 0;
pub const OBJ_TIME: usize = 1;
pub const OBJ_COST: usize = 2;
pub const OBJ_UTIL: usize = 3;
pub const OBJ_ACC: usize = 4;
pub const NUM_OBJECTIVES: usize = 5;

#[derive(Debug, Clone)]
pub struct Solution {
    pub allocation: Allocation,
    pub objectives: [f64; NUM_OBJECTIVES],
    pub rank: usize,
    pub crowding_distance: f64,
    pub fitness: f64,
    /// Count of demand edges that could not be fully repaired onto a
    /// within-capacity lab (spec §4.C). Used only for tie-breaking in
    /// §4.F, never to distort the objective values themselves.
    pub soft_violations: u32,
}

impl Solution {
    pub fn new(allocation: Allocation) -> Self {
        Solution {
            allocation,
            objectives: [0.0; NUM_OBJECTIVES],
            rank: 0,
            crowding_distance: 0.0,
            fitness: 0.0,
            soft_violations: 0,
        }
    }
}

/// Run-scoped snapshot: resolved indices, dense capability table, and
/// everything the solver's hot loops need without touching the original
/// string-keyed records again. Named after the teacher's own
/// `ProblemInstance` in `domain/types.rs`.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub laboratories: Vec<Laboratory>,
    pub service_areas: Vec<ServiceArea>,
    pub test_types: Vec<String>,
    /// `(area, test_type) -> demand`. Demands that don't exist are absent.
    pub demands: HashMap<(AreaIdx, TestTypeIdx), TestDemand>,
    /// Dense `lab x test-type` capability table; `None` means not capable.
    pub capability_table: Vec<Vec<Option<TestCapability>>>,
    pub area_id_index: HashMap<String, AreaIdx>,
    pub lab_id_index: HashMap<String, LabIdx>,
    pub test_type_index: HashMap<String, TestTypeIdx>,
}

impl ProblemInstance {
    pub fn num_areas(&self) -> usize {
        self.service_areas.len()
    }

    pub fn num_labs(&self) -> usize {
        self.laboratories.len()
    }

    pub fn num_test_types(&self) -> usize {
        self.test_types.len()
    }

    pub fn capability(&self, lab: LabIdx, tt: TestTypeIdx) -> Option<&TestCapability> {
        self.capability_table[lab.0][tt.0].as_ref()
    }

    pub fn capable_labs(&self, tt: TestTypeIdx, quality_threshold: f64) -> Vec<LabIdx> {
        (0..self.num_labs())
            .filter_map(|i| {
                let lab = LabIdx(i);
                self.capability(lab, tt).and_then(|cap| {
                    (cap.available && cap.quality_score >= quality_threshold).then_some(lab)
                })
            })
            .collect()
    }

    pub fn demand_keys(&self) -> Vec<(AreaIdx, TestTypeIdx)> {
        let mut keys: Vec<_> = self.demands.keys().copied().collect();
        keys.sort();
        keys
    }
}
