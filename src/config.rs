//! Numeric defaults the optimizer is contractually pinned to (spec §4.E) and
//! the knobs a caller may tune (spec §6 `algorithm`, §5 concurrency model).
//!
//! Mirrors the shape of the teacher's `config::constant` module, but nothing
//! here is read from the environment: per spec §6 the optimizer is pure and
//! touches no files, env vars, or global state. Callers construct these and
//! pass them in.

/// Objective-normalization constants from spec §4.E. Tests pin these exactly.
pub mod objective_constants {
    pub const DIST_NORM_KM: f64 = 10_000.0;
    pub const TIME_NORM_MIN: f64 = 5_000.0;
    pub const COST_NORM: f64 = 100_000.0;
    pub const BASE_COST_PER_TEST: f64 = 25.0;
    pub const COST_PER_KM: f64 = 0.5;
    pub const ASSUMED_SPEED_KMH: f64 = 50.0;
    pub const ACCESSIBILITY_SCALE_KM: f64 = 50.0;
}

/// Great-circle fallback constant from spec §4.A.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmParams {
    pub population_size: usize,
    pub max_generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub convergence_threshold: f64,
    pub seed: u64,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        AlgorithmParams {
            population_size: 200,
            max_generations: 500,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            convergence_threshold: 1e-3,
            seed: 0,
        }
    }
}

impl AlgorithmParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(10..=10_000).contains(&self.population_size) {
            return Err(format!(
                "population_size {} out of range [10, 10000]",
                self.population_size
            ));
        }
        if !(1..=10_000).contains(&self.max_generations) {
            return Err(format!(
                "max_generations {} out of range [1, 10000]",
                self.max_generations
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(format!(
                "crossover_rate {} out of range [0, 1]",
                self.crossover_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(format!(
                "mutation_rate {} out of range [0, 1]",
                self.mutation_rate
            ));
        }
        if self.convergence_threshold < 0.0 {
            return Err("convergence_threshold must be >= 0".into());
        }
        Ok(())
    }
}

/// Tuning for the Routing Adapter (spec §4.A) and Matrix Builder (spec §4.B).
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub route_parallelism: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            base_url: "https://router.project-osrm.org/table/v1/driving".to_string(),
            timeout_ms: 5_000,
            max_retries: 3,
            retry_backoff_base_ms: 200,
            cache_capacity: 10_000,
            cache_ttl_secs: 3_600,
            route_parallelism: 8,
        }
    }
}

/// Process-wide admission control and run-level timeout (spec §5).
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub max_concurrent_runs: usize,
    pub run_timeout_secs: u64,
    pub progress_report_every_n_generations: usize,
    pub convergence_window: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            max_concurrent_runs: 5,
            run_timeout_secs: 900,
            progress_report_every_n_generations: 10,
            convergence_window: 20,
        }
    }
}
