//! Demo CLI: runs the optimizer on a small synthetic network and prints the
//! weighted-best solution and Pareto front size. Mirrors the teacher's
//! `main.rs` tracing setup; everything else (DB pool, dotenv, CSV input) is
//! dropped because the optimizer itself is pure (spec §6). The best-so-far
//! CSV export mirrors the teacher's `save_to_csv(best_so_far_updates, ...)`,
//! fed from a `ProgressObserver` instead of an in-loop `Vec` since the
//! library doesn't expose per-generation history directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use colored::*;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use labnet_optimizer::config::{AlgorithmParams, DriverConfig, RoutingConfig};
use labnet_optimizer::distance::OsrmProvider;
use labnet_optimizer::domain::{CancellationToken, ProgressObserver, RunInput, RunStatus};
use labnet_optimizer::domain::types::{Coordinates, Constraints, Laboratory, ServiceArea, TestCapability, TestDemand, Weights};
use labnet_optimizer::driver::Driver;

fn demo_input() -> RunInput {
    let mut caps = HashMap::new();
    caps.insert(
        "PCR".to_string(),
        TestCapability {
            available: true,
            minutes_per_test: 15.0,
            staff_required: 1,
            equipment_utilization: 0.4,
            cost_per_test: 12.0,
            quality_score: 0.95,
        },
    );

    let laboratories = vec![
        Laboratory {
            id: "lab-central".into(),
            coordinates: Coordinates { latitude: 0.0, longitude: 0.0 },
            max_tests_per_day: 500,
            max_tests_per_month: 14_000,
            staff_count: 20,
            equipment_count: 6,
            utilization_factor: 0.85,
            open_minutes_per_day: Some(600.0),
            capabilities: caps.clone(),
        },
        Laboratory {
            id: "lab-east".into(),
            coordinates: Coordinates { latitude: 0.0, longitude: 2.0 },
            max_tests_per_day: 300,
            max_tests_per_month: 8_000,
            staff_count: 10,
            equipment_count: 3,
            utilization_factor: 0.7,
            open_minutes_per_day: Some(540.0),
            capabilities: caps,
        },
    ];

    let service_areas = vec![ServiceArea {
        id: "area-north".into(),
        coordinates: Coordinates { latitude: 0.0, longitude: 0.1 },
        population: 42_000,
        priority_level: 2,
        accessibility_index: 0.6,
    }];

    let test_demands = vec![TestDemand {
        area_id: "area-north".into(),
        test_type: "PCR".into(),
        count: 120,
        priority_level: 2,
        urgency: "routine".into(),
        seasonal_factor: 1.0,
    }];

    RunInput {
        laboratories,
        service_areas,
        test_demands,
        weights: Weights { distance: 0.3, time: 0.2, cost: 0.2, utilization: 0.2, accessibility: 0.1 },
        constraints: Constraints { quality_threshold: 0.5, ..Default::default() },
        algorithm: AlgorithmParams { population_size: 60, max_generations: 80, ..Default::default() },
        scenario_id: "demo-run".into(),
    }
}

/// Collects `(generation, best_fitness)` pairs as the Driver reports them,
/// for the CSV export below. Grounded on the teacher's `best_so_far_updates`
/// vector in `main.rs`, populated here from the observer callback instead of
/// an in-loop push since the generation loop lives inside the library.
#[derive(Default)]
struct BestSoFarRecorder {
    updates: Mutex<Vec<(usize, f64)>>,
}

impl ProgressObserver for BestSoFarRecorder {
    fn on_progress(&self, _run_id: &str, _status: RunStatus, _progress: f64, generation: usize, best_fitness: f64) {
        if best_fitness.is_finite() {
            self.updates.lock().unwrap().push((generation, best_fitness));
        }
    }
}

fn save_best_so_far_csv(updates: &[(usize, f64)], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&["generation", "best_fitness"])?;
    for (generation, fitness) in updates {
        wtr.write_record(&[generation.to_string(), fitness.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[tokio::main]
#[tracing::instrument(name = "labnet optimizer", level = "info")]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE))
        .init();

    let provider = Arc::new(OsrmProvider::new("https://router.project-osrm.org/table/v1/driving"));
    let driver = Driver::new(provider, RoutingConfig::default(), DriverConfig::default());

    info!("running demo allocation");
    let recorder = BestSoFarRecorder::default();
    let output = driver.run(demo_input(), CancellationToken::new(), &recorder).await;

    println!("{}", format!("status: {:?}", output.status).bold());
    if let Some(solution) = &output.solution {
        println!(
            "weighted-best fitness: {:.4} objectives={:?}",
            solution.fitness, solution.objectives
        );
    }
    println!(
        "pareto front size: {} | generations: {} | wall time: {}ms",
        output.pareto_front.len(),
        output.statistics.generations,
        output.statistics.wall_time_ms
    );
    if let Some((_, message)) = &output.failure {
        eprintln!("{}", message.red());
    }

    let updates = recorder.updates.lock().unwrap();
    if let Err(err) = save_best_so_far_csv(&updates, "best_so_far.csv") {
        eprintln!("{}", format!("failed to write best_so_far.csv: {err}").red());
    }
}
