//! External interfaces (spec §6): run input/output, progress observer, and
//! cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AlgorithmParams;
use crate::domain::types::{Constraints, Laboratory, ServiceArea, Solution, TestDemand, Weights};
use crate::error::OptimizerError;

#[derive(Debug, Clone)]
pub struct RunInput {
    pub laboratories: Vec<Laboratory>,
    pub service_areas: Vec<ServiceArea>,
    pub test_demands: Vec<TestDemand>,
    pub weights: Weights,
    pub constraints: Constraints,
    pub algorithm: AlgorithmParams,
    /// Opaque; used only for logging/correlation (spec §6).
    pub scenario_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    pub generations: usize,
    pub wall_time_ms: u128,
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub status: RunStatus,
    pub solution: Option<Solution>,
    pub pareto_front: Vec<Solution>,
    pub statistics: RunStatistics,
    pub failure: Option<(OptimizerError, String)>,
}

impl RunOutput {
    pub fn failed(err: OptimizerError, stats: RunStatistics) -> Self {
        let message = err.to_string();
        RunOutput {
            status: RunStatus::Failed,
            solution: None,
            pareto_front: Vec::new(),
            statistics: stats,
            failure: Some((err, message)),
        }
    }
}

/// Fire-and-forget progress callback (spec §6). Invoked at least every 10
/// generations and at each phase boundary.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(
        &self,
        run_id: &str,
        status: RunStatus,
        progress: f64,
        current_generation: usize,
        best_fitness: f64,
    );
}

/// Default observer that discards every update.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _: &str, _: RunStatus, _: f64, _: usize, _: f64) {}
}

/// Observer that forwards every update over an unbounded channel, for
/// callers that want to stream progress without blocking the Driver.
pub struct ChannelObserver {
    sender: tokio::sync::mpsc::UnboundedSender<ProgressEvent>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub run_id: String,
    pub status: RunStatus,
    pub progress: f64,
    pub current_generation: usize,
    pub best_fitness: f64,
}

impl ChannelObserver {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (ChannelObserver { sender }, receiver)
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(
        &self,
        run_id: &str,
        status: RunStatus,
        progress: f64,
        current_generation: usize,
        best_fitness: f64,
    ) {
        let _ = self.sender.send(ProgressEvent {
            run_id: run_id.to_string(),
            status,
            progress,
            current_generation,
            best_fitness,
        });
    }
}

/// A read-only capability with a single boolean, polled cooperatively by the
/// Driver (spec §5, §6). Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Per-process admission gate capping concurrent runs (spec §5, default 5).
pub struct AdmissionGate {
    semaphore: tokio::sync::Semaphore,
}

impl AdmissionGate {
    pub fn new(max_concurrent_runs: usize) -> Self {
        AdmissionGate {
            semaphore: tokio::sync::Semaphore::new(max_concurrent_runs),
        }
    }

    pub async fn acquire(&self) -> tokio::sync::SemaphorePermit<'_> {
        self.semaphore
            .acquire()
            .await
            .expect("admission gate semaphore never closes")
    }
}
