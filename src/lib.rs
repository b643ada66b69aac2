//! Multi-objective laboratory-network allocation optimizer: assigns
//! diagnostic test demand from service areas to laboratories under
//! capacity and capability constraints via an NSGA-II search, returning a
//! Pareto front plus one weighted-best solution.
//!
//! Module layout mirrors the teacher's own `domain` / `evaluation` /
//! `solver` split, with `distance`, `feasibility`, `seeding`, and `driver`
//! added for the routing, repair, population-seeding, and orchestration
//! concerns this optimizer needs that the teacher's VRP solver didn't.

pub mod config;
pub mod distance;
pub mod domain;
pub mod driver;
pub mod error;
pub mod evaluation;
pub mod feasibility;
pub mod seeding;
pub mod solver;

pub use config::{AlgorithmParams, DriverConfig, RoutingConfig};
pub use distance::{OsrmProvider, RoutingProvider};
pub use domain::{
    CancellationToken, NullObserver, ProgressObserver, RunInput, RunOutput, RunStatus, Solution,
    Weights,
};
pub use driver::Driver;
pub use error::{OptimizerError, OptimizerResult};
