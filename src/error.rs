use thiserror::Error;

/// Error kinds surfaced by the optimizer (spec §7). The Driver never panics
/// on these; it catches them at the appropriate phase boundary and turns
/// them into a `RunOutput::Failed` or `RunOutput::Cancelled`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("infeasible problem: {0}")]
    InfeasibleProblem(String),

    #[error("routing unavailable: {0}")]
    RoutingUnavailable(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("run timed out")]
    Timeout,

    #[error("internal error: invariant `{invariant}` violated: {detail}")]
    InternalError { invariant: String, detail: String },
}

impl OptimizerError {
    pub fn internal(invariant: impl Into<String>, detail: impl Into<String>) -> Self {
        OptimizerError::InternalError {
            invariant: invariant.into(),
            detail: detail.into(),
        }
    }
}

pub type OptimizerResult<T> = Result<T, OptimizerError>;
