pub mod run;
pub mod types;
pub mod validate;

pub use run::{
    AdmissionGate, CancellationToken, ChannelObserver, NullObserver, ProgressEvent,
    ProgressObserver, RunInput, RunOutput, RunStatistics, RunStatus,
};
pub use types::*;
pub use validate::{build_instance, validate_run, validate_weights};
