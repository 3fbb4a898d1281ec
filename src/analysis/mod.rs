//! Read-only views over a net and over training runs.
pub mod telemetry;
pub mod topology;

pub use telemetry::{StepRecord, TrainingReport};
pub use topology::NetTopology;
