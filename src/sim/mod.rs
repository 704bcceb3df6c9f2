/// Timestamp generation for a run.
pub mod clock;
/// Relative loss aggregation.
pub mod loss;
pub mod pipeline;
pub mod types;
