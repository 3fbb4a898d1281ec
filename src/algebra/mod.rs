//! The value-level algebra: finitary operations and finite relations.
pub mod operation;
pub mod relation;

// Re-export key types for convenient access
pub use operation::{Args, Kernel, Operation};
pub use relation::{Relation, Tuple};
