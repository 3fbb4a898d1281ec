//! Flat, index-checked storage for the neurons of a net.
pub mod registry;
pub mod types;

pub use registry::NetRegistry;
pub use types::{NodeId, SlotId, Source};
