//! Trains a net by greedy, coordinate-wise search over neuron activations.
pub mod optimizer;
pub mod problem;

pub use optimizer::{train, training_step};
pub use problem::{empirical_loss, zero_one_loss, Catalog, Loss, Neighborhood, TrainingPair};
