//! Discrete neural nets: layered DAGs of neurons whose activations are
//! operations on a finite universe, trained by greedy local search over the
//! activations rather than by gradients.

pub mod algebra;
pub mod analysis;
pub mod compute;
pub mod config;
pub mod display;
pub mod error;
pub mod graph;
pub mod solver;
pub mod store;

pub use algebra::{Operation, Relation};
pub use compute::{feed_forward, Assignment};
pub use config::{RandomNetConfig, TrainConfig};
pub use error::{DnnError, Result};
pub use graph::{NeuralNet, Neuron};
pub use solver::{train, training_step, TrainingPair};
pub use store::{NodeId, Source};
