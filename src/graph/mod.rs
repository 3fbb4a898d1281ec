//! Defines the layered DAG of neurons and the tools to build one.
pub mod dag;
pub mod node;
pub mod random;

// Re-export key types for convenient access
pub use dag::NeuralNet;
pub use node::{Layer, Neuron};
