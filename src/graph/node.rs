//! Defines the `Neuron` and `Layer` types, the building blocks of a net's architecture.

use crate::algebra::Operation;
use crate::store::{NodeId, Source};

/// A neuron awaiting insertion into a `NeuralNet`.
///
/// Once inserted, the inputs are frozen and only the activation can change
/// (the trainer swaps it in place).
#[derive(Debug, Clone)]
pub struct Neuron<V> {
    /// The activation function of the neuron.
    pub activation: Operation<V>,
    /// Argument sources, in the order they are passed to `activation`.
    pub inputs: Vec<Source>,
}

impl<V> Neuron<V> {
    pub fn new(activation: Operation<V>, inputs: impl IntoIterator<Item = Source>) -> Self {
        Self { activation, inputs: inputs.into_iter().collect() }
    }
}

/// A borrowed view of one layer of a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer<'a> {
    /// The first layer: distinct names of the net's external inputs.
    Inputs(&'a [String]),
    /// Any later layer: neuron ids, in listed order.
    Neurons(&'a [NodeId]),
}

impl<'a> Layer<'a> {
    pub fn len(&self) -> usize {
        match self {
            Layer::Inputs(names) => names.len(),
            Layer::Neurons(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
