//! dag.rs
//! Wraps the low-level NetRegistry with the layered-net API.

use super::node::{Layer, Neuron};
use crate::algebra::Operation;
use crate::error::{DnnError, Result};
use crate::store::{NetRegistry, NodeId, SlotId, Source};

/// A discrete neural net: a layer of named inputs followed by layers of neurons.
///
/// The topology is fixed once a layer is added. Neurons may only read from
/// input slots or from neurons in strictly earlier layers, which is checked by
/// `add_layer`, so every net is acyclic by construction.
#[derive(Debug, Clone)]
pub struct NeuralNet<V> {
    pub(crate) store: NetRegistry<V>,
}

impl<V> NeuralNet<V> {
    /// Creates a net whose input layer holds the given distinct slot names.
    pub fn new<I, S>(slot_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self { store: NetRegistry::new(slot_names)? })
    }

    /// Looks up an input slot by name, for use as a neuron input.
    pub fn slot(&self, name: &str) -> Result<Source> {
        self.store
            .slot_id(name)
            .map(Source::Slot)
            .ok_or_else(|| DnnError::UnknownInputSlot(name.to_string()))
    }

    /// Appends a layer of neurons and returns their ids in listed order.
    pub fn add_layer(&mut self, neurons: Vec<Neuron<V>>) -> Result<Vec<NodeId>> {
        let columns = neurons.into_iter().map(|n| (n.activation, n.inputs)).collect();
        self.store.push_layer(columns)
    }

    // --- Accessors ---

    pub fn slot_names(&self) -> &[String] { &self.store.slot_names }
    pub fn slot_name(&self, slot: SlotId) -> Option<&str> {
        self.store.slot_names.get(slot.index()).map(String::as_str)
    }
    pub fn neuron_count(&self) -> usize { self.store.count() }
    pub fn layer_count(&self) -> usize { self.store.layer_count() }

    pub fn layer(&self, index: usize) -> Option<Layer<'_>> {
        if index == 0 {
            Some(Layer::Inputs(&self.store.slot_names))
        } else {
            self.store.layer_nodes(index).map(Layer::Neurons)
        }
    }

    /// Neurons of the last layer. Empty when the net has no neuron layers yet.
    pub fn output_layer(&self) -> &[NodeId] {
        self.store.layer_nodes(self.layer_count() - 1).unwrap_or(&[])
    }

    pub fn activation(&self, id: NodeId) -> Option<&Operation<V>> {
        self.store.activations.get(id.index())
    }

    /// Replaces the activation of `id`, returning the previous one.
    pub fn set_activation(&mut self, id: NodeId, op: Operation<V>) -> Result<Operation<V>> {
        let slot = self.store.activations.get_mut(id.index()).ok_or(DnnError::UnknownNeuron(id))?;
        Ok(std::mem::replace(slot, op))
    }

    pub fn inputs(&self, id: NodeId) -> &[Source] { self.store.get_inputs(id) }

    /// The net layer (>= 1) a neuron belongs to.
    pub fn layer_of(&self, id: NodeId) -> Option<usize> {
        self.store.layer_of.get(id.index()).map(|&l| l as usize)
    }

    /// Human-readable label of a source, e.g. `x` or `n3`.
    pub fn source_label(&self, source: Source) -> String {
        match source {
            Source::Slot(slot) => self.slot_name(slot).map_or_else(|| format!("#{}", slot.index()), str::to_string),
            Source::Neuron(id) => format!("n{}", id.index()),
        }
    }
}
