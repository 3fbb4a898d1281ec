//! ledger.rs
//! The transient value table filled in during a forward pass.

use crate::error::{DnnError, Result};
use crate::graph::NeuralNet;
use crate::store::{NodeId, Source};
use std::collections::HashMap;

/// An assignment of values to a net's input slots, by name.
pub type Assignment<V> = HashMap<String, V>;

#[derive(Debug, Clone)]
pub struct Ledger<V> {
    // Dense storage: one entry per input slot and per neuron.
    slots: Vec<Option<V>>,
    neurons: Vec<Option<V>>,
}

impl<V: Clone> Ledger<V> {
    /// Seeds the ledger with the slot values of `assignment`.
    /// Names the net does not know are ignored; slots with no value stay empty.
    pub fn from_assignment(net: &NeuralNet<V>, assignment: &Assignment<V>) -> Self {
        let slots = net.slot_names().iter().map(|name| assignment.get(name).cloned()).collect();
        Self { slots, neurons: vec![None; net.neuron_count()] }
    }

    #[inline(always)]
    pub fn get(&self, source: Source) -> Option<&V> {
        match source {
            Source::Slot(slot) => self.slots.get(slot.index())?.as_ref(),
            Source::Neuron(id) => self.neurons.get(id.index())?.as_ref(),
        }
    }

    /// Like `get`, but a missing value is a `MissingInput` error naming the source.
    pub fn require(&self, net: &NeuralNet<V>, source: Source) -> Result<&V> {
        self.get(source).ok_or_else(|| DnnError::MissingInput { source_name: net.source_label(source) })
    }

    #[inline(always)]
    pub fn insert(&mut self, node_id: NodeId, value: V) {
        let idx = node_id.index();
        if idx >= self.neurons.len() {
            self.neurons.resize(idx + 1, None);
        }
        self.neurons[idx] = Some(value);
    }

    /// Values of `ids`, in order.
    pub fn collect(&self, net: &NeuralNet<V>, ids: &[NodeId]) -> Result<Vec<V>> {
        ids.iter().map(|&id| self.require(net, id.into()).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Operation;
    use crate::graph::Neuron;

    #[test]
    fn test_missing_slot_is_reported_by_name() {
        let mut net = NeuralNet::new(["x", "y"]).unwrap();
        let (x, y) = (net.slot("x").unwrap(), net.slot("y").unwrap());
        let ids = net
            .add_layer(vec![Neuron::new(Operation::new(2, |v: &[u8]| v[0] ^ v[1], false).unwrap(), [x, y])])
            .unwrap();

        let assignment: Assignment<u8> = [("x".to_string(), 1), ("z".to_string(), 9)].into_iter().collect();
        let mut ledger = Ledger::from_assignment(&net, &assignment);
        assert_eq!(ledger.get(x), Some(&1));
        let err = ledger.require(&net, y).unwrap_err();
        assert!(matches!(err, DnnError::MissingInput { source_name } if source_name == "y"));

        assert!(ledger.collect(&net, &ids).is_err());
        ledger.insert(ids[0], 5);
        assert_eq!(ledger.collect(&net, &ids).unwrap(), vec![5]);
    }
}
