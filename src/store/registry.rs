//! registry.rs
//! Dense columnar layout for neurons: activations, CSR inputs and layer ranges.

use super::types::*;
use crate::algebra::Operation;
use crate::error::{DnnError, Result};

#[derive(Debug, Clone)]
pub struct NetRegistry<V> {
    pub slot_names: Vec<String>,

    // Columnar arrays, one entry per neuron
    pub activations: Vec<Operation<V>>,
    pub layer_of: Vec<u32>,
    pub node_ids: Vec<NodeId>,

    // Dense topology
    pub inputs_flat: Vec<Source>,
    pub inputs_ranges: Vec<(u32, u32)>, // (start, count)

    // Neuron layers only; net layer `l` (l >= 1) is `layer_ranges[l - 1]`.
    pub layer_ranges: Vec<(u32, u32)>,
}

impl<V> NetRegistry<V> {
    pub fn new<I, S>(slot_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in slot_names {
            let name = name.into();
            if names.contains(&name) {
                return Err(DnnError::DuplicateInputSlot(name));
            }
            names.push(name);
        }
        Ok(Self {
            slot_names: names,
            activations: Vec::new(),
            layer_of: Vec::new(),
            node_ids: Vec::new(),
            inputs_flat: Vec::new(),
            inputs_ranges: Vec::new(),
            layer_ranges: Vec::new(),
        })
    }

    pub fn count(&self) -> usize { self.activations.len() }

    /// Number of layers, counting the input layer.
    pub fn layer_count(&self) -> usize { self.layer_ranges.len() + 1 }

    pub fn slot_id(&self, name: &str) -> Option<SlotId> {
        self.slot_names.iter().position(|n| n == name).map(SlotId::new)
    }

    /// Appends a layer after validating every neuron against the layers already present.
    /// Nothing is committed unless the whole layer is valid.
    pub fn push_layer(&mut self, neurons: Vec<(Operation<V>, Vec<Source>)>) -> Result<Vec<NodeId>> {
        let layer = self.layer_count();
        if neurons.is_empty() {
            return Err(DnnError::EmptyLayer(layer));
        }

        // Every neuron reference must point below the first id of the new layer.
        let boundary = self.count();
        for (activation, inputs) in &neurons {
            for source in inputs {
                match *source {
                    Source::Slot(slot) if slot.index() >= self.slot_names.len() => {
                        return Err(DnnError::UnknownInputSlot(format!("#{}", slot.index())));
                    }
                    Source::Neuron(target) if target.index() >= boundary => {
                        return Err(DnnError::ForwardReference { layer, target });
                    }
                    _ => {}
                }
            }
            // Constants have arity 0, so they take no inputs.
            if activation.arity() != inputs.len() {
                return Err(DnnError::arity(format!("neuron wiring in layer {}", layer), activation.arity(), inputs.len()));
            }
        }

        let start = boundary as u32;
        let mut ids = Vec::with_capacity(neurons.len());
        for (activation, inputs) in neurons {
            let id = NodeId::new(self.count());
            let input_start = self.inputs_flat.len() as u32;
            self.inputs_flat.extend_from_slice(&inputs);
            self.inputs_ranges.push((input_start, inputs.len() as u32));
            self.activations.push(activation);
            self.layer_of.push(layer as u32);
            self.node_ids.push(id);
            ids.push(id);
        }
        self.layer_ranges.push((start, ids.len() as u32));
        Ok(ids)
    }

    /// Inputs of `id`, in argument order. Empty for an unknown id.
    #[inline(always)]
    pub fn get_inputs(&self, id: NodeId) -> &[Source] {
        match self.inputs_ranges.get(id.index()) {
            Some(&(start, count)) => &self.inputs_flat[start as usize..(start + count) as usize],
            None => &[],
        }
    }

    /// Neuron ids of net layer `layer` (>= 1).
    pub fn layer_nodes(&self, layer: usize) -> Option<&[NodeId]> {
        let &(start, count) = self.layer_ranges.get(layer.checked_sub(1)?)?;
        Some(&self.node_ids[start as usize..(start + count) as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add() -> Operation<u32> {
        Operation::new(2, |x: &[u32]| x[0] + x[1], false).unwrap()
    }

    #[test]
    fn test_duplicate_slot_names_are_rejected() {
        let err = NetRegistry::<u32>::new(["x", "y", "x"]).unwrap_err();
        assert!(matches!(err, DnnError::DuplicateInputSlot(name) if name == "x"));
    }

    #[test]
    fn test_layers_are_contiguous_ranges() {
        let mut reg = NetRegistry::new(["x", "y"]).unwrap();
        let x = Source::Slot(reg.slot_id("x").unwrap());
        let y = Source::Slot(reg.slot_id("y").unwrap());
        let first = reg.push_layer(vec![(add(), vec![x, y]), (add(), vec![y, y])]).unwrap();
        let second = reg.push_layer(vec![(add(), vec![first[0].into(), first[1].into()])]).unwrap();

        assert_eq!(reg.layer_count(), 3);
        assert_eq!(reg.layer_nodes(1).unwrap(), &first[..]);
        assert_eq!(reg.layer_nodes(2).unwrap(), &second[..]);
        assert!(reg.layer_nodes(0).is_none());
        assert!(reg.layer_nodes(3).is_none());
        assert_eq!(reg.get_inputs(second[0]), &[Source::Neuron(NodeId(0)), Source::Neuron(NodeId(1))]);
        assert_eq!(reg.layer_of, vec![1, 1, 2]);
    }

    #[test]
    fn test_same_layer_reference_is_rejected_atomically() {
        let mut reg = NetRegistry::new(["x"]).unwrap();
        let x = Source::Slot(SlotId(0));
        let identity = Operation::<u32>::identity();
        // NodeId(0) would be created by this very layer.
        let err = reg
            .push_layer(vec![(identity.clone(), vec![x]), (identity, vec![NodeId(0).into()])])
            .unwrap_err();
        assert!(matches!(err, DnnError::ForwardReference { layer: 1, target: NodeId(0) }));
        assert_eq!(reg.count(), 0);
        assert_eq!(reg.layer_count(), 1);
    }

    #[test]
    fn test_wiring_must_match_arity() {
        let mut reg = NetRegistry::new(["x"]).unwrap();
        let err = reg.push_layer(vec![(add(), vec![Source::Slot(SlotId(0))])]).unwrap_err();
        assert!(matches!(err, DnnError::ArityMismatch { expected: 2, actual: 1, .. }));
        assert!(matches!(reg.push_layer(vec![]), Err(DnnError::EmptyLayer(1))));
        assert!(matches!(
            reg.push_layer(vec![(Operation::identity(), vec![Source::Slot(SlotId(4))])]),
            Err(DnnError::UnknownInputSlot(_))
        ));
    }

    #[test]
    fn test_constant_takes_no_inputs() {
        let mut reg = NetRegistry::new(["x"]).unwrap();
        let x = Source::Slot(SlotId(0));
        let err = reg.push_layer(vec![(Operation::constant(3u32), vec![x, x, x])]).unwrap_err();
        assert!(matches!(err, DnnError::ArityMismatch { expected: 0, actual: 3, .. }));
        assert_eq!(reg.count(), 0);

        let ids = reg.push_layer(vec![(Operation::constant(3u32), vec![])]).unwrap();
        assert!(reg.get_inputs(ids[0]).is_empty());
    }
}
