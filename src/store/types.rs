use serde::{Serialize, Deserialize};

/// Index of a neuron in the flat arena. Neurons are numbered in layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Index of a named input slot of the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl SlotId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Where a neuron reads one of its arguments from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// One of the net's external inputs.
    Slot(SlotId),
    /// A neuron in a strictly earlier layer.
    Neuron(NodeId),
}

impl From<NodeId> for Source {
    fn from(id: NodeId) -> Self { Source::Neuron(id) }
}

impl From<SlotId> for Source {
    fn from(id: SlotId) -> Self { Source::Slot(id) }
}
