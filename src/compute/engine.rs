//! A synchronous, single-threaded forward evaluator.
use super::ledger::{Assignment, Ledger};
use crate::algebra::Args;
use crate::error::Result;
use crate::graph::NeuralNet;
use std::hash::Hash;
use tracing::trace;

pub struct Engine<'a, V> {
    net: &'a NeuralNet<V>,
}

impl<'a, V> Engine<'a, V>
where
    V: Clone + Eq + Hash + 'static,
{
    pub fn new(net: &'a NeuralNet<V>) -> Self {
        Self { net }
    }

    /// Evaluates every neuron, layer by layer, and returns the filled ledger.
    ///
    /// Within a layer the order is immaterial: all inputs of a neuron live in
    /// strictly earlier layers, which the net guarantees at construction.
    pub fn run(&self, assignment: &Assignment<V>) -> Result<Ledger<V>> {
        let net = self.net;
        let mut ledger = Ledger::from_assignment(net, assignment);

        for layer in 1..net.layer_count() {
            let Some(nodes) = net.store.layer_nodes(layer) else { break };
            for &node_id in nodes {
                let args = net
                    .inputs(node_id)
                    .iter()
                    .map(|&source| ledger.require(net, source).cloned())
                    .collect::<Result<Args<V>>>()?;
                let value = net.store.activations[node_id.index()].evaluate(&args)?;
                ledger.insert(node_id, value);
            }
        }
        trace!(neurons = net.neuron_count(), "forward pass complete");
        Ok(ledger)
    }

    /// Values of the output layer, in listed order.
    pub fn outputs(&self, assignment: &Assignment<V>) -> Result<Vec<V>> {
        let ledger = self.run(assignment)?;
        ledger.collect(self.net, self.net.output_layer())
    }
}

/// Feeds `assignment` forward through `net`, returning every slot and neuron value.
pub fn feed_forward_ledger<V>(net: &NeuralNet<V>, assignment: &Assignment<V>) -> Result<Ledger<V>>
where
    V: Clone + Eq + Hash + 'static,
{
    Engine::new(net).run(assignment)
}

/// Feeds `assignment` forward through `net`, returning the output-layer values.
pub fn feed_forward<V>(net: &NeuralNet<V>, assignment: &Assignment<V>) -> Result<Vec<V>>
where
    V: Clone + Eq + Hash + 'static,
{
    Engine::new(net).outputs(assignment)
}
