//! Structural analysis of a net's wiring: layer widths, which neurons the
//! outputs actually depend on, and the longest dependency chain.
use crate::graph::NeuralNet;
use crate::store::{NodeId, SlotId, Source};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Builds the dependency graph of `net`: one node per input slot followed by
/// one node per neuron, with an edge from every source to each neuron reading it.
///
/// Node `i < slots` is slot `i`; node `slots + j` is neuron `j`. Since neurons
/// are numbered layer by layer, index order is a topological order.
pub fn dependency_graph<V>(net: &NeuralNet<V>) -> DiGraph<Source, ()> {
    let slots = net.slot_names().len();
    let mut graph = DiGraph::with_capacity(slots + net.neuron_count(), 0);
    for i in 0..slots {
        graph.add_node(Source::Slot(SlotId::new(i)));
    }
    for j in 0..net.neuron_count() {
        graph.add_node(Source::Neuron(NodeId::new(j)));
    }
    for j in 0..net.neuron_count() {
        let target = NodeIndex::new(slots + j);
        for &source in net.inputs(NodeId::new(j)) {
            graph.add_edge(node_index(slots, source), target, ());
        }
    }
    graph
}

fn node_index(slots: usize, source: Source) -> NodeIndex {
    match source {
        Source::Slot(slot) => NodeIndex::new(slot.index()),
        Source::Neuron(id) => NodeIndex::new(slots + id.index()),
    }
}

/// A summary of a net's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetTopology {
    /// Width of every layer, the input layer first.
    pub layer_widths: Vec<usize>,
    /// Neurons some output depends on, outputs included, in id order.
    pub live: Vec<NodeId>,
    /// Neurons no output depends on.
    pub dead: Vec<NodeId>,
    /// Input slots no output depends on.
    pub unused_slots: Vec<String>,
    /// Number of edges on the longest path from a slot or constant to a neuron.
    pub depth: usize,
}

impl NetTopology {
    pub fn analyze<V>(net: &NeuralNet<V>) -> Self {
        let graph = dependency_graph(net);
        let slots = net.slot_names().len();

        let mut reached = vec![false; graph.node_count()];
        let reversed = Reversed(&graph);
        let mut dfs = Dfs::empty(reversed);
        for &out in net.output_layer() {
            dfs.move_to(node_index(slots, out.into()));
            while let Some(n) = dfs.next(reversed) {
                reached[n.index()] = true;
            }
        }

        let (live, dead): (Vec<NodeId>, Vec<NodeId>) =
            (0..net.neuron_count()).map(NodeId::new).partition(|id| reached[slots + id.index()]);
        let unused_slots = net
            .slot_names()
            .iter()
            .enumerate()
            .filter(|&(i, _)| !reached[i])
            .map(|(_, name)| name.clone())
            .collect();

        // Longest path, relying on index order being topological.
        let mut longest = vec![0usize; graph.node_count()];
        for n in graph.node_indices() {
            longest[n.index()] = graph
                .neighbors_directed(n, Direction::Incoming)
                .map(|p| longest[p.index()] + 1)
                .max()
                .unwrap_or(0);
        }

        let layer_widths = (0..net.layer_count()).map(|i| net.layer(i).map_or(0, |l| l.len())).collect();

        Self {
            layer_widths,
            live,
            dead,
            unused_slots,
            depth: longest.into_iter().max().unwrap_or(0),
        }
    }

    pub fn is_fully_live(&self) -> bool {
        self.dead.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Operation;
    use crate::graph::Neuron;

    fn sum() -> Operation<u32> {
        Operation::new(2, |v: &[u32]| v[0] + v[1], false).unwrap()
    }

    /// x, y, z -> n0 = x + y, n1 = id(y) -> n2 = id(n0)
    fn net_with_dead_branch() -> NeuralNet<u32> {
        let mut net = NeuralNet::new(["x", "y", "z"]).unwrap();
        let (x, y) = (net.slot("x").unwrap(), net.slot("y").unwrap());
        let hidden = net.add_layer(vec![Neuron::new(sum(), [x, y]), Neuron::new(Operation::identity(), [y])]).unwrap();
        net.add_layer(vec![Neuron::new(Operation::identity(), [Source::from(hidden[0])])]).unwrap();
        net
    }

    #[test]
    fn test_live_and_dead_neurons() {
        let topology = NetTopology::analyze(&net_with_dead_branch());
        assert_eq!(topology.layer_widths, vec![3, 2, 1]);
        assert_eq!(topology.live, vec![NodeId(0), NodeId(2)]);
        assert_eq!(topology.dead, vec![NodeId(1)]);
        assert_eq!(topology.unused_slots, vec!["z".to_string()]);
        assert_eq!(topology.depth, 2);
        assert!(!topology.is_fully_live());
    }

    #[test]
    fn test_skip_connection_depth() {
        let mut net = NeuralNet::new(["x"]).unwrap();
        let x = net.slot("x").unwrap();
        let a = net.add_layer(vec![Neuron::new(Operation::identity(), [x])]).unwrap();
        let b = net.add_layer(vec![Neuron::new(Operation::identity(), [Source::from(a[0])])]).unwrap();
        net.add_layer(vec![Neuron::new(sum(), [x, Source::from(b[0])])]).unwrap();

        let topology = NetTopology::analyze(&net);
        assert_eq!(topology.depth, 3);
        assert!(topology.is_fully_live());
        assert!(topology.unused_slots.is_empty());
    }

    #[test]
    fn test_inputs_only() {
        let net = NeuralNet::<u32>::new(["x", "y"]).unwrap();
        let topology = NetTopology::analyze(&net);
        assert_eq!(topology.layer_widths, vec![2]);
        assert_eq!(topology.depth, 0);
        assert!(topology.live.is_empty());
        assert_eq!(topology.unused_slots.len(), 2);
    }

    #[test]
    fn test_dependency_graph_edges() {
        let graph = dependency_graph(&net_with_dead_branch());
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph[NodeIndex::new(3)], Source::Neuron(NodeId(0)));
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_value(NetTopology::analyze(&net_with_dead_branch())).unwrap();
        assert_eq!(json["depth"], 2);
        assert_eq!(json["dead"], serde_json::json!([1]));
    }
}
