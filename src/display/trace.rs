use crate::compute::{feed_forward_ledger, Assignment, Ledger};
use crate::error::Result;
use crate::graph::{Layer, NeuralNet};
use crate::store::{NodeId, SlotId, Source};
use std::collections::HashMap;
use std::fmt::{Debug, Write};
use std::hash::Hash;

/// Evaluates `net` on `assignment` and renders every value, layer by layer.
///
/// ```text
/// Layer 0 (inputs):
///   x = 2
/// Layer 1:
///   n0(x, y) = 1
/// Outputs: [1]
/// ```
pub fn format_evaluation<V>(net: &NeuralNet<V>, assignment: &Assignment<V>) -> Result<String>
where
    V: Clone + Eq + Hash + Debug + 'static,
{
    let ledger = feed_forward_ledger(net, assignment)?;
    let mut out = String::new();

    for index in 0..net.layer_count() {
        match net.layer(index) {
            Some(Layer::Inputs(names)) => {
                let _ = writeln!(out, "Layer 0 (inputs):");
                for (i, name) in names.iter().enumerate() {
                    let source = Source::Slot(SlotId::new(i));
                    let _ = writeln!(out, "  {} = {}", name, format_value(&ledger, source));
                }
            }
            Some(Layer::Neurons(ids)) => {
                let _ = writeln!(out, "Layer {}:", index);
                for &id in ids {
                    let _ = writeln!(out, "  {} = {}", format_call(net, id), format_value(&ledger, id.into()));
                }
            }
            None => {}
        }
    }

    let outputs = ledger.collect(net, net.output_layer())?;
    let _ = write!(out, "Outputs: {:?}", outputs);
    Ok(out)
}

/// Renders the dependency tree of one neuron after a forward pass, from the
/// neuron down to the input slots. Subtrees already printed are shown as a
/// reference to the level where they first appeared.
pub fn format_trace<V: Clone + Debug>(net: &NeuralNet<V>, ledger: &Ledger<V>, target: NodeId) -> String {
    let mut tracer = Tracer { net, ledger, visited_at_level: HashMap::new(), output: String::new() };

    if target.index() < net.neuron_count() {
        let _ = writeln!(tracer.output, "TRACE for neuron n{}:", target.index());
        let _ = writeln!(tracer.output, "--------------------------------------------------");
        tracer.trace_source(target.into(), 1, "");
    } else {
        let _ = writeln!(tracer.output, "Error: Invalid neuron id {:?}", target);
    }
    tracer.output
}

struct Tracer<'a, V> {
    net: &'a NeuralNet<V>,
    ledger: &'a Ledger<V>,
    visited_at_level: HashMap<Source, usize>,
    output: String,
}

impl<'a, V: Clone + Debug> Tracer<'a, V> {
    fn trace_source(&mut self, source: Source, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&source) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return;
        }
        self.visited_at_level.insert(source, level);

        let value = format_value(self.ledger, source);
        match source {
            Source::Slot(_) => {
                let _ = writeln!(self.output, "{}[L{}] {} [{}] -> Input", prefix, level, self.net.source_label(source), value);
            }
            Source::Neuron(id) => {
                let _ = writeln!(self.output, "{}[L{}] {} [{}]", prefix, level, format_call(self.net, id), value);
                let stem = child_stem(prefix);
                let inputs = self.net.inputs(id);
                for (i, &input) in inputs.iter().enumerate() {
                    let connector = if i == inputs.len() - 1 { "`--" } else { "|--" };
                    self.trace_source(input, level + 1, &format!("{}{}", stem, connector));
                }
            }
        }
    }
}

fn format_call<V>(net: &NeuralNet<V>, id: NodeId) -> String {
    let args: Vec<String> = net.inputs(id).iter().map(|&s| net.source_label(s)).collect();
    format!("n{}({})", id.index(), args.join(", "))
}

fn format_value<V: Clone + Debug>(ledger: &Ledger<V>, source: Source) -> String {
    ledger.get(source).map_or_else(|| "?".to_string(), |v| format!("{:?}", v))
}

fn child_stem(prefix: &str) -> String {
    prefix.replace("`--", "   ").replace("|--", "|  ")
}
