//! Random operations and randomly wired nets over the universe `0..order`.
use super::dag::NeuralNet;
use super::node::Neuron;
use crate::algebra::Operation;
use crate::config::RandomNetConfig;
use crate::error::{DnnError, Result};
use crate::store::{SlotId, Source};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// A random operation of the given arity on `0..order`.
///
/// Nullary operations get a random constant. Otherwise values are drawn lazily
/// and memoized, so the operation stays well-defined.
pub fn random_operation<R: Rng + ?Sized>(order: usize, arity: usize, rng: &mut R) -> Result<Operation<usize>> {
    if order == 0 {
        return Err(DnnError::InvalidConfig("order must be positive".to_string()));
    }
    if arity == 0 {
        return Ok(Operation::constant(rng.gen_range(0..order)));
    }
    let source = RefCell::new(StdRng::seed_from_u64(rng.gen()));
    Operation::new(arity, move |_| source.borrow_mut().gen_range(0..order), true)
}

/// Builds a randomly wired net from `config`.
///
/// Hidden layers have a random width in `1..=breadth` and draw their
/// activations from the signature's random operations plus the identity. The
/// output layer has `outputs` neurons and never uses the identity. Every
/// neuron reads from the layer right before its own.
pub fn random_net<R: Rng + ?Sized>(config: &RandomNetConfig, rng: &mut R) -> Result<NeuralNet<usize>> {
    config.validate()?;

    let mut basic_ops: BTreeMap<usize, Vec<Operation<usize>>> = BTreeMap::new();
    for (&arity, &count) in &config.signature {
        if count == 0 {
            continue;
        }
        let ops = (0..count).map(|_| random_operation(config.order, arity, rng)).collect::<Result<Vec<_>>>()?;
        basic_ops.insert(arity, ops);
    }
    let mut with_identity = basic_ops.clone();
    with_identity.entry(1).or_default().push(Operation::identity());

    let mut net = NeuralNet::new(config.inputs.iter().cloned())?;
    let mut previous: Vec<Source> = (0..config.inputs.len()).map(|i| Source::Slot(SlotId::new(i))).collect();

    for _ in 0..config.depth - 2 {
        let width = rng.gen_range(1..=config.breadth);
        let layer = random_layer(&with_identity, &previous, width, rng);
        previous = net.add_layer(layer)?.into_iter().map(Source::from).collect();
    }
    let outputs = random_layer(&basic_ops, &previous, config.outputs, rng);
    net.add_layer(outputs)?;
    Ok(net)
}

fn random_layer<R: Rng + ?Sized>(
    ops: &BTreeMap<usize, Vec<Operation<usize>>>,
    previous: &[Source],
    width: usize,
    rng: &mut R,
) -> Vec<Neuron<usize>> {
    // An empty previous layer only happens with no input slots, where validation
    // guarantees a nullary-only signature.
    let arities: Vec<usize> = ops.keys().copied().filter(|&a| a == 0 || !previous.is_empty()).collect();
    (0..width)
        .filter_map(|_| {
            let arity = *arities.choose(rng)?;
            let activation = ops.get(&arity)?.choose(rng)?.clone();
            let inputs: Vec<Source> = (0..arity).filter_map(|_| previous.choose(rng).copied()).collect();
            Some(Neuron::new(activation, inputs))
        })
        .collect()
}
