//! The pieces a training run is built from: labelled pairs, a loss and a neighborhood.
use crate::algebra::Operation;
use crate::compute::{Assignment, Engine};
use crate::error::{DnnError, Result};
use crate::graph::NeuralNet;
use std::hash::Hash;

/// An input assignment together with the expected output-layer values.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPair<V> {
    pub input: Assignment<V>,
    pub expected: Vec<V>,
}

impl<V> TrainingPair<V> {
    pub fn new<I, S>(input: I, expected: Vec<V>) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
    {
        Self { input: input.into_iter().map(|(k, v)| (k.into(), v)).collect(), expected }
    }
}

/// Scores the outputs of a net against the expected outputs. Lower is better.
pub trait Loss<V> {
    fn loss(&self, actual: &[V], expected: &[V]) -> f64;
}

impl<V, F> Loss<V> for F
where
    F: Fn(&[V], &[V]) -> f64,
{
    fn loss(&self, actual: &[V], expected: &[V]) -> f64 {
        self(actual, expected)
    }
}

/// 0 when the output tuples agree, 1 otherwise.
pub fn zero_one_loss<V: PartialEq>(actual: &[V], expected: &[V]) -> f64 {
    if actual == expected { 0.0 } else { 1.0 }
}

/// Proposes the candidate activations examined in one training step.
///
/// By convention the first candidate is the current operation itself, which
/// guarantees a step never makes the empirical loss worse.
pub trait Neighborhood<V> {
    fn neighbors(&self, current: &Operation<V>) -> Vec<Operation<V>>;
}

impl<V, F> Neighborhood<V> for F
where
    F: Fn(&Operation<V>) -> Vec<Operation<V>>,
{
    fn neighbors(&self, current: &Operation<V>) -> Vec<Operation<V>> {
        self(current)
    }
}

/// A neighborhood that offers the current operation followed by a fixed set of
/// alternatives, skipping those of the wrong arity.
#[derive(Debug, Clone, Default)]
pub struct Catalog<V> {
    pub operations: Vec<Operation<V>>,
}

impl<V> Catalog<V> {
    pub fn new(operations: Vec<Operation<V>>) -> Self { Self { operations } }
}

impl<V> Neighborhood<V> for Catalog<V> {
    fn neighbors(&self, current: &Operation<V>) -> Vec<Operation<V>> {
        std::iter::once(current.clone())
            .chain(self.operations.iter().filter(|op| op.arity() == current.arity()).cloned())
            .collect()
    }
}

/// The mean loss of `net` over `pairs`.
pub fn empirical_loss<V, L>(net: &NeuralNet<V>, pairs: &[TrainingPair<V>], loss: &L) -> Result<f64>
where
    V: Clone + Eq + Hash + 'static,
    L: Loss<V> + ?Sized,
{
    if pairs.is_empty() {
        return Err(DnnError::EmptyTrainingSet);
    }
    let engine = Engine::new(net);
    let mut total = 0.0;
    for pair in pairs {
        let outputs = engine.outputs(&pair.input)?;
        total += loss.loss(&outputs, &pair.expected);
    }
    Ok(total / pairs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Neuron;
    use rstest::rstest;

    fn xor_net(op: Operation<u8>) -> NeuralNet<u8> {
        let mut net = NeuralNet::new(["a", "b"]).unwrap();
        let (a, b) = (net.slot("a").unwrap(), net.slot("b").unwrap());
        net.add_layer(vec![Neuron::new(op, [a, b])]).unwrap();
        net
    }

    fn xor_pairs() -> Vec<TrainingPair<u8>> {
        let mut pairs = Vec::new();
        for a in 0..2u8 {
            for b in 0..2u8 {
                pairs.push(TrainingPair::new([("a", a), ("b", b)], vec![a ^ b]));
            }
        }
        pairs
    }

    #[rstest]
    #[case(|v: &[u8]| v[0] ^ v[1], 0.0)]
    #[case(|v: &[u8]| v[0] | v[1], 0.25)]
    #[case(|v: &[u8]| v[0] & v[1], 0.75)]
    #[case(|v: &[u8]| 1 - (v[0] ^ v[1]), 1.0)]
    fn test_empirical_loss_is_mean(#[case] f: fn(&[u8]) -> u8, #[case] expected: f64) {
        let net = xor_net(Operation::new(2, f, false).unwrap());
        let got = empirical_loss(&net, &xor_pairs(), &zero_one_loss::<u8>).unwrap();
        assert!((got - expected).abs() < 1e-12, "got {}", got);
    }

    #[test]
    fn test_empty_training_set() {
        let net = xor_net(Operation::new(2, |v: &[u8]| v[0], false).unwrap());
        let err = empirical_loss(&net, &[], &zero_one_loss::<u8>).unwrap_err();
        assert!(matches!(err, DnnError::EmptyTrainingSet));
    }

    #[test]
    fn test_custom_loss_closure() {
        let net = xor_net(Operation::new(2, |v: &[u8]| v[0] + v[1], false).unwrap());
        let distance = |a: &[u8], e: &[u8]| (a[0] as f64 - e[0] as f64).abs();
        // Only (1, 1) is off, by 2.
        assert_eq!(empirical_loss(&net, &xor_pairs(), &distance).unwrap(), 0.5);
    }

    #[test]
    fn test_catalog_puts_current_first_and_filters_arity() {
        let current = Operation::new(2, |v: &[u8]| v[0], false).unwrap();
        let catalog = Catalog::new(vec![
            Operation::identity(),
            Operation::new(2, |v: &[u8]| v[1], false).unwrap(),
        ]);
        let candidates = catalog.neighbors(&current);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].ptr_eq(&current));
        assert_eq!(candidates[1].evaluate(&[3, 4]).unwrap(), 4);
    }
}
