//! Coordinate-wise stochastic hill climbing over neuron activations.
use super::problem::{empirical_loss, Loss, Neighborhood, TrainingPair};
use crate::analysis::telemetry::{StepRecord, TrainingReport};
use crate::config::TrainConfig;
use crate::error::{DnnError, Result};
use crate::graph::NeuralNet;
use rand::seq::SliceRandom;
use rand::Rng;
use std::hash::Hash;
use tracing::{debug, info};

/// Performs one training step.
///
/// A non-input layer is drawn uniformly, then a neuron within it. Each
/// candidate from `neighbors` is installed in turn and scored by the empirical
/// loss; the candidate with the strictly smallest loss is kept, ties going to
/// the earliest candidate. If scoring fails, the previous activation is put
/// back before the error is returned.
pub fn training_step<V, N, L, R>(
    net: &mut NeuralNet<V>,
    pairs: &[TrainingPair<V>],
    neighbors: &N,
    loss: &L,
    rng: &mut R,
) -> Result<StepRecord>
where
    V: Clone + Eq + Hash + 'static,
    N: Neighborhood<V> + ?Sized,
    L: Loss<V> + ?Sized,
    R: Rng + ?Sized,
{
    if pairs.is_empty() {
        return Err(DnnError::EmptyTrainingSet);
    }
    if net.layer_count() < 2 {
        return Err(DnnError::NoTrainableNeuron);
    }

    let layer = rng.gen_range(1..net.layer_count());
    let neuron = *net
        .store
        .layer_nodes(layer)
        .and_then(|nodes| nodes.choose(rng))
        .ok_or(DnnError::NoTrainableNeuron)?;
    let current = net.activation(neuron).cloned().ok_or(DnnError::UnknownNeuron(neuron))?;

    let candidates = neighbors.neighbors(&current);
    if candidates.is_empty() {
        return Err(DnnError::EmptyNeighborhood);
    }

    let mut losses = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        net.set_activation(neuron, candidate.clone())?;
        match empirical_loss(net, pairs, loss) {
            Ok(value) => losses.push(value),
            Err(e) => {
                net.set_activation(neuron, current)?;
                return Err(e);
            }
        }
    }

    // Stable argmin: only a strictly smaller loss displaces an earlier candidate.
    let chosen = (1..losses.len()).fold(0, |best, i| if losses[i] < losses[best] { i } else { best });
    net.set_activation(neuron, candidates[chosen].clone())?;

    debug!(layer, neuron = neuron.index(), candidates = candidates.len(), chosen, loss = losses[chosen], "training step");
    Ok(StepRecord { layer, neuron, losses, chosen })
}

/// Runs `config.iterations` training steps in sequence.
///
/// There is no convergence test. When `config.report_loss` is set, the final
/// empirical loss is computed once, logged and stored in the report.
pub fn train<V, N, L, R>(
    net: &mut NeuralNet<V>,
    pairs: &[TrainingPair<V>],
    neighbors: &N,
    loss: &L,
    rng: &mut R,
    config: &TrainConfig,
) -> Result<TrainingReport>
where
    V: Clone + Eq + Hash + 'static,
    N: Neighborhood<V> + ?Sized,
    L: Loss<V> + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = TrainingReport { steps: Vec::with_capacity(config.iterations), final_loss: None };
    for _ in 0..config.iterations {
        report.steps.push(training_step(net, pairs, neighbors, loss, rng)?);
    }

    if config.report_loss {
        let final_loss = empirical_loss(net, pairs, loss)?;
        info!(iterations = config.iterations, loss = final_loss, "training finished");
        report.final_loss = Some(final_loss);
    }
    Ok(report)
}
