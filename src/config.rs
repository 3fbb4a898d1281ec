//! Plain configuration structs for training runs and random architectures.
use crate::error::{DnnError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of training steps. Zero leaves the net untouched.
    pub iterations: usize,
    /// Compute (and log) the empirical loss once after the last step.
    pub report_loss: bool,
    /// Seed for neuron selection. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self { iterations: 100, report_loss: false, seed: None }
    }
}

impl TrainConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Shape of a randomly generated net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomNetConfig {
    /// Size of the universe `0..order` the random operations act on.
    pub order: usize,
    /// Names of the input slots.
    pub inputs: Vec<String>,
    /// Number of output neurons.
    pub outputs: usize,
    /// Number of layers, counting the input and output layers.
    pub depth: usize,
    /// Maximum width of a hidden layer.
    pub breadth: usize,
    /// Arity -> number of random basic operations of that arity.
    pub signature: BTreeMap<usize, usize>,
}

impl Default for RandomNetConfig {
    fn default() -> Self {
        Self {
            order: 2,
            inputs: vec!["x0".into(), "x1".into()],
            outputs: 1,
            depth: 3,
            breadth: 2,
            signature: [(1, 1), (2, 2)].into_iter().collect(),
        }
    }
}

impl RandomNetConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(DnnError::InvalidConfig(msg.to_string()));
        if self.depth < 2 {
            return invalid("depth must count at least the input and output layers");
        }
        if self.order == 0 {
            return invalid("order must be positive");
        }
        if self.outputs == 0 {
            return invalid("a net needs at least one output");
        }
        if self.depth > 2 && self.breadth == 0 {
            return invalid("hidden layers need a positive breadth");
        }
        if self.signature.values().all(|&count| count == 0) {
            return invalid("signature must provide at least one operation");
        }
        let needs_inputs = self.signature.iter().any(|(&arity, &count)| arity > 0 && count > 0);
        if needs_inputs && self.inputs.is_empty() {
            return invalid("operations of positive arity need at least one input");
        }
        Ok(())
    }
}
