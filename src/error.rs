//! Defines the error type shared by the algebra, the evaluator and the trainer.
use crate::store::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DnnError>;

#[derive(Error, Debug)]
pub enum DnnError {
    #[error("Arity mismatch in {context}: expected {expected}, got {actual}")]
    ArityMismatch { context: String, expected: usize, actual: usize },
    #[error("Relations are incompatible: universe {left_universe}/arity {left_arity} vs universe {right_universe}/arity {right_arity}")]
    UniverseMismatch {
        left_universe: usize,
        left_arity: usize,
        right_universe: usize,
        right_arity: usize,
    },
    #[error("Element {element} is outside the universe of size {universe_size}")]
    ElementOutOfUniverse { element: usize, universe_size: usize },
    #[error("Cannot infer the arity of a relation with no tuples")]
    EmptyRelationArity,
    #[error("No value available for input '{source_name}'")]
    MissingInput { source_name: String },
    #[error("Empirical loss is undefined on an empty training set")]
    EmptyTrainingSet,
    #[error("Duplicate input slot '{0}'")]
    DuplicateInputSlot(String),
    #[error("Unknown input slot '{0}'")]
    UnknownInputSlot(String),
    #[error("Neuron in layer {layer} references {target:?}, which is not in an earlier layer")]
    ForwardReference { layer: usize, target: NodeId },
    #[error("No neuron with id {0:?}")]
    UnknownNeuron(NodeId),
    #[error("Layer {0} has no neurons")]
    EmptyLayer(usize),
    #[error("Net has no trainable neurons")]
    NoTrainableNeuron,
    #[error("Neighbor function returned no candidates")]
    EmptyNeighborhood,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DnnError {
    pub(crate) fn arity(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        DnnError::ArityMismatch { context: context.into(), expected, actual }
    }
}
