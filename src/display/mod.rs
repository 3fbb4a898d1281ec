pub mod trace;

pub use trace::{format_evaluation, format_trace};
