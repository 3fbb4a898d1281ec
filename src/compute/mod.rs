//! Executes a net on concrete inputs.
pub mod engine;
pub mod ledger;

pub use engine::{feed_forward, feed_forward_ledger, Engine};
pub use ledger::{Assignment, Ledger};
