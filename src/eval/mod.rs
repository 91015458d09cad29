//! The three rule evaluators (§4.3, §4.4, §4.5). Each is pure and
//! evaluates one slice of the model in isolation; [`crate::engine::run_qc`]
//! is the only place their outputs are merged, deduplicated, and rolled up
//! into per-entity status.

pub mod midspan;
pub mod ordering;
pub mod pole;
