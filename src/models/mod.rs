//! Core data models for the dashboard.

mod benchmark;
mod match_record;
mod participant;
mod run;
mod stats;

pub use benchmark::*;
pub use match_record::*;
pub use participant::*;
pub use run::*;
pub use stats::*;

#[cfg(test)]
pub(crate) use match_record::fixtures;
