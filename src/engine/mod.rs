//! Core engine — the scan → price → evaluate → publish loop.

pub mod catalog;
pub mod evaluator;
pub mod pricing;
pub mod scheduler;
pub mod shutdown;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
