//! Coding agent adapters

pub mod simulated;
pub mod subprocess;
