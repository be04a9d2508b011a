//! Session archive adapters

pub mod store;
