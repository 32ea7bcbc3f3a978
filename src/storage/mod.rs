//! Entity API implementations that do not need the network

pub mod in_memory;

pub use in_memory::{ApiCall, InMemoryEntityApi};
