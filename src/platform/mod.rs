//! Platform backends
//!
//! Implementations of the controller services the pipeline consumes. The
//! in-memory fabric stands in for a real controller: it backs the
//! `simulate` command and the tests.

pub mod memory;

pub use memory::InMemoryFabric;
