//! Scenario tests driving the pipeline against an in-memory fabric
//!
//! Run with: cargo test --test scenarios

mod common;
mod config_file;
mod flooding;
mod forwarding;
mod learning;
