//! Configuration management
//!
//! Loads config.toml: logging, rule timeouts, topology snapshot behaviour,
//! and the fabric/traffic description used by the simulator.

mod types;
mod validation;

pub use types::*;
pub use validation::{parse_attachment, validate, ValidationResult};

use crate::{Error, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Parse configuration from TOML text
pub fn parse(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}
