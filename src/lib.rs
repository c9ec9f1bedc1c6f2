//! Learnflow - host-learning flow decision core
//!
//! Inspects frames punted up from switches, learns where hosts live and
//! either installs an exact-match forwarding rule or floods the frame.
//! Switch programming, frame transmission and topology are reached through
//! injected service traits.

pub mod config;
pub mod dataplane;
pub mod error;
pub mod platform;
pub mod protocol;
pub mod telemetry;

pub use error::{Error, Result};
